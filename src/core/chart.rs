use serde::Serialize;

use super::currency::CurrencyFormatter;
use super::types::ScenarioResult;

pub const CHART_TITLE: &str = "Financial Growth Forecast";
pub const DATASET_LABEL: &str = "Total Savings (SGD)";
pub const BOUNDARY_LABEL: &str = "Retirement";

const LINE_COLOR: &str = "rgba(75, 192, 192, 1)";
const FILL_COLOR: &str = "rgba(75, 192, 192, 0.2)";
const BOUNDARY_COLOR: &str = "rgb(255, 99, 132)";
const BOUNDARY_WIDTH: u32 = 2;
const MAX_TICKS: usize = 11;

/// Declarative line chart, laid out the way Chart.js expects its config.
///
/// Callbacks cannot travel in a declarative spec, so tooltip and tick text
/// is precomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Ages, used as categories rather than a numeric scale.
    pub labels: Vec<u32>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub tooltips: Vec<String>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: &'static str,
    pub boundary: Option<BoundaryMarker>,
    pub y_axis: YAxis,
}

/// Vertical line at a category index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryMarker {
    pub index: usize,
    pub label: &'static str,
    pub position: &'static str,
    pub border_color: &'static str,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YAxis {
    pub begin_at_zero: bool,
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

impl ChartSpec {
    pub fn dataset(&self) -> &Dataset {
        &self.data.datasets[0]
    }

    pub fn retirement_index(&self) -> Option<usize> {
        self.options.boundary.as_ref().map(|b| b.index)
    }
}

/// Merges both phases into one series and marks where retirement starts.
pub fn build_chart(result: &ScenarioResult) -> ChartSpec {
    let formatter = CurrencyFormatter::SGD;

    let labels: Vec<u32> = result.points().map(|p| p.age).collect();
    let data: Vec<f64> = result.points().map(|p| p.savings).collect();
    let tooltips = data
        .iter()
        .map(|v| format!("{DATASET_LABEL}: {}", formatter.format(Some(*v), true)))
        .collect();

    let boundary = result.retirement_index().map(|index| BoundaryMarker {
        index,
        label: BOUNDARY_LABEL,
        position: "top",
        border_color: BOUNDARY_COLOR,
        border_width: BOUNDARY_WIDTH,
    });

    ChartSpec {
        kind: "line",
        data: ChartData {
            labels,
            datasets: vec![Dataset {
                label: DATASET_LABEL,
                data: data.clone(),
                tooltips,
                border_color: LINE_COLOR,
                background_color: FILL_COLOR,
                fill: true,
            }],
        },
        options: ChartOptions {
            title: CHART_TITLE,
            boundary,
            y_axis: y_axis(&data, formatter),
        },
    }
}

/// Zero-based axis with round steps covering the largest value.
///
/// Negative values never pull the axis below zero; with no positive data
/// the axis collapses to a single zero tick.
fn y_axis(data: &[f64], formatter: CurrencyFormatter) -> YAxis {
    let peak = data
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    if peak <= 0.0 {
        return YAxis {
            begin_at_zero: true,
            min: 0.0,
            max: 0.0,
            ticks: vec![Tick {
                value: 0.0,
                label: formatter.format(Some(0.0), false),
            }],
        };
    }

    let range = nice_number(peak, false);
    let step = nice_number(range / (MAX_TICKS - 1) as f64, true);
    let steps = (peak / step).ceil();
    let (step, steps) = if (step * steps).is_finite() {
        (step, steps as usize)
    } else {
        // Near f64::MAX the rounded range overflows; split the peak evenly.
        (peak / (MAX_TICKS - 1) as f64, MAX_TICKS - 1)
    };
    let max = (steps as f64 * step).clamp(peak, f64::MAX);
    let ticks = (0..=steps)
        .map(|i| {
            let value = if i == steps { max } else { i as f64 * step };
            Tick {
                value,
                label: formatter.format(Some(value), false),
            }
        })
        .collect();

    YAxis {
        begin_at_zero: true,
        min: 0.0,
        max,
        ticks,
    }
}

/// Rounds `x` to 1, 2, 5 or 10 times a power of ten.
fn nice_number(x: f64, round: bool) -> f64 {
    let exponent = x.log10().floor();
    let magnitude = 10f64.powi(exponent as i32);
    let fraction = x / magnitude;
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
