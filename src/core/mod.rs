mod chart;
mod currency;
mod request;
mod summary;
mod types;

pub use chart::{BoundaryMarker, ChartSpec, Dataset, Tick, YAxis, build_chart};
pub use currency::CurrencyFormatter;
pub use request::{ValidationError, build_request};
pub use summary::{HeadlineStat, RenderedSummary, render_summary};
pub use types::{PhasePoint, ScenarioRequest, ScenarioResult};
