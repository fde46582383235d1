mod adjustments;
mod client;
mod session;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub use adjustments::{
    AdjustmentError, AdjustmentRequest, AdjustmentsClient, Recommendation, SavingsPlan,
};
pub use client::{
    ClientConfig, GENERIC_ERROR_MESSAGE, SimulationClient, SimulationService, SubmitError,
};
pub use session::{
    Presentation, Renderer, SubmissionController, SubmitOutcome, ViewState, present_scenario,
};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
const LOADING_MESSAGE: &str = "Simulating, please wait...";
const ADJUSTMENTS_ERROR_MESSAGE: &str = "Error fetching recommendations.";

#[derive(Parser, Debug)]
#[command(
    name = "fintwin",
    about = "Builds retirement scenarios for the simulation service and renders its projections"
)]
pub struct Cli {
    #[arg(
        long,
        env = "FINTWIN_SERVICE_URL",
        default_value = DEFAULT_SERVICE_URL,
        help = "Base URL of the simulation service"
    )]
    service_url: String,
    #[arg(
        long,
        env = "FINTWIN_TIMEOUT_SECS",
        help = "Request timeout in seconds; no timeout when unset"
    )]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scenario and print its summary and chart spec.
    Simulate(ScenarioArgs),
    /// Ask the service for savings and investment adjustments.
    Adjust(AdjustArgs),
    /// Serve the presentation API for a browser front end.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

/// Form fields, kept as raw text so they go through the same validation as
/// browser submissions.
#[derive(Args, Debug, Clone)]
struct ScenarioArgs {
    #[arg(long)]
    current_age: String,
    #[arg(long)]
    retirement_age: String,
    #[arg(long)]
    monthly_income: String,
    #[arg(long)]
    monthly_expenses: String,
    #[arg(long)]
    monthly_savings: String,
    #[arg(long, help = "conservative, balanced or aggressive")]
    investment_strategy: Option<String>,
    #[arg(long, help = "Strategy after retirement")]
    retirement_investment_strategy: Option<String>,
    #[arg(long, help = "Gradual increase of the return rate in percent")]
    investment_increase: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Annual income change after a career switch")]
    career_switch_impact: Option<String>,
    #[arg(long)]
    career_switch_age: Option<String>,
    #[arg(long, help = "One-off purchase amount, e.g. a house")]
    purchase_amount: Option<String>,
    #[arg(long)]
    purchase_age: Option<String>,
    #[arg(long, help = "Write the chart spec JSON here instead of stdout")]
    chart_out: Option<PathBuf>,
}

impl ScenarioArgs {
    fn to_form(&self) -> HashMap<String, String> {
        let required = [
            ("current-age", &self.current_age),
            ("retirement-age", &self.retirement_age),
            ("monthly-income", &self.monthly_income),
            ("monthly-expenses", &self.monthly_expenses),
            ("monthly-savings", &self.monthly_savings),
        ];
        let optional = [
            ("investment-strategy", &self.investment_strategy),
            ("retirement-investment-strategy", &self.retirement_investment_strategy),
            ("investment-increase", &self.investment_increase),
            ("career-switch-impact", &self.career_switch_impact),
            ("career-switch-age", &self.career_switch_age),
            ("purchase-amount", &self.purchase_amount),
            ("purchase-age", &self.purchase_age),
        ];

        let mut form: HashMap<String, String> = required
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        for (k, v) in optional {
            if let Some(v) = v {
                form.insert(k.to_string(), v.clone());
            }
        }
        form
    }
}

#[derive(Args, Debug, Clone)]
struct AdjustArgs {
    #[arg(long, default_value_t = 0.0)]
    income: f64,
    #[arg(long, default_value_t = 0.0)]
    expenses: f64,
    #[arg(long, default_value_t = 0.0)]
    savings: f64,
    #[arg(long, default_value_t = 0.0)]
    investments: f64,
    #[arg(long, default_value_t = 0.0)]
    debt: f64,
    #[arg(long, default_value = "medium", help = "low, medium or high")]
    risk_tolerance: String,
}

impl From<AdjustArgs> for AdjustmentRequest {
    fn from(args: AdjustArgs) -> Self {
        AdjustmentRequest {
            income: args.income,
            expenses: args.expenses,
            savings: args.savings,
            investments: args.investments,
            debt: args.debt,
            risk_tolerance: args.risk_tolerance,
        }
    }
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.service_url.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Why a command failed; messages are user-facing text.
#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    /// The renderer has already shown the failure.
    Reported,
    Message(String),
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        CliError::Message(value)
    }
}

/// Entry point for the binary.
pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    let config = cli.client_config();
    match cli.command {
        Command::Simulate(args) => run_simulate(&config, args).await,
        Command::Adjust(args) => Ok(run_adjust(&config, args).await?),
        Command::Serve { port } => run_http_server(port, config)
            .await
            .map_err(|e| CliError::Message(format!("Server error: {e}"))),
    }
}

/// Prints view states the way the browser page shows them.
struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&self, view: &ViewState) {
        match view {
            ViewState::Idle => {}
            ViewState::Pending => eprintln!("{LOADING_MESSAGE}"),
            ViewState::Ready(presentation) => print!("{}", presentation.summary.to_text()),
            ViewState::Failed { message } => eprintln!("{message}"),
        }
    }
}

async fn run_simulate(config: &ClientConfig, args: ScenarioArgs) -> Result<(), CliError> {
    let service = SimulationClient::new(config).map_err(|e| {
        tracing::error!(error = %e, "could not build simulation client");
        GENERIC_ERROR_MESSAGE.to_string()
    })?;
    tracing::debug!(url = service.url(), "submitting scenario");
    let controller = SubmissionController::new(service, TerminalRenderer);

    let presentation = match controller.submit(&args.to_form()).await {
        SubmitOutcome::Rendered(ViewState::Ready(presentation)) => presentation,
        SubmitOutcome::Rendered(ViewState::Failed { .. }) => return Err(CliError::Reported),
        _ => return Err(GENERIC_ERROR_MESSAGE.to_string().into()),
    };

    let chart = serde_json::to_string_pretty(&presentation.chart)
        .map_err(|e| format!("Failed to encode chart spec: {e}"))?;
    match args.chart_out {
        Some(path) => std::fs::write(&path, chart)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()).into()),
        None => {
            println!("{chart}");
            Ok(())
        }
    }
}

async fn run_adjust(config: &ClientConfig, args: AdjustArgs) -> Result<(), String> {
    let client = AdjustmentsClient::new(config).map_err(|e| e.to_string())?;
    match client.request(&args.into()).await {
        Ok(recommendation) => {
            println!("AI Recommendations");
            for line in recommendation.lines() {
                println!("  {line}");
            }
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "adjustment request failed");
            Err(ADJUSTMENTS_ERROR_MESSAGE.to_string())
        }
    }
}

struct AppState {
    simulation: Arc<dyn SimulationService>,
    adjustments: AdjustmentsClient,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/scenario", post(scenario_handler))
        .route("/api/adjustments", post(adjustments_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, config: ClientConfig) -> std::io::Result<()> {
    let simulation = SimulationClient::new(&config).map_err(std::io::Error::other)?;
    let adjustments = AdjustmentsClient::new(&config).map_err(std::io::Error::other)?;
    let state = Arc::new(AppState {
        simulation: Arc::new(simulation),
        adjustments,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, service = %config.base_url, "fintwin presentation API listening");

    axum::serve(listener, router(state)).await
}

async fn health_handler() -> impl IntoResponse {
    with_cache_control("ok")
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn scenario_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HashMap<String, Value>>, JsonRejection>,
) -> Response {
    let form = match payload.map(|Json(body)| form_from_json(body)) {
        Ok(Some(form)) => form,
        Ok(None) => {
            tracing::info!("rejected scenario form with nested values");
            return error_response(StatusCode::BAD_REQUEST, GENERIC_ERROR_MESSAGE, None);
        }
        Err(rejection) => {
            tracing::info!(error = %rejection, "rejected scenario body");
            return error_response(StatusCode::BAD_REQUEST, GENERIC_ERROR_MESSAGE, None);
        }
    };

    match present_scenario(state.simulation.as_ref(), &form).await {
        Ok(presentation) => json_response(StatusCode::OK, presentation),
        Err(SubmitError::Validation(e)) => {
            tracing::info!(field = e.field, reason = %e.reason, "rejected scenario form");
            error_response(StatusCode::BAD_REQUEST, GENERIC_ERROR_MESSAGE, Some(e.field))
        }
        Err(e) => {
            tracing::warn!(error = %e, "scenario submission failed");
            error_response(StatusCode::BAD_GATEWAY, e.user_message(), None)
        }
    }
}

/// Flattens a JSON form into raw field text. Browsers post numbers as well
/// as strings; nulls count as blank. Nested values are refused.
fn form_from_json(body: HashMap<String, Value>) -> Option<HashMap<String, String>> {
    let mut form = HashMap::with_capacity(body.len());
    for (key, value) in body {
        let text = match value {
            Value::Null => continue,
            Value::String(text) => text,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => return None,
        };
        form.insert(key, text);
    }
    Some(form)
}

async fn adjustments_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdjustmentRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::info!(error = %rejection, "rejected adjustments body");
            return error_response(StatusCode::BAD_REQUEST, ADJUSTMENTS_ERROR_MESSAGE, None);
        }
    };

    match state.adjustments.request(&request).await {
        Ok(recommendation) => json_response(StatusCode::OK, recommendation),
        Err(e) => {
            tracing::warn!(error = %e, "adjustment request failed");
            error_response(StatusCode::BAD_GATEWAY, ADJUSTMENTS_ERROR_MESSAGE, None)
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str, field: Option<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            field,
        },
    )
}
