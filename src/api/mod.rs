use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    ComparisonResult, InputError, RateSchedule, ScenarioConfig, ScenarioId, ScenarioResult,
    ScheduleError, SeriesPoint, compare_scenarios, evaluate_scenario, generate_series,
};

const DEFAULT_MAX_INCOME: f64 = 200_000.0;
const DEFAULT_BREAKDOWN_INCOME: f64 = 40_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Paye,
    SoleTrader,
    LtdOutside,
    LtdInside,
    Custom,
}

impl From<CliScenario> for ScenarioId {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Paye => ScenarioId::Paye,
            CliScenario::SoleTrader => ScenarioId::SoleTrader,
            CliScenario::LtdOutside => ScenarioId::LtdOutside,
            CliScenario::LtdInside => ScenarioId::LtdInside,
            CliScenario::Custom => ScenarioId::Custom,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// `enabled` arrives either as the comma-separated list used in share links
/// or, in JSON bodies, as an array of ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EnabledList {
    Csv(String),
    List(Vec<String>),
}

impl EnabledList {
    fn parse(self) -> Result<Vec<ScenarioId>, InputError> {
        let raw: Vec<String> = match self {
            EnabledList::Csv(csv) => csv.split(',').map(str::to_string).collect(),
            EnabledList::List(list) => list,
        };
        raw.iter()
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.parse())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    custom_salary: Option<f64>,
    custom_expenses: Option<f64>,
    custom_insurance: Option<f64>,
    #[serde(rename = "customInsideIR35", alias = "customInsideIr35")]
    custom_inside_ir35: Option<bool>,
    min_income: Option<f64>,
    max_income: Option<f64>,
    #[serde(alias = "gross")]
    breakdown_income: Option<f64>,
    enabled: Option<EnabledList>,
}

#[derive(Parser, Debug)]
#[command(
    name = "takehome",
    about = "Compare UK take-home pay as PAYE, sole trader and limited-company director"
)]
struct Cli {
    #[arg(
        long,
        default_value_t = DEFAULT_BREAKDOWN_INCOME,
        help = "Gross income used for the ranking and line-item breakdown"
    )]
    gross: f64,
    #[arg(long, default_value_t = 0.0, help = "Lowest gross income in the series")]
    min_income: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_INCOME,
        help = "Highest gross income in the series"
    )]
    max_income: f64,
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [
            CliScenario::Paye,
            CliScenario::SoleTrader,
            CliScenario::LtdOutside,
            CliScenario::LtdInside,
        ],
        help = "Scenarios to compare, comma separated"
    )]
    enabled: Vec<CliScenario>,
    #[arg(
        long,
        default_value_t = 12570.0,
        help = "Director salary for the custom scenario"
    )]
    custom_salary: f64,
    #[arg(long, default_value_t = 0.0, help = "Business expenses for the custom scenario")]
    custom_expenses: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Professional insurance for the custom scenario"
    )]
    custom_insurance: f64,
    #[arg(long, help = "Treat the custom scenario as inside IR35")]
    custom_inside_ir35: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, help = "Also print the net income series in text output")]
    series: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct CompareRequest {
    config: ScenarioConfig,
    enabled: Vec<ScenarioId>,
    min_income: f64,
    max_income: f64,
    breakdown_income: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    tax_year: &'static str,
    breakdown_income: f64,
    config: ScenarioConfig,
    comparison: ComparisonResult,
    breakdowns: Vec<ScenarioResult>,
    series: Vec<SeriesPoint>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("invalid rate schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_request(payload: ComparePayload) -> Result<CompareRequest, InputError> {
    let defaults = ScenarioConfig::default();
    let config = ScenarioConfig {
        salary: InputError::check_amount(
            "customSalary",
            payload.custom_salary.unwrap_or(defaults.salary),
        )?,
        expenses: InputError::check_amount(
            "customExpenses",
            payload.custom_expenses.unwrap_or(defaults.expenses),
        )?,
        insurance: InputError::check_amount(
            "customInsurance",
            payload.custom_insurance.unwrap_or(defaults.insurance),
        )?,
        inside_rule_applies: payload
            .custom_inside_ir35
            .unwrap_or(defaults.inside_rule_applies),
    };

    let enabled = match payload.enabled {
        Some(list) => list.parse()?,
        None => ScenarioId::DEFAULT_ENABLED.to_vec(),
    };

    Ok(CompareRequest {
        config,
        enabled,
        min_income: InputError::check_amount("minIncome", payload.min_income.unwrap_or(0.0))?,
        max_income: InputError::check_amount(
            "maxIncome",
            payload.max_income.unwrap_or(DEFAULT_MAX_INCOME),
        )?,
        breakdown_income: InputError::check_amount(
            "breakdownIncome",
            payload.breakdown_income.unwrap_or(DEFAULT_BREAKDOWN_INCOME),
        )?,
    })
}

fn build_request_from_cli(cli: &Cli) -> Result<CompareRequest, InputError> {
    if cli.enabled.is_empty() {
        return Err(InputError::NoScenarios);
    }
    let enabled: Vec<ScenarioId> = cli.enabled.iter().map(|&s| s.into()).collect();
    Ok(CompareRequest {
        config: ScenarioConfig {
            salary: InputError::check_amount("--custom-salary", cli.custom_salary)?,
            expenses: InputError::check_amount("--custom-expenses", cli.custom_expenses)?,
            insurance: InputError::check_amount("--custom-insurance", cli.custom_insurance)?,
            inside_rule_applies: cli.custom_inside_ir35,
        },
        enabled,
        min_income: InputError::check_amount("--min-income", cli.min_income)?,
        max_income: InputError::check_amount("--max-income", cli.max_income)?,
        breakdown_income: InputError::check_amount("--gross", cli.gross)?,
    })
}

fn build_compare_response(rates: &RateSchedule, request: &CompareRequest) -> CompareResponse {
    let comparison = compare_scenarios(
        rates,
        &request.enabled,
        request.breakdown_income,
        &request.config,
    );
    // breakdowns follow the ranking so the best scenario comes first
    let breakdowns = comparison
        .ranking
        .iter()
        .map(|ranked| {
            evaluate_scenario(
                rates,
                ranked.scenario,
                request.breakdown_income,
                &request.config,
            )
        })
        .collect();
    let series = generate_series(
        rates,
        &request.enabled,
        request.min_income,
        request.max_income,
        &request.config,
    );

    CompareResponse {
        tax_year: rates.tax_year,
        breakdown_income: request.breakdown_income,
        config: request.config,
        comparison,
        breakdowns,
        series,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let rates = RateSchedule::uk_2024_25();
    rates
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/rates", get(rates_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(
        "take-home API for tax year {} listening on http://{addr}",
        rates.tax_year
    );
    info!("Local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn rates_handler() -> Response {
    json_response(StatusCode::OK, RateSchedule::uk_2024_25())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match build_request(payload) {
        Ok(request) => request,
        Err(err) => {
            warn!("rejected compare request: {err}");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };
    debug!(
        "compare gross={} range={}..{} enabled={:?}",
        request.breakdown_income, request.min_income, request.max_income, request.enabled
    );

    let response = build_compare_response(RateSchedule::uk_2024_25(), &request);
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

/// Parses command-line flags and renders the comparison. Flag errors exit
/// through clap; value errors come back as `CliError`.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let rates = RateSchedule::uk_2024_25();
    rates.validate()?;
    let request = build_request_from_cli(&cli)?;
    debug!("cli request {request:?}");
    let response = build_compare_response(rates, &request);

    Ok(match cli.format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&response)?;
            json.push('\n');
            json
        }
        OutputFormat::Text => render_text(&response, cli.series),
    })
}

/// Whole pounds for display; zero amounts render blank.
fn format_money(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else if value < 0.0 {
        format!("-£{:.0}", value.abs())
    } else {
        format!("£{value:.0}")
    }
}

fn render_text(response: &CompareResponse, with_series: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "UK take-home comparison ({}) at gross £{:.0}",
        response.tax_year, response.breakdown_income
    );

    for breakdown in &response.breakdowns {
        let marker = if response.comparison.best == Some(breakdown.scenario) {
            "  [best]"
        } else {
            ""
        };
        let _ = writeln!(out, "\n{}{marker}", breakdown.name);
        for item in &breakdown.items {
            if item.is_divider {
                let _ = writeln!(out, "  {}", "-".repeat(40));
                continue;
            }
            let label = match item.note {
                Some(note) => format!("{} ({note})", item.label),
                None => item.label.to_string(),
            };
            let indent = if item.is_subtotal { "" } else { "  " };
            let _ = writeln!(
                out,
                "  {indent}{label:<width$}{:>12}",
                format_money(item.value),
                width = 36 - indent.len()
            );
        }
        let _ = writeln!(out, "  {:<36}{:>12}", "Net Income", format!("£{:.0}", breakdown.net));
    }

    if response.comparison.ranking.len() > 1 {
        let ranking: Vec<String> = response
            .comparison
            .ranking
            .iter()
            .map(|r| format!("{} (£{:.0})", r.scenario.display_name(), r.net))
            .collect();
        let _ = writeln!(out, "\nRanking (best to worst): {}", ranking.join(" -> "));
    }

    if with_series {
        let _ = writeln!(out);
        let mut header = format!("{:>10}", "gross");
        if let Some(first) = response.series.first() {
            for scenario in first.net_by_scenario.keys() {
                let _ = write!(header, "{:>12}", scenario.series_key());
            }
        }
        let _ = writeln!(out, "{header}");
        for point in &response.series {
            let mut row = format!("{:>10.0}", point.gross);
            for net in point.net_by_scenario.values() {
                let _ = write!(row, "{net:>12.0}");
            }
            let _ = writeln!(out, "{row}");
        }
    }

    out
}
