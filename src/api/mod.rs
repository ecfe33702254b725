mod export;
mod params;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::core::{
    InvestmentPlan, ProjectionSummary, ValidationError, YearlyBreakdown, project, summarize,
    validate,
};

pub use export::{CSV_FILE_NAME, DigitGrouping, breakdown_to_csv, format_amount, render_table};
pub use params::{PlanQuery, plan_from_query, plan_to_query, share_url};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Longest plan the CLI and HTTP surfaces will project by default.
pub const DEFAULT_MAX_TENURE: u32 = 50;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGrouping {
    Indian,
    Standard,
}

impl From<CliGrouping> for DigitGrouping {
    fn from(value: CliGrouping) -> Self {
        match value {
            CliGrouping::Indian => DigitGrouping::Indian,
            CliGrouping::Standard => DigitGrouping::Standard,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "sip",
    version,
    about = "SIP projection: lump sum plus stepped-up monthly contributions, year by year"
)]
pub struct Cli {
    /// Tracing filter directive, e.g. `info` or `sip=debug`
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the year-by-year projection of a plan
    Project {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        #[arg(long, value_enum, default_value_t = CliGrouping::Indian)]
        grouping: CliGrouping,
        #[arg(long, default_value_t = DEFAULT_MAX_TENURE)]
        max_tenure: u32,
    },
    /// Serve the web calculator and JSON/CSV API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        bind: IpAddr,
        #[arg(long, default_value_t = DEFAULT_MAX_TENURE)]
        max_tenure: u32,
    },
    /// Print a shareable link for a plan
    Share {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, default_value = "http://localhost:8080/")]
        base_url: String,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct PlanArgs {
    #[arg(long, default_value_t = 0.0, help = "One-time lump sum invested at the start")]
    initial: f64,
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Monthly contribution in the first year"
    )]
    monthly: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Expected annual return in percent, e.g. 12"
    )]
    expected_return: f64,
    #[arg(long, default_value_t = 10.0, help = "Investment tenure in whole years")]
    tenure: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Yearly increase of the monthly contribution in percent"
    )]
    step_up: f64,
}

impl From<PlanArgs> for InvestmentPlan {
    fn from(args: PlanArgs) -> Self {
        InvestmentPlan {
            initial_investment: args.initial,
            monthly_investment: args.monthly,
            expected_return: args.expected_return,
            tenure: args.tenure,
            step_up: args.step_up,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    #[serde(alias = "initial")]
    initial_investment: Option<f64>,
    #[serde(alias = "monthly")]
    monthly_investment: Option<f64>,
    #[serde(alias = "return")]
    expected_return: Option<f64>,
    tenure: Option<f64>,
    step_up: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Tenure cannot exceed {max} years")]
    TenureAboveLimit { max: u32 },
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to format amounts: {0}")]
    Format(#[from] num_format::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid(_) | Self::TenureAboveLimit { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Encode(_) | Self::Format(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Invalid(reason) => reason.code(),
            Self::TenureAboveLimit { .. } => "tenure-above-limit",
            Self::Encode(_) | Self::Format(_) | Self::Io(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(
            self.status_code(),
            ErrorResponse {
                error: self.to_string(),
                code: Some(self.code()),
            },
        )
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub max_tenure: u32,
}

#[derive(Copy, Clone, Debug)]
struct AppState {
    max_tenure: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    plan: InvestmentPlan,
    summary: Option<ProjectionSummary>,
    years: Vec<YearlyBreakdown>,
    share_query: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

/// Validates a plan and applies the surface's tenure cap.
pub fn checked_plan(plan: InvestmentPlan, max_tenure: u32) -> Result<InvestmentPlan, ApiError> {
    validate(&plan)?;
    if plan.tenure > f64::from(max_tenure) {
        return Err(ApiError::TenureAboveLimit { max: max_tenure });
    }
    Ok(plan)
}

pub async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Project {
            plan,
            format,
            grouping,
            max_tenure,
        } => match render_projection(plan.into(), format, grouping.into(), max_tenure) {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::from(2)
            }
        },
        Command::Serve {
            port,
            bind,
            max_tenure,
        } => {
            let config = ServerConfig {
                bind,
                port,
                max_tenure,
            };
            if let Err(err) = run_http_server(config).await {
                error!(event = "server_exit", error = %err, "Server error");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Command::Share { plan, base_url } => {
            let plan = InvestmentPlan::from(plan);
            if let Err(err) = validate(&plan) {
                eprintln!("{err}");
                return ExitCode::from(2);
            }
            println!("{}", share_url(&base_url, &plan));
            ExitCode::SUCCESS
        }
    }
}

fn render_projection(
    plan: InvestmentPlan,
    format: OutputFormat,
    grouping: DigitGrouping,
    max_tenure: u32,
) -> Result<String, ApiError> {
    let plan = checked_plan(plan, max_tenure).inspect_err(|err| {
        warn!(event = "plan_rejected", code = err.code(), "{err}");
    })?;
    let years = project(&plan);
    debug!(event = "projected", years = years.len());

    Ok(match format {
        OutputFormat::Table => render_table(&years, summarize(&years).as_ref(), grouping)?,
        OutputFormat::Csv => breakdown_to_csv(&years),
        OutputFormat::Json => serde_json::to_string_pretty(&build_project_response(plan, years))?,
    })
}

pub async fn run_http_server(config: ServerConfig) -> Result<(), ApiError> {
    let addr = SocketAddr::new(config.bind, config.port);
    let app = router(AppState {
        max_tenure: config.max_tenure,
    });

    let listener = TcpListener::bind(addr).await?;
    info!(event = "listening", %addr, max_tenure = config.max_tenure);
    info!("Local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/project.csv", get(project_csv_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
            code: None,
        },
    )
}

async fn project_get_handler(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Response {
    project_handler_impl(state, plan_from_query(&query))
}

async fn project_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    project_handler_impl(state, plan_from_payload(payload))
}

fn project_handler_impl(state: AppState, plan: InvestmentPlan) -> Response {
    let plan = match checked_plan(plan, state.max_tenure) {
        Ok(plan) => plan,
        Err(err) => {
            warn!(event = "plan_rejected", code = err.code(), "{err}");
            return err.into_response();
        }
    };
    let years = project(&plan);
    debug!(event = "projected", years = years.len(), tenure = plan.tenure);
    json_response(StatusCode::OK, build_project_response(plan, years))
}

async fn project_csv_handler(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Response {
    let plan = match checked_plan(plan_from_query(&query), state.max_tenure) {
        Ok(plan) => plan,
        Err(err) => {
            warn!(event = "plan_rejected", code = err.code(), "{err}");
            return err.into_response();
        }
    };
    let csv = breakdown_to_csv(&project(&plan));
    with_cache_control((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE_NAME}\""),
            ),
        ],
        csv,
    ))
}

fn plan_from_payload(payload: PlanPayload) -> InvestmentPlan {
    let defaults = InvestmentPlan::DEFAULT;
    InvestmentPlan {
        initial_investment: payload
            .initial_investment
            .unwrap_or(defaults.initial_investment),
        monthly_investment: payload
            .monthly_investment
            .unwrap_or(defaults.monthly_investment),
        expected_return: payload.expected_return.unwrap_or(defaults.expected_return),
        tenure: payload.tenure.unwrap_or(defaults.tenure),
        step_up: payload.step_up.unwrap_or(defaults.step_up),
    }
}

fn build_project_response(plan: InvestmentPlan, years: Vec<YearlyBreakdown>) -> ProjectResponse {
    ProjectResponse {
        plan,
        summary: summarize(&years),
        years,
        share_query: plan_to_query(&plan),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}
