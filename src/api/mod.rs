use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{Product, ProductInput, Projection, plan};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliProduct {
    Sip,
    Lumpsum,
    Fd,
    Rd,
    Ppf,
    Nps,
    Emi,
    Cagr,
    Swp,
    Retirement,
}

impl From<CliProduct> for Product {
    fn from(value: CliProduct) -> Self {
        match value {
            CliProduct::Sip => Product::Sip,
            CliProduct::Lumpsum => Product::Lumpsum,
            CliProduct::Fd => Product::Fd,
            CliProduct::Rd => Product::Rd,
            CliProduct::Ppf => Product::Ppf,
            CliProduct::Nps => Product::Nps,
            CliProduct::Emi => Product::Emi,
            CliProduct::Cagr => Product::Cagr,
            CliProduct::Swp => Product::Swp,
            CliProduct::Retirement => Product::Retirement,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiProduct {
    Sip,
    #[serde(alias = "lumpSum", alias = "lump-sum")]
    Lumpsum,
    Fd,
    Rd,
    Ppf,
    Nps,
    #[serde(alias = "loan")]
    Emi,
    Cagr,
    Swp,
    #[serde(alias = "corpus")]
    Retirement,
}

impl From<ApiProduct> for CliProduct {
    fn from(value: ApiProduct) -> Self {
        match value {
            ApiProduct::Sip => CliProduct::Sip,
            ApiProduct::Lumpsum => CliProduct::Lumpsum,
            ApiProduct::Fd => CliProduct::Fd,
            ApiProduct::Rd => CliProduct::Rd,
            ApiProduct::Ppf => CliProduct::Ppf,
            ApiProduct::Nps => CliProduct::Nps,
            ApiProduct::Emi => CliProduct::Emi,
            ApiProduct::Cagr => CliProduct::Cagr,
            ApiProduct::Swp => CliProduct::Swp,
            ApiProduct::Retirement => CliProduct::Retirement,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    product: Option<ApiProduct>,
    principal: Option<f64>,
    monthly: Option<f64>,
    yearly: Option<f64>,
    initial: Option<f64>,
    #[serde(rename = "final", alias = "finalAmount")]
    final_amount: Option<f64>,
    rate: Option<f64>,
    years: Option<u32>,
    corpus: Option<f64>,
    withdrawal: Option<f64>,
    expense: Option<f64>,
    inflation: Option<f64>,
    round: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    about = "Year-wise projections for SIP, lumpsum, FD, RD, PPF, NPS, EMI, CAGR, SWP and retirement calculators",
    after_help = "Run `fincalc serve [port]` to start the HTTP API and web UI."
)]
struct Cli {
    #[arg(long, value_enum)]
    product: CliProduct,
    #[arg(long, help = "One-time amount (lumpsum, fd) or loan principal (emi)")]
    principal: Option<f64>,
    #[arg(long, help = "Monthly contribution (sip, rd, nps)")]
    monthly: Option<f64>,
    #[arg(long, help = "Yearly contribution (ppf)")]
    yearly: Option<f64>,
    #[arg(long, help = "Starting value (cagr)")]
    initial: Option<f64>,
    #[arg(long = "final", help = "Ending value (cagr)")]
    final_amount: Option<f64>,
    #[arg(long, help = "Expected annual return or loan rate in percent, e.g. 12")]
    rate: Option<f64>,
    #[arg(long, help = "Tenure in whole years")]
    years: Option<u32>,
    #[arg(long, help = "Starting corpus (swp)")]
    corpus: Option<f64>,
    #[arg(long, help = "Monthly withdrawal (swp)")]
    withdrawal: Option<f64>,
    #[arg(long, help = "Monthly expense in today's money (retirement)")]
    expense: Option<f64>,
    #[arg(long, help = "Expected annual inflation in percent (retirement)")]
    inflation: Option<f64>,
    #[arg(
        long,
        default_value_t = false,
        help = "Emit exact values instead of rounding to whole currency units"
    )]
    raw: bool,
}

#[derive(Debug)]
struct ApiRequest {
    product: Product,
    input: ProductInput,
    round: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    product: Product,
    rounded: bool,
    projection: Projection,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn require(value: Option<f64>, flag: &str, product: Product) -> Result<f64, String> {
    value.ok_or_else(|| format!("--{flag} is required for {product}"))
}

fn build_request(cli: Cli) -> Result<ApiRequest, String> {
    let product: Product = cli.product.into();
    let years = || {
        cli.years.ok_or_else(|| format!("--years is required for {product}"))
    };

    let input = match product {
        Product::Sip | Product::Rd | Product::Nps => ProductInput::Monthly {
            monthly: require(cli.monthly, "monthly", product)?,
            annual_rate_pct: require(cli.rate, "rate", product)?,
            years: years()?,
        },
        Product::Lumpsum | Product::Fd | Product::Emi => ProductInput::Principal {
            principal: require(cli.principal, "principal", product)?,
            annual_rate_pct: require(cli.rate, "rate", product)?,
            years: years()?,
        },
        Product::Ppf => ProductInput::Yearly {
            yearly: require(cli.yearly, "yearly", product)?,
            annual_rate_pct: require(cli.rate, "rate", product)?,
            years: years()?,
        },
        Product::Cagr => ProductInput::Growth {
            initial: require(cli.initial, "initial", product)?,
            final_value: require(cli.final_amount, "final", product)?,
            years: years()?,
        },
        Product::Swp => ProductInput::Withdrawal {
            corpus: require(cli.corpus, "corpus", product)?,
            annual_rate_pct: require(cli.rate, "rate", product)?,
            monthly_withdrawal: require(cli.withdrawal, "withdrawal", product)?,
        },
        Product::Retirement => ProductInput::Principal {
            principal: require(cli.expense, "expense", product)?,
            annual_rate_pct: require(cli.inflation, "inflation", product)?,
            years: years()?,
        },
    };

    Ok(ApiRequest {
        product,
        input,
        round: !cli.raw,
    })
}

fn run_request(request: &ApiRequest) -> Result<ProjectResponse, String> {
    let projection = plan(request.product, &request.input).map_err(|e| e.to_string())?;
    debug!("projected {} (rounded: {})", request.product, request.round);
    Ok(ProjectResponse {
        product: request.product,
        rounded: request.round,
        projection: if request.round {
            projection.rounded()
        } else {
            projection
        },
    })
}

/// Parses command-line flags and returns the projection as pretty JSON.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let request = build_request(cli)?;
    let response = run_request(&request)?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode JSON: {e}"))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("fincalc HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
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
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload).await,
        Err(rejection) => rejected_payload(rejection.status(), rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload).await,
        Err(rejection) => rejected_payload(rejection.status(), rejection.body_text()),
    }
}

fn rejected_payload(status: StatusCode, msg: String) -> Response {
    warn!("rejected projection payload: {msg}");
    error_response(status, &msg)
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let response = api_request_from_payload(payload).and_then(|request| run_request(&request));
    match response {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => {
            warn!("rejected projection request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
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

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ApiRequest, String> {
    let Some(product) = payload.product else {
        return Err("--product is required".to_string());
    };

    let mut cli = default_cli_for_api(product.into());
    cli.principal = payload.principal;
    cli.monthly = payload.monthly;
    cli.yearly = payload.yearly;
    cli.initial = payload.initial;
    cli.final_amount = payload.final_amount;
    cli.rate = payload.rate;
    cli.years = payload.years;
    cli.corpus = payload.corpus;
    cli.withdrawal = payload.withdrawal;
    cli.expense = payload.expense;
    cli.inflation = payload.inflation;
    if let Some(round) = payload.round {
        cli.raw = !round;
    }

    build_request(cli)
}

fn default_cli_for_api(product: CliProduct) -> Cli {
    Cli {
        product,
        principal: None,
        monthly: None,
        yearly: None,
        initial: None,
        final_amount: None,
        rate: None,
        years: None,
        corpus: None,
        withdrawal: None,
        expense: None,
        inflation: None,
        raw: false,
    }
}
