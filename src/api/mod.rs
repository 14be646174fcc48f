use std::net::SocketAddr;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Args;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    AllowanceTaper, CategoryAmount, DEFAULT_HORIZON_YEARS, DEFAULT_PENSION_GROWTH_RATE,
    DEFAULT_SAVINGS_GROWTH_RATE, DeductionResult, MonthlyBreakdown, PlanInputs,
    ProjectionSeries, ProjectionSettings, SalaryPlan, TaxYear, TaxYearFigures, UK_2024_25,
    UK_2024_25_FIGURES, annual_pension_contribution, annual_savings_contribution, build_plan,
    compute_deductions_for_year, compute_monthly_breakdown, compute_projection,
    exceeds_annual_allowance, monthly_savings_contribution,
};

pub mod cli;
mod error;

pub use error::InputError;

pub const MAX_PENSION_RATE_PERCENT: f64 = 50.0;
pub const MAX_SAVINGS_RATE_PERCENT: f64 = 20.0;
pub const MAX_HORIZON_YEARS: u32 = 100;
pub const DEFAULT_CONTRIBUTION_RATE_PERCENT: f64 = 5.0;
const ALLOWANCE_TAPER_WITHDRAWAL_RATE: f64 = 0.5;

// Shared by the `plan` command and the HTTP API. Rates are whole percents.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, help = "Gross annual salary")]
    pub salary: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_CONTRIBUTION_RATE_PERCENT,
        help = "Pension contribution in percent of gross salary (0-50)"
    )]
    pub pension_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_CONTRIBUTION_RATE_PERCENT,
        help = "ISA contribution in percent of gross salary (0-20)"
    )]
    pub savings_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly rent or mortgage payment")]
    pub housing_cost: f64,
    #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS, help = "Years to project")]
    pub horizon_years: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_PENSION_GROWTH_RATE * 100.0,
        help = "Annual pension growth in percent"
    )]
    pub pension_growth: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_SAVINGS_GROWTH_RATE * 100.0,
        help = "Annual ISA growth in percent"
    )]
    pub savings_growth: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.personal_allowance,
        help = "Personal allowance"
    )]
    pub personal_allowance: f64,
    #[arg(
        long,
        help = "Income above which the personal allowance is withdrawn at 1 for every 2"
    )]
    pub allowance_taper_start: Option<f64>,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.basic_rate_limit,
        help = "Upper income bound for the basic rate band"
    )]
    pub basic_rate_limit: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.higher_rate_limit,
        help = "Upper income bound for the higher rate band"
    )]
    pub higher_rate_limit: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.basic_rate_percent,
        help = "Basic tax rate in percent"
    )]
    pub basic_rate: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.higher_rate_percent,
        help = "Higher tax rate in percent"
    )]
    pub higher_rate: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.additional_rate_percent,
        help = "Additional tax rate in percent"
    )]
    pub additional_rate: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.insurance_primary_threshold,
        help = "National Insurance primary threshold"
    )]
    pub insurance_primary_threshold: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.insurance_upper_limit,
        help = "National Insurance upper earnings limit"
    )]
    pub insurance_upper_limit: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.insurance_main_rate_percent,
        help = "National Insurance rate between the thresholds in percent"
    )]
    pub insurance_main_rate: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.insurance_upper_rate_percent,
        help = "National Insurance rate above the upper earnings limit in percent"
    )]
    pub insurance_upper_rate: f64,
    #[arg(
        long,
        default_value_t = UK_2024_25_FIGURES.isa_annual_allowance,
        help = "Annual ISA allowance"
    )]
    pub isa_allowance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub tax_year: TaxYear,
    pub inputs: PlanInputs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    salary: Option<f64>,
    pension_rate: Option<f64>,
    savings_rate: Option<f64>,
    housing_cost: Option<f64>,
    horizon_years: Option<u32>,
    pension_growth: Option<f64>,
    savings_growth: Option<f64>,

    personal_allowance: Option<f64>,
    allowance_taper_start: Option<f64>,
    basic_rate_limit: Option<f64>,
    higher_rate_limit: Option<f64>,
    basic_rate: Option<f64>,
    higher_rate: Option<f64>,
    additional_rate: Option<f64>,
    insurance_primary_threshold: Option<f64>,
    insurance_upper_limit: Option<f64>,
    insurance_main_rate: Option<f64>,
    insurance_upper_rate: Option<f64>,
    isa_allowance: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum View {
    Deductions,
    Budget,
    Projection,
    Plan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetResponse {
    deductions: DeductionResult,
    monthly: MonthlyBreakdown,
    categories: Vec<CategoryAmount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    annual_pension_contribution: f64,
    annual_savings_contribution: f64,
    isa_annual_allowance: f64,
    allowance_exceeded: bool,
    points: ProjectionSeries,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ViewResponse {
    Deductions(DeductionResult),
    Budget(BudgetResponse),
    Projection(ProjectionResponse),
    Plan(SalaryPlan),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_request(args: &PlanArgs) -> Result<PlanRequest, InputError> {
    let tax_year = build_tax_year(args)?;

    let gross_salary = non_negative("--salary", args.salary)?;
    let pension_rate_percent =
        within("--pension-rate", args.pension_rate, 0.0, MAX_PENSION_RATE_PERCENT)?;
    let savings_rate_percent =
        within("--savings-rate", args.savings_rate, 0.0, MAX_SAVINGS_RATE_PERCENT)?;
    let monthly_housing_cost = non_negative("--housing-cost", args.housing_cost)?;

    if args.horizon_years > MAX_HORIZON_YEARS {
        return Err(InputError::HorizonTooLong {
            max: MAX_HORIZON_YEARS,
        });
    }
    let pension_growth = within("--pension-growth", args.pension_growth, -100.0, 100.0)?;
    let savings_growth = within("--savings-growth", args.savings_growth, -100.0, 100.0)?;

    Ok(PlanRequest {
        tax_year,
        inputs: PlanInputs {
            gross_salary,
            pension_rate_percent,
            savings_rate_percent,
            monthly_housing_cost,
            projection: ProjectionSettings {
                horizon_years: args.horizon_years,
                pension_growth_rate: pension_growth / 100.0,
                savings_growth_rate: savings_growth / 100.0,
            },
        },
    })
}

fn build_tax_year(args: &PlanArgs) -> Result<TaxYear, InputError> {
    let allowance = non_negative("--personal-allowance", args.personal_allowance)?;
    let basic_limit = non_negative("--basic-rate-limit", args.basic_rate_limit)?;
    let higher_limit = non_negative("--higher-rate-limit", args.higher_rate_limit)?;
    if basic_limit <= allowance {
        return Err(InputError::NotAbove {
            field: "--basic-rate-limit",
            other: "--personal-allowance",
        });
    }
    if higher_limit <= basic_limit {
        return Err(InputError::NotAbove {
            field: "--higher-rate-limit",
            other: "--basic-rate-limit",
        });
    }

    let primary = non_negative(
        "--insurance-primary-threshold",
        args.insurance_primary_threshold,
    )?;
    let upper = non_negative("--insurance-upper-limit", args.insurance_upper_limit)?;
    if upper <= primary {
        return Err(InputError::NotAbove {
            field: "--insurance-upper-limit",
            other: "--insurance-primary-threshold",
        });
    }

    let allowance_taper = args
        .allowance_taper_start
        .map(|start| {
            non_negative("--allowance-taper-start", start).map(|start| AllowanceTaper {
                start,
                withdrawal_rate: ALLOWANCE_TAPER_WITHDRAWAL_RATE,
            })
        })
        .transpose()?;

    let figures = TaxYearFigures {
        personal_allowance: allowance,
        basic_rate_limit: basic_limit,
        higher_rate_limit: higher_limit,
        basic_rate_percent: percent("--basic-rate", args.basic_rate)?,
        higher_rate_percent: percent("--higher-rate", args.higher_rate)?,
        additional_rate_percent: percent("--additional-rate", args.additional_rate)?,
        insurance_primary_threshold: primary,
        insurance_upper_limit: upper,
        insurance_main_rate_percent: percent("--insurance-main-rate", args.insurance_main_rate)?,
        insurance_upper_rate_percent: percent(
            "--insurance-upper-rate",
            args.insurance_upper_rate,
        )?,
        isa_annual_allowance: non_negative("--isa-allowance", args.isa_allowance)?,
    };

    let label = if figures == UK_2024_25_FIGURES && allowance_taper.is_none() {
        "uk-2024-25"
    } else {
        "custom"
    };
    let tax_year = figures.to_tax_year(label, allowance_taper);
    tax_year.validate()?;
    Ok(tax_year)
}

fn finite(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, InputError> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(InputError::Negative { field });
    }
    Ok(value)
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, InputError> {
    let value = finite(field, value)?;
    if !(min..=max).contains(&value) {
        return Err(InputError::OutOfRange { field, min, max });
    }
    Ok(value)
}

fn percent(field: &'static str, value: f64) -> Result<f64, InputError> {
    within(field, value, 0.0, 100.0)
}

pub fn default_args_for_api() -> PlanArgs {
    let figures = UK_2024_25_FIGURES;
    PlanArgs {
        salary: 0.0,
        pension_rate: DEFAULT_CONTRIBUTION_RATE_PERCENT,
        savings_rate: DEFAULT_CONTRIBUTION_RATE_PERCENT,
        housing_cost: 0.0,
        horizon_years: DEFAULT_HORIZON_YEARS,
        pension_growth: DEFAULT_PENSION_GROWTH_RATE * 100.0,
        savings_growth: DEFAULT_SAVINGS_GROWTH_RATE * 100.0,
        personal_allowance: figures.personal_allowance,
        allowance_taper_start: None,
        basic_rate_limit: figures.basic_rate_limit,
        higher_rate_limit: figures.higher_rate_limit,
        basic_rate: figures.basic_rate_percent,
        higher_rate: figures.higher_rate_percent,
        additional_rate: figures.additional_rate_percent,
        insurance_primary_threshold: figures.insurance_primary_threshold,
        insurance_upper_limit: figures.insurance_upper_limit,
        insurance_main_rate: figures.insurance_main_rate_percent,
        insurance_upper_rate: figures.insurance_upper_rate_percent,
        isa_allowance: figures.isa_annual_allowance,
    }
}

fn api_request_from_payload(payload: PlanPayload) -> Result<PlanRequest, InputError> {
    let mut args = default_args_for_api();

    let Some(salary) = payload.salary else {
        return Err(InputError::Missing { field: "salary" });
    };
    args.salary = salary;

    if let Some(v) = payload.pension_rate {
        args.pension_rate = v;
    }
    if let Some(v) = payload.savings_rate {
        args.savings_rate = v;
    }
    if let Some(v) = payload.housing_cost {
        args.housing_cost = v;
    }
    if let Some(v) = payload.horizon_years {
        args.horizon_years = v;
    }
    if let Some(v) = payload.pension_growth {
        args.pension_growth = v;
    }
    if let Some(v) = payload.savings_growth {
        args.savings_growth = v;
    }

    if let Some(v) = payload.personal_allowance {
        args.personal_allowance = v;
    }
    if payload.allowance_taper_start.is_some() {
        args.allowance_taper_start = payload.allowance_taper_start;
    }
    if let Some(v) = payload.basic_rate_limit {
        args.basic_rate_limit = v;
    }
    if let Some(v) = payload.higher_rate_limit {
        args.higher_rate_limit = v;
    }
    if let Some(v) = payload.basic_rate {
        args.basic_rate = v;
    }
    if let Some(v) = payload.higher_rate {
        args.higher_rate = v;
    }
    if let Some(v) = payload.additional_rate {
        args.additional_rate = v;
    }
    if let Some(v) = payload.insurance_primary_threshold {
        args.insurance_primary_threshold = v;
    }
    if let Some(v) = payload.insurance_upper_limit {
        args.insurance_upper_limit = v;
    }
    if let Some(v) = payload.insurance_main_rate {
        args.insurance_main_rate = v;
    }
    if let Some(v) = payload.insurance_upper_rate {
        args.insurance_upper_rate = v;
    }
    if let Some(v) = payload.isa_allowance {
        args.isa_allowance = v;
    }

    build_request(&args)
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<PlanRequest, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

fn evaluate_view(view: View, request: &PlanRequest) -> ViewResponse {
    let tax_year = &request.tax_year;
    let inputs = &request.inputs;
    match view {
        View::Deductions => ViewResponse::Deductions(compute_deductions_for_year(
            tax_year,
            inputs.gross_salary,
            inputs.pension_rate_percent,
        )),
        View::Budget => {
            let deductions = compute_deductions_for_year(
                tax_year,
                inputs.gross_salary,
                inputs.pension_rate_percent,
            );
            let monthly = compute_monthly_breakdown(
                &deductions,
                inputs.monthly_housing_cost,
                monthly_savings_contribution(inputs.gross_salary, inputs.savings_rate_percent),
            );
            ViewResponse::Budget(BudgetResponse {
                deductions,
                categories: monthly.categories(),
                monthly,
            })
        }
        View::Projection => ViewResponse::Projection(ProjectionResponse {
            annual_pension_contribution: annual_pension_contribution(
                inputs.gross_salary,
                inputs.pension_rate_percent,
            ),
            annual_savings_contribution: annual_savings_contribution(
                inputs.gross_salary,
                inputs.savings_rate_percent,
            ),
            isa_annual_allowance: tax_year.isa_annual_allowance,
            allowance_exceeded: exceeds_annual_allowance(
                tax_year,
                inputs.gross_salary,
                inputs.savings_rate_percent,
            ),
            points: compute_projection(
                inputs.gross_salary,
                inputs.pension_rate_percent,
                inputs.savings_rate_percent,
                &inputs.projection,
            ),
        }),
        View::Plan => ViewResponse::Plan(build_plan(tax_year, inputs)),
    }
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/deductions",
            get(deductions_get_handler).post(deductions_post_handler),
        )
        .route(
            "/api/budget",
            get(budget_get_handler).post(budget_post_handler),
        )
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .route("/api/tax-year", get(tax_year_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "payplan HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/plan?salary=50000");

    axum::serve(listener, router()).await
}

async fn deductions_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    view_handler_impl(View::Deductions, payload)
}

async fn deductions_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    view_handler_impl(View::Deductions, payload)
}

async fn budget_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    view_handler_impl(View::Budget, payload)
}

async fn budget_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    view_handler_impl(View::Budget, payload)
}

async fn projection_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    view_handler_impl(View::Projection, payload)
}

async fn projection_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    view_handler_impl(View::Projection, payload)
}

async fn plan_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    view_handler_impl(View::Plan, payload)
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    view_handler_impl(View::Plan, payload)
}

async fn tax_year_handler() -> Response {
    json_response(StatusCode::OK, UK_2024_25)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn view_handler_impl(view: View, payload: PlanPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => {
            warn!(?view, error = %err, "rejected request");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    debug!(
        ?view,
        salary = request.inputs.gross_salary,
        tax_year = %request.tax_year.label,
        "evaluating"
    );
    json_response(StatusCode::OK, evaluate_view(view, &request))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
