//! HTTP API: REST passthrough for incomes/expenses plus report and export endpoints

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::aggregate;
use crate::config::Config;
use crate::constants;
use crate::contributors::{self, LedgerFilter, SortDirection, SortField};
use crate::expenses::ExpenseInput;
use crate::export::{self, ExportError, ExportFormat};
use crate::fetch::{self, Dataset};
use crate::incomes::IncomeInput;
use crate::present;
use crate::profiles::{AccessError, AuthContext, Scope};
use crate::reports::{self, ReportKind, ReportOptions};
use crate::store::Store;
use crate::validation::{self, ValidationError};

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    /// Year assumed for legacy bare month names
    pub reference_year: i32,
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::AdminRequired(_) => ApiError::Forbidden(e.to_string()),
            AccessError::UnknownRole(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UnknownFormat(_) | ExportError::UnknownReport(_) => {
                ApiError::NotFound(e.to_string())
            }
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// =============================================================================
// Router
// =============================================================================

pub fn create_router(state: AppState) -> Result<Router> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", state.config.cors_origin))?;

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/expense", get(list_expenses).post(create_expense))
        .route(
            "/expense/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/income", get(list_incomes).post(create_income))
        .route(
            "/income/{id}",
            get(get_income).put(update_income).delete(delete_income),
        )
        .route("/summary", get(get_summary))
        .route("/reports/categories", get(report_categories))
        .route("/reports/classes", get(report_classes))
        .route("/reports/monthly", get(report_monthly))
        .route("/reports/platforms", get(report_platforms))
        .route("/contributors", get(list_contributors))
        .route("/export/{report}/{format}", get(export_report));

    Ok(Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// =============================================================================
// Expenses
// =============================================================================

async fn list_expenses(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/expense");
    let expenses = state.store.list_expenses(&Scope::All).await?;
    Ok(Json(expenses))
}

async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/expense/{}", id);
    match state.store.get_expense(id).await? {
        Some(expense) => Ok(Json(expense)),
        None => Err(not_found("Expense", id)),
    }
}

async fn create_expense(
    State(state): State<AppState>,
    body: std::result::Result<Json<ExpenseInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body?;
    info!("POST /api/expense - {}", input.name);

    let record = validation::validate_expense(input, state.reference_year)?;
    let id = state.store.add_expense(&record).await?;
    let saved = state
        .store
        .get_expense(id)
        .await?
        .ok_or_else(|| not_found("Expense", id))?;

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<ExpenseInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body?;
    info!("PUT /api/expense/{}", id);

    let record = validation::validate_expense(input, state.reference_year)?;
    if !state.store.update_expense(id, &record).await? {
        return Err(not_found("Expense", id));
    }
    let saved = state
        .store
        .get_expense(id)
        .await?
        .ok_or_else(|| not_found("Expense", id))?;

    Ok(Json(saved))
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    info!("DELETE /api/expense/{}", id);
    if state.store.delete_expense(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Expense", id))
    }
}

// =============================================================================
// Incomes
// =============================================================================

async fn list_incomes(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/income");
    let incomes = state.store.list_incomes(&Scope::All).await?;
    Ok(Json(incomes))
}

async fn get_income(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!("GET /api/income/{}", id);
    match state.store.get_income(id).await? {
        Some(income) => Ok(Json(income)),
        None => Err(not_found("Income", id)),
    }
}

async fn create_income(
    State(state): State<AppState>,
    body: std::result::Result<Json<IncomeInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body?;
    info!("POST /api/income - {}", input.name);

    let class_types = state.store.list_class_types().await?;
    let record = validation::validate_income(input, &class_types)?;
    let id = state.store.add_income(&record).await?;
    let saved = state
        .store
        .get_income(id)
        .await?
        .ok_or_else(|| not_found("Income", id))?;

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_income(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<IncomeInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = body?;
    info!("PUT /api/income/{}", id);

    let class_types = state.store.list_class_types().await?;
    let record = validation::validate_income(input, &class_types)?;
    if !state.store.update_income(id, &record).await? {
        return Err(not_found("Income", id));
    }
    let saved = state
        .store
        .get_income(id)
        .await?
        .ok_or_else(|| not_found("Income", id))?;

    Ok(Json(saved))
}

async fn delete_income(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    info!("DELETE /api/income/{}", id);
    if state.store.delete_income(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Income", id))
    }
}

async fn get_summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("GET /api/summary");
    let data = fetch::fetch_dataset(&state.store, &Scope::All).await?;
    Ok(Json(aggregate::totals(&data.incomes, &data.expenses)))
}

fn not_found(what: &str, id: i64) -> ApiError {
    ApiError::NotFound(format!("{what} {id} not found"))
}

// =============================================================================
// Reports (scoped by caller)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct YearQuery {
    #[serde(default)]
    year: Option<i32>,
}

/// Resolve the caller from the user id header
async fn caller(state: &AppState, headers: &HeaderMap) -> ApiResult<AuthContext> {
    let user_id = headers
        .get(constants::USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing X-User-Id header".to_string()))?;

    fetch::find_auth(&state.store, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Unknown profile '{user_id}'")))
}

/// Fetch the caller's dataset, narrowed to `year` when given
async fn scoped_dataset(
    state: &AppState,
    headers: &HeaderMap,
    year: Option<i32>,
) -> ApiResult<(Scope, Dataset)> {
    let auth = caller(state, headers).await?;
    let scope = auth.scope();
    let data = fetch::fetch_dataset(&state.store, &scope).await?;
    let data = match year {
        Some(year) => reports::filter_year(&data, year, state.reference_year),
        None => data,
    };
    Ok((scope, data))
}

async fn report_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    info!("GET /api/reports/categories - year: {:?}", query.year);

    let (_, data) = scoped_dataset(&state, &headers, query.year).await?;
    let mut categories = aggregate::expenses_by_category(&data.expenses);
    aggregate::sort_by_total(&mut categories);
    let mut payers = aggregate::expenses_by_payer(&data.expenses);
    aggregate::sort_by_total(&mut payers);

    Ok(Json(json!({
        "categories": categories,
        "headline": present::headline(&categories),
        "payers": payers,
        "total": aggregate::grand_total(&categories),
    })))
}

async fn report_classes(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    info!("GET /api/reports/classes - year: {:?}", query.year);

    let (_, data) = scoped_dataset(&state, &headers, query.year).await?;
    let mut classes = aggregate::income_by_class(&data.incomes);
    aggregate::sort_classes_by_revenue(&mut classes);

    Ok(Json(json!({
        "classes": classes,
        "popularity": present::popularity(&classes),
        "stats": aggregate::workshop_stats(&data.incomes),
    })))
}

async fn report_monthly(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    info!("GET /api/reports/monthly - year: {:?}", query.year);

    let (_, data) = scoped_dataset(&state, &headers, query.year).await?;
    let months =
        aggregate::monthly_profit_and_loss(&data.incomes, &data.expenses, state.reference_year);
    Ok(Json(json!({
        "months": months,
        "totals": aggregate::totals(&data.incomes, &data.expenses),
    })))
}

async fn report_platforms(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<YearQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    info!("GET /api/reports/platforms - year: {:?}", query.year);

    let (_, data) = scoped_dataset(&state, &headers, query.year).await?;
    let mut platforms = aggregate::income_by_platform(&data.incomes);
    aggregate::sort_by_total(&mut platforms);

    Ok(Json(json!({
        "platforms": platforms,
        "chart": present::mini_chart(&platforms),
        "byMonth": aggregate::income_by_month(&data.incomes),
    })))
}

/// Ledger query string: `from`, `to`, `search`, `min_total`, `sort`, `direction`
#[derive(Debug, Default, Deserialize)]
struct LedgerQuery {
    #[serde(default)]
    from: Option<NaiveDate>,
    #[serde(default)]
    to: Option<NaiveDate>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    min_total: Option<f64>,
    #[serde(default)]
    sort: Option<SortField>,
    #[serde(default)]
    direction: Option<SortDirection>,
    #[serde(default)]
    year: Option<i32>,
}

impl LedgerQuery {
    fn options(self, reference_year: i32) -> ReportOptions {
        ReportOptions {
            reference_year,
            year: self.year,
            ledger: LedgerFilter {
                from: self.from,
                to: self.to,
                search: self.search,
                min_total: self.min_total,
            },
            sort: self.sort.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
        }
    }
}

async fn list_contributors(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<LedgerQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    info!("GET /api/contributors - query: {:?}", query);

    let options = query.options(state.reference_year);
    let (_, data) = scoped_dataset(&state, &headers, options.year).await?;
    let ledger = contributors::build_ledger(
        &data.expenses,
        &data.incomes,
        &options.ledger,
        options.sort,
        options.direction,
        options.reference_year,
    );

    Ok(Json(ledger))
}

async fn export_report(
    State(state): State<AppState>,
    Path((report, format)): Path<(String, String)>,
    headers: HeaderMap,
    query: std::result::Result<Query<LedgerQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    info!("GET /api/export/{}/{}", report, format);

    let kind: ReportKind = report.parse()?;
    let format: ExportFormat = format.parse()?;
    let options = query.options(state.reference_year);

    let auth = caller(&state, &headers).await?;
    let scope = auth.scope();
    let data = fetch::fetch_dataset(&state.store, &scope).await?;

    let now = Utc::now();
    let view = reports::build_view(kind, &data, &scope, &options, now);
    let bytes = export::render(&view, format)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        reports::file_name(kind, format, now.date_naive())
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use crate::profiles::{Profile, Role};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let store = Store::open_in_memory().await.unwrap();
        for (id, role) in [("admin", Role::Admin), ("u1", Role::User), ("u2", Role::User)] {
            store
                .upsert_profile(&Profile {
                    id: id.to_string(),
                    full_name: String::new(),
                    username: id.to_string(),
                    role,
                    email: format!("{id}@example.com"),
                    phone_number: None,
                    avatar_url: None,
                })
                .await
                .unwrap();
        }
        AppState {
            store,
            config: Arc::new(Config::resolve(&FileConfig::default(), |_| None)),
            reference_year: 2025,
        }
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("X-User-Id", user);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn expense_body(user: &str, category: &str, who_paid: &str, cost: f64) -> Value {
        json!({
            "user_id": user,
            "month": "2025-01",
            "name": format!("{category} order"),
            "cost": cost,
            "who_paid": who_paid,
            "category": category,
        })
    }

    async fn post_expense(
        app: &Router,
        user: &str,
        category: &str,
        who_paid: &str,
        cost: f64,
    ) -> (StatusCode, Value) {
        let body = expense_body(user, category, who_paid, cost);
        send(app, "POST", "/api/expense", None, Some(body)).await
    }

    #[tokio::test]
    async fn test_expense_crud() {
        let app = create_router(test_state().await).unwrap();

        let (status, created) = post_expense(&app, "u1", "Clay", "Alice", 20.0).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let mut changed = expense_body("u1", "Clay", "Bob", 25.0);
        changed["month"] = json!("February");
        let uri = format!("/api/expense/{id}");
        let (status, updated) = send(&app, "PUT", &uri, None, Some(changed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["who_paid"], "Bob");
        assert_eq!(updated["month"], "2025-02");

        let (status, list) = send(&app, "GET", "/api/expense", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "DELETE", &format!("/api/expense/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &format!("/api/expense/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let app = create_router(test_state().await).unwrap();

        let (status, body) = post_expense(&app, "u1", "Clay", "Alice", -5.0).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("cost"));

        let request = Request::builder()
            .method("POST")
            .uri("/api/income")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json!({"user_id": "u1", "date": "2025-01-01"});
        let (status, _) = send(&app, "PUT", "/api/income/99", None, Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_income_costs_derived_server_side() {
        let state = test_state().await;
        state
            .store
            .add_class_type(&crate::catalog::ClassType {
                id: None,
                name: "Wheel".to_string(),
                cost_per_person: 15.0,
            })
            .await
            .unwrap();
        let app = create_router(state).unwrap();

        let body = json!({
            "user_id": "u1", "date": "2025-01-04", "platform": "Direct", "class_type": "wheel",
            "guest_count": 4, "payment": 200, "shipping_cost": 10, "total_cost": 1, "profit": 1
        });
        let (status, created) = send(&app, "POST", "/api/income", None, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["total_cost"], json!(70.0));
        assert_eq!(created["profit"], json!(130.0));

        let (_, summary) = send(&app, "GET", "/api/summary", None, None).await;
        assert_eq!(
            summary,
            json!({"totalIncome": 200.0, "totalExpenses": 0.0, "totalProfit": 200.0})
        );
    }

    #[tokio::test]
    async fn test_reports_are_scoped_by_caller() {
        let app = create_router(test_state().await).unwrap();
        post_expense(&app, "u1", "Clay", "Alice", 20.0).await;
        post_expense(&app, "u2", "Rent", "Bob", 500.0).await;

        let (status, own) = send(&app, "GET", "/api/reports/categories", Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(own["total"], json!(20.0));

        let (_, all) = send(&app, "GET", "/api/reports/categories", Some("admin"), None).await;
        assert_eq!(all["total"], json!(520.0));
        assert_eq!(all["categories"][0]["key"], "Rent");

        let (status, _) = send(&app, "GET", "/api/reports/monthly", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "GET", "/api/reports/monthly", Some("ghost"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_contributors_min_total() {
        let app = create_router(test_state().await).unwrap();
        post_expense(&app, "u1", "Clay", "Alice", 20.0).await;
        send(
            &app,
            "POST",
            "/api/income",
            None,
            Some(json!({"user_id": "u1", "date": "2025-01-10", "payment": 50})),
        )
        .await;

        let uri = "/api/contributors?min_total=15&sort=name&direction=asc";
        let (status, ledger) = send(&app, "GET", uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = ledger
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Alice", "Company Revenue"]);

        let uri = "/api/contributors?min_total=lots";
        let (status, _) = send(&app, "GET", uri, Some("u1"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_download() {
        let app = create_router(test_state().await).unwrap();
        post_expense(&app, "u1", "Clay", "Alice", 20.0).await;

        let request = Request::builder()
            .uri("/api/export/categories/csv")
            .header("X-User-Id", "u1")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"workshop-categories-"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let table = export::read_csv_table(&bytes).unwrap();
        assert_eq!(table.rows[0][0], "Clay");
        assert_eq!(table.rows[0][1], "$20.00");

        let (status, _) = send(&app, "GET", "/api/export/categories/pdf", Some("u1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state().await).unwrap();
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
