use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Form, Json, Router,
    extract::{Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use food_diary_core::{DiaryError, DiaryStats, Entry, RecordStore};

use crate::page::render_index;

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<RecordStore>>,
}

impl AppState {
    fn store(&self) -> MutexGuard<'_, RecordStore> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct EntriesQuery {
    date: Option<String>,
}

/// Form fields arrive as raw text; missing fields are empty so the
/// validator reports them.
#[derive(Deserialize)]
struct CreateEntryForm {
    #[serde(default)]
    food_name: String,
    #[serde(default)]
    calories: String,
    #[serde(default)]
    meal_type: String,
    #[serde(default)]
    notes: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<DiaryError> for ApiError {
    fn from(err: DiaryError) -> Self {
        match err {
            DiaryError::Validation(e) => Self::BadRequest(e.to_string()),
            // Source already logged by the store; only the generic message
            // goes back to the client.
            e @ DiaryError::Persistence { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "failed to serialize response");
        Self::Internal("Internal server error".to_string())
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; style-src 'unsafe-inline'; form-action 'self'"),
    );
    response
}

// --- Handlers ---

async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store();
    let today = store.date_summary(None);
    let stats = store.stats();
    Html(render_index(&today, &stats))
}

async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<EntriesQuery>,
) -> Result<Response, ApiError> {
    let Some(date_str) = params.date else {
        let store = state.store();
        let value = serde_json::to_value(store.all())?;
        return Ok(Json(value).into_response());
    };

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string())
    })?;

    let summary = state.store().date_summary(Some(date));
    Ok(Json(summary).into_response())
}

async fn create_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateEntryForm>,
) -> Result<Response, ApiError> {
    let entry: Entry = state.store().add(
        &form.food_name,
        &form.calories,
        &form.meal_type,
        &form.notes,
    )?;

    if accepts_html(&headers) {
        return Ok(Redirect::to("/").into_response());
    }
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

async fn get_stats(State(state): State<AppState>) -> Json<DiaryStats> {
    Json(state.store().stats())
}

/// Browsers submitting the HTML form get redirected back to the page;
/// everything else receives the created entry as JSON.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/entries", get(list_entries).post(create_entry))
        .route("/stats", get(get_stats))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(store: RecordStore, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
    };

    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        tracing::warn!(
            "Listening on {bind} with no authentication. Any device on your network can add entries."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    tracing::info!("Listening on http://{bind}:{port}");
    eprintln!("Web server running at http://{bind}:{port}");
    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use chrono::NaiveDateTime;
    use food_diary_core::FixedClock;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn noon(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn test_state(dir: &TempDir) -> AppState {
        let store =
            RecordStore::open_with_clock(dir.path().join("diary.json"), FixedClock::new(noon(15)));
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn form_post(body: &str) -> axum::http::Request<Body> {
        axum::http::Request::post("/entries")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn create_entry_returns_201_with_entry() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(form_post(
                "food_name=Chicken+Salad&calories=350&meal_type=Lunch&notes=Healthy",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["food_name"], "Chicken Salad");
        assert_eq!(json["calories"], 350);
        assert_eq!(json["meal_type"], "lunch");
        assert_eq!(json["date"], "2024-06-15");
    }

    #[tokio::test]
    async fn create_entry_from_browser_redirects() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let request = axum::http::Request::post("/entries")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", "text/html,application/xhtml+xml")
            .body(Body::from("food_name=Toast&calories=120&meal_type=breakfast"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/");
    }

    #[tokio::test]
    async fn create_entry_validation_error_returns_400() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let app = build_router(state.clone());

        let response = app
            .oneshot(form_post("food_name=Soup&calories=200&meal_type=brunch"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        let msg = json["error"].as_str().unwrap();
        assert!(msg.contains("breakfast, lunch, dinner, snack"));
        assert!(state.store().is_empty());
    }

    #[tokio::test]
    async fn create_entry_oversized_calories_returns_400() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let app = build_router(state.clone());

        let response = app
            .oneshot(form_post(
                "food_name=Feast&calories=99999999999999999999&meal_type=dinner",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Calories must be at most 1000000");
        assert!(state.store().is_empty());
    }

    #[tokio::test]
    async fn create_entry_missing_fields_returns_400() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app.oneshot(form_post("calories=100")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "food name required");
    }

    #[tokio::test]
    async fn persistence_failure_returns_generic_500() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store =
            RecordStore::open_with_clock(blocker.join("diary.json"), FixedClock::new(noon(15)));
        let app = build_router(AppState {
            store: Arc::new(Mutex::new(store)),
        });

        let response = app
            .oneshot(form_post("food_name=Toast&calories=120&meal_type=breakfast"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to save data");
    }

    #[tokio::test]
    async fn list_entries_returns_all() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        {
            let mut store = state.store();
            store.add("Oatmeal", "150", "breakfast", "").unwrap();
            store.add("Soup", "250", "lunch", "").unwrap();
        }
        let app = build_router(state);

        let response = app
            .oneshot(
                axum::http::Request::get("/entries")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["food_name"], "Oatmeal");
        assert_eq!(entries[1]["food_name"], "Soup");
    }

    #[tokio::test]
    async fn list_entries_by_date_returns_summary() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        {
            let mut store = state.store();
            store.add("Oatmeal", "150", "breakfast", "").unwrap();
            store.add("Soup", "250", "lunch", "").unwrap();
        }
        let app = build_router(state);

        let response = app
            .oneshot(
                axum::http::Request::get("/entries?date=2024-06-15")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["date"], "2024-06-15");
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["total_calories"], 400);
        assert_eq!(json["entries"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_entries_unknown_date_is_empty() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                axum::http::Request::get("/entries?date=2020-01-01")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_entries"], 0);
        assert!(json["entries"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_entries_invalid_date_returns_400() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                axum::http::Request::get("/entries?date=15-06-2024")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid date format. Use YYYY-MM-DD");
    }

    #[tokio::test]
    async fn stats_endpoint() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        {
            let mut store = state.store();
            store.add("A", "300", "breakfast", "").unwrap();
            store.add("B", "500", "lunch", "").unwrap();
        }
        let app = build_router(state);

        let response = app
            .oneshot(axum::http::Request::get("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["total_calories"], 800);
        assert_eq!(json["days_tracked"], 1);
        assert_eq!(json["average_calories_per_day"], 800.0);
    }

    #[tokio::test]
    async fn stats_endpoint_empty() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(axum::http::Request::get("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["total_entries"], 0);
        assert_eq!(json["total_calories"], 0);
        assert_eq!(json["days_tracked"], 0);
        assert_eq!(json["average_calories_per_day"], 0.0);
    }

    #[tokio::test]
    async fn index_renders_todays_entries() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state
            .store()
            .add("Pancakes", "420", "breakfast", "")
            .unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(axum::http::Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Pancakes (breakfast)"));
        assert!(html.contains("Total Calories Today: 420"));
    }

    #[tokio::test]
    async fn security_headers_present() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(axum::http::Request::get("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert!(
            response
                .headers()
                .get("content-security-policy")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("default-src 'none'")
        );
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let big_body = format!("food_name={}", "a".repeat(BODY_LIMIT + 1));
        let response = app.oneshot(form_post(&big_body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                axum::http::Request::get("/food/list")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
