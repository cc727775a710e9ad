//! REST API for the pallet planner.
//!
//! Exposes the planner over HTTP with Axum, including a Server-Sent Events
//! variant that streams packing progress. CORS is permissive.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::ApiConfig;
use crate::metrics::{CenterOfGravity, LayerSummary, LoadMetrics, Utilization};
use crate::model::{BoxType, Dimensions, PalletStandard, PlacedBox, Position, RotationPolicy};
use crate::optimizer::PackEvent;
use crate::planner::{
    PalletDimensions, PalletPlan, PalletRequest, PlannerConfig, UnplacedEntry, plan_pallet,
    plan_pallet_with_progress,
};

#[derive(Clone)]
struct ApiState {
    planner_config: PlannerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>pallet-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn parse_plan_request(
    payload: Result<Json<PalletRequest>, JsonRejection>,
) -> Result<PalletRequest, Response> {
    let Json(request) = payload.map_err(json_deserialize_error)?;
    request
        .validate()
        .map_err(|err| validation_error(err.to_string()))?;
    Ok(request)
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_plan, handle_plan_stream),
    components(
        schemas(
            PalletRequest,
            PalletStandard,
            BoxType,
            RotationPolicy,
            PalletPlan,
            PlacedBox,
            Position,
            Dimensions,
            UnplacedEntry,
            Utilization,
            CenterOfGravity,
            LoadMetrics,
            LayerSummary,
            PalletDimensions,
            PackEvent,
            ErrorResponse
        )
    ),
    tags((name = "planning", description = "Endpoints for pallet load planning"))
)]
struct ApiDoc;

fn router(planner_config: PlannerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pallet", post(handle_plan))
        .route("/pallet_stream", post(handle_plan_stream))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(ApiState { planner_config })
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(config: ApiConfig, planner_config: PlannerConfig) {
    let app = router(planner_config);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Could not bind API server to {}: {}", addr, err);
            return;
        }
    };

    println!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        println!("💡 Local access: http://localhost:{}", config.port());
    }
    println!("📦 API Endpoints:");
    println!("   - POST /pallet");
    println!("   - POST /pallet_stream");
    println!("📑 Documentation:");
    println!("   - GET /docs");
    println!("   - GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for POST /pallet.
///
/// Plans a single pallet load and returns placements, metrics and warnings.
#[utoipa::path(
    post,
    path = "/pallet",
    request_body = PalletRequest,
    responses(
        (status = 200, description = "Pallet load planned", body = PalletPlan),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Malformed JSON or invalid box catalogue",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_plan(
    State(state): State<ApiState>,
    payload: Result<Json<PalletRequest>, JsonRejection>,
) -> Response {
    let request = match parse_plan_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    println!(
        "📥 New pallet request: {} box types, {} boxes",
        request.boxes.len(),
        request.boxes.iter().map(|b| u64::from(b.quantity)).sum::<u64>()
    );
    let plan = plan_pallet(&request, &state.planner_config);
    println!(
        "📦 Result: {} placed, {} unplaced, {:.1}% volume",
        plan.placed.len(),
        plan.unplaced_count(),
        plan.utilization.volume_percent
    );

    (StatusCode::OK, Json(plan)).into_response()
}

/// Handler for POST /pallet_stream (SSE).
///
/// Streams `PackEvent`s as they happen. The last event is `Finished`.
#[utoipa::path(
    post,
    path = "/pallet_stream",
    request_body = PalletRequest,
    responses(
        (
            status = 200,
            description = "Streams packing events in real-time",
            content_type = "text/event-stream",
            body = PackEvent
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Malformed JSON or invalid box catalogue",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_plan_stream(
    State(state): State<ApiState>,
    payload: Result<Json<PalletRequest>, JsonRejection>,
) -> Response {
    let request = match parse_plan_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (tx, rx) = mpsc::channel::<String>(32);
    let planner_config = state.planner_config;

    tokio::task::spawn_blocking(move || {
        let mut receiver_open = true;
        plan_pallet_with_progress(&request, &planner_config, |evt| {
            if !receiver_open {
                return;
            }
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver means the client went away.
                receiver_open = tx.blocking_send(json).is_ok();
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
