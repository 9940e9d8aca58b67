use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    sync::Mutex,
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use oven_common::{
    estimate, CommandOutcome, CookSpec, FoodKind, RateTable, RuntimeConfig, SessionEngine,
};

use crate::client::DeviceClient;
use crate::notify::{dispatch, LogNotifier, Notifier};

#[derive(Clone)]
struct AppState {
    engine: Arc<Mutex<SessionEngine>>,
    client: DeviceClient,
    notifier: Arc<dyn Notifier>,
    rates: Arc<RateTable>,
    ticker: Arc<Mutex<Option<TickerTask>>>,
}

/// At most one of these exists per session; starting a replacement first
/// cancels the old one, so two tickers can never race the same display.
struct TickerTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct EstimateRequest {
    #[serde(rename = "foodType")]
    food: FoodKind,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(rename = "manualMinutes", default)]
    manual_minutes: Option<f64>,
}

#[derive(Debug, Serialize)]
struct EstimateResponse {
    seconds: u32,
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    seconds: u32,
    #[serde(rename = "foodType", default)]
    food: Option<FoodKind>,
    #[serde(default)]
    weight: Option<f64>,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut runtime = load_runtime_config().unwrap_or_else(|err| {
        warn!("failed to load runtime config: {err:#}");
        RuntimeConfig::default()
    });
    if let Ok(base_url) = std::env::var("OVEN_BASE_URL") {
        runtime.client.base_url = base_url;
    }
    if let Some(port) = std::env::var("OVEN_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
    {
        runtime.client.http_port = port;
    }
    runtime.sanitize();

    let app_state = AppState {
        engine: Arc::new(Mutex::new(SessionEngine::new())),
        client: DeviceClient::new(&runtime.client)?,
        notifier: Arc::new(LogNotifier),
        rates: Arc::new(runtime.rates.clone()),
        ticker: Arc::new(Mutex::new(None)),
    };

    spawn_status_poll_loop(
        app_state.clone(),
        Duration::from_millis(runtime.client.status_poll_interval_ms),
    );
    spawn_temperature_poll_loop(
        app_state.clone(),
        Duration::from_millis(runtime.client.temperature_poll_interval_ms),
    );

    let web_root = format!("{}/web", env!("CARGO_MANIFEST_DIR"));
    let app = api_router(app_state).fallback_service(ServeDir::new(web_root));

    let addr: SocketAddr = format!("0.0.0.0:{}", runtime.client.http_port).parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind console server at {addr}"))?;

    info!(
        "console listening on http://{addr}, polling {}",
        runtime.client.base_url
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn api_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(handle_get_status))
        .route("/api/estimate", post(handle_post_estimate))
        .route("/api/start", post(handle_post_start))
        .route("/api/stop", post(handle_post_stop))
        .with_state(app_state)
}

fn load_runtime_config() -> anyhow::Result<RuntimeConfig> {
    let Ok(path) = std::env::var("OVEN_CONFIG") else {
        return Ok(RuntimeConfig::default());
    };
    let raw =
        std::fs::read(&path).with_context(|| format!("failed to read config at {path}"))?;
    Ok(serde_json::from_slice(&raw)?)
}

fn spawn_status_poll_loop(app_state: AppState, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            poll_status_once(&app_state).await;
        }
    });
}

fn spawn_temperature_poll_loop(app_state: AppState, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let reading = app_state.client.poll_temperature().await;
            app_state.engine.lock().await.update_temperature(reading);
        }
    });
}

/// One full poll step: fetch, reconcile, notify edges, align the ticker with
/// the mode the reconciler landed on.
async fn poll_status_once(app_state: &AppState) {
    let poll = app_state.client.poll_status().await;
    let events = {
        let mut engine = app_state.engine.lock().await;
        engine.reconcile(poll)
    };

    dispatch(app_state.notifier.as_ref(), &events);
    sync_ticker(app_state).await;
}

async fn sync_ticker(app_state: &AppState) {
    let running = { app_state.engine.lock().await.is_running() };
    let mut slot = app_state.ticker.lock().await;

    if running && slot.is_none() {
        *slot = Some(start_ticker(app_state.engine.clone()));
    } else if !running {
        if let Some(task) = slot.take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }
}

fn start_ticker(engine: Arc<Mutex<SessionEngine>>) -> TickerTask {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; consume it so the
        // freshly seeded display holds for a full second.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    engine.lock().await.tick();
                }
            }
        }
    });

    TickerTask { cancel, handle }
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = {
        let engine = state.engine.lock().await;
        engine.status(Utc::now().timestamp())
    };
    Json(status)
}

async fn handle_post_estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> impl IntoResponse {
    let spec = CookSpec {
        food: request.food,
        weight_grams: request.weight,
        manual_minutes: request.manual_minutes,
    };

    match estimate(&spec, &state.rates) {
        Ok(seconds) => Json(EstimateResponse { seconds }).into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn handle_post_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> impl IntoResponse {
    // Rejected locally; a zero-length cycle never reaches the network.
    if request.seconds == 0 {
        return error_response(StatusCode::BAD_REQUEST, "cook duration must be positive");
    }

    {
        let mut engine = state.engine.lock().await;
        if engine.is_pending_command() {
            return error_response(StatusCode::CONFLICT, "another command is in flight");
        }
        engine.begin_command();
    }

    let context = request.food.map(|food| CookSpec {
        food,
        weight_grams: request.weight,
        manual_minutes: None,
    });
    let outcome = state
        .client
        .start_cooking(request.seconds, context.as_ref())
        .await;

    let events = {
        let mut engine = state.engine.lock().await;
        engine.finish_start(outcome.clone())
    };
    dispatch(state.notifier.as_ref(), &events);

    match outcome {
        CommandOutcome::Accepted => {
            // Reflect the new mode right away instead of waiting out the
            // poll interval.
            poll_status_once(&state).await;
            handle_get_status(State(state)).await.into_response()
        }
        CommandOutcome::Rejected(reason) => {
            warn!("start cooking rejected: {reason}");
            error_response(StatusCode::BAD_GATEWAY, &reason)
        }
    }
}

async fn handle_post_stop(State(state): State<AppState>) -> impl IntoResponse {
    {
        let mut engine = state.engine.lock().await;
        if engine.is_pending_command() {
            return error_response(StatusCode::CONFLICT, "another command is in flight");
        }
        engine.begin_command();
    }

    let outcome = state.client.stop_cooking().await;

    let events = {
        let mut engine = state.engine.lock().await;
        engine.finish_stop(outcome.clone())
    };
    dispatch(state.notifier.as_ref(), &events);

    match outcome {
        CommandOutcome::Accepted => {
            poll_status_once(&state).await;
            handle_get_status(State(state)).await.into_response()
        }
        CommandOutcome::Rejected(reason) => {
            warn!("stop cooking rejected: {reason}");
            error_response(StatusCode::BAD_GATEWAY, &reason)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
