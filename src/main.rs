// ============================================================================
// LOTTERY POOL — STAKED ROUNDS, OPERATOR DRAWS
// ============================================================================
//
// One pool, one operator:
//   1. ENTER:  any address joins the round with a positive stake
//   2. DRAW:   operator picks a uniform winner, whole pot pays out
//   3. RESET:  operator can abandon a round without a draw
//
// Custody: in-memory ledger account for the pool (stakes in, pot out)
// Randomness: OS entropy, drawn only at settlement time
//
// Run:  cargo run
// Test: curl http://localhost:8080/health

// ============================================================================
// IMPORTS
// ============================================================================

use std::net::SocketAddr;

use tokio::signal;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use lottery_pool::{
    InMemoryLedger, LotteryError, LotteryPool, OsRandomness, SharedLottery, MIN_PLAYERS,
};

// ============================================================================
// CONSTANTS
// ============================================================================

const VERSION: &str = "1.0.0";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_OPERATOR: &str = "bb_operator";
const DEFAULT_POOL_ACCOUNT: &str = "pool_vault";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub lottery: SharedLottery<InMemoryLedger, OsRandomness>,
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

fn error_response(err: LotteryError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        LotteryError::Unauthorized => StatusCode::FORBIDDEN,
        LotteryError::DuplicateEntry(_) => StatusCode::CONFLICT,
        LotteryError::InsufficientPlayers { .. } => StatusCode::CONFLICT,
        LotteryError::InvalidStake => StatusCode::BAD_REQUEST,
        LotteryError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        LotteryError::LedgerFailure(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

// ============================================================================
// HEALTH & STATUS
// ============================================================================

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.lottery.stats();
    Json(serde_json::json!({
        "status": "healthy",
        "version": VERSION,
        "service": "lottery-pool",
        "operator": state.lottery.operator(),
        "pool": {
            "players": stats.current_players,
            "min_players": stats.min_players,
            "rounds_completed": stats.rounds_completed,
        }
    }))
}

/// GET /stats
async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.lottery.stats();
    Json(serde_json::json!({
        "pool": stats,
        "winners_recorded": state.lottery.winner_count(),
    }))
}

// ============================================================================
// ROUND READS
// ============================================================================

#[derive(Deserialize)]
struct CallerQuery {
    caller: String,
}

/// GET /pot?caller=<operator> — Current pot, operator only
async fn pot_handler(
    State(state): State<AppState>,
    Query(query): Query<CallerQuery>,
) -> impl IntoResponse {
    match state.lottery.get_balance(&query.caller) {
        Ok(pot) => (
            StatusCode::OK,
            Json(serde_json::json!({ "pot": pot })),
        ),
        Err(e) => error_response(e),
    }
}

/// GET /players/count
async fn player_count_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "count": state.lottery.get_player_count() }))
}

/// GET /players/{index}
async fn player_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    match state.lottery.get_player(index) {
        Ok(entrant) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "index": index,
                "address": entrant.address,
                "stake": entrant.stake,
            })),
        ),
        Err(e) => error_response(e),
    }
}

/// GET /winners/{index}
async fn winner_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    match state.lottery.get_winner(index) {
        Ok(record) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "index": index,
                "round": record.round,
                "address": record.address,
                "amount": record.amount,
                "entrants": record.entrants,
                "settled_at": record.settled_at,
            })),
        ),
        Err(e) => error_response(e),
    }
}

/// GET /ledger/{address} — Ledger balance lookup
async fn ledger_balance_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let balance = state.lottery.ledger_balance_of(&address);
    Json(serde_json::json!({
        "address": address,
        "balance": balance,
    }))
}

// ============================================================================
// ROUND MUTATIONS
// ============================================================================

#[derive(Deserialize)]
struct EnterRequest {
    address: String,
    stake: u64,
}

/// POST /enter — Join the current round with a stake
async fn enter_handler(
    State(state): State<AppState>,
    Json(req): Json<EnterRequest>,
) -> impl IntoResponse {
    if req.address.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Address must not be empty" })),
        );
    }

    match state.lottery.enter(&req.address, req.stake) {
        Ok(position) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "address": req.address,
                "position": position,
                "players": state.lottery.get_player_count(),
            })),
        ),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct OperatorRequest {
    caller: String,
}

/// POST /pick-winner — Draw and pay a winner (operator only)
async fn pick_winner_handler(
    State(state): State<AppState>,
    Json(req): Json<OperatorRequest>,
) -> impl IntoResponse {
    match state.lottery.pick_winner(&req.caller) {
        Ok(record) => {
            info!("🎰 Round {} settled: {} wins {}", record.round, record.address, record.amount);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "round": record.round,
                    "winner": record.address,
                    "amount": record.amount,
                    "entrants": record.entrants,
                })),
            )
        }
        Err(e) => error_response(e),
    }
}

/// POST /reset — Abandon the current round (operator only)
async fn reset_handler(
    State(state): State<AppState>,
    Json(req): Json<OperatorRequest>,
) -> impl IntoResponse {
    match state.lottery.reset_game(&req.caller) {
        Ok(discarded) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "discarded": discarded,
            })),
        ),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/players/count", get(player_count_handler))
        .route("/players/{index}", get(player_handler))
        .route("/winners/{index}", get(winner_handler))
        .route("/ledger/{address}", get(ledger_balance_handler))
        // Operator reads
        .route("/pot", get(pot_handler))
        // Mutations
        .route("/enter", post(enter_handler))
        .route("/pick-winner", post(pick_winner_handler))
        .route("/reset", post(reset_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// GRACEFUL SHUTDOWN
// ============================================================================

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("🛑 Shutdown signal received");
}

// ============================================================================
// MAIN
// ============================================================================

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // 1. Logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,lottery_pool=debug")))
        .with(tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true))
        .init();

    let operator = env_or("LOTTERY_OPERATOR", DEFAULT_OPERATOR);
    let pool_account = env_or("LOTTERY_POOL_ACCOUNT", DEFAULT_POOL_ACCOUNT);
    let bind = env_or("LOTTERY_BIND", DEFAULT_BIND);

    info!("╔══════════════════════════════════════════════════════╗");
    info!("║             LOTTERY POOL — STAKED ROUNDS             ║");
    info!("╠══════════════════════════════════════════════════════╣");
    info!("║  Version:   {}                                    ║", VERSION);
    info!("║  Draws:     uniform over entrants, full-pot payout   ║");
    info!("║  Quorum:    {} players minimum                        ║", MIN_PLAYERS);
    info!("╚══════════════════════════════════════════════════════╝");
    info!("🎟️  Operator: {}", operator);
    info!("🏦 Pool account: {}", pool_account);

    // 2. Pool
    let pool = LotteryPool::new(
        operator,
        pool_account,
        InMemoryLedger::new(),
        OsRandomness::new(),
    );
    let state = AppState {
        lottery: SharedLottery::new(pool),
    };

    // 3. HTTP Server
    let app = build_router(state);
    let addr: SocketAddr = bind.parse().expect("Invalid LOTTERY_BIND address");

    info!("");
    info!("🚀 Listening on http://{}", addr);
    info!("");
    info!("📡 ENDPOINTS:");
    info!("   GET  /health                    Health check");
    info!("   GET  /stats                     Pool statistics");
    info!("   GET  /players/count             Entrants this round");
    info!("   GET  /players/{{index}}           Entrant by position");
    info!("   GET  /winners/{{index}}           Settled round by index");
    info!("   GET  /ledger/{{address}}          Ledger balance");
    info!("   GET  /pot?caller=<op>           Current pot (operator)");
    info!("   POST /enter                     Join with a stake");
    info!("   POST /pick-winner               Draw a winner (operator)");
    info!("   POST /reset                     Abandon round (operator)");
    info!("");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("✅ Server shutdown complete");
}
