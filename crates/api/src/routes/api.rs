use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use analytics::query;
use common::{now_ts, AveragedPoint, Candle, Resolution, TableRow};

use crate::{auth::require_basic_auth, ApiError, AppState};

pub fn api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/table", get(get_table))
        .route("/api/arrays/:resolution/:crypto", get(get_arrays))
        .route("/api/ohlc/:resolution/:crypto", get(get_ohlc))
        .route_layer(middleware::from_fn_with_state(state, require_basic_auth))
}

// ─── Table ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TableResponse {
    rows: Vec<TableRow>,
}

async fn get_table(State(state): State<AppState>) -> Result<Json<TableResponse>, ApiError> {
    let rows = query::table(state.store.as_ref(), &state.instruments, now_ts()).await?;
    Ok(Json(TableResponse { rows }))
}

// ─── Series ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ArraysResponse {
    crypto: String,
    resolution: Resolution,
    points: Vec<AveragedPoint>,
}

async fn get_arrays(
    State(state): State<AppState>,
    Path((resolution, crypto)): Path<(String, String)>,
) -> Result<Json<ArraysResponse>, ApiError> {
    let resolution: Resolution = resolution.parse()?;
    let crypto = crypto.to_uppercase();
    let points = query::series(state.store.as_ref(), &crypto, resolution, now_ts()).await?;
    Ok(Json(ArraysResponse {
        crypto,
        resolution,
        points,
    }))
}

// ─── OHLC ─────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct OhlcResponse {
    crypto: String,
    resolution: Resolution,
    candles: Vec<Candle>,
}

async fn get_ohlc(
    State(state): State<AppState>,
    Path((resolution, crypto)): Path<(String, String)>,
) -> Result<Json<OhlcResponse>, ApiError> {
    let resolution: Resolution = resolution.parse()?;
    let crypto = crypto.to_uppercase();
    let candles = query::ohlc(state.store.as_ref(), &crypto, resolution, now_ts()).await?;
    Ok(Json(OhlcResponse {
        crypto,
        resolution,
        candles,
    }))
}
