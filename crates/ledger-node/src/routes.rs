use crate::{
    constants::{MSG_BLOCK_FORGED, MSG_CHAIN_AUTHORITATIVE, MSG_CHAIN_REPLACED, MSG_NODES_ADDED},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{
    constants::{REWARD_AMOUNT, REWARD_SENDER},
    Amount, Block, ChainResponse, HashedBlock, LedgerError,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or malformed values in request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("mining aborted: node is shutting down")]
    MiningCancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::Ledger(LedgerError::InvalidAddress(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MiningCancelled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Ledger(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub block: HashedBlock,
}

#[derive(Serialize, Deserialize)]
pub struct TxIn {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

#[derive(Serialize, Deserialize)]
pub struct TxAccepted {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterIn {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterOut {
    pub message: String,
    pub total_nodes: Vec<String>,
    pub rejected: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ResolveOut {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<HashedBlock>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/chain", get(full_chain))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".into(),
    })
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let strategy = state.strategy;
    let block = mine_with(&state, move |last_proof, cancel| {
        strategy.search(last_proof, cancel)
    })
    .await?;
    Ok(Json(MineResponse {
        message: MSG_BLOCK_FORGED.into(),
        block,
    }))
}

/// Run `search` off the async runtime, then credit the reward and forge the
/// block under the write lock. If the tip changed while searching (another
/// mine or a chain replacement), the proof is stale and `search` runs again
/// against the new tip.
pub async fn mine_with<S>(state: &AppState, search: S) -> Result<HashedBlock, ApiError>
where
    S: Fn(u64, &AtomicBool) -> Option<u64> + Clone + Send + 'static,
{
    loop {
        let (last_proof, tip_hash) = {
            let ledger = state.ledger.read().await;
            let tip = ledger.last_block();
            (tip.proof, tip.hash())
        };

        let cancel = state.shutdown.clone();
        let search = search.clone();
        let proof = tokio::task::spawn_blocking(move || search(last_proof, &cancel))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .ok_or(ApiError::MiningCancelled)?;

        let mut ledger = state.ledger.write().await;
        if ledger.last_block().hash() != tip_hash {
            debug!(last_proof, proof, "tip moved during proof search, mining again");
            continue;
        }
        ledger.new_transaction(REWARD_SENDER, &*state.node_id, REWARD_AMOUNT);
        let block = ledger.new_block(proof, None).hashed();
        info!(index = block.index, hash = %block.hash, "forged block");
        return Ok(block);
    }
}

async fn new_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TxIn>, JsonRejection>,
) -> Result<(StatusCode, Json<TxAccepted>), ApiError> {
    let Json(tx) = payload?;
    let index = state
        .ledger
        .write()
        .await
        .new_transaction(tx.sender, tx.recipient, tx.amount);
    Ok((
        StatusCode::CREATED,
        Json(TxAccepted {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    ))
}

async fn full_chain(State(state): State<AppState>) -> Json<ChainResponse> {
    Json(state.ledger.read().await.chain_response())
}

/// Registers every parseable address. The request fails only when a list was
/// given and none of it could be registered.
async fn register_nodes(
    State(state): State<AppState>,
    payload: Result<Json<RegisterIn>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterOut>), ApiError> {
    let Json(body) = payload?;
    let nodes = body
        .nodes
        .ok_or_else(|| ApiError::BadRequest("please supply a valid list of nodes".into()))?;

    let mut ledger = state.ledger.write().await;
    let mut rejected = Vec::new();
    let mut last_error = None;
    for node in &nodes {
        if let Err(err) = ledger.register_peer(node) {
            rejected.push(node.clone());
            last_error = Some(err);
        }
    }
    match last_error {
        Some(err) if rejected.len() == nodes.len() => return Err(err.into()),
        _ => {}
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterOut {
            message: MSG_NODES_ADDED.into(),
            total_nodes: ledger.peers().to_vec(),
            rejected,
        }),
    ))
}

/// Peers are fetched without holding the ledger lock.
async fn resolve(State(state): State<AppState>) -> Json<ResolveOut> {
    let (peers, local_len) = {
        let ledger = state.ledger.read().await;
        (ledger.peers().to_vec(), ledger.len())
    };

    let best = state.resolver.best_chain(&peers, local_len).await;
    let replaced = adopt_chain(&state, best).await;

    let message = if replaced {
        MSG_CHAIN_REPLACED
    } else {
        MSG_CHAIN_AUTHORITATIVE
    };
    Json(ResolveOut {
        message: message.into(),
        replaced,
        chain: state.ledger.read().await.chain_response().chain,
    })
}

/// Install a chain picked by the resolver. Length and validity are checked
/// again under the write lock, since the local chain may have grown since
/// the peers were polled.
pub async fn adopt_chain(state: &AppState, best: Option<Vec<Block>>) -> bool {
    let mut ledger = state.ledger.write().await;
    best.is_some_and(|chain| ledger.replace_chain(chain))
}
