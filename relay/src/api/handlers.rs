use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use tracing::{info, warn};

use super::types::{
    ClaimWalletResponse, CreateSessionRequest, CreateSessionResponse, HealthResponse,
    SessionTokenQuery,
};
use crate::chain::recover_signer;
use crate::config::relay::GAS_PREFUND_WEI;
use crate::enclave;
use crate::engine::errors::RequestError;
use crate::engine::Engine;

pub type AppState = Arc<Engine>;

/// `spec.md` §4.1 "Create session".
pub async fn request_wallet(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateSessionResponse>), RequestError> {
    if body.message.is_empty() || body.signature.is_empty() {
        return Err(RequestError::InvalidInput(
            "message and signature are required".to_string(),
        ));
    }
    let expected_amount: u128 = body.expected_amount.parse().map_err(|_| {
        RequestError::InvalidInput("expectedAmount must be a nonnegative integer".to_string())
    })?;
    if expected_amount == 0 {
        return Err(RequestError::InvalidInput(
            "expectedAmount must be greater than zero".to_string(),
        ));
    }

    let user_address = recover_signer(&body.message, &body.signature)
        .map_err(|e| RequestError::InvalidSignature(e.to_string()))?;

    let material = enclave::generate()?;

    let session = state
        .sessions
        .create(
            user_address,
            expected_amount,
            material.new_address,
            material.encrypted_key_for_user,
            material.attestation_report,
        )
        .await;

    info!(token = %session.session_token, user = %format!("{user_address:#x}"), "session created");

    // Best-effort gas pre-fund (`spec.md` §4.1 step 5): failure is logged,
    // never propagated — the session is still valid.
    let chain = state.chain.clone();
    let new_address = material.new_address;
    tokio::spawn(async move {
        if let Err(err) = chain.submit_gas_funding(new_address, GAS_PREFUND_WEI).await {
            warn!(address = %format!("{new_address:#x}"), "gas pre-fund failed: {err}");
        }
    });

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_token: session.session_token,
            new_address: format!("{:#x}", material.new_address),
        }),
    ))
}

/// `spec.md` §4.1 "Status" — never reveals the wrapped key.
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<SessionTokenQuery>,
) -> Result<Json<crate::types::Session>, RequestError> {
    let session = state
        .sessions
        .get(&query.session_token)
        .await
        .map_err(|_| RequestError::NotFound)?;
    Ok(Json(session))
}

/// `spec.md` §4.1 "Claim wallet" — idempotent, permitted in all
/// post-creation states.
pub async fn claim_wallet(
    State(state): State<AppState>,
    Query(query): Query<SessionTokenQuery>,
) -> Result<Json<ClaimWalletResponse>, RequestError> {
    let session = state
        .sessions
        .get(&query.session_token)
        .await
        .map_err(|_| RequestError::NotFound)?;

    if session.encrypted_key_for_user.is_empty() || session.attestation_report.is_empty() {
        return Err(RequestError::InvalidState);
    }

    Ok(Json(ClaimWalletResponse {
        new_address: format!("{:#x}", session.new_address),
        encrypted_key_for_user: session.encrypted_key_for_user,
        attestation_report: session.attestation_report,
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
