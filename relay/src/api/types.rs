use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub message: String,
    pub signature: String,
    pub expected_amount: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_token: String,
    pub new_address: String,
}

#[derive(Deserialize)]
pub struct SessionTokenQuery {
    #[serde(rename = "sessionToken")]
    pub session_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimWalletResponse {
    pub new_address: String,
    pub encrypted_key_for_user: String,
    pub attestation_report: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
