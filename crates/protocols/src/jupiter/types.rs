//! Wire types of the Jupiter swap API.

use serde::{Deserialize, Serialize};

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Body of `POST /swap`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Quote returned by `GET /quote`, passed back verbatim.
    pub quote_response: serde_json::Value,
    pub user_public_key: String,
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
}

/// Response of `POST /swap`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 serialized `VersionedTransaction`.
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: Option<u64>,
}
