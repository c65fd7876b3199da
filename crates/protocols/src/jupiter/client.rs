//! Jupiter HTTP client.

use super::types::{ApiError, SwapRequest, SwapResponse};
use crate::capabilities::{QuoteRequest, SwapError, SwapVenue, UnsignedTransaction};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::{debug, info};

/// Default Jupiter swap API base URL.
pub const JUPITER_API_URL: &str = "https://lite-api.jup.ag/swap/v1";

/// Error codes meaning the venue will never route this asset.
const NOT_TRADABLE_CODES: [&str; 3] = [
    "TOKEN_NOT_TRADABLE",
    "COULD_NOT_FIND_ANY_ROUTE",
    "NO_ROUTES_FOUND",
];

/// Configuration for the Jupiter client.
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// API base URL.
    pub base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Let the API wrap and unwrap SOL around the swap.
    pub wrap_and_unwrap_sol: bool,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            base_url: JUPITER_API_URL.to_string(),
            timeout: Duration::from_secs(15),
            wrap_and_unwrap_sol: true,
        }
    }
}

/// Swap venue backed by the Jupiter aggregator.
pub struct JupiterClient {
    http: Client,
    config: JupiterConfig,
    /// Wallet the swap transactions are built for.
    user: Pubkey,
}

impl JupiterClient {
    /// Creates a client building transactions for `user`.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: JupiterConfig, user: Pubkey) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config, user })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn fetch_quote(&self, request: &QuoteRequest) -> Result<serde_json::Value, SwapError> {
        let response = self
            .http
            .get(self.url("quote"))
            .query(&[
                ("inputMint", request.input.to_string()),
                ("outputMint", request.output.to_string()),
                ("amount", request.amount.to_string()),
                ("slippageBps", request.slippage_bps.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SwapError::Other(format!("quote request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SwapError::Other(format!("quote body unreadable: {e}")))?;
        if !status.is_success() {
            return Err(classify_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| SwapError::Other(format!("bad quote: {e}")))
    }

    async fn build_swap(&self, quote: serde_json::Value) -> Result<Vec<u8>, SwapError> {
        let body = SwapRequest {
            quote_response: quote,
            user_public_key: self.user.to_string(),
            wrap_and_unwrap_sol: self.config.wrap_and_unwrap_sol,
            dynamic_compute_unit_limit: true,
        };

        let response = self
            .http
            .post(self.url("swap"))
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapError::Other(format!("swap request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SwapError::Other(format!("swap body unreadable: {e}")))?;
        if !status.is_success() {
            return Err(classify_error(status, &text));
        }

        let swap: SwapResponse = serde_json::from_str(&text)
            .map_err(|e| SwapError::Other(format!("bad swap response: {e}")))?;
        debug!(
            last_valid_block_height = ?swap.last_valid_block_height,
            "Swap transaction built"
        );
        STANDARD
            .decode(swap.swap_transaction.as_bytes())
            .map_err(|e| SwapError::Other(format!("swap transaction not base64: {e}")))
    }
}

#[async_trait]
impl SwapVenue for JupiterClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<UnsignedTransaction, SwapError> {
        info!(
            input = %request.input,
            output = %request.output,
            amount = request.amount,
            slippage_bps = request.slippage_bps,
            "Requesting Jupiter quote"
        );
        let quote = self.fetch_quote(request).await?;
        let bytes = self.build_swap(quote).await?;
        Ok(UnsignedTransaction(bytes))
    }
}

/// Maps an error response to a [`SwapError`].
pub(crate) fn classify_error(status: StatusCode, body: &str) -> SwapError {
    let parsed: ApiError = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .clone()
        .unwrap_or_else(|| body.trim().to_string());

    let code_says_untradable = parsed
        .error_code
        .as_deref()
        .is_some_and(|code| NOT_TRADABLE_CODES.contains(&code));
    if code_says_untradable || message.to_lowercase().contains("not tradable") {
        return SwapError::NotTradable(message);
    }
    SwapError::Other(format!("{status}: {message}"))
}
