use serde::{Deserialize, Serialize};
use std::fmt;

/// Mint address of wrapped SOL, the base asset of every swap.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Opaque identifier of a tradable asset (a token mint on Solana).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Wrapped SOL.
    pub fn wrapped_sol() -> Self {
        Self(WSOL_MINT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
