//! Solana adapters for the signing, broadcasting and holdings capabilities.

mod broadcaster;
mod holdings;
mod signer;

pub use broadcaster::RpcBroadcaster;
pub use holdings::{
    ASSOCIATED_TOKEN_PROGRAM_ID, RpcHoldings, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID, derive_ata,
    token_program_for,
};
pub use signer::KeypairSigner;
