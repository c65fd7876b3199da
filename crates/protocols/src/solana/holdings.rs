//! Token balance lookups over RPC.

use crate::capabilities::{HoldingsError, HoldingsSource};
use crate::rpc::RpcProvider;
use async_trait::async_trait;
use sniper_domain::AssetId;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// SPL token program ID.
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Token-2022 program ID.
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated token program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Derives the associated token account of `owner` for `mint`.
pub fn derive_ata(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    let (ata, _bump) = Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    );
    ata
}

/// Token program that owns a mint account, if it is one we can hold.
pub fn token_program_for(mint_owner: &Pubkey) -> Option<Pubkey> {
    [TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID]
        .into_iter()
        .find(|program| program == mint_owner)
}

/// Reads the wallet's associated token account balance.
///
/// The mint account is fetched first so the ATA is derived under the
/// program that actually owns the mint (classic SPL Token or Token-2022).
pub struct RpcHoldings {
    provider: Arc<RpcProvider>,
    owner: Pubkey,
}

impl RpcHoldings {
    pub fn new(provider: Arc<RpcProvider>, owner: Pubkey) -> Self {
        Self { provider, owner }
    }
}

#[async_trait]
impl HoldingsSource for RpcHoldings {
    async fn balance(&self, asset: &AssetId) -> Result<u64, HoldingsError> {
        let mint = Pubkey::from_str(asset.as_str())
            .map_err(|e| HoldingsError(format!("invalid mint {asset}: {e}")))?;
        let client = self.provider.client();

        let mint_account = client
            .get_account(&mint)
            .await
            .map_err(|e| HoldingsError(format!("mint {asset} lookup failed: {e}")))?;
        let token_program = token_program_for(&mint_account.owner).ok_or_else(|| {
            HoldingsError(format!(
                "{asset} is owned by {}, not a token program",
                mint_account.owner
            ))
        })?;
        let ata = derive_ata(&self.owner, &mint, &token_program);

        match client.get_token_account_balance(&ata).await {
            Ok(balance) => {
                debug!(
                    asset = %asset,
                    ata = %ata,
                    program = %token_program,
                    amount = %balance.amount,
                    "Fetched holding"
                );
                balance
                    .amount
                    .parse::<u64>()
                    .map_err(|e| HoldingsError(format!("bad balance {}: {e}", balance.amount)))
            }
            // No token account means nothing was ever bought.
            Err(e) if e.to_string().contains("could not find account") => Ok(0),
            Err(e) => Err(HoldingsError(e.to_string())),
        }
    }
}
