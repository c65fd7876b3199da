//! Local keypair signer.

use crate::capabilities::{SignedTransaction, SignerError, TransactionSigner, UnsignedTransaction};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use zeroize::Zeroizing;

/// Signs venue transactions with an in-process keypair.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Parses a secret key given either as base58 or as a JSON byte array
    /// (the `solana-keygen` file format).
    ///
    /// # Errors
    /// Fails if the secret is malformed.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        let bytes: Zeroizing<Vec<u8>> = if secret.starts_with('[') {
            Zeroizing::new(
                serde_json::from_str::<Vec<u8>>(secret).context("secret is not a byte array")?,
            )
        } else {
            Zeroizing::new(
                bs58::decode(secret)
                    .into_vec()
                    .context("secret is not valid base58")?,
            )
        };
        if bytes.len() != 64 {
            bail!("secret key must be 64 bytes, got {}", bytes.len());
        }
        let keypair = Keypair::try_from(bytes.as_slice()).context("invalid keypair bytes")?;
        Ok(Self::new(keypair))
    }

    /// Public key of the signing wallet.
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        let unsigned: VersionedTransaction = bincode::deserialize(&tx.0)
            .map_err(|e| SignerError(format!("undecodable transaction: {e}")))?;
        let signed = VersionedTransaction::try_new(unsigned.message, &[&self.keypair])
            .map_err(|e| SignerError(e.to_string()))?;
        let bytes =
            bincode::serialize(&signed).map_err(|e| SignerError(format!("encode failed: {e}")))?;
        Ok(SignedTransaction(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_formats() {
        let keypair = Keypair::new();
        let expected = keypair.pubkey();
        let bytes = keypair.to_bytes();

        let base58 = bs58::encode(bytes).into_string();
        assert_eq!(KeypairSigner::from_secret(&base58).unwrap().pubkey(), expected);

        let json = serde_json::to_string(&bytes.to_vec()).unwrap();
        assert_eq!(KeypairSigner::from_secret(&json).unwrap().pubkey(), expected);
    }

    #[test]
    fn test_bad_secret() {
        assert!(KeypairSigner::from_secret("not-base58-0OIl").is_err());
        assert!(KeypairSigner::from_secret("[1,2,3]").is_err());
    }

    #[tokio::test]
    async fn test_garbage_transaction_is_signer_error() {
        let signer = KeypairSigner::new(Keypair::new());
        let err = signer
            .sign(UnsignedTransaction(vec![0xff; 3]))
            .await
            .unwrap_err();
        assert!(err.0.contains("undecodable"));
    }
}
