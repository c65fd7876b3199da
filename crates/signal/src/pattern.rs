//! Identifier rules for the chains the sniper can target.

use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use thiserror::Error;

/// Base58 alphabet used by Solana addresses (no `0`, `O`, `I`, `l`).
pub const BASE58_ALPHABET: &str = "1-9A-HJ-NP-Za-km-z";

/// Hex alphabet.
pub const HEX_ALPHABET: &str = "A-Fa-f0-9";

// Built once from the literals above; `test_presets_compile` covers them.
static SOLANA: LazyLock<AssetPattern> = LazyLock::new(|| {
    AssetPattern::new(None, BASE58_ALPHABET, 32..=44).expect("valid base58 pattern")
});
static EVM_HEX: LazyLock<AssetPattern> = LazyLock::new(|| {
    AssetPattern::new(Some("0x"), HEX_ALPHABET, 32..=44).expect("valid hex pattern")
});

/// Error building an [`AssetPattern`].
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(#[from] regex::Error),
    #[error("invalid length range {min}..={max}")]
    InvalidRange { min: usize, max: usize },
}

/// Shape of an asset identifier: optional literal prefix, a character class
/// and an inclusive length range for the body.
#[derive(Debug, Clone)]
pub struct AssetPattern {
    prefix: Option<String>,
    min_len: usize,
    max_len: usize,
    regex: Regex,
}

impl AssetPattern {
    /// Builds a pattern from a regex character-class body such as `A-Za-z0-9`.
    ///
    /// # Errors
    /// Returns an error if the class does not compile or the range is empty.
    pub fn new(
        prefix: Option<&str>,
        alphabet: &str,
        len: RangeInclusive<usize>,
    ) -> Result<Self, PatternError> {
        let (min_len, max_len) = (*len.start(), *len.end());
        if min_len == 0 || min_len > max_len {
            return Err(PatternError::InvalidRange {
                min: min_len,
                max: max_len,
            });
        }

        let source = match prefix {
            Some(p) => format!("(?:{})?[{}]+", regex::escape(p), alphabet),
            None => format!("[{}]+", alphabet),
        };

        Ok(Self {
            prefix: prefix.map(str::to_string),
            min_len,
            max_len,
            regex: Regex::new(&source)?,
        })
    }

    /// Solana mint addresses: base58, 32 to 44 characters.
    pub fn solana() -> Self {
        SOLANA.clone()
    }

    /// Hex contract addresses with an optional `0x` prefix.
    pub fn evm_hex() -> Self {
        EVM_HEX.clone()
    }

    /// Plain ASCII alphanumerics within `len`.
    pub fn alphanumeric(len: RangeInclusive<usize>) -> Result<Self, PatternError> {
        Self::new(None, "A-Za-z0-9", len)
    }

    /// Maximal alphabet runs in `text` whose body length is in range, with
    /// their body length.
    pub(crate) fn candidates<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (&'t str, usize)> + 't {
        self.regex.find_iter(text).filter_map(move |m| {
            let matched = m.as_str();
            let body = match &self.prefix {
                Some(p) => matched.strip_prefix(p.as_str()).unwrap_or(matched),
                None => matched,
            };
            let len = body.chars().count();
            (self.min_len..=self.max_len)
                .contains(&len)
                .then_some((matched, len))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_compile() {
        let _ = AssetPattern::solana();
        let _ = AssetPattern::evm_hex();
    }

    #[test]
    fn test_invalid_range() {
        assert!(matches!(
            AssetPattern::alphanumeric(10..=5),
            Err(PatternError::InvalidRange { .. })
        ));
        assert!(AssetPattern::alphanumeric(0..=5).is_err());
    }

    #[test]
    fn test_invalid_alphabet() {
        assert!(matches!(
            AssetPattern::new(None, "z-a", 1..=2),
            Err(PatternError::InvalidAlphabet(_))
        ));
    }

    #[test]
    fn test_overlong_runs_are_not_candidates() {
        let pattern = AssetPattern::solana();
        let signature = "5".repeat(88);
        assert_eq!(pattern.candidates(&signature).count(), 0);
    }
}
