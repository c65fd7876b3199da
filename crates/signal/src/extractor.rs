//! Signal extractor.

use crate::pattern::AssetPattern;
use sniper_domain::AssetId;

/// Pulls a candidate asset identifier out of free text.
///
/// Stateless apart from the compiled pattern, so one instance can be shared
/// across any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    pattern: AssetPattern,
}

impl SignalExtractor {
    pub fn new(pattern: AssetPattern) -> Self {
        Self { pattern }
    }

    /// Returns the longest candidate in `text`, the first one on ties.
    pub fn extract(&self, text: &str) -> Option<AssetId> {
        let mut best: Option<(&str, usize)> = None;
        for (candidate, len) in self.pattern.candidates(text) {
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((candidate, len));
            }
        }
        best.map(|(candidate, _)| AssetId::new(candidate))
    }
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new(AssetPattern::solana())
    }
}
