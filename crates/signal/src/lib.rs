//! Candidate asset extraction from free text.
//!
//! Signals arrive as arbitrary chat messages. The extractor scans them for
//! tokens that look like an asset identifier on the target chain and picks
//! the most plausible one.

/// Asset identifier patterns per chain.
pub mod pattern;
/// The extractor itself.
pub mod extractor;

pub use extractor::SignalExtractor;
pub use pattern::{AssetPattern, PatternError};
