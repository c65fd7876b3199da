//! Trade lifecycle events and their broadcast bus.

mod events;
mod tracker;

pub use events::*;
pub use tracker::*;
