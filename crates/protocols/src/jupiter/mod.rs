//! Jupiter aggregator adapter.
//!
//! Quotes a route with `GET /quote` and asks `POST /swap` to build the
//! transaction for it.

mod client;
mod types;

pub use client::{JUPITER_API_URL, JupiterClient, JupiterConfig};
pub use types::{ApiError, SwapRequest, SwapResponse};
