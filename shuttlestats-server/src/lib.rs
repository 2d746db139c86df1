//! shuttlestats-server: HTTP API over the club's match records
//!
//! Persists players, pairs, matches and set scores in PostgreSQL and
//! serves win/loss/points statistics computed at query time.

pub mod db;
pub mod http;

pub use db::{connect, migrations};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
