//! ChainRitual gateway: exposes the `linera` wallet CLI over HTTP.

pub mod config;
pub mod error;
pub mod linera;
pub mod routes;
pub mod runner;

pub use routes::{router, AppState};
