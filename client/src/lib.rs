//! ChainRitual client: a persisted single-wallet session talking to the
//! gateway, plus the transfer and market forms that feed it.

pub mod api;
pub mod config;
pub mod market;
pub mod price;
pub mod session;
pub mod store;
pub mod transfer_form;

pub use api::{GatewayApi, HttpGateway};
pub use session::{SessionError, SessionPhase, WalletSession};
pub use store::{FileStore, MemoryStore, WalletStore};
