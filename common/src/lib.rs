//! Types shared by the ChainRitual gateway and client: chain ids, amounts,
//! the wallet record, the backend abstraction and the HTTP JSON bodies.

pub mod amount;
pub mod api;
pub mod chain;
pub mod market;
pub mod wallet;
pub mod wallet_backend;
