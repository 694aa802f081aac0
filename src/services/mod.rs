//! Business logic services.
//!
//! - [`relay`]: outbound calls to the upstream API with credential injection

pub mod relay;

pub use relay::{RelayClient, SessionCreated};
