//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ConnectionApi)
//! but are themselves concrete structs, not traits.

mod connection;

pub use connection::{ConnectionService, CreateRequest};
