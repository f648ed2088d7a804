//! HTTP API routes: one module per resource, each with its own
//! `AppState` and `routes(state)` constructor, merged together in
//! `main.rs`.

pub mod common;
pub mod dead_letters;
pub mod health;
pub mod orders;
pub mod signals;

pub use common::{CorrelationId, ErrorResponse, ListResponse, PropagatedContext, Tenancy};
