//! Reliability patterns for durable execution
//!
//! This module provides:
//! - [`RetryPolicy`] - Configurable retry with exponential backoff
//! - [`CircuitBreakerConfig`] - Circuit breaker configuration
//! - [`DistributedCircuitBreaker`] - PostgreSQL-backed circuit breaker shared
//!   across workers
//! - [`TimeoutConfig`] - Schedule-to-start / start-to-close / heartbeat
//!   timeout enforcement

mod circuit_breaker;
mod distributed_circuit_breaker;
mod retry;
mod timeout;

pub use circuit_breaker::{CircuitBreakerConfig, CircuitState};
pub use distributed_circuit_breaker::{
    CircuitBreakerError, CircuitBreakerPermit, DistributedCircuitBreaker,
};
pub use retry::RetryPolicy;
pub use timeout::{TimeoutConfig, TimeoutError, TimeoutManager, TimeoutType as ActivityTimeoutType};
