//! Rate limiter adapters.
//!
//! Implementations of the RateLimiter port.
//!
//! ## Available Adapters
//!
//! - `InMemoryRateLimiter` - Sliding-window call budget, single process
//!
//! ## Usage
//!
//! ```ignore
//! use governance_advisor::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
//!
//! let limiter = InMemoryRateLimiter::new(RateLimitConfig::per_minute(20));
//! ```

mod config;
mod in_memory;

pub use config::{RateLimitConfig, WindowLimits, DEFAULT_CALLS_PER_MINUTE};
pub use in_memory::InMemoryRateLimiter;
