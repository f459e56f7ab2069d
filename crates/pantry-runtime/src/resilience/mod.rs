//! Resilience patterns for outbound calls.
//!
//! Every gateway call goes through [`RetryPolicy::execute`]: bounded
//! exponential backoff with a predicate deciding which failures are worth
//! another attempt.

mod retry;

pub use retry::RetryPolicy;
