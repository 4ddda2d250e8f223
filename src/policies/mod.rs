//! Delivery policies.
//!
//! Currently a single policy: [`RetryBackoff`], the retry/backoff curve for
//! group delivery.

mod backoff;

pub use backoff::RetryBackoff;
