//! Usage limiting
//!
//! Counts requests and tokens per user in fixed one-minute windows. Limits themselves come
//! from the role capability matrix.

mod limiter;
mod types;


pub use limiter::UsageTracker;
