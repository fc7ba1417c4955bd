//! Usage/audit reporting

mod sink;
mod types;

pub use sink::{ChannelUsageSink, TracingUsageSink, UsageSink};
pub use types::UsageRecord;
