//! Background Tasks Module
//!
//! # Tasks
//! - TTL Collector: removes expired records from a `RecordCache` as they
//!   come due, fed by a FIFO expiry queue

mod collector;
mod queue;

pub use collector::spawn_collector;
pub use queue::{Expiry, ExpiryQueue};
