//! Core types shared by the scan source client, the store and the sync engine.

pub mod de;
pub mod error;
pub mod model;
pub mod ratelimiter;
pub mod severity;
pub mod source;

pub use error::SyncError;
pub use model::*;
pub use severity::{ComplianceBuckets, SeverityBuckets, Weighted};
pub use source::ScanSource;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
