//! Incremental synchronization of scan results into the relational store.
//!
//! [`Synchronizer::run_once`] lists folders and scans, upserts them, and
//! ingests every completed run that is not stored yet. Each run is written
//! in one transaction: it is either fully committed or entirely absent.

mod driver;
mod host;
mod plugin;
mod run;

pub use driver::{FailedRun, RunOutcome, SkipReason, SyncReport, Synchronizer};
pub use host::{ingest_host, HostStats};
pub use plugin::{plugin_row, PluginCatalog, PluginSync};
pub use run::{ingest_scan_run, RunStats};

/// Behaviour switches for a synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Also ingest scans that sit in the trash folder.
    pub include_trash: bool,
    /// Track compliance checks alongside vulnerability findings.
    pub compliance: bool,
}
