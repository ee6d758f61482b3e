//! The scan source contract consumed by the sync engine.

use crate::error::SyncError;
use crate::model::*;

/// Fetch-by-id access to the remote scanning service.
///
/// Every call fails with [`SyncError::SourceUnavailable`] on transport or
/// non-2xx failures and [`SyncError::MalformedResponse`] when a required
/// field is missing from the payload.
#[allow(async_fn_in_trait)]
pub trait ScanSource {
    async fn list_folders(&self) -> Result<Vec<Folder>, SyncError>;

    async fn list_scans(&self) -> Result<Vec<Scan>, SyncError>;

    async fn get_scan(&self, scan_id: ScanId) -> Result<ScanDetail, SyncError>;

    async fn get_scan_run(&self, scan_id: ScanId, run_id: RunId) -> Result<RunDetail, SyncError>;

    async fn get_host(&self, scan_id: ScanId, host_id: HostId, run_id: RunId) -> Result<HostDetail, SyncError>;

    async fn get_finding_output(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        plugin_id: PluginId,
        run_id: RunId,
    ) -> Result<FindingOutput, SyncError>;

    async fn get_compliance_output(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        compliance_id: PluginId,
        run_id: RunId,
    ) -> Result<ComplianceOutput, SyncError>;
}
