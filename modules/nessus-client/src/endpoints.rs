//! REST paths of the scanner API.

use vault_core::{HostId, PluginId, RunId, ScanId};

pub const FOLDERS: &str = "/folders";
pub const SCANS: &str = "/scans";
pub const SCRIPT_PATH: &str = "/nessus6.js";

pub fn scan_path(scan_id: ScanId) -> String {
    format!("{SCANS}/{scan_id}")
}

pub fn scan_run_path(scan_id: ScanId, run_id: RunId) -> String {
    format!("{SCANS}/{scan_id}?history_id={run_id}")
}

pub fn host_path(scan_id: ScanId, host_id: HostId, run_id: RunId) -> String {
    format!("{SCANS}/{scan_id}/hosts/{host_id}?history_id={run_id}")
}

pub fn plugin_output_path(scan_id: ScanId, host_id: HostId, plugin_id: PluginId, run_id: RunId) -> String {
    format!("{SCANS}/{scan_id}/hosts/{host_id}/plugins/{plugin_id}?history_id={run_id}")
}

pub fn compliance_output_path(scan_id: ScanId, host_id: HostId, compliance_id: PluginId, run_id: RunId) -> String {
    format!("{SCANS}/{scan_id}/hosts/{host_id}/compliance/{compliance_id}?history_id={run_id}")
}
