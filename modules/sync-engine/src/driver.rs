use std::collections::HashMap;

use serde::Serialize;
use store_sqlite::{Db, FolderRow, ScanRow};
use tracing::{debug, error, info};
use vault_core::*;

use crate::run::{ingest_scan_run, RunStats};
use crate::SyncOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// History entry is running, paused or otherwise not finished.
    NotCompleted,
    /// Run id is already stored.
    AlreadySynced,
}

/// Terminal state of one candidate run.
#[derive(Debug)]
pub enum RunOutcome {
    Committed(RunStats),
    Skipped(SkipReason),
    Aborted(SyncError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRun {
    pub scan_id: ScanId,
    pub run_id: RunId,
    pub kind: String,
    pub error: String,
}

/// Outcome counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub folders_upserted: usize,
    pub scans_upserted: usize,
    pub scans_skipped_trash: usize,
    pub scans_without_history: usize,
    pub scans_failed: usize,
    pub runs_committed: usize,
    pub runs_not_completed: usize,
    pub runs_already_synced: usize,
    pub failed_runs: Vec<FailedRun>,
    pub hosts: usize,
    pub findings: usize,
    pub plugins_inserted: usize,
    pub plugins_updated: usize,
}

impl SyncReport {
    fn record(&mut self, scan_id: ScanId, run_id: RunId, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Committed(stats) => {
                self.runs_committed += 1;
                self.hosts += stats.hosts;
                self.findings += stats.findings;
                self.plugins_inserted += stats.plugins_inserted;
                self.plugins_updated += stats.plugins_updated;
            }
            RunOutcome::Skipped(SkipReason::NotCompleted) => self.runs_not_completed += 1,
            RunOutcome::Skipped(SkipReason::AlreadySynced) => self.runs_already_synced += 1,
            RunOutcome::Aborted(e) => self.failed_runs.push(FailedRun {
                scan_id,
                run_id,
                kind: e.kind().to_string(),
                error: e.to_string(),
            }),
        }
    }
}

/// Drives one synchronization pass over the scan source.
pub struct Synchronizer<'a, S> {
    source: &'a S,
    db: &'a mut Db,
    opts: SyncOptions,
}

impl<'a, S: ScanSource> Synchronizer<'a, S> {
    pub fn new(source: &'a S, db: &'a mut Db, opts: SyncOptions) -> Self {
        Synchronizer { source, db, opts }
    }

    /// Run one pass. Safe to repeat: stored runs are skipped without any fetch.
    ///
    /// Only a failure to list folders or scans fails the pass; per-run and
    /// per-scan failures are logged and collected in the report.
    pub async fn run_once(&mut self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        let folders = self.source.list_folders().await?;
        let rows: Vec<FolderRow> = folders
            .iter()
            .map(|f| FolderRow { folder_id: f.id, kind: f.kind.clone(), name: f.name.clone() })
            .collect();
        match self.db.upsert_folders(&rows) {
            Ok(n) => report.folders_upserted = n,
            Err(e) => error!(error = %e, "folder upsert failed"),
        }
        let trash: HashMap<FolderId, bool> = folders.iter().map(|f| (f.id, f.is_trash())).collect();

        let scans = self.source.list_scans().await?;
        let rows: Vec<ScanRow> = scans
            .iter()
            .map(|s| ScanRow { scan_id: s.id, folder_id: s.folder_id, kind: s.kind.clone(), name: s.name.clone() })
            .collect();
        match self.db.upsert_scans(&rows) {
            Ok(n) => report.scans_upserted = n,
            Err(e) => error!(error = %e, "scan upsert failed"),
        }

        for scan in &scans {
            info!(scan_id = scan.id, name = %scan.name, "processing scan");
            let in_trash = scan.folder_id.and_then(|id| trash.get(&id).copied()).unwrap_or(false);
            if in_trash && !self.opts.include_trash {
                debug!(scan_id = scan.id, name = %scan.name, "skipping scan in trash folder");
                report.scans_skipped_trash += 1;
                continue;
            }

            let detail = match self.source.get_scan(scan.id).await {
                Ok(d) => d,
                Err(e) => {
                    error!(scan_id = scan.id, error = %e, "could not fetch scan history");
                    report.scans_failed += 1;
                    continue;
                }
            };
            if detail.history.is_empty() {
                debug!(scan_id = scan.id, "scan has no history");
                report.scans_without_history += 1;
                continue;
            }

            for entry in &detail.history {
                let outcome = self.process_run(scan.id, entry).await;
                report.record(scan.id, entry.history_id, outcome);
            }
        }

        info!(
            committed = report.runs_committed,
            already_synced = report.runs_already_synced,
            failed = report.failed_runs.len(),
            "synchronization pass finished"
        );
        Ok(report)
    }

    async fn process_run(&mut self, scan_id: ScanId, entry: &RunSummary) -> RunOutcome {
        let run_id = entry.history_id;
        if !entry.is_completed() {
            debug!(scan_id, run_id, status = %entry.status, "skipping unfinished run");
            return RunOutcome::Skipped(SkipReason::NotCompleted);
        }
        match self.db.scan_run_exists(run_id) {
            Ok(true) => {
                debug!(scan_id, run_id, "run already synchronized");
                return RunOutcome::Skipped(SkipReason::AlreadySynced);
            }
            Ok(false) => {}
            Err(e) => return self.aborted(scan_id, run_id, e.into()),
        }

        info!(scan_id, run_id, "inserting scan run");
        match ingest_scan_run(self.source, self.db, &self.opts, scan_id, run_id).await {
            Ok(stats) => {
                info!(scan_id, run_id, hosts = stats.hosts, findings = stats.findings, "scan run committed");
                RunOutcome::Committed(stats)
            }
            Err(e) => self.aborted(scan_id, run_id, e),
        }
    }

    fn aborted(&self, scan_id: ScanId, run_id: RunId, e: SyncError) -> RunOutcome {
        error!(scan_id, run_id, kind = e.kind(), error = %e, "scan run rolled back; will retry next pass");
        RunOutcome::Aborted(e)
    }
}
