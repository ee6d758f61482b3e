mod common;

use common::{single_finding_source, FakeSource};
use store_sqlite::{Db, TableCounts};
use sync_engine::*;
use vault_core::SeverityBuckets;

fn opts() -> SyncOptions {
    SyncOptions::default()
}

async fn pass(src: &FakeSource, db: &mut Db, opts: SyncOptions) -> SyncReport {
    Synchronizer::new(src, db, opts).run_once().await.unwrap()
}

#[tokio::test]
async fn end_to_end_single_finding() {
    let src = single_finding_source();
    let mut db = Db::open_in_memory().unwrap();

    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 1);
    assert!(report.failed_runs.is_empty());

    let counts = db.table_counts().unwrap();
    assert_eq!(
        counts,
        TableCounts { folder: 1, scan: 1, scan_run: 1, host: 1, plugin: 1, host_vuln: 1, vuln_output: 1, compliance: 0, compliance_output: 0 }
    );
    assert_eq!(db.run_severity(100).unwrap(), Some(SeverityBuckets([0, 0, 0, 0, 1])));
    assert_eq!(db.host_severity_totals(100).unwrap(), SeverityBuckets([0, 0, 0, 0, 1]));
    let plugin = db.get_plugin(200).unwrap().unwrap();
    assert_eq!(plugin.reference.as_deref(), Some("https://example.org/advisory"));
    let (port, output): (String, String) = db
        .conn
        .query_row("SELECT port, output FROM vuln_output", [], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap();
    assert_eq!(port, "443");
    assert_eq!(output, "output of 200");
    let (ip, os): (String, String) = db
        .conn
        .query_row("SELECT host_ip, os FROM host WHERE nessus_host_id=5 AND scan_run_id=100", [], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap();
    assert_eq!((ip.as_str(), os.as_str()), ("10.0.0.5", "Linux Kernel 5.15"));

    // Second pass inserts nothing.
    let second = pass(&src, &mut db, opts()).await;
    assert_eq!(second.runs_committed, 0);
    assert_eq!(second.runs_already_synced, 1);
    assert_eq!(db.table_counts().unwrap(), counts);
}

#[tokio::test]
async fn already_synced_run_is_never_fetched_again() {
    let src = single_finding_source();
    let mut db = Db::open_in_memory().unwrap();
    pass(&src, &mut db, opts()).await;
    src.take_calls();

    pass(&src, &mut db, opts()).await;
    assert!(src.calls_mentioning_run(100).is_empty(), "unexpected fetches: {:?}", src.calls_mentioning_run(100));
    assert_eq!(src.take_calls(), vec!["folders", "scans", "scan=10"]);
}

#[tokio::test]
async fn failure_on_later_host_leaves_no_trace_of_run() {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[(100, "completed")]);
    src.add_run(10, 100, &[5, 6, 7], &[(200, 4, 1), (201, 2, 2)]);
    src.add_host(10, 100, 5, &[(200, 4, 1)], &[]);
    src.add_finding(10, 100, 5, 200, "2024/01/01", &["443"]);
    src.add_host(10, 100, 6, &[(200, 4, 1)], &[]);
    src.add_finding(10, 100, 6, 200, "2024/01/01", &["443", "8443"]);
    src.add_host(10, 100, 7, &[(201, 2, 2)], &[]);
    src.add_finding(10, 100, 7, 201, "2024/01/01", &["22"]);
    src.fail_on("scan=10 run=100 host=7 plugin=201");

    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 0);
    assert_eq!(report.failed_runs.len(), 1);
    assert_eq!(report.failed_runs[0].run_id, 100);
    assert_eq!(report.failed_runs[0].kind, "source_unavailable");

    let counts = db.table_counts().unwrap();
    assert!(!db.scan_run_exists(100).unwrap());
    assert_eq!((counts.scan_run, counts.host, counts.plugin, counts.host_vuln, counts.vuln_output), (0, 0, 0, 0, 0));
    // Folder and scan upserts are committed independently.
    assert_eq!((counts.folder, counts.scan), (1, 1));

    // Next pass retries the run and succeeds.
    src.heal();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 1);
    let counts = db.table_counts().unwrap();
    assert_eq!((counts.host, counts.plugin, counts.host_vuln, counts.vuln_output), (3, 2, 3, 4));
}

#[tokio::test]
async fn failed_run_does_not_stop_other_runs() {
    let mut src = single_finding_source();
    src.add_scan(11, 1, &[(110, "completed")]);
    src.add_run(11, 110, &[8], &[]);
    src.add_host(11, 110, 8, &[], &[]);
    src.fail_on("scan=10 run=100");

    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 1);
    assert_eq!(report.failed_runs.len(), 1);
    assert!(!db.scan_run_exists(100).unwrap());
    assert!(db.scan_run_exists(110).unwrap());
}

#[tokio::test]
async fn malformed_payload_aborts_run() {
    let mut src = single_finding_source();
    src.hosts.insert((10, 5, 100), serde_json::json!({"info": {"host-fqdn": "no-ip.lan"}}));
    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.failed_runs[0].kind, "malformed_response");
    assert_eq!(db.table_counts().unwrap().scan_run, 0);
}

#[tokio::test]
async fn trash_scans_follow_inclusion_flag() {
    let mut src = single_finding_source();
    src.add_folder(2, "trash");
    src.add_scan(20, 2, &[(300, "completed")]);
    src.add_run(20, 300, &[9], &[]);
    src.add_host(20, 300, 9, &[], &[]);

    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.scans_skipped_trash, 1);
    assert!(!src.take_calls().iter().any(|c| c.starts_with("scan=20")));
    assert!(!db.scan_run_exists(300).unwrap());
    // The trashed scan itself is still catalogued.
    assert_eq!(db.table_counts().unwrap().scan, 2);

    let report = pass(&src, &mut db, SyncOptions { include_trash: true, ..opts() }).await;
    assert_eq!(report.scans_skipped_trash, 0);
    assert!(db.scan_run_exists(300).unwrap());
}

#[tokio::test]
async fn only_completed_runs_are_ingested() {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[(101, "running"), (102, "paused"), (103, "canceled"), (104, "completed")]);
    for run in [101, 102, 103, 104] {
        src.add_run(10, run, &[5], &[]);
        src.add_host(10, run, 5, &[], &[]);
    }
    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, SyncOptions { include_trash: true, compliance: true }).await;
    assert_eq!(report.runs_not_completed, 3);
    assert_eq!(report.runs_committed, 1);
    for run in [101, 102, 103] {
        assert!(!db.scan_run_exists(run).unwrap());
        assert!(src.calls_mentioning_run(run).is_empty());
    }
    assert!(db.scan_run_exists(104).unwrap());
}

#[tokio::test]
async fn scan_without_history_is_skipped() {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[]);
    src.scan_details.insert(10, serde_json::json!({"info": {}, "history": null}));
    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.scans_without_history, 1);
    assert_eq!(db.table_counts().unwrap().scan, 1);
}

#[tokio::test]
async fn plugin_shared_across_hosts_and_runs_stays_single() {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[(100, "completed"), (101, "completed")]);
    for run in [100, 101] {
        src.add_run(10, run, &[5, 6], &[(200, 4, 2)]);
        for host in [5, 6] {
            src.add_host(10, run, host, &[(200, 4, 1)], &[]);
            src.add_finding(10, run, host, 200, "2024/01/01", &["443"]);
        }
    }
    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 2);
    assert_eq!(report.plugins_inserted, 1);
    let counts = db.table_counts().unwrap();
    assert_eq!((counts.plugin, counts.host_vuln, counts.host), (1, 4, 4));
}

#[tokio::test]
async fn newer_plugin_definition_updates_catalog() {
    let mut src = single_finding_source();
    let mut db = Db::open_in_memory().unwrap();
    pass(&src, &mut db, opts()).await;
    assert_eq!(db.get_plugin(200).unwrap().unwrap().synopsis.as_deref(), Some("synopsis 2024/01/01"));

    src.scan_details.insert(10, serde_json::json!({"history": [
        {"history_id": 100, "status": "completed"},
        {"history_id": 101, "status": "completed"}
    ]}));
    src.add_run(10, 101, &[5], &[(200, 4, 1)]);
    src.add_host(10, 101, 5, &[(200, 4, 1)], &[]);
    src.add_finding(10, 101, 5, 200, "2024/06/30", &["443"]);
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.plugins_updated, 1);
    let plugin = db.get_plugin(200).unwrap().unwrap();
    assert_eq!(plugin.mod_date.as_deref(), Some("2024/06/30"));
    assert_eq!(plugin.synopsis.as_deref(), Some("synopsis 2024/06/30"));
    assert_eq!(db.table_counts().unwrap().plugin, 1);
}

#[tokio::test]
async fn compliance_results_follow_flag() {
    let mut src = single_finding_source();
    src.add_host(10, 100, 5, &[(200, 4, 1)], &[(1001, 1), (1002, 3)]);
    src.add_compliance_output(10, 100, 5, 1001, &["passed check"]);
    src.add_compliance_output(10, 100, 5, 1002, &["failed a", "failed b"]);

    let mut db = Db::open_in_memory().unwrap();
    pass(&src, &mut db, opts()).await;
    let counts = db.table_counts().unwrap();
    assert_eq!((counts.compliance, counts.compliance_output), (0, 0));
    assert!(!src.take_calls().iter().any(|c| c.contains("compliance=")));

    let mut db = Db::open_in_memory().unwrap();
    pass(&src, &mut db, SyncOptions { compliance: true, ..opts() }).await;
    let counts = db.table_counts().unwrap();
    assert_eq!((counts.compliance, counts.compliance_output, counts.plugin), (2, 3, 3));
    let (pass_count, fail_count): (i64, i64) = db
        .conn
        .query_row("SELECT comp_pass_count, comp_fail_count FROM host WHERE nessus_host_id=5", [], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap();
    assert_eq!((pass_count, fail_count), (1, 1));
    let status: i64 = db.conn.query_row("SELECT status FROM compliance WHERE plugin_id=1002", [], |r| r.get(0)).unwrap();
    assert_eq!(status, 3);
}

#[tokio::test]
async fn run_and_host_buckets_are_stored_independently() {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[(100, "completed")]);
    // Run summary claims more criticals than the single host reports.
    src.add_run(10, 100, &[5], &[(200, 4, 3), (201, 0, 1)]);
    src.add_host(10, 100, 5, &[(200, 4, 1)], &[]);
    src.add_finding(10, 100, 5, 200, "2024/01/01", &["443"]);

    let mut db = Db::open_in_memory().unwrap();
    pass(&src, &mut db, opts()).await;
    assert_eq!(db.run_severity(100).unwrap(), Some(SeverityBuckets([1, 0, 0, 0, 3])));
    assert_eq!(db.host_severity_totals(100).unwrap(), SeverityBuckets([0, 0, 0, 0, 1]));
}

#[tokio::test]
async fn host_without_vulnerabilities_has_zero_buckets() {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[(100, "completed")]);
    src.add_run(10, 100, &[5], &[]);
    src.hosts.insert((10, 5, 100), serde_json::json!({"info": {"host-ip": "10.0.0.5"}}));
    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 1);
    assert_eq!(db.host_severity_totals(100).unwrap(), SeverityBuckets::default());
}

#[tokio::test]
async fn listing_failure_fails_the_pass() {
    let src = single_finding_source();
    src.fail_on("scans");
    let mut db = Db::open_in_memory().unwrap();
    let err = Synchronizer::new(&src, &mut db, opts()).run_once().await.unwrap_err();
    assert_eq!(err.kind(), "source_unavailable");
    // Folders were already upserted in their own transaction.
    assert_eq!(db.table_counts().unwrap().folder, 1);
}

#[tokio::test]
async fn scan_detail_failure_skips_only_that_scan() {
    let mut src = single_finding_source();
    src.add_scan(11, 1, &[(110, "completed")]);
    src.add_run(11, 110, &[8], &[]);
    src.add_host(11, 110, 8, &[], &[]);
    src.fail_on("scan=10");
    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.scans_failed, 1);
    assert!(db.scan_run_exists(110).unwrap());
}

#[tokio::test]
async fn compliance_entries_are_ignored_when_tracking_is_off() {
    let mut src = single_finding_source();
    src.hosts.get_mut(&(10, 5, 100)).unwrap()["compliance"] =
        serde_json::json!([{"plugin_id": null, "severity": 1, "count": 1}]);

    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.runs_committed, 1);
    assert!(report.failed_runs.is_empty());

    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, SyncOptions { compliance: true, ..opts() }).await;
    assert_eq!(report.failed_runs[0].kind, "malformed_response");
    assert!(!db.scan_run_exists(100).unwrap());
}

#[tokio::test]
async fn storage_failure_rolls_back_only_that_run() {
    let mut src = single_finding_source();
    // The description names a different plugin, so the finding's plugin_id
    // has no catalog row and the foreign key rejects it.
    src.findings.get_mut(&(10, 5, 200, 100)).unwrap()["info"]["plugindescription"] =
        common::plugin_description(999, "2024/01/01");
    src.add_scan(11, 1, &[(110, "completed")]);
    src.add_run(11, 110, &[8], &[]);
    src.add_host(11, 110, 8, &[], &[]);

    let mut db = Db::open_in_memory().unwrap();
    let report = pass(&src, &mut db, opts()).await;
    assert_eq!(report.failed_runs.len(), 1);
    let failed: &FailedRun = &report.failed_runs[0];
    assert_eq!((failed.run_id, failed.kind.as_str()), (100, "storage_failure"));
    assert!(!db.scan_run_exists(100).unwrap());
    assert!(db.get_plugin(999).unwrap().is_none());
    assert!(db.scan_run_exists(110).unwrap());
    assert_eq!(report.runs_committed, 1);
}
