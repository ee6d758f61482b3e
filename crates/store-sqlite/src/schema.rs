pub const MIG_0001_INIT: &str = r#"
BEGIN;

CREATE TABLE folder (
  folder_id          INTEGER PRIMARY KEY,
  type               TEXT,
  name               TEXT
);

CREATE TABLE scan (
  scan_id            INTEGER PRIMARY KEY,
  folder_id          INTEGER,
  type               TEXT,
  name               TEXT
);

CREATE TABLE scan_run (
  scan_run_id        INTEGER PRIMARY KEY,
  scan_id            INTEGER NOT NULL REFERENCES scan(scan_id),
  scan_start         INTEGER,
  scan_end           INTEGER,
  targets            TEXT,
  host_count         INTEGER,
  critical_count     INTEGER NOT NULL DEFAULT 0,
  high_count         INTEGER NOT NULL DEFAULT 0,
  medium_count       INTEGER NOT NULL DEFAULT 0,
  low_count          INTEGER NOT NULL DEFAULT 0,
  info_count         INTEGER NOT NULL DEFAULT 0,
  comp_pass_count    INTEGER NOT NULL DEFAULT 0,
  comp_warning_count INTEGER NOT NULL DEFAULT 0,
  comp_fail_count    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE host (
  nessus_host_id     INTEGER NOT NULL,
  scan_run_id        INTEGER NOT NULL REFERENCES scan_run(scan_run_id),
  scan_id            INTEGER NOT NULL,
  host_ip            TEXT NOT NULL,
  host_fqdn          TEXT,
  host_start         TEXT,
  host_end           TEXT,
  os                 TEXT,
  critical_count     INTEGER NOT NULL DEFAULT 0,
  high_count         INTEGER NOT NULL DEFAULT 0,
  medium_count       INTEGER NOT NULL DEFAULT 0,
  low_count          INTEGER NOT NULL DEFAULT 0,
  info_count         INTEGER NOT NULL DEFAULT 0,
  comp_pass_count    INTEGER NOT NULL DEFAULT 0,
  comp_warning_count INTEGER NOT NULL DEFAULT 0,
  comp_fail_count    INTEGER NOT NULL DEFAULT 0,
  PRIMARY KEY (nessus_host_id, scan_run_id)
);

CREATE TABLE plugin (
  plugin_id          INTEGER PRIMARY KEY,
  severity           INTEGER,
  name               TEXT,
  family             TEXT,
  synopsis           TEXT,
  description        TEXT,
  solution           TEXT,
  cvss_base_score    TEXT,
  cvss3_base_score   TEXT,
  cvss_vector        TEXT,
  cvss3_vector       TEXT,
  ref                TEXT,
  pub_date           TEXT,
  mod_date           TEXT,
  policy_value       TEXT
);

CREATE TABLE host_vuln (
  id                 INTEGER PRIMARY KEY AUTOINCREMENT,
  nessus_host_id     INTEGER NOT NULL,
  scan_run_id        INTEGER NOT NULL,
  plugin_id          INTEGER NOT NULL REFERENCES plugin(plugin_id),
  FOREIGN KEY (nessus_host_id, scan_run_id) REFERENCES host(nessus_host_id, scan_run_id)
);

CREATE TABLE vuln_output (
  host_vuln_id       INTEGER NOT NULL REFERENCES host_vuln(id),
  port               TEXT,
  output             TEXT
);

CREATE TABLE compliance (
  id                 INTEGER PRIMARY KEY AUTOINCREMENT,
  nessus_host_id     INTEGER NOT NULL,
  scan_run_id        INTEGER NOT NULL,
  plugin_id          INTEGER NOT NULL REFERENCES plugin(plugin_id),
  status             INTEGER,
  FOREIGN KEY (nessus_host_id, scan_run_id) REFERENCES host(nessus_host_id, scan_run_id)
);

CREATE TABLE compliance_output (
  compliance_id      INTEGER NOT NULL REFERENCES compliance(id),
  output             TEXT
);

CREATE INDEX idx_scan_folder ON scan(folder_id);
CREATE INDEX idx_scan_run_scan ON scan_run(scan_id);
CREATE INDEX idx_host_run ON host(scan_run_id);
CREATE INDEX idx_host_vuln_host ON host_vuln(scan_run_id, nessus_host_id);
CREATE INDEX idx_host_vuln_plugin ON host_vuln(plugin_id);
CREATE INDEX idx_vuln_output_vuln ON vuln_output(host_vuln_id);
CREATE INDEX idx_compliance_host ON compliance(scan_run_id, nessus_host_id);
CREATE INDEX idx_compliance_output ON compliance_output(compliance_id);

COMMIT;
"#
;
