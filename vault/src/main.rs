use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nessus_client::NessusClient;
use std::path::PathBuf;
use std::time::Instant;
use store_sqlite::Db;
use sync_engine::{SyncReport, Synchronizer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

mod config;
mod logging;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Parser)]
#[command(name = "scan-vault", version, about = "Incrementally export vulnerability scan results into SQLite")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./scan-vault.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file (overrides database.path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Create the database schema if missing
    InitDb,
    /// Run one synchronization pass against the scanner
    Sync {
        /// Include scans in the trash folder
        #[arg(long, default_value_t = false)]
        trash: bool,
        /// Also export compliance check results
        #[arg(long, default_value_t = false)]
        compliance: bool,
        /// Output format for the pass summary
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show row counts and the most recent stored runs
    Status {
        /// Number of runs to list
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn fmt_epoch(ts: Option<i64>) -> String {
    ts.and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok())
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".into())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let prepare = || -> Result<(config::Config, PathBuf)> {
        let cfg = config::load_config(cli.config.as_deref())?;
        cfg.validate()?;
        logging::init_tracing(&cfg.log_format(), cfg.debug(cli.debug))?;
        let db_path = cfg.database_path(cli.db.as_deref())?;
        Ok((cfg, db_path))
    };

    match &cli.command {
        Commands::Version => {
            println!("scan-vault {}", vault_core::version());
        }
        Commands::InitDb => {
            let (_, db_path) = prepare()?;
            let db = Db::open_or_create(&db_path)?;
            let counts = db.table_counts()?;
            println!("database ready at {} ({} scan runs)", db_path.display(), counts.scan_run);
        }
        &Commands::Sync { trash, compliance, format } => {
            let (cfg, db_path) = prepare()?;
            let sync_opts = cfg.sync_options(trash, compliance);
            let client_opts = cfg.client_options(sync_opts.compliance)?;
            let rt = tokio::runtime::Runtime::new()?;
            let started = Instant::now();
            let report = rt.block_on(async {
                let client = NessusClient::connect(&client_opts).await?;
                let mut db = Db::open_or_create(&db_path)?;
                info!(db = %db_path.display(), host = %client_opts.hostname, "starting synchronization pass");
                Synchronizer::new(&client, &mut db, sync_opts).run_once().await
            })?;
            let duration_ms = started.elapsed().as_millis();
            print_report(&report, duration_ms, format)?;
        }
        &Commands::Status { limit, format } => {
            let (_, db_path) = prepare()?;
            let db = Db::open_or_create(&db_path)?;
            let counts = db.table_counts()?;
            let runs = db.latest_runs(limit)?;
            match format {
                OutputFormat::Json => {
                    let obj = serde_json::json!({ "counts": counts, "runs": runs });
                    println!("{}", serde_json::to_string(&obj)?);
                }
                OutputFormat::Text => {
                    println!(
                        "folders {}  scans {}  runs {}  hosts {}  plugins {}  findings {}  compliance {}",
                        counts.folder, counts.scan, counts.scan_run, counts.host, counts.plugin, counts.host_vuln, counts.compliance
                    );
                    for r in runs {
                        let s = r.severity;
                        println!(
                            "run {} scan {} ({}) {} -> {} hosts {} crit {} high {} med {} low {} info {}",
                            r.scan_run_id,
                            r.scan_id,
                            r.scan_name.as_deref().unwrap_or("?"),
                            fmt_epoch(r.scan_start),
                            fmt_epoch(r.scan_end),
                            r.host_count.unwrap_or(0),
                            s.critical(), s.high(), s.medium(), s.low(), s.info(),
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &SyncReport, duration_ms: u128, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut obj = serde_json::to_value(report)?;
            obj["duration_ms"] = serde_json::json!(duration_ms);
            println!("{}", serde_json::to_string(&obj)?);
        }
        OutputFormat::Text => {
            println!(
                "synchronized {} runs ({} hosts, {} findings) in {} ms; {} already present, {} unfinished, {} trashed scans skipped",
                report.runs_committed,
                report.hosts,
                report.findings,
                duration_ms,
                report.runs_already_synced,
                report.runs_not_completed,
                report.scans_skipped_trash,
            );
            println!("plugins: {} new, {} updated", report.plugins_inserted, report.plugins_updated);
            for f in &report.failed_runs {
                println!("failed: scan {} run {} [{}] {}", f.scan_id, f.run_id, f.kind, f.error);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_sync_flags() {
        let cli = Cli::try_parse_from(["scan-vault", "--db", "x.db", "sync", "--trash", "--format", "json"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Commands::Sync { trash, compliance, format } => {
                assert!(trash);
                assert!(!compliance);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn epoch_formatting() {
        assert_eq!(fmt_epoch(Some(0)), "1970-01-01T00:00:00Z");
        assert_eq!(fmt_epoch(None), "-");
    }
}
