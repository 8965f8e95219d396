//! Command-line provenance lookup over a ledger snapshot.
//!
//! `agritrace <UPC>` reads its settings from the environment, reconstructs the
//! item's trail from the configured JSON snapshot and prints a report.

use anyhow::{Context, bail};
use serde::Serialize;

use agritrace_core::{ItemIdentity, Stage};
use agritrace_infra::config::LEDGER_FILE_VAR;
use agritrace_infra::ledger::{JsonLedgerSnapshot, LedgerConnection};
use agritrace_infra::{ProvenanceSnapshot, ProvenanceTracker, StageStatus, TraceConfig};
use agritrace_observability::LogFormat;

pub const LOG_FORMAT_VAR: &str = "AGRITRACE_LOG_FORMAT";

pub const USAGE: &str = "usage: agritrace <UPC>";

/// The item code from the command line (program name already skipped).
pub fn item_code_arg<I>(args: I) -> anyhow::Result<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(code) = args.next() else {
        bail!("missing item code\n{USAGE}");
    };
    if args.next().is_some() {
        bail!("expected exactly one item code\n{USAGE}");
    }
    Ok(code)
}

/// Log format from `AGRITRACE_LOG_FORMAT`; unknown values fall back to JSON.
pub fn log_format_from_env() -> LogFormat {
    log_format(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
}

fn log_format(value: Option<&str>) -> LogFormat {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// One line of the printed trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageLine {
    pub stage: Stage,
    #[serde(flatten)]
    pub status: StageStatus,
}

/// What the binary prints for one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceReport {
    pub request_id: String,
    pub item_code: String,
    pub identity: Option<ItemIdentity>,
    pub completed_at: String,
    pub latest_stage: Option<Stage>,
    /// Every stage lookup answered; false when any stage is unavailable.
    pub all_stages_resolved: bool,
    /// The item has been purchased (last lifecycle stage found).
    pub lifecycle_finished: bool,
    pub stages: Vec<StageLine>,
}

impl From<ProvenanceSnapshot> for TraceReport {
    fn from(snapshot: ProvenanceSnapshot) -> Self {
        let record = &snapshot.record;
        Self {
            request_id: snapshot.request_id.to_string(),
            item_code: snapshot.item_code.clone(),
            identity: record.identity().copied(),
            completed_at: snapshot.completed_at.to_rfc3339(),
            latest_stage: record.latest_stage(),
            all_stages_resolved: record.all_stages_resolved(),
            lifecycle_finished: record.reached_final_stage(),
            stages: record
                .iter()
                .map(|(stage, status)| StageLine {
                    stage,
                    status: status.clone(),
                })
                .collect(),
        }
    }
}

/// Look up `item_code` using settings from the process environment.
pub async fn trace(item_code: &str) -> anyhow::Result<TraceReport> {
    let config = TraceConfig::from_env()?;
    let Some(path) = config.ledger_file.clone() else {
        bail!("{LEDGER_FILE_VAR} is not set");
    };
    let snapshot = JsonLedgerSnapshot::open(&path)
        .await
        .with_context(|| format!("failed to open ledger snapshot {}", path.display()))?;
    tracing::info!(entries = snapshot.len(), path = %path.display(), "ledger snapshot loaded");

    trace_with(&config, snapshot, item_code).await
}

/// Look up `item_code` against an already opened ledger.
pub async fn trace_with<C>(
    config: &TraceConfig,
    connection: C,
    item_code: &str,
) -> anyhow::Result<TraceReport>
where
    C: LedgerConnection + 'static,
{
    if config.contract_address.is_none() {
        tracing::warn!("no contract address configured; stages will be unavailable");
    }

    let tracker = ProvenanceTracker::new(config.reconstructor(connection));
    let snapshot = tracker
        .select(item_code.trim())
        .await
        .with_context(|| format!("invalid item code '{item_code}'"))?;

    match snapshot {
        Some(snapshot) => Ok(snapshot.into()),
        None => bail!("lookup for '{item_code}' was superseded"),
    }
}
