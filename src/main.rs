//! granule-tools: structural diff and timeline reporting for data granules
//!
//! Compares reference and candidate granule snapshots and publishes the
//! results into a report site with a persisted per-collection timeline.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use granule_tools::{
    compare_batch, load_snapshot_dir, Aggregator, DetailReporter, IdentityTable, SiteLayout,
    TimelineReporter, TimelineStore,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Input timestamp format, matching the upstream catalog's temporal queries.
const INPUT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Compact timestamp format used in artifact names and the timeline store.
const RUN_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Parser)]
#[command(name = "granule-tools")]
#[command(version)]
#[command(about = "Structural diff and timeline reporting for data granules", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  All compared granules equal
    1  Differences detected
    2  Error occurred

EXAMPLES:
    # Compare two snapshot directories and publish the report site
    granule-tools compare -c MODIS_A-JPL-L2P-v2019.0 \\
        --reference ops-snapshots/ --candidate test-snapshots/ --site /srv/compare

    # Pin the run timestamp to the batch's start time
    granule-tools compare -c MODIS_A-JPL-L2P-v2019.0 \\
        --reference ops/ --candidate test/ --site /srv/compare \\
        --start-time 2026-08-06T01:00:00

    # Re-render the timeline page from the persisted store
    granule-tools timeline -c MODIS_A-JPL-L2P-v2019.0 --site /srv/compare")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `compare` subcommand
#[derive(Parser)]
struct CompareArgs {
    /// Collection short name (selects the identity used in artifact names)
    #[arg(short, long)]
    collection: String,

    /// Directory of reference granule snapshots
    #[arg(long)]
    reference: PathBuf,

    /// Directory of candidate granule snapshots
    #[arg(long)]
    candidate: PathBuf,

    /// Root directory of the published report site
    #[arg(long, env = "GRANULE_TOOLS_SITE")]
    site: PathBuf,

    /// Run timestamp (YYYY-MM-DDTHH:MM:SS); defaults to now
    #[arg(short, long)]
    start_time: Option<String>,

    /// Write only the plain-text detail report, skip the HTML site
    #[arg(long)]
    text_only: bool,

    /// Global attribute holding the granule creation timestamp
    #[arg(long, default_value = granule_tools::DEFAULT_CREATION_ATTRIBUTE)]
    creation_attribute: String,
}

/// Arguments for the `timeline` subcommand
#[derive(Parser)]
struct TimelineArgs {
    /// Collection short name
    #[arg(short, long)]
    collection: String,

    /// Root directory of the published report site
    #[arg(long, env = "GRANULE_TOOLS_SITE")]
    site: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare reference and candidate snapshots and publish a run
    Compare(CompareArgs),
    /// Re-render the timeline page from the persisted store
    Timeline(TimelineArgs),
}

fn run_timestamp(start_time: Option<&str>) -> Result<String> {
    match start_time {
        Some(s) => {
            let parsed = NaiveDateTime::parse_from_str(s, INPUT_TIME_FORMAT)
                .with_context(|| format!("invalid start time: {s}"))?;
            Ok(parsed.format(RUN_TIME_FORMAT).to_string())
        }
        None => Ok(chrono::Local::now().format(RUN_TIME_FORMAT).to_string()),
    }
}

fn cmd_compare(args: CompareArgs) -> Result<i32> {
    let timestamp = run_timestamp(args.start_time.as_deref())?;
    let identities = IdentityTable::default();

    let reference = load_snapshot_dir(&args.reference)
        .with_context(|| format!("loading reference snapshots from {:?}", args.reference))?;
    let candidate = load_snapshot_dir(&args.candidate)
        .with_context(|| format!("loading candidate snapshots from {:?}", args.candidate))?;

    let run = compare_batch(&reference, &candidate, timestamp);

    if args.text_only {
        let identity = identities.identity_of(&args.collection)?;
        let verdicts = run.verdicts_with(&args.creation_attribute);
        std::fs::create_dir_all(&args.site)
            .with_context(|| format!("creating report directory {:?}", args.site))?;
        DetailReporter::new().write_to(&args.site, identity, &run, &verdicts, &args.collection)?;
        let equal = granule_tools::RunReport::unequal_granules(&verdicts).is_empty();
        return Ok(i32::from(!equal));
    }

    let aggregator = Aggregator::new(identities, SiteLayout::new(&args.site))
        .with_creation_attribute(args.creation_attribute);
    let published = aggregator.publish(&args.collection, &run)?;
    tracing::info!(
        overview = %published.overview.display(),
        timeline = %published.timeline.display(),
        "run complete"
    );
    Ok(i32::from(!published.equal))
}

fn cmd_timeline(args: TimelineArgs) -> Result<i32> {
    let identities = IdentityTable::default();
    let identity = identities.identity_of(&args.collection)?;
    let layout = SiteLayout::new(&args.site);

    let store = TimelineStore::load(TimelineStore::path_for(&layout.json_dir(), identity))?;
    let page = TimelineReporter::new().generate(&store, identity);
    let path = layout.timeline_path(identity);
    std::fs::write(&path, page).with_context(|| format!("writing timeline to {path:?}"))?;
    tracing::info!(path = %path.display(), runs = store.len(), "timeline rendered");
    Ok(0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let exit_code = match cli.command {
        Commands::Compare(args) => cmd_compare(args),
        Commands::Timeline(args) => cmd_timeline(args),
    };

    match exit_code {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(2);
        }
    }
}
