use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

use atelier::{
    cancel_pair, AtelierConfig, CampaignRunner, ContactRecord, MemoryStore, ProspectSender,
    SendError, SendReceipt,
};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Workflow & notification engine for a client-delivery pipeline")]
#[command(
    long_about = "Atelier runs the delivery-pipeline engine's operator commands: previewing \
                  and running rate-limited revival campaigns over a contact snapshot, and \
                  writing a starter configuration with 'atelier init'."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default atelier.toml configuration file
    Init {
        /// Overwrite an existing atelier.toml
        #[arg(long, help = "Overwrite atelier.toml if it already exists")]
        force: bool,
    },
    /// Revival campaign operations over a contact snapshot
    Campaign {
        #[command(subcommand)]
        command: CampaignCommands,
    },
}

#[derive(Subcommand)]
enum CampaignCommands {
    /// Count the stale prospects a campaign would target, without sending
    Preview {
        /// JSON file holding the contact records to evaluate
        #[arg(long)]
        contacts: PathBuf,
        /// Override the configured staleness window
        #[arg(long, help = "Minimum contact age in days before a prospect is stale")]
        staleness_days: Option<u32>,
    },
    /// Run the revival campaign against a contact snapshot
    Run {
        /// JSON file holding the contact records to evaluate
        #[arg(long)]
        contacts: PathBuf,
        /// Override the configured staleness window
        #[arg(long, help = "Minimum contact age in days before a prospect is stale")]
        staleness_days: Option<u32>,
    },
}

/// Stand-in for the external email collaborator: logs each send and reports
/// success. Real transport wiring lives outside this crate.
struct LoggingSender;

#[async_trait::async_trait]
impl ProspectSender for LoggingSender {
    async fn send(&self, contact: &ContactRecord) -> Result<SendReceipt, SendError> {
        tracing::info!(
            contact_id = %contact.id,
            email = %contact.email,
            "revival email dispatched"
        );
        Ok(SendReceipt::new())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AtelierConfig::load().context("failed to load configuration")?;
    atelier::init_telemetry(&config.observability)?;

    let result = match cli.command {
        Commands::Init { force } => init_command(&config, force),
        Commands::Campaign { command } => match command {
            CampaignCommands::Preview {
                contacts,
                staleness_days,
            } => campaign_preview_command(&config, &contacts, staleness_days).await,
            CampaignCommands::Run {
                contacts,
                staleness_days,
            } => campaign_run_command(&config, &contacts, staleness_days).await,
        },
    };

    atelier::shutdown_telemetry();
    result
}

fn init_command(config: &AtelierConfig, force: bool) -> Result<()> {
    let path = Path::new("atelier.toml");
    if path.exists() && !force {
        anyhow::bail!("atelier.toml already exists; re-run with --force to overwrite");
    }
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn load_snapshot(path: &Path) -> Result<Arc<MemoryStore>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read contact snapshot {}", path.display()))?;
    let contacts: Vec<ContactRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse contact snapshot {}", path.display()))?;

    let store = Arc::new(MemoryStore::new());
    for contact in contacts {
        store.add_contact(contact).await;
    }
    Ok(store)
}

fn staleness_override(staleness_days: Option<u32>) -> Option<chrono::Duration> {
    staleness_days.map(|days| chrono::Duration::days(days as i64))
}

async fn campaign_preview_command(
    config: &AtelierConfig,
    contacts: &Path,
    staleness_days: Option<u32>,
) -> Result<()> {
    let store = load_snapshot(contacts).await?;
    let total = store.contact_count().await;
    let runner = CampaignRunner::new(store, Arc::new(LoggingSender), &config.campaign);

    let stale = runner
        .count_stale_prospects(staleness_override(staleness_days))
        .await?;
    println!(
        "{stale} of {total} contacts are stale prospects (staleness window: {} days)",
        staleness_days.unwrap_or(config.campaign.staleness_days)
    );
    println!("No emails were sent. Run 'atelier campaign run' to dispatch.");
    Ok(())
}

async fn campaign_run_command(
    config: &AtelierConfig,
    contacts: &Path,
    staleness_days: Option<u32>,
) -> Result<()> {
    let store = load_snapshot(contacts).await?;
    let runner = CampaignRunner::new(store, Arc::new(LoggingSender), &config.campaign);

    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the in-flight send");
            handle.cancel();
        }
    });

    let correlation_id = atelier::generate_correlation_id();
    let span = atelier::create_operation_span("campaign_run", None, None, Some(&correlation_id));

    let report = runner
        .run_revival_campaign(staleness_override(staleness_days), &token)
        .instrument(span)
        .await?;

    println!(
        "Campaign finished: sent={} failed={} total={}{}",
        report.sent,
        report.failed,
        report.total,
        if report.cancelled { " (cancelled)" } else { "" }
    );
    atelier::engine_metrics().log_stats();
    Ok(())
}
