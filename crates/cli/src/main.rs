//! ExpDJ CLI - experiment battery selection and completion tracking.

mod config;

use std::path::PathBuf;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use expdj_core::{Battery, BatteryId, ExperimentResult, ExperimentTemplate, SelectionPolicy, Worker, WorkerId};
use expdj_storage::{JsonStorage, Storage};
use expdj_selection::{CompletionTracker, FixedCountSelector, SessionAssembler, TimeBudgetSelector};
use expdj_turk::{Credentials, TaskMarketplace, TurkClient};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "expdj")]
#[command(about = "Experiment battery selection and completion tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory, overriding the settings file
    #[arg(short, long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage batteries
    Battery {
        #[command(subcommand)]
        command: BatteryCommands,
    },
    /// Manage workers
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
    /// Record a completed experiment
    Complete {
        /// Battery ID
        battery: String,
        /// Worker ID or marketplace worker ID
        worker: String,
        /// Experiment tag
        exp_id: String,
    },
    /// Show which experiments a worker has or has not completed
    Progress {
        /// Battery ID
        battery: String,
        /// Worker ID or marketplace worker ID
        worker: String,
        /// List completed experiments instead of remaining ones
        #[arg(long)]
        completed: bool,
    },
    /// Assemble the next session for a worker
    Assemble {
        /// Battery ID
        battery: String,
        /// Worker ID or marketplace worker ID
        worker: String,
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        /// Allow inactive batteries
        #[arg(long)]
        preview: bool,
        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the external question serving a worker's next session
    Question {
        /// Battery ID
        battery: String,
        /// Worker ID or marketplace worker ID
        worker: String,
    },
}

#[derive(Subcommand)]
enum BatteryCommands {
    /// Create a battery
    Add {
        /// Battery name
        name: String,
        /// Time budget per session, in seconds
        #[arg(long, conflicts_with = "count", allow_negative_numbers = true)]
        max_seconds: Option<f64>,
        /// Experiments per session
        #[arg(long, allow_negative_numbers = true)]
        count: Option<i64>,
        /// Marketplace credentials file name
        #[arg(long)]
        credentials: Option<String>,
    },
    /// List batteries
    List,
    /// Add an experiment to a battery
    AddExperiment {
        /// Battery ID
        battery: String,
        /// Experiment tag
        exp_id: String,
        /// Duration in minutes
        minutes: u32,
    },
    /// Remove an experiment from a battery
    RemoveExperiment {
        /// Battery ID
        battery: String,
        /// Experiment tag
        exp_id: String,
    },
}

#[derive(Subcommand)]
enum WorkerCommands {
    /// Register a worker
    Add {
        /// Identifier assigned by the marketplace
        #[arg(long)]
        marketplace_id: Option<String>,
    },
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_dir = data;
    }
    init_logging(&config);

    let mut storage = JsonStorage::new(&config.data_dir).await?;

    match cli.command {
        Commands::Battery { command } => run_battery(&mut storage, command).await?,
        Commands::Worker { command: WorkerCommands::Add { marketplace_id } } => {
            let worker = match marketplace_id {
                Some(id) => Worker::from_marketplace(id),
                None => Worker::anonymous(),
            };
            storage.save_worker(&worker).await?;
            storage.commit("Add worker").await?;
            println!("Added worker: {}", worker.id);
        }
        Commands::Complete { battery, worker, exp_id } => {
            let battery = storage.require_battery(parse_battery(&battery)?).await?;
            let worker = resolve_worker(&storage, &worker).await?;
            if !battery.contains(&exp_id) {
                return Err(anyhow!("Experiment '{}' is not in battery {}", exp_id, battery.id));
            }

            let mut result = ExperimentResult::new(worker, battery.id, &exp_id);
            result.mark_completed();
            storage.save_result(&result).await?;
            storage.commit("Record result").await?;
            info!("Recorded {} as completed for worker {}", exp_id, worker);
            println!("Completed: {}", exp_id);
        }
        Commands::Progress { battery, worker, completed } => {
            let battery = parse_battery(&battery)?;
            let worker = resolve_worker(&storage, &worker).await?;
            let tracker = CompletionTracker::new();

            let tags = tracker.get_worker_experiments(&storage, worker, battery, completed).await?;
            let progress = tracker.progress(&storage, worker, battery).await?;

            println!(
                "{} of {} completed ({:.0}%)",
                progress.completed,
                progress.total,
                progress.percentage()
            );
            println!("{} ({})", if completed { "Completed" } else { "Remaining" }, tags.len());
            for tag in tags {
                println!("  {}", tag);
            }
        }
        Commands::Assemble { battery, worker, seed, preview, json } => {
            let battery = parse_battery(&battery)?;
            let worker = resolve_worker(&storage, &worker).await?;

            let mut assembler = SessionAssembler::new(storage).require_active(!preview);
            if let Some(seed) = seed {
                assembler = assembler.with_seed(seed);
            }
            let session = assembler.assemble(worker, battery).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else if session.finished {
                println!("Worker {} has completed every experiment in battery {}", worker, battery);
            } else {
                println!("Session ({} experiments, {} minutes)", session.experiments.len(), session.total_minutes);
                for (i, exp) in session.experiments.iter().enumerate() {
                    println!("  {}. {} ({} min)", i + 1, exp.exp_id(), exp.template.time);
                }
            }
        }
        Commands::Question { battery, worker } => {
            let battery = storage.require_battery(parse_battery(&battery)?).await?;
            let worker = resolve_worker(&storage, &worker).await?;

            let credentials = Credentials::load(&config.marketplace, &battery).await?;
            let client = TurkClient::new(config.marketplace.clone(), credentials)?;

            let session = SessionAssembler::new(storage).assemble(worker, battery.id).await?;
            if session.finished {
                return Err(anyhow!("Worker {} has nothing left to do in battery {}", worker, battery.id));
            }
            println!("{}", client.question_for(&session)?.to_xml());
        }
    }

    Ok(())
}

async fn run_battery(storage: &mut JsonStorage, command: BatteryCommands) -> Result<()> {
    match command {
        BatteryCommands::Add { name, max_seconds, count, credentials } => {
            let policy = match (max_seconds, count) {
                (Some(max_seconds), None) => SelectionPolicy::TimeBudget {
                    max_seconds: TimeBudgetSelector::new(max_seconds)?.max_seconds(),
                },
                (None, Some(count)) => SelectionPolicy::FixedCount {
                    count: FixedCountSelector::from_signed(count)?.count(),
                },
                (None, None) => SelectionPolicy::default(),
                (Some(_), Some(_)) => return Err(anyhow!("Choose either --max-seconds or --count")),
            };

            let mut battery = Battery::new(name, policy);
            battery.credentials = credentials;
            storage.save_battery(&battery).await?;
            storage.commit("Add battery").await?;
            println!("Added battery: {} - {} [{}]", battery.id, battery.name, battery.selection);
        }
        BatteryCommands::List => {
            let batteries = storage.list_batteries().await?;
            println!("Batteries ({})", batteries.len());
            for battery in batteries {
                println!(
                    "  {} | {} | {} experiments, {} min | {}{}",
                    battery.id,
                    battery.name,
                    battery.experiments.len(),
                    battery.total_minutes(),
                    battery.selection,
                    if battery.active { "" } else { " | INACTIVE" },
                );
            }
        }
        BatteryCommands::AddExperiment { battery, exp_id, minutes } => {
            let mut battery = storage.require_battery(parse_battery(&battery)?).await?;
            if !battery.add_experiment(ExperimentTemplate::new(&exp_id, minutes)) {
                println!("Experiment '{}' is already in battery {}", exp_id, battery.id);
                return Ok(());
            }
            storage.save_battery(&battery).await?;
            storage.commit("Add experiment").await?;
            println!("Added {} ({} min) to {}", exp_id, minutes, battery.name);
        }
        BatteryCommands::RemoveExperiment { battery, exp_id } => {
            let mut battery = storage.require_battery(parse_battery(&battery)?).await?;
            if battery.remove_experiment(&exp_id).is_none() {
                return Err(anyhow!("Experiment '{}' is not in battery {}", exp_id, battery.id));
            }
            storage.save_battery(&battery).await?;
            storage.commit("Remove experiment").await?;
            println!("Removed {} from {}", exp_id, battery.name);
        }
    }
    Ok(())
}

fn parse_battery(s: &str) -> Result<BatteryId> {
    s.parse().map_err(|_| anyhow!("Invalid battery ID: {}", s))
}

/// Accept either a local worker ID or the marketplace's worker ID.
async fn resolve_worker(storage: &dyn Storage, s: &str) -> Result<WorkerId> {
    if let Ok(id) = s.parse::<WorkerId>() {
        return Ok(storage.require_worker(id).await?.id);
    }
    storage
        .find_worker_by_marketplace_id(s)
        .await?
        .map(|w| w.id)
        .ok_or_else(|| anyhow!("Unknown worker: {}", s))
}
