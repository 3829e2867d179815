use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use cadence_mapper::WorkflowMapper;
use cadence_stats::{RunStatus, SqliteStatisticsStore, WorkflowRun};
use cadence_workflow::Workflow;

/// Cadence - read-model rendering for automation workflows
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.cadence)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Render workflows into their wire representation
  Render {
    #[command(subcommand)]
    target: RenderTarget,
  },

  /// Record a workflow run (stand-in for the execution tracker)
  RecordRun {
    /// The workflow the run belongs to
    workflow_id: i64,

    /// Run outcome: running, completed, failed or cancelled
    #[arg(long, default_value = "completed")]
    status: String,
  },
}

#[derive(Subcommand)]
enum RenderTarget {
  /// Render the full detail view of one workflow
  Workflow {
    /// Path to the workflow snapshot file (JSON)
    workflow_file: PathBuf,
  },

  /// Render the condensed list view of several workflows
  List {
    /// Paths to workflow snapshot files (JSON)
    workflow_files: Vec<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".cadence")
  });

  match cli.command {
    Some(Commands::Render { target }) => match target {
      RenderTarget::Workflow { workflow_file } => {
        render_workflow(workflow_file, data_dir)?;
      }
      RenderTarget::List { workflow_files } => {
        render_list(workflow_files, data_dir)?;
      }
    },
    Some(Commands::RecordRun {
      workflow_id,
      status,
    }) => {
      record_run(workflow_id, status, data_dir)?;
    }
    None => {
      println!("cadence - use --help to see available commands");
    }
  }

  Ok(())
}

fn render_workflow(workflow_file: PathBuf, data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { render_workflow_async(workflow_file, data_dir).await })
}

async fn render_workflow_async(workflow_file: PathBuf, data_dir: PathBuf) -> Result<()> {
  let workflow = read_workflow(&workflow_file).await?;
  eprintln!("Loaded workflow: {}", workflow.name);

  let graph = workflow.graph();
  eprintln!(
    "Graph: {} step(s), {} entry point(s), {} terminal step(s)",
    workflow.steps.len(),
    graph.entry_points().len(),
    graph.terminal_points().len()
  );

  let mapper = open_mapper(&data_dir).await?;
  let wire = mapper
    .build_workflow(&workflow)
    .await
    .with_context(|| format!("failed to render workflow {}", workflow.id))?;

  println!("{}", serde_json::to_string_pretty(&wire)?);
  Ok(())
}

fn render_list(workflow_files: Vec<PathBuf>, data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { render_list_async(workflow_files, data_dir).await })
}

async fn render_list_async(workflow_files: Vec<PathBuf>, data_dir: PathBuf) -> Result<()> {
  let mut workflows = Vec::with_capacity(workflow_files.len());
  for workflow_file in &workflow_files {
    workflows.push(read_workflow(workflow_file).await?);
  }
  eprintln!("Loaded {} workflow(s)", workflows.len());

  let mapper = open_mapper(&data_dir).await?;
  let items = mapper
    .build_workflow_list(&workflows)
    .await
    .context("failed to render workflow list")?;

  println!("{}", serde_json::to_string_pretty(&items)?);
  Ok(())
}

fn record_run(workflow_id: i64, status: String, data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let status = parse_run_status(&status)?;
    let store = open_store(&data_dir).await?;

    let run = WorkflowRun {
      run_id: format!(
        "run-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
      ),
      workflow_id,
      status,
      created_at: Utc::now(),
    };
    store.record_run(&run).await?;

    eprintln!("Recorded run {} for workflow {}", run.run_id, workflow_id);
    Ok(())
  })
}

async fn read_workflow(workflow_file: &Path) -> Result<Workflow> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

async fn open_store(data_dir: &Path) -> Result<SqliteStatisticsStore> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let db_path = data_dir.join("stats.db");
  SqliteStatisticsStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open statistics database: {}", db_path.display()))
}

async fn open_mapper(data_dir: &Path) -> Result<WorkflowMapper<SqliteStatisticsStore>> {
  Ok(WorkflowMapper::new(open_store(data_dir).await?))
}

fn parse_run_status(status: &str) -> Result<RunStatus> {
  match status {
    "running" => Ok(RunStatus::Running),
    "completed" => Ok(RunStatus::Completed),
    "failed" => Ok(RunStatus::Failed),
    "cancelled" => Ok(RunStatus::Cancelled),
    other => bail!("unknown run status: {other}"),
  }
}
