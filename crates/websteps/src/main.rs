use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use websteps_common::action::Action;
use websteps_engine::api::{HttpTestCaseApi, TestCaseApi};
use websteps_engine::capture::CaptureSettings;
use websteps_engine::config::{ConfigLoader, WebStepsConfig};
use websteps_engine::export::{DirectorySink, ExportOutcome};
use websteps_engine::formatter::actions_to_readable_text;
use websteps_engine::replay::{replay_file, run_live};
use websteps_engine::recorder::Recorder;
use websteps_engine::scheduler::Scheduler;
use websteps_engine::storage::{FileStore, TestCaseHistory};
use websteps_engine::upload::{TestCaseForm, save_test_case};

#[derive(Parser)]
#[command(name = "websteps", version, about = "Record browser interactions as replayable steps")]
struct Args {
    /// Configuration file (defaults to $WEBSTEPS_CONFIG, ./websteps.yaml, then ~/.websteps/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded session script and export the resulting actions
    Replay {
        script: PathBuf,
        /// Directory for recorded-actions.json
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also print the readable steps
        #[arg(long)]
        text: bool,
    },
    /// Record from a live event stream on stdin until EOF
    Record {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        text: bool,
    },
    /// Print readable steps for an exported actions file
    Render { actions: PathBuf },
    /// List projects on the test-management service
    Projects,
    /// Upload an exported actions file as a new test case
    Upload {
        actions: PathBuf,
        #[arg(long)]
        project: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Page the actions were recorded on
        #[arg(long)]
        url: url::Url,
    },
    /// Show or clear locally stored test cases
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await,
        None => ConfigLoader::load_default().await,
    }
    .context("Failed to load configuration")?;

    match args.command {
        Command::Replay { script, out, text } => {
            let recorder = replay_file(&script, CaptureSettings::from(&config.recorder))
                .await
                .with_context(|| format!("Failed to replay {}", script.display()))?;
            finish_session(recorder, &config, out, text).await
        }
        Command::Record { out, text } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let recorder = run_live(stdin, CaptureSettings::from(&config.recorder)).await?;
            finish_session(recorder, &config, out, text).await
        }
        Command::Render { actions } => {
            let actions = read_actions(&actions).await?;
            println!(
                "{}",
                actions_to_readable_text(&actions, &config.security.sensitive_fields)
            );
            Ok(())
        }
        Command::Projects => {
            let api = HttpTestCaseApi::from_config(&config.api)?;
            for project in api.list_projects().await? {
                println!(
                    "{}\t{} ({} tests)",
                    project.id, project.name, project.testcases.total
                );
            }
            Ok(())
        }
        Command::Upload {
            actions,
            project,
            name,
            description,
            url,
        } => {
            let actions = read_actions(&actions).await?;
            let api = HttpTestCaseApi::from_config(&config.api)?;
            let history = open_history(&config).await?;
            let form = TestCaseForm {
                test_case_name: name,
                project_id: project,
                description,
            };
            let outcome = save_test_case(&form, &actions, url.as_str(), &api, &history).await?;
            println!("Test case saved successfully! (id {})", outcome.remote_id);
            for (i, step) in outcome.steps.iter().enumerate() {
                println!("{}. {}", i + 1, step);
            }
            Ok(())
        }
        Command::History { clear } => {
            let history = open_history(&config).await?;
            if clear {
                history.clear().await?;
                println!("History cleared");
                return Ok(());
            }
            for record in history.list().await? {
                println!(
                    "{}\t{}\t{} actions\t{}",
                    record.remote_id.as_deref().unwrap_or("-"),
                    record.test_case_name,
                    record.recorded_actions.len(),
                    record.url
                );
            }
            Ok(())
        }
    }
}

async fn finish_session<S: Scheduler>(
    mut recorder: Recorder<S>,
    config: &WebStepsConfig,
    out: Option<PathBuf>,
    text: bool,
) -> anyhow::Result<()> {
    let dir = out.unwrap_or_else(|| config.storage.export_dir.clone());
    let mut sink = DirectorySink::new(dir);

    match recorder.download(&mut sink).await? {
        ExportOutcome::Exported { target, .. } => info!("Wrote {}", target),
        ExportOutcome::NoActions => println!("No actions to download"),
    }

    if text {
        println!(
            "{}",
            actions_to_readable_text(
                &recorder.stored_actions(),
                &config.security.sensitive_fields
            )
        );
    }
    Ok(())
}

async fn read_actions(path: &Path) -> anyhow::Result<Vec<Action>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not an actions file", path.display()))?;
    if actions.is_empty() {
        bail!("No actions recorded");
    }
    Ok(actions)
}

async fn open_history(config: &WebStepsConfig) -> anyhow::Result<TestCaseHistory<FileStore>> {
    let history = TestCaseHistory::new(Arc::new(FileStore::new(&config.storage.history_path)));
    history.initialize().await?;
    Ok(history)
}
