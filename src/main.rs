//! gha-settings CLI
//!
//! Entry point for the `gha-settings` command-line tool.

use clap::{Parser, Subcommand};
use gha_settings::commands::{self, ConfigureArgs};
use gha_settings::{CliScm, RunContext, Workflow};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gha-settings")]
#[command(about = "Derived settings and reports for GitHub Actions workflows", version)]
struct Cli {
    /// Repository checkout
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".", global = true)]
    clone_dir: PathBuf,

    /// Settings file (default: <clone-dir>/.github/settings.yml)
    #[arg(long, env = "GHA_SETTINGS_FILE", global = true)]
    settings: Option<PathBuf>,

    /// Output channel
    #[arg(long, env = "GITHUB_OUTPUT", global = true, hide_env_values = true)]
    output_file: Option<PathBuf>,

    /// Step summary channel
    #[arg(long, env = "GITHUB_STEP_SUMMARY", global = true, hide_env_values = true)]
    summary_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute outputs for a workflow job
    Configure {
        /// `github` context, JSON encoded
        #[arg(long)]
        github: String,

        /// `inputs` context, JSON encoded
        #[arg(long)]
        inputs: Option<String>,

        /// Output assignments, one `VAR = ctx.path` per line
        #[arg(long)]
        outputs: Option<String>,

        /// Workflow whose outputs to compute
        #[arg(long, value_enum)]
        workflow: Option<Workflow>,

        /// Environment variables to re-export as outputs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        export_env: Vec<String>,
    },

    /// Append a workflow report to the step summary
    Summarize {
        /// Workflow whose report to render
        #[arg(long, value_enum)]
        workflow: Workflow,

        /// `github` context, JSON encoded
        #[arg(long)]
        github: String,

        /// `inputs` context, JSON encoded
        #[arg(long)]
        inputs: Option<String>,
    },

    /// Print a value of the merged configuration
    Select {
        /// `github` context, JSON encoded
        #[arg(long)]
        github: String,

        /// Dotted path, e.g. `release.tag`
        #[arg(long)]
        path: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gha_settings=info,gha_output=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let mut run = RunContext::new(&cli.clone_dir)
        .with_output_path(cli.output_file)
        .with_summary_path(cli.summary_file);
    if let Some(settings) = cli.settings {
        run = run.with_settings_file(settings);
    }
    let scm = CliScm::new(&cli.clone_dir);

    let result = match cli.command {
        Commands::Configure {
            github,
            inputs,
            outputs,
            workflow,
            export_env,
        } => {
            let args = ConfigureArgs {
                github,
                inputs,
                outputs,
                workflow,
                export_env,
            };
            commands::configure(&run, &scm, &args).map(|_| ())
        }
        Commands::Summarize {
            workflow,
            github,
            inputs,
        } => commands::summarize(&run, &scm, workflow, &github, inputs.as_deref()).map(|_| ()),
        Commands::Select { github, path } => {
            commands::select(&run, &scm, &github, &path).map(|value| match value {
                serde_json::Value::String(s) => println!("{}", s),
                other => println!("{}", other),
            })
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
