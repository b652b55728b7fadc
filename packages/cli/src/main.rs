use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use console::style;
use intake_common::{ApplicationForm, validate_form};

use intake_cli::client::{Attachment, HttpSubmitter};
use intake_cli::prompt;
use intake_cli::wizard::{FormController, NavigationError, Phase, Step};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Apply to the Runway VNEST pre-incubation programme", long_about = None)]
struct Cli {
    /// Base URL of the intake server
    #[arg(long, env = "INTAKE_SERVER_URL", default_value = "http://127.0.0.1:3000", global = true)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the application step by step
    Apply,

    /// Submit an application prepared as a JSON file
    Submit(FileArgs),

    /// Check a JSON application file without submitting it
    Validate(FileArgs),
}

#[derive(Args)]
struct FileArgs {
    /// Application JSON using the form's field names
    #[arg(short, long)]
    file: PathBuf,

    /// Optional slide deck (.ppt, .pptx or .pdf, at most 20 MB)
    #[arg(long)]
    deck: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply => {
            let submitter = HttpSubmitter::new(&cli.server);
            let mut controller = FormController::new();
            prompt::run(&mut controller, &submitter)
        }
        Commands::Submit(args) => submit_file(&cli.server, args),
        Commands::Validate(args) => validate_file(args),
    }
}

fn load_form(path: &Path) -> anyhow::Result<ApplicationForm> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid application", path.display()))
}

fn validate_file(args: FileArgs) -> anyhow::Result<()> {
    let form = load_form(&args.file)?;
    if let Some(deck) = &args.deck {
        Attachment::from_path(deck)?;
    }

    match validate_form(&form) {
        Ok(()) => {
            println!("{}", style("Application is complete and valid.").green());
            Ok(())
        }
        Err(errors) => {
            for error in errors.errors() {
                println!("  {} {}", style("•").red(), error);
            }
            bail!("{} problem(s) found", errors.errors().len())
        }
    }
}

/// Walks the same steps as the interactive flow, so a file is held to the
/// per-step checks before the final one.
fn submit_file(server: &str, args: FileArgs) -> anyhow::Result<()> {
    let form = load_form(&args.file)?;
    let mut controller = FormController::with_form(form);
    if let Some(deck) = &args.deck {
        controller.attach(deck)?;
    }

    while let Some(step) = controller.step().filter(|s| *s != Step::Consent) {
        match controller.advance() {
            Ok(_) => {}
            Err(NavigationError::Invalid(errors)) => {
                println!("{} {}", style(step.title()).bold(), style("is incomplete:").red());
                for error in errors.errors() {
                    println!("  {} {}", style("•").red(), error);
                }
                bail!("application was not submitted");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let submitter = HttpSubmitter::new(server);
    println!("Submitting to {} ...", submitter.endpoint());

    match controller.submit(&submitter)? {
        Phase::Succeeded(receipt) => {
            println!(
                "{} Application ID {} at {}",
                style("Submitted.").green().bold(),
                receipt.application_id,
                receipt.submitted_at.to_rfc3339()
            );
            Ok(())
        }
        Phase::Failed(message) => bail!("{message}"),
        _ => bail!("unexpected state after submission"),
    }
}
