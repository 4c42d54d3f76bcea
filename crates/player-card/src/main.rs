use anyhow::{Context, Result};
use card_dates::{parse_iso_date, DateCalculator, SystemClock};
use clap::{Parser, Subcommand};
use player_card::{run_batch, telemetry, CardConfig, CardRequest, Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "player-card",
    about = "Generate two-page player card PDFs from an SVG template",
    version
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a single card
    Generate {
        /// Player name
        name: String,
        /// Date of birth (YYYY-MM-DD)
        dob: String,
        /// Issue date (YYYY-MM-DD), defaults to today
        issue_date: Option<String>,
        /// Write the card here instead of the output directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Generate a card for every entry of a YAML player list
    Batch {
        /// YAML file with `name`, `dob` and optional `issue_date` entries
        file: PathBuf,
    },
    /// Show the issue and expiration dates without generating anything
    Dates {
        /// Issue date (YYYY-MM-DD), defaults to today
        issue_date: Option<String>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = CardConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    telemetry::init(&config.log_level).context("failed to initialise logging")?;

    match cli.command {
        Command::Generate {
            name,
            dob,
            issue_date,
            output,
        } => {
            let request = CardRequest::parse(&name, &dob, issue_date.as_deref())?;
            let pipeline = Pipeline::from_config(config, SystemClock)?;

            let outcome = match output {
                Some(path) => pipeline.run_to(&request, path)?,
                None => pipeline.run(&request)?,
            };
            println!("{outcome}");
        }
        Command::Batch { file } => {
            let pipeline = Pipeline::from_config(config, SystemClock)?;
            println!("Processing players from {}...\n", file.display());

            let report = run_batch(&pipeline, &file)?;
            for outcome in &report.generated {
                println!("{outcome}\n");
            }
            if report.skipped > 0 {
                println!("⚠ Skipped {} entries with missing name or dob", report.skipped);
            }
            println!(
                "✓ Batch complete: {} cards generated in {}/",
                report.generated.len(),
                pipeline.config().output_dir.display()
            );
        }
        Command::Dates { issue_date } => {
            let issue_date = issue_date
                .as_deref()
                .map(parse_iso_date)
                .transpose()
                .context("invalid issue date")?;
            let dates = DateCalculator::system().with_display_format(&config.date_format)?;
            let resolved = dates.resolve(issue_date)?;

            println!("Issued:  {}", dates.format_for_display(resolved.issue_date));
            println!("Expires: {}", dates.format_for_display(resolved.expiration_date));
        }
    }

    Ok(())
}
