use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use experiment_health::cli::{Cli, OutputFormat};
use experiment_health::health::HealthConfig;
use experiment_health::report::HealthReport;
use experiment_health::{input, json_output, table_output};
use tracing_subscriber::EnvFilter;

/// Exit status when an indicator reaches the `--fail-on` severity
const UNHEALTHY_EXIT_CODE: i32 = 2;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => HealthConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HealthConfig::default(),
    };

    let experiment =
        input::load_experiment(&args.experiment).context("Failed to load experiment")?;
    let analyses = input::load_analyses(&args.analyses).context("Failed to load analyses")?;

    let now = args.now.unwrap_or_else(Utc::now);
    let report = HealthReport::build(&experiment, &analyses, now, &config);

    match args.format {
        OutputFormat::Text => print!("{}", table_output::render(&report)),
        OutputFormat::Json => println!(
            "{}",
            json_output::to_json(&report).context("Failed to serialize report")?
        ),
    }

    if let Some(fail_on) = args.fail_on {
        if report.fails(fail_on.threshold()) {
            std::process::exit(UNHEALTHY_EXIT_CODE);
        }
    }

    Ok(())
}
