use anyhow::{Context, Result};
use prenoms_report::clean::clean_and_process;
use prenoms_report::config::Config;
use prenoms_report::util::format_int;
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    // Optional positional arguments: [INPUT] [OUTPUT]; defaults come from the configuration.
    let config = Config::load().context("reading configuration")?;
    let mut args = env::args().skip(1);
    let input = args.next().map(PathBuf::from).unwrap_or(config.raw_data_path);
    let output = args.next().map(PathBuf::from).unwrap_or(config.clean_data_path);

    let report = clean_and_process(&input, &output)
        .with_context(|| format!("cleaning {} into {}", input.display(), output.display()))?;

    info!("done");
    println!(
        "{} rows read, {} written ({} missing values, {} single-letter names, {} placeholder rows, {} parse errors)",
        format_int(report.total_rows),
        format_int(report.written_rows),
        format_int(report.missing_values),
        format_int(report.single_letter_rows),
        format_int(report.sentinel_rows),
        format_int(report.parse_errors)
    );
    Ok(())
}
