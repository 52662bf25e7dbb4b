use anyhow::Result;
use residency_stats_builder::{process_directory, ParserConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // log records from the library are forwarded through tracing-log
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = ParserConfig::default();
    let summary = process_directory(&config)?;

    if let Some(outputs) = summary.outputs {
        println!(
            "Parsed {} of {} files into {}",
            summary.files_parsed,
            summary.files_found,
            outputs.formatted.display()
        );
    }

    Ok(())
}
