use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = tido::cli::Cli::parse();
    let config = tido::config::from_cli(&cli)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    tido::commands::execute(&config, cli.command, &mut handle)?;

    Ok(())
}
