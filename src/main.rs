//! triage - consumer complaint classification CLI

use clap::Parser;
use triage::cli::{cmd_benchmark, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Benchmark {
            data,
            text_column,
            label_column,
            categories,
            seed,
            predict,
        } => {
            cmd_benchmark(
                &data,
                &text_column,
                &label_column,
                categories.as_ref(),
                seed,
                &predict,
            )?;
        }
        Commands::Info {
            data,
            text_column,
            label_column,
            categories,
        } => {
            cmd_info(&data, &text_column, &label_column, categories.as_ref())?;
        }
    }

    Ok(())
}
