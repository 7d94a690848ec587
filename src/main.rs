//! Tekst CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tekst::cli::{commands, Cli, Commands};
use tekst::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tekst={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            let path = config_path.clone().unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&settings, &path)?;
        }

        Commands::Select { path } => {
            commands::run_select(path, settings).await?;
        }

        Commands::Transcribe {
            path,
            backend,
            force,
            output,
            format,
        } => {
            commands::run_transcribe(path, backend.as_deref(), *force, output.clone(), format, settings).await?;
        }

        Commands::Translate {
            fingerprint,
            adhoc,
            backend,
            only_missing,
            concurrency,
        } => {
            commands::run_translate(
                fingerprint.as_deref(),
                adhoc.as_deref(),
                backend.as_deref(),
                *only_missing,
                *concurrency,
                settings,
            )
            .await?;
        }

        Commands::Evict { fingerprint } => {
            commands::run_evict(fingerprint, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Show { fingerprint, translated } => {
            commands::run_show(fingerprint, *translated, settings).await?;
        }

        Commands::Locate { fingerprint, time } => {
            commands::run_locate(fingerprint, time, settings).await?;
        }

        Commands::Export {
            fingerprint,
            output,
            format,
            translated,
        } => {
            commands::run_export(fingerprint, output.clone(), format, *translated, settings).await?;
        }

        Commands::Summarize { fingerprint } => {
            commands::run_summarize(fingerprint, settings).await?;
        }

        Commands::Speak { text, output } => {
            commands::run_speak(text, output, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
