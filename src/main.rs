// DICOM Anonymizer - Rule-driven metadata anonymization for medical images
// Copyright (c) 2025 DICOM Anonymizer Contributors
// Licensed under the MIT License

use clap::Parser;
use dicom_anonymizer::anonymization::config::DEFAULT_PLACEHOLDER;
use dicom_anonymizer::cli::{Cli, Commands};
use dicom_anonymizer::config::{AppConfig, LoggingConfig};
use dicom_anonymizer::domain::Result;
use dicom_anonymizer::log_error_with_context;
use dicom_anonymizer::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Configuration errors are reported by the command; logging falls back to the console
    let loaded = cli.load_config();
    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "DICOM Anonymizer"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        eprintln!("\n⚠️  Shutdown signal received, finishing the current file...");
        let _ = shutdown_tx.send(true);
    });

    // Execute command and get exit code
    let exit_code = match execute_command(&cli, &loaded, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            log_error_with_context!(format!("{e:#}"), "Command execution failed");
            eprintln!("Error: {e:#}");
            5 // Fatal error exit code
        }
    };

    // Flush the file writer before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                    }
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown..."),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    loaded: &Result<AppConfig>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Init(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config_path(), loaded).await,
        Commands::Inspect(args) => args.execute().await,
        Commands::Verify(args) => {
            let placeholder = loaded
                .as_ref()
                .map(|config| config.anonymization.placeholder.as_str())
                .unwrap_or(DEFAULT_PLACEHOLDER);
            args.execute(placeholder).await
        }
        Commands::Anonymize(args) => match loaded {
            Ok(config) => args.execute(config, shutdown_signal).await,
            Err(e) => Ok(report_config_error(e)),
        },
        Commands::AnonymizeFile(args) => match loaded {
            Ok(config) => args.execute(config).await,
            Err(e) => Ok(report_config_error(e)),
        },
    }
}

fn report_config_error(error: &dicom_anonymizer::domain::AnonymizerError) -> i32 {
    log_error_with_context!(error, "Configuration error");
    eprintln!("{error}");
    2 // Configuration error exit code
}
