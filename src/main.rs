use clap::Parser;
use flowcore_connector::utils::error::{ConnectorError, ErrorSeverity};
use flowcore_connector::utils::logger;
use flowcore_connector::{
    CliArgs, ConnectorRunner, FlowcoreConnector, FlowcoreConnectorConfig, LoggingPublisher,
    RunnerSettings,
};
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // clap prints usage and exits with code 2 on bad arguments
    let args = CliArgs::parse();

    // `.env` warnings are emitted while the config loads
    let log_level = if args.json_logs {
        logger::init_json_logger(args.verbose)
    } else {
        logger::init_cli_logger(args.verbose)
    };

    let config = match FlowcoreConnectorConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(ConnectorError::ConfigNotFound { .. }) => {
            tracing::error!("Configuration file '{}' not found", args.config.display());
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Configuration validation error: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    log_level.apply_config_level(config.log_level.as_deref());

    let robot_ids = config.robot_ids();
    tracing::info!("Configuration loaded for fleet of {} robots", robot_ids.len());
    tracing::info!("Robot IDs: {:?}", robot_ids);

    if args.dry_run {
        display_config_summary(&config);
        return Ok(());
    }

    let settings = RunnerSettings::from_config(&config)?;
    let connector = FlowcoreConnector::new(config);
    let (runner, handle) = ConnectorRunner::new(connector, Arc::new(LoggingPublisher), settings);

    tracing::info!("Starting FLOWCore Connector...");
    let mut task = tokio::spawn(runner.run());

    let outcome = tokio::select! {
        joined = &mut task => joined?,
        _ = shutdown_signal() => {
            handle.stop();
            task.await?
        }
    };

    match outcome {
        Ok(_) => {
            tracing::info!("✅ FLOWCore Connector stopped");
        }
        Err(e) => {
            tracing::error!(
                "❌ Connector failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &FlowcoreConnectorConfig) {
    let fleet = &config.connector_config;
    println!("📋 Configuration Summary:");
    println!("  Connector type: {}", config.connector_type);
    println!("  Fleet API: {}:{}", fleet.fleet_host, fleet.fleet_port);
    println!("  Fleet user: {}", fleet.fleet_username);
    println!("  Update frequency: {} Hz", config.update_freq);
    println!("  Robots:");
    for robot in &config.fleet {
        println!(
            "    {} -> FLOWCore #{} ({} camera(s))",
            robot.robot_id,
            robot.fleet_robot_id,
            robot.cameras.len()
        );
    }
    if !config.maps.is_empty() {
        println!("  Maps:");
        for (frame_id, map) in &config.maps {
            println!("    {} -> {}", frame_id, map.file.display());
        }
    }
    println!();
    println!("🔍 Dry run complete. No connection was made.");
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down connector...");
}
