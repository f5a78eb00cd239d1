use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

// reqwest/hyper get chatty at debug level
const NOISY_CRATES: &str = "hyper=info,hyper_util=info,reqwest=warn";

const DEFAULT_LEVEL: &str = "info";

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "flowcore_connector={level},{level},{NOISY_CRATES}"
    ))
}

/// `RUST_LOG` wins over everything; otherwise `--verbose` picks debug.
fn initial_filter(verbose: bool) -> (EnvFilter, bool) {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (filter_for(if verbose { "debug" } else { DEFAULT_LEVEL }), false),
    }
}

/// The level the config file may still impose once it has been loaded.
fn config_level(from_env: bool, verbose: bool, log_level: Option<&str>) -> Option<&str> {
    if from_env || verbose {
        return None;
    }
    log_level.filter(|level| *level != DEFAULT_LEVEL)
}

/// Lets the config `log_level` take effect after logging is already running.
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
    verbose: bool,
}

impl LogLevelHandle {
    pub fn apply_config_level(&self, log_level: Option<&str>) {
        let Some(level) = config_level(self.from_env, self.verbose, log_level) else {
            return;
        };
        if let Err(e) = self.handle.reload(filter_for(level)) {
            tracing::warn!("Could not apply log level '{}': {}", level, e);
        }
    }
}

pub fn init_cli_logger(verbose: bool) -> LogLevelHandle {
    let (filter, from_env) = initial_filter(verbose);
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
    LogLevelHandle {
        handle,
        from_env,
        verbose,
    }
}

/// JSON output for log shippers.
pub fn init_json_logger(verbose: bool) -> LogLevelHandle {
    let (filter, from_env) = initial_filter(verbose);
    let (filter, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
    LogLevelHandle {
        handle,
        from_env,
        verbose,
    }
}
