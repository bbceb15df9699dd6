use clap::Parser;
use color_eyre::Result;
use moviescope::{AppConfig, Args, ConfigManager, APP_NAME};
use tracing_subscriber::EnvFilter;

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(config_path) => {
                    println!("Configuration file written to: {}", config_path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing configuration file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Default log filter. `RUST_LOG` wins when set.
fn default_log_filter(debug: bool) -> String {
    if debug {
        format!("{}=debug,warn", APP_NAME)
    } else {
        format!("{}=info,warn", APP_NAME)
    }
}

fn init_logging(debug: bool) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(debug))),
        )
        .init();
}

fn run_export(config: &AppConfig, args: &Args) -> Result<()> {
    let Some(path) = &args.export else {
        return Ok(());
    };
    let state = moviescope::controls_from_args(args)?.state();
    let written = moviescope::export_filtered(config, &state, path)?;
    println!("Wrote {} movies to {}", written, path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(APP_NAME)?;
    config.apply_args(&args);
    config.validate()?;
    init_logging(config.debug.enabled);

    if args.export.is_some() {
        let config = config.clone();
        return tokio::task::spawn_blocking(move || run_export(&config, &args)).await?;
    }

    moviescope::server::serve(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_follows_debug_flag() {
        assert_eq!(default_log_filter(false), "moviescope=info,warn");
        assert_eq!(default_log_filter(true), "moviescope=debug,warn");
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::try_parse_from([
            "moviescope",
            "--port",
            "8080",
            "--collection",
            "abc",
            "--limit",
            "50",
            "--debug",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        config.apply_args(&args);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.collection_id, "abc");
        assert_eq!(config.store.limit, 50);
        assert!(config.debug.enabled);
        assert!(config.validate().is_ok());
    }
}
