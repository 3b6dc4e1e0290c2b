use logicmapper::cli::commands::{CliArgs, Commands};
use logicmapper::cli::handlers::{handle_analyze, handle_reset, handle_status};
use logicmapper::util::logging::{self, parse_level, LoggingConfig};
use logicmapper::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("logicmapper v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args, args.quiet).await,
        Commands::Status(status_args) => handle_status(status_args).await,
        Commands::Reset(reset_args) => handle_reset(reset_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("LOGICMAPPER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    let use_json = env::var("LOGICMAPPER_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    logging::init_logging(LoggingConfig {
        level,
        use_json,
        ..LoggingConfig::default()
    });
}
