use std::process;

use anyhow::Result;
use log::error;

use walgen::scheme::GenerateError;
use walgen::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        // A missing tool is a user-facing condition, not an application fault
        match e.downcast_ref::<GenerateError>() {
            Some(generate_error) if generate_error.remediation().is_some() => {
                eprintln!("{}", generate_error);
            }
            _ => {
                error!("Application error: {:#}", e);
                eprintln!("Error: {:#}", e);
            }
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let generator_config = app::build_generator_config(&args, &config_manager)?;

    app::run(&args, generator_config)
}
