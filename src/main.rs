//! SpeedCheck - desktop internet speed tester
//!
//! Opens the speed test window by default; `--headless` runs a single test in
//! the terminal and `--history` prints the recorded results.

use clap::Parser;
use speedcheck::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager, ValidationLevel},
    controller::{AppController, RunCompletion},
    error::{AppError, ErrorReporter, Result},
    gui,
    history::HistoryStore,
    logging::ErrorEventLogger,
    models::Config,
    output::{OutputCoordinator, OutputFormatterFactory},
    version_banner,
};
use std::process;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = std::thread::current();
        match thread.name() {
            // Worker panics unwind into the runner and end that run as a failure
            Some(name) if name != "main" => {
                eprintln!("Panic in thread '{}': {}", name, panic_info);
            }
            _ => {
                eprintln!("Application panic: {}", panic_info);
                eprintln!("Please report this issue with the message above.");
                process::exit(1);
            }
        }
    }));

    let cli = Cli::parse();

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    if let Err(e) = run_application(cli) {
        reporter.report_error(&e);
        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{}", version_banner());
        eprintln!("Debug mode enabled");
        eprintln!();
    }

    if cli.env_help {
        println!("{}", EnvManager::display_env_help());
        return Ok(());
    }

    if let Some(path) = &cli.create_env_example {
        EnvManager::save_example_env_file(path)?;
        println!("Example configuration written to {}", path.display());
        return Ok(());
    }

    if cli.debug {
        for warning in EnvManager::validate_current_env() {
            eprintln!("{}", warning);
        }
    }

    let config = load_config(cli.clone())?;
    let use_color = config.enable_color && cli.use_colors();
    if !use_color {
        colored::control::set_override(false);
    }

    if config.debug {
        eprintln!("Configuration loaded successfully:");
        for line in display_config_summary(&config).lines() {
            eprintln!("  {}", line);
        }
        eprintln!();
    }

    let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(use_color));
    report_config_warnings(&config, &coordinator)?;

    let error_logger = ErrorEventLogger::new(&config);

    let (mode, outcome) = if !cli.is_terminal_mode() {
        ("window", gui::run(config.clone()))
    } else if cli.history {
        ("history", show_history(&config, &coordinator))
    } else {
        ("headless run", run_headless(&config, &coordinator))
    };

    if let Err(ref e) = outcome {
        error_logger.log_error(e, Some(mode), None);
    }

    outcome
}

/// Print non-fatal configuration warnings; info-level ones only in verbose mode
fn report_config_warnings(config: &Config, coordinator: &OutputCoordinator) -> Result<()> {
    for warning in validate_config(config)? {
        if warning.level == ValidationLevel::Info && !config.verbose {
            continue;
        }
        eprintln!("{}", coordinator.display_warning(&warning.message)?);
    }
    Ok(())
}

fn show_history(config: &Config, coordinator: &OutputCoordinator) -> Result<()> {
    let store = HistoryStore::new(config.history_file.clone());
    let records = store.recent(config.chart_points);

    println!("{}", coordinator.display_history(&records)?);
    Ok(())
}

/// Run one measurement, print it, and fail the process if it failed
fn run_headless(config: &Config, coordinator: &OutputCoordinator) -> Result<()> {
    let mut controller = AppController::from_config(config);

    if config.verbose {
        eprintln!("Running speed test against {}...", config.servers.join(", "));
    }

    if !controller.trigger(|| {}) {
        return Err(AppError::internal("Could not start the measurement worker"));
    }

    let done = controller
        .wait(None)
        .ok_or_else(|| AppError::internal("Speed test finished without a result"))?;

    println!("{}", coordinator.display_run(controller.presenter(), &done)?);

    match done {
        RunCompletion::Succeeded(_) => Ok(()),
        RunCompletion::Failed(err) => Err(err.into()),
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Server URLs must start with http:// or https://");
            eprintln!("  - Run with --help to see every option and its range");
        }
        AppError::Measurement(_) | AppError::Network(_) | AppError::HttpRequest(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Try a different server with --server");
            eprintln!("  - Verify firewall or proxy settings");
        }
        AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Timeout help:");
            eprintln!("  - Increase the timeout with --timeout");
            eprintln!("  - Reduce --download-bytes / --upload-bytes on slow links");
        }
        AppError::Gui(_) => {
            eprintln!();
            eprintln!("Window help:");
            eprintln!("  - A graphical display is required for the window");
            eprintln!("  - Use --headless to run a test in the terminal");
        }
        _ => {}
    }
}
