//! Main application entry point.
//!
//! Parses the command line and dispatches to the run mode or a one-shot command. Errors are
//! printed with their context chain and end the process with status 1.

use anyhow::Result;

use daybreak::args::{self, CliAction, ParsedArgs};
use daybreak::commands;
use daybreak::config;
use daybreak::{Daybreak, log_end, log_error_exit};

fn main() {
    if let Err(e) = run() {
        log_error_exit!("{e:#}");
        log_end!();
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp | CliAction::ShowHelpDueToError => {
            args::display_help();
            Ok(())
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            log_file,
        } => {
            config::set_config_dir(config_dir)?;
            Daybreak::new(debug_enabled).with_log_file(log_file).run()
        }
        CliAction::Status {
            debug_enabled,
            config_dir,
            json,
        } => {
            config::set_config_dir(config_dir)?;
            commands::status::handle_status_command(json, debug_enabled)
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            log_file,
            start_time,
            end_time,
        } => {
            config::set_config_dir(config_dir)?;
            commands::simulate::handle_simulate_command(
                start_time,
                end_time,
                log_file,
                debug_enabled,
            )
        }
    }
}
