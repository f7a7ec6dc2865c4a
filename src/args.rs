//! Command-line argument parsing and processing.
//!
//! Supports the default run mode plus the `status` and `simulate` subcommands, the
//! `--debug`, `--config` and `--log` options, and the usual help and version flags.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler until interrupted
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
    },
    /// Report today's sunlight changes and exit
    Status {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    /// Fast-forward the scheduler between two local times
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
        start_time: String,
        end_time: String,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first element is the program name and is skipped. Options may appear before or
    /// after the subcommand.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut json = false;
        let mut config_dir: Option<String> = None;
        let mut log_file: Option<String> = None;
        let mut positional: Vec<String> = Vec::new();
        let mut unknown_arg_found = false;

        let mut args = args.into_iter().skip(1).map(|s| s.as_ref().to_string());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--json" | "-j" => json = true,
                "--config" | "-c" => match args.next() {
                    Some(dir) => config_dir = Some(dir),
                    None => {
                        log_warning_standalone!("Missing directory for {}", arg);
                        unknown_arg_found = true;
                    }
                },
                "--log" | "-l" => match args.next() {
                    Some(file) => log_file = Some(file),
                    None => {
                        log_warning_standalone!("Missing file name for {}", arg);
                        unknown_arg_found = true;
                    }
                },
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    log_warning_standalone!("Unknown argument: {}", flag);
                    unknown_arg_found = true;
                }
                other => positional.push(other.to_string()),
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            match positional.as_slice() {
                [] if !json => CliAction::Run {
                    debug_enabled,
                    config_dir,
                    log_file,
                },
                [command] if matches!(command.as_str(), "status" | "s") => CliAction::Status {
                    debug_enabled,
                    config_dir,
                    json,
                },
                [command, start, end]
                    if !json && matches!(command.as_str(), "simulate" | "S") =>
                {
                    CliAction::Simulate {
                        debug_enabled,
                        config_dir,
                        log_file,
                        start_time: start.clone(),
                        end_time: end.clone(),
                    }
                }
                [command, ..] if matches!(command.as_str(), "simulate" | "S") => {
                    log_warning_standalone!("simulate needs a start and an end time");
                    CliAction::ShowHelpDueToError
                }
                [] => {
                    log_warning_standalone!("--json only applies to the status command");
                    CliAction::ShowHelpDueToError
                }
                [command, ..] => {
                    log_warning_standalone!("Unknown command: {}", command);
                    CliAction::ShowHelpDueToError
                }
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    log_decorated!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_end!();
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("daybreak [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-l, --log <file>       Write output to a file instead of stdout");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("status, s [--json]     Show the current level and today's changes");
    log_indented!("simulate, S <start> <end>");
    log_indented!("                       Fast-forward the scheduler between two local times");
    log_indented!("                       formatted as \"YYYY-MM-DD HH:MM:SS\"");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(debug_enabled: bool, config_dir: Option<&str>, log_file: Option<&str>) -> CliAction {
        CliAction::Run {
            debug_enabled,
            config_dir: config_dir.map(String::from),
            log_file: log_file.map(String::from),
        }
    }

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["daybreak"]);
        assert_eq!(parsed.action, run(false, None, None));
    }

    #[test]
    fn test_parse_debug_flag() {
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "--debug"]).action,
            run(true, None, None)
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "-d"]).action,
            run(true, None, None)
        );
    }

    #[test]
    fn test_parse_config_and_log() {
        let parsed = ParsedArgs::parse(vec![
            "daybreak",
            "--config",
            "/tmp/daybreak",
            "-l",
            "out.log",
        ]);
        assert_eq!(
            parsed.action,
            run(false, Some("/tmp/daybreak"), Some("out.log"))
        );
    }

    #[test]
    fn test_parse_missing_option_value() {
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "--config"]).action,
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "--help"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "-h"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "status", "--version"]).action,
            CliAction::ShowVersion
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "status"]).action,
            CliAction::Status {
                debug_enabled: false,
                config_dir: None,
                json: false,
            }
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "-c", "cfg", "s", "--json"]).action,
            CliAction::Status {
                debug_enabled: false,
                config_dir: Some("cfg".to_string()),
                json: true,
            }
        );
    }

    #[test]
    fn test_parse_simulate() {
        let parsed = ParsedArgs::parse(vec![
            "daybreak",
            "simulate",
            "2024-01-23 17:00:00",
            "2024-01-24 09:00:00",
            "--debug",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Simulate {
                debug_enabled: true,
                config_dir: None,
                log_file: None,
                start_time: "2024-01-23 17:00:00".to_string(),
                end_time: "2024-01-24 09:00:00".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "simulate", "2024-01-23 17:00:00"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "--unknown"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "reload"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["daybreak", "--json"]).action,
            CliAction::ShowHelpDueToError
        );
    }
}
