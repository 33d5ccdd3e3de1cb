//! Command-line parsing.
//!
//! ```text
//! prog [-c CONFIG] BIND_ADDRESS         serve in the foreground
//! prog [-c CONFIG] -s install BIND_ADDRESS
//! prog [-c CONFIG] -s run BIND_ADDRESS  (what the service manager runs)
//! prog -s ACTION                        start | stop | restart | uninstall | status
//! prog -h | --help | /?
//! prog -V | --version
//! ```

use std::ffi::OsString;
use std::fmt::Write as _;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::ConfigError;
use crate::service::ServiceAction;

#[derive(Debug, Parser)]
#[command(name = "initservices-responder", version, disable_help_flag = true)]
struct Cli {
    /// Print usage information
    #[arg(short = 'h', long = "help")]
    help: bool,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Perform a service action instead of serving
    #[arg(short = 's', long = "service", value_name = "ACTION", num_args = 0..=1)]
    service: Option<Option<String>>,

    /// IP address to listen on
    #[arg(value_name = "BIND_ADDRESS")]
    bind_address: Option<String>,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Foreground {
        bind_address: IpAddr,
        config: Option<PathBuf>,
    },
    Service {
        action: ServiceAction,
        bind_address: Option<IpAddr>,
        config: Option<PathBuf>,
    },
}

impl Invocation {
    pub fn config_file(&self) -> Option<&std::path::Path> {
        match self {
            Invocation::Foreground { config, .. } | Invocation::Service { config, .. } => {
                config.as_deref()
            }
        }
    }
}

/// Reasons parsing stops without an invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// `-h`, `--help` or `/?`.
    #[error("help requested")]
    Help,

    /// Missing or malformed arguments.
    #[error("{0}")]
    Usage(String),

    /// `--version`, or an error clap reports itself.
    #[error(transparent)]
    Clap(#[from] clap::Error),

    #[error(transparent)]
    Address(#[from] ConfigError),
}

impl CliError {
    /// Exit code when parsing stops here.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Help => 0,
            CliError::Clap(e) if !e.use_stderr() => 0,
            _ => 1,
        }
    }
}

/// Parse the full argument list, program name first.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    match args.get(1) {
        None => return Err(usage_error("At least one argument required")),
        Some(first) if first == "/?" => return Err(CliError::Help),
        Some(_) => {}
    }

    let cli = Cli::try_parse_from(args).map_err(|e| match e.kind() {
        clap::error::ErrorKind::DisplayVersion => CliError::Clap(e),
        _ => CliError::Usage(clap_message(&e)),
    })?;
    if cli.help {
        return Err(CliError::Help);
    }

    let bind_address = cli.bind_address.as_deref().map(parse_ip).transpose()?;

    match cli.service {
        None => Ok(Invocation::Foreground {
            bind_address: bind_address.ok_or_else(|| usage_error("Bind address missing"))?,
            config: cli.config,
        }),
        Some(None) => Err(usage_error("Service action name missing")),
        Some(Some(action)) => {
            let action: ServiceAction = match action.parse() {
                Ok(action) => action,
                Err(never) => match never {},
            };
            if matches!(action, ServiceAction::Install | ServiceAction::Run)
                && bind_address.is_none()
            {
                return Err(usage_error("Bind address missing"));
            }
            Ok(Invocation::Service {
                action,
                bind_address,
                config: cli.config,
            })
        }
    }
}

fn usage_error(message: &str) -> CliError {
    CliError::Usage(message.to_string())
}

/// First line of clap's rendered error, without its `error: ` prefix.
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

fn parse_ip(s: &str) -> Result<IpAddr, ConfigError> {
    s.parse()
        .map_err(|_| ConfigError::BindAddress(s.to_string()))
}

/// Usage text, printed to stderr for help and usage errors.
pub fn usage(cmd: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{cmd} [-c CONFIG] BIND_ADDRESS");
    let _ = writeln!(out, "  start the server listening on IP address BIND_ADDRESS\n");
    let _ = writeln!(out, "{cmd} [-c CONFIG] -s install BIND_ADDRESS");
    let _ = writeln!(out, "  install the server as a system service and start it\n");
    let _ = writeln!(out, "{cmd} -s ACTION");
    let _ = writeln!(out, "  perform the service action ACTION");
    let _ = writeln!(out, "  service actions are:");
    let _ = writeln!(out, "    uninstall: removes the server as a system service");
    let _ = writeln!(out, "    start: starts the system service");
    let _ = writeln!(out, "    restart: restarts the system service");
    let _ = writeln!(out, "    stop: stops the system service");
    let _ = writeln!(
        out,
        "    status: return the status of the service via exit code (0 running, 1 stopped, 2 unknown)\n"
    );
    let _ = writeln!(out, "{cmd} -h | {cmd} --help | {cmd} /?");
    let _ = writeln!(out, "  print this usage information\n");
    let _ = writeln!(out, "{cmd} -V | {cmd} --version");
    let _ = writeln!(out, "  print the version");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation, CliError> {
        parse_args(std::iter::once("prog").chain(args.iter().copied()))
    }

    #[test]
    fn bare_address_runs_foreground() {
        assert_eq!(
            parse(&["192.168.1.20"]).unwrap(),
            Invocation::Foreground {
                bind_address: "192.168.1.20".parse().unwrap(),
                config: None,
            }
        );
    }

    #[test]
    fn config_file_is_kept() {
        let invocation = parse(&["-c", "/etc/sdp.toml", "-s", "run", "::1"]).unwrap();
        assert_eq!(invocation.config_file(), Some(std::path::Path::new("/etc/sdp.toml")));
        assert!(matches!(
            invocation,
            Invocation::Service { action: ServiceAction::Run, bind_address: Some(_), .. }
        ));
    }

    #[test]
    fn control_actions_need_no_address() {
        for verb in ["start", "stop", "restart", "uninstall", "status"] {
            let invocation = parse(&["-s", verb]).unwrap();
            assert!(matches!(
                invocation,
                Invocation::Service { bind_address: None, ref action, .. } if action.verb() == verb
            ));
        }
    }

    #[test]
    fn install_and_run_need_an_address() {
        for verb in ["install", "run"] {
            let err = parse(&["-s", verb]).unwrap_err();
            assert_eq!(err.to_string(), "Bind address missing");
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn missing_arguments_are_usage_errors() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.to_string(), "At least one argument required");
        assert_eq!(err.exit_code(), 1);

        let err = parse(&["-s"]).unwrap_err();
        assert_eq!(err.to_string(), "Service action name missing");

        let err = parse(&["-c", "sdp.toml"]).unwrap_err();
        assert_eq!(err.to_string(), "Bind address missing");
    }

    #[test]
    fn help_forms_exit_zero() {
        for flag in ["-h", "--help", "/?"] {
            let err = parse(&[flag]).unwrap_err();
            assert!(matches!(err, CliError::Help));
            assert_eq!(err.exit_code(), 0);
        }
    }

    #[test]
    fn version_exits_zero() {
        let err = parse(&["--version"]).unwrap_err();
        assert!(matches!(err, CliError::Clap(_)));
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn unknown_action_is_passed_through() {
        assert!(matches!(
            parse(&["-s", "reload"]).unwrap(),
            Invocation::Service { action: ServiceAction::Other(ref verb), .. } if verb == "reload"
        ));
    }

    #[test]
    fn bad_address_is_rejected() {
        let err = parse(&["not-an-ip"]).unwrap_err();
        assert_eq!(err.to_string(), "Could not parse not-an-ip as IP address");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let err = parse(&["--bogus", "10.0.0.1"]).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn usage_lists_every_form() {
        let text = usage("sdp");
        assert!(text.starts_with("sdp [-c CONFIG] BIND_ADDRESS\n"));
        assert!(text.contains("sdp [-c CONFIG] -s install BIND_ADDRESS\n"));
        assert!(text.contains("sdp -s ACTION\n"));
        assert!(text.contains("via exit code (0 running, 1 stopped, 2 unknown)"));
        assert!(text.contains("sdp -h | sdp --help | sdp /?\n"));
    }
}
