#![forbid(unsafe_code)]

//! Command-line argument parsing for the sign-in demo.
//!
//! Parses args by hand. Environment variables with the `FFORM_DEMO_*` prefix
//! override defaults; explicit flags override both.

use std::env;
use std::fmt;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
fform sign-in demo

USAGE:
    fform-demo [OPTIONS]

OPTIONS:
    --phone=PHONE        Initial phone value (default: empty)
    --password=SECRET    Initial password value (default: empty)
    --no-refresh         Do not request a refresh token
    --fail               Make the session client reject the sign-in
    --action=ACTION      What to do after mounting: 'submit' (default),
                         'forgot-password' or 'sign-up'
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    FFORM_DEMO_PHONE          Override the default phone
    FFORM_DEMO_PASSWORD       Override the default password
    FFORM_DEMO_WITH_REFRESH   Request a refresh token (true|false)
    FFORM_DEMO_FAIL           Simulate a rejected sign-in (true|false)
    FFORM_LOG                 Log filter, e.g. 'debug' or 'fform_engine=trace'";

/// Credential defaults injected into the sign-in screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInConfig {
    pub phone: String,
    pub password: String,
    pub with_refresh: bool,
    /// Make the stub session client reject every request.
    pub simulate_failure: bool,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            phone: String::new(),
            password: String::new(),
            with_refresh: true,
            simulate_failure: false,
        }
    }
}

/// What the demo does once the screen is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Submit,
    ForgotPassword,
    SignUp,
}

impl Action {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "submit" => Some(Self::Submit),
            "forgot-password" => Some(Self::ForgotPassword),
            "sign-up" => Some(Self::SignUp),
            _ => None,
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub config: SignInConfig,
    pub action: Action,
}

/// Result of parsing: run, or print help/version and exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

/// Invalid command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError(String);

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CliError {}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Opts {
    /// Parse the process arguments and environment, exiting on help,
    /// version or bad input.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("fform-demo {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `env` as the environment lookup.
    pub fn parse_from<I, S>(args: I, env: impl Fn(&str) -> Option<String>) -> Result<Parsed, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();

        // Environment first, flags override.
        if let Some(val) = env("FFORM_DEMO_PHONE") {
            opts.config.phone = val;
        }
        if let Some(val) = env("FFORM_DEMO_PASSWORD") {
            opts.config.password = val;
        }
        if let Some(val) = env("FFORM_DEMO_WITH_REFRESH")
            && let Some(flag) = parse_bool(&val)
        {
            opts.config.with_refresh = flag;
        }
        if let Some(val) = env("FFORM_DEMO_FAIL")
            && let Some(flag) = parse_bool(&val)
        {
            opts.config.simulate_failure = flag;
        }

        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-refresh" => opts.config.with_refresh = false,
                "--fail" => opts.config.simulate_failure = true,
                other => {
                    if let Some(val) = other.strip_prefix("--phone=") {
                        opts.config.phone = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--password=") {
                        opts.config.password = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--action=") {
                        opts.action = Action::parse(val)
                            .ok_or_else(|| CliError(format!("Invalid --action value: {val}")))?;
                    } else {
                        return Err(CliError(format!("Unknown argument: {other}")));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(args: &[&str], env: impl Fn(&str) -> Option<String>) -> Opts {
        match Opts::parse_from(args, env) {
            Ok(Parsed::Run(opts)) => opts,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = run(&[], no_env);
        assert_eq!(opts.config.phone, "");
        assert!(opts.config.with_refresh);
        assert!(!opts.config.simulate_failure);
        assert_eq!(opts.action, Action::Submit);
    }

    #[test]
    fn flags_set_credentials() {
        let opts = run(
            &["--phone=5551234", "--password=secret1", "--no-refresh", "--action=sign-up"],
            no_env,
        );
        assert_eq!(opts.config.phone, "5551234");
        assert_eq!(opts.config.password, "secret1");
        assert!(!opts.config.with_refresh);
        assert_eq!(opts.action, Action::SignUp);
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            "FFORM_DEMO_PHONE" => Some("111".to_string()),
            "FFORM_DEMO_FAIL" => Some("yes".to_string()),
            "FFORM_DEMO_WITH_REFRESH" => Some("maybe".to_string()),
            _ => None,
        };
        let opts = run(&["--phone=222"], env);
        assert_eq!(opts.config.phone, "222");
        assert!(opts.config.simulate_failure);
        // Unparseable booleans keep the default.
        assert!(opts.config.with_refresh);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(Opts::parse_from(["-h", "--bogus"], no_env), Ok(Parsed::Help));
        assert_eq!(Opts::parse_from(["--version"], no_env), Ok(Parsed::Version));
    }

    #[test]
    fn rejects_unknown_input() {
        let err = Opts::parse_from(["--action=dance"], no_env).unwrap_err();
        assert_eq!(err.to_string(), "Invalid --action value: dance");
        let err = Opts::parse_from(["--nope"], no_env).unwrap_err();
        assert_eq!(err.to_string(), "Unknown argument: --nope");
    }

    #[test]
    fn help_text_lists_env_vars() {
        assert!(HELP_TEXT.contains("FFORM_DEMO_PHONE"));
        assert!(HELP_TEXT.contains("FFORM_LOG"));
        assert!(!VERSION.is_empty());
    }
}
