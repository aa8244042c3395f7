//! Command-line interface for dermx.
//!
//! Uses lexopt for minimal binary size overhead (~34KB).

use std::ffi::OsString;
use std::path::PathBuf;

/// Subcommand to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in with email and password.
    Login { email: String },
    /// Forget the session and persisted token.
    Logout,
    /// Print the signed-in user's profile.
    Profile,
    /// Upload an image for diagnosis.
    Analyze { image: PathBuf },
    /// Set the profile photo URL.
    Photo { url: String },
    /// Delete the signed-in user's account.
    DeleteAccount,
}

impl Command {
    fn from_positionals(mut values: Vec<String>) -> Result<Option<Self>, ArgsError> {
        if values.is_empty() {
            return Ok(None);
        }
        let name = values.remove(0);
        let mut rest = values.into_iter();

        let command = match name.as_str() {
            "login" => Command::Login {
                email: rest.next().ok_or(ArgsError::MissingArgument("login", "EMAIL"))?,
            },
            "logout" => Command::Logout,
            "profile" => Command::Profile,
            "analyze" => Command::Analyze {
                image: rest
                    .next()
                    .map(PathBuf::from)
                    .ok_or(ArgsError::MissingArgument("analyze", "IMAGE"))?,
            },
            "photo" => Command::Photo {
                url: rest.next().ok_or(ArgsError::MissingArgument("photo", "URL"))?,
            },
            "delete-account" => Command::DeleteAccount,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = rest.next() {
            return Err(ArgsError::UnexpectedArgument(extra));
        }
        Ok(Some(command))
    }
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Backend base URL (overrides config file).
    pub api_url: Option<String>,
    /// Token file location (overrides config file).
    pub token_file: Option<PathBuf>,
    /// Password for `login`.
    pub password: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
    /// Subcommand, if any.
    pub command: Option<Command>,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut positionals = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('u') | Long("api-url") => {
                result.api_url = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("token-file") => {
                result.token_file = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("password") => {
                result.password = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                positionals.push(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    result.command = Command::from_positionals(positionals)?;
    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"dermx {version}
Session and diagnosis client for the DermX skin-condition assistant

USAGE:
    dermx [OPTIONS] <COMMAND>

COMMANDS:
    login <EMAIL>           Log in with email and password
    logout                  Forget the session and stored token
    profile                 Print the signed-in user's profile
    analyze <IMAGE>         Upload an image for diagnosis
    photo <URL>             Set the profile photo URL
    delete-account          Delete the signed-in user's account

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -u, --api-url <URL>     Backend base URL
    -t, --token-file <FILE> Where the auth token is stored
    -p, --password <PASS>   Password for login (prefer DERMX_PASSWORD)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    DERMX_API_URL           Backend base URL (overrides config)
    DERMX_TIMEOUT_SECS      Request timeout in seconds (overrides config)
    DERMX_TOKEN_FILE        Token file location (overrides config)
    DERMX_PASSWORD          Password for login
    DERMX_LOG_LEVEL         Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Log in against a local backend
    DERMX_PASSWORD=secret dermx -u http://localhost:5000/ login ada@example.com

    # Analyze an image with the stored session
    dermx analyze ./lesion.jpg

    # Show who is signed in
    dermx profile
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("dermx {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// A command is missing a required value.
    MissingArgument(&'static str, &'static str),
    /// Unknown subcommand.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingArgument(command, value) => {
                write!(f, "'{}' requires <{}>", command, value)
            }
            Self::UnknownCommand(name) => write!(f, "unknown command: '{}'", name),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
