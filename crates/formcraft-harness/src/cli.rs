//! Command-line argument parsing for `formcraft-replay`.

use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
formcraft-replay: replay a scripted editing session and print the form markup

USAGE:
    formcraft-replay --script=PATH [OPTIONS]

OPTIONS:
    --script=PATH        Replay script (JSON, required)
    --forest=PATH        Saved document loaded before the first step
    --compact            Print markup on a single line
    --tree               Also print the resulting document as JSON
    --checksum           Also print a checksum of the markup
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    FORMCRAFT_LOG                  Log filter (default: warn)
    FORMCRAFT_DEBOUNCE_MS          Markup regeneration debounce
    FORMCRAFT_MAX_WAIT_MS          Markup regeneration max wait
    FORMCRAFT_SCROLL_EDGE          Auto-scroll edge band
    FORMCRAFT_SCROLL_STEP          Auto-scroll step
    FORMCRAFT_INDICATOR_THICKNESS  Drop indicator thickness
    FORMCRAFT_CLASS_PREFIX         CSS class prefix (default: fc)";

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub script: PathBuf,
    pub forest: Option<PathBuf>,
    pub compact: bool,
    pub tree: bool,
    pub checksum: bool,
}

/// What the binary should do after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse `args`, excluding the program name.
    pub fn parse_from<I, S>(args: I) -> Result<Command, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        let mut script = None;
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--compact" => opts.compact = true,
                "--tree" => opts.tree = true,
                "--checksum" => opts.checksum = true,
                other => {
                    if let Some(val) = other.strip_prefix("--script=") {
                        script = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--forest=") {
                        opts.forest = Some(PathBuf::from(val));
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }
        match script {
            Some(path) => {
                opts.script = path;
                Ok(Command::Run(opts))
            }
            None => Err("Missing required --script=PATH".to_string()),
        }
    }
}
