//! Purpose: `matryoshka` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit JSON on stdout (pretty when stdout is a TTY).
//! Invariants: Errors are emitted as JSON on stderr unless stderr is a TTY.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Diagnostics go through `tracing` on stderr, filtered by `RUST_LOG`.
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use matryoshka::api::{
    Error, ErrorKind, LibraryManager, LoaderConfig, Locator, SearchPath, to_exit_code,
};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `matryoshka --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let config = LoaderConfig::from_env();

    command_dispatch::dispatch_command(cli.command, config)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "matryoshka",
    version,
    about = "Locate and probe the Matryoshka shared library",
    long_about = None,
    after_help = r#"EXAMPLES
  $ matryoshka find                       # look for Matryoshka.dll on PATH
  $ matryoshka find libmatryoshka.so --var LD_LIBRARY_PATH
  $ matryoshka probe ./build/libmatryoshka.so
  $ matryoshka search-path

ENVIRONMENT
  MATRYOSHKA_SEARCH_VAR   variable holding the directory list (default: PATH)
  MATRYOSHKA_LIBRARY      library file name used when none is given
  RUST_LOG                diagnostic log filter (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Find a library file on the search path",
        long_about = r#"Search each directory of the search path, in order, for a regular file
with the given name. The first directory that contains it wins."#,
        after_help = r#"EXAMPLES
  $ matryoshka find
  $ matryoshka find libmatryoshka.so --dir ./build --dir /opt/lib
  $ matryoshka find --all

NOTES
  - Exits 3 when no directory contains the file."#
    )]
    Find {
        #[arg(help = "Library file name (default: Matryoshka.dll)")]
        name: Option<String>,
        #[arg(long, help = "Environment variable holding the directory list")]
        var: Option<OsString>,
        #[arg(
            long = "dir",
            help = "Search these directories instead of the environment",
            value_hint = ValueHint::DirPath
        )]
        dirs: Vec<PathBuf>,
        #[arg(long, help = "Report every match in order, including shadowed ones")]
        all: bool,
    },
    #[command(
        about = "Try to load a library and report whether it is usable",
        long_about = r#"Load the library into this process and release it again.

A TARGET containing a path separator is loaded as given; a bare name is
located on the search path first."#,
        after_help = r#"EXAMPLES
  $ matryoshka probe
  $ matryoshka probe ./build/libmatryoshka.so

NOTES
  - Exits 0 when usable, 9 when the library could not be loaded."#
    )]
    Probe {
        #[arg(help = "Library path or file name (default: Matryoshka.dll)")]
        target: Option<String>,
        #[arg(long, help = "Environment variable holding the directory list")]
        var: Option<OsString>,
    },
    #[command(
        name = "search-path",
        about = "Print the directories that would be searched, in order"
    )]
    SearchPath {
        #[arg(long, help = "Environment variable holding the directory list")]
        var: Option<OsString>,
    },
    #[command(about = "Print version info as JSON")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ matryoshka completion bash > ~/.local/share/bash-completion/completions/matryoshka
  $ matryoshka completion zsh > ~/.zfunc/_matryoshka"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn has_path_separator(target: &str) -> bool {
    target.contains('/') || (cfg!(windows) && target.contains('\\'))
}

fn resolve_probe_target(target: Option<&str>, locator: &Locator) -> Result<PathBuf, Error> {
    if let Some(target) = target.filter(|target| has_path_separator(target)) {
        return Ok(PathBuf::from(target));
    }
    let name = target.unwrap_or(locator.default_name());
    locator.find(Some(name)).ok_or_else(|| not_found_error(name, locator))
}

fn not_found_error(name: &str, locator: &Locator) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message(format!("{name} not found on search path"))
        .with_hint(format!(
            "Add its directory to {} or pass an explicit path.",
            locator.search_var().to_string_lossy()
        ))
}

fn probe_report(manager: &LibraryManager) -> Value {
    let mut report = Map::new();
    report.insert("path".to_string(), json!(path_text(manager.path())));
    report.insert("usable".to_string(), json!(manager.is_usable()));
    if let Some(err) = manager.load_error() {
        report.insert("error".to_string(), error_body(err));
    }
    Value::Object(report)
}

fn search_path_json(var: &str, search: &SearchPath) -> Value {
    let dirs = search.iter().map(path_text).collect::<Vec<_>>();
    json!({ "var": var, "dirs": dirs })
}

fn path_text(path: &Path) -> String {
    path.display().to_string()
}

fn emit_json(value: Value) {
    let pretty = io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("matryoshka {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "matryoshka",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

const RED: &str = "31";
const YELLOW: &str = "33";

fn paint(label: &str, color: Option<&str>) -> String {
    match color {
        Some(code) => format!("\u{1b}[{code}m{label}\u{1b}[0m"),
        None => label.to_string(),
    }
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    let rendered = if is_tty {
        error_text(err, color_mode.use_color(is_tty))
    } else {
        serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
            "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
        })
    };
    eprintln!("{rendered}");
}

fn error_message(err: &Error) -> &str {
    err.message().unwrap_or(err.kind().describe())
}

fn error_causes(err: &Error) -> Vec<String> {
    std::iter::successors(err.source(), |&cause| cause.source())
        .map(ToString::to_string)
        .collect()
}

fn error_body(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path_text(path)));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    Value::Object(inner)
}

fn error_json(err: &Error) -> Value {
    json!({ "error": error_body(err) })
}

fn error_text(err: &Error, use_color: bool) -> String {
    let red = use_color.then_some(RED);
    let yellow = use_color.then_some(YELLOW);

    let mut lines = vec![format!("{} {}", paint("error:", red), error_message(err))];
    lines.extend(err.hint().map(|hint| format!("{} {hint}", paint("hint:", yellow))));
    lines.extend(
        err.path()
            .map(|path| format!("{} {}", paint("path:", yellow), path.display())),
    );
    lines.extend(
        error_causes(err)
            .into_iter()
            .map(|cause| format!("{} {cause}", paint("caused by:", yellow))),
    );
    lines.join("\n")
}

/// First non-empty line of clap's rendering, without its `error:` prefix.
fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}
