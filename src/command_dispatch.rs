//! Purpose: Hold top-level CLI command dispatch for `matryoshka`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Successful commands write their result to stdout; failures return to `main` for rendering.
//! Invariants: `probe` reports unusable libraries on stdout and signals via exit code 9.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    config: LoaderConfig,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "matryoshka", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Find {
            name,
            var,
            dirs,
            all,
        } => {
            let locator = locator_for(&config, var);
            let name = name.unwrap_or_else(|| locator.default_name().to_string());
            let search = if dirs.is_empty() {
                locator.search_path()
            } else {
                SearchPath::from_dirs(dirs)
            };

            if all {
                let paths = Locator::candidates_in(&name, &search);
                if paths.is_empty() {
                    return Err(not_found_error(&name, &locator));
                }
                let paths = paths.iter().map(|path| path_text(path)).collect::<Vec<_>>();
                emit_json(json!({ "name": name, "paths": paths }));
                return Ok(RunOutcome::ok());
            }

            let path = Locator::find_in(&name, &search)
                .ok_or_else(|| not_found_error(&name, &locator))?;
            emit_json(json!({ "name": name, "path": path_text(&path) }));
            Ok(RunOutcome::ok())
        }
        Command::Probe { target, var } => {
            let locator = locator_for(&config, var);
            let path = resolve_probe_target(target.as_deref(), &locator)?;

            let scope = LibraryManager::scope(path);
            emit_json(probe_report(&scope));
            if scope.is_usable() {
                Ok(RunOutcome::ok())
            } else {
                Ok(RunOutcome::with_code(to_exit_code(ErrorKind::Unavailable)))
            }
        }
        Command::SearchPath { var } => {
            let locator = locator_for(&config, var);
            let search = locator.search_path();
            let var = locator.search_var().to_string_lossy().into_owned();
            emit_json(search_path_json(&var, &search));
            Ok(RunOutcome::ok())
        }
    }
}

fn locator_for(config: &LoaderConfig, var: Option<OsString>) -> Locator {
    match var {
        Some(var) => config.clone().with_search_var(var).locator(),
        None => config.locator(),
    }
}
