//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `quicknote_core` linkage and open the configured note store.
//! - Keep output deterministic for quick local sanity checks.

use quicknote_core::{open_repository, CoreConfig, NoteStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("quicknote_core ping={}", quicknote_core::ping());
    println!("quicknote_core version={}", quicknote_core::core_version());

    let config = CoreConfig::from_env();
    println!("quicknote_core db_path={}", config.db_path.display());

    let repo = match open_repository(&config) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("quicknote_core store=error error={err}");
            return ExitCode::FAILURE;
        }
    };

    let status = match repo.store().count() {
        Ok(count) => {
            println!("quicknote_core notes={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("quicknote_core notes=error error={err}");
            ExitCode::FAILURE
        }
    };

    if let Err(err) = repo.into_store().close() {
        eprintln!("quicknote_core close=error error={err}");
        return ExitCode::FAILURE;
    }
    status
}
