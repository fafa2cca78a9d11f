use std::fs::OpenOptions;
use std::path::PathBuf;

use env_logger::{Env, Target};

use crate::io::paths;

/// Environment variable holding the log filter, e.g. `VITABS_LOG=debug`
pub const LOG_ENV: &str = "VITABS_LOG";

pub fn log_file_path() -> PathBuf {
    paths::state_dir().join("vitabs.log")
}

/// Install the global logger. Output goes to a file since the terminal
/// belongs to the UI. Logging stays off unless `VITABS_LOG` is set, and
/// an unopenable log file just leaves it off.
pub fn init() {
    let env = Env::new().filter_or(LOG_ENV, "off");
    if std::env::var_os(LOG_ENV).is_none() {
        return;
    }
    let path = log_file_path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    log::info!("vitabs {} starting", env!("CARGO_PKG_VERSION"));
}
