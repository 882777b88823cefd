//! File logging
//!
//! The terminal belongs to the TUI, so log records go to a timestamped file
//! under the config directory. Level comes from `RUST_LOG`, default `info`.

use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn initialize(log_folder: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(log_folder)?;

    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    let log_path = log_folder.join(format!("crud-gen-tui-{}.log", timestamp));
    let log_file = fs::File::create(&log_path)?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                timestamp,
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .try_init()?;

    log::info!("Logging initialized: {}", log_path.display());
    Ok(log_path)
}
