use std::path::Path;

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

/// Install the global logger for the CLI.
///
/// Logs go to `file` when given and openable, otherwise to stderr.
/// Best-effort: failures are silently ignored (logging must never stop a parse).
pub fn init(level: LevelFilter, file: Option<&Path>) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Debug)
        .build();

    if let Some(path) = file
        && let Some(log_file) = open_append(path)
    {
        let _ = WriteLogger::init(level, config, log_file);
        return;
    }
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Never);
}

fn open_append(path: &Path) -> Option<std::fs::File> {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}
