use std::path::PathBuf;

use log::{LevelFilter, info};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::parse::Argv;

/// Log file location: ~/.local/share/chat-alias/alias.log.
pub fn log_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".local/share/chat-alias/alias.log"))
}

/// Install a file logger at `level`.
/// Best-effort: failures are silently ignored (logging must never block resolution).
pub fn init(level: LevelFilter) {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return;
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .build();
    let _ = WriteLogger::init(level, config, file);
}

/// Record one alias rewrite as a single line.
pub fn log_rewrite(content: &str, argv: &Argv) {
    let content_oneline = content.replace('\n', "; ");
    let content_truncated: String = content_oneline.chars().take(200).collect();
    info!(
        "rewrite\t{content_truncated}\t{alias}\t{command}\t{args:?}",
        alias = argv.alias.as_deref().unwrap_or("-"),
        command = argv.command.as_deref().unwrap_or("-"),
        args = argv.args,
    );
}
