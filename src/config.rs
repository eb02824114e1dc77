use crate::pipeline::Flags;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".lsw";

/// Defaults read from `~/.lsw` (or the override path), OR-ed with command-line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Defaults {
    pub flags: Flags,
    pub human_readable: bool,
}

impl Defaults {
    /// `None` when the file is missing or unreadable; that never fails a listing.
    #[must_use]
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("no config at {}: {e}", path.display());
                return None;
            }
        };

        log::info!("Using config file: {}", path.display());
        Some(Self::parse(&content))
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut defaults = Defaults::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((k, v)) = line.split_once('=') else {
                log::debug!("ignoring config line without '=': {line}");
                continue;
            };
            let key = k.trim();
            let Some(value) = parse_bool(v.trim().trim_matches('"')) else {
                log::debug!("ignoring non-boolean value for {key}: {}", v.trim());
                continue;
            };

            match key {
                "all" => defaults.flags.all = value,
                "author" => defaults.flags.author = value,
                "c" => defaults.flags.by_time = value,
                "long" => defaults.flags.long = value,
                "human_readable" => defaults.human_readable = value,
                other => log::debug!("ignoring unknown config key: {other}"),
            }
        }

        defaults
    }
}

/// The override path if one was given, else `~/.lsw`.
#[must_use]
pub fn config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(p) => Some(p.to_path_buf()),
        None => dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
