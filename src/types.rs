use chrono::{DateTime, Local};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Entry {
    /// Display form of the file name; may be lossy
    pub name: String,
    /// Path the entry was read from, used for any further OS lookups
    pub path: PathBuf,
    pub is_dir: bool,
    pub modified: DateTime<Local>,
    pub owner: Option<String>,
    pub permissions: String,
    pub size: u64,
    /// Platform hidden attribute (Windows `FILE_ATTRIBUTE_HIDDEN`), independent of the name
    pub hidden_attr: bool,
}

impl Entry {
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.') || self.hidden_attr
    }
}
