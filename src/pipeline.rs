use crate::error::LsError;
use crate::owner::{self, OwnerLookup};
use crate::scanner;
use crate::types::Entry;
use std::path::Path;

/// Raw on/off switches, from the command line or the defaults file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub all: bool,
    pub author: bool,
    pub by_time: bool,
    pub long: bool,
}

impl Flags {
    /// Switches set in either source stay set.
    #[must_use]
    pub fn merge(self, other: Flags) -> Flags {
        Flags {
            all: self.all || other.all,
            author: self.author || other.author,
            by_time: self.by_time || other.by_time,
            long: self.long || other.long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Name,
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Plain,
    WithTime,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub show_hidden: bool,
    pub show_author: bool,
    pub sort: SortMode,
    pub layout: Layout,
}

impl Options {
    /// Long format wins over the time listing and always implies owners and name order.
    #[must_use]
    pub fn from_flags(flags: Flags) -> Self {
        let (sort, layout) = if flags.long {
            (SortMode::Name, Layout::Long)
        } else if flags.by_time {
            (SortMode::Modified, Layout::WithTime)
        } else {
            (SortMode::Name, Layout::Plain)
        };

        Options {
            show_hidden: flags.all,
            show_author: flags.author || flags.long,
            sort,
            layout,
        }
    }
}

/// Run every listing stage over the children of `dir`.
pub fn run(
    dir: &Path,
    options: &Options,
    lookup: &dyn OwnerLookup,
) -> Result<Vec<Entry>, LsError> {
    log::debug!("listing {} with {:?}", dir.display(), options);

    let entries = scanner::read_entries(dir)?;
    let entries = filter_hidden(entries, options.show_hidden);
    let entries = if options.show_author {
        owner::resolve_owners(entries, lookup)?
    } else {
        entries
    };

    Ok(sort_entries(entries, options.sort))
}

#[must_use]
pub fn filter_hidden(entries: Vec<Entry>, show_all: bool) -> Vec<Entry> {
    if show_all {
        return entries;
    }

    let before = entries.len();
    let visible: Vec<Entry> = entries.into_iter().filter(|e| !e.is_hidden()).collect();
    log::debug!("filtered {} hidden entries", before - visible.len());
    visible
}

/// Stable sort, so ties keep enumeration order.
#[must_use]
pub fn sort_entries(mut entries: Vec<Entry>, mode: SortMode) -> Vec<Entry> {
    match mode {
        SortMode::Name => entries.sort_by_cached_key(|e| e.name.to_lowercase()),
        SortMode::Modified => entries.sort_by(|a, b| b.modified.cmp(&a.modified)),
    }
    entries
}
