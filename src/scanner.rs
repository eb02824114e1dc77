use crate::error::LsError;
use crate::types::Entry;
use chrono::{DateTime, Local};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Read the immediate children of `dir`. Any unreadable child fails the whole listing.
pub fn read_entries(dir: &Path) -> Result<Vec<Entry>, LsError> {
    let mut entries = Vec::new();

    for item in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let item = item?;
        let metadata = item.metadata()?;

        // Use UNIX_EPOCH as fallback so an entry without an mtime sorts last
        let modified: DateTime<Local> =
            metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH).into();

        entries.push(Entry {
            name: item.file_name().to_string_lossy().to_string(),
            path: item.path().to_path_buf(),
            is_dir: item.file_type().is_dir(),
            modified,
            owner: None,
            permissions: permission_string(&metadata),
            size: metadata.len(),
            hidden_attr: has_hidden_attribute(&metadata),
        });
    }

    log::debug!("read {} entries from {}", entries.len(), dir.display());
    Ok(entries)
}

#[cfg(unix)]
fn permission_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format_mode(metadata.permissions().mode())
}

// Windows only exposes the read-only bit; directories are always traversable
#[cfg(not(unix))]
fn permission_string(metadata: &Metadata) -> String {
    let mut mode = if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    };
    if metadata.is_dir() {
        mode |= 0o111;
    }
    format_mode(mode)
}

#[cfg(windows)]
fn has_hidden_attribute(metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn has_hidden_attribute(_metadata: &Metadata) -> bool {
    false
}

/// Render the permission bits of `mode` as `-rwxr-xr-x`
fn format_mode(mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push('-');
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_format_mode() {
        assert_eq!(format_mode(0o755), "-rwxr-xr-x");
        assert_eq!(format_mode(0o644), "-rw-r--r--");
        assert_eq!(format_mode(0o000), "----------");
        // Type and setuid bits are ignored
        assert_eq!(format_mode(0o40_4777), "-rwxrwxrwx");
    }

    #[test]
    fn test_read_entries_lists_immediate_children() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Alpha.txt"), b"hello").unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::write(dir.path().join("beta").join("nested.txt"), b"x").unwrap();

        let mut entries = read_entries(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".hidden", "Alpha.txt", "beta"]);

        let alpha = &entries[1];
        assert!(!alpha.is_dir);
        assert_eq!(alpha.size, 5);
        assert_eq!(alpha.permissions.len(), 10);
        assert!(alpha.owner.is_none());
        assert_eq!(alpha.path, dir.path().join("Alpha.txt"));

        assert!(entries[2].is_dir);
        assert!(entries[0].is_hidden());
        assert!(!alpha.is_hidden());
    }

    #[test]
    fn test_read_entries_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_entries(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_read_entries_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = read_entries(&missing).unwrap_err();
        assert!(matches!(err, LsError::ReadDir(_)));
    }
}
