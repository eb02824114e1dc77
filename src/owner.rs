use crate::error::LsError;
use crate::types::Entry;
use std::io;
use std::path::Path;

/// Resolves the account that owns a filesystem path.
pub trait OwnerLookup {
    fn owner_of(&self, path: &Path) -> io::Result<String>;
}

/// Populate `owner` on every entry. The first failed lookup aborts the listing.
pub fn resolve_owners(
    entries: Vec<Entry>,
    lookup: &dyn OwnerLookup,
) -> Result<Vec<Entry>, LsError> {
    entries
        .into_iter()
        .map(|mut entry| {
            let owner = lookup
                .owner_of(&entry.path)
                .map_err(|source| LsError::Owner {
                    path: entry.path.clone(),
                    source,
                })?;
            entry.owner = Some(owner);
            Ok(entry)
        })
        .collect()
}

/// Owner lookup backed by the operating system.
#[cfg(unix)]
pub struct SystemOwners {
    users: uzers::UsersCache,
}

#[cfg(unix)]
impl SystemOwners {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: uzers::UsersCache::new(),
        }
    }
}

#[cfg(unix)]
impl OwnerLookup for SystemOwners {
    fn owner_of(&self, path: &Path) -> io::Result<String> {
        use std::os::unix::fs::MetadataExt;
        use uzers::Users;

        let uid = std::fs::symlink_metadata(path)?.uid();
        // Accounts missing from the user database show up as the bare uid
        Ok(self.users.get_user_by_uid(uid).map_or_else(
            || uid.to_string(),
            |user| user.name().to_string_lossy().to_string(),
        ))
    }
}

/// Owner lookup backed by the operating system.
#[cfg(windows)]
pub struct SystemOwners {
    // NUL-terminated local host name the account lookup is scoped to
    host: Option<Vec<u16>>,
}

#[cfg(windows)]
impl SystemOwners {
    #[must_use]
    pub fn new() -> Self {
        use std::os::windows::ffi::OsStrExt;

        let host = std::env::var_os("COMPUTERNAME")
            .map(|name| name.encode_wide().chain(Some(0)).collect());
        Self { host }
    }

    fn account_name(&self, sid: windows_sys::Win32::Foundation::PSID) -> io::Result<String> {
        use std::ptr::{null, null_mut};
        use windows_sys::Win32::Foundation::ERROR_NONE_MAPPED;
        use windows_sys::Win32::Security::{LookupAccountSidW, SID_NAME_USE};

        let system = self.host.as_ref().map_or(null(), |h| h.as_ptr());
        let mut name_len: u32 = 0;
        let mut domain_len: u32 = 0;
        let mut use_type: SID_NAME_USE = 0;

        // First call only reports the buffer sizes
        // SAFETY: `sid` comes from a live security descriptor; null buffers with zero lengths are allowed.
        unsafe {
            LookupAccountSidW(
                system,
                sid,
                null_mut(),
                &mut name_len,
                null_mut(),
                &mut domain_len,
                &mut use_type,
            );
        }
        if name_len == 0 {
            let err = io::Error::last_os_error();
            // Deleted or foreign accounts leave only the SID behind, like an orphaned uid
            if err.raw_os_error() == Some(ERROR_NONE_MAPPED as i32) {
                return sid_string(sid);
            }
            return Err(err);
        }

        let mut name = vec![0u16; name_len as usize];
        let mut domain = vec![0u16; domain_len.max(1) as usize];
        // SAFETY: both buffers are at least as long as the sizes passed alongside them.
        let ok = unsafe {
            LookupAccountSidW(
                system,
                sid,
                name.as_mut_ptr(),
                &mut name_len,
                domain.as_mut_ptr(),
                &mut domain_len,
                &mut use_type,
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(String::from_utf16_lossy(&name[..name_len as usize]))
    }
}

/// `S-1-5-21-...` form of a SID
#[cfg(windows)]
fn sid_string(sid: windows_sys::Win32::Foundation::PSID) -> io::Result<String> {
    use windows_sys::Win32::Foundation::LocalFree;
    use windows_sys::Win32::Security::Authorization::ConvertSidToStringSidW;
    use windows_sys::core::PWSTR;

    let mut raw: PWSTR = std::ptr::null_mut();
    // SAFETY: `sid` is valid for the duration of the call; `raw` is a valid out-pointer.
    if unsafe { ConvertSidToStringSidW(sid, &mut raw) } == 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: on success `raw` is a NUL-terminated buffer owned by us until LocalFree.
    let text = unsafe {
        let len = (0..).take_while(|&i| *raw.add(i) != 0).count();
        String::from_utf16_lossy(std::slice::from_raw_parts(raw, len))
    };
    // SAFETY: allocated by ConvertSidToStringSidW and freed exactly once.
    unsafe {
        LocalFree(raw.cast());
    }
    Ok(text)
}

#[cfg(windows)]
impl OwnerLookup for SystemOwners {
    fn owner_of(&self, path: &Path) -> io::Result<String> {
        use std::os::windows::ffi::OsStrExt;
        use std::ptr::null_mut;
        use windows_sys::Win32::Foundation::{ERROR_SUCCESS, LocalFree, PSID};
        use windows_sys::Win32::Security::Authorization::{GetNamedSecurityInfoW, SE_FILE_OBJECT};
        use windows_sys::Win32::Security::{OWNER_SECURITY_INFORMATION, PSECURITY_DESCRIPTOR};

        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(Some(0)).collect();
        let mut owner: PSID = null_mut();
        let mut descriptor: PSECURITY_DESCRIPTOR = null_mut();

        // SAFETY: `wide` is NUL-terminated and outlives the call; out-pointers are valid locals.
        let status = unsafe {
            GetNamedSecurityInfoW(
                wide.as_ptr(),
                SE_FILE_OBJECT,
                OWNER_SECURITY_INFORMATION,
                &mut owner,
                null_mut(),
                null_mut(),
                null_mut(),
                &mut descriptor,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(status as i32));
        }

        // `owner` points into `descriptor`, so resolve it before freeing
        let result = self.account_name(owner);
        // SAFETY: `descriptor` was allocated by GetNamedSecurityInfoW and is freed exactly once.
        unsafe {
            LocalFree(descriptor);
        }
        result
    }
}

#[cfg(any(unix, windows))]
impl Default for SystemOwners {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct FakeOwners {
        owners: HashMap<String, String>,
    }

    impl OwnerLookup for FakeOwners {
        fn owner_of(&self, path: &Path) -> io::Result<String> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.owners
                .get(&name)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "Access is denied."))
        }
    }

    fn make_entry(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            path: Path::new("/work").join(name),
            is_dir: false,
            modified: Local::now(),
            owner: None,
            permissions: "-rw-r--r--".to_string(),
            size: 0,
            hidden_attr: false,
        }
    }

    #[test]
    fn test_resolve_owners_populates_every_entry() {
        let lookup = FakeOwners {
            owners: HashMap::from([
                ("a.txt".to_string(), "alice".to_string()),
                ("b.txt".to_string(), "bob".to_string()),
            ]),
        };

        let entries = vec![make_entry("a.txt"), make_entry("b.txt")];
        let resolved = resolve_owners(entries, &lookup).unwrap();

        let owners: Vec<_> = resolved.iter().map(|e| e.owner.as_deref()).collect();
        assert_eq!(owners, vec![Some("alice"), Some("bob")]);
        // Order untouched
        assert_eq!(resolved[0].name, "a.txt");
    }

    #[test]
    fn test_resolve_owners_fails_on_first_error() {
        let lookup = FakeOwners {
            owners: HashMap::from([("a.txt".to_string(), "alice".to_string())]),
        };

        let entries = vec![make_entry("a.txt"), make_entry("locked.txt")];
        let err = resolve_owners(entries, &lookup).unwrap_err();

        match err {
            LsError::Owner { path, source } => {
                assert_eq!(path, PathBuf::from("/work").join("locked.txt"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_owners_empty() {
        let lookup = FakeOwners {
            owners: HashMap::new(),
        };
        assert!(resolve_owners(Vec::new(), &lookup)
            .unwrap()
            .is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_owners_resolves_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mine.txt");
        std::fs::write(&path, b"x").unwrap();

        let owner = SystemOwners::new().owner_of(&path).unwrap();
        assert!(!owner.is_empty());
    }

    #[cfg(windows)]
    #[test]
    fn test_unmapped_sid_falls_back_to_sid_string() {
        use windows_sys::Win32::Foundation::LocalFree;
        use windows_sys::Win32::Security::Authorization::ConvertStringSidToSidW;

        // Domain part matches no account on any host
        let text = "S-1-5-21-1-2-3-4242";
        let wide: Vec<u16> = text.encode_utf16().chain(Some(0)).collect();
        let mut sid = std::ptr::null_mut();
        assert_ne!(unsafe { ConvertStringSidToSidW(wide.as_ptr(), &mut sid) }, 0);

        let name = SystemOwners::new().account_name(sid);
        unsafe {
            LocalFree(sid);
        }
        assert_eq!(name.unwrap(), text);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_owners_missing_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemOwners::new()
            .owner_of(&dir.path().join("gone"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
