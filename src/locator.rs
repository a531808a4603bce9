use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::vec;
use tracing::{debug, warn};

use crate::error::{Result, ScanError};

/// File name suffix of an Apple Mail message file
pub const MESSAGE_EXTENSION: &str = ".emlx";

pub fn is_message_file(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(MESSAGE_EXTENSION.as_bytes())
}

/// Depth-first walk over a folder tree yielding message files.
///
/// Files of a folder come before its subfolders, and both are visited in
/// file-name order. Symlinked folders are not followed. A subfolder that
/// cannot be read is logged and skipped.
#[derive(Debug)]
pub struct MessageFiles {
    files: vec::IntoIter<PathBuf>,
    pending_dirs: Vec<PathBuf>,
}

/// Starts a walk at `root`. Fails when `root` is missing or not a readable folder.
pub fn locate(root: &Path) -> Result<MessageFiles> {
    let (files, subdirs) = read_folder(root).map_err(|source| ScanError::Path {
        path: root.to_path_buf(),
        source,
    })?;

    let mut walk = MessageFiles {
        files: files.into_iter(),
        pending_dirs: Vec::new(),
    };
    walk.push_subdirs(subdirs);
    Ok(walk)
}

impl MessageFiles {
    fn push_subdirs(&mut self, subdirs: Vec<PathBuf>) {
        // Reversed so the stack pops them in name order
        self.pending_dirs.extend(subdirs.into_iter().rev());
    }
}

impl Iterator for MessageFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.files.next() {
                return Some(path);
            }

            let dir = self.pending_dirs.pop()?;
            match read_folder(&dir) {
                Ok((files, subdirs)) => {
                    debug!(action = "enter", component = "locator", folder = ?dir, message_files = files.len(), "Scanning folder");
                    self.files = files.into_iter();
                    self.push_subdirs(subdirs);
                }
                Err(e) => {
                    warn!(action = "skip", component = "locator", folder = ?dir, error = %e, "Skipping unreadable folder");
                }
            }
        }
    }
}

/// Lists one folder, returning its message files and its subfolders, each sorted.
fn read_folder(dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(action = "skip", component = "locator", folder = ?dir, error = %e, "Skipping unreadable folder entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!(action = "skip", component = "locator", file_path = ?path, error = %e, "Skipping entry of unknown type");
                continue;
            }
        };

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_symlink() && path.is_dir() {
            continue;
        } else if is_message_file(&entry.file_name()) {
            files.push(path);
        }
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        assert!(is_message_file(OsStr::new("12.emlx")));
        assert!(is_message_file(OsStr::new("12.partial.emlx")));
        assert!(!is_message_file(OsStr::new("12.EMLX")));
        assert!(!is_message_file(OsStr::new("12.emlxpart")));
        assert!(!is_message_file(OsStr::new("Info.plist")));
    }

    #[test]
    fn test_walks_nested_folders_in_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/Messages")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        touch(&root.join("2.emlx"));
        touch(&root.join("1.emlx"));
        touch(&root.join("notes.txt"));
        touch(&root.join("a/3.emlx"));
        touch(&root.join("b/Messages/4.emlx"));
        touch(&root.join("b/Messages/4.emlx.bak"));

        let found: Vec<PathBuf> = locate(root)
            .unwrap()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("1.emlx"),
                PathBuf::from("2.emlx"),
                PathBuf::from("a/3.emlx"),
                PathBuf::from("b/Messages/4.emlx"),
            ]
        );
    }

    #[test]
    fn test_folder_named_like_message_is_descended() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("odd.emlx")).unwrap();
        touch(&dir.path().join("odd.emlx/5.emlx"));

        let found: Vec<PathBuf> = locate(dir.path()).unwrap().collect();
        assert_eq!(found, vec![dir.path().join("odd.emlx/5.emlx")]);
    }

    #[test]
    fn test_missing_root_is_path_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = locate(&missing).unwrap_err();
        assert!(matches!(err, ScanError::Path { ref path, .. } if *path == missing));
    }

    #[test]
    fn test_root_that_is_a_file_is_path_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("1.emlx");
        touch(&file);
        assert!(matches!(locate(&file), Err(ScanError::Path { .. })));
    }

    #[test]
    fn test_vanished_subfolder_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        touch(&root.join("a/1.emlx"));
        touch(&root.join("b/2.emlx"));

        let walk = locate(root).unwrap();
        fs::remove_dir_all(root.join("a")).unwrap();

        let found: Vec<PathBuf> = walk.collect();
        assert_eq!(found, vec![root.join("b/2.emlx")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_odd_entries_do_not_hide_siblings() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("linked.emlx")).unwrap();
        std::os::unix::fs::symlink(root.join("gone"), root.join("dangling")).unwrap();
        touch(&root.join("1.emlx"));
        touch(&root.join("real/2.emlx"));

        let found: Vec<PathBuf> = locate(root).unwrap().collect();
        assert_eq!(found, vec![root.join("1.emlx"), root.join("real/2.emlx")]);
    }

    #[test]
    fn test_each_walk_is_fresh() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("1.emlx"));
        assert_eq!(locate(dir.path()).unwrap().count(), 1);
        assert_eq!(locate(dir.path()).unwrap().count(), 1);
    }
}
