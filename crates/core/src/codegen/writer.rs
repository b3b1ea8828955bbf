//! Atomic file writes with rollback.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Replace `path` with `contents` through a temp file in the same directory.
///
/// An existing file keeps its permissions. A new file gets the same mode
/// `fs::write` would give it (`0o666` minus the umask on Unix).
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut temp = temp_file_in(parent)?;
    temp.write_all(contents.as_bytes())?;
    if let Some(permissions) = existing {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".ak-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // open(2) applies the umask to this mode
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

#[derive(Debug)]
enum Applied {
    Created(PathBuf),
    Replaced { path: PathBuf, previous: String },
}

/// A sequence of writes that can be undone as a unit.
///
/// Each write records what was there before; [`WriteSet::rollback`]
/// deletes created files and restores replaced ones, newest first.
#[derive(Debug, Default)]
pub struct WriteSet {
    applied: Vec<Applied>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        let previous = if path.is_file() {
            Some(fs::read_to_string(path)?)
        } else {
            None
        };

        write_atomic(path, contents)?;

        self.applied.push(match previous {
            Some(previous) => Applied::Replaced {
                path: path.to_path_buf(),
                previous,
            },
            None => Applied::Created(path.to_path_buf()),
        });
        Ok(())
    }

    /// Undo every write. Failures are logged and do not stop the rollback.
    pub fn rollback(self) {
        for applied in self.applied.into_iter().rev() {
            let (path, result) = match applied {
                Applied::Created(path) => {
                    let result = fs::remove_file(&path);
                    (path, result)
                }
                Applied::Replaced { path, previous } => {
                    let result = write_atomic(&path, &previous);
                    (path, result)
                }
            };
            match result {
                Ok(()) => tracing::debug!(path = %path.display(), "Rolled back"),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Failed to roll back")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("a/b/c.txt");
        write_atomic(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");

        write_atomic(&path, "again").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "again");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1, "no temp files left");
    }

    #[test]
    fn test_rollback_restores_and_removes() {
        let dir = tempdir().expect("Failed to create temp dir");
        let existing = dir.path().join("agents.yaml");
        let created = dir.path().join("prompt.md");
        fs::write(&existing, "before").unwrap();

        let mut set = WriteSet::new();
        set.write(&existing, "after").unwrap();
        set.write(&created, "new").unwrap();
        assert_eq!(fs::read_to_string(&existing).unwrap(), "after");

        set.rollback();
        assert_eq!(fs::read_to_string(&existing).unwrap(), "before");
        assert!(!created.exists());
    }

    #[test]
    fn test_write_onto_directory_fails() {
        let dir = tempdir().expect("Failed to create temp dir");
        let blocked = dir.path().join("service.py");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), "x").unwrap();

        let mut set = WriteSet::new();
        assert!(set.write(&blocked, "code").is_err());

        set.rollback();
        assert!(blocked.join("keep").is_file(), "failed write is not rolled back");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("Failed to create temp dir");
        let tools = dir.path().join("tools.py");
        fs::write(&tools, "# tools\n").unwrap();
        fs::set_permissions(&tools, fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&tools, "# tools\n# more\n").unwrap();
        let mode = fs::metadata(&tools).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);

        fs::set_permissions(&tools, fs::Permissions::from_mode(0o664)).unwrap();
        write_atomic(&tools, "# again\n").unwrap();
        let mode = fs::metadata(&tools).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o664);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_new_file_uses_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("Failed to create temp dir");
        let reference = dir.path().join("reference.md");
        fs::write(&reference, "x").unwrap();
        let expected = fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

        let created = dir.path().join("prompts/00-agent.md");
        write_atomic(&created, "# Prompt").unwrap();
        let mode = fs::metadata(&created).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, expected, "same mode as fs::write");
    }
}
