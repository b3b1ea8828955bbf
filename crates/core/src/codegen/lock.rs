//! Per-domain and tool-file locking.
//!
//! Each key is guarded twice: a `tokio` mutex for tasks in this process and
//! an advisory `fs2` lock on `<locks_dir>/<key>.lock` for other
//! processes. Callers take the domain lock before the tools lock.

use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::error::{CodegenError, CodegenResult};

pub const TOOLS_LOCK_KEY: &str = "tools-catalog";

/// Holds both locks for one key until dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    key: String,
    _in_process: OwnedMutexGuard<()>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(key = %self.key, error = %err, "Failed to release file lock");
        }
    }
}

#[derive(Debug)]
pub struct LockRegistry {
    locks_dir: PathBuf,
    in_process: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new(locks_dir: impl Into<PathBuf>) -> Self {
        Self {
            locks_dir: locks_dir.into(),
            in_process: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lock_domain(&self, domain: &str) -> CodegenResult<LockGuard> {
        self.acquire(&format!("domain-{domain}")).await
    }

    pub async fn lock_tools(&self) -> CodegenResult<LockGuard> {
        self.acquire(TOOLS_LOCK_KEY).await
    }

    async fn acquire(&self, key: &str) -> CodegenResult<LockGuard> {
        let mutex = {
            let mut locks = self
                .in_process
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        let in_process = mutex.lock_owned().await;

        let path = self.locks_dir.join(format!("{key}.lock"));
        fs::create_dir_all(&self.locks_dir).map_err(|source| CodegenError::Lock {
            path: self.locks_dir.clone(),
            source,
        })?;

        let lock_path = path.clone();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|result| result)
        .map_err(|source| CodegenError::Lock { path, source })?;

        tracing::debug!(key, "Lock acquired");
        Ok(LockGuard {
            file,
            key: key.to_string(),
            _in_process: in_process,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_lock_creates_lock_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let registry = LockRegistry::new(dir.path().join(".locks"));

        let guard = registry.lock_domain("sales").await.expect("lock");
        assert!(dir.path().join(".locks/domain-sales.lock").is_file());
        drop(guard);

        registry.lock_tools().await.expect("tools lock");
        assert!(dir.path().join(".locks/tools-catalog.lock").is_file());
    }

    #[tokio::test]
    async fn test_same_domain_is_serialized() {
        let dir = tempdir().expect("Failed to create temp dir");
        let registry = Arc::new(LockRegistry::new(dir.path().join(".locks")));

        let first = registry.lock_domain("sales").await.unwrap();

        let contender = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.lock_domain("sales").await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished(), "second lock waits for the first");

        let other = registry.lock_domain("support").await;
        assert!(other.is_ok(), "other domains are independent");

        drop(first);
        contender.await.unwrap().unwrap();
    }
}
