//! Run-wide mutual exclusion via an advisory file lock.
//!
//! Polls `try_lock_exclusive` until the bounded wait elapses; the guard
//! unlocks on drop, so the lock is released on every exit path.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use fs2::FileExt;
use log::warn;

use sheetsync_core::error::{SheetSyncError, SyncResult};
use sheetsync_core::store::RunLock;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    pub fn new(path: PathBuf) -> Self {
        FileLock { path }
    }
}

#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl RunLock for FileLock {
    type Guard = FileLockGuard;

    fn acquire(&self, timeout: Duration) -> SyncResult<FileLockGuard> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.path)?;

        let deadline = Instant::now() + timeout;
        let mut reported = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(FileLockGuard { file }),
                Err(_) if Instant::now() < deadline => {
                    if !reported {
                        warn!(
                            "run lock at {} is held, waiting up to {}s",
                            self.path.display(),
                            timeout.as_secs()
                        );
                        reported = true;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(_) => return Err(SheetSyncError::LockTimeout(timeout.as_secs())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquisition_times_out_while_the_lock_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.lock");

        let lock = FileLock::new(path.clone());
        let guard = lock.acquire(Duration::from_millis(100)).unwrap();

        let contender = FileLock::new(path.clone());
        let err = contender.acquire(Duration::from_millis(300)).unwrap_err();
        assert!(matches!(err, SheetSyncError::LockTimeout(_)));

        drop(guard);
        let reacquired = contender.acquire(Duration::from_millis(100));
        assert!(reacquired.is_ok());
    }
}
