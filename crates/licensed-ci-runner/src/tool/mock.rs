//! Scripted license tool for tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::{LicenseTool, StatusOutcome};

/// Mock tool that plays back scripted status results and writes configured
/// files into the work dir on `cache`, so git sees real changes.
///
/// Status results are consumed front-to-back; once the script is exhausted
/// every further check passes.
pub struct MockLicenseTool {
    work_dir: PathBuf,
    statuses: Mutex<VecDeque<bool>>,
    cache_writes: Vec<(String, String)>,
    reported_paths: Vec<String>,
    cache_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockLicenseTool {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            statuses: Mutex::new(VecDeque::new()),
            cache_writes: Vec::new(),
            reported_paths: vec![".".to_string()],
            cache_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_statuses(self, statuses: &[bool]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_cache_write(mut self, path: &str, contents: &str) -> Self {
        self.cache_writes.push((path.to_string(), contents.to_string()));
        self
    }

    pub fn with_reported_paths(mut self, paths: &[&str]) -> Self {
        self.reported_paths = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn cache_calls(&self) -> usize {
        self.cache_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicenseTool for MockLicenseTool {
    async fn cache(&self) -> Result<()> {
        self.cache_calls.fetch_add(1, Ordering::SeqCst);
        for (path, contents) in &self.cache_writes {
            let full = self.work_dir.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, contents)?;
        }
        Ok(())
    }

    async fn status(&self) -> Result<StatusOutcome> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let success = self.statuses.lock().unwrap().pop_front().unwrap_or(true);
        Ok(StatusOutcome {
            success,
            log: String::new(),
        })
    }

    async fn cache_paths(&self) -> Vec<String> {
        self.reported_paths.clone()
    }
}
