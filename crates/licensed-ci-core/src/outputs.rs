use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, warn};

/// Step outputs handed back to the surrounding workflow run.
///
/// Outputs are appended as `name=value` lines to the file named by
/// `GITHUB_OUTPUT`. Failing to record an output never fails the run.
#[derive(Debug)]
pub struct StepOutputs {
    path: Option<PathBuf>,
}

impl StepOutputs {
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn set(&self, name: &str, value: &str) {
        info!("output {name}={value}");

        let Some(path) = &self.path else {
            debug!("GITHUB_OUTPUT not set, skipping output {name}");
            return;
        };

        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{name}={value}"));

        if let Err(e) = result {
            warn!("failed to record output {name}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_name_value_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        let outputs = StepOutputs::new(path.clone());

        outputs.set("licenses_updated", "true");
        outputs.set("pr_number", "7");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "licenses_updated=true\npr_number=7\n");
    }

    #[test]
    fn missing_output_file_env_is_tolerated() {
        let outputs = StepOutputs { path: None };
        outputs.set("licenses_updated", "false");
    }
}
