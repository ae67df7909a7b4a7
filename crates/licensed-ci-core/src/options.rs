use std::path::PathBuf;

/// Argument shaping for license tool subcommand invocations.
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config_file: PathBuf,
    pub sources: Vec<String>,
    pub format: Option<String>,
}

impl CliOptions {
    pub fn new(config_file: PathBuf, sources: Vec<String>, format: Option<String>) -> Self {
        Self {
            config_file,
            sources,
            format,
        }
    }

    /// Arguments for `cache`: config file, then per-source and format flags.
    pub fn cache_args(&self) -> Vec<String> {
        let mut args = vec!["cache".to_string()];
        args.extend(self.common_args());
        args
    }

    /// `status` takes the same options as `cache`.
    pub fn status_args(&self) -> Vec<String> {
        let mut args = vec!["status".to_string()];
        args.extend(self.common_args());
        args
    }

    /// Arguments for `env`. Output is always requested as JSON because the
    /// caller parses the reported cache paths.
    pub fn env_args(&self) -> Vec<String> {
        vec![
            "env".to_string(),
            "--format".to_string(),
            "json".to_string(),
            "-c".to_string(),
            self.config_file.display().to_string(),
        ]
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["-c".to_string(), self.config_file.display().to_string()];
        for source in &self.sources {
            args.push("--sources".to_string());
            args.push(source.clone());
        }
        if let Some(format) = &self.format {
            args.push("--format".to_string());
            args.push(format.clone());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(sources: &[&str], format: Option<&str>) -> CliOptions {
        CliOptions::new(
            PathBuf::from(".licensed.yml"),
            sources.iter().map(|s| s.to_string()).collect(),
            format.map(String::from),
        )
    }

    #[test]
    fn cache_args_with_config_only() {
        assert_eq!(
            options(&[], None).cache_args(),
            vec!["cache", "-c", ".licensed.yml"]
        );
    }

    #[test]
    fn cache_args_with_sources_and_format() {
        assert_eq!(
            options(&["bundler", "npm"], Some("yaml")).cache_args(),
            vec![
                "cache",
                "-c",
                ".licensed.yml",
                "--sources",
                "bundler",
                "--sources",
                "npm",
                "--format",
                "yaml",
            ]
        );
    }

    #[test]
    fn status_args_match_cache_args() {
        let opts = options(&["cargo"], None);
        assert_eq!(opts.status_args()[1..], opts.cache_args()[1..]);
        assert_eq!(opts.status_args()[0], "status");
    }

    #[test]
    fn env_args_always_request_json() {
        assert_eq!(
            options(&["bundler"], Some("yaml")).env_args(),
            vec!["env", "--format", "json", "-c", ".licensed.yml"]
        );
    }
}
