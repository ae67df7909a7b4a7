use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// The account type that triggered the workflow run, as reported by the
/// webhook event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderType {
    User,
    Bot,
    Organization,
}

/// Snapshot of the hosting environment for one invocation.
///
/// Built once from the `GITHUB_*` environment and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Context {
    /// `owner/repo` slug.
    pub repository: String,
    /// Raw value of `GITHUB_REF`, when present.
    pub ref_name: Option<String>,
    /// Login of the actor that triggered the run; empty when unknown.
    pub actor: String,
    /// Sender type from the event payload, when one could be read.
    pub sender_type: Option<SenderType>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    sender: Option<Sender>,
}

#[derive(Debug, Deserialize)]
struct Sender {
    #[serde(rename = "type")]
    kind: String,
}

impl Context {
    /// Read the invocation context from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let repository = std::env::var("GITHUB_REPOSITORY")
            .map_err(|_| ConfigError::MissingEnv("GITHUB_REPOSITORY"))?;
        let ref_name = std::env::var("GITHUB_REF").ok();
        let actor = std::env::var("GITHUB_ACTOR").unwrap_or_default();

        let sender_type = std::env::var("GITHUB_EVENT_PATH")
            .ok()
            .and_then(|path| read_sender_type(Path::new(&path)));

        Ok(Self {
            repository,
            ref_name,
            actor,
            sender_type,
        })
    }

    /// Resolve the branch the action operates on.
    ///
    /// An explicit override wins; otherwise `GITHUB_REF` must name a branch.
    pub fn branch(&self, branch_override: Option<&str>) -> Result<String, ConfigError> {
        if let Some(branch) = branch_override {
            return Ok(branch.to_string());
        }

        let git_ref = self.ref_name.as_deref().ok_or(ConfigError::MissingRef)?;
        match git_ref.strip_prefix("refs/heads/") {
            Some(branch) => Ok(branch.to_string()),
            None => Err(ConfigError::NotABranch(git_ref.to_string())),
        }
    }

    pub fn is_bot_sender(&self) -> bool {
        self.sender_type == Some(SenderType::Bot)
    }
}

fn read_sender_type(path: &Path) -> Option<SenderType> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("event payload unreadable: {e}");
            return None;
        }
    };

    let payload: EventPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("event payload not parseable: {e}");
            return None;
        }
    };

    payload.sender.map(|s| match s.kind.as_str() {
        "Bot" => SenderType::Bot,
        "Organization" => SenderType::Organization,
        _ => SenderType::User,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(ref_name: Option<&str>) -> Context {
        Context {
            repository: "octo/repo".into(),
            ref_name: ref_name.map(String::from),
            actor: "octocat".into(),
            sender_type: None,
        }
    }

    #[test]
    fn branch_from_heads_ref() {
        let ctx = context(Some("refs/heads/main"));
        assert_eq!(ctx.branch(None).unwrap(), "main");
    }

    #[test]
    fn branch_override_wins() {
        let ctx = context(Some("refs/tags/v1.0"));
        assert_eq!(ctx.branch(Some("release")).unwrap(), "release");
    }

    #[test]
    fn missing_ref_is_an_error() {
        let ctx = context(None);
        let err = ctx.branch(None).unwrap_err();
        assert_eq!(err.to_string(), "current ref not available");
    }

    #[test]
    fn tag_ref_is_an_error() {
        let ctx = context(Some("refs/tags/v1.0"));
        let err = ctx.branch(None).unwrap_err();
        assert_eq!(err.to_string(), "refs/tags/v1.0 does not reference a branch");
    }

    #[test]
    fn sender_type_from_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"sender": {"type": "Bot", "login": "dependabot[bot]"}}"#)
            .unwrap();
        assert_eq!(read_sender_type(&path), Some(SenderType::Bot));
    }

    #[test]
    fn missing_sender_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"action": "opened"}"#).unwrap();
        assert_eq!(read_sender_type(&path), None);
    }

    #[test]
    fn unreadable_payload_is_none() {
        assert_eq!(read_sender_type(Path::new("/does/not/exist.json")), None);
    }

    #[test]
    fn bot_detection() {
        let mut ctx = context(Some("refs/heads/main"));
        assert!(!ctx.is_bot_sender());
        ctx.sender_type = Some(SenderType::Bot);
        assert!(ctx.is_bot_sender());
    }
}
