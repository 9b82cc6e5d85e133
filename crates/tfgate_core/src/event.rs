//! GitHub Actions event classification.
//!
//! Turns the triggering event into a [`Trigger`] describing what to run, or
//! `None` when the event is not one tfgate reacts to.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

pub const EVENT_ISSUE_COMMENT: &str = "issue_comment";
pub const EVENT_SCHEDULE: &str = "schedule";
pub const EVENT_WORKFLOW_DISPATCH: &str = "workflow_dispatch";

pub const COMMAND_PLAN: &str = "///terraform plan";
pub const COMMAND_APPLY: &str = "///terraform apply";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse the `owner/name` form used by the Actions context.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.split_once('/')?;
        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Whether a run stops after planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    PlanOnly,
    Apply,
}

/// What a classified event asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Run against the root modules impacted by a pull request's changes.
    PullRequest {
        repository: Repository,
        number: u64,
        mode: Mode,
    },
    /// Plan every root module.
    AllRoots { repository: Option<Repository> },
}

impl Trigger {
    pub fn mode(&self) -> Mode {
        match self {
            Self::PullRequest { mode, .. } => *mode,
            Self::AllRoots { .. } => Mode::PlanOnly,
        }
    }

    pub fn pull_request(&self) -> Option<(&Repository, u64)> {
        match self {
            Self::PullRequest {
                repository, number, ..
            } => Some((repository, *number)),
            Self::AllRoots { .. } => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssueCommentPayload {
    comment: CommentPayload,
    issue: IssuePayload,
    repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    body: String,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    #[serde(default)]
    pull_request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

impl From<RepositoryPayload> for Repository {
    fn from(payload: RepositoryPayload) -> Self {
        Self::new(payload.owner.login, payload.name)
    }
}

#[derive(Debug, Deserialize)]
struct SchedulePayload {
    repository: Option<RepositoryPayload>,
}

/// The `github` context of a workflow, as produced by `${{ toJSON(github) }}`.
#[derive(Debug, Deserialize)]
struct GithubContext {
    event_name: String,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    event: Value,
}

/// Classify an event given its name and parsed payload.
///
/// `fallback` supplies the repository when the payload does not carry one.
pub fn classify(
    event_name: &str,
    payload: Value,
    fallback: Option<Repository>,
) -> CoreResult<Option<Trigger>> {
    let payload = if payload.is_null() {
        Value::Object(Default::default())
    } else {
        payload
    };

    let trigger = match event_name {
        EVENT_ISSUE_COMMENT => {
            let payload: IssueCommentPayload = serde_json::from_value(payload)?;

            let mode = match payload.comment.body.as_str() {
                COMMAND_PLAN => Mode::PlanOnly,
                COMMAND_APPLY => Mode::Apply,
                _ => return Ok(None),
            };
            if payload.issue.pull_request.is_none() {
                debug!(issue = payload.issue.number, "Comment is not on a pull request");
                return Ok(None);
            }

            let repository = payload
                .repository
                .map(Repository::from)
                .or(fallback)
                .ok_or_else(|| CoreError::InvalidEvent("missing repository".to_string()))?;

            Trigger::PullRequest {
                repository,
                number: payload.issue.number,
                mode,
            }
        }
        EVENT_SCHEDULE | EVENT_WORKFLOW_DISPATCH => {
            let payload: SchedulePayload = serde_json::from_value(payload)?;
            Trigger::AllRoots {
                repository: payload.repository.map(Repository::from).or(fallback),
            }
        }
        _ => return Ok(None),
    };

    debug!(event = event_name, trigger = ?trigger, "Classified event");
    Ok(Some(trigger))
}

/// Classify the event stored at `event_path` (`GITHUB_EVENT_PATH`).
pub fn from_event_file(event_name: &str, event_path: &Path) -> CoreResult<Option<Trigger>> {
    let content = fs::read_to_string(event_path).map_err(|source| CoreError::Io {
        path: event_path.to_path_buf(),
        source,
    })?;
    let payload: Value = serde_json::from_str(&content)?;
    classify(event_name, payload, None)
}

/// Classify from a serialized `github` context.
pub fn from_github_context(context: &str) -> CoreResult<Option<Trigger>> {
    let context: GithubContext = serde_json::from_str(context)?;
    let fallback = context.repository.as_deref().and_then(Repository::parse);
    classify(&context.event_name, context.event, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comment(body: &str) -> Value {
        json!({
            "comment": {"body": body},
            "issue": {"number": 123, "pull_request": {}},
            "repository": {"name": "repo01", "owner": {"login": "owner01"}}
        })
    }

    #[test]
    fn test_plan_comment() {
        let trigger = classify(EVENT_ISSUE_COMMENT, comment("///terraform plan"), None)
            .unwrap()
            .unwrap();

        assert_eq!(
            trigger,
            Trigger::PullRequest {
                repository: Repository::new("owner01", "repo01"),
                number: 123,
                mode: Mode::PlanOnly,
            }
        );
    }

    #[test]
    fn test_apply_comment() {
        let trigger = classify(EVENT_ISSUE_COMMENT, comment("///terraform apply"), None)
            .unwrap()
            .unwrap();
        assert_eq!(trigger.mode(), Mode::Apply);
        assert_eq!(trigger.pull_request().map(|(_, n)| n), Some(123));
    }

    #[test]
    fn test_other_comments_are_skipped() {
        assert!(classify(EVENT_ISSUE_COMMENT, comment("lgtm"), None)
            .unwrap()
            .is_none());
        assert!(classify(EVENT_ISSUE_COMMENT, comment("///terraform plan "), None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_comment_on_plain_issue_is_skipped() {
        let payload = json!({
            "comment": {"body": "///terraform apply"},
            "issue": {"number": 7},
            "repository": {"name": "repo01", "owner": {"login": "owner01"}}
        });
        assert!(classify(EVENT_ISSUE_COMMENT, payload, None).unwrap().is_none());
    }

    #[test]
    fn test_schedule_and_dispatch_plan_everything() {
        for name in [EVENT_SCHEDULE, EVENT_WORKFLOW_DISPATCH] {
            let trigger = classify(name, json!({}), None).unwrap().unwrap();
            assert_eq!(trigger, Trigger::AllRoots { repository: None });
            assert_eq!(trigger.mode(), Mode::PlanOnly);
        }
    }

    #[test]
    fn test_unknown_event_is_skipped() {
        assert!(classify("push", json!({}), None).unwrap().is_none());
    }

    #[test]
    fn test_malformed_comment_payload_is_an_error() {
        let result = classify(EVENT_ISSUE_COMMENT, json!({"comment": {}}), None);
        assert!(matches!(result, Err(CoreError::Serialization(_))));
    }

    #[test]
    fn test_github_context_uses_repository_fallback() {
        let context = json!({
            "event_name": "issue_comment",
            "repository": "owner01/repo01",
            "repository_owner": "owner01",
            "event": {
                "comment": {"body": "///terraform plan"},
                "issue": {"number": 5, "pull_request": {"url": "x"}}
            }
        });

        let trigger = from_github_context(&context.to_string()).unwrap().unwrap();

        assert_eq!(
            trigger.pull_request(),
            Some((&Repository::new("owner01", "repo01"), 5))
        );
    }

    #[test]
    fn test_event_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, comment("///terraform apply").to_string()).unwrap();

        let trigger = from_event_file(EVENT_ISSUE_COMMENT, &path).unwrap();
        assert!(trigger.is_some());

        let missing = from_event_file(EVENT_ISSUE_COMMENT, &dir.path().join("foo.json"));
        assert!(matches!(missing, Err(CoreError::Io { .. })));
    }

    #[test]
    fn test_repository_parse() {
        assert_eq!(
            Repository::parse("owner01/repo01"),
            Some(Repository::new("owner01", "repo01"))
        );
        assert_eq!(Repository::parse("nope"), None);
        assert_eq!(Repository::parse("/x"), None);
    }
}
