use serde::{Deserialize, Serialize};
use std::fmt;

/// A captured task.
///
/// A task tagged with several projects lives as one copy per project, all
/// sharing the same `id`. Copies are independent values: changing one does
/// not change the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Creation-time id, stable across moves
    pub id: String,
    /// Display text with `#tags` stripped
    pub text: String,
    /// Raw input including tags (re-parsed on edit)
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub completed: bool,
    /// Origin project while the task sits in the now-list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_project: Option<String>,
}

impl Task {
    /// Create an open task with no origin project
    pub fn new(id: String, text: String, original_text: String) -> Self {
        Task {
            id,
            text,
            original_text,
            completed: false,
            from_project: None,
        }
    }

    /// The text an edit starts from: the raw input when known, else the
    /// display text.
    pub fn edit_source(&self) -> &str {
        if self.original_text.is_empty() {
            &self.text
        } else {
            &self.original_text
        }
    }
}

/// A collection a task copy can live in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Inbox,
    Project(String),
    Now,
}

impl Location {
    /// Parse a location name: `inbox`, `now`, or a project name (with or
    /// without a leading `#`). A `#` forces the project reading, so
    /// `#inbox` names a project called "inbox".
    pub fn parse(s: &str) -> Location {
        let s = s.trim();
        if let Some(name) = s.strip_prefix('#') {
            return Location::Project(name.to_string());
        }
        match s {
            "inbox" => Location::Inbox,
            "now" => Location::Now,
            other => Location::Project(other.to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Inbox => write!(f, "inbox"),
            Location::Project(name) => write!(f, "#{}", name),
            Location::Now => write!(f, "now"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let task = Task::new("1".into(), "buy milk".into(), "buy milk #home".into());
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1","text":"buy milk","originalText":"buy milk #home","completed":false}"#
        );
    }

    #[test]
    fn deserializes_minimal_object() {
        let task: Task = serde_json::from_str(r#"{"id":"7","text":"call mom"}"#).unwrap();
        assert_eq!(task.original_text, "");
        assert!(!task.completed);
        assert!(task.from_project.is_none());
        assert_eq!(task.edit_source(), "call mom");
    }

    #[test]
    fn from_project_round_trips() {
        let task: Task = serde_json::from_str(
            r#"{"id":"7","text":"x","originalText":"x #a","completed":true,"fromProject":"a"}"#,
        )
        .unwrap();
        assert_eq!(task.from_project.as_deref(), Some("a"));
        assert!(task.completed);
        assert_eq!(task.edit_source(), "x #a");
    }

    #[test]
    fn location_parse() {
        assert_eq!(Location::parse("inbox"), Location::Inbox);
        assert_eq!(Location::parse("now"), Location::Now);
        assert_eq!(Location::parse("home"), Location::Project("home".into()));
        assert_eq!(Location::parse("#inbox"), Location::Project("inbox".into()));
        assert_eq!(Location::Project("home".into()).to_string(), "#home");
    }
}
