use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::model::task::{Location, Task};
use crate::ops::store::{Added, NowGroups, TaskStore};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectJson<'a> {
    pub name: &'a str,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct NowJson<'a> {
    pub loose: Vec<&'a Task>,
    pub groups: Vec<ProjectJson<'a>>,
}

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub inbox: Vec<&'a Task>,
    pub projects: Vec<ProjectJson<'a>>,
    pub now: NowJson<'a>,
}

/// Everything in a store, notes included
#[derive(Serialize)]
pub struct StateJson<'a> {
    #[serde(flatten)]
    pub lists: ListJson<'a>,
    pub notes: &'a str,
}

#[derive(Serialize)]
pub struct CopyJson<'a> {
    pub location: String,
    #[serde(flatten)]
    pub task: &'a Task,
}

#[derive(Serialize)]
pub struct AddedJson<'a> {
    pub id: &'a str,
    pub placed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Filters applied to every listing
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub id_chars: usize,
    pub show_completed: bool,
}

impl View {
    fn visible<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        tasks
            .into_iter()
            .filter(|t| self.show_completed || !t.completed)
            .collect()
    }
}

pub fn projects_to_json<'a>(store: &'a TaskStore, view: View) -> Vec<ProjectJson<'a>> {
    store
        .projects()
        .iter()
        .map(|(name, tasks)| ProjectJson {
            name,
            tasks: view.visible(tasks),
        })
        .collect()
}

pub fn now_to_json<'a>(groups: &NowGroups<'a>, view: View) -> NowJson<'a> {
    NowJson {
        loose: view.visible(groups.loose.iter().copied()),
        groups: groups
            .by_project
            .iter()
            .map(|(name, tasks)| ProjectJson {
                name: *name,
                tasks: view.visible(tasks.iter().copied()),
            })
            .collect(),
    }
}

pub fn list_to_json<'a>(store: &'a TaskStore, view: View) -> ListJson<'a> {
    ListJson {
        inbox: view.visible(store.inbox()),
        projects: projects_to_json(store, view),
        now: now_to_json(&store.now_groups(), view),
    }
}

/// The whole store, completed tasks included
pub fn state_to_json(store: &TaskStore) -> StateJson<'_> {
    let everything = View {
        id_chars: 0,
        show_completed: true,
    };
    StateJson {
        lists: list_to_json(store, everything),
        notes: store.notes(),
    }
}

pub fn added_to_json(added: &Added) -> AddedJson<'_> {
    AddedJson {
        id: &added.id,
        placed: added.placed.iter().map(Location::to_string).collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Trailing `chars` characters of an id; ids are timestamps, so the tail
/// is the part that differs.
pub fn short_id(id: &str, chars: usize) -> &str {
    let count = id.chars().count();
    if chars == 0 || count <= chars {
        return id;
    }
    let skip = count - chars;
    let start = id.char_indices().nth(skip).map(|(i, _)| i).unwrap_or(0);
    &id[start..]
}

/// `[x] 123456  buy milk`
pub fn format_task_line(task: &Task, view: View) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    format!("[{}] {}  {}", check, short_id(&task.id, view.id_chars), task.text)
}

/// A heading with a rule of matching display width
pub fn format_heading(title: &str) -> Vec<String> {
    vec![title.to_string(), "-".repeat(title.width().max(1))]
}

pub fn format_tasks(tasks: &[&Task], view: View, indent: usize) -> Vec<String> {
    let prefix = " ".repeat(indent);
    if tasks.is_empty() {
        return vec![format!("{}(empty)", prefix)];
    }
    tasks
        .iter()
        .map(|t| format!("{}{}", prefix, format_task_line(t, view)))
        .collect()
}

pub fn format_inbox(store: &TaskStore, view: View) -> Vec<String> {
    let mut lines = format_heading("Inbox");
    lines.extend(format_tasks(&view.visible(store.inbox()), view, 0));
    lines
}

pub fn format_projects(store: &TaskStore, view: View) -> Vec<String> {
    let mut lines = format_heading("Projects");
    if store.projects().is_empty() {
        lines.push("(no projects)".to_string());
    }
    for project in projects_to_json(store, view) {
        lines.push(format!("#{} ({})", project.name, project.tasks.len()));
        lines.extend(format_tasks(&project.tasks, view, 2));
    }
    lines
}

pub fn format_project(name: &str, tasks: &[Task], view: View) -> Vec<String> {
    let mut lines = format_heading(&format!("#{}", name));
    lines.extend(format_tasks(&view.visible(tasks), view, 0));
    lines
}

pub fn format_now(store: &TaskStore, view: View) -> Vec<String> {
    let mut lines = format_heading("Now");
    let now = now_to_json(&store.now_groups(), view);
    if now.loose.is_empty() && now.groups.is_empty() {
        lines.push("(empty)".to_string());
        return lines;
    }
    if !now.loose.is_empty() {
        lines.extend(format_tasks(&now.loose, view, 0));
    }
    for group in &now.groups {
        lines.push(format!("from #{}", group.name));
        lines.extend(format_tasks(&group.tasks, view, 2));
    }
    lines
}

pub fn format_copies(copies: &[(Location, &Task)]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some((_, first)) = copies.first() {
        lines.push(format!("id: {}", first.id));
        lines.push(format!("text: {}", first.text));
        lines.push(format!("source: {}", first.edit_source()));
    }
    for (location, task) in copies {
        let mut line = format!(
            "  {:<12} [{}]",
            location.to_string(),
            if task.completed { 'x' } else { ' ' }
        );
        if let Some(from) = &task.from_project {
            line.push_str(&format!(" from #{}", from));
        }
        lines.push(line);
    }
    lines
}
