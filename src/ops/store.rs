use std::ops::{BitOr, BitOrAssign};

use chrono::Utc;
use indexmap::{IndexMap, IndexSet};

use crate::model::task::{Location, Task};
use crate::parse::{ParsedTask, parse_task};

/// Which persisted collections an operation changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Touched {
    pub inbox: bool,
    pub projects: bool,
    pub now: bool,
    pub notes: bool,
}

impl Touched {
    pub const NONE: Touched = Touched {
        inbox: false,
        projects: false,
        now: false,
        notes: false,
    };

    pub fn all() -> Self {
        Touched {
            inbox: true,
            projects: true,
            now: true,
            notes: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Touched::NONE
    }

    fn inbox() -> Self {
        Touched {
            inbox: true,
            ..Touched::NONE
        }
    }

    fn projects() -> Self {
        Touched {
            projects: true,
            ..Touched::NONE
        }
    }

    fn now() -> Self {
        Touched {
            now: true,
            ..Touched::NONE
        }
    }

    fn notes() -> Self {
        Touched {
            notes: true,
            ..Touched::NONE
        }
    }
}

impl BitOr for Touched {
    type Output = Touched;

    fn bitor(self, rhs: Touched) -> Touched {
        Touched {
            inbox: self.inbox || rhs.inbox,
            projects: self.projects || rhs.projects,
            now: self.now || rhs.now,
            notes: self.notes || rhs.notes,
        }
    }
}

impl BitOrAssign for Touched {
    fn bitor_assign(&mut self, rhs: Touched) {
        *self = *self | rhs;
    }
}

/// Anything a store operation returns that knows what it changed
pub trait Outcome {
    fn touched(&self) -> Touched;
}

impl Outcome for Touched {
    fn touched(&self) -> Touched {
        *self
    }
}

impl<T: Outcome> Outcome for Option<T> {
    fn touched(&self) -> Touched {
        self.as_ref().map(Outcome::touched).unwrap_or_default()
    }
}

/// Result of adding a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub id: String,
    /// Where copies were placed, in insertion order
    pub placed: Vec<Location>,
    pub touched: Touched,
}

impl Outcome for Added {
    fn touched(&self) -> Touched {
        self.touched
    }
}

/// Error type for id lookup
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no task matches id {0}")]
    NotFound(String),
    #[error("id {query} is ambiguous: matches {}", matches.join(", "))]
    Ambiguous { query: String, matches: Vec<String> },
}

/// The now-list split for display: inbox-origin tasks first, then one group
/// per origin project in first-appearance order
#[derive(Debug, Default)]
pub struct NowGroups<'a> {
    pub loose: Vec<&'a Task>,
    pub by_project: IndexMap<&'a str, Vec<&'a Task>>,
}

/// All task state: the inbox, the project registry, the now-list and notes.
///
/// Every operation is total. Empty input and unknown ids or project names
/// are no-ops that report `Touched::NONE`.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    inbox: Vec<Task>,
    /// Key order is the project display order; no list is ever empty
    projects: IndexMap<String, Vec<Task>>,
    now: Vec<Task>,
    notes: String,
    /// Highest id handed out or loaded; not part of the stored state
    last_id: u64,
}

/// Stores are equal when their collections are; `last_id` is bookkeeping.
impl PartialEq for TaskStore {
    fn eq(&self, other: &Self) -> bool {
        self.inbox == other.inbox
            && self.projects == other.projects
            && self.now == other.now
            && self.notes == other.notes
    }
}

impl Eq for TaskStore {}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    /// Assemble a store from loaded collections. Empty project lists are
    /// dropped so the registry only names projects that hold tasks.
    pub fn from_parts(
        inbox: Vec<Task>,
        mut projects: IndexMap<String, Vec<Task>>,
        now: Vec<Task>,
        notes: String,
    ) -> Self {
        projects.retain(|_, tasks| !tasks.is_empty());
        let mut store = TaskStore {
            inbox,
            projects,
            now,
            notes,
            last_id: 0,
        };
        store.last_id = store
            .all_tasks()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        store
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn inbox(&self) -> &[Task] {
        &self.inbox
    }

    pub fn projects(&self) -> &IndexMap<String, Vec<Task>> {
        &self.projects
    }

    pub fn project(&self, name: &str) -> Option<&[Task]> {
        self.projects.get(name).map(Vec::as_slice)
    }

    pub fn project_order(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    pub fn now(&self) -> &[Task] {
        &self.now
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.inbox.is_empty() && self.projects.is_empty() && self.now.is_empty()
    }

    /// Every copy of `id`, in inbox, project (in order), now order
    pub fn find(&self, id: &str) -> Vec<(Location, &Task)> {
        let mut found = Vec::new();
        for task in self.inbox.iter().filter(|t| t.id == id) {
            found.push((Location::Inbox, task));
        }
        for (name, tasks) in &self.projects {
            for task in tasks.iter().filter(|t| t.id == id) {
                found.push((Location::Project(name.clone()), task));
            }
        }
        for task in self.now.iter().filter(|t| t.id == id) {
            found.push((Location::Now, task));
        }
        found
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.all_tasks().any(|t| t.id == id)
    }

    /// Distinct task ids in inbox, project, now order
    pub fn ids(&self) -> IndexSet<&str> {
        self.all_tasks().map(|t| t.id.as_str()).collect()
    }

    /// Resolve a user-supplied id: an exact match wins, otherwise a unique
    /// suffix of a known id.
    pub fn resolve_id(&self, query: &str) -> Result<String, ResolveError> {
        let query = query.trim();
        let ids = self.ids();
        if ids.contains(query) {
            return Ok(query.to_string());
        }
        if query.is_empty() {
            return Err(ResolveError::NotFound(query.to_string()));
        }
        let matches: Vec<&str> = ids.into_iter().filter(|id| id.ends_with(query)).collect();
        match matches.as_slice() {
            [] => Err(ResolveError::NotFound(query.to_string())),
            [only] => Ok(only.to_string()),
            many => Err(ResolveError::Ambiguous {
                query: query.to_string(),
                matches: many.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    pub fn now_groups(&self) -> NowGroups<'_> {
        let mut groups = NowGroups::default();
        for task in &self.now {
            match task.from_project.as_deref() {
                None => groups.loose.push(task),
                Some(project) => groups.by_project.entry(project).or_default().push(task),
            }
        }
        groups
    }

    fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.inbox
            .iter()
            .chain(self.projects.values().flatten())
            .chain(self.now.iter())
    }

    /// Millisecond timestamp id, bumped past the last issued id and any
    /// id already in use
    fn fresh_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut candidate = now.max(self.last_id + 1);
        while self.contains_id(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_id = candidate;
        candidate.to_string()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Capture a task from raw input. Untagged tasks go to the inbox; tagged
    /// tasks get one copy per distinct tag, creating projects as needed.
    /// Returns `None` for blank input.
    pub fn add(&mut self, raw: &str) -> Option<Added> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = parse_task(raw);
        let id = self.fresh_id();
        let task = Task::new(id.clone(), parsed.text.clone(), raw.to_string());
        let (placed, touched) = self.place(task, &parsed);
        Some(Added {
            id,
            placed,
            touched,
        })
    }

    /// Promote a task into the now-list from the inbox (`from = None`) or
    /// from one project. The origin copy is removed; an emptied project is
    /// dropped. Copies in other projects stay where they are.
    pub fn move_to_now(&mut self, id: &str, from: Option<&str>) -> Touched {
        let origin = match from {
            None => self.inbox.iter().find(|t| t.id == id),
            Some(name) => self
                .projects
                .get(name)
                .and_then(|tasks| tasks.iter().find(|t| t.id == id)),
        };
        let Some(mut task) = origin.cloned() else {
            return Touched::NONE;
        };
        task.from_project = from.map(str::to_string);
        self.now.push(task);

        match from {
            None => {
                self.inbox.retain(|t| t.id != id);
                Touched::now() | Touched::inbox()
            }
            Some(name) => {
                if let Some(tasks) = self.projects.get_mut(name) {
                    tasks.retain(|t| t.id != id);
                    if tasks.is_empty() {
                        self.projects.shift_remove(name);
                    }
                }
                Touched::now() | Touched::projects()
            }
        }
    }

    /// Replace a task's text. The task is pulled out of every collection
    /// (the now-list included) and placed again from the new tags under the
    /// same id, with completion reset. Blank text or an unknown id changes
    /// nothing.
    pub fn edit(&mut self, id: &str, raw: &str) -> Touched {
        let raw = raw.trim();
        if raw.is_empty() || !self.contains_id(id) {
            return Touched::NONE;
        }
        let parsed = parse_task(raw);
        let mut touched = self.remove_everywhere(id);
        let task = Task::new(id.to_string(), parsed.text.clone(), raw.to_string());
        touched |= self.place(task, &parsed).1;
        touched
    }

    /// Remove every copy of a task. Idempotent.
    pub fn delete(&mut self, id: &str) -> Touched {
        self.remove_everywhere(id)
    }

    /// Flip `completed` on every copy of `id`. Each copy flips its own value,
    /// so copies that already disagree keep disagreeing.
    pub fn toggle_complete(&mut self, id: &str) -> Touched {
        let mut touched = Touched::NONE;
        if flip(&mut self.inbox, id) {
            touched |= Touched::inbox();
        }
        let mut in_projects = false;
        for tasks in self.projects.values_mut() {
            in_projects |= flip(tasks, id);
        }
        if in_projects {
            touched |= Touched::projects();
        }
        if flip(&mut self.now, id) {
            touched |= Touched::now();
        }
        touched
    }

    /// Flip `completed` on the copy at one location only
    pub fn toggle_complete_at(&mut self, id: &str, location: &Location) -> Touched {
        match location {
            Location::Inbox if flip(&mut self.inbox, id) => Touched::inbox(),
            Location::Now if flip(&mut self.now, id) => Touched::now(),
            Location::Project(name) => match self.projects.get_mut(name) {
                Some(tasks) => {
                    if flip(tasks, id) {
                        Touched::projects()
                    } else {
                        Touched::NONE
                    }
                }
                None => Touched::NONE,
            },
            _ => Touched::NONE,
        }
    }

    /// Dissolve a project: its tasks move to the end of the inbox with
    /// their tags forgotten (`original_text` becomes the display text).
    pub fn delete_project(&mut self, name: &str) -> Touched {
        let Some(tasks) = self.projects.shift_remove(name) else {
            return Touched::NONE;
        };
        self.inbox.extend(tasks.into_iter().map(|mut task| {
            task.original_text = task.text.clone();
            task
        }));
        Touched::inbox() | Touched::projects()
    }

    /// Move `dragged` to the index `target` currently holds (remove, then
    /// insert at that index). No-op when either name is unknown or they are
    /// the same project.
    pub fn reorder_project(&mut self, dragged: &str, target: &str) -> Touched {
        if dragged == target {
            return Touched::NONE;
        }
        let (Some(from), Some(to)) = (
            self.projects.get_index_of(dragged),
            self.projects.get_index_of(target),
        ) else {
            return Touched::NONE;
        };
        self.projects.move_index(from, to);
        Touched::projects()
    }

    pub fn set_notes(&mut self, notes: &str) -> Touched {
        if self.notes == notes {
            return Touched::NONE;
        }
        self.notes = notes.to_string();
        Touched::notes()
    }

    /// Append a line to the notes
    pub fn append_notes(&mut self, line: &str) -> Touched {
        if line.is_empty() {
            return Touched::NONE;
        }
        if !self.notes.is_empty() && !self.notes.ends_with('\n') {
            self.notes.push('\n');
        }
        self.notes.push_str(line);
        Touched::notes()
    }

    /// Swap in another store wholesale
    pub fn replace(&mut self, other: TaskStore) -> Touched {
        let last_id = self.last_id.max(other.last_id);
        *self = other;
        self.last_id = last_id;
        Touched::all()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn place(&mut self, task: Task, parsed: &ParsedTask) -> (Vec<Location>, Touched) {
        let projects = parsed.projects();
        if projects.is_empty() {
            self.inbox.push(task);
            return (vec![Location::Inbox], Touched::inbox());
        }
        let mut placed = Vec::with_capacity(projects.len());
        for name in projects {
            self.projects
                .entry(name.to_string())
                .or_default()
                .push(task.clone());
            placed.push(Location::Project(name.to_string()));
        }
        (placed, Touched::projects())
    }

    fn remove_everywhere(&mut self, id: &str) -> Touched {
        let mut touched = Touched::NONE;
        if remove_id(&mut self.inbox, id) {
            touched |= Touched::inbox();
        }
        let mut in_projects = false;
        for tasks in self.projects.values_mut() {
            in_projects |= remove_id(tasks, id);
        }
        if in_projects {
            self.projects.retain(|_, tasks| !tasks.is_empty());
            touched |= Touched::projects();
        }
        if remove_id(&mut self.now, id) {
            touched |= Touched::now();
        }
        touched
    }
}

/// Drop every task with `id`; true if anything was removed
fn remove_id(tasks: &mut Vec<Task>, id: &str) -> bool {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    tasks.len() != before
}

/// Flip every task with `id`; true if any matched
fn flip(tasks: &mut [Task], id: &str) -> bool {
    let mut hit = false;
    for task in tasks.iter_mut().filter(|t| t.id == id) {
        task.completed = !task.completed;
        hit = true;
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    fn add(store: &mut TaskStore, raw: &str) -> String {
        store.add(raw).expect("non-blank input").id
    }

    // --- add ---

    #[test]
    fn add_untagged_goes_to_inbox() {
        let mut store = TaskStore::new();
        let added = store.add("  call mom  ").unwrap();
        assert_eq!(added.placed, vec![Location::Inbox]);
        assert_eq!(added.touched, Touched::inbox());
        assert_eq!(store.inbox().len(), 1);
        assert_eq!(store.inbox()[0].text, "call mom");
        assert_eq!(store.inbox()[0].original_text, "call mom");
        assert!(!store.inbox()[0].completed);
        assert!(store.projects().is_empty());
    }

    #[test]
    fn add_blank_is_ignored() {
        let mut store = TaskStore::new();
        assert!(store.add("   ").is_none());
        assert!(store.add("").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn add_tagged_fans_out_with_shared_id() {
        let mut store = TaskStore::new();
        let added = store.add("buy milk #groceries #home").unwrap();
        assert!(store.inbox().is_empty());
        assert_eq!(store.project_order(), vec!["groceries", "home"]);
        for name in ["groceries", "home"] {
            let tasks = store.project(name).unwrap();
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].id, added.id);
            assert_eq!(tasks[0].text, "buy milk");
            assert_eq!(tasks[0].original_text, "buy milk #groceries #home");
            assert!(!tasks[0].completed);
        }
        assert_eq!(added.touched, Touched::projects());
    }

    #[test]
    fn add_duplicate_tag_places_one_copy() {
        let mut store = TaskStore::new();
        store.add("x #a #a").unwrap();
        assert_eq!(store.project("a").unwrap().len(), 1);
    }

    #[test]
    fn add_appends_to_existing_project_without_reordering() {
        let mut store = TaskStore::new();
        add(&mut store, "one #a");
        add(&mut store, "two #b");
        add(&mut store, "three #a");
        assert_eq!(store.project_order(), vec!["a", "b"]);
        assert_eq!(titles(store.project("a").unwrap()), vec!["one", "three"]);
    }

    #[test]
    fn ids_are_unique_for_rapid_adds() {
        let mut store = TaskStore::new();
        let ids: Vec<String> = (0..50).map(|i| add(&mut store, &format!("t{}", i))).collect();
        let distinct: IndexSet<&String> = ids.iter().collect();
        assert_eq!(distinct.len(), 50);
    }

    #[test]
    fn ids_keep_rising_after_delete() {
        let mut store = TaskStore::new();
        let first = add(&mut store, "first");
        store.delete(&first);
        let second = add(&mut store, "second");
        assert!(second.parse::<u64>().unwrap() > first.parse::<u64>().unwrap());
    }

    #[test]
    fn ids_rise_past_loaded_ids() {
        let future = (Utc::now().timestamp_millis() as u64 + 60_000).to_string();
        let task = Task::new(future.clone(), "from the future".into(), "from the future".into());
        let mut store = TaskStore::from_parts(vec![task], IndexMap::new(), Vec::new(), String::new());
        let id = add(&mut store, "next");
        assert!(id.parse::<u64>().unwrap() > future.parse::<u64>().unwrap());
    }

    #[test]
    fn toggle_at_project_flips_one_copy() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "buy milk #groceries #home");
        let touched = store.toggle_complete_at(&id, &Location::Project("home".into()));
        assert_eq!(touched, Touched::projects());
        assert!(store.project("home").unwrap()[0].completed);
        assert!(!store.project("groceries").unwrap()[0].completed);
        assert_eq!(
            store.toggle_complete_at(&id, &Location::Project("nowhere".into())),
            Touched::NONE
        );
        assert_eq!(store.toggle_complete_at("missing", &Location::Project("home".into())), Touched::NONE);
    }

    // --- move to now ---

    #[test]
    fn move_from_inbox_to_now() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "write report");
        let touched = store.move_to_now(&id, None);
        assert_eq!(touched, Touched::now() | Touched::inbox());
        assert!(store.inbox().is_empty());
        assert_eq!(store.now().len(), 1);
        assert!(store.now()[0].from_project.is_none());
    }

    #[test]
    fn move_last_project_task_drops_project() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "paint fence #house");
        add(&mut store, "other #garden");
        store.move_to_now(&id, Some("house"));
        assert!(store.project("house").is_none());
        assert_eq!(store.project_order(), vec!["garden"]);
        assert_eq!(store.now()[0].from_project.as_deref(), Some("house"));
        assert_eq!(store.now()[0].id, id);
    }

    #[test]
    fn move_keeps_other_project_copies() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "buy milk #groceries #home");
        store.move_to_now(&id, Some("groceries"));
        assert!(store.project("groceries").is_none());
        assert_eq!(store.project("home").unwrap()[0].id, id);
        assert_eq!(store.now().len(), 1);
    }

    #[test]
    fn move_unknown_is_noop() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "x #a");
        let before = store.clone();
        assert!(store.move_to_now("nope", None).is_empty());
        assert!(store.move_to_now(&id, None).is_empty());
        assert!(store.move_to_now(&id, Some("b")).is_empty());
        assert_eq!(store, before);
    }

    // --- edit ---

    #[test]
    fn edit_retags_and_resets_completion() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "draft #work");
        store.toggle_complete(&id);
        let touched = store.edit(&id, "draft v2 #home");
        assert!(touched.projects);
        assert!(store.project("work").is_none());
        let home = store.project("home").unwrap();
        assert_eq!(home[0].id, id);
        assert_eq!(home[0].text, "draft v2");
        assert_eq!(home[0].original_text, "draft v2 #home");
        assert!(!home[0].completed);
    }

    #[test]
    fn edit_removing_tags_moves_to_inbox() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "draft #work #home");
        store.edit(&id, "draft");
        assert!(store.projects().is_empty());
        assert_eq!(store.inbox()[0].id, id);
    }

    #[test]
    fn edit_pulls_task_out_of_now() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "focus me");
        store.move_to_now(&id, None);
        let touched = store.edit(&id, "focus me later");
        assert!(touched.now && touched.inbox);
        assert!(store.now().is_empty());
        assert_eq!(store.inbox()[0].text, "focus me later");
        assert!(store.inbox()[0].from_project.is_none());
    }

    #[test]
    fn edit_blank_changes_nothing() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "buy milk #groceries #home");
        store.toggle_complete_at(&id, &Location::Project("home".into()));
        let before = store.clone();
        assert!(store.edit(&id, "   ").is_empty());
        assert_eq!(store, before);
    }

    #[test]
    fn edit_unknown_id_is_noop() {
        let mut store = TaskStore::new();
        add(&mut store, "x");
        let before = store.clone();
        assert!(store.edit("missing", "y #z").is_empty());
        assert_eq!(store, before);
    }

    // --- delete ---

    #[test]
    fn delete_removes_every_copy() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "x #a #b");
        add(&mut store, "y #b");
        store.move_to_now(&id, Some("a"));
        let touched = store.delete(&id);
        assert!(touched.projects && touched.now);
        assert!(store.find(&id).is_empty());
        assert_eq!(store.project_order(), vec!["b"]);
        assert!(store.delete(&id).is_empty());
    }

    // --- toggle ---

    #[test]
    fn toggle_flips_every_copy() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "x #a #b");
        let touched = store.toggle_complete(&id);
        assert_eq!(touched, Touched::projects());
        assert!(store.find(&id).iter().all(|(_, t)| t.completed));
    }

    #[test]
    fn toggle_at_one_location_leaves_other_copy() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "x #a #b");
        store.toggle_complete_at(&id, &Location::Project("a".into()));
        assert!(store.project("a").unwrap()[0].completed);
        assert!(!store.project("b").unwrap()[0].completed);
    }

    #[test]
    fn toggle_keeps_diverged_copies_diverged() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "x #a #b");
        store.toggle_complete_at(&id, &Location::Project("a".into()));
        store.toggle_complete(&id);
        assert!(!store.project("a").unwrap()[0].completed);
        assert!(store.project("b").unwrap()[0].completed);
    }

    #[test]
    fn toggle_unknown_is_noop() {
        let mut store = TaskStore::new();
        add(&mut store, "x");
        assert!(store.toggle_complete("missing").is_empty());
        assert!(store.toggle_complete_at("missing", &Location::Now).is_empty());
    }

    // --- delete project ---

    #[test]
    fn delete_project_returns_tasks_to_inbox_untagged() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "buy milk #groceries #home");
        store.toggle_complete_at(&id, &Location::Project("home".into()));
        let touched = store.delete_project("home");
        assert_eq!(touched, Touched::inbox() | Touched::projects());
        assert_eq!(store.project_order(), vec!["groceries"]);
        let task = &store.inbox()[0];
        assert_eq!(task.text, "buy milk");
        assert_eq!(task.original_text, "buy milk");
        assert!(task.completed);
        let kept = &store.project("groceries").unwrap()[0];
        assert_eq!(kept.original_text, "buy milk #groceries #home");
        assert!(!kept.completed);
    }

    #[test]
    fn delete_unknown_project_is_noop() {
        let mut store = TaskStore::new();
        add(&mut store, "x #a");
        assert!(store.delete_project("b").is_empty());
    }

    // --- reorder ---

    fn abcd() -> TaskStore {
        let mut store = TaskStore::new();
        for name in ["a", "b", "c", "d"] {
            add(&mut store, &format!("t #{}", name));
        }
        store
    }

    #[test]
    fn reorder_forward_lands_at_target_index() {
        let mut store = abcd();
        store.reorder_project("a", "c");
        assert_eq!(store.project_order(), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn reorder_backward_lands_before_target() {
        let mut store = abcd();
        store.reorder_project("d", "b");
        assert_eq!(store.project_order(), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn reorder_noops() {
        let mut store = abcd();
        assert!(store.reorder_project("a", "a").is_empty());
        assert!(store.reorder_project("a", "zz").is_empty());
        assert!(store.reorder_project("zz", "a").is_empty());
        assert_eq!(store.project_order(), vec!["a", "b", "c", "d"]);
    }

    // --- notes ---

    #[test]
    fn notes_set_and_append() {
        let mut store = TaskStore::new();
        assert_eq!(store.set_notes("first"), Touched::notes());
        assert!(store.set_notes("first").is_empty());
        store.append_notes("second");
        assert_eq!(store.notes(), "first\nsecond");
        assert!(store.append_notes("").is_empty());
    }

    // --- queries ---

    #[test]
    fn now_groups_by_origin() {
        let mut store = TaskStore::new();
        let a = add(&mut store, "loose");
        let b = add(&mut store, "b1 #work");
        let c = add(&mut store, "c1 #home");
        let d = add(&mut store, "b2 #work");
        store.move_to_now(&b, Some("work"));
        store.move_to_now(&a, None);
        store.move_to_now(&c, Some("home"));
        store.move_to_now(&d, Some("work"));
        let groups = store.now_groups();
        assert_eq!(titles_ref(&groups.loose), vec!["loose"]);
        let keys: Vec<&str> = groups.by_project.keys().copied().collect();
        assert_eq!(keys, vec!["work", "home"]);
        assert_eq!(titles_ref(&groups.by_project["work"]), vec!["b1", "b2"]);
    }

    fn titles_ref<'a>(tasks: &[&'a Task]) -> Vec<&'a str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn resolve_exact_and_suffix() {
        let store = TaskStore::from_parts(
            vec![
                Task::new("1700000000123".into(), "a".into(), "a".into()),
                Task::new("1700000000456".into(), "b".into(), "b".into()),
            ],
            IndexMap::new(),
            Vec::new(),
            String::new(),
        );
        assert_eq!(store.resolve_id("1700000000123").unwrap(), "1700000000123");
        assert_eq!(store.resolve_id("456").unwrap(), "1700000000456");
        assert!(matches!(
            store.resolve_id("0"),
            Err(ResolveError::NotFound(_))
        ));
        assert!(matches!(
            store.resolve_id("00"),
            Err(ResolveError::NotFound(_))
        ));
        assert!(matches!(
            store.resolve_id("1700000000"),
            Err(ResolveError::NotFound(_))
        ));
        assert!(matches!(store.resolve_id(""), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn resolve_ambiguous_suffix() {
        let store = TaskStore::from_parts(
            vec![
                Task::new("100123".into(), "a".into(), "a".into()),
                Task::new("200123".into(), "b".into(), "b".into()),
            ],
            IndexMap::new(),
            Vec::new(),
            String::new(),
        );
        assert!(matches!(
            store.resolve_id("123"),
            Err(ResolveError::Ambiguous { .. })
        ));
        assert_eq!(store.resolve_id("1123").ok(), None);
    }

    #[test]
    fn from_parts_drops_empty_projects() {
        let mut projects = IndexMap::new();
        projects.insert("empty".to_string(), Vec::new());
        projects.insert(
            "full".to_string(),
            vec![Task::new("1".into(), "x".into(), "x #full".into())],
        );
        let store = TaskStore::from_parts(Vec::new(), projects, Vec::new(), String::new());
        assert_eq!(store.project_order(), vec!["full"]);
    }

    #[test]
    fn find_lists_every_copy() {
        let mut store = TaskStore::new();
        let id = add(&mut store, "x #a #b");
        store.move_to_now(&id, Some("b"));
        let locations: Vec<Location> = store.find(&id).into_iter().map(|(l, _)| l).collect();
        assert_eq!(locations, vec![Location::Project("a".into()), Location::Now]);
    }
}
