#![forbid(unsafe_code)]

//! Hierarchical tasks and the dashboard's incomplete-task view.
//!
//! Tasks form a tree through `parentId`. The dashboard view works on a
//! filtered, sorted slice of that tree:
//!
//! - only incomplete tasks (progress below 100) are shown;
//! - a text filter keeps name matches plus their incomplete ancestors, so
//!   a matching child is never orphaned from its context;
//! - ordering is priority (high first), then start date ascending with
//!   dated tasks before undated ones, then end date the same way;
//! - a task whose parent fell out of the visible set renders as a root.
//!
//! Completing a task can complete its parent: when every direct child of a
//! parent reaches 100, the parent is set to 100 as well. Only the immediate
//! parent is touched.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::json::{JsonFileStore, StoreError};

const TASKS_FILE: &str = "tasks.json";
const COMPLETE: u8 = 100;

/// What kind of work a task is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Code,
    Test,
    Design,
    Confirm,
    #[default]
    Custom,
}

/// Task urgency, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

/// An attachment on a task, pointing at a QA report or bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub id: String,
    pub label: String,
    pub link: String,
}

/// One task in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Id of the parent task, or `None` for a root.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
    /// Percent complete, 0 to 100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub qas: Vec<LinkRef>,
    #[serde(default)]
    pub bugs: Vec<LinkRef>,
}

impl Task {
    /// Create a task with the given id and name, everything else default.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            kind: TaskKind::default(),
            priority: Priority::default(),
            start_date: None,
            end_date: None,
            progress: 0,
            notes: None,
            qas: Vec::new(),
            bugs: Vec::new(),
        }
    }

    /// Whether the task has reached 100 percent.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= COMPLETE
    }
}

/// Old data files store absent dates as `""` rather than omitting the key.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Ids of every task below `root_id` in the tree.
#[must_use]
pub fn descendant_ids(tasks: &[Task], root_id: &str) -> FxHashSet<String> {
    let mut ids = FxHashSet::default();
    let mut stack = vec![root_id.to_owned()];
    while let Some(parent) = stack.pop() {
        for task in tasks {
            if task.parent_id.as_deref() == Some(parent.as_str()) && ids.insert(task.id.clone()) {
                stack.push(task.id.clone());
            }
        }
    }
    ids
}

/// Whether `candidate` may become the parent of `task_id` without forming a
/// cycle. A task may not become its own parent or a child of its own subtree.
#[must_use]
pub fn is_valid_parent(tasks: &[Task], task_id: &str, candidate: &str) -> bool {
    task_id != candidate && !descendant_ids(tasks, task_id).contains(candidate)
}

/// Set a task's progress and propagate completion to its parent.
///
/// When the task reaches 100 and every sibling under the same parent is also
/// at 100, the parent's progress jumps to 100. Only the direct parent is
/// updated. Missing ids are ignored.
pub fn set_progress(tasks: &mut [Task], id: &str, progress: u8) {
    let progress = progress.min(COMPLETE);
    let Some(idx) = tasks.iter().position(|t| t.id == id) else {
        return;
    };
    tasks[idx].progress = progress;

    if progress < COMPLETE {
        return;
    }
    let Some(parent_id) = tasks[idx].parent_id.clone() else {
        return;
    };
    let siblings_done = tasks
        .iter()
        .filter(|t| t.parent_id.as_deref() == Some(parent_id.as_str()))
        .all(Task::is_complete);
    if siblings_done
        && let Some(parent) = tasks.iter_mut().find(|t| t.id == parent_id)
    {
        parent.progress = COMPLETE;
    }
}

/// The dashboard's incomplete-task view: filtered and sorted.
///
/// With an empty filter, every incomplete task is visible. A non-empty
/// filter matches case-insensitively against task names; each match also
/// pulls in its incomplete ancestors so the tree renders with context.
#[must_use]
pub fn incomplete_view(tasks: &[Task], filter: &str) -> Vec<Task> {
    let incomplete: Vec<&Task> = tasks.iter().filter(|t| !t.is_complete()).collect();

    let visible: Vec<Task> = if filter.is_empty() {
        incomplete.iter().map(|t| (*t).clone()).collect()
    } else {
        let needle = filter.to_lowercase();
        let by_id: FxHashMap<&str, &Task> =
            tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        let mut keep = FxHashSet::default();
        for task in &incomplete {
            if task.name.to_lowercase().contains(&needle) {
                keep.insert(task.id.as_str());
                let mut current = *task;
                while let Some(parent) = current
                    .parent_id
                    .as_deref()
                    .and_then(|pid| by_id.get(pid))
                {
                    if !parent.is_complete() {
                        keep.insert(parent.id.as_str());
                    }
                    current = parent;
                }
            }
        }
        incomplete
            .iter()
            .filter(|t| keep.contains(t.id.as_str()))
            .map(|t| (*t).clone())
            .collect()
    };

    let mut sorted = visible;
    sorted.sort_by(compare_for_dashboard);
    sorted
}

/// Roots of the visible set: tasks with no parent, or whose parent is not
/// itself visible.
#[must_use]
pub fn visible_roots(visible: &[Task]) -> Vec<&Task> {
    let ids: FxHashSet<&str> = visible.iter().map(|t| t.id.as_str()).collect();
    visible
        .iter()
        .filter(|t| match t.parent_id.as_deref() {
            Some(pid) => !ids.contains(pid),
            None => true,
        })
        .collect()
}

/// Direct children of `parent_id` within the visible set, in view order.
#[must_use]
pub fn children_of<'a>(visible: &'a [Task], parent_id: &str) -> Vec<&'a Task> {
    visible
        .iter()
        .filter(|t| t.parent_id.as_deref() == Some(parent_id))
        .collect()
}

/// Priority high-first, then start date ascending (dated before undated),
/// then end date the same way.
fn compare_for_dashboard(a: &Task, b: &Task) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| compare_dates(a.start_date, b.start_date))
        .then_with(|| compare_dates(a.end_date, b.end_date))
}

fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// CRUD over `tasks.json`.
#[derive(Debug, Clone)]
pub struct TaskStore {
    files: JsonFileStore,
}

impl TaskStore {
    #[must_use]
    pub fn new(files: JsonFileStore) -> Self {
        Self { files }
    }

    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        self.files.load(TASKS_FILE)
    }

    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.files.save(TASKS_FILE, tasks)
    }

    /// Insert or replace a task by id, then persist the whole list.
    pub fn upsert(&self, task: Task) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.load()?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
        self.save(&tasks)?;
        Ok(tasks)
    }

    /// Remove a task by id and persist. Children keep their `parentId` and
    /// surface as roots in the dashboard view.
    pub fn remove(&self, id: &str) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.load()?;
        tasks.retain(|t| t.id != id);
        self.save(&tasks)?;
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Priority, Task, TaskKind, TaskStore, descendant_ids, incomplete_view, is_valid_parent,
        set_progress, visible_roots,
    };
    use crate::json::JsonFileStore;
    use chrono::NaiveDate;

    fn date(s: &str) -> Option<NaiveDate> {
        Some(s.parse().unwrap())
    }

    fn task(id: &str, name: &str) -> Task {
        Task::new(id, name)
    }

    fn child(id: &str, name: &str, parent: &str) -> Task {
        let mut t = Task::new(id, name);
        t.parent_id = Some(parent.into());
        t
    }

    #[test]
    fn camel_case_round_trip() {
        let mut t = task("task-1", "Ship parser");
        t.parent_id = Some("task-0".into());
        t.kind = TaskKind::Code;
        t.priority = Priority::High;
        t.start_date = date("2026-03-01");
        t.progress = 40;

        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains(r#""parentId":"task-0""#));
        assert!(json.contains(r#""type":"code""#));
        assert!(json.contains(r#""priority":"high""#));
        assert!(json.contains(r#""startDate":"2026-03-01""#));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn empty_string_dates_deserialize_as_none() {
        let json = r#"{"id":"t","name":"n","startDate":"","endDate":""}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.start_date, None);
        assert_eq!(t.end_date, None);
    }

    #[test]
    fn view_sorts_by_priority_then_dates() {
        let mut low = task("low", "low");
        low.priority = Priority::Low;
        let mut high_late = task("high-late", "high late");
        high_late.priority = Priority::High;
        high_late.start_date = date("2026-06-01");
        let mut high_early = task("high-early", "high early");
        high_early.priority = Priority::High;
        high_early.start_date = date("2026-01-01");
        let mut high_undated = task("high-undated", "high undated");
        high_undated.priority = Priority::High;

        let view = incomplete_view(&[low, high_late, high_early, high_undated], "");
        let order: Vec<&str> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, ["high-early", "high-late", "high-undated", "low"]);
    }

    #[test]
    fn view_drops_complete_tasks() {
        let mut done = task("done", "done");
        done.progress = 100;
        let open = task("open", "open");

        let view = incomplete_view(&[done, open], "");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "open");
    }

    #[test]
    fn filter_keeps_incomplete_ancestors_of_matches() {
        let root = task("root", "project alpha");
        let mid = child("mid", "backend", "root");
        let leaf = child("leaf", "fix login bug", "mid");
        let other = task("other", "unrelated");

        let view = incomplete_view(&[root, mid, leaf, other], "login");
        let ids: Vec<&str> = view.iter().map(|t| t.id.as_str()).collect();
        assert!(ids.contains(&"leaf"));
        assert!(ids.contains(&"mid"));
        assert!(ids.contains(&"root"));
        assert!(!ids.contains(&"other"));
    }

    #[test]
    fn filter_skips_completed_ancestors() {
        let mut root = task("root", "project");
        root.progress = 100;
        let leaf = child("leaf", "login fix", "root");

        let view = incomplete_view(&[root, leaf], "login");
        let ids: Vec<&str> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["leaf"]);
        // The orphaned child becomes a visible root.
        let roots = visible_roots(&view);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, "leaf");
    }

    #[test]
    fn descendants_span_the_whole_subtree() {
        let tasks = [
            task("a", "a"),
            child("b", "b", "a"),
            child("c", "c", "b"),
            task("d", "d"),
        ];
        let ids = descendant_ids(&tasks, "a");
        assert!(ids.contains("b"));
        assert!(ids.contains("c"));
        assert!(!ids.contains("d"));
        assert!(!ids.contains("a"));
    }

    #[test]
    fn reparenting_into_own_subtree_is_rejected() {
        let tasks = [task("a", "a"), child("b", "b", "a"), child("c", "c", "b")];
        assert!(!is_valid_parent(&tasks, "a", "a"));
        assert!(!is_valid_parent(&tasks, "a", "c"));
        assert!(is_valid_parent(&tasks, "c", "a"));
    }

    #[test]
    fn completing_last_child_completes_parent() {
        let mut tasks = vec![
            task("parent", "parent"),
            child("one", "one", "parent"),
            child("two", "two", "parent"),
        ];
        set_progress(&mut tasks, "one", 100);
        assert_eq!(tasks[0].progress, 0);

        set_progress(&mut tasks, "two", 100);
        assert_eq!(tasks[0].progress, 100);
    }

    #[test]
    fn progress_saturates_at_one_hundred() {
        let mut tasks = vec![task("a", "a")];
        set_progress(&mut tasks, "a", 250);
        assert_eq!(tasks[0].progress, 100);
    }

    #[test]
    fn store_upsert_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(JsonFileStore::new(dir.path()));

        store.upsert(task("a", "first")).unwrap();
        store.upsert(task("b", "second")).unwrap();
        let mut renamed = task("a", "first renamed");
        renamed.priority = Priority::High;
        let tasks = store.upsert(renamed).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "first renamed");

        let tasks = store.remove("b").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(store.load().unwrap(), tasks);
    }
}
