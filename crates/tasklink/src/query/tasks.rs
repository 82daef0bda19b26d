//! Task list queries

use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::prefs::{Prefs, TaskFilters};
use crate::todoist::TodoistClient;
use crate::todoist::api::{Label, Project, Section, Task};

/// Filter applied to the task list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    /// Case-insensitive substring of content or description
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub label: String,
}

impl TaskFilter {
    /// Check whether a task passes every non-empty criterion
    pub fn matches(&self, task: &Task) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || task.content.to_lowercase().contains(&search)
            || task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&search));

        let matches_project =
            self.project_id.is_empty() || task.project_id.as_deref() == Some(self.project_id.as_str());
        let matches_label = self.label.is_empty() || task.labels.iter().any(|l| *l == self.label);

        matches_search && matches_project && matches_label
    }

    /// The part of the filter that is persisted between sessions
    pub fn saved(&self) -> TaskFilters {
        TaskFilters {
            project_id: self.project_id.clone(),
            label: self.label.clone(),
        }
    }
}

impl From<TaskFilters> for TaskFilter {
    fn from(saved: TaskFilters) -> Self {
        Self {
            search: String::new(),
            project_id: saved.project_id,
            label: saved.label,
        }
    }
}

/// Human label for a due date relative to `today`
///
/// Returns `None` for dates more than a week out.
pub fn due_label(date: NaiveDate, today: NaiveDate) -> Option<String> {
    let days = (date - today).num_days();
    match days {
        d if d < 0 => Some("Overdue".to_string()),
        0 => Some("Today".to_string()),
        1 => Some("Tomorrow".to_string()),
        d if d <= 7 => Some(format!("Due in {} days", d)),
        _ => None,
    }
}

/// Due label for a task, if it has a parseable due date
pub fn task_due_label(task: &Task, today: NaiveDate) -> Option<String> {
    let raw = task.due.as_ref()?.date.as_deref()?;
    // Dates may carry a time component ("2026-10-20T09:00:00")
    let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
    due_label(date, today)
}

/// Sections belonging to a project, in display order
pub fn sections_for_project<'a>(sections: &'a [Section], project_id: &str) -> Vec<&'a Section> {
    let mut matching: Vec<&Section> = sections
        .iter()
        .filter(|s| s.project_id == project_id)
        .collect();
    matching.sort_by_key(|s| s.section_order.unwrap_or(i32::MAX));
    matching
}

/// A visible task with the details the picker shows next to it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub project_name: Option<&'a str>,
    pub due_label: Option<String>,
}

/// State behind one task picker view
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub labels: Vec<Label>,
    pub sections: Vec<Section>,
    pub filter: TaskFilter,
    pub selected_task_id: Option<String>,
}

impl TaskView {
    /// Tasks passing the current filter, in fetch order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    /// Select a task by id; returns it if it exists
    pub fn select_task(&mut self, task_id: &str) -> Option<&Task> {
        let task = self.tasks.iter().find(|t| t.id == task_id)?;
        self.selected_task_id = Some(task.id.clone());
        Some(task)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.selected_task_id.as_deref()?;
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project_name(&self, project_id: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.name.as_str())
    }

    /// Reset search, project and label
    pub fn clear_filter(&mut self) {
        self.filter = TaskFilter::default();
    }

    /// Visible tasks with project names and due labels relative to `today`
    pub fn summaries(&self, today: NaiveDate) -> Vec<TaskSummary<'_>> {
        self.visible_tasks()
            .into_iter()
            .map(|task| TaskSummary {
                task,
                project_name: task.project_id.as_deref().and_then(|p| self.project_name(p)),
                due_label: task_due_label(task, today),
            })
            .collect()
    }
}

/// Load tasks, projects and labels concurrently and restore saved filters
///
/// Each collection is fetched page by page; only the three collections run
/// side by side. Any failure fails the whole load.
pub fn load_task_view(client: &TodoistClient, prefs: &Prefs) -> Result<TaskView> {
    let (tasks, (projects, labels)) = rayon::join(
        || client.list_tasks(&[]),
        || rayon::join(|| client.list_projects(), || client.list_labels()),
    );

    let filter = match prefs.task_filters() {
        Ok(saved) => saved.map(TaskFilter::from).unwrap_or_default(),
        Err(e) => {
            warn!("Ignoring unreadable saved filters: {:#}", e);
            TaskFilter::default()
        }
    };

    let view = TaskView {
        tasks: tasks?,
        projects: projects?,
        labels: labels?,
        sections: Vec::new(),
        filter,
        selected_task_id: None,
    };
    debug!(
        "Loaded task view: {} tasks, {} projects, {} labels",
        view.tasks.len(),
        view.projects.len(),
        view.labels.len()
    );
    Ok(view)
}
