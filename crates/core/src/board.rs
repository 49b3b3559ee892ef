//! Board filter/sort engine and drag-and-drop rules for the unified task board.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::project_workflow::{ProjectStatus, WorkflowError};
use crate::task_catalog::{Task, TaskType};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Multi-select filter. Values inside one dimension are OR'd, dimensions are
/// AND'd, and an empty dimension places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoardFilter {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub efforts: Vec<String>,
    #[serde(default)]
    pub types: Vec<TaskType>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

impl BoardFilter {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.efforts.is_empty()
            && self.types.is_empty()
            && self.statuses.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        let view = task.view();

        if !self.categories.is_empty() && !self.categories.iter().any(|c| c == view.category()) {
            return false;
        }
        if !self.efforts.is_empty()
            && !view
                .effort()
                .is_some_and(|effort| self.efforts.iter().any(|e| e == effort))
        {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&task.task_type()) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.iter().any(|s| s == view.status_key()) {
            return false;
        }
        true
    }
}

pub fn filter(tasks: Vec<Task>, criteria: &BoardFilter) -> Vec<Task> {
    if criteria.is_empty() {
        return tasks;
    }
    tasks.into_iter().filter(|t| criteria.matches(t)).collect()
}

/// Distinct values offered in the board's filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub efforts: Vec<String>,
    pub assignees: Vec<String>,
}

pub fn filter_options(tasks: &[Task]) -> FilterOptions {
    let mut categories = BTreeSet::new();
    let mut efforts = BTreeSet::new();
    let mut assignees = BTreeSet::new();

    for task in tasks {
        let view = task.view();
        categories.insert(view.category().to_string());
        if let Some(effort) = view.effort() {
            efforts.insert(effort.to_string());
        }
        if let Some(assignee) = task.as_project().and_then(|p| p.assigned_to.as_deref()) {
            assignees.insert(assignee.to_string());
        }
    }

    FilterOptions {
        categories: categories.into_iter().collect(),
        efforts: efforts.into_iter().collect(),
        assignees: assignees.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Title,
    Category,
    TaskType,
    Status,
    CreditValue,
}

impl FromStr for SortField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "category" => Ok(SortField::Category),
            "task_type" => Ok(SortField::TaskType),
            "status" => Ok(SortField::Status),
            "credit_value" => Ok(SortField::CreditValue),
            other => Err(CoreError::Validation(format!(
                "Invalid sort field '{other}'. Must be one of: title, category, task_type, status, credit_value"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(CoreError::Validation(format!(
                "Invalid sort order '{other}'. Must be one of: asc, desc"
            ))),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Compare two tasks on one field, ascending.
///
/// Text compares case-insensitively. A missing credit value sorts before
/// any present one.
pub fn compare(a: &Task, b: &Task, field: SortField) -> Ordering {
    let (va, vb) = (a.view(), b.view());
    match field {
        SortField::Title => compare_text(va.title(), vb.title()),
        SortField::Category => compare_text(va.category(), vb.category()),
        SortField::TaskType => a.task_type().as_str().cmp(b.task_type().as_str()),
        SortField::Status => compare_text(va.status_key(), vb.status_key()),
        SortField::CreditValue => va.credit_value().cmp(&vb.credit_value()),
    }
}

/// Stable sort on a single field. Descending order reverses the comparator,
/// so equal elements keep their relative order in both directions.
pub fn sort(mut tasks: Vec<Task>, field: SortField, order: SortOrder) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    tasks
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// The column a task is shown in, if any.
///
/// Recurring chores only surface in `open`, and only when they need
/// attention.
pub fn column_for(task: &Task) -> Option<ProjectStatus> {
    match task {
        Task::Recurring(card) => card.due_status.needs_attention().then_some(ProjectStatus::Open),
        Task::Project(card) => Some(card.status),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardColumns {
    pub open: Vec<Task>,
    pub next: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl BoardColumns {
    pub fn column(&self, status: ProjectStatus) -> &[Task] {
        match status {
            ProjectStatus::Open => &self.open,
            ProjectStatus::Next => &self.next,
            ProjectStatus::InProgress => &self.in_progress,
            ProjectStatus::Done => &self.done,
        }
    }

    fn column_mut(&mut self, status: ProjectStatus) -> &mut Vec<Task> {
        match status {
            ProjectStatus::Open => &mut self.open,
            ProjectStatus::Next => &mut self.next,
            ProjectStatus::InProgress => &mut self.in_progress,
            ProjectStatus::Done => &mut self.done,
        }
    }
}

pub fn group_into_columns(tasks: Vec<Task>) -> BoardColumns {
    let mut columns = BoardColumns::default();
    for task in tasks {
        if let Some(status) = column_for(&task) {
            columns.column_mut(status).push(task);
        }
    }
    columns
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Recurring chores are not draggable; nothing happens.
    Ignored,
    /// Dropped onto the column it already sits in.
    Unchanged,
    Move {
        project_id: DbId,
        from: ProjectStatus,
        to: ProjectStatus,
    },
    /// `done` is reached through the completion action, not by dragging.
    CompletionRequired { project_id: DbId },
}

/// Decide what dropping `task` onto the `target` column does.
///
/// Authorization is checked separately when a move is applied.
pub fn drop_on_column(task: &Task, target: ProjectStatus) -> Result<DropOutcome, WorkflowError> {
    let card = match task {
        Task::Recurring(_) => return Ok(DropOutcome::Ignored),
        Task::Project(card) => card,
    };

    if card.status == target {
        return Ok(DropOutcome::Unchanged);
    }
    match (card.status, target) {
        (ProjectStatus::InProgress, ProjectStatus::Done) => {
            Ok(DropOutcome::CompletionRequired { project_id: card.id })
        }
        (from, to) if from.is_reorderable() && to.is_reorderable() => Ok(DropOutcome::Move {
            project_id: card.id,
            from,
            to,
        }),
        (from, to) => Err(WorkflowError::InvalidTransition {
            from: from.as_str(),
            to: to.as_str(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_catalog::fixtures::{chore, project};
    use crate::task_catalog::{normalize, RecurringSource};
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn sample() -> Vec<Task> {
        let now = Utc::now();
        let mut mowing = chore(1, "Mow lawn", "rasen", 14);
        mowing.effort = Some("medium".into());
        mowing.last_completed_at = Some(now - Duration::days(11));
        let mut hedge = chore(2, "cut hedge", "baeume", 30);
        hedge.effort = Some("heavy".into());
        hedge.last_completed_at = Some(now - Duration::days(2));
        let wood: RecurringSource = chore(3, "Stack firewood", "brennholz", 60);

        let mut fence = project(1, "Fence repair", "garten", ProjectStatus::Open);
        fence.effort = Some("heavy".into());
        fence.credit_value = Some(4_000);
        fence.assigned_to = Some("anna@example.com".into());
        let shed = project(2, "Paint shed", "haus", ProjectStatus::InProgress);
        let mut roof = project(3, "roof gutter", "haus", ProjectStatus::Done);
        roof.credit_value = Some(1_000);

        normalize(vec![mowing, hedge, wood], vec![fence, shed, roof], now)
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.view().title()).collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let tasks = sample();
        assert_eq!(filter(tasks.clone(), &BoardFilter::default()), tasks);
    }

    #[test]
    fn empty_dimension_does_not_match_nothing() {
        let tasks = sample();
        let only_types = BoardFilter {
            types: vec![TaskType::Recurring, TaskType::Project],
            ..Default::default()
        };
        assert_eq!(filter(tasks.clone(), &only_types).len(), tasks.len());
    }

    #[test]
    fn filtering_to_present_categories_is_identity() {
        let tasks = sample();
        let criteria = BoardFilter {
            categories: filter_options(&tasks).categories,
            ..Default::default()
        };
        assert_eq!(filter(tasks.clone(), &criteria), tasks);
    }

    #[test]
    fn filtering_to_absent_category_is_empty() {
        let criteria = BoardFilter {
            categories: vec!["elektrik".into()],
            ..Default::default()
        };
        assert!(filter(sample(), &criteria).is_empty());
    }

    #[test]
    fn dimensions_or_within_and_across() {
        let criteria = BoardFilter {
            categories: vec!["haus".into(), "rasen".into()],
            types: vec![TaskType::Project],
            ..Default::default()
        };
        assert_eq!(titles(&filter(sample(), &criteria)), vec!["Paint shed", "roof gutter"]);
    }

    #[test]
    fn effort_filter_excludes_tasks_without_effort() {
        let criteria = BoardFilter {
            efforts: vec!["heavy".into()],
            ..Default::default()
        };
        let result = filter(sample(), &criteria);
        assert_eq!(titles(&result), vec!["cut hedge", "Fence repair"]);
        assert!(!titles(&result).contains(&"Stack firewood"));
        assert!(!titles(&result).contains(&"Paint shed"));
    }

    #[test]
    fn empty_effort_filter_keeps_tasks_without_effort() {
        let result = filter(sample(), &BoardFilter::default());
        assert!(titles(&result).contains(&"Stack firewood"));
        assert!(titles(&result).contains(&"Paint shed"));
    }

    #[test]
    fn status_filter_uses_per_kind_status() {
        let criteria = BoardFilter {
            statuses: vec!["overdue".into(), "done".into()],
            ..Default::default()
        };
        assert_eq!(titles(&filter(sample(), &criteria)), vec!["Stack firewood", "roof gutter"]);
    }

    #[test]
    fn sort_by_title_is_case_insensitive() {
        let sorted = sort(sample(), SortField::Title, SortOrder::Asc);
        assert_eq!(
            titles(&sorted),
            vec!["cut hedge", "Fence repair", "Mow lawn", "Paint shed", "roof gutter", "Stack firewood"]
        );
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        for field in [
            SortField::Title,
            SortField::Category,
            SortField::TaskType,
            SortField::Status,
            SortField::CreditValue,
        ] {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let once = sort(sample(), field, order);
                let twice = sort(once.clone(), field, order);
                assert_eq!(once, twice, "{field:?} {order:?}");
            }
        }
    }

    #[test]
    fn descending_keeps_ties_in_input_order() {
        let sorted = sort(sample(), SortField::Category, SortOrder::Desc);
        // Both "haus" projects tie and keep their input order.
        let haus: Vec<&str> = sorted
            .iter()
            .filter(|t| t.view().category() == "haus")
            .map(|t| t.view().title())
            .collect();
        assert_eq!(haus, vec!["Paint shed", "roof gutter"]);
        assert_eq!(sorted[0].view().category(), "rasen");
    }

    #[test]
    fn status_sort_compares_mixed_kinds_lexically() {
        let sorted = sort(sample(), SortField::Status, SortOrder::Asc);
        let keys: Vec<&str> = sorted.iter().map(|t| t.view().status_key()).collect();
        assert_eq!(keys, vec!["done", "due-soon", "in_progress", "ok", "open", "overdue"]);
    }

    #[test]
    fn credit_sort_puts_missing_values_first() {
        let sorted = sort(sample(), SortField::CreditValue, SortOrder::Asc);
        assert_eq!(sorted.first().map(|t| t.view().title()), Some("Paint shed"));
        assert_eq!(sorted.last().map(|t| t.view().title()), Some("Fence repair"));
    }

    #[test]
    fn filter_options_are_distinct_and_sorted() {
        let options = filter_options(&sample());
        assert_eq!(options.categories, vec!["baeume", "brennholz", "garten", "haus", "rasen"]);
        assert_eq!(options.efforts, vec!["heavy", "medium"]);
        assert_eq!(options.assignees, vec!["anna@example.com"]);
    }

    #[test]
    fn columns_show_chores_only_when_they_need_attention() {
        let columns = group_into_columns(sample());
        assert_eq!(titles(&columns.open), vec!["Mow lawn", "Stack firewood", "Fence repair"]);
        assert!(columns.next.is_empty());
        assert_eq!(titles(columns.column(ProjectStatus::InProgress)), vec!["Paint shed"]);
        assert_eq!(titles(&columns.done), vec!["roof gutter"]);
    }

    #[test]
    fn dragging_a_recurring_task_is_a_no_op() {
        let tasks = sample();
        for target in ProjectStatus::ALL {
            assert_eq!(drop_on_column(&tasks[0], target), Ok(DropOutcome::Ignored));
        }
    }

    #[test]
    fn dragging_a_project_between_open_columns_moves_it() {
        let tasks = sample();
        let fence = &tasks[3];
        assert_eq!(
            drop_on_column(fence, ProjectStatus::Next),
            Ok(DropOutcome::Move {
                project_id: 1,
                from: ProjectStatus::Open,
                to: ProjectStatus::Next
            })
        );
        assert_eq!(drop_on_column(fence, ProjectStatus::Open), Ok(DropOutcome::Unchanged));
    }

    #[test]
    fn dragging_into_done_requires_completion() {
        let tasks = sample();
        assert_eq!(
            drop_on_column(&tasks[4], ProjectStatus::Done),
            Ok(DropOutcome::CompletionRequired { project_id: 2 })
        );
        assert_matches!(
            drop_on_column(&tasks[3], ProjectStatus::Done),
            Err(WorkflowError::InvalidTransition { from: "open", to: "done" })
        );
        assert_matches!(
            drop_on_column(&tasks[5], ProjectStatus::Open),
            Err(WorkflowError::InvalidTransition { from: "done", .. })
        );
    }

    #[test]
    fn sort_params_parse() {
        assert_eq!("credit_value".parse::<SortField>().unwrap(), SortField::CreditValue);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("priority".parse::<SortField>().is_err());
    }
}
