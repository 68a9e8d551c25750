// src/board.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::task::{Task, TaskStatus};

/// Longest date range the history view will aggregate.
pub const MAX_HISTORY_DAYS: i64 = 366;
/// Length of the default history window ending today.
pub const DEFAULT_HISTORY_DAYS: i64 = 10;
/// Window used for profile statistics.
pub const STATS_WINDOW_DAYS: i64 = 30;

/// One date's tasks split into the three columns, newest first.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub completed: Vec<Task>,
}

impl Board {
    /// Partition tasks into columns. Input order breaks ties between tasks
    /// created at the same instant.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Board::default();
        for task in tasks {
            board.column_mut(task.status).push(task);
        }
        for status in TaskStatus::ALL {
            board
                .column_mut(status)
                .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        board
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.completed.len()
    }

    pub fn productivity(&self) -> u32 {
        productivity(self.completed.len(), self.total())
    }
}

/// Share of completed tasks as a whole percentage, 0 for an empty day.
pub fn productivity(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHistory {
    pub date: NaiveDate,
    pub day_name: String,
    pub day_number: u32,
    pub month: String,
    #[serde(flatten)]
    pub board: Board,
    pub total_tasks: usize,
    pub completed_count: usize,
    pub leftover_count: usize,
    pub productivity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_completed: usize,
    pub total_leftover: usize,
    pub average_productivity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    pub days: Vec<DayHistory>,
    pub summary: HistorySummary,
}

/// Inclusive calendar range for the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::Validation(
                "Start date must not be after end date".to_string(),
            ));
        }
        if (end - start).num_days() >= MAX_HISTORY_DAYS {
            return Err(AppError::Validation(format!(
                "Date range must not exceed {} days",
                MAX_HISTORY_DAYS
            )));
        }
        Ok(DateRange { start, end })
    }

    /// The last `DEFAULT_HISTORY_DAYS` days ending on `today`.
    pub fn recent(today: NaiveDate) -> Self {
        DateRange {
            start: today - Duration::days(DEFAULT_HISTORY_DAYS - 1),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Aggregate tasks into one entry per day of `range`, empty days included.
/// Tasks outside the range are ignored.
pub fn history(tasks: Vec<Task>, range: DateRange) -> History {
    let mut by_day: Vec<(NaiveDate, Vec<Task>)> = range.days().map(|d| (d, Vec::new())).collect();
    for task in tasks {
        if !range.contains(task.date) {
            continue;
        }
        let index = (task.date - range.start).num_days() as usize;
        by_day[index].1.push(task);
    }

    let days: Vec<DayHistory> = by_day
        .into_iter()
        .map(|(date, tasks)| {
            let board = Board::from_tasks(tasks);
            let total_tasks = board.total();
            let completed_count = board.completed.len();
            DayHistory {
                date,
                day_name: date.format("%a").to_string(),
                day_number: date.day(),
                month: date.format("%b").to_string(),
                total_tasks,
                completed_count,
                leftover_count: total_tasks - completed_count,
                productivity: board.productivity(),
                board,
            }
        })
        .collect();

    let average_productivity = if days.is_empty() {
        0
    } else {
        let sum: u32 = days.iter().map(|d| d.productivity).sum();
        (sum as f64 / days.len() as f64).round() as u32
    };

    let summary = HistorySummary {
        total_completed: days.iter().map(|d| d.completed_count).sum(),
        total_leftover: days.iter().map(|d| d.leftover_count).sum(),
        average_productivity,
    };

    History { days, summary }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub productivity: u32,
}

/// Statistics over tasks created within `STATS_WINDOW_DAYS` of `now`.
pub fn stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    let since = now - Duration::days(STATS_WINDOW_DAYS);
    let recent: Vec<&Task> = tasks.iter().filter(|t| t.created_at >= since).collect();
    let completed = recent
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    TaskStats {
        total_tasks: recent.len(),
        completed_tasks: completed,
        productivity: productivity(completed, recent.len()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pagination {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 50;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Order tasks by date then creation time, newest first, and cut out one page.
pub fn paginate(mut tasks: Vec<Task>, page: u64, limit: u64) -> (Vec<Task>, Pagination) {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    tasks.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    let total = tasks.len() as u64;
    let pages = total.div_ceil(limit);
    let offset = usize::try_from((page - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
    let items = tasks
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .collect();
    (items, Pagination { current: page, pages, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn task(date: NaiveDate, status: TaskStatus, created_offset_secs: i64) -> Task {
        let mut t = Task::new(
            "owner",
            NewTask {
                title: format!("task {}", created_offset_secs),
                description: String::new(),
                status,
                date,
                priority: Default::default(),
                tags: vec![],
            },
        );
        let base = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        t.created_at = base + Duration::seconds(created_offset_secs);
        t.updated_at = t.created_at;
        t
    }

    #[test]
    fn board_partitions_newest_first() {
        let board = Board::from_tasks(vec![
            task(day(1), TaskStatus::Todo, 1),
            task(day(1), TaskStatus::Completed, 2),
            task(day(1), TaskStatus::Todo, 3),
            task(day(1), TaskStatus::InProgress, 4),
        ]);
        assert_eq!(board.todo.len(), 2);
        assert_eq!(board.todo[0].title, "task 3");
        assert_eq!(board.todo[1].title, "task 1");
        assert_eq!(board.in_progress[0].title, "task 4");
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.total(), 4);
    }

    #[test]
    fn board_serializes_with_column_names() {
        let value = serde_json::to_value(Board::default()).unwrap();
        assert!(value.get("todo").is_some());
        assert!(value.get("inProgress").is_some());
        assert!(value.get("completed").is_some());
    }

    #[test]
    fn productivity_rounds_and_handles_empty() {
        assert_eq!(productivity(0, 0), 0);
        assert_eq!(productivity(2, 2), 100);
        assert_eq!(productivity(1, 4), 25);
        assert_eq!(productivity(1, 3), 33);
        assert_eq!(productivity(2, 3), 67);
    }

    #[test]
    fn history_over_three_days() {
        let tasks = vec![
            task(day(1), TaskStatus::Completed, 1),
            task(day(1), TaskStatus::Completed, 2),
            task(day(3), TaskStatus::Completed, 3),
            task(day(3), TaskStatus::Todo, 4),
            task(day(3), TaskStatus::InProgress, 5),
            task(day(3), TaskStatus::Todo, 6),
            // outside the window
            task(day(9), TaskStatus::Completed, 7),
        ];
        let range = DateRange::new(day(1), day(3)).unwrap();
        let history = history(tasks, range);

        let productivities: Vec<u32> = history.days.iter().map(|d| d.productivity).collect();
        assert_eq!(productivities, vec![100, 0, 25]);
        assert_eq!(history.days[1].total_tasks, 0);
        assert_eq!(history.days[2].leftover_count, 3);
        assert_eq!(history.summary.total_completed, 3);
        assert_eq!(history.summary.total_leftover, 3);
        assert_eq!(history.summary.average_productivity, 42);
    }

    #[test]
    fn history_day_labels() {
        let history = history(vec![], DateRange::new(day(6), day(6)).unwrap());
        let d = &history.days[0];
        assert_eq!(d.day_name, "Mon");
        assert_eq!(d.day_number, 6);
        assert_eq!(d.month, "May");
    }

    #[test]
    fn date_range_validation() {
        assert!(DateRange::new(day(3), day(1)).is_err());
        assert!(DateRange::new(day(1), day(1)).is_ok());
        let far = day(1) + Duration::days(MAX_HISTORY_DAYS);
        assert!(DateRange::new(day(1), far).is_err());

        let recent = DateRange::recent(day(20));
        assert_eq!(recent.start, day(11));
        assert_eq!(recent.days().count(), 10);
        assert_eq!(recent.days().last(), Some(day(20)));
    }

    #[test]
    fn stats_only_count_recent_tasks() {
        let mut old = task(day(1), TaskStatus::Completed, 0);
        let now = old.created_at + Duration::days(40);
        old.created_at = now - Duration::days(31);
        let mut fresh_done = task(day(1), TaskStatus::Completed, 0);
        fresh_done.created_at = now - Duration::days(1);
        let mut fresh_todo = task(day(1), TaskStatus::Todo, 0);
        fresh_todo.created_at = now - Duration::days(2);

        let s = stats(&[old, fresh_done, fresh_todo], now);
        assert_eq!(s.total_tasks, 2);
        assert_eq!(s.completed_tasks, 1);
        assert_eq!(s.productivity, 50);
    }

    #[test]
    fn pagination_orders_by_date_then_creation() {
        let tasks = vec![
            task(day(1), TaskStatus::Todo, 1),
            task(day(2), TaskStatus::Todo, 2),
            task(day(2), TaskStatus::Todo, 3),
        ];
        let (first, meta) = paginate(tasks.clone(), 1, 2);
        assert_eq!(meta, Pagination { current: 1, pages: 2, total: 3 });
        assert_eq!(first[0].title, "task 3");
        assert_eq!(first[1].title, "task 2");

        let (second, _) = paginate(tasks, 2, 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "task 1");
    }

    #[test]
    fn huge_page_numbers_are_empty() {
        let tasks = vec![task(day(1), TaskStatus::Todo, 1)];
        let (items, meta) = paginate(tasks, u64::MAX, MAX_PAGE_LIMIT);
        assert!(items.is_empty());
        assert_eq!(meta.current, u64::MAX);
        assert_eq!(meta.total, 1);
    }
}
