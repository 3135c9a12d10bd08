//! Daily completion grid, streak and aggregate progress.

use crate::types::{Category, Day, Task, Week, DAYS_PER_WEEK};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion threshold at which a week counts as completed.
pub const WEEK_COMPLETE_RATIO: f64 = 0.5;

pub type DayGrid = [bool; DAYS_PER_WEEK];

/// Task id to its Mon..Sun cells for one week.
pub type WeekGrid = BTreeMap<String, DayGrid>;

// ---------------------------------------------------------------------------
// ProgressRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default = "default_current_week")]
    pub current_week: u32,
    #[serde(default)]
    pub daily: BTreeMap<u32, WeekGrid>,
}

fn default_current_week() -> u32 {
    1
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_week: default_current_week(),
            daily: BTreeMap::new(),
        }
    }
}

impl ProgressRecord {
    pub fn week(&self, number: u32) -> Option<&WeekGrid> {
        self.daily.get(&number)
    }

    pub fn cell(&self, week: u32, task_id: &str, day: Day) -> bool {
        self.daily
            .get(&week)
            .and_then(|g| g.get(task_id))
            .is_some_and(|cells| cells[day.index()])
    }

    /// Flip one cell and return its new value.
    pub fn toggle(&mut self, week: u32, task_id: &str, day: Day) -> bool {
        let cells = self
            .daily
            .entry(week)
            .or_default()
            .entry(task_id.to_string())
            .or_insert([false; DAYS_PER_WEEK]);
        cells[day.index()] = !cells[day.index()];
        cells[day.index()]
    }
}

// ---------------------------------------------------------------------------
// Streak
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub last_activity: Option<NaiveDate>,
}

impl StreakRecord {
    /// Record activity on `today`. Counts once per calendar day.
    pub fn record_activity(&mut self, today: NaiveDate) -> bool {
        if self.last_activity == Some(today) {
            return false;
        }
        self.count += 1;
        self.last_activity = Some(today);
        true
    }

    /// Reset the counter when more than one day has passed since the last
    /// activity. Returns whether the record changed.
    pub fn expire(&mut self, today: NaiveDate) -> bool {
        match self.last_activity {
            Some(last) if (today - last).num_days() > 1 && self.count != 0 => {
                self.count = 0;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellCount {
    pub completed: usize,
    pub total: usize,
}

impl CellCount {
    pub fn ratio(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Whole-number percentage, rounded.
    pub fn percent(self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}

impl std::ops::Add for CellCount {
    type Output = CellCount;

    fn add(self, rhs: CellCount) -> CellCount {
        CellCount {
            completed: self.completed + rhs.completed,
            total: self.total + rhs.total,
        }
    }
}

impl std::iter::Sum for CellCount {
    fn sum<I: Iterator<Item = CellCount>>(iter: I) -> CellCount {
        iter.fold(CellCount::default(), |a, b| a + b)
    }
}

/// Completed cells for `tasks` out of 7 per task.
pub fn count_cells<'a>(tasks: impl IntoIterator<Item = &'a Task>, grid: Option<&WeekGrid>) -> CellCount {
    tasks
        .into_iter()
        .map(|task| CellCount {
            completed: grid
                .and_then(|g| g.get(&task.id))
                .map_or(0, |cells| cells.iter().filter(|c| **c).count()),
            total: DAYS_PER_WEEK,
        })
        .sum()
}

pub fn week_cells(week: &Week, grid: Option<&WeekGrid>) -> CellCount {
    count_cells(week.all_tasks(), grid)
}

pub fn is_week_completed(week: &Week, grid: Option<&WeekGrid>) -> bool {
    let count = week_cells(week, grid);
    count.total > 0 && count.ratio() >= WEEK_COMPLETE_RATIO
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryProgress {
    pub category: Category,
    pub label: &'static str,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

pub fn category_progress(week: &Week, grid: Option<&WeekGrid>) -> Vec<CategoryProgress> {
    Category::all()
        .iter()
        .map(|&category| {
            let count = count_cells(week.tasks(category), grid);
            CategoryProgress {
                category,
                label: category.label(),
                completed: count.completed,
                total: count.total,
                percent: count.percent(),
            }
        })
        .collect()
}

/// Count of completed cells for one task row.
pub fn task_days_done(grid: Option<&WeekGrid>, task_id: &str) -> usize {
    grid.and_then(|g| g.get(task_id))
        .map_or(0, |cells| cells.iter().filter(|c| **c).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn week_with(tasks: Vec<Task>) -> Week {
        Week {
            week_number: 1,
            start_date: String::new(),
            end_date: String::new(),
            month: "March".into(),
            year: 2025,
            phase: "Foundations".into(),
            focus: String::new(),
            japanese: tasks,
            aiml: vec![],
            college: vec![],
            goals: vec![],
            milestone: None,
            resources: vec![],
        }
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut record = ProgressRecord::default();
        assert!(record.toggle(4, "w4-jp-1", Day::Wed));
        assert!(record.cell(4, "w4-jp-1", Day::Wed));
        assert!(!record.toggle(4, "w4-jp-1", Day::Wed));
        assert!(!record.cell(4, "w4-jp-1", Day::Wed));
        assert!(!record.cell(4, "w4-jp-1", Day::Thu));
    }

    #[test]
    fn streak_counts_once_per_day() {
        let mut streak = StreakRecord::default();
        assert!(streak.record_activity(day(1)));
        assert!(!streak.record_activity(day(1)));
        assert_eq!(streak.count, 1);
        assert!(streak.record_activity(day(2)));
        assert_eq!(streak.count, 2);
    }

    #[test]
    fn streak_expires_after_a_missed_day() {
        let mut streak = StreakRecord {
            count: 4,
            last_activity: Some(day(1)),
        };
        assert!(!streak.expire(day(2)));
        assert_eq!(streak.count, 4);
        assert!(streak.expire(day(3)));
        assert_eq!(streak.count, 0);
        assert_eq!(streak.last_activity, Some(day(1)));
    }

    #[test]
    fn half_done_week_is_completed() {
        let week = week_with(vec![Task::new("a", "A"), Task::new("b", "B")]);
        let mut record = ProgressRecord::default();
        for d in Day::all() {
            record.toggle(1, "a", *d);
        }
        let grid = record.week(1);
        let count = week_cells(&week, grid);
        assert_eq!(count, CellCount { completed: 7, total: 14 });
        assert_eq!(count.percent(), 50);
        assert!(is_week_completed(&week, grid));
    }

    #[test]
    fn empty_collection_is_zero() {
        let week = week_with(vec![]);
        assert_eq!(week_cells(&week, None).ratio(), 0.0);
        assert!(!is_week_completed(&week, None));
    }

    #[test]
    fn grid_cells_for_unknown_tasks_are_ignored() {
        let week = week_with(vec![Task::new("a", "A")]);
        let mut record = ProgressRecord::default();
        record.toggle(1, "gone", Day::Mon);
        assert_eq!(week_cells(&week, record.week(1)).completed, 0);
    }

    #[test]
    fn category_breakdown() {
        let week = week_with(vec![Task::new("a", "A")]);
        let mut record = ProgressRecord::default();
        record.toggle(1, "a", Day::Mon);
        let cats = category_progress(&week, record.week(1));
        assert_eq!(cats.len(), 4);
        assert_eq!(cats[0].completed, 1);
        assert_eq!(cats[0].total, 7);
        assert_eq!(cats[1].total, 0);
        assert_eq!(cats[1].percent, 0);
    }

    #[test]
    fn record_decodes_with_missing_fields() {
        let record: ProgressRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.current_week, 1);
        let streak: StreakRecord = serde_json::from_str("{\"count\":3}").unwrap();
        assert_eq!(streak.count, 3);
        assert!(streak.last_activity.is_none());
    }
}
