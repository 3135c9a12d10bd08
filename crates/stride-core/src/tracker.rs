//! The tracker facade: every user-visible operation over the store, the
//! curriculum and the clock.
//!
//! Each operation loads the records it needs, changes them and writes them
//! back. There is no cross-record transaction; concurrent writers to the
//! same record resolve as last-write-wins.

use crate::clock::Clock;
use crate::curriculum::{self, CurriculumSource, JourneyMilestone, PhaseGroup};
use crate::directive::{synthesize_task_id, Directive};
use crate::error::{Result, StrideError};
use crate::overlay::{self, OverlayRecord};
use crate::progress::{self, CategoryProgress, CellCount, ProgressRecord, StreakRecord, WeekGrid};
use crate::store::{keys, load_record, save_record, KvStore};
use crate::types::{Category, Day, Task, Theme, Week, WeekNotes};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

type NotesRecord = BTreeMap<u32, WeekNotes>;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub week: u32,
    pub task_id: String,
    pub day: Day,
    pub checked: bool,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AppliedDirective {
    Added { category: String, task: Task },
    Removed { task: Task },
    NoMatch { fragment: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekProgress {
    pub week: u32,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub is_completed: bool,
    pub categories: Vec<CategoryProgress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub current_week: u32,
    pub total_weeks: u32,
    pub week_percent: u32,
    pub month: String,
    pub year: i32,
    pub month_percent: u32,
    pub overall_percent: u32,
    pub weeks_completed: u32,
    pub streak: u32,
    pub categories: Vec<CategoryProgress>,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Tracker {
    store: Arc<dyn KvStore>,
    curriculum: Arc<dyn CurriculumSource>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    pub fn new(
        store: Arc<dyn KvStore>,
        curriculum: Arc<dyn CurriculumSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if curriculum.is_empty() {
            return Err(StrideError::EmptyCurriculum);
        }
        Ok(Self {
            store,
            curriculum,
            clock,
        })
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn curriculum(&self) -> &dyn CurriculumSource {
        self.curriculum.as_ref()
    }

    pub fn total_weeks(&self) -> u32 {
        self.curriculum.len()
    }

    fn clamp(&self, week: u32) -> u32 {
        week.clamp(1, self.total_weeks())
    }

    // -- navigation ----------------------------------------------------------

    pub fn current_week(&self) -> Result<u32> {
        let record: ProgressRecord = load_record(self.store.as_ref(), keys::PROGRESS)?;
        Ok(self.clamp(record.current_week))
    }

    /// Set the selected week, clamped to the curriculum. Returns the week
    /// actually selected.
    pub fn set_current_week(&self, week: u32) -> Result<u32> {
        let week = self.clamp(week);
        let mut record: ProgressRecord = load_record(self.store.as_ref(), keys::PROGRESS)?;
        if record.current_week != week {
            record.current_week = week;
            save_record(self.store.as_ref(), keys::PROGRESS, &record)?;
        }
        Ok(week)
    }

    pub fn next_week(&self) -> Result<u32> {
        let current = self.current_week()?;
        self.set_current_week(current.saturating_add(1))
    }

    pub fn previous_week(&self) -> Result<u32> {
        let current = self.current_week()?;
        self.set_current_week(current.saturating_sub(1))
    }

    // -- weeks ---------------------------------------------------------------

    pub fn base_week(&self, week: u32) -> Result<&Week> {
        self.curriculum
            .week(week)
            .ok_or(StrideError::WeekNotFound(week))
    }

    /// The week as displayed: base tasks minus removals plus custom tasks.
    pub fn resolved_week(&self, week: u32) -> Result<Week> {
        let base = self.base_week(week)?;
        let overlays: OverlayRecord = load_record(self.store.as_ref(), keys::OVERLAY)?;
        Ok(overlay::resolve(base, overlays.week(week)))
    }

    pub fn search(&self, query: &str) -> Vec<PhaseGroup> {
        curriculum::search(self.curriculum.as_ref(), query)
    }

    pub fn milestones(&self) -> Result<Vec<JourneyMilestone>> {
        Ok(curriculum::journey_milestones(self.current_week()?))
    }

    // -- daily grid ----------------------------------------------------------

    pub fn daily(&self, week: u32) -> Result<WeekGrid> {
        self.base_week(week)?;
        let record: ProgressRecord = load_record(self.store.as_ref(), keys::PROGRESS)?;
        Ok(record.week(week).cloned().unwrap_or_default())
    }

    /// Flip one cell. Checking a cell counts as activity for the streak.
    pub fn toggle(&self, week: u32, task_id: &str, day: Day) -> Result<ToggleOutcome> {
        let resolved = self.resolved_week(week)?;
        if !resolved.all_tasks().any(|t| t.id == task_id) {
            return Err(StrideError::TaskNotFound {
                week,
                task: task_id.to_string(),
            });
        }

        let mut record: ProgressRecord = load_record(self.store.as_ref(), keys::PROGRESS)?;
        let checked = record.toggle(week, task_id, day);
        save_record(self.store.as_ref(), keys::PROGRESS, &record)?;

        let streak = if checked {
            let today = self.clock.today();
            let mut streak: StreakRecord = load_record(self.store.as_ref(), keys::STREAK)?;
            let expired = streak.expire(today);
            if streak.record_activity(today) || expired {
                save_record(self.store.as_ref(), keys::STREAK, &streak)?;
            }
            streak.count
        } else {
            self.streak()?.count
        };

        tracing::debug!(week, task_id, %day, checked, streak, "toggled");
        Ok(ToggleOutcome {
            week,
            task_id: task_id.to_string(),
            day,
            checked,
            streak,
        })
    }

    // -- notes / theme / streak ---------------------------------------------

    pub fn notes(&self, week: u32) -> Result<WeekNotes> {
        self.base_week(week)?;
        let mut record: NotesRecord = load_record(self.store.as_ref(), keys::NOTES)?;
        Ok(record.remove(&week).unwrap_or_default())
    }

    /// Replace the notes of `week` wholesale.
    pub fn save_notes(&self, week: u32, notes: WeekNotes) -> Result<()> {
        self.base_week(week)?;
        let mut record: NotesRecord = load_record(self.store.as_ref(), keys::NOTES)?;
        record.insert(week, notes);
        save_record(self.store.as_ref(), keys::NOTES, &record)
    }

    pub fn theme(&self) -> Result<Theme> {
        load_record(self.store.as_ref(), keys::THEME)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        save_record(self.store.as_ref(), keys::THEME, &theme)
    }

    /// Current streak. A streak whose last activity is more than a day old
    /// is reset here and the reset is persisted.
    pub fn streak(&self) -> Result<StreakRecord> {
        let mut streak: StreakRecord = load_record(self.store.as_ref(), keys::STREAK)?;
        if streak.expire(self.clock.today()) {
            tracing::info!("streak expired");
            save_record(self.store.as_ref(), keys::STREAK, &streak)?;
        }
        Ok(streak)
    }

    // -- overlay -------------------------------------------------------------

    /// Add a custom task. The category is lower-cased; names outside the
    /// fixed four are kept but never displayed.
    pub fn add_task(
        &self,
        week: u32,
        category: &str,
        text: &str,
        schedule: Option<&str>,
    ) -> Result<Task> {
        let outcome = self.apply_directives(
            week,
            &[Directive::AddTask {
                category: category.to_string(),
                text: text.to_string(),
                schedule: schedule.map(str::to_string),
                priority: None,
            }],
        )?;
        match outcome.into_iter().next() {
            Some(AppliedDirective::Added { task, .. }) => Ok(task),
            _ => Err(StrideError::Store("add produced no task".into())),
        }
    }

    /// Remove the first task of `week` matching `fragment`. `None` when
    /// nothing matches.
    pub fn remove_task(&self, week: u32, fragment: &str) -> Result<Option<Task>> {
        let outcome = self.apply_directives(
            week,
            &[Directive::RemoveTask {
                fragment: fragment.to_string(),
            }],
        )?;
        Ok(match outcome.into_iter().next() {
            Some(AppliedDirective::Removed { task }) => Some(task),
            _ => None,
        })
    }

    /// Apply a batch of directives to `week`. Removals match against the
    /// week as it was before the batch; the batch is written as a single
    /// overlay update.
    pub fn apply_directives(
        &self,
        week: u32,
        directives: &[Directive],
    ) -> Result<Vec<AppliedDirective>> {
        let base = self.base_week(week)?;
        let mut overlays: OverlayRecord = load_record(self.store.as_ref(), keys::OVERLAY)?;
        let snapshot = overlay::resolve(base, overlays.week(week));
        let entry = overlays.week_mut(week);

        let mut applied = Vec::with_capacity(directives.len());
        let mut changed = false;
        for directive in directives {
            match directive {
                Directive::AddTask {
                    category,
                    text,
                    schedule,
                    ..
                } => {
                    let category = category.to_lowercase();
                    let mut task = Task::new(synthesize_task_id(), text.clone());
                    task.schedule = schedule.clone();
                    if Category::from_key(&category).is_none() {
                        tracing::warn!(%category, "custom task added under unknown category");
                    }
                    entry.add(&category, task.clone());
                    changed = true;
                    applied.push(AppliedDirective::Added { category, task });
                }
                Directive::RemoveTask { fragment } => {
                    match entry.remove_by_fragment(&snapshot, fragment) {
                        Some(task) => {
                            changed = true;
                            applied.push(AppliedDirective::Removed { task });
                        }
                        None => applied.push(AppliedDirective::NoMatch {
                            fragment: fragment.clone(),
                        }),
                    }
                }
            }
        }

        if changed {
            save_record(self.store.as_ref(), keys::OVERLAY, &overlays)?;
        }
        tracing::info!(week, count = applied.len(), "applied directives");
        Ok(applied)
    }

    // -- aggregates ----------------------------------------------------------

    pub fn week_progress(&self, week: u32) -> Result<WeekProgress> {
        let resolved = self.resolved_week(week)?;
        let record: ProgressRecord = load_record(self.store.as_ref(), keys::PROGRESS)?;
        let grid = record.week(week);
        let cells = progress::week_cells(&resolved, grid);
        Ok(WeekProgress {
            week,
            completed: cells.completed,
            total: cells.total,
            percent: cells.percent(),
            is_completed: progress::is_week_completed(&resolved, grid),
            categories: progress::category_progress(&resolved, grid),
        })
    }

    pub fn summary(&self) -> Result<Summary> {
        let record: ProgressRecord = load_record(self.store.as_ref(), keys::PROGRESS)?;
        let overlays: OverlayRecord = load_record(self.store.as_ref(), keys::OVERLAY)?;
        let current = self.clamp(record.current_week);
        let current_base = self.base_week(current)?;

        let mut overall = CellCount::default();
        let mut month = CellCount::default();
        let mut weeks_completed = 0;
        let mut current_week = None;

        for base in self.curriculum.weeks() {
            let resolved = overlay::resolve(base, overlays.week(base.week_number));
            let grid = record.week(base.week_number);
            let cells = progress::week_cells(&resolved, grid);
            overall = overall + cells;
            if base.month == current_base.month && base.year == current_base.year {
                month = month + cells;
            }
            if cells.total > 0 && cells.ratio() >= progress::WEEK_COMPLETE_RATIO {
                weeks_completed += 1;
            }
            if base.week_number == current {
                current_week = Some((cells, progress::category_progress(&resolved, grid)));
            }
        }

        let (week_cells, categories) = current_week.unwrap_or_default();
        Ok(Summary {
            current_week: current,
            total_weeks: self.total_weeks(),
            week_percent: week_cells.percent(),
            month: current_base.month.clone(),
            year: current_base.year,
            month_percent: month.percent(),
            overall_percent: overall.percent(),
            weeks_completed,
            streak: self.streak()?.count,
            categories,
        })
    }
}
