//! Per-week custom additions and removals layered over the base curriculum.

use crate::types::{Category, Task, Week};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Additions and removals for one week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekOverlay {
    /// Custom tasks keyed by lower-cased category name. Keys outside the
    /// fixed four are kept but never rendered.
    #[serde(default)]
    pub added: BTreeMap<String, Vec<Task>>,
    #[serde(default)]
    pub removed: BTreeSet<String>,
}

impl WeekOverlay {
    pub fn is_empty(&self) -> bool {
        self.added.values().all(Vec::is_empty) && self.removed.is_empty()
    }

    pub fn add(&mut self, category: &str, task: Task) {
        self.added
            .entry(category.to_lowercase())
            .or_default()
            .push(task);
    }

    pub fn remove_id(&mut self, id: impl Into<String>) {
        self.removed.insert(id.into());
    }

    /// Remove the first task of `processed` (the already resolved week)
    /// matching `fragment`. Returns the removed task, or `None` when nothing
    /// matches or the fragment is blank.
    pub fn remove_by_fragment(&mut self, processed: &Week, fragment: &str) -> Option<Task> {
        let task = find_by_fragment(processed, fragment)?.clone();
        self.remove_id(task.id.clone());
        Some(task)
    }
}

/// The persisted overlay record: week number to that week's overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayRecord {
    pub weeks: BTreeMap<u32, WeekOverlay>,
}

impl OverlayRecord {
    pub fn week(&self, number: u32) -> Option<&WeekOverlay> {
        self.weeks.get(&number)
    }

    pub fn week_mut(&mut self, number: u32) -> &mut WeekOverlay {
        self.weeks.entry(number).or_default()
    }
}

/// Merge `overlay` onto `base`: removed ids are filtered out of every
/// category, then custom tasks for the fixed categories are appended.
pub fn resolve(base: &Week, overlay: Option<&WeekOverlay>) -> Week {
    let mut week = base.clone();
    let Some(overlay) = overlay else {
        return week;
    };

    for &category in Category::all() {
        let list = week.tasks_mut(category);
        list.retain(|t| !overlay.removed.contains(&t.id));
        if let Some(custom) = overlay.added.get(category.as_str()) {
            list.extend(
                custom
                    .iter()
                    .filter(|t| !overlay.removed.contains(&t.id))
                    .cloned(),
            );
        }
    }
    week
}

/// First task in fixed category order whose id or text contains `fragment`.
pub fn find_by_fragment<'a>(week: &'a Week, fragment: &str) -> Option<&'a Task> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return None;
    }
    week.all_tasks().find(|t| t.matches_fragment(fragment))
}
