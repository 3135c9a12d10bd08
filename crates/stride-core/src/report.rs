//! Markdown export of a single week.

use crate::progress::{self, WeekGrid};
use crate::types::{Category, Day, Week, WeekNotes};
use std::fmt::Write;

const CHECK: &str = "x";
const EMPTY: &str = " ";

/// Render `week` with its completion grid and notes.
pub fn render_week(week: &Week, grid: Option<&WeekGrid>, notes: &WeekNotes) -> String {
    let mut doc = String::new();
    let cells = progress::week_cells(week, grid);

    // Writing to a String is infallible.
    let _ = writeln!(doc, "# Week {}: {}\n", week.week_number, week.focus);
    let _ = writeln!(
        doc,
        "**Dates:** {} - {}, {}  ",
        week.start_date, week.end_date, week.year
    );
    let _ = writeln!(doc, "**Phase:** {}  ", week.phase);
    let _ = writeln!(
        doc,
        "**Progress:** {}% ({}/{} cells)",
        cells.percent(),
        cells.completed,
        cells.total
    );
    if let Some(ref milestone) = week.milestone {
        let _ = writeln!(doc, "\n> Milestone: {milestone}");
    }

    for &category in Category::all() {
        let tasks = week.tasks(category);
        if tasks.is_empty() {
            continue;
        }
        let _ = writeln!(doc, "\n## {}\n", category.label());

        let days: Vec<&str> = Day::all().iter().map(|d| d.short()).collect();
        let _ = writeln!(doc, "| Task | {} | Done |", days.join(" | "));
        let _ = writeln!(doc, "|------|{}------|", "-----|".repeat(days.len()));

        for task in tasks {
            let row: Vec<&str> = Day::all()
                .iter()
                .map(|d| {
                    let on = grid
                        .and_then(|g| g.get(&task.id))
                        .is_some_and(|cells| cells[d.index()]);
                    if on {
                        CHECK
                    } else {
                        EMPTY
                    }
                })
                .collect();
            let label = match task.schedule {
                Some(ref s) => format!("{} _({s})_", escape(&task.text)),
                None => escape(&task.text),
            };
            let _ = writeln!(
                doc,
                "| {label} | {} | {}/7 |",
                row.join(" | "),
                progress::task_days_done(grid, &task.id)
            );
        }
    }

    let _ = writeln!(doc, "\n## Summary\n");
    for cat in progress::category_progress(week, grid) {
        if cat.total == 0 {
            continue;
        }
        let _ = writeln!(
            doc,
            "- {}: {}/{} ({}%)",
            cat.label, cat.completed, cat.total, cat.percent
        );
    }

    if !notes.is_empty() {
        let _ = writeln!(doc, "\n## Notes");
        for (title, body) in [
            ("What went well", &notes.went_well),
            ("Challenges", &notes.challenges),
            ("Improvements for next week", &notes.improvements),
        ] {
            if body.trim().is_empty() {
                continue;
            }
            let _ = writeln!(doc, "\n### {title}\n\n{}", body.trim());
        }
    }

    if !week.resources.is_empty() {
        let _ = writeln!(doc, "\n## Resources\n");
        for r in &week.resources {
            let _ = writeln!(doc, "- [{}]({})", r.title, r.url);
        }
    }

    doc
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressRecord;
    use crate::types::Task;

    fn week() -> Week {
        Week {
            week_number: 12,
            start_date: "16 February".into(),
            end_date: "22 February".into(),
            month: "February".into(),
            year: 2025,
            phase: "Foundations".into(),
            focus: "ML Introduction".into(),
            japanese: vec![Task::new("w12-jp-1", "Anki | review").with_schedule("Daily")],
            aiml: vec![Task::new("w12-ai-1", "Linear regression")],
            college: vec![],
            goals: vec![],
            milestone: Some("Checkpoint".into()),
            resources: vec![],
        }
    }

    #[test]
    fn renders_grid_and_summary() {
        let mut record = ProgressRecord::default();
        record.toggle(12, "w12-jp-1", Day::Mon);
        record.toggle(12, "w12-jp-1", Day::Sun);
        let doc = render_week(&week(), record.week(12), &WeekNotes::default());

        assert!(doc.starts_with("# Week 12: ML Introduction"));
        assert!(doc.contains("> Milestone: Checkpoint"));
        assert!(doc.contains("| Anki \\| review _(Daily)_ | x |   |   |   |   |   | x | 2/7 |"));
        assert!(doc.contains("- Japanese Learning: 2/7 (29%)"));
        assert!(!doc.contains("College Work"));
        assert!(!doc.contains("## Notes"));
    }

    #[test]
    fn renders_only_filled_notes() {
        let notes = WeekNotes {
            went_well: "Finished the course".into(),
            challenges: "  ".into(),
            improvements: String::new(),
        };
        let doc = render_week(&week(), None, &notes);
        assert!(doc.contains("### What went well\n\nFinished the course"));
        assert!(!doc.contains("### Challenges"));
    }
}
