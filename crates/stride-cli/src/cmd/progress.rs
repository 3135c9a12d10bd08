use crate::output::{print_json, print_table, progress_bar};
use crate::root;
use std::path::Path;
use stride_core::curriculum::MilestoneStatus;

pub fn run(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let summary = tracker.summary()?;

    if json {
        return print_json(&summary);
    }

    println!(
        "Week {} of {}  |  streak {} day(s)  |  {} week(s) completed",
        summary.current_week, summary.total_weeks, summary.streak, summary.weeks_completed
    );
    println!();
    let rows = vec![
        vec!["This week".to_string(), progress_bar(summary.week_percent, 20)],
        vec![
            format!("{} {}", summary.month, summary.year),
            progress_bar(summary.month_percent, 20),
        ],
        vec!["Overall".to_string(), progress_bar(summary.overall_percent, 20)],
    ];
    print_table(&["SCOPE", "PROGRESS"], rows);

    println!();
    let rows = summary
        .categories
        .iter()
        .map(|c| {
            vec![
                c.label.to_string(),
                format!("{}/{}", c.completed, c.total),
                progress_bar(c.percent, 10),
            ]
        })
        .collect();
    print_table(&["CATEGORY", "CELLS", "PROGRESS"], rows);
    Ok(())
}

pub fn milestones(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let milestones = tracker.milestones()?;

    if json {
        return print_json(&milestones);
    }

    let rows = milestones
        .iter()
        .map(|m| {
            let status = match m.status {
                MilestoneStatus::Reached => "reached",
                MilestoneStatus::Upcoming => "upcoming",
                MilestoneStatus::Future => "",
            };
            vec![m.week.to_string(), m.label.to_string(), status.to_string()]
        })
        .collect();
    print_table(&["WEEK", "MILESTONE", "STATUS"], rows);
    Ok(())
}
