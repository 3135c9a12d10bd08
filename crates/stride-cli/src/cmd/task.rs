use crate::output::print_json;
use crate::root;
use clap::Subcommand;
use std::path::Path;
use stride_core::types::Category;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a custom task to a week
    Add {
        /// japanese, aiml, college or goals; other keys are stored but hidden
        category: String,
        #[arg(required = true)]
        text: Vec<String>,
        /// Free-form timing, e.g. "Mon/Wed 7pm"
        #[arg(long)]
        schedule: Option<String>,
        #[arg(long)]
        week: Option<u32>,
    },
    /// Remove the first task whose id or text contains FRAGMENT
    Remove {
        fragment: String,
        #[arg(long)]
        week: Option<u32>,
    },
}

pub fn run(data_dir: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            category,
            text,
            schedule,
            week,
        } => add(
            data_dir,
            &category,
            &text.join(" "),
            schedule.as_deref(),
            week,
            json,
        ),
        TaskSubcommand::Remove { fragment, week } => remove(data_dir, &fragment, week, json),
    }
}

fn add(
    data_dir: &Path,
    category: &str,
    text: &str,
    schedule: Option<&str>,
    week: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let key = category.trim().to_lowercase();
    let known = Category::from_key(&key);
    let (tracker, _) = root::open(data_dir)?;
    let n = root::week_or_current(&tracker, week)?;
    let task = tracker.add_task(n, &key, text, schedule)?;

    if json {
        print_json(&serde_json::json!({
            "week": n,
            "category": key,
            "task": task,
        }))?;
    } else {
        let label = known.map(Category::label).unwrap_or(key.as_str());
        println!("Added [{}] to {label} (week {n}): {}", task.id, task.text);
    }
    Ok(())
}

fn remove(data_dir: &Path, fragment: &str, week: Option<u32>, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    let n = root::week_or_current(&tracker, week)?;
    let removed = tracker.remove_task(n, fragment)?;

    if json {
        return print_json(&serde_json::json!({ "week": n, "removed": removed }));
    }
    match removed {
        Some(task) => println!("Removed [{}] from week {n}: {}", task.id, task.text),
        None => println!("Nothing in week {n} matches '{fragment}'; no change."),
    }
    Ok(())
}
