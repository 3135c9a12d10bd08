use crate::output::print_json;
use crate::root;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum NotesSubcommand {
    /// Print the notes of a week
    Show {
        #[arg(long)]
        week: Option<u32>,
    },
    /// Update note fields; fields not given are kept
    Set {
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        went_well: Option<String>,
        #[arg(long)]
        challenges: Option<String>,
        #[arg(long)]
        improvements: Option<String>,
    },
}

pub fn run(data_dir: &Path, subcmd: NotesSubcommand, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    match subcmd {
        NotesSubcommand::Show { week } => {
            let n = root::week_or_current(&tracker, week)?;
            let notes = tracker.notes(n)?;
            if json {
                return print_json(&serde_json::json!({ "week": n, "notes": notes }));
            }
            if notes.is_empty() {
                println!("No notes for week {n}.");
                return Ok(());
            }
            for (title, body) in [
                ("What went well", &notes.went_well),
                ("Challenges", &notes.challenges),
                ("Improvements for next week", &notes.improvements),
            ] {
                if !body.trim().is_empty() {
                    println!("{title}:\n  {}", body.trim());
                }
            }
        }
        NotesSubcommand::Set {
            week,
            went_well,
            challenges,
            improvements,
        } => {
            if went_well.is_none() && challenges.is_none() && improvements.is_none() {
                anyhow::bail!("nothing to set: pass --went-well, --challenges or --improvements");
            }
            let n = root::week_or_current(&tracker, week)?;
            let mut notes = tracker.notes(n)?;
            if let Some(v) = went_well {
                notes.went_well = v;
            }
            if let Some(v) = challenges {
                notes.challenges = v;
            }
            if let Some(v) = improvements {
                notes.improvements = v;
            }
            tracker.save_notes(n, notes.clone())?;
            if json {
                print_json(&serde_json::json!({ "week": n, "notes": notes }))?;
            } else {
                println!("Saved notes for week {n}");
            }
        }
    }
    Ok(())
}
