use crate::output::{print_json, print_table};
use crate::root;
use clap::Subcommand;
use std::path::Path;
use stride_core::types::Theme;

#[derive(Subcommand)]
pub enum ThemeSubcommand {
    /// Print the active theme
    Show,
    /// List available themes
    List,
    /// Switch theme
    Set { theme: String },
}

pub fn run(data_dir: &Path, subcmd: ThemeSubcommand, json: bool) -> anyhow::Result<()> {
    let (tracker, _) = root::open(data_dir)?;
    match subcmd {
        ThemeSubcommand::Show => {
            let theme = tracker.theme()?;
            if json {
                print_json(&serde_json::json!({ "theme": theme, "name": theme.display_name() }))?;
            } else {
                println!("{} ({theme})", theme.display_name());
            }
        }
        ThemeSubcommand::List => {
            let active = tracker.theme()?;
            if json {
                let list: Vec<_> = Theme::all()
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "theme": t,
                            "name": t.display_name(),
                            "active": *t == active,
                        })
                    })
                    .collect();
                return print_json(&list);
            }
            let rows = Theme::all()
                .iter()
                .map(|t| {
                    vec![
                        if *t == active { "*" } else { "" }.to_string(),
                        t.as_str().to_string(),
                        t.display_name().to_string(),
                    ]
                })
                .collect();
            print_table(&["", "THEME", "NAME"], rows);
        }
        ThemeSubcommand::Set { theme } => {
            let theme: Theme = theme.parse()?;
            tracker.set_theme(theme)?;
            if json {
                print_json(&serde_json::json!({ "theme": theme, "name": theme.display_name() }))?;
            } else {
                println!("Theme set to {}", theme.display_name());
            }
        }
    }
    Ok(())
}
