mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{notes::NotesSubcommand, task::TaskSubcommand, theme::ThemeSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stride",
    about = "Weekly curriculum tracker: daily check-offs, streaks, progress and a task assistant",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data directory (default: ~/.stride)
    #[arg(long, global = true, env = "STRIDE_HOME")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a week with its daily grid (default: current week)
    Week { week: Option<u32> },

    /// Select the current week
    Goto { week: u32 },

    /// Move to the next week
    Next,

    /// Move to the previous week
    Prev,

    /// Flip one day of a task
    Toggle {
        /// Task id (see `stride week`)
        task: String,
        /// mon..sun, monday..sunday or 1..7
        day: String,
        /// Week number (default: current week)
        #[arg(long)]
        week: Option<u32>,
    },

    /// Add or remove custom tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Weekly reflection notes
    Notes {
        #[command(subcommand)]
        subcommand: NotesSubcommand,
    },

    /// Show or change the theme
    Theme {
        #[command(subcommand)]
        subcommand: ThemeSubcommand,
    },

    /// Streak, week, month and overall progress
    Progress,

    /// Find weeks by number, month or focus
    Search { query: String },

    /// Journey milestones relative to the current week
    Milestones,

    /// Talk to the assistant (interactive without a message)
    Chat { message: Vec<String> },

    /// Export a week as Markdown
    Report {
        #[arg(long)]
        week: Option<u32>,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the HTTP API and assistant relay
    Serve {
        #[arg(long, default_value = "7878")]
        port: u16,
        /// Open a browser once listening
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Chat { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = root::resolve_data_dir(cli.data_dir.as_deref());

    let result = match cli.command {
        Commands::Week { week } => cmd::week::show(&data_dir, week, cli.json),
        Commands::Goto { week } => cmd::week::goto(&data_dir, week, cli.json),
        Commands::Next => cmd::week::step(&data_dir, 1, cli.json),
        Commands::Prev => cmd::week::step(&data_dir, -1, cli.json),
        Commands::Toggle { task, day, week } => {
            cmd::week::toggle(&data_dir, &task, &day, week, cli.json)
        }
        Commands::Task { subcommand } => cmd::task::run(&data_dir, subcommand, cli.json),
        Commands::Notes { subcommand } => cmd::notes::run(&data_dir, subcommand, cli.json),
        Commands::Theme { subcommand } => cmd::theme::run(&data_dir, subcommand, cli.json),
        Commands::Progress => cmd::progress::run(&data_dir, cli.json),
        Commands::Search { query } => cmd::week::search(&data_dir, &query, cli.json),
        Commands::Milestones => cmd::progress::milestones(&data_dir, cli.json),
        Commands::Chat { message } => cmd::chat::run(&data_dir, &message.join(" "), cli.json),
        Commands::Report { week, out } => cmd::report::run(&data_dir, week, out.as_deref()),
        Commands::Serve { port, open } => cmd::serve::run(&data_dir, port, open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
