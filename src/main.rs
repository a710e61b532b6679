//! # Taskal
//!
//! A terminal calendar for tasks and appointments. Tasks live for the length of
//! a session: they are entered, reviewed on a month calendar, filtered, and
//! summarised when the program exits.
//!
//! ## Features
//!
//! *   **Month Calendar**: Days are colored by their tasks (overdue, done, other).
//! *   **Categories**: Filter the day list and the schedule by category.
//! *   **Schedule**: All tasks between two dates, in chronological order.
//! *   **Documents**: Attach PDFs and images to a task and save them back out.
//! *   **Reminders**: A bell and a prompt when a task's date and time arrive.
//! *   **Notes**: Quick notes, newest first.
//!
//! ## Usage
//!
//! ```bash
//! taskal
//! # or explicitly, starting on a given day
//! taskal ui --date 2024-03-15
//! ```
//!
//! #### TUI Key Bindings
//!
//! **Global**
//! *   `q`: Quit (prints a summary of the session)
//! *   `Tab` / `1` `2` `3`: Switch between Tasks, Schedule and Notes
//!
//! **Tasks View**
//! *   `h`/`l`, `b`/`w`: Previous/next day, previous/next week
//! *   `<`/`>`: Previous/next month
//! *   `g`: Today
//! *   `[`/`]`: Previous/next category
//! *   `a`: Add a task on the selected day
//! *   `Enter`: Task details and documents
//! *   `Space`: Toggle done
//! *   `n` `D` `t` `c` `C` `A` `K` `m` `s`: Edit title, date, time, category,
//!     client, assignee, contract, comment, status
//! *   `f`: Attach files
//! *   `N`: New category for the picker (`Tab` while typing a category)
//! *   `d`: Delete
//!
//! **Schedule View**
//! *   `S`/`E`: Set the start/end date, `x`: clear both
//! *   `Enter`: Show the task's day in the calendar
//!
//! ## Configuration
//!
//! Read from `~/.config/taskal/config.json`, or the file named by
//! `TASKAL_CONFIG`. Logs go to the configured `log_dir`; set `TASKAL_LOG`
//! to override the level filter.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

use taskal::commands::{print_config, print_summary};
use taskal::config::{config_path, Config};
use taskal::error::{Error, Result};
use taskal::status::parse_date;
use taskal::tui::{app::now, run_tui};
use taskal::logging;

#[derive(Parser)]
#[command(name = "taskal")]
#[command(about = "Terminal calendar for tasks and appointments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive calendar
    Ui {
        /// Day to select at start, in YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the effective configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

fn completions(shell: &str) -> Result<()> {
    let shell_enum = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => return Err(Error::UnsupportedShell(shell.to_string())),
    };
    let mut cmd = Cli::command();
    generate(shell_enum, &mut cmd, "taskal", &mut io::stdout());
    Ok(())
}

fn ui(date: Option<String>) -> Result<()> {
    let config = Config::load()?;
    logging::init_or_report(&config.log_level, &config.log_dir());

    let start = match date {
        Some(d) => parse_date(&d).ok_or(Error::InvalidDate(d))?,
        None => now().date(),
    };

    let session = run_tui(config, start)?;
    print_summary(&session, now());
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Config) => {
            let config = Config::load()?;
            print_config(&config, &config_path());
            Ok(())
        }
        Some(Commands::Completions { shell }) => completions(&shell),
        Some(Commands::Ui { date }) => ui(date),
        None => ui(None),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
