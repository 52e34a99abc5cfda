//! `cool_cvs` — a small content-addressed version control tool.
//!
//! One subcommand per core repository operation:
//! - `init` — create a new repository
//! - `add` — stage paths
//! - `commit` — commit what's staged
//! - `status` — show staged/new/modified/removed paths
//! - `log` — walk commit history from HEAD
//! - `branch` — list/create/delete branches
//! - `tag` — list/create/delete tags
//! - `switch` — move HEAD to a branch
//! - `checkout` — detach HEAD at a commit/tag and restore the tree
//! - `reset` — move a branch/HEAD to a commit, optionally restoring the tree
//! - `rebase` — replay a branch's unique commits onto the current one

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use coolcvs::commands;

/// A small content-addressed version control engine.
#[derive(Parser)]
#[command(name = "cool_cvs")]
#[command(author = "Sudeep Ranjan Sahoo <sudeep.ranjan.sahoo@example.com>")]
#[command(version = "0.1.0")]
#[command(about = "A small content-addressed version control engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new repository in the current (or given) directory
    Init {
        /// Directory to initialize. Defaults to the current directory.
        path: Option<String>,
    },

    /// Stage paths for the next commit
    Add {
        /// Files or directories to stage
        paths: Vec<String>,
    },

    /// Commit what's staged
    Commit {
        /// The commit message
        #[arg(short, long)]
        message: String,
    },

    /// Show the working tree status
    Status,

    /// Show commit history starting from HEAD
    Log {
        /// Show one commit per line
        #[arg(long = "oneline")]
        oneline: bool,
    },

    /// List, create, or delete branches
    Branch {
        /// Branch name to create or delete
        branch_name: Option<String>,

        /// Delete the branch
        #[arg(short = 'd')]
        delete: bool,

        /// Delete even if it's the currently checked-out branch
        #[arg(short = 'D')]
        force: bool,
    },

    /// List, create, or delete tags
    Tag {
        /// Tag name to create or delete
        tag_name: Option<String>,

        /// Delete the tag
        #[arg(short = 'd')]
        delete: bool,
    },

    /// Move HEAD to point at a branch
    Switch {
        /// Branch to switch to
        branch: String,
    },

    /// Detach HEAD at a commit, tag or branch tip and restore the tree
    Checkout {
        /// Commit hash, tag, or branch name
        target: String,
    },

    /// Move the current branch (or detached HEAD) to a commit
    Reset {
        /// Commit hash, tag, or branch name
        target: String,

        /// Also rewrite the working directory to match
        #[arg(long)]
        hard: bool,
    },

    /// Replay a branch's unique commits onto the branch currently checked out
    Rebase {
        /// Branch whose unique commits should be replayed
        source_branch: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            commands::init::run(path.as_deref().map(std::path::Path::new))?;
        }
        Commands::Add { paths } => {
            commands::add::run(paths)?;
        }
        Commands::Commit { message } => {
            commands::commit::run(&message)?;
        }
        Commands::Status => {
            commands::status::run()?;
        }
        Commands::Log { oneline } => {
            commands::log::run(oneline)?;
        }
        Commands::Branch { branch_name, delete, force } => {
            commands::branch::run(branch_name, delete, force)?;
        }
        Commands::Tag { tag_name, delete } => {
            commands::tag::run(tag_name, delete)?;
        }
        Commands::Switch { branch } => {
            commands::switch::run(&branch)?;
        }
        Commands::Checkout { target } => {
            commands::checkout::run(&target)?;
        }
        Commands::Reset { target, hard } => {
            commands::reset::run(&target, hard)?;
        }
        Commands::Rebase { source_branch } => {
            commands::rebase::run(&source_branch)?;
        }
    }

    Ok(())
}
