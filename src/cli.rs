use std::path::PathBuf;

use brainbox::platform::PlatformType;
use brainbox::render::Layout;
use clap::{Parser, Subcommand};

/// Save links and notes, preview their embeds, share a read-only view
#[derive(Parser)]
#[command(name = "brainbox", version)]
#[command(about = "A personal content library for links and notes", long_about = None)]
pub struct Cli {
    /// Config file (defaults to config.toml in the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        email: String,
        /// Password (read from BRAINBOX_PASSWORD when omitted)
        #[arg(long, env = "BRAINBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        name: String,
        email: String,
        #[arg(long, env = "BRAINBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List saved items
    List {
        /// Only this platform (youtube, twitter, note, ...)
        #[arg(short = 't', long = "type")]
        kind: Option<PlatformType>,
        /// Only items carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Save a link
    Add {
        #[arg(short = 't', long = "type")]
        kind: PlatformType,
        link: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Save a note
    Note {
        title: String,
        body: String,
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Replace a note's text
    Edit { id: String, body: String },
    /// Delete an item
    Delete { id: String },
    /// Turn public sharing on (prints the link) or off
    Share {
        #[arg(long)]
        off: bool,
    },
    /// Show someone's shared collection
    Shared {
        /// Sharing hash or full share link
        hash: String,
    },
    /// Show how a link would be embedded
    Resolve {
        #[arg(short = 't', long = "type")]
        kind: PlatformType,
        link: String,
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Write a collection to a standalone HTML page
    Export {
        /// Export a shared collection instead of your own
        #[arg(long)]
        hash: Option<String>,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = Layout::Grid)]
        layout: Layout,
    },
}
