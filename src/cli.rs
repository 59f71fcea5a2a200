use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "speedrun", version, about = "Terminal workout runner")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Extra template file merged into the built-in catalog.
    #[arg(global = true, long, value_name = "FILE")]
    pub templates: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Template catalog
    #[command(subcommand, visible_alias = "t")]
    Template(TemplateCmd),

    /// Run a workout from a template
    #[command(visible_alias = "w")]
    Workout {
        /// Template id (see `template list`)
        template: Option<String>,

        /// Rest seconds for exercises whose template sets none (overrides config)
        #[arg(short, long)]
        rest: Option<u32>,
    },

    /// View or edit speedrun config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Debug, Subcommand)]
pub enum TemplateCmd {
    /// List templates
    #[command(visible_alias = "l")]
    List {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show a single template in detail
    #[command(visible_alias = "s")]
    Show {
        /// Template id
        id: String,
    },

    /// Validate a template file without using it
    Check {
        /// Path to TOML file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
