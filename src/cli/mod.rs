pub mod commands;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hubctl")]
#[command(about = "hubctl - operator tool for Family Hub data")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Storage provider OAuth token (defaults to $YANDEX_TOKEN)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Family roster management")]
    Members {
        #[command(subcommand)]
        cmd: commands::members::MembersCommands,
    },

    #[command(about = "Inspect a member's calendar")]
    Calendar {
        #[command(subcommand)]
        cmd: commands::calendar::CalendarCommands,
    },

    #[command(about = "Inspect a member's finances")]
    Finances {
        #[command(subcommand)]
        cmd: commands::finances::FinancesCommands,
    },

    #[command(about = "Copy a stored document to a local file")]
    Export {
        #[arg(help = "Document path relative to the storage root, e.g. projects/projects.json")]
        path: String,
        #[arg(help = "Local file to write")]
        file: String,
    },

    #[command(about = "Replace a stored document with a local JSON file")]
    Import {
        #[arg(help = "Document path relative to the storage root")]
        path: String,
        #[arg(help = "Local JSON file to upload")]
        file: String,
    },

    #[command(about = "Print an Argon2id hash for a member password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Ping {
        #[arg(help = "Server base URL", default_value = "http://localhost:3000")]
        url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let token = cli.token;

    match cli.command {
        Commands::Members { cmd } => commands::members::handle(cmd, token, output_format).await,
        Commands::Calendar { cmd } => commands::calendar::handle(cmd, token, output_format).await,
        Commands::Finances { cmd } => commands::finances::handle(cmd, token, output_format).await,
        Commands::Export { path, file } => commands::documents::export(&path, &file, token, output_format).await,
        Commands::Import { path, file } => commands::documents::import(&path, &file, token, output_format).await,
        Commands::HashPassword { password } => commands::password::handle(&password, output_format),
        Commands::Ping { url } => commands::ping::handle(&url, output_format).await,
    }
}
