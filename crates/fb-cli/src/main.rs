//! FB CLI
//!
//! Command-line client for the form builder backend.
//!
//! # Usage
//!
//! ```bash
//! fb login --email ada@example.com --password secret1
//! fb forms list
//! fb forms new
//! fb forms save 12 --file fields.json --title "Contact us"
//! fb lint --file fields.json
//! ```

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fb_client::ClientConfig;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "fb")]
#[command(version)]
#[command(about = "Form builder command line interface", long_about = None)]
struct Cli {
    /// API endpoint URL
    #[arg(long, env = "FB_API_URL")]
    api_url: Option<String>,

    /// Bearer token (defaults to the one saved by `fb login`)
    #[arg(long, env = "FB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the token
    Login {
        #[arg(long, env = "FB_EMAIL")]
        email: String,
        #[arg(long, env = "FB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the token
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Manage forms
    Forms {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// List the field types that can be placed on a form
    Palette,
    /// Check a field sequence file for likely mistakes
    Lint {
        #[arg(short, long)]
        file: String,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
enum FormCommands {
    /// List all forms
    List,
    /// Show a form's fields
    Show { id: String },
    /// Create "New Form N" with one text field
    New,
    /// Replace a form's fields from a JSON file and save it
    Save {
        id: String,
        #[arg(short, long)]
        file: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a form
    Delete { id: String },
}

pub struct Context {
    pub config: ClientConfig,
    pub profile: Option<String>,
    pub token: Option<String>,
    pub format: output::OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.profile.as_deref()).context("loading configuration")?;
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    let token = cli.token.or_else(|| config.token.clone());
    let ctx = Context {
        config,
        profile: cli.profile,
        token,
        format: cli.format,
    };

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, email, password).await
        }
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&ctx, name, email, password).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Forms { action } => commands::forms::handle(action, &ctx).await,
        Commands::Palette => commands::local::palette(&ctx),
        Commands::Lint { file } => commands::local::lint(&ctx, &file),
        Commands::Config => commands::local::show_config(&ctx),
    }
}
