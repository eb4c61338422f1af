//! fitjournal - Fitness journal service
//!
//! Exercises, weekly routines, workout logging and next-workout planning

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fitjournal::Database;
use fitjournal::config::ServerConfig;
use fitjournal::exercises::MuscleGroup;

#[derive(Parser)]
#[command(name = "fitjournal")]
#[command(author, version, about = "Fitness journal service")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FITJOURNAL_DB", default_value = "fitjournal.db")]
    db: String,

    #[command(flatten)]
    server: ServerConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Load the default exercise catalog
    Seed {
        /// Replace the catalog even if it already has entries
        #[arg(short, long)]
        force: bool,
    },

    /// Print the default exercise catalog
    Catalog,

    /// Manage an account
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
enum UserAction {
    /// Allow the account to log in again
    Enable { id: i64 },

    /// Block logins for the account
    Disable { id: i64 },

    /// Delete the account and all of its data
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut db = Database::open(&cli.db)?;

    match cli.command {
        Some(Commands::Seed { force }) => {
            let seeded = db.seed_default_exercises(force)?;
            if seeded == 0 {
                println!("Catalog already populated (use --force to reload)");
            } else {
                println!("Seeded {} default exercises into {}", seeded, cli.db);
            }
        }

        Some(Commands::Catalog) => {
            let catalog = db.list_default_exercises()?;
            println!("Default exercises ({})", catalog.len());
            println!("{:-<60}", "");
            for group in MuscleGroup::all() {
                let names: Vec<&str> = catalog
                    .iter()
                    .filter(|e| e.muscle_group == *group)
                    .map(|e| e.name.as_str())
                    .collect();
                println!("{:10} | {}", group, names.join(", "));
            }
        }

        Some(Commands::User { action }) => {
            let (id, found, done) = match action {
                UserAction::Enable { id } => (id, db.set_user_active(id, true)?, "enabled"),
                UserAction::Disable { id } => (id, db.set_user_active(id, false)?, "disabled"),
                UserAction::Delete { id } => (id, db.delete_user(id)?, "deleted"),
            };
            if found {
                println!("User {} {}", id, done);
            } else {
                anyhow::bail!("User {} not found", id);
            }
        }

        Some(Commands::Serve) | None => {
            fitjournal::api::serve(db, &cli.server).await?;
        }
    }

    Ok(())
}
