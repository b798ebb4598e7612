//! Libris CLI - the digital library from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password is read from stdin unless LIBRIS_PASSWORD is set)
//! libris login -e reader@example.com
//!
//! # Search the catalog
//! libris books list --search Tolkien
//!
//! # Show one e-book with its reviews, then download it
//! libris books show 7
//! libris books download 7 --dir ~/Books
//!
//! # Administration
//! libris admin stats
//! libris admin create --title "Bumi Manusia" --author "Pramoedya Ananta Toer" \
//!     --pdf bumi.pdf --cover bumi.png
//! ```
//!
//! The credential and theme are kept in `state.json` under
//! `LIBRIS_STATE_DIR` (default `~/.libris`).

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use libris_core::{EbookId, SortOrder};

mod commands;
mod context;
mod error;

use context::Context;
use error::CliError;

#[derive(Parser)]
#[command(name = "libris")]
#[command(author, version, about = "Libris digital library client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the credential
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored credential
    Logout,
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long, env = "LIBRIS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show who is signed in
    Whoami,
    /// Browse the catalog
    Books {
        #[command(subcommand)]
        action: BooksAction,
    },
    /// Show the signed-in profile
    Profile,
    /// Show recent activity
    History,
    /// List favorite e-books
    Favorites,
    /// Switch between light and dark theme
    Theme,
    /// Administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum BooksAction {
    /// List or search e-books
    List {
        #[arg(short, long)]
        search: Option<String>,

        /// newest, popular or rating
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortOrder>,

        #[arg(long)]
        skip: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show an e-book with its reviews
    Show { id: EbookId },
    /// Download an e-book file
    Download {
        id: EbookId,

        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Print the online reader address
    Read { id: EbookId },
    /// Rate and review an e-book
    Review {
        id: EbookId,

        /// 1 to 5
        #[arg(short, long, default_value_t = 5)]
        rating: i64,

        #[arg(short, long)]
        comment: String,
    },
    /// Add an e-book to favorites
    Favorite {
        id: EbookId,

        /// Remove instead of add
        #[arg(long)]
        remove: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Dashboard statistics and latest activity
    Stats,
    /// Upload a new e-book
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        /// PDF file to upload
        #[arg(long)]
        pdf: PathBuf,

        /// Cover image to upload
        #[arg(long)]
        cover: PathBuf,
    },
    /// Edit e-book metadata
    Update {
        id: EbookId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        year: Option<i32>,
    },
    /// Delete an e-book
    Delete { id: EbookId },
}

fn parse_sort(value: &str) -> Result<SortOrder, String> {
    SortOrder::parse(value).ok_or_else(|| format!("unknown sort order: {value}"))
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "libris=info,libris_client=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::open().await?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = commands::read_password(password).await?;
            commands::auth::login(&ctx, email, password).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Register {
            name,
            email,
            password,
        } => {
            let password = commands::read_password(password).await?;
            commands::auth::register(&ctx, name, email, password).await?;
        }
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Books { action } => books(&ctx, action).await?,
        Commands::Profile => commands::account::profile(&ctx).await?,
        Commands::History => commands::account::history(&ctx).await?,
        Commands::Favorites => commands::account::favorites(&ctx).await?,
        Commands::Theme => commands::toggle_theme(&ctx).await?,
        Commands::Admin { action } => admin(&ctx, action).await?,
    }
    Ok(())
}

async fn books(ctx: &Context, action: BooksAction) -> Result<(), CliError> {
    match action {
        BooksAction::List {
            search,
            sort,
            skip,
            limit,
        } => commands::books::list(ctx, search, sort, skip, limit).await,
        BooksAction::Show { id } => commands::books::show(ctx, id).await,
        BooksAction::Download { id, dir } => commands::books::download(ctx, id, &dir).await,
        BooksAction::Read { id } => commands::books::read(ctx, id),
        BooksAction::Review {
            id,
            rating,
            comment,
        } => commands::books::review(ctx, id, rating, comment).await,
        BooksAction::Favorite { id, remove } => commands::books::favorite(ctx, id, remove).await,
    }
}

async fn admin(ctx: &Context, action: AdminAction) -> Result<(), CliError> {
    match action {
        AdminAction::Stats => commands::admin::stats(ctx).await,
        AdminAction::Create {
            title,
            author,
            description,
            year,
            pdf,
            cover,
        } => {
            let input = commands::admin::NewEbook {
                title,
                author,
                description,
                year,
                pdf: &pdf,
                cover: &cover,
            };
            commands::admin::create(ctx, input).await
        }
        AdminAction::Update {
            id,
            title,
            author,
            description,
            year,
        } => {
            let changes = commands::admin::Changes {
                title,
                author,
                description,
                year,
            };
            commands::admin::update(ctx, id, changes).await
        }
        AdminAction::Delete { id } => commands::admin::delete(ctx, id).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("Popular"), Ok(SortOrder::Popular));
        assert!(parse_sort("alphabetical").is_err());
    }

    #[test]
    fn test_parse_books_list() {
        let cli = Cli::try_parse_from(["libris", "books", "list", "--search", "Tolkien", "--sort", "newest"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Books {
                action: BooksAction::List { sort: Some(SortOrder::Newest), .. }
            })
        ));
    }
}
