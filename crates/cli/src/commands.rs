//! CLI commands

use anyhow::{Result, anyhow, bail};
use clap::{Subcommand, ValueEnum};
use movie_checker_core::{CollectionFilter, MovieDetails, MovieStatus, UserMovie, UserProfile};
use movie_checker_http::client::token::token_expiry;
use movie_checker_http::{ClientError, MovieClient, SuggestionFetcher};
use std::time::Duration;
use tracing::{info, warn};

use crate::listener::CliListener;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to the backend
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MOVIE_CHECKER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Create an account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "MOVIE_CHECKER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in user
    Whoami,

    /// Browse the catalog
    Movies {
        #[command(subcommand)]
        command: MovieCommands,
    },

    /// Manage your collection
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Manage your account
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(Subcommand)]
pub enum MovieCommands {
    /// List the whole catalog
    List {
        /// Show poster links
        #[arg(long)]
        posters: bool,
    },

    /// Search by title
    Search {
        query: String,

        /// Show poster links
        #[arg(long)]
        posters: bool,
    },

    /// Complete a partial title
    Suggest { query: String },
}

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// List movies in your collection
    List {
        /// all, watched, watchlist or favorites
        #[arg(long, default_value = "all")]
        filter: CollectionFilter,
    },

    /// Mark a movie as watched or put it on the watchlist
    Status { title: String, status: StatusArg },

    /// Add a movie to favorites, or remove it with --off
    Favorite {
        title: String,

        #[arg(long)]
        off: bool,
    },

    /// Rate a movie from 0 to 10
    Rate { title: String, rate: f64 },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Change your display name
    Rename { name: String },

    /// Change your password
    Password {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,
    },

    /// Delete your account permanently
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Email a password reset code to your account address
    ResetRequest {
        /// Must match the account email (defaults to it)
        email: Option<String>,
    },

    /// Check the emailed code and print a reset token
    ResetVerify { code: String },

    /// Set a new password with a reset token
    ResetConfirm {
        #[arg(long)]
        token: String,

        #[arg(long)]
        new_password: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Watched,
    Watchlist,
    /// Remove from both lists
    None,
}

impl From<StatusArg> for Option<MovieStatus> {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Watched => Some(MovieStatus::Watched),
            StatusArg::Watchlist => Some(MovieStatus::WatchList),
            StatusArg::None => None,
        }
    }
}

impl Commands {
    pub async fn execute(self, client: &MovieClient, listener: &CliListener) -> Result<()> {
        // Every command starts from the persisted session, like a page load
        let user = match client.restore_session().await {
            Ok(user) => user,
            Err(err) => {
                warn!("Could not restore session: {err}");
                None
            }
        };

        match self {
            Commands::Login { email, password } => {
                match client.login(&email, &password).await? {
                    Some(user) => println!("Logged in as {}", user.display_name()),
                    None => bail!("Logged in, but your profile could not be loaded"),
                }
                Ok(())
            }
            Commands::Logout => {
                client.logout().await;
                println!("Logged out");
                Ok(())
            }
            Commands::Register {
                name,
                email,
                password,
            } => {
                client.register(&name, &email, &password).await?;
                println!("Account created. Check {email} for a verification link before logging in.");
                Ok(())
            }
            Commands::Whoami => {
                let user = require_session(user, listener)?;
                print_profile(&user);
                if let Some(token) = client.session().access_token() {
                    println!("  {}", session_expiry_line(&token));
                }
                Ok(())
            }
            Commands::Movies { command } => command.execute(client).await,
            Commands::Collection { command } => {
                require_session(user, listener)?;
                command.execute(client).await.map_err(session_error)
            }
            Commands::Account { command } => {
                let user = require_session(user, listener)?;
                command.execute(client, &user).await.map_err(session_error)
            }
        }
    }
}

impl MovieCommands {
    async fn execute(self, client: &MovieClient) -> Result<()> {
        match self {
            MovieCommands::List { posters } => {
                print_movies(&client.list_movies().await?, posters);
            }
            MovieCommands::Search { query, posters } => {
                let movies = client.search_movies(&query).await?;
                if movies.is_empty() {
                    println!("No movies found for your search");
                }
                print_movies(&movies, posters);
            }
            MovieCommands::Suggest { query } => {
                // One query per run, nothing to wait for
                let fetcher = SuggestionFetcher::new(client.clone()).with_debounce(Duration::ZERO);
                for title in fetcher.fetch(&query).await?.unwrap_or_default() {
                    println!("{title}");
                }
            }
        }
        Ok(())
    }
}

impl CollectionCommands {
    async fn execute(self, client: &MovieClient) -> Result<(), ClientError> {
        match self {
            CollectionCommands::List { filter } => {
                let movies = client.filtered_user_movies(filter).await?;
                if movies.is_empty() {
                    println!("Nothing here yet");
                }
                for movie in &movies {
                    println!("{}", collection_line(movie));
                }
            }
            CollectionCommands::Status { title, status } => {
                let status: Option<MovieStatus> = status.into();
                client.update_movie_status(&title, status).await?;
                match status {
                    Some(status) => println!("Movie added to {status}"),
                    None => println!("Movie removed from your lists"),
                }
            }
            CollectionCommands::Favorite { title, off } => {
                client.update_movie_favorite(&title, !off).await?;
                if off {
                    println!("Removed {title} from favorites");
                } else {
                    println!("Added {title} to favorites");
                }
            }
            CollectionCommands::Rate { title, rate } => {
                let rate = client.update_movie_rate(&title, rate).await?;
                println!("Rated {title} {rate:.1}/10");
            }
        }
        Ok(())
    }
}

impl AccountCommands {
    async fn execute(self, client: &MovieClient, user: &UserProfile) -> Result<(), ClientError> {
        match self {
            AccountCommands::Rename { name } => {
                client.change_name(&name).await?;
                println!("Name updated");
            }
            AccountCommands::Password { old, new } => {
                client.change_password(user.id, &old, &new).await?;
                println!("Password changed");
            }
            AccountCommands::Delete { yes } => {
                if !yes {
                    return Err(ClientError::Validation(
                        "pass --yes to delete your account".into(),
                    ));
                }
                client.delete_account().await?;
                println!("Account deleted");
            }
            AccountCommands::ResetRequest { email } => {
                let account_email = user.email.as_deref().unwrap_or_default();
                let email = email.unwrap_or_else(|| account_email.to_string());
                if !email.trim().eq_ignore_ascii_case(account_email) {
                    return Err(ClientError::Validation(
                        "that email does not match your account".into(),
                    ));
                }
                client.request_password_reset(&email).await?;
                println!("Verification code sent, check your inbox");
            }
            AccountCommands::ResetVerify { code } => {
                let token = client.verify_reset_code(user.id, &code).await?;
                info!("Reset code verified");
                println!("{token}");
            }
            AccountCommands::ResetConfirm {
                token,
                new_password,
            } => {
                client.confirm_password_reset(&token, &new_password).await?;
                println!("Password changed successfully");
            }
        }
        Ok(())
    }
}

fn require_session(user: Option<UserProfile>, listener: &CliListener) -> Result<UserProfile> {
    match user {
        Some(user) if !listener.session_lost() => Ok(user),
        _ => bail!("Please log in first"),
    }
}

/// Auth failures mid-command mean the session could not be renewed
fn session_error(err: ClientError) -> anyhow::Error {
    if err.is_auth_expired() {
        anyhow!("Your session has expired, please log in again")
    } else {
        err.into()
    }
}

fn print_profile(user: &UserProfile) {
    println!("Hi, {}", user.display_name());
    if let Some(email) = &user.email {
        println!("  Email: {email}");
    }
    if let Some(joined) = user.join_date {
        println!("  Member since: {}", joined.format("%B %-d, %Y"));
    }
}

fn session_expiry_line(token: &str) -> String {
    match token_expiry(token) {
        Some(expiry) => format!("Session expires: {}", expiry.format("%B %-d, %Y %H:%M UTC")),
        None => "Session expiry unknown".to_string(),
    }
}

fn print_movies(movies: &[MovieDetails], posters: bool) {
    for movie in movies {
        println!("{}", movie_line(movie));
        if let Some(url) = posters.then(|| poster_line(movie)).flatten() {
            println!("  {url}");
        }
    }
}

fn poster_line(movie: &MovieDetails) -> Option<String> {
    movie.poster().map(|url| format!("Poster: {url}"))
}

fn movie_line(movie: &MovieDetails) -> String {
    let mut line = movie.title.clone();
    if let Some(year) = movie.year {
        line.push_str(&format!(" ({year})"));
    }
    if let Some(genre) = movie.genre.as_deref().filter(|genre| !genre.is_empty()) {
        line.push_str(&format!(" [{genre}]"));
    }
    if let Some(rate) = movie.imdb_rate {
        line.push_str(&format!(" IMDb {rate:.1}"));
    }
    line
}

fn collection_line(movie: &UserMovie) -> String {
    let mut line = movie_line(&movie.movie_details);
    if let Some(status) = movie.status {
        line.push_str(&format!(" - {status}"));
    }
    if movie.is_favorite() {
        line.push_str(" ♥");
    }
    if let Some(rate) = movie.user_rate {
        line.push_str(&format!(" {rate:.1}/10"));
    }
    line
}
