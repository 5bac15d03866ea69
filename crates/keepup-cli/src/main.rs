use clap::{ArgAction, Parser, Subcommand};
use commands::{account, bug_report, catalog, config, reviews, tracked, watch};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "keepup")]
#[command(about = "KeepUp - Keep up with the shows and movies you follow")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies and TV shows
    Search {
        /// Title to look for
        query: String,
    },
    /// Show full details of a movie or series
    Details {
        /// Catalog id
        id: String,

        /// Treat the id as a movie (default is a series)
        #[arg(long, action = ArgAction::SetTrue)]
        movie: bool,
    },
    /// List the episodes of one season
    Season {
        /// Catalog id of the series
        show_id: String,

        /// Season number
        season: u32,
    },
    /// Track or untrack a show
    #[command(long_about = "Toggle a show in the tracked list. The show is fetched from the catalog first. When signed in, the list is mirrored to your account.")]
    Track {
        /// Catalog id
        id: String,

        /// Treat the id as a movie (default is a series)
        #[arg(long, action = ArgAction::SetTrue)]
        movie: bool,
    },
    /// List tracked shows
    Tracked,
    /// Upcoming episodes of tracked series, soonest first
    Updates,
    /// Read, write and vote on reviews
    Review {
        #[command(subcommand)]
        cmd: ReviewCommands,
    },
    /// Mark episodes watched and show progress
    Watch {
        #[command(subcommand)]
        cmd: WatchCommands,
    },
    /// Sign in, sign out and manage the account
    Account {
        #[command(subcommand)]
        cmd: AccountCommands,
    },
    /// File a bug report
    BugReport {
        /// Short summary
        #[arg(long)]
        title: Option<String>,

        /// What happened
        #[arg(long)]
        description: Option<String>,
    },
    /// Configure the API key and settings
    #[command(long_about = "Manage configuration and credentials for KeepUp. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Write a review as the signed-in user
    Submit {
        /// Catalog id of the reviewed show
        show_id: String,

        /// Stars from 0 to 5
        #[arg(long)]
        rating: f64,

        /// Review text
        #[arg(long)]
        text: String,

        /// Tags such as amazing, funny, boring (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Mark the review as containing spoilers
        #[arg(long, action = ArgAction::SetTrue)]
        spoiler: bool,
    },
    /// List the reviews of a show, newest first
    List {
        show_id: String,

        /// Keep running and print the list again whenever it changes
        #[arg(long, action = ArgAction::SetTrue)]
        follow: bool,
    },
    /// Average rating and distribution of a show's reviews
    Summary { show_id: String },
    /// Vote a review helpful or not helpful
    Vote {
        review_id: String,

        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "not_helpful")]
        helpful: bool,

        #[arg(long, action = ArgAction::SetTrue)]
        not_helpful: bool,
    },
}

#[derive(Subcommand)]
pub enum WatchCommands {
    /// Mark one episode watched
    Mark {
        show_id: String,
        season: u32,
        episode: u32,
    },
    /// Show watched episodes of a show
    Progress { show_id: String },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Sign in with an identity issued by the identity provider
    SignIn {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and clear the local tracked list
    SignOut,
    /// Show the signed-in user
    Whoami,
    /// Delete the account and its data
    Delete {
        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the TMDB API key
    ApiKey {
        /// API key (prompted when omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = commands::context::configured_log_file();
    logging::init_logging(cli.verbose, cli.quiet, log_file).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => catalog::run_search(&query, &output).await,
        Commands::Details { id, movie } => catalog::run_details(&id, movie, &output).await,
        Commands::Season { show_id, season } => catalog::run_season(&show_id, season, &output).await,
        Commands::Track { id, movie } => tracked::run_track(&id, movie, &output).await,
        Commands::Tracked => tracked::run_list(&output).await,
        Commands::Updates => catalog::run_updates(&output).await,
        Commands::Review { cmd } => reviews::run_review(cmd, &output).await,
        Commands::Watch { cmd } => watch::run_watch(cmd, &output).await,
        Commands::Account { cmd } => account::run_account(cmd, &output).await,
        Commands::BugReport { title, description } => bug_report::run_bug_report(title, description, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output).await
        }
    }
}
