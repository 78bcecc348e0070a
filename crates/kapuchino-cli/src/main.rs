use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "kapuchino", version, about = "Kapuchino: the money Thursday reminder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show message, counter, photo and countdown
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reminder message
    Message {
        #[command(subcommand)]
        action: commands::message::MessageAction,
    },
    /// Cappuccino counter
    Count {
        #[command(subcommand)]
        action: commands::count::CountAction,
    },
    /// Motivational photo
    Photo {
        #[command(subcommand)]
        action: commands::photo::PhotoAction,
    },
    /// Weekly notification
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Refresh the countdown periodically
    Watch(commands::watch::WatchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Reset message, counter, photo and reminder time
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KAPUCHINO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status { json } => commands::status::run(json),
        Commands::Message { action } => commands::message::run(action),
        Commands::Count { action } => commands::count::run(action),
        Commands::Photo { action } => commands::photo::run(action).await,
        Commands::Reminder { action } => commands::reminder::run(action).await,
        Commands::Watch(args) => commands::watch::run(args).await,
        Commands::Config { action } => commands::config::run(action).await,
        Commands::Reset { yes } => commands::reset::run(yes).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kapuchino", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
