//! chatdock CLI: terminal chat widget and one-shot chat commands

use chatdock_engine::{ChatClient, ConfigError, Role, WidgetConfig};
use chatdock_tui::Theme;
use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = ".chatdock/config.json";

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CHATDOCK_LOG";

/// Terminal chat widget for a remote chat backend
#[derive(Parser)]
#[command(name = "chatdock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Log file (default: chatdock.log in the system temp dir)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options layered over the config file.
#[derive(Args)]
struct ConfigArgs {
    /// Config file (default: .chatdock/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// User identifier (default: guest)
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Path prefix for backend endpoints (use "" for none)
    #[arg(long, global = true)]
    path_prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat widget (default when no command specified)
    Tui {
        /// Color theme: mocha, latte or high-contrast
        #[arg(long, default_value = "mocha")]
        theme: String,

        /// Directory for transcript exports (default: current directory)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Send one message and print the reply
    Ask {
        /// Message text
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Print the conversation history
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the backend to forget the conversation history
    Reset,

    /// Write a config file with the given options
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("chatdock.log"));
    if let Err(e) = init_logging(&log_path) {
        eprintln!("Warning: logging disabled ({}): {e}", log_path.display());
    }
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "chatdock starting");

    let result = match cli.command {
        None => cmd_tui(&cli.config, "mocha", None),
        Some(Commands::Tui {
            ref theme,
            ref export_dir,
        }) => cmd_tui(&cli.config, theme, export_dir.clone()),
        Some(Commands::Ask { ref message }) => cmd_ask(&cli.config, &message.join(" ")),
        Some(Commands::History { json }) => cmd_history(&cli.config, json),
        Some(Commands::Reset) => cmd_reset(&cli.config),
        Some(Commands::Init { force }) => cmd_init(&cli.config, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("chatdock=info"));

    // The TUI owns the terminal, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

impl ConfigArgs {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load the config file (if any) and apply the command-line overrides.
    fn resolve(&self) -> Result<WidgetConfig, ConfigError> {
        let path = self.config_path();
        let mut config = if self.config.is_some() || path.exists() {
            WidgetConfig::load(&path)?
        } else {
            WidgetConfig::default()
        };

        if let Some(url) = &self.api_base_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(user_id) = &self.user_id {
            config.user_id = Some(user_id.clone());
        }
        if let Some(prefix) = &self.path_prefix {
            config.path_prefix.clone_from(prefix);
        }

        config.validate()?;
        Ok(config)
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("Failed to create tokio runtime")
}

fn cmd_tui(args: &ConfigArgs, theme: &str, export_dir: Option<PathBuf>) -> CmdResult {
    let config = args.resolve()?;
    let theme = Theme::by_name(theme).ok_or_else(|| format!("unknown theme: {theme}"))?;
    let export_dir = match export_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    runtime().block_on(chatdock_tui::run_tui(config, export_dir, theme))
}

fn cmd_ask(args: &ConfigArgs, message: &str) -> CmdResult {
    let message = message.trim();
    if message.is_empty() {
        return Err("message is empty".into());
    }

    let config = args.resolve()?;
    let client = ChatClient::new(&config)?;
    let reply = runtime().block_on(client.send_message(message, config.resolved_user_id()))?;
    println!("{reply}");
    Ok(())
}

fn cmd_history(args: &ConfigArgs, json: bool) -> CmdResult {
    let config = args.resolve()?;
    let Some(user_id) = config.user_id() else {
        return Err("history requires --user-id (or user_id in the config file)".into());
    };

    let client = ChatClient::new(&config)?;
    let messages = runtime().block_on(client.fetch_history(user_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("No history for {user_id}");
        return Ok(());
    }

    for message in &messages {
        let who = match message.role {
            Role::User => "You",
            Role::Bot => "Bot",
        };
        println!("{who}: {}", message.content);
    }
    Ok(())
}

fn cmd_reset(args: &ConfigArgs) -> CmdResult {
    let config = args.resolve()?;
    let client = ChatClient::new(&config)?;
    let user_id = config.resolved_user_id();
    runtime().block_on(client.reset_history(user_id))?;
    println!("History cleared for {user_id}");
    Ok(())
}

fn cmd_init(args: &ConfigArgs, force: bool) -> CmdResult {
    let path = args.config_path();
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }

    if args.api_base_url.is_none() {
        return Err("init requires --api-base-url".into());
    }

    let config = WidgetConfig {
        api_base_url: args.api_base_url.clone().unwrap_or_default(),
        user_id: args.user_id.clone(),
        path_prefix: args
            .path_prefix
            .clone()
            .unwrap_or_else(|| WidgetConfig::default().path_prefix),
        ..WidgetConfig::default()
    };
    config.validate()?;

    config.save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
