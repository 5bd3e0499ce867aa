use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dbseek::access::UserId;
use dbseek::bot::{Attachment, Sender, Update};
use dbseek::config::Config;
use dbseek::server::{self, get_socket_path, is_daemon_running, GatewayClient};
use dbseek::{ingest, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dbseek")]
#[command(about = "Upload text/CSV archives and search them through a chat bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// When to color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the gateway daemon that holds all datasets
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Send one command to the daemon as a chat user and print the reply
    Send {
        /// Sender's user id
        #[arg(long)]
        user_id: i64,

        /// Sender's username
        #[arg(long)]
        username: Option<String>,

        /// File to attach (for /add)
        #[arg(long)]
        attach: Option<PathBuf>,

        /// Command text, e.g. `/search Smith`
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Decode a file locally and show what would be ingested
    Inspect {
        file: PathBuf,

        /// Number of lines to preview
        #[arg(short = 'n', long, default_value_t = 10)]
        lines: usize,
    },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start the daemon in background
    Start,
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
    /// Run daemon in foreground (for debugging)
    Foreground,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = matches!(cli.color, ColorMode::Auto);

    match cli.command {
        Commands::Daemon { action } => handle_daemon_command(action)?,
        Commands::Send {
            user_id,
            username,
            attach,
            text,
        } => send(user_id, username, attach, text.join(" "), color)?,
        Commands::Inspect { file, lines } => inspect(&file, lines, color)?,
    }

    Ok(())
}

fn send(
    user_id: i64,
    username: Option<String>,
    attach: Option<PathBuf>,
    text: String,
    color: bool,
) -> Result<()> {
    let config = Config::load()?;

    let attachment = match attach {
        Some(path) => Some(Attachment {
            file_name: file_name(&path)?,
            bytes: std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        }),
        None => None,
    };

    let update = Update {
        sender: Sender {
            id: UserId(user_id),
            full_name: username.clone().unwrap_or_default(),
            username,
        },
        text,
        attachment,
    };

    let mut client = GatewayClient::connect()
        .context("Start the daemon with 'dbseek daemon start'")?;
    let reply = client.dispatch(&config.bot_token, update)?;
    output::print_reply(&reply, color)?;

    Ok(())
}

fn inspect(path: &Path, preview: usize, color: bool) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let dataset = ingest::ingest(&bytes, &file_name(path)?)?;
    output::print_dataset(&dataset, preview, color)?;
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

fn handle_daemon_command(action: DaemonAction) -> Result<()> {
    match action {
        DaemonAction::Start => {
            if is_daemon_running() {
                println!("Daemon is already running");
                return Ok(());
            }

            let config = Config::load()?;
            println!("Starting dbseek daemon...");
            server::daemon::daemonize(config)?;

            // Wait a moment for daemon to start
            std::thread::sleep(std::time::Duration::from_millis(500));

            if is_daemon_running() {
                println!("Daemon started (socket: {})", get_socket_path().display());
            } else {
                println!(
                    "Daemon may have failed to start. Check {}",
                    server::daemon::ERROR_LOG
                );
            }
        }

        DaemonAction::Stop => {
            if !is_daemon_running() {
                println!("Daemon is not running");
                return Ok(());
            }

            println!("Stopping daemon...");

            // Graceful shutdown first
            if let Ok(mut client) = GatewayClient::connect() {
                let _ = client.shutdown();
                std::thread::sleep(std::time::Duration::from_millis(500));
            }

            if is_daemon_running() {
                server::daemon::stop_daemon()?;
            }

            println!("Daemon stopped");
        }

        DaemonAction::Status => {
            if !is_daemon_running() {
                println!("Daemon is not running");
                return Ok(());
            }

            let mut client = match GatewayClient::connect() {
                Ok(client) => client,
                Err(_) => {
                    println!("Daemon is running but not responding");
                    return Ok(());
                }
            };

            if client.ping().is_err() {
                println!("Daemon is running but not responding");
                return Ok(());
            }

            match client.status() {
                Ok(status) => {
                    println!("dbseek daemon status:");
                    println!("  Uptime: {}s", status.uptime_secs);
                    println!("  Users seen: {}", status.users);
                    println!("  Admins: {}", status.admins);
                    println!("  Datasets: {}", status.datasets.count);
                    println!("  Total lines: {}", status.datasets.total_lines);
                    println!("  Total size: {} bytes", status.datasets.total_size);
                    println!("  Commands handled: {}", status.commands_handled);
                    println!("  Searches served: {}", status.searches_served);
                    println!("  Cache hit rate: {:.1}%", status.cache_hit_rate * 100.0);
                }
                Err(e) => {
                    println!("Failed to get status: {}", e);
                }
            }
        }

        DaemonAction::Foreground => {
            if is_daemon_running() {
                println!("Daemon is already running in background. Stop it first with 'dbseek daemon stop'");
                return Ok(());
            }

            let config = Config::load()?;
            println!("Running daemon in foreground (Ctrl+C to stop)...");
            server::daemon::run_foreground(config)?;
        }
    }

    Ok(())
}
