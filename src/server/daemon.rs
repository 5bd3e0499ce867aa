//! Unix gateway daemon
//!
//! Owns the bot context and serves updates over a Unix socket, one thread per
//! connection.

use crate::bot::BotContext;
use crate::config::Config;
use crate::server::protocol::{read_message, write_message, Request, Response};
use crate::server::{get_pid_path, get_socket_path, process_alive, read_pid};
use anyhow::{Context, Result};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Connection timeout
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `stop_daemon` waits after `SIGTERM`
const STOP_GRACE: Duration = Duration::from_millis(1500);

/// Where a detached daemon reports startup failures
pub const ERROR_LOG: &str = "/tmp/dbseek-error.log";

/// The gateway daemon
pub struct GatewayServer {
    context: BotContext,
    /// Shutdown flag
    shutdown: AtomicBool,
}

impl GatewayServer {
    /// Create a new server wrapped in Arc
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            context: BotContext::new(config),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn context(&self) -> &BotContext {
        &self.context
    }

    /// Start the server (blocking)
    pub fn run(self: &Arc<Self>) -> Result<()> {
        let socket_path = get_socket_path();
        let pid_path = get_pid_path();

        if let Some(parent) = socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Remove stale socket file
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }

        fs::write(&pid_path, format!("{}", std::process::id()))?;

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind to {}", socket_path.display()))?;

        // User only
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&socket_path, fs::Permissions::from_mode(0o600))?;
        }

        if self.context.config().uses_placeholder_token() {
            warn!("no bot token configured, accepting the placeholder token");
        }
        info!(socket = %socket_path.display(), "listening");

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            match stream {
                Ok(stream) => {
                    let _ = stream.set_read_timeout(Some(CONNECTION_TIMEOUT));
                    let _ = stream.set_write_timeout(Some(CONNECTION_TIMEOUT));

                    let server = Arc::clone(self);
                    thread::spawn(move || {
                        if let Err(e) = server.handle_connection(stream) {
                            error!(error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept error");
                }
            }
        }

        remove_runtime_files();
        info!("stopped");

        Ok(())
    }

    /// Handle a single client connection
    fn handle_connection(&self, stream: UnixStream) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        loop {
            let request: Request = match read_message(&mut reader) {
                Ok(req) => req,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    break;
                }
                Err(e) => {
                    // Framing is unknown after a bad frame, so the connection ends here
                    warn!(error = %e, "dropping connection after unreadable request");
                    let resp = Response::Error {
                        message: format!("Invalid request: {}", e),
                    };
                    write_message(&mut writer, &resp)?;
                    break;
                }
            };

            let response = self.handle_request(request);
            write_message(&mut writer, &response)?;

            if matches!(response, Response::ShuttingDown) {
                // Wake the accept loop so it observes the flag
                let _ = UnixStream::connect(get_socket_path());
                break;
            }
        }

        Ok(())
    }

    /// Handle a single request
    pub fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::Dispatch { token, update } => {
                if token != self.context.config().bot_token {
                    warn!(user = %update.sender.id, "rejected update with bad token");
                    return Response::Error {
                        message: "Invalid bot token".to_string(),
                    };
                }

                Response::Reply {
                    text: self.context.handle(&update),
                }
            }

            Request::Status => Response::Status(self.context.status()),

            Request::Shutdown => {
                info!("shutdown requested");
                self.shutdown.store(true, Ordering::Relaxed);
                Response::ShuttingDown
            }

            Request::Ping => Response::Pong,
        }
    }
}

/// Socket and pid file; both are gone once the daemon has stopped
fn remove_runtime_files() {
    let _ = fs::remove_file(get_socket_path());
    let _ = fs::remove_file(get_pid_path());
}

/// Point stdin, stdout and stderr at `/dev/null`
fn detach_stdio() {
    // SAFETY: only standard descriptors are touched, before any thread exists
    unsafe {
        let null = libc::open(c"/dev/null".as_ptr(), libc::O_RDWR);
        if null == -1 {
            return;
        }
        for fd in 0..=2 {
            libc::dup2(null, fd);
        }
        if null > 2 {
            libc::close(null);
        }
    }
}

/// Start the gateway as a detached background process.
///
/// Returns in the calling process once the intermediate child has exited;
/// the grandchild runs the server until shutdown. Startup errors land in
/// [`ERROR_LOG`] because the daemon has no terminal.
pub fn daemonize(config: Config) -> Result<()> {
    // SAFETY: fork/setsid/wait with no other threads running yet
    let first = unsafe { libc::fork() };
    if first == -1 {
        anyhow::bail!("fork failed: {}", std::io::Error::last_os_error());
    }
    if first > 0 {
        let mut status: libc::c_int = 0;
        unsafe { libc::waitpid(first, &mut status, 0) };
        return Ok(());
    }

    // First child: new session, then fork again so the daemon can never
    // reacquire a controlling terminal
    if unsafe { libc::setsid() } == -1 {
        std::process::exit(1);
    }
    match unsafe { libc::fork() } {
        -1 => std::process::exit(1),
        0 => {}
        _ => std::process::exit(0),
    }

    detach_stdio();
    let _ = std::env::set_current_dir("/");

    let code = match run_foreground(config) {
        Ok(()) => 0,
        Err(e) => {
            let _ = fs::write(ERROR_LOG, format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}

/// Run the daemon in the foreground
pub fn run_foreground(config: Config) -> Result<()> {
    GatewayServer::new(config).run()
}

/// Signal the daemon recorded in the pid file, escalating to `SIGKILL`.
///
/// Returns `false` when no pid file exists.
pub fn stop_daemon() -> Result<bool> {
    let Some(pid) = read_pid() else {
        remove_runtime_files();
        return Ok(false);
    };

    if unsafe { libc::kill(pid, libc::SIGTERM) } == 0 {
        let stopped = wait_for_exit(pid, STOP_GRACE);
        if !stopped {
            warn!(pid, "daemon ignored SIGTERM, sending SIGKILL");
            unsafe { libc::kill(pid, libc::SIGKILL) };
        }
    }

    remove_runtime_files();
    Ok(true)
}

/// Poll until `pid` is gone or `grace` runs out
fn wait_for_exit(pid: i32, grace: Duration) -> bool {
    let step = Duration::from_millis(100);
    let mut waited = Duration::ZERO;
    while waited < grace {
        if !process_alive(pid) {
            return true;
        }
        thread::sleep(step);
        waited += step;
    }
    !process_alive(pid)
}
