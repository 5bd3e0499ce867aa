//! Local gateway between the messaging platform and the bot core
//!
//! The daemon keeps all datasets in memory for the lifetime of the process
//! and answers updates forwarded by the messaging gateway over a Unix socket.
//!
//! Architecture:
//! - `dbseek daemon`: owns the [`crate::bot::BotContext`], listens on the socket
//! - Client: forwards one update (or a control request) and reads the reply

mod client;
pub mod daemon;
pub mod protocol;

pub use client::{ClientError, GatewayClient};

use std::path::{Path, PathBuf};

/// Get the socket path for the gateway
/// Uses a per-user runtime directory for security
pub fn get_socket_path() -> PathBuf {
    runtime_path("dbseek.sock")
}

/// Get the PID file path for the daemon
pub fn get_pid_path() -> PathBuf {
    runtime_path("dbseek.pid")
}

fn runtime_path(file_name: &str) -> PathBuf {
    // XDG_RUNTIME_DIR first (tmpfs-backed, user only)
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(file_name);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".local").join("run").join(file_name);
    }

    let uid = unsafe { libc::getuid() };
    let (stem, ext) = file_name.split_once('.').unwrap_or((file_name, ""));
    PathBuf::from(format!("/tmp/{}-{}.{}", stem, uid, ext))
}

/// Pid recorded by the running (or crashed) daemon
pub(crate) fn read_pid() -> Option<i32> {
    read_pid_from(&get_pid_path())
}

fn read_pid_from(path: &Path) -> Option<i32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// `kill(pid, 0)` only checks for existence
pub(crate) fn process_alive(pid: i32) -> bool {
    pid > 0 && unsafe { libc::kill(pid, 0) == 0 }
}

/// Check if the daemon is running
pub fn is_daemon_running() -> bool {
    read_pid().is_some_and(process_alive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_pid_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbseek.pid");
        assert_eq!(read_pid_from(&path), None);

        std::fs::write(&path, "4242\n").unwrap();
        assert_eq!(read_pid_from(&path), Some(4242));

        std::fs::write(&path, "not a pid").unwrap();
        assert_eq!(read_pid_from(&path), None);
    }

    #[test]
    fn test_process_alive() {
        assert!(process_alive(std::process::id() as i32));
        assert!(!process_alive(0));
        assert!(!process_alive(-1));
    }
}
