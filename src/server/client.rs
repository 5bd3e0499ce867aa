//! Client for forwarding updates to the gateway daemon

use crate::bot::{StatusSnapshot, Update};
use crate::server::get_socket_path;
use crate::server::protocol::{read_message, write_message, Request, Response};
use std::io::{BufReader, BufWriter};
use std::os::unix::net::UnixStream;
use std::time::Duration;
use thiserror::Error;

/// Read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Gateway daemon is not running")]
    NotRunning,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid response from server")]
    InvalidResponse,
}

/// Client for the gateway daemon
pub struct GatewayClient {
    reader: BufReader<UnixStream>,
    writer: BufWriter<UnixStream>,
}

impl GatewayClient {
    /// Try to connect to the running daemon
    pub fn connect() -> ClientResult<Self> {
        let socket_path = get_socket_path();
        if !socket_path.exists() {
            return Err(ClientError::NotRunning);
        }

        let stream = UnixStream::connect(&socket_path).map_err(|_| ClientError::NotRunning)?;
        let _ = stream.set_read_timeout(Some(IO_TIMEOUT));
        let _ = stream.set_write_timeout(Some(IO_TIMEOUT));

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    fn roundtrip(&mut self, request: &Request) -> ClientResult<Response> {
        write_message(&mut self.writer, request)?;
        match read_message(&mut self.reader)? {
            Response::Error { message } => Err(ClientError::Server(message)),
            response => Ok(response),
        }
    }

    /// Forward one update and return the reply text
    pub fn dispatch(&mut self, token: &str, update: Update) -> ClientResult<String> {
        let request = Request::Dispatch {
            token: token.to_string(),
            update,
        };

        match self.roundtrip(&request)? {
            Response::Reply { text } => Ok(text),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn status(&mut self) -> ClientResult<StatusSnapshot> {
        match self.roundtrip(&Request::Status)? {
            Response::Status(status) => Ok(status),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Request graceful shutdown
    pub fn shutdown(&mut self) -> ClientResult<()> {
        match self.roundtrip(&Request::Shutdown)? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn ping(&mut self) -> ClientResult<()> {
        match self.roundtrip(&Request::Ping)? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::InvalidResponse),
        }
    }
}
