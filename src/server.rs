//! TCP server for handling transform connections.
//!
//! Owns the listening socket, selects the operation at startup, and serves
//! exactly one connection at a time: read a fixed-length request frame,
//! apply the transform, write the response, close.

use crate::config::Config;
use crate::ops::{self, OperationError, OperationKind};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Listen backlog for the OS accept queue. Connections beyond the one in
/// flight wait here; there is no queueing policy of our own.
const LISTEN_BACKLOG: i32 = 1024;

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Server { config }
    }

    /// Bind the listener, select the operation, and serve forever.
    ///
    /// The operation is resolved after the bind so that a bad token tears
    /// down a live listening socket: on selection failure the listener is
    /// dropped and the error is returned without a single accept. Once the
    /// loop starts, only process termination ends it; per-connection
    /// failures are logged and the next connection is accepted.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr: SocketAddr = self.config.listen.parse()?;
        let listener = create_listener(addr)?;
        info!(address = %self.config.listen, "Server listening");

        let operation = match ops::select(self.config.operation.as_deref()) {
            Ok(operation) => operation,
            Err(e) => {
                error!(error = %e, "Refusing to serve");
                drop(listener);
                return Err(e.into());
            }
        };

        info!(
            operation = operation.token(),
            input_len = operation.input_len(),
            "Operation selected"
        );

        // Strictly sequential: the next accept happens only after the
        // current connection is fully handled and closed.
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "New connection");

                    match handle_connection(stream, operation) {
                        Ok(written) => debug!(bytes = written, "Connection closed"),
                        Err(e) => warn!(error = %e, "Connection error"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Handle a single client connection.
///
/// Reads exactly the operation's declared frame length, applies the
/// transform, writes the whole response, and returns the bytes written.
/// The stream drops on every exit path, closing the connection. Surplus
/// bytes beyond the frame are never read; their fate is unspecified.
fn handle_connection(
    mut stream: TcpStream,
    operation: OperationKind,
) -> Result<usize, HandlingError> {
    let mut request = vec![0u8; operation.input_len()];
    read_frame(&mut stream, &mut request)?;

    let response = operation.transform(&request)?;

    stream.write_all(&response)?;
    stream.flush()?;

    Ok(response.len())
}

/// Fill `buf` from the stream, erroring if the stream ends first.
fn read_frame(stream: &mut TcpStream, buf: &mut [u8]) -> Result<(), HandlingError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(HandlingError::TruncatedInput {
                expected: buf.len(),
                got: filled,
            });
        }
        filled += n;
    }
    Ok(())
}

/// Create a blocking TCP listener with address reuse.
fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}

/// Per-connection handling errors.
///
/// All of these are scoped to one connection: the accept loop logs them
/// and moves on. The client sees a closed connection with no response.
#[derive(Debug)]
pub enum HandlingError {
    /// The client closed the stream before the full frame arrived.
    TruncatedInput { expected: usize, got: usize },
    /// The selected operation rejected the request frame.
    Operation(OperationError),
    /// Read or write failure on the connection.
    Io(io::Error),
}

impl std::fmt::Display for HandlingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlingError::TruncatedInput { expected, got } => {
                write!(f, "Truncated request: expected {} bytes, got {}", expected, got)
            }
            HandlingError::Operation(e) => write!(f, "Operation failed: {}", e),
            HandlingError::Io(e) => write!(f, "Connection I/O error: {}", e),
        }
    }
}

impl std::error::Error for HandlingError {}

impl From<OperationError> for HandlingError {
    fn from(e: OperationError) -> Self {
        HandlingError::Operation(e)
    }
}

impl From<io::Error> for HandlingError {
    fn from(e: io::Error) -> Self {
        HandlingError::Io(e)
    }
}
