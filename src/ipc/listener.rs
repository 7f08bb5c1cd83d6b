//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Command`].
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"action":"focus-next"}
//! {"action":"tile-all","window":"0x55d0a1"}
//! "cascade-active-app"
//! ```
//!
//! A key binding can therefore be as small as
//! `echo '"focus-next"' | socat - UNIX-CONNECT:$XDG_RUNTIME_DIR/hyprarrange.sock`.

use crate::action::Command;
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.  The socket file is removed when the listener is dropped.
pub struct UnixSocketListener {
    path: PathBuf,
    bound: bool,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a connection stopped being read.
enum ConnectionEnd {
    /// The client hung up (or the stream failed); accept the next one.
    Closed,
    /// The receiving side of the sink is gone; stop listening.
    SinkClosed,
}

impl UnixSocketListener {
    /// Create a new listener for `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            bound: false,
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse one line of input.  Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<Result<Command, UnixSocketError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str::<Command>(line).map_err(UnixSocketError::from))
}

/// Forward every command on `stream` into `sink`.
fn serve_connection(stream: UnixStream, sink: &mpsc::Sender<Command>) -> ConnectionEnd {
    for line in BufReader::new(stream).lines() {
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                error!("read error: {}", e);
                break;
            }
        };
        match parse_line(&text) {
            None => continue,
            Some(Ok(cmd)) => {
                debug!("received {:?}", cmd);
                if sink.send(cmd).is_err() {
                    return ConnectionEnd::SinkClosed;
                }
            }
            Some(Err(e)) => error!("bad command: {} ({})", text, e),
        }
    }
    ConnectionEnd::Closed
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the command sink is closed.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        self.bound = true;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    match serve_connection(stream, &sink) {
                        ConnectionEnd::Closed => debug!("client disconnected"),
                        ConnectionEnd::SinkClosed => {
                            info!("sink closed, shutting down");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

impl Drop for UnixSocketListener {
    fn drop(&mut self) {
        if self.bound {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

//  Tests
