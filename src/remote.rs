//! Remote control of a running instance.
//!
//! A second, short-lived process invocation sends a one-line textual command
//! over a Unix domain socket and reads back a success/failure token. The
//! client waits with an explicit timeout so a wedged instance can never hang
//! the remote invocation indefinitely.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Success token sent back for a handled command.
pub const TOKEN_OK: &str = "OK";
/// Failure token for unrecognized or rejected commands.
pub const TOKEN_NOK: &str = "NOK";

/// Default bound on the remote round-trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Target of a grab toggle sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabTarget {
    /// Invert every device's grab state
    All,
    /// Toggle the device with this index
    Index(u32),
}

/// Commands understood by a running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    ToggleVisibility,
    Clear,
    ReloadDevices,
    Quit,
    Undo,
    Redo,
    ToggleGrab(GrabTarget),
}

impl RemoteCommand {
    /// Parses one command line. `None` means an unknown command; the server
    /// answers those with [`TOKEN_NOK`] rather than failing.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "toggle-visibility" => Self::ToggleVisibility,
            "clear" => Self::Clear,
            "reload-devices" => Self::ReloadDevices,
            "quit" => Self::Quit,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "toggle-grab" => {
                let target = match words.next() {
                    None | Some("all") => GrabTarget::All,
                    Some(index) => GrabTarget::Index(index.parse().ok()?),
                };
                Self::ToggleGrab(target)
            }
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(command)
    }
}

impl std::fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToggleVisibility => write!(f, "toggle-visibility"),
            Self::Clear => write!(f, "clear"),
            Self::ReloadDevices => write!(f, "reload-devices"),
            Self::Quit => write!(f, "quit"),
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
            Self::ToggleGrab(GrabTarget::All) => write!(f, "toggle-grab all"),
            Self::ToggleGrab(GrabTarget::Index(i)) => write!(f, "toggle-grab {i}"),
        }
    }
}

/// Remote-control failures surfaced to the short-lived client process.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no running instance listening at {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for a reply from the running instance")]
    Timeout,
    #[error("instance rejected the command")]
    Rejected,
    #[error("remote i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves the socket path under `$XDG_RUNTIME_DIR` (fallback `/tmp`).
pub fn socket_path(socket_name: &str) -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(socket_name)
}

/// Sends one command and waits (bounded) for the reply token.
///
/// Returns `Ok(())` on [`TOKEN_OK`]; `RemoteError::Rejected` on anything
/// else; `RemoteError::Timeout` when the instance does not answer within
/// `timeout`.
pub fn send_command(
    path: &Path,
    command: RemoteCommand,
    timeout: Duration,
) -> Result<(), RemoteError> {
    let stream = UnixStream::connect(path).map_err(|source| RemoteError::Connect {
        path: path.to_path_buf(),
        source,
    })?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let mut writer = stream.try_clone()?;
    writeln!(writer, "{command}").map_err(map_timeout)?;

    let mut reply = String::new();
    BufReader::new(stream)
        .read_line(&mut reply)
        .map_err(map_timeout)?;

    if reply.trim() == TOKEN_OK {
        Ok(())
    } else {
        log::debug!("Instance answered '{}'", reply.trim());
        Err(RemoteError::Rejected)
    }
}

fn map_timeout(err: std::io::Error) -> RemoteError {
    match err.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => RemoteError::Timeout,
        _ => RemoteError::Io(err),
    }
}

/// Listening side, owned by the running instance.
///
/// One command per connection; every connection gets a reply token. A
/// malformed command answers [`TOKEN_NOK`] and the loop keeps serving.
pub struct RemoteServer {
    listener: UnixListener,
    path: PathBuf,
}

impl RemoteServer {
    /// Binds the socket, replacing a stale file from a crashed instance.
    pub fn bind(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            log::debug!("Removing stale socket at {}", path.display());
            std::fs::remove_file(path)?;
        }
        let listener = UnixListener::bind(path)
            .map_err(|err| anyhow::anyhow!("Failed to bind {}: {err}", path.display()))?;
        log::info!("Remote control listening at {}", path.display());
        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serves commands until the handler acknowledges a `quit`.
    ///
    /// The handler returns true when the command was applied; its answer
    /// becomes the reply token. Connection-level failures are logged and the
    /// loop keeps serving.
    pub fn run(&self, mut handler: impl FnMut(RemoteCommand) -> bool) -> anyhow::Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log::warn!("Remote accept failed: {err}");
                    continue;
                }
            };
            match self.serve_connection(stream, &mut handler) {
                Ok(Some(RemoteCommand::Quit)) => {
                    log::info!("Quit requested over remote control");
                    return Ok(());
                }
                Ok(_) => {}
                Err(err) => log::warn!("Remote connection failed: {err}"),
            }
        }
        Ok(())
    }

    /// Handles one connection; returns the acknowledged command, if any.
    fn serve_connection(
        &self,
        stream: UnixStream,
        handler: &mut impl FnMut(RemoteCommand) -> bool,
    ) -> anyhow::Result<Option<RemoteCommand>> {
        stream.set_read_timeout(Some(DEFAULT_TIMEOUT))?;
        stream.set_write_timeout(Some(DEFAULT_TIMEOUT))?;

        let mut line = String::new();
        let mut reader = BufReader::new(stream.try_clone()?);
        reader.read_line(&mut line)?;

        let mut writer = stream;
        let Some(command) = RemoteCommand::parse(&line) else {
            log::warn!("Unrecognized remote command: {:?}", line.trim());
            writeln!(writer, "{TOKEN_NOK}")?;
            return Ok(None);
        };

        let handled = handler(command);
        writeln!(writer, "{}", if handled { TOKEN_OK } else { TOKEN_NOK })?;
        Ok(handled.then_some(command))
    }
}

impl Drop for RemoteServer {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            log::debug!("Could not remove socket {}: {err}", self.path.display());
        }
    }
}
