use std::io::{self, Read, Write};

use thiserror::Error;
use tungstenite::handshake::{client::ClientHandshake, HandshakeError};

/// Ways talking to the player can fail. None of these stop the client.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("The player did not answer in time")]
    Timeout,

    #[error("The player refused the connection, is it running?")]
    ConnectionRefused,

    #[error("Connection to the player failed: {0}")]
    Connection(String),

    #[error("The player sent something we don't understand: {0}")]
    MalformedResponse(String),

    #[error("The player client is stopped")]
    Stopped,
}

impl PlayerError {
    /// Whether the player could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionRefused | Self::Connection(_)
        )
    }
}

impl From<io::Error> for PlayerError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            _ => Self::Connection(error.to_string()),
        }
    }
}

impl From<tungstenite::Error> for PlayerError {
    fn from(error: tungstenite::Error) -> Self {
        match error {
            tungstenite::Error::Io(error) => error.into(),
            error => Self::Connection(error.to_string()),
        }
    }
}

impl<S> From<HandshakeError<ClientHandshake<S>>> for PlayerError
where
    S: Read + Write,
{
    fn from(error: HandshakeError<ClientHandshake<S>>) -> Self {
        match error {
            HandshakeError::Failure(error) => error.into(),
            // Only happens when the socket would block, which means the read timed out
            HandshakeError::Interrupted(_) => Self::Timeout,
        }
    }
}

impl From<quick_xml::Error> for PlayerError {
    fn from(error: quick_xml::Error) -> Self {
        Self::MalformedResponse(error.to_string())
    }
}
