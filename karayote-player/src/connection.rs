use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use log::{debug, trace};
use tungstenite::{Message, WebSocket};
use url::Url;

use crate::{PlayerConfig, PlayerError};

/// A single use connection to the player.
///
/// The player hands out stale data on a reused connection, so every request
/// gets a fresh one that is closed afterwards.
pub(crate) struct Connection {
    socket: WebSocket<TcpStream>,
}

impl Connection {
    pub fn open(config: &PlayerConfig) -> Result<Self, PlayerError> {
        let url = Url::parse(&config.address)
            .map_err(|e| PlayerError::Connection(format!("invalid address {}: {}", config.address, e)))?;
        let address = socket_address(&url)?;

        let stream = TcpStream::connect_timeout(&address, config.connect_timeout())?;
        stream.set_read_timeout(Some(config.read_timeout()))?;
        stream.set_write_timeout(Some(config.read_timeout()))?;
        stream.set_nodelay(true)?;

        let (socket, _) = tungstenite::client(url.as_str(), stream)?;

        Ok(Self { socket })
    }

    /// Reads and discards the message the player sends when a connection opens
    pub fn drain(&mut self) -> Result<(), PlayerError> {
        let stale = self.read_text()?;
        trace!("Discarded {} stale bytes", stale.len());

        Ok(())
    }

    /// Sends a message and waits for the complete answer
    pub fn request(&mut self, message: &str) -> Result<String, PlayerError> {
        self.socket.send(Message::Text(message.to_string()))?;
        self.read_text()
    }

    fn read_text(&mut self) -> Result<String, PlayerError> {
        loop {
            match self.socket.read()? {
                Message::Text(text) => return Ok(text),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes)
                        .map_err(|e| PlayerError::MalformedResponse(e.to_string()))
                }
                Message::Close(_) => {
                    return Err(PlayerError::Connection(
                        "the player closed the connection".to_string(),
                    ))
                }
                // Pings are answered by the socket itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    /// Closes the connection, waiting for the player to acknowledge it
    pub fn close(mut self) {
        if self.socket.close(None).is_err() {
            return;
        }

        // The socket reports an error once the close handshake is done
        while self.socket.read().is_ok() {}
    }
}

/// Runs a whole request on a fresh connection
pub(crate) fn request(config: &PlayerConfig, message: &str) -> Result<String, PlayerError> {
    let mut connection = Connection::open(config)?;

    if config.drain_on_connect {
        connection.drain()?;
    }

    debug!("Sending {}", message);
    let response = connection.request(message);
    connection.close();

    response
}

fn socket_address(url: &Url) -> Result<SocketAddr, PlayerError> {
    let host = url
        .host_str()
        .ok_or_else(|| PlayerError::Connection(format!("{} has no host", url)))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| PlayerError::Connection(format!("{} has no port", url)))?;

    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| PlayerError::Connection(format!("{} did not resolve", host)))
}
