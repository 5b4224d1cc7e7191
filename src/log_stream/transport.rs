// Transport for the log stream: a connector that opens connections yielding lines.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::Result;

/// An open log connection.
#[async_trait]
pub trait LogConnection: Send {
    /// Next log line. `None` once the remote side closed the connection.
    async fn next_line(&mut self) -> Option<Result<String>>;

    /// Close from our side.
    async fn close(&mut self);
}

/// Opens log connections to an endpoint.
#[async_trait]
pub trait LogConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn LogConnection>>;
}

/// WebSocket connector; each server text frame is one log line.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

#[async_trait]
impl LogConnector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn LogConnection>> {
        let (socket, _response) = connect_async(url).await?;
        Ok(Box::new(WsConnection { socket }))
    }
}

struct WsConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl LogConnection for WsConnection {
    async fn next_line(&mut self) -> Option<Result<String>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Ok(Message::Close(_)) => return None,
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            tracing::debug!("Log websocket close: {e}");
        }
    }
}
