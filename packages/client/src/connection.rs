//! WebSocket connection speaking the relay's event envelope.

use std::time::Duration;

use futures_util::{
    SinkExt, Stream, StreamExt,
    stream::{SplitSink, SplitStream},
};
use pairlink_server::infrastructure::dto::websocket::{
    InboundEnvelope, OutboundEnvelope, PongPayload, event,
};
use serde_json::Value;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::error::ClientError;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Event received from the server
pub type ServerEvent = OutboundEnvelope<Value>;

/// One client link to the relay
pub struct RelayConnection {
    ws: WsStream,
    next_ack_id: u64,
}

impl RelayConnection {
    /// Connect to a relay WebSocket endpoint such as `ws://localhost:3001/ws`.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _response) = connect_async(url).await?;
        tracing::debug!("Connected to {}", url);
        Ok(Self { ws, next_ack_id: 1 })
    }

    /// Emit a named event.
    pub async fn emit(&mut self, event: &str, data: Value) -> Result<(), ClientError> {
        let frame = encode_frame(event, data, None)?;
        self.ws.send(Message::text(frame)).await?;
        Ok(())
    }

    /// Join a session. The server does not acknowledge joins.
    pub async fn join(&mut self, session_id: &str) -> Result<(), ClientError> {
        self.emit(event::JOIN_SESSION, Value::String(session_id.to_string()))
            .await
    }

    /// Send a ping and wait for the matching pong, skipping other events.
    pub async fn ping(&mut self, wait: Duration) -> Result<PongPayload, ClientError> {
        let ack_id = self.next_ack_id;
        self.next_ack_id += 1;

        let frame = encode_frame(event::PING, Value::Null, Some(ack_id))?;
        self.ws.send(Message::text(frame)).await?;

        loop {
            let reply = self.next_event(wait).await?;
            if reply.event == event::PONG && reply.ack_id == Some(ack_id) {
                return Ok(serde_json::from_value(reply.data)?);
            }
            tracing::debug!("Skipping {} while waiting for pong", reply.event);
        }
    }

    /// Next event from the server within `wait`.
    pub async fn next_event(&mut self, wait: Duration) -> Result<ServerEvent, ClientError> {
        timeout(wait, next_server_event(&mut self.ws))
            .await
            .map_err(|_| ClientError::Timeout("server event".to_string()))?
    }

    /// Close the link with a normal close frame.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.ws.close(None).await?;
        Ok(())
    }

    /// Split into independently usable write and read halves.
    pub fn into_split(self) -> (SplitSink<WsStream, Message>, SplitStream<WsStream>) {
        self.ws.split()
    }
}

/// Serialize an inbound envelope.
pub fn encode_frame(event: &str, data: Value, ack_id: Option<u64>) -> Result<String, ClientError> {
    let envelope = InboundEnvelope {
        event: event.to_string(),
        data,
        ack_id,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Read until the next text frame and decode it.
pub async fn next_server_event<S>(stream: &mut S) -> Result<ServerEvent, ClientError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg) = stream.next().await {
        match msg? {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Close(_) => return Err(ClientError::Closed),
            _ => {}
        }
    }
    Err(ClientError::Closed)
}
