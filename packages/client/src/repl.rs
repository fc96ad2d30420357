//! Interactive prompt for emitting events by hand.
//!
//! Commands:
//! - `join <sessionId>`
//! - `emit <event> [json]`
//! - `ping`
//! - `quit`

use futures_util::SinkExt;
use pairlink_server::infrastructure::dto::websocket::event;
use rustyline::{DefaultEditor, error::ReadlineError};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    connection::{RelayConnection, encode_frame, next_server_event},
    error::ClientError,
};

/// One parsed prompt line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Join(String),
    Emit { event: String, data: Value },
    Ping,
    Quit,
}

/// Parse a prompt line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ClientError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match name {
        "join" if !rest.is_empty() => Command::Join(rest.to_string()),
        "join" => return Err(ClientError::InvalidCommand("usage: join <sessionId>".to_string())),
        "emit" => {
            let (event, json) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if event.is_empty() {
                return Err(ClientError::InvalidCommand(
                    "usage: emit <event> [json]".to_string(),
                ));
            }
            let data = match json.trim() {
                "" => Value::Null,
                raw => serde_json::from_str(raw)
                    .map_err(|e| ClientError::InvalidCommand(format!("invalid JSON: {e}")))?,
            };
            Command::Emit {
                event: event.to_string(),
                data,
            }
        }
        "ping" => Command::Ping,
        "quit" | "exit" => Command::Quit,
        other => return Err(ClientError::InvalidCommand(format!("unknown command '{other}'"))),
    };
    Ok(Some(command))
}

/// Run the prompt until `quit`, end of input, or the server closing.
pub async fn run_repl(url: &str) -> Result<(), ClientError> {
    let connection = RelayConnection::connect(url).await?;
    println!("Connected to {url}. Commands: join <id> | emit <event> [json] | ping | quit");
    let (mut sink, mut stream) = connection.into_split();

    // rustyline blocks, so it gets its own thread
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let mut editor = DefaultEditor::new()?;
    std::thread::spawn(move || {
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }
    });

    let mut next_ack_id = 1u64;
    loop {
        tokio::select! {
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                let frame = match parse_command(&line) {
                    Ok(None) => continue,
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Join(session_id))) => {
                        encode_frame(event::JOIN_SESSION, Value::String(session_id), None)?
                    }
                    Ok(Some(Command::Emit { event, data })) => encode_frame(&event, data, None)?,
                    Ok(Some(Command::Ping)) => {
                        let ack_id = next_ack_id;
                        next_ack_id += 1;
                        encode_frame(event::PING, Value::Null, Some(ack_id))?
                    }
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                sink.send(Message::text(frame)).await?;
            }
            received = next_server_event(&mut stream) => {
                match received {
                    Ok(server_event) => println!("<- {} {}", server_event.event, server_event.data),
                    Err(ClientError::Closed) => {
                        println!("Disconnected by server");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    let _ = sink.send(Message::Close(None)).await;
    Ok(())
}
