//! Scripted end-to-end check of a running relay.
//!
//! Two connections play the display and the phone of one pairing session.
//! Every application event the phone emits must reach the display with a
//! server timestamp, ping must answer, and closing the phone must produce
//! `client-left` on the display.

use std::time::Duration;

use pairlink_server::{
    domain::RelayEventKind, infrastructure::dto::websocket::event as relay_event,
};
use serde_json::{Value, json};

use crate::{
    connection::{RelayConnection, ServerEvent},
    error::ClientError,
};

/// How long each step waits for the server
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one named check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub error: Option<String>,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated outcome of a smoke run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokeReport {
    pub checks: Vec<CheckResult>,
}

impl SmokeReport {
    fn record(&mut self, name: &str, result: Result<(), ClientError>) {
        match &result {
            Ok(()) => println!("[PASS] {name}"),
            Err(e) => println!("[FAIL] {name}: {e}"),
        }
        self.checks.push(CheckResult {
            name: name.to_string(),
            error: result.err().map(|e| e.to_string()),
        });
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|check| check.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        !self.checks.is_empty() && self.failed() == 0
    }

    /// Success rate in percent
    pub fn success_rate(&self) -> f64 {
        if self.checks.is_empty() {
            return 0.0;
        }
        self.passed() as f64 * 100.0 / self.checks.len() as f64
    }
}

/// Smoke test against one relay endpoint
pub struct SmokeTest {
    url: String,
    session_id: String,
}

impl SmokeTest {
    /// `session_id` defaults to `test-session-<unix millis>`.
    pub fn new(url: impl Into<String>, session_id: Option<String>) -> Self {
        let session_id = session_id.unwrap_or_else(|| {
            format!(
                "test-session-{}",
                pairlink_shared::time::current_timestamp_millis()
            )
        });
        Self {
            url: url.into(),
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Run every check. Connection failures abort the run; failed checks do not.
    pub async fn run(&self) -> Result<SmokeReport, ClientError> {
        println!("Connecting to: {}", self.url);
        println!("Session ID: {}", self.session_id);

        let mut report = SmokeReport::default();
        let mut display = RelayConnection::connect(&self.url).await?;
        let mut phone = RelayConnection::connect(&self.url).await?;

        display.join(&self.session_id).await?;
        display.ping(STEP_TIMEOUT).await?;
        phone.join(&self.session_id).await?;
        phone.ping(STEP_TIMEOUT).await?;

        let joined = self
            .expect(&mut display, relay_event::CLIENT_JOINED)
            .await
            .map(|_| ());
        report.record("Client Joined Notification", joined);

        for kind in RelayEventKind::ALL {
            let result = self.relay_check(&mut phone, &mut display, kind).await;
            report.record(&format!("{} Event", title(kind.as_str())), result);
        }

        let ping = phone.ping(STEP_TIMEOUT).await.and_then(|pong| {
            chrono::DateTime::parse_from_rfc3339(&pong.timestamp)
                .map(|_| println!("Ping response: {} from {}", pong.timestamp, pong.server_id))
                .map_err(|e| ClientError::Unexpected(format!("bad pong timestamp: {e}")))
        });
        report.record("Ping Test", ping);

        phone.close().await?;
        let left = self
            .expect(&mut display, relay_event::CLIENT_LEFT)
            .await
            .map(|_| ());
        report.record("Client Left Notification", left);

        display.close().await?;
        Ok(report)
    }

    async fn relay_check(
        &self,
        phone: &mut RelayConnection,
        display: &mut RelayConnection,
        kind: RelayEventKind,
    ) -> Result<(), ClientError> {
        let payload = sample_payload(kind, &self.session_id);
        phone.emit(kind.as_str(), payload.clone()).await?;

        let received = self.expect(display, kind.as_str()).await?;
        for (key, value) in payload.as_object().into_iter().flatten() {
            if &received.data[key] != value {
                return Err(ClientError::Unexpected(format!(
                    "{} field {key} changed in transit: {}",
                    kind, received.data
                )));
            }
        }
        if !received.data["timestamp"].is_string() {
            return Err(ClientError::Unexpected(format!(
                "{kind} arrived without a timestamp"
            )));
        }
        Ok(())
    }

    async fn expect(
        &self,
        connection: &mut RelayConnection,
        event: &str,
    ) -> Result<ServerEvent, ClientError> {
        let received = connection
            .next_event(STEP_TIMEOUT)
            .await
            .map_err(|e| match e {
                ClientError::Timeout(_) => ClientError::Timeout(event.to_string()),
                other => other,
            })?;
        if received.event != event {
            return Err(ClientError::Unexpected(format!(
                "expected {event}, got {}",
                received.event
            )));
        }
        if received.data["sessionId"] != self.session_id.as_str() {
            return Err(ClientError::Unexpected(format!(
                "{event} for wrong session: {}",
                received.data
            )));
        }
        Ok(received)
    }
}

/// Payloads shaped like the companion app's own messages
pub fn sample_payload(kind: RelayEventKind, session_id: &str) -> Value {
    match kind {
        RelayEventKind::PhoneConnected => json!({ "sessionId": session_id }),
        RelayEventKind::RitualStep => json!({
            "sessionId": session_id,
            "step": "Breathe deeply",
            "stepNumber": 1,
            "totalSteps": 3,
        }),
        RelayEventKind::TimerSelected => json!({
            "sessionId": session_id,
            "timer": "pomodoro",
            "timerName": "Pomodoro (25 min)",
        }),
        RelayEventKind::RitualComplete => json!({
            "sessionId": session_id,
            "timer": "pomodoro",
        }),
        RelayEventKind::FocusSessionStart => json!({
            "sessionId": session_id,
            "duration": 25 * 60 * 1000,
        }),
        RelayEventKind::FocusSessionEnd => json!({ "sessionId": session_id }),
    }
}

/// `ritual-step` -> `Ritual Step`
fn title(event: &str) -> String {
    event
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
