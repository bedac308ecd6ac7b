//! HTTP exchange for the end-to-end smoke test: health polling, chat
//! session creation and a single streamed chat turn.

use std::io::{BufRead, BufReader};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::config::SmokeConfig;
use crate::error::{Result, StackError};

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30);
pub const TURN_TIMEOUT: Duration = Duration::from_secs(60);

pub const SESSION_TITLE: &str = "Smoke Test Chat";
pub const QUESTION: &str = "What is 7 * 5? Response only with the answer.";
pub const EXPECTED_ANSWER: &str = "35";

pub struct SmokeClient {
    agent: ureq::Agent,
    base_url: String,
    assistant_id: String,
}

impl SmokeClient {
    pub fn new(config: &SmokeConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            assistant_id: config.assistant_id.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /health` answered 200.
    pub fn is_healthy(&self) -> bool {
        match self
            .agent
            .get(&self.url("/health"))
            .timeout(HEALTH_TIMEOUT)
            .call()
        {
            Ok(resp) => resp.status() == 200,
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    /// Poll health every `interval` until it answers or `max_wait` elapses.
    pub fn wait_until_healthy(&self, max_wait: Duration, interval: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < max_wait {
            if self.is_healthy() {
                return true;
            }
            thread::sleep(interval);
        }
        false
    }

    /// Create a chat session and return its id.
    pub fn create_session(&self) -> Result<String> {
        let resp = self
            .agent
            .post(&self.url("/chat/sessions"))
            .timeout(SESSION_TIMEOUT)
            .send_json(json!({
                "title": SESSION_TITLE,
                "assistant_id": self.assistant_id,
            }))
            .map_err(|e| http_error("failed to create session", e))?;

        if !matches!(resp.status(), 200 | 201) {
            return Err(StackError::Http(format!(
                "failed to create session: {}",
                resp.status()
            )));
        }

        let body: Value = resp.into_json()?;
        match body.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(StackError::Http(
                "session response did not include an id".to_string(),
            )),
        }
    }

    /// Send the smoke question and collect the streamed answer.
    pub fn send_turn(&self, session_id: &str) -> Result<String> {
        let resp = self
            .agent
            .post(&self.url(&format!("/chat/sessions/{session_id}/turns")))
            .timeout(TURN_TIMEOUT)
            .send_json(json!({ "message": QUESTION }))
            .map_err(|e| http_error("failed to send turn", e))?;

        if resp.status() != 200 {
            return Err(StackError::Http(format!(
                "failed to send turn: {}",
                resp.status()
            )));
        }

        let reader = BufReader::new(resp.into_reader());
        collect_answer(reader)
    }
}

fn http_error(what: &str, err: ureq::Error) -> StackError {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            StackError::Http(format!("{what}: {code} {}", body.trim()))
        }
        ureq::Error::Transport(t) => StackError::Http(format!("{what}: {t}")),
    }
}

/// Accumulate `content` from server-sent `data:` events until `event: Done`.
///
/// Payloads that are not JSON, or have no string `content`, are ignored.
pub fn collect_answer<R: BufRead>(reader: R) -> Result<String> {
    let mut answer = String::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if data.is_empty() {
                continue;
            }
            if let Ok(event) = serde_json::from_str::<Value>(data) {
                if let Some(content) = event.get("content").and_then(Value::as_str) {
                    answer.push_str(content);
                }
            }
        } else if let Some(event) = line.strip_prefix("event:") {
            if event.trim() == "Done" {
                break;
            }
        }
    }
    Ok(answer)
}

pub fn answer_is_correct(answer: &str) -> bool {
    answer.contains(EXPECTED_ANSWER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> SmokeClient {
        SmokeClient::new(&SmokeConfig {
            base_url: format!("{}/api/v1/", server.url()),
            assistant_id: "assistant-1".to_string(),
        })
    }

    #[test]
    fn sse_stream_accumulates_content_until_done() {
        let stream = "event: TurnStarted\n\
                      data: {\"content\": \"3\"}\n\
                      \n\
                      data: not json\n\
                      data: {\"other\": 1}\n\
                      data:{\"content\":\"5\"}\n\
                      event: Done\n\
                      data: {\"content\": \"ignored\"}\n";
        let answer = collect_answer(stream.as_bytes()).unwrap();
        assert_eq!(answer, "35");
        assert!(answer_is_correct(&answer));
    }

    #[test]
    fn wrong_answer_is_detected() {
        let answer = collect_answer("data: {\"content\": \"36\"}\n".as_bytes()).unwrap();
        assert!(!answer_is_correct(&answer));
    }

    #[test]
    fn create_session_posts_title_and_assistant() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v1/chat/sessions")
            .match_body(Matcher::PartialJson(json!({
                "title": "Smoke Test Chat",
                "assistant_id": "assistant-1",
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "sess-9"}"#)
            .create();

        assert_eq!(client(&server).create_session().unwrap(), "sess-9");
        mock.assert();
    }

    #[test]
    fn create_session_rejects_server_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/v1/chat/sessions")
            .with_status(500)
            .with_body("db down")
            .create();

        let err = client(&server).create_session().unwrap_err().to_string();
        assert!(err.contains("500"), "{err}");
        assert!(err.contains("db down"), "{err}");
    }

    #[test]
    fn send_turn_reads_event_stream() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/v1/chat/sessions/sess-9/turns")
            .match_body(Matcher::PartialJson(json!({ "message": QUESTION })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body("data: {\"content\": \"35\"}\n\nevent: Done\n\n")
            .create();

        assert_eq!(client(&server).send_turn("sess-9").unwrap(), "35");
    }

    #[test]
    fn health_reflects_status_code() {
        let mut server = mockito::Server::new();
        let ok = server.mock("GET", "/api/v1/health").with_status(200).create();
        assert!(client(&server).is_healthy());
        ok.remove();

        let _down = server.mock("GET", "/api/v1/health").with_status(503).create();
        assert!(!client(&server).is_healthy());
    }

    #[test]
    fn wait_gives_up_after_deadline() {
        let mut server = mockito::Server::new();
        let _down = server.mock("GET", "/api/v1/health").with_status(503).create();
        let started = Instant::now();
        let ready = client(&server)
            .wait_until_healthy(Duration::from_millis(150), Duration::from_millis(50));
        assert!(!ready);
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
