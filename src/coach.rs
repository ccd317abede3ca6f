//! Coaching flavor text.
//!
//! The coach is an external text-generation collaborator. The game loop never
//! waits on it: the session emits events, [`CoachRequest::from_event`] turns
//! the interesting ones into requests, and the [`CoachNotifier`] answers each
//! on its own tokio task. Every failure collapses into a fixed neutral line.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::CoachConfig;
use crate::entities::{CoachMessage, EndReason, GameStats, Sentiment};
use crate::error::CoachError;
use crate::session::GameEvent;

/// Shown whenever the provider fails, times out or answers garbage.
pub const FALLBACK_TEXT: &str = "Tactical uplink lost. Carry on.";

const REQUEST_QUEUE: usize = 16;

// ── Requests & replies ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoachTrigger {
    Milestone,
    SessionEnd,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoachRequest {
    /// Session generation the answer belongs to.
    pub generation: u64,
    pub stats: GameStats,
    pub targets_attempted: u32,
    /// Prefixed to the answer.
    pub reason: Option<EndReason>,
    pub trigger: CoachTrigger,
}

impl CoachRequest {
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::MilestoneReached {
                generation,
                stats,
                targets_attempted,
            } => Some(CoachRequest {
                generation: *generation,
                stats: stats.clone(),
                targets_attempted: *targets_attempted,
                reason: None,
                trigger: CoachTrigger::Milestone,
            }),
            GameEvent::SessionEnded {
                generation,
                reason,
                stats,
                targets_attempted,
                ..
            } => Some(CoachRequest {
                generation: *generation,
                stats: stats.clone(),
                targets_attempted: *targets_attempted,
                reason: *reason,
                trigger: CoachTrigger::SessionEnd,
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoachReply {
    pub generation: u64,
    /// What asked for this line; replies can land in any order.
    pub trigger: CoachTrigger,
    pub message: CoachMessage,
}

// ── Providers ─────────────────────────────────────────────────────────────────

#[async_trait]
pub trait CoachProvider: Send + Sync {
    async fn feedback(
        &self,
        stats: &GameStats,
        targets_attempted: u32,
    ) -> Result<CoachMessage, CoachError>;
}

pub fn build_prompt(stats: &GameStats, targets_attempted: u32) -> String {
    format!(
        "You are a slightly sarcastic but professional AI aim coach in a neon arcade. \
         Session stats: score {}, hits {}, accuracy {:.1}%, max combo {}, targets attempted {}. \
         Reply with one short sentence. Be impressed by strong stats; be motivating or sarcastic otherwise.",
        stats.score, stats.hits, stats.accuracy, stats.max_combo, targets_attempted
    )
}

#[derive(Serialize)]
struct FeedbackPayload<'a> {
    prompt: String,
    stats: &'a GameStats,
    targets_attempted: u32,
}

/// JSON-over-HTTP text generator answering `{ "text", "sentiment" }`.
pub struct HttpCoach {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpCoach {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, CoachError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpCoach {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl CoachProvider for HttpCoach {
    async fn feedback(
        &self,
        stats: &GameStats,
        targets_attempted: u32,
    ) -> Result<CoachMessage, CoachError> {
        let payload = FeedbackPayload {
            prompt: build_prompt(stats, targets_attempted),
            stats,
            targets_attempted,
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoachError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Offline coach that picks a canned line from the stats.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptedCoach;

impl ScriptedCoach {
    pub fn line_for(stats: &GameStats) -> CoachMessage {
        let (text, sentiment) = if stats.bomb_hits >= 3 {
            ("Stop hugging the bombs. They are not friendly.", Sentiment::Negative)
        } else if stats.hits >= 10 && stats.accuracy >= 90.0 {
            ("Surgical. The grid is filing a complaint.", Sentiment::Positive)
        } else if stats.max_combo >= 15 {
            ("That chain was clean. Keep the rhythm.", Sentiment::Positive)
        } else if stats.misses > 0 && stats.accuracy < 50.0 {
            ("Bold strategy, shooting the empty space.", Sentiment::Sarcastic)
        } else {
            ("Scanning your vitals. Keep firing.", Sentiment::Neutral)
        };
        CoachMessage {
            text: text.to_string(),
            sentiment,
        }
    }
}

#[async_trait]
impl CoachProvider for ScriptedCoach {
    async fn feedback(
        &self,
        stats: &GameStats,
        _targets_attempted: u32,
    ) -> Result<CoachMessage, CoachError> {
        Ok(ScriptedCoach::line_for(stats))
    }
}

/// HTTP coach when an endpoint is configured, scripted lines otherwise.
pub fn provider_from_config(config: &CoachConfig) -> Arc<dyn CoachProvider> {
    let Some(endpoint) = &config.endpoint else {
        return Arc::new(ScriptedCoach);
    };
    match HttpCoach::new(
        endpoint.clone(),
        config.api_key.clone(),
        Duration::from_millis(config.timeout_ms),
    ) {
        Ok(coach) => {
            tracing::info!("Coach endpoint: {}", endpoint);
            Arc::new(coach)
        }
        Err(e) => {
            tracing::warn!("HTTP coach unavailable ({}), using scripted lines", e);
            Arc::new(ScriptedCoach)
        }
    }
}

// ── Boundary ──────────────────────────────────────────────────────────────────

/// Ask `provider` for a line. Never fails: errors and timeouts become the
/// neutral fallback. An end-of-session reason is prefixed to whatever comes back.
pub async fn request_feedback(
    provider: &dyn CoachProvider,
    request: &CoachRequest,
    timeout: Duration,
) -> CoachMessage {
    let answer = tokio::time::timeout(
        timeout,
        provider.feedback(&request.stats, request.targets_attempted),
    )
    .await;

    let message = match answer {
        Ok(Ok(message)) => message,
        Ok(Err(e)) => {
            tracing::warn!("Coach request failed: {}", e);
            CoachMessage::neutral(FALLBACK_TEXT)
        }
        Err(_) => {
            tracing::warn!("{}", CoachError::Timeout(timeout.as_millis() as u64));
            CoachMessage::neutral(FALLBACK_TEXT)
        }
    };

    match request.reason {
        Some(reason) => CoachMessage {
            text: format!("{} {}", reason.message(), message.text),
            ..message
        },
        None => message,
    }
}

// ── Notifier task ─────────────────────────────────────────────────────────────

/// Fire-and-forget front end to a provider running on a tokio runtime.
pub struct CoachNotifier {
    requests: mpsc::Sender<CoachRequest>,
    replies: mpsc::Receiver<CoachReply>,
}

impl CoachNotifier {
    pub fn spawn(handle: &Handle, provider: Arc<dyn CoachProvider>, timeout: Duration) -> Self {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_QUEUE);
        let (reply_tx, reply_rx) = mpsc::channel(REQUEST_QUEUE);
        let _task = handle.spawn(dispatch(provider, timeout, request_rx, reply_tx));

        CoachNotifier {
            requests: request_tx,
            replies: reply_rx,
        }
    }

    /// Queue a request without blocking. Returns `false` if it was dropped.
    pub fn submit(&self, request: CoachRequest) -> bool {
        match self.requests.try_send(request) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Coach request dropped: {}", e);
                false
            }
        }
    }

    /// Forward every coach-worthy event in `events`.
    pub fn submit_events(&self, events: &[GameEvent]) {
        for request in events.iter().filter_map(CoachRequest::from_event) {
            let _ = self.submit(request);
        }
    }

    pub fn try_recv(&mut self) -> Option<CoachReply> {
        self.replies.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<CoachReply> {
        self.replies.recv().await
    }
}

async fn dispatch(
    provider: Arc<dyn CoachProvider>,
    timeout: Duration,
    mut requests: mpsc::Receiver<CoachRequest>,
    replies: mpsc::Sender<CoachReply>,
) {
    while let Some(request) = requests.recv().await {
        let provider = Arc::clone(&provider);
        let replies = replies.clone();
        tokio::spawn(async move {
            let message = request_feedback(provider.as_ref(), &request, timeout).await;
            let reply = CoachReply {
                generation: request.generation,
                trigger: request.trigger,
                message,
            };
            if replies.send(reply).await.is_err() {
                tracing::trace!("Coach reply dropped: receiver closed");
            }
        });
    }
    tracing::debug!("Coach notifier stopped");
}
