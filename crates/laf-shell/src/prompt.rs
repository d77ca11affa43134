//! Modal text prompts
//!
//! Content asks for a line of text and blocks until the user answers. The
//! broker parks whatever the caller needs to reply with (`R`) and shows one
//! prompt at a time; further requests wait in order.

use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(u64);

impl PromptId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for PromptId {
    fn from(value: u64) -> Self {
        PromptId(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptInputType {
    #[default]
    Text,
    Url,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    pub title: String,
    pub label: String,
    pub value: String,
    pub input_type: PromptInputType,
}

impl PromptRequest {
    pub fn text(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label: String::new(),
            value: value.into(),
            input_type: PromptInputType::Text,
        }
    }

    pub fn url(title: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            value: String::new(),
            input_type: PromptInputType::Url,
        }
    }
}

/// How a prompt ended. Cancelling is an ordinary outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Submitted(String),
    Cancelled,
}

#[derive(Serialize)]
struct PromptReplyBody<'a> {
    value: Option<&'a str>,
}

impl PromptOutcome {
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(value) => PromptOutcome::Submitted(value),
            None => PromptOutcome::Cancelled,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            PromptOutcome::Submitted(value) => Some(value),
            PromptOutcome::Cancelled => None,
        }
    }

    /// Body sent back to content: `{"value": "..."}` or `{"value": null}`
    pub fn reply_json(&self) -> String {
        serde_json::to_string(&PromptReplyBody {
            value: self.value(),
        })
        .unwrap_or_else(|_| r#"{"value":null}"#.to_string())
    }
}

struct Pending<R> {
    id: PromptId,
    request: PromptRequest,
    reply: R,
}

pub struct PromptBroker<R> {
    next_id: u64,
    active: Option<Pending<R>>,
    queue: VecDeque<Pending<R>>,
}

impl<R> Default for PromptBroker<R> {
    fn default() -> Self {
        Self {
            next_id: 1,
            active: None,
            queue: VecDeque::new(),
        }
    }
}

impl<R> PromptBroker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a request. It becomes active at once if nothing else is shown.
    pub fn submit(&mut self, request: PromptRequest, reply: R) -> PromptId {
        let id = PromptId(self.next_id);
        self.next_id += 1;

        let pending = Pending { id, request, reply };
        if self.active.is_none() {
            self.active = Some(pending);
        } else {
            log::debug!("Queueing prompt {} behind the active one", id.0);
            self.queue.push_back(pending);
        }
        id
    }

    /// The prompt that should currently be on screen
    pub fn active(&self) -> Option<(PromptId, &PromptRequest)> {
        self.active.as_ref().map(|p| (p.id, &p.request))
    }

    pub fn pending_count(&self) -> usize {
        self.active.iter().count() + self.queue.len()
    }

    /// Finish the active prompt and hand back its reply channel.
    ///
    /// Returns `None` if `id` is not the active prompt. The next queued
    /// prompt becomes active.
    pub fn resolve(&mut self, id: PromptId, outcome: &PromptOutcome) -> Option<R> {
        match &self.active {
            Some(active) if active.id == id => {}
            _ => {
                log::warn!("Ignoring answer for inactive prompt {}", id.0);
                return None;
            }
        }

        log::debug!("Prompt {} resolved: {:?}", id.0, outcome);
        let finished = self.active.take()?;
        self.active = self.queue.pop_front();
        Some(finished.reply)
    }

    /// Drop every prompt, returning their reply channels in order
    pub fn cancel_all(&mut self) -> Vec<R> {
        let mut replies: Vec<R> = self.active.take().into_iter().map(|p| p.reply).collect();
        replies.extend(self.queue.drain(..).map(|p| p.reply));
        replies
    }
}
