//! Message path: normalize, match against the active snapshot, collect replies.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use chatter_core::EventSink;

use crate::matcher::match_rules;
use crate::store::{RuleStore, Snapshot};

/// Turns incoming chat text into replies using the store's current rules.
///
/// Each call pins one snapshot for its whole duration, so a concurrent reload
/// never mixes rules, mode and delimiter from different generations.
pub struct Responder {
    store: Arc<RuleStore>,
    sink: Arc<dyn EventSink>,
}

impl Responder {
    pub fn new(store: Arc<RuleStore>, sink: Arc<dyn EventSink>) -> Self {
        Self { store, sink }
    }

    /// Responses for `text`, in hit order. Empty means "no reply".
    ///
    /// `chat_id` is only forwarded to the event sink.
    pub fn respond(&self, chat_id: &str, text: &str) -> Vec<String> {
        let snapshot = self.store.snapshot();
        self.answer(&snapshot, chat_id, text)
    }

    /// All responses joined with the snapshot's reply delimiter, or `None`
    /// when nothing matched.
    pub fn reply(&self, chat_id: &str, text: &str) -> Option<String> {
        let snapshot = self.store.snapshot();
        let replies = self.answer(&snapshot, chat_id, text);
        if replies.is_empty() {
            None
        } else {
            Some(replies.join(snapshot.reply_delimiter()))
        }
    }

    fn answer(&self, snapshot: &Snapshot, chat_id: &str, text: &str) -> Vec<String> {
        let start = Instant::now();
        self.sink.message_received(chat_id);

        let normalized = snapshot.normalizer().normalize(text);
        if normalized.is_empty() {
            debug!(chat_id, "message empty after normalization");
            self.sink.no_match();
            self.sink.processing_duration(start.elapsed());
            return Vec::new();
        }

        let hits = match_rules(&normalized, snapshot.rules(), snapshot.mode());
        if hits.is_empty() {
            debug!(chat_id, text = %normalized, "no rule matched");
            self.sink.no_match();
            self.sink.processing_duration(start.elapsed());
            return Vec::new();
        }

        let replies: Vec<String> = hits
            .iter()
            .map(|hit| {
                self.sink.rule_hit(hit.rule_label);
                hit.response.to_string()
            })
            .collect();

        debug!(
            chat_id,
            text = %normalized,
            hits = hits.len(),
            generation = snapshot.generation(),
            "rules matched"
        );
        self.sink.reply_sent();
        self.sink.processing_duration(start.elapsed());
        replies
    }
}
