//! Mention extraction and unread-mention counting
//!
//! `@` followed by a contiguous non-space word is a mention candidate.
//! Candidates are matched case-insensitively against participant display
//! names; unmatched tokens stay literal text. When two participants share a
//! display name, the lowest participant id wins so resolution stays
//! deterministic across refreshes.

use std::collections::{HashMap, HashSet};

use relay_core::{ConversationId, Message, Participant, UserId};

/// Resolve the user ids mentioned in a message body
pub fn extract_mentions(body: &str, participants: &[Participant]) -> Vec<UserId> {
    let mut found = Vec::new();

    for token in mention_tokens(body) {
        let resolved = participants
            .iter()
            .filter(|p| p.name.to_lowercase() == token.to_lowercase())
            .map(|p| &p.id)
            .min();

        if let Some(id) = resolved {
            if !found.contains(id) {
                found.push(id.clone());
            }
        }
    }

    found
}

/// Candidate tokens: the non-space run after each `@`
fn mention_tokens(body: &str) -> impl Iterator<Item = &str> {
    body.split('@')
        .skip(1)
        .filter_map(|rest| rest.split_whitespace().next())
}

/// The context a message belongs to, for badge reset purposes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MentionContext {
    Shoutbox,
    Conversation(ConversationId),
}

impl MentionContext {
    /// Context of a given message
    pub fn of(message: &Message) -> Self {
        match &message.conversation_id {
            Some(id) => Self::Conversation(id.clone()),
            None => Self::Shoutbox,
        }
    }
}

/// Per-viewer unread-mention counter
///
/// Increments once per qualifying message and resets per context when the
/// viewer opens it. Already-counted message ids stay recorded so a reopened
/// context never recounts them.
#[derive(Debug)]
pub struct MentionCounter {
    viewer: UserId,
    counted: HashSet<relay_core::MessageId>,
    per_context: HashMap<MentionContext, u64>,
}

impl MentionCounter {
    /// Create a counter for the local viewer
    pub fn new(viewer: UserId) -> Self {
        Self {
            viewer,
            counted: HashSet::new(),
            per_context: HashMap::new(),
        }
    }

    /// Observe a message; returns true if it incremented the badge
    ///
    /// A message qualifies when it mentions the viewer, was not authored by
    /// the viewer, and has not been counted before.
    pub fn observe(&mut self, message: &Message) -> bool {
        if message.author.id == self.viewer || !message.mentions_user(&self.viewer) {
            return false;
        }
        if !self.counted.insert(message.id.clone()) {
            return false;
        }
        *self.per_context.entry(MentionContext::of(message)).or_default() += 1;
        true
    }

    /// Unread mentions in one context
    pub fn count(&self, context: &MentionContext) -> u64 {
        self.per_context.get(context).copied().unwrap_or(0)
    }

    /// Unread mentions across all contexts
    pub fn total(&self) -> u64 {
        self.per_context.values().sum()
    }

    /// The viewer opened a context; its badge goes to zero
    pub fn reset(&mut self, context: &MentionContext) {
        self.per_context.remove(context);
    }
}
