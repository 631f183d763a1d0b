//! Search and filtering - pure predicate composition over the log
//!
//! Criteria compose by logical AND. The engine is a pure function of its
//! inputs, which makes presets and search-history replay trivial.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relay_core::{Message, UserId};

use crate::reactions::ReactionLedger;

/// AND-composed filter criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Case-insensitive substring match against body or author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    /// Inclusive lower bound on `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_reactions: bool,
    /// Only messages mentioning this user (the requesting viewer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions_user: Option<UserId>,
}

impl SearchCriteria {
    /// Check whether the criteria constrain anything at all
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.author_id.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && !self.has_reactions
            && self.mentions_user.is_none()
    }

    fn matches(&self, message: &Message, reactions: &ReactionLedger) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let in_body = message.body.to_lowercase().contains(&needle);
            let in_author = message.author.name.to_lowercase().contains(&needle);
            if !in_body && !in_author {
                return false;
            }
        }
        if let Some(author_id) = &self.author_id {
            if message.author.id != *author_id {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if message.created_at < *from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if message.created_at > *to {
                return false;
            }
        }
        if self.has_reactions && !reactions.has_any(&message.id) {
            return false;
        }
        if let Some(viewer) = &self.mentions_user {
            if !message.mentions_user(viewer) {
                return false;
            }
        }
        true
    }
}

/// Filter an ordered message sequence; the output preserves input order, and
/// identical inputs always yield identical output
pub fn filter<'a>(
    messages: &'a [Message],
    criteria: &SearchCriteria,
    reactions: &ReactionLedger,
) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| criteria.matches(m, reactions))
        .collect()
}

/// A named, saved filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreset {
    pub name: String,
    pub criteria: SearchCriteria,
}

/// Executed-search history plus saved presets, most recent first
#[derive(Debug)]
pub struct SearchHistory {
    entries: VecDeque<SearchCriteria>,
    capacity: usize,
    presets: Vec<SearchPreset>,
}

impl SearchHistory {
    /// Create a history holding at most `capacity` recent searches
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            presets: Vec::new(),
        }
    }

    /// Record an executed search; consecutive duplicates collapse
    pub fn record(&mut self, criteria: SearchCriteria) {
        if criteria.is_empty() || self.entries.front() == Some(&criteria) {
            return;
        }
        self.entries.push_front(criteria);
        self.entries.truncate(self.capacity);
    }

    /// Recent searches, most recent first
    pub fn recent(&self) -> impl Iterator<Item = &SearchCriteria> {
        self.entries.iter()
    }

    /// Save or overwrite a named preset
    pub fn save_preset(&mut self, name: impl Into<String>, criteria: SearchCriteria) {
        let name = name.into();
        match self.presets.iter_mut().find(|p| p.name == name) {
            Some(preset) => preset.criteria = criteria,
            None => self.presets.push(SearchPreset { name, criteria }),
        }
    }

    /// Look up a preset by name
    pub fn preset(&self, name: &str) -> Option<&SearchCriteria> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.criteria)
    }

    /// Remove a preset by name
    pub fn remove_preset(&mut self, name: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        self.presets.len() < before
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(20)
    }
}
