//! Conversation list and creation
//!
//! Holds the viewer's conversation roster, deduplicates 1:1 creation
//! locally before asking the server, and keeps unread counts transactional
//! with the server mark-read call.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use relay_core::{
    ApiError, ChatApi, Conversation, ConversationId, ConversationOutcome, CreateConversation,
    UserId,
};
use relay_store::{MentionContext, StoreError};

use crate::error::SyncResult;
use crate::state::SharedState;

/// The viewer's conversation roster
pub struct ConversationManager {
    api: Arc<dyn ChatApi>,
    state: SharedState,
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
}

impl ConversationManager {
    /// Create an empty roster
    pub fn new(api: Arc<dyn ChatApi>, state: SharedState) -> Self {
        Self {
            api,
            state,
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Current roster, most recently updated first
    pub fn list(&self) -> Vec<Conversation> {
        let mut all: Vec<_> = self.conversations.lock().values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    /// Look up a conversation by id
    pub fn get(&self, id: &ConversationId) -> Option<Conversation> {
        self.conversations.lock().get(id).cloned()
    }

    /// Replace the roster with the server list
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> SyncResult<usize> {
        let incoming = self.api.list_conversations().await?;
        let count = incoming.len();
        let mut roster = self.conversations.lock();
        roster.clear();
        roster.extend(incoming.into_iter().map(|c| (c.id.clone(), c)));
        Ok(count)
    }

    /// Merge server-delivered conversations into the roster; the server copy
    /// is authoritative per id
    pub fn apply_remote(&self, incoming: Vec<Conversation>) {
        let mut roster = self.conversations.lock();
        roster.extend(incoming.into_iter().map(|c| (c.id.clone(), c)));
    }

    /// Create a conversation, or resolve to the existing one
    ///
    /// Validation happens before any network call: at least two distinct
    /// participants, and groups need a non-empty name. For non-group
    /// requests a roster hit on the exact participant set short-circuits the
    /// server round trip.
    #[instrument(skip(self, participant_ids, name))]
    pub async fn create(
        &self,
        participant_ids: Vec<UserId>,
        name: Option<String>,
        is_group: bool,
    ) -> SyncResult<ConversationOutcome> {
        let unique: BTreeSet<UserId> = participant_ids.into_iter().collect();
        if unique.len() < 2 {
            return Err(StoreError::NotEnoughParticipants.into());
        }
        if is_group && name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(StoreError::MissingGroupName.into());
        }

        if !is_group {
            let roster = self.conversations.lock();
            if let Some(existing) = roster
                .values()
                .find(|c| !c.is_group && c.has_participants(&unique))
            {
                info!(id = %existing.id, "duplicate 1:1 resolved locally");
                return Ok(ConversationOutcome::Existing(existing.clone()));
            }
        }

        let request = CreateConversation {
            participant_ids: unique.iter().cloned().collect(),
            name,
            is_group,
        };
        let outcome = match self.api.create_conversation(&request).await {
            Ok(outcome) => outcome,
            // A conflict is a redirect to the existing conversation, not a
            // failure; re-list and resolve it by participant set
            Err(error) if error.is_conflict() && !is_group => {
                self.refresh().await?;
                let roster = self.conversations.lock();
                let existing = roster
                    .values()
                    .find(|c| !c.is_group && c.has_participants(&unique))
                    .cloned()
                    .ok_or(error)?;
                info!(id = %existing.id, "conflict resolved to existing conversation");
                return Ok(ConversationOutcome::Existing(existing));
            }
            Err(error) => return Err(error.into()),
        };

        let conversation = outcome.conversation().clone();
        info!(id = %conversation.id, existing = outcome.is_existing(), "conversation ready");
        self.conversations
            .lock()
            .insert(conversation.id.clone(), conversation);
        Ok(outcome)
    }

    /// Mark a conversation fully read
    ///
    /// The unread count drops to zero optimistically; if the server call
    /// fails it is restored, so the reset is never durable without the
    /// server. The mention badge for the context resets only once the
    /// server confirms, because counted message ids are never re-observed
    /// and a premature reset would lose them for good.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: &ConversationId) -> SyncResult<()> {
        let previous = {
            let mut roster = self.conversations.lock();
            let conversation = roster
                .get_mut(id)
                .ok_or_else(|| ApiError::not_found("Conversation", id.as_str()))?;
            let previous = conversation.unread_count;
            conversation.unread_count = 0;
            previous
        };

        if let Err(error) = self.api.mark_conversation_read(id).await {
            if let Some(conversation) = self.conversations.lock().get_mut(id) {
                conversation.unread_count = previous;
            }
            warn!(%error, "mark-read failed, unread count restored");
            return Err(error.into());
        }

        self.state
            .lock()
            .open_context(&MentionContext::Conversation(id.clone()));
        Ok(())
    }

    /// Total unread messages across the roster
    pub fn unread_total(&self) -> u32 {
        self.conversations
            .lock()
            .values()
            .map(|c| c.unread_count)
            .sum()
    }
}
