//! In-memory `ChatApi` mock
//!
//! Tracks per-operation call counts, supports per-operation failure
//! injection and an artificial fetch delay, and models just enough server
//! behavior for the scenarios: id assignment, 1:1 dedup, and receipt
//! storage.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use relay_core::{
    ApiError, ApiResult, Author, Bookmark, BookmarkId, ChatApi, Conversation, ConversationId,
    ConversationOutcome, CreateConversation, Message, MessageId, MessagePage, OutgoingMessage,
    Participant, PinState, PostedMessage, ReactionToggle, ReadReceipt, UserId,
};

#[derive(Default)]
struct Inner {
    messages: Vec<Message>,
    conversations: Vec<Conversation>,
    bookmarks: Vec<Bookmark>,
    receipts: Vec<ReadReceipt>,
    reactions: Vec<(MessageId, String)>,
}

/// Scriptable in-memory chat backend
pub struct MockChatApi {
    inner: Mutex<Inner>,
    caller: Author,
    next_id: AtomicU64,
    mention_count: AtomicU64,
    fetch_delay: Mutex<Option<Duration>>,
    reaction_delay: Mutex<Option<Duration>>,

    pub fetch_calls: AtomicUsize,
    pub post_calls: AtomicUsize,
    pub create_conversation_calls: AtomicUsize,

    fail_fetch: AtomicBool,
    fail_post: AtomicBool,
    fail_reaction: AtomicBool,
    fail_pin: AtomicBool,
    fail_bookmark: AtomicBool,
    fail_mark_read: AtomicBool,
    conflict_create: AtomicBool,
}

impl MockChatApi {
    /// A backend that sees `caller` as the authenticated user
    pub fn new(caller: Author) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            caller,
            next_id: AtomicU64::new(1),
            mention_count: AtomicU64::new(0),
            fetch_delay: Mutex::new(None),
            reaction_delay: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            post_calls: AtomicUsize::new(0),
            create_conversation_calls: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_post: AtomicBool::new(false),
            fail_reaction: AtomicBool::new(false),
            fail_pin: AtomicBool::new(false),
            fail_bookmark: AtomicBool::new(false),
            fail_mark_read: AtomicBool::new(false),
            conflict_create: AtomicBool::new(false),
        }
    }

    /// Preload server-side messages
    pub fn seed_messages(&self, messages: Vec<Message>) {
        self.inner.lock().messages.extend(messages);
    }

    /// Preload server-side conversations
    pub fn seed_conversations(&self, conversations: Vec<Conversation>) {
        self.inner.lock().conversations.extend(conversations);
    }

    /// Every fetch sleeps this long before answering
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = Some(delay);
    }

    /// Every reaction toggle sleeps this long before answering
    pub fn set_reaction_delay(&self, delay: Duration) {
        *self.reaction_delay.lock() = Some(delay);
    }

    pub fn set_mention_count(&self, count: u64) {
        self.mention_count.store(count, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_posts(&self, fail: bool) {
        self.fail_post.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reactions(&self, fail: bool) {
        self.fail_reaction.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pins(&self, fail: bool) {
        self.fail_pin.store(fail, Ordering::SeqCst);
    }

    pub fn fail_bookmarks(&self, fail: bool) {
        self.fail_bookmark.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mark_reads(&self, fail: bool) {
        self.fail_mark_read.store(fail, Ordering::SeqCst);
    }

    /// Duplicate 1:1 creation answers 409 instead of resolving server-side
    pub fn conflict_on_duplicate_create(&self, conflict: bool) {
        self.conflict_create.store(conflict, Ordering::SeqCst);
    }

    fn assign_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn fetch_messages(
        &self,
        conversation: Option<&ConversationId>,
        before: Option<&MessageId>,
        limit: u32,
    ) -> ApiResult<MessagePage> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ApiError::transient("mock fetch failure"));
        }
        // Newest window up to `limit`, cursored by the `before` message id
        let mut window: Vec<Message> = self
            .inner
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id.as_ref() == conversation)
            .cloned()
            .collect();
        window.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(before) = before {
            if let Some(pos) = window.iter().position(|m| m.id == *before) {
                window.truncate(pos);
            }
        }
        let limit = limit as usize;
        let has_more = window.len() > limit;
        let messages = window.split_off(window.len().saturating_sub(limit));
        Ok(MessagePage { messages, has_more })
    }

    async fn post_message(&self, outgoing: &OutgoingMessage) -> ApiResult<PostedMessage> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_post.load(Ordering::SeqCst) {
            return Err(ApiError::transient("mock post failure"));
        }
        let mut message = Message::new(
            MessageId::new(self.assign_id("srv")),
            self.caller.clone(),
            outgoing.body.clone(),
            Utc::now(),
        );
        message.conversation_id = outgoing.conversation_id.clone();
        message.reply_to_id = outgoing.reply_to_id.clone();
        message.attachment = outgoing.attachment.clone();
        message.gif = outgoing.gif.clone();
        message.voice_message = outgoing.voice_message.clone();

        self.inner.lock().messages.push(message.clone());
        Ok(PostedMessage {
            temp_id: outgoing.temp_id.clone(),
            message,
        })
    }

    async fn delete_message(&self, id: &MessageId) -> ApiResult<()> {
        let mut inner = self.inner.lock();
        let before = inner.messages.len();
        inner.messages.retain(|m| m.id != *id);
        if inner.messages.len() == before {
            return Err(ApiError::not_found("Message", id.as_str()));
        }
        Ok(())
    }

    async fn toggle_reaction(&self, id: &MessageId, emoji: &str) -> ApiResult<ReactionToggle> {
        let delay = *self.reaction_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reaction.load(Ordering::SeqCst) {
            return Err(ApiError::transient("mock reaction failure"));
        }
        let mut inner = self.inner.lock();
        let key = (id.clone(), emoji.to_string());
        if let Some(pos) = inner.reactions.iter().position(|r| *r == key) {
            inner.reactions.remove(pos);
            Ok(ReactionToggle { added: false })
        } else {
            inner.reactions.push(key);
            Ok(ReactionToggle { added: true })
        }
    }

    async fn set_pin(&self, _id: &MessageId, pinned: bool) -> ApiResult<Option<PinState>> {
        if self.fail_pin.load(Ordering::SeqCst) {
            return Err(ApiError::transient("mock pin failure"));
        }
        Ok(pinned.then(|| PinState {
            pinned_by: self.caller.id.clone(),
            pinned_at: Utc::now(),
        }))
    }

    async fn create_bookmark(&self, id: &MessageId, note: Option<&str>) -> ApiResult<Bookmark> {
        if self.fail_bookmark.load(Ordering::SeqCst) {
            return Err(ApiError::transient("mock bookmark failure"));
        }
        let bookmark = Bookmark {
            id: BookmarkId::new(self.assign_id("bm")),
            user_id: self.caller.id.clone(),
            message_id: id.clone(),
            note: note.map(ToString::to_string),
            bookmarked_at: Utc::now(),
        };
        self.inner.lock().bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn list_bookmarks(&self) -> ApiResult<Vec<Bookmark>> {
        Ok(self.inner.lock().bookmarks.clone())
    }

    async fn delete_bookmark(&self, id: &BookmarkId) -> ApiResult<()> {
        self.inner.lock().bookmarks.retain(|b| b.id != *id);
        Ok(())
    }

    async fn post_read_receipt(&self, id: &MessageId) -> ApiResult<()> {
        self.inner.lock().receipts.push(ReadReceipt {
            message_id: id.clone(),
            user_id: self.caller.id.clone(),
            read_at: Utc::now(),
        });
        Ok(())
    }

    async fn fetch_read_receipts(&self, id: &MessageId) -> ApiResult<Vec<ReadReceipt>> {
        Ok(self
            .inner
            .lock()
            .receipts
            .iter()
            .filter(|r| r.message_id == *id)
            .cloned()
            .collect())
    }

    async fn list_conversations(&self) -> ApiResult<Vec<Conversation>> {
        Ok(self.inner.lock().conversations.clone())
    }

    async fn create_conversation(
        &self,
        request: &CreateConversation,
    ) -> ApiResult<ConversationOutcome> {
        self.create_conversation_calls.fetch_add(1, Ordering::SeqCst);
        let requested: BTreeSet<UserId> = request.participant_ids.iter().cloned().collect();

        let mut inner = self.inner.lock();
        if !request.is_group {
            if let Some(existing) = inner
                .conversations
                .iter()
                .find(|c| !c.is_group && c.has_participants(&requested))
            {
                if self.conflict_create.load(Ordering::SeqCst) {
                    return Err(ApiError::Conflict(format!(
                        "conversation {} already exists",
                        existing.id
                    )));
                }
                return Ok(ConversationOutcome::Existing(existing.clone()));
            }
        }

        let conversation = Conversation {
            id: ConversationId::new(self.assign_id("conv")),
            participants: request
                .participant_ids
                .iter()
                .map(|id| Participant {
                    id: id.clone(),
                    name: id.as_str().to_string(),
                })
                .collect(),
            is_group: request.is_group,
            name: request.name.clone(),
            last_message: None,
            unread_count: 0,
            updated_at: Utc::now(),
        };
        inner.conversations.push(conversation.clone());
        Ok(ConversationOutcome::Created(conversation))
    }

    async fn mark_conversation_read(&self, id: &ConversationId) -> ApiResult<()> {
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(ApiError::transient("mock mark-read failure"));
        }
        let mut inner = self.inner.lock();
        match inner.conversations.iter_mut().find(|c| c.id == *id) {
            Some(conversation) => {
                conversation.unread_count = 0;
                Ok(())
            }
            None => Err(ApiError::not_found("Conversation", id.as_str())),
        }
    }

    async fn unread_mention_count(&self) -> ApiResult<u64> {
        Ok(self.mention_count.load(Ordering::SeqCst))
    }
}
