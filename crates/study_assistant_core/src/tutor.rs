//! crates/study_assistant_core/src/tutor.rs
//!
//! Per-session tutoring context. Each session owns its notes and its chat
//! history; nothing is shared between sessions.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::{ChatHistory, ConversationTurn, ExtractedText};
use crate::ports::{CompletionService, PortResult};
use crate::prompts::PromptBuilder;

#[derive(Debug, Clone)]
pub struct TutorSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    notes: Option<ExtractedText>,
    history: ChatHistory,
}

impl TutorSession {
    /// Starts a session whose history holds only the tutor's system turn.
    pub fn new(prompts: &PromptBuilder) -> Self {
        let mut history = ChatHistory::new();
        history.push(prompts.tutor_seed_turn());
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            notes: None,
            history,
        }
    }

    /// Replaces the study notes used as context for later replies.
    pub fn attach_notes(&mut self, notes: ExtractedText) {
        self.notes = Some(notes);
    }

    pub fn notes(&self) -> Option<&ExtractedText> {
        self.notes.as_ref()
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Sends `message` with the session's context and records the exchange.
    ///
    /// The user and assistant turns are appended together, only after the
    /// completion succeeds, so a failed call leaves the history untouched.
    pub async fn ask(
        &mut self,
        prompts: &PromptBuilder,
        completion: &dyn CompletionService,
        message: &str,
    ) -> PortResult<String> {
        let messages = prompts.chat_messages(self.notes.as_ref(), &self.history, message);
        let reply = completion.complete(&messages).await?;

        self.history.push(ConversationTurn::user(message));
        self.history.push(ConversationTurn::assistant(reply.clone()));
        info!(
            "Session {} now holds {} turn(s)",
            self.id,
            self.history.len()
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes how many messages it received and remembers the last request.
    #[derive(Default)]
    struct Recorder {
        last: Mutex<Vec<ConversationTurn>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionService for Recorder {
        async fn complete(&self, messages: &[ConversationTurn]) -> PortResult<String> {
            if self.fail {
                return Err(PortError::Generation("endpoint down".to_string()));
            }
            *self.last.lock().unwrap() = messages.to_vec();
            Ok(format!("reply to {} message(s)", messages.len()))
        }
    }

    #[tokio::test]
    async fn history_grows_by_two_turns_per_exchange() {
        let prompts = PromptBuilder::default();
        let completion = Recorder::default();
        let mut session = TutorSession::new(&prompts);
        assert_eq!(session.history().len(), 1);

        for k in 1..=3 {
            session
                .ask(&prompts, &completion, &format!("question {}", k))
                .await
                .unwrap();
            assert_eq!(session.history().len(), 1 + 2 * k);
        }

        let roles: Vec<Role> = session.history().turns().iter().map(|t| t.role).collect();
        assert_eq!(roles[0], Role::System);
        assert_eq!(&roles[1..3], &[Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn requests_carry_the_full_prior_conversation() {
        let prompts = PromptBuilder::default();
        let completion = Recorder::default();
        let mut session = TutorSession::new(&prompts);
        session.attach_notes(ExtractedText::new("Plants need light."));

        session.ask(&prompts, &completion, "Why light?").await.unwrap();
        let reply = session.ask(&prompts, &completion, "And water?").await.unwrap();

        // system + (user, assistant) + new user
        assert_eq!(reply, "reply to 4 message(s)");
        let last = completion.last.lock().unwrap();
        assert!(last[0].content.contains("Plants need light."));
        assert_eq!(last[1].content, "Why light?");
        assert_eq!(last[3].content, "And water?");
    }

    #[tokio::test]
    async fn failed_replies_leave_history_untouched() {
        let prompts = PromptBuilder::default();
        let completion = Recorder { fail: true, ..Default::default() };
        let mut session = TutorSession::new(&prompts);

        let err = session.ask(&prompts, &completion, "Hello?").await.unwrap_err();

        assert!(matches!(err, PortError::Generation(_)));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn sessions_do_not_share_history() {
        let prompts = PromptBuilder::default();
        let a = TutorSession::new(&prompts);
        let b = TutorSession::new(&prompts);
        assert_ne!(a.id, b.id);
        assert_eq!(a.history().len(), 1);
        assert_eq!(b.history().len(), 1);
    }
}
