// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral selection state: which conversation is open in the UI, and
//! the display names of its participants.
//!
//! The participant map is built by the caller from user records it already
//! holds -- this store never fetches anything and nothing here survives a
//! restart.

use std::collections::HashMap;

use shiftswap_core::{ErrorCode, ExchangeError, Observable, SubscriptionId};

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected_conversation_id: Option<String>,
    /// user id -> display name, for rendering the open thread.
    pub selected_participants: HashMap<String, String>,
}

/// In-memory store of the currently open conversation.
pub struct SelectionStore {
    state: Observable<SelectionState>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self {
            state: Observable::default(),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state.get()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&SelectionState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id)
    }

    /// Opens a conversation with a resolved participant-name map.
    ///
    /// Rejects a blank id, an empty map, and blank keys or display names.
    pub fn select_conversation(
        &self,
        conversation_id: &str,
        participants: HashMap<String, String>,
    ) -> Result<(), ExchangeError> {
        let conversation_id = conversation_id.trim();
        if conversation_id.is_empty() {
            return Err(ExchangeError::new(
                ErrorCode::ConversationIdRequired,
                "a conversation id is required",
            ));
        }
        if participants.is_empty()
            || participants
                .iter()
                .any(|(id, name)| id.trim().is_empty() || name.trim().is_empty())
        {
            return Err(ExchangeError::new(
                ErrorCode::SelectionParticipantsInvalid,
                "a non-empty participant name map is required",
            ));
        }

        self.state.patch(|s| {
            s.selected_conversation_id = Some(conversation_id.to_string());
            s.selected_participants = participants.clone();
        });
        Ok(())
    }

    /// Closes the open conversation.
    pub fn clear(&self) {
        self.state.patch(|s| {
            s.selected_conversation_id = None;
            s.selected_participants.clear();
        });
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}
