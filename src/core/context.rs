//! Context construction and the per-context message sequence.
//!
//! A context starts with a run of `system` framing messages built from the
//! active scenario. That prefix is the context's floor: conversation edits
//! (undo, retry) only ever touch messages appended after it.

use crate::core::message::{Message, Role};
use crate::core::scenario::Scenario;

pub const NARRATOR_PERSONALITY_TEMPLATE: &str = "You're a narrator {personality}.";

/// Narrator personality and world-building framing. Empty fields produce no message.
pub fn world_framing(scenario: &Scenario) -> Vec<Message> {
    let mut messages = Vec::new();
    if !scenario.narrator_personality.is_empty() {
        messages.push(Message::system(narrator_personality(
            &scenario.narrator_personality,
        )));
    }
    if !scenario.world_building.is_empty() {
        messages.push(Message::system(scenario.world_building.clone()));
    }
    messages
}

/// Dungeon-room framing followed by optional free-text room detail.
pub fn dungeon_framing(scenario: &Scenario, extra_text: &str) -> Vec<Message> {
    let mut messages = Vec::new();
    if !scenario.dungeon_room_building.is_empty() {
        messages.push(Message::system(scenario.dungeon_room_building.clone()));
    }
    if !extra_text.is_empty() {
        messages.push(Message::system(extra_text.to_string()));
    }
    messages
}

fn narrator_personality(personality: &str) -> String {
    NARRATOR_PERSONALITY_TEMPLATE.replace("{personality}", personality)
}

/// Build a fresh context for a new dungeon or room. Both kinds go through the
/// same concatenation of world and dungeon framing; `is_dungeon` is recorded
/// as given.
pub fn build_context(scenario: &Scenario, is_dungeon: bool, extra_text: &str) -> Context {
    let mut messages = world_framing(scenario);
    messages.extend(dungeon_framing(scenario, extra_text));
    Context::with_framing(is_dungeon, messages)
}

/// One continuous conversational thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    is_dungeon: bool,
    messages: Vec<Message>,
    floor: usize,
}

impl Context {
    /// Context whose floor covers every message passed in.
    pub fn with_framing(is_dungeon: bool, framing: Vec<Message>) -> Self {
        let floor = framing.len();
        Self {
            is_dungeon,
            messages: framing,
            floor,
        }
    }

    /// The startup context: world framing only, not a dungeon.
    pub fn initial(scenario: &Scenario) -> Self {
        Self::with_framing(false, world_framing(scenario))
    }

    pub fn is_dungeon(&self) -> bool {
        self.is_dungeon
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of framing messages that can never be removed.
    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn framing(&self) -> &[Message] {
        &self.messages[..self.floor]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_role(&self) -> Option<Role> {
        self.last().map(|message| message.role)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop the final message unless that would cut into the framing prefix.
    /// Never fails; returns `None` when nothing was removed.
    pub fn remove_last(&mut self) -> Option<Message> {
        if self.messages.len() <= self.floor {
            return None;
        }
        self.messages.pop()
    }
}
