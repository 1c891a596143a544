use bevy::prelude::*;

use crate::components::RevealHandle;

/// Event requesting that a raw (marked-up) line be revealed on a dialogue box.
/// Any reveal already running on that box is replaced.
#[derive(Event, Debug, Clone)]
pub struct PlayDialogueEvent {
    /// The dialogue box entity.
    pub dialogue_box: Entity,
    /// The authored line, markup included.
    pub raw: String,
}

impl PlayDialogueEvent {
    pub fn new(dialogue_box: Entity, raw: impl Into<String>) -> Self {
        Self {
            dialogue_box,
            raw: raw.into(),
        }
    }
}

/// Event requesting that a dialogue box show the rest of its line at once.
#[derive(Event, Debug, Clone, Copy)]
pub struct SkipDialogueEvent {
    /// The dialogue box entity.
    pub dialogue_box: Entity,
}

/// Event emitted once when a reveal finishes, naturally or by skipping.
/// Never emitted for a reveal that was replaced before finishing.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueFinishedEvent {
    /// The dialogue box entity.
    pub dialogue_box: Entity,
    /// The reveal that finished.
    pub reveal: RevealHandle,
}
