use bevy::prelude::*;

use crate::events::{DialogueFinishedEvent, PlayDialogueEvent, SkipDialogueEvent};
use crate::resources::{RevealConfig, TypingSoundPool};
use crate::systems::dialogue::{
    apply_glyph_frames, skip_dialogues, start_dialogues, tick_dialogue_reveals,
};

/// Core dialogue plugin: config, sound pool, events and the reveal systems.
///
/// Expects `bevy_kira_audio::AudioPlugin` to be registered by the app.
#[derive(Default)]
pub struct DialoguePlugin {
    /// Config to use instead of the one on disk.
    pub config: Option<RevealConfig>,
}

impl Plugin for DialoguePlugin {
    fn build(&self, app: &mut App) {
        let config = self
            .config
            .clone()
            .unwrap_or_else(RevealConfig::load_from_file);

        app.insert_resource(TypingSoundPool::new(config.sound_pool_size))
            .insert_resource(config)
            .add_event::<PlayDialogueEvent>()
            .add_event::<SkipDialogueEvent>()
            .add_event::<DialogueFinishedEvent>()
            .add_systems(
                Update,
                (
                    start_dialogues,
                    skip_dialogues,
                    tick_dialogue_reveals,
                    apply_glyph_frames,
                )
                    .chain(),
            );
    }
}
