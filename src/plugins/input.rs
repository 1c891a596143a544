use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::components::DialogueBox;
use crate::events::SkipDialogueEvent;
use crate::systems::dialogue::skip_dialogues;

#[derive(Actionlike, PartialEq, Eq, Clone, Copy, Hash, Debug, Reflect)]
pub enum DialogueAction {
    Skip,
}

pub struct DialogueInputPlugin;

impl Plugin for DialogueInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DialogueAction>::default())
            .add_systems(Update, skip_input_systems());
    }
}

/// Skip input handling, ordered so a key press skips on the same frame.
pub fn skip_input_systems() -> impl IntoSystemConfigs<()> {
    skip_on_input.before(skip_dialogues)
}

pub fn get_default_input_map() -> InputMap<DialogueAction> {
    let mut input_map = InputMap::default();

    input_map.insert(DialogueAction::Skip, KeyCode::Space);
    input_map.insert(DialogueAction::Skip, KeyCode::Enter);

    input_map
}

/// Sends a skip request to every dialogue box when the skip action is pressed.
fn skip_on_input(
    actions: Query<&ActionState<DialogueAction>>,
    boxes: Query<Entity, With<DialogueBox>>,
    mut skips: EventWriter<SkipDialogueEvent>,
) {
    if !actions
        .iter()
        .any(|action_state| action_state.just_pressed(&DialogueAction::Skip))
    {
        return;
    }

    for dialogue_box in &boxes {
        skips.send(SkipDialogueEvent { dialogue_box });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{DialogueReveal, TypingSoundSink};
    use crate::resources::RevealConfig;

    struct Silent;

    impl TypingSoundSink for Silent {
        fn play_from_next(&mut self, _clip: &Handle<bevy_kira_audio::AudioSource>) {}
    }

    #[test]
    fn test_skip_press_lands_on_the_same_frame() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_event::<SkipDialogueEvent>();
        app.add_systems(Update, (skip_dialogues, skip_input_systems()));

        let mut reveal = DialogueReveal::new(RevealConfig::default());
        reveal.begin("Skip me please", Vec::new(), Handle::default());
        reveal.tick(0.0, &mut Silent);
        let dialogue_box = app
            .world_mut()
            .spawn((DialogueBox::new(Handle::default()), reveal))
            .id();

        let mut action_state = ActionState::<DialogueAction>::default();
        action_state.press(&DialogueAction::Skip);
        app.world_mut().spawn(action_state);
        app.update();

        let mut reveal = app
            .world_mut()
            .get_mut::<DialogueReveal>(dialogue_box)
            .expect("reveal");
        assert!(reveal.tick(0.001, &mut Silent).is_some());
        assert_eq!(reveal.revealed(), reveal.char_count());
    }
}
