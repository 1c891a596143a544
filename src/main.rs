use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_kira_audio::AudioPlugin;
use quill_dialogue::plugins::core::DialoguePlugin;
use quill_dialogue::plugins::demo_ui::DemoUiPlugin;
use quill_dialogue::plugins::input::DialogueInputPlugin;

fn main() {
    App::new()
        // Audio goes through kira; bevy's own audio plugin would claim the same formats.
        .add_plugins(DefaultPlugins.build().disable::<bevy::audio::AudioPlugin>())
        .add_plugins(AudioPlugin)
        .add_plugins(EguiPlugin)
        .add_plugins(DialogueInputPlugin)
        .add_plugins(DialoguePlugin::default())
        .add_plugins(DemoUiPlugin)
        .run();
}
