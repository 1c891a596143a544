//! Demo scene UI plugin.
//!
//! Spawns a camera and a dialogue box, and shows one button per demo line.
//! Pressing a button restarts the box with that line.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use leafwing_input_manager::prelude::*;

use crate::components::{DialogueBox, DialogueReveal};
use crate::events::{DialogueFinishedEvent, PlayDialogueEvent, SkipDialogueEvent};
use crate::plugins::input::get_default_input_map;
use crate::resources::RevealConfig;
use crate::systems::dialogue::spawn_dialogue_box;

/// Plugin for the demo scene.
pub struct DemoUiPlugin;

impl Plugin for DemoUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoDialogues>()
            .add_systems(Startup, setup_demo_scene)
            .add_systems(Update, (demo_ui_system, log_finished_dialogues));
    }
}

/// Lines offered by the demo buttons, markup included.
#[derive(Resource, Debug, Clone)]
pub struct DemoDialogues {
    pub lines: Vec<String>,
}

impl Default for DemoDialogues {
    fn default() -> Self {
        Self {
            lines: vec![
                "Ahoy there!<p:short> Welcome aboard the <anim:wave>Salty Gull</anim>.<p:normal> \
                 Mind the rigging."
                    .to_string(),
                "<sp:40>Something is moving<p:tiny>.<p:tiny>.<p:tiny>.<p:long> \
                 <sp:150>It's <anim:shake>THE KRAKEN</anim>!"
                    .to_string(),
                "<sp:25>Listen<p:read> <sp:90>carefully: the treasure lies <anim:wave>beneath the \
                 tides</anim>, past the <anim:shake>cursed</anim> reef."
                    .to_string(),
            ],
        }
    }
}

/// Dialogue box driven by the demo buttons.
#[derive(Resource, Debug)]
pub struct DemoDialogueBox(pub Entity);

fn setup_demo_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<RevealConfig>,
) {
    commands.spawn((
        Camera2d,
        InputManagerBundle::with_map(get_default_input_map()),
    ));

    let dialogue_box = DialogueBox::new(asset_server.load("sounds/typing.ogg"))
        .with_font_size(32.0)
        .with_max_line_width(900.0);
    let entity = spawn_dialogue_box(
        &mut commands,
        dialogue_box,
        &config,
        Transform::from_xyz(-450.0, 100.0, 0.0),
    );
    commands.insert_resource(DemoDialogueBox(entity));
}

/// Renders the demo controls.
fn demo_ui_system(
    mut contexts: EguiContexts,
    dialogues: Res<DemoDialogues>,
    demo_box: Option<Res<DemoDialogueBox>>,
    reveals: Query<&DialogueReveal>,
    mut plays: EventWriter<PlayDialogueEvent>,
    mut skips: EventWriter<SkipDialogueEvent>,
) {
    let Some(demo_box) = demo_box else {
        return;
    };
    let reveal = reveals.get(demo_box.0).ok();

    egui::Window::new("Dialogue")
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
        .resizable(false)
        .collapsible(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                for (i, line) in dialogues.lines.iter().enumerate() {
                    let button = egui::Button::new(
                        egui::RichText::new(format!("Play dialogue {}", i + 1)).size(16.0),
                    )
                    .min_size(egui::vec2(140.0, 32.0));

                    if ui.add(button).clicked() {
                        plays.send(PlayDialogueEvent::new(demo_box.0, line.clone()));
                    }
                }

                let animating = reveal.is_some_and(DialogueReveal::is_animating);
                if ui
                    .add_enabled(animating, egui::Button::new("Skip"))
                    .clicked()
                {
                    skips.send(SkipDialogueEvent {
                        dialogue_box: demo_box.0,
                    });
                }
            });

            if let Some(reveal) = reveal {
                ui.label(
                    egui::RichText::new(format!(
                        "{}/{} characters ({:?})",
                        reveal.revealed(),
                        reveal.char_count(),
                        reveal.phase()
                    ))
                    .small()
                    .color(egui::Color32::GRAY),
                );
            }
        });
}

fn log_finished_dialogues(mut events: EventReader<DialogueFinishedEvent>) {
    for event in events.read() {
        info!(
            "Dialogue {:?} finished on {:?}",
            event.reveal, event.dialogue_box
        );
    }
}
