//! Dialogue Systems
//!
//! Start, skip, advance and draw dialogue reveals. All timing uses real time
//! so dialogue keeps animating while virtual time is paused.

use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy_kira_audio::{Audio, AudioInstance};

use crate::components::{DialogueBox, DialogueGlyph, DialogueReveal, TypingSoundSink};
use crate::events::{DialogueFinishedEvent, PlayDialogueEvent, SkipDialogueEvent};
use crate::resources::reveal_config::RevealConfig;
use crate::resources::typing_sounds::{PooledTypingSound, TypingSoundPool};
use crate::utils::glyph_layout::layout_glyphs_with_advance;
use crate::utils::markup::parse_markup;

/// Spawns a dialogue box ready to receive `PlayDialogueEvent`s.
pub fn spawn_dialogue_box(
    commands: &mut Commands,
    dialogue_box: DialogueBox,
    config: &RevealConfig,
    transform: Transform,
) -> Entity {
    commands
        .spawn((
            Name::new("DialogueBox"),
            dialogue_box,
            DialogueReveal::new(config.clone()),
            transform,
            Visibility::default(),
        ))
        .id()
}

/// System that parses requested lines and starts their reveal, replacing the
/// box's glyphs with a fresh, fully hidden set.
pub fn start_dialogues(
    mut commands: Commands,
    mut events: EventReader<PlayDialogueEvent>,
    mut boxes: Query<(&DialogueBox, &mut DialogueReveal)>,
) {
    for event in events.read() {
        let Ok((dialogue_box, mut reveal)) = boxes.get_mut(event.dialogue_box) else {
            warn!("PlayDialogueEvent for non-existent dialogue box {:?}", event.dialogue_box);
            continue;
        };

        let parsed = parse_markup(&event.raw);
        let positions = layout_glyphs_with_advance(
            &parsed.text,
            dialogue_box.font_size,
            dialogue_box.advance_ems,
            dialogue_box.max_line_width,
        );
        let hidden = dialogue_box.glyph_color(false);
        let font_size = dialogue_box.font_size;

        commands
            .entity(event.dialogue_box)
            .despawn_descendants()
            .with_children(|parent| {
                for (index, (c, rest_position)) in parsed.text.chars().zip(positions).enumerate() {
                    parent.spawn((
                        DialogueGlyph {
                            index,
                            rest_position,
                        },
                        Text2d::new(c.to_string()),
                        TextFont {
                            font: dialogue_box.font.clone(),
                            font_size,
                            ..default()
                        },
                        TextColor(hidden),
                        Anchor::BottomCenter,
                        Transform::from_translation(rest_position.extend(0.0))
                            .with_scale(Vec3::ZERO),
                    ));
                }
            });

        let handle = reveal.begin(
            parsed.text,
            parsed.commands,
            dialogue_box.typing_sound.clone(),
        );
        info!(
            "Started reveal {:?} on {:?} ({} chars)",
            handle,
            event.dialogue_box,
            reveal.char_count()
        );
    }
}

/// System that forwards skip requests to their dialogue box.
pub fn skip_dialogues(
    mut events: EventReader<SkipDialogueEvent>,
    mut reveals: Query<&mut DialogueReveal>,
) {
    for event in events.read() {
        match reveals.get_mut(event.dialogue_box) {
            Ok(mut reveal) => reveal.skip_to_end(),
            Err(_) => warn!("SkipDialogueEvent for non-existent dialogue box {:?}", event.dialogue_box),
        }
    }
}

/// System that advances every reveal by one frame and reports finished lines.
pub fn tick_dialogue_reveals(
    time: Res<Time<Real>>,
    audio: Res<Audio>,
    mut instances: ResMut<Assets<AudioInstance>>,
    mut pool: ResMut<TypingSoundPool>,
    mut reveals: Query<(Entity, &mut DialogueReveal)>,
    mut finished: EventWriter<DialogueFinishedEvent>,
) {
    let mut sounds = PooledTypingSound {
        pool: &mut pool,
        audio: &audio,
        instances: &mut instances,
    };
    advance_reveals(
        time.elapsed_secs_f64(),
        &mut sounds,
        &mut reveals,
        &mut finished,
    );
}

/// Ticks every animating reveal to `now`, sending a `DialogueFinishedEvent`
/// for each one that finishes.
pub fn advance_reveals(
    now: f64,
    sounds: &mut impl TypingSoundSink,
    reveals: &mut Query<(Entity, &mut DialogueReveal)>,
    finished: &mut EventWriter<DialogueFinishedEvent>,
) {
    for (entity, mut reveal) in reveals.iter_mut() {
        if !reveal.is_animating() {
            continue;
        }
        if let Some(handle) = reveal.tick(now, sounds) {
            info!("Reveal {:?} on {:?} finished", handle, entity);
            finished.send(DialogueFinishedEvent {
                dialogue_box: entity,
                reveal: handle,
            });
        }
    }
}

/// System that writes each glyph's frame (colour, pop-in scale, motion) to
/// its transform.
pub fn apply_glyph_frames(
    time: Res<Time<Real>>,
    boxes: Query<(&DialogueBox, &DialogueReveal, &Children)>,
    mut glyphs: Query<(&DialogueGlyph, &mut Transform, &mut TextColor)>,
) {
    let now = time.elapsed_secs_f64();

    for (dialogue_box, reveal, children) in &boxes {
        let frames = reveal.glyph_frames(now);

        for &child in children.iter() {
            let Ok((glyph, mut transform, mut color)) = glyphs.get_mut(child) else {
                continue;
            };
            let Some(frame) = frames.get(glyph.index) else {
                continue;
            };

            let position = glyph.rest_position + frame.offset * dialogue_box.font_size;
            transform.translation = position.extend(transform.translation.z);
            transform.scale = Vec3::splat(frame.scale);
            color.0 = dialogue_box.glyph_color(frame.visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::components::RevealHandle;

    struct Silent;

    impl TypingSoundSink for Silent {
        fn play_from_next(&mut self, _clip: &Handle<bevy_kira_audio::AudioSource>) {}
    }

    #[derive(Resource, Default)]
    struct FinishedLog(Vec<DialogueFinishedEvent>);

    fn tick_silently(
        time: Res<Time<Real>>,
        mut reveals: Query<(Entity, &mut DialogueReveal)>,
        mut finished: EventWriter<DialogueFinishedEvent>,
    ) {
        advance_reveals(time.elapsed_secs_f64(), &mut Silent, &mut reveals, &mut finished);
    }

    fn record_finished(
        mut events: EventReader<DialogueFinishedEvent>,
        mut log: ResMut<FinishedLog>,
    ) {
        log.0.extend(events.read().copied());
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_event::<PlayDialogueEvent>();
        app.add_event::<SkipDialogueEvent>();
        app.add_systems(
            Update,
            (start_dialogues, skip_dialogues, apply_glyph_frames).chain(),
        );
        app
    }

    /// App that also ticks reveals, with real time advancing 50ms per update.
    fn reveal_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));
        app.init_resource::<FinishedLog>();
        app.add_event::<PlayDialogueEvent>();
        app.add_event::<SkipDialogueEvent>();
        app.add_event::<DialogueFinishedEvent>();
        app.add_systems(
            Update,
            (start_dialogues, skip_dialogues, tick_silently, record_finished).chain(),
        );
        app
    }

    fn current_handle(app: &App, entity: Entity) -> RevealHandle {
        app.world()
            .get::<DialogueReveal>(entity)
            .and_then(DialogueReveal::handle)
            .expect("reveal handle")
    }

    fn finished_log(app: &App) -> Vec<DialogueFinishedEvent> {
        app.world().resource::<FinishedLog>().0.clone()
    }

    fn spawn_box(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                DialogueBox::new(Handle::default()),
                DialogueReveal::new(RevealConfig::default()),
                Transform::default(),
                Visibility::default(),
            ))
            .id()
    }

    fn glyphs_of(app: &mut App) -> Vec<(DialogueGlyph, Transform, TextColor)> {
        let mut query = app
            .world_mut()
            .query::<(&DialogueGlyph, &Transform, &TextColor)>();
        let mut glyphs: Vec<_> = query
            .iter(app.world())
            .map(|(glyph, transform, color)| (*glyph, *transform, color.clone()))
            .collect();
        glyphs.sort_by_key(|(glyph, _, _)| glyph.index);
        glyphs
    }

    #[test]
    fn test_play_spawns_hidden_glyphs() {
        let mut app = test_app();
        let entity = spawn_box(&mut app);

        app.world_mut()
            .send_event(PlayDialogueEvent::new(entity, "<sp:50>Slow<anim:shake>text</anim> end"));
        app.update();

        let reveal = app.world().get::<DialogueReveal>(entity).expect("reveal");
        assert_eq!(reveal.text(), "Slowtext end");
        assert!(reveal.is_animating());
        assert_eq!(reveal.animation_ranges().len(), 1);

        let glyphs = glyphs_of(&mut app);
        assert_eq!(glyphs.len(), 12);
        for (_, transform, color) in &glyphs {
            assert_eq!(color.0.alpha(), 0.0);
            assert_eq!(transform.scale, Vec3::ZERO);
        }
    }

    #[test]
    fn test_replaying_replaces_glyphs() {
        let mut app = test_app();
        let entity = spawn_box(&mut app);

        app.world_mut()
            .send_event(PlayDialogueEvent::new(entity, "A rather long first line"));
        app.update();
        app.world_mut().send_event(PlayDialogueEvent::new(entity, "Short"));
        app.update();

        let glyphs = glyphs_of(&mut app);
        assert_eq!(glyphs.len(), 5);
        let reveal = app.world().get::<DialogueReveal>(entity).expect("reveal");
        assert_eq!(reveal.text(), "Short");
    }

    #[test]
    fn test_skip_event_latches_skip() {
        let mut app = test_app();
        let entity = spawn_box(&mut app);

        app.world_mut().send_event(PlayDialogueEvent::new(entity, "Hello"));
        app.update();
        app.world_mut().send_event(SkipDialogueEvent { dialogue_box: entity });
        app.update();

        let mut reveal = app
            .world_mut()
            .get_mut::<DialogueReveal>(entity)
            .expect("reveal");
        assert!(reveal.tick(100.0, &mut Silent).is_some());
        assert_eq!(reveal.revealed(), 5);
    }

    #[test]
    fn test_events_for_unknown_entities_are_ignored() {
        let mut app = test_app();
        let stranger = app.world_mut().spawn_empty().id();

        app.world_mut().send_event(PlayDialogueEvent::new(stranger, "Nobody home"));
        app.world_mut().send_event(SkipDialogueEvent { dialogue_box: stranger });
        app.update();

        assert!(glyphs_of(&mut app).is_empty());
    }

    #[test]
    fn test_glyphs_use_the_box_font_advance() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((
                DialogueBox::new(Handle::default())
                    .with_font(Handle::default(), 0.5)
                    .with_font_size(20.0),
                DialogueReveal::new(RevealConfig::default()),
                Transform::default(),
                Visibility::default(),
            ))
            .id();

        app.world_mut().send_event(PlayDialogueEvent::new(entity, "abc"));
        app.update();

        let glyphs = glyphs_of(&mut app);
        assert_eq!(glyphs[1].0.rest_position, Vec2::new(10.0, 0.0));
        assert_eq!(glyphs[2].0.rest_position, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_skipped_line_reports_finish_once() {
        let mut app = reveal_app();
        let entity = spawn_box(&mut app);

        app.world_mut()
            .send_event(PlayDialogueEvent::new(entity, "A fairly long line to skip through"));
        app.update();
        let handle = current_handle(&app, entity);
        assert!(finished_log(&app).is_empty());

        app.world_mut().send_event(SkipDialogueEvent { dialogue_box: entity });
        app.update();
        let reveal = app.world().get::<DialogueReveal>(entity).expect("reveal");
        assert!(!reveal.is_animating());
        assert_eq!(reveal.revealed(), reveal.char_count());

        for _ in 0..5 {
            app.update();
        }
        assert_eq!(
            finished_log(&app),
            vec![DialogueFinishedEvent {
                dialogue_box: entity,
                reveal: handle,
            }]
        );
    }

    #[test]
    fn test_replaced_line_never_reports_finish() {
        let mut app = reveal_app();
        let entity = spawn_box(&mut app);

        app.world_mut()
            .send_event(PlayDialogueEvent::new(entity, "This line gets cut off halfway"));
        app.update();
        let first = current_handle(&app, entity);
        app.update();

        app.world_mut().send_event(PlayDialogueEvent::new(entity, "Hi"));
        app.update();
        let second = current_handle(&app, entity);
        assert_ne!(first, second);

        for _ in 0..20 {
            app.update();
        }
        assert_eq!(
            finished_log(&app),
            vec![DialogueFinishedEvent {
                dialogue_box: entity,
                reveal: second,
            }]
        );
    }

    #[test]
    fn test_reveal_runs_while_virtual_time_is_paused() {
        let mut app = reveal_app();
        let entity = spawn_box(&mut app);
        app.world_mut().resource_mut::<Time<Virtual>>().pause();

        app.world_mut().send_event(PlayDialogueEvent::new(entity, "Ahoy"));
        for _ in 0..10 {
            app.update();
        }

        assert_eq!(app.world().resource::<Time<Virtual>>().elapsed_secs(), 0.0);
        let reveal = app.world().get::<DialogueReveal>(entity).expect("reveal");
        assert_eq!(reveal.revealed(), 4);
        assert_eq!(finished_log(&app).len(), 1);
    }
}
