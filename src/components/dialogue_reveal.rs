//! Dialogue Reveal Engine
//!
//! Reveals a dialogue line character-by-character like a quill writing it out,
//! honouring the pause and speed commands extracted from its markup, and
//! computes the per-glyph frame (visibility, pop-in scale, shake/wave offset)
//! the dialogue box applies every frame.

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy_kira_audio::AudioSource;
use rand::Rng;

use crate::resources::reveal_config::RevealConfig;
use crate::utils::markup::{CommandKind, DialogueCommand, MarkupWarning};
use crate::utils::text_motion::{self, AnimationRange};

/// Identifies one reveal started on a dialogue box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealHandle(pub u64);

/// Lifecycle of a dialogue box's reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPhase {
    #[default]
    Idle,
    Revealing,
    Finished,
}

/// Receives typing sound requests from a reveal.
pub trait TypingSoundSink {
    /// Plays `clip` on the next voice of the pool.
    fn play_from_next(&mut self, clip: &Handle<AudioSource>);
}

/// What a single glyph looks like this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphFrame {
    /// False until the cursor has passed the glyph.
    pub visible: bool,
    /// Pop-in scale around the glyph's anchor (0..=1).
    pub scale: f32,
    /// Shake/wave displacement in ems.
    pub offset: Vec2,
}

/// Pairs animation start and end commands by order of appearance.
///
/// The i-th start closes at the i-th end. When the counts differ no range is
/// built at all, so the line still reveals but without motion.
pub fn build_animation_ranges(commands: &[DialogueCommand]) -> Vec<AnimationRange> {
    let starts: Vec<_> = commands
        .iter()
        .filter_map(|command| match command.kind {
            CommandKind::AnimStart(animation) => Some((command.position, animation)),
            _ => None,
        })
        .collect();
    let ends: Vec<usize> = commands
        .iter()
        .filter(|command| matches!(command.kind, CommandKind::AnimEnd))
        .map(|command| command.position)
        .collect();

    if starts.len() != ends.len() {
        warn!(
            "Dialogue markup: {}",
            MarkupWarning::UnbalancedAnimation {
                starts: starts.len(),
                ends: ends.len(),
            }
        );
        return Vec::new();
    }

    starts
        .into_iter()
        .zip(ends)
        .map(|((start, animation), end)| AnimationRange {
            start,
            end,
            animation,
        })
        .collect()
}

/// Random wait between typing sounds, redrawn after every play.
#[derive(Debug, Clone, Default)]
struct SoundThrottle {
    last_played_at: Option<f64>,
    wait: f32,
}

impl SoundThrottle {
    fn try_play(
        &mut self,
        now: f64,
        config: &RevealConfig,
        clip: &Handle<AudioSource>,
        sink: &mut impl TypingSoundSink,
    ) -> bool {
        if let Some(last) = self.last_played_at {
            if now - last <= f64::from(self.wait) {
                return false;
            }
        }

        let (low, high) = config.sound_interval_range();
        self.wait = rand::thread_rng().gen_range(low..=high);
        self.last_played_at = Some(now);
        sink.play_from_next(clip);
        true
    }
}

/// State of the reveal currently owned by a dialogue box.
#[derive(Debug, Clone)]
struct ActiveReveal {
    handle: RevealHandle,
    text: String,
    chars: Vec<char>,
    /// Pause and speed commands not yet reached, ordered by position.
    pending: VecDeque<DialogueCommand>,
    ranges: Vec<AnimationRange>,
    revealed: usize,
    seconds_per_char: f32,
    /// Time the last character appeared. A pause pushes it into the future,
    /// which makes it the deadline for the next reveal.
    baseline: f64,
    started_at: Vec<Option<f64>>,
    typing_sound: Handle<AudioSource>,
    skip_requested: bool,
    phase: RevealPhase,
}

impl ActiveReveal {
    fn char_count(&self) -> usize {
        self.chars.len()
    }

    fn is_due(&self, now: f64) -> bool {
        now - self.baseline > f64::from(self.seconds_per_char)
    }

    fn run_commands_at_cursor(&mut self, now: f64) {
        while let Some(command) = self.pending.front().copied() {
            if command.position > self.revealed {
                break;
            }
            self.pending.pop_front();
            match command.kind {
                CommandKind::Pause { seconds } => {
                    self.baseline = now + f64::from(seconds);
                }
                CommandKind::SpeedChange { chars_per_second } if chars_per_second > 0.0 => {
                    self.seconds_per_char = 1.0 / chars_per_second;
                }
                CommandKind::SpeedChange { chars_per_second } => {
                    warn!("Ignoring non-positive text speed {}", chars_per_second);
                }
                CommandKind::AnimStart(_) | CommandKind::AnimEnd => {}
            }
        }
    }

    /// Reveals the character under the cursor and returns it.
    fn reveal_next(&mut self, now: f64) -> char {
        let c = self.chars[self.revealed];
        self.started_at[self.revealed] = Some(now);
        self.revealed += 1;
        self.baseline = now;
        c
    }

    fn fast_forward(&mut self, now: f64) {
        for started_at in &mut self.started_at[self.revealed..] {
            *started_at = Some(now);
        }
        self.revealed = self.char_count();
    }

    fn finish(&mut self) -> RevealHandle {
        self.phase = RevealPhase::Finished;
        self.skip_requested = false;
        self.handle
    }
}

/// Drives the reveal of one dialogue box.
///
/// A box owns at most one reveal. Starting another one discards the previous
/// reveal, whose completion is then never reported.
#[derive(Component, Debug, Clone, Default)]
pub struct DialogueReveal {
    config: RevealConfig,
    current: Option<ActiveReveal>,
    next_handle: u64,
    throttle: SoundThrottle,
}

impl DialogueReveal {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Starts revealing `text` from its first character, with every glyph hidden.
    pub fn begin(
        &mut self,
        text: impl Into<String>,
        commands: Vec<DialogueCommand>,
        typing_sound: Handle<AudioSource>,
    ) -> RevealHandle {
        if let Some(previous) = &self.current {
            if previous.phase == RevealPhase::Revealing {
                debug!("Reveal {:?} superseded before finishing", previous.handle);
            }
        }

        let handle = RevealHandle(self.next_handle);
        self.next_handle += 1;

        let text = text.into();
        let chars: Vec<char> = text.chars().collect();
        let ranges = build_animation_ranges(&commands);

        let mut pending: Vec<DialogueCommand> = commands
            .into_iter()
            .filter(|command| {
                matches!(
                    command.kind,
                    CommandKind::Pause { .. } | CommandKind::SpeedChange { .. }
                )
            })
            .collect();
        // Stable: commands sharing a position keep their tag-kind order.
        pending.sort_by_key(|command| command.position);

        self.current = Some(ActiveReveal {
            handle,
            started_at: vec![None; chars.len()],
            chars,
            text,
            pending: pending.into(),
            ranges,
            revealed: 0,
            seconds_per_char: self.config.seconds_per_char(),
            baseline: f64::NEG_INFINITY,
            typing_sound,
            skip_requested: false,
            phase: RevealPhase::Revealing,
        });

        handle
    }

    /// Advances the reveal to `now`, in seconds on a monotonic clock.
    ///
    /// Returns the reveal's handle on the one tick it finishes, either by
    /// reaching the last character or by honouring a skip request.
    pub fn tick(&mut self, now: f64, sounds: &mut impl TypingSoundSink) -> Option<RevealHandle> {
        let Self {
            config,
            current,
            throttle,
            ..
        } = self;
        let reveal = current.as_mut()?;
        if reveal.phase != RevealPhase::Revealing {
            return None;
        }

        if reveal.skip_requested {
            reveal.fast_forward(now);
            return Some(reveal.finish());
        }

        if reveal.revealed >= reveal.char_count() {
            return Some(reveal.finish());
        }

        while reveal.revealed < reveal.char_count() && reveal.is_due(now) {
            reveal.run_commands_at_cursor(now);
            if !reveal.is_due(now) {
                break;
            }

            let c = reveal.reveal_next(now);
            let is_final = reveal.revealed == reveal.char_count();
            let silent = (config.silent_whitespace && c.is_whitespace())
                || (is_final && !config.sound_on_final_char);
            if !silent {
                throttle.try_play(now, config, &reveal.typing_sound, sounds);
            }

            if is_final {
                return Some(reveal.finish());
            }
        }

        None
    }

    /// Requests that the rest of the line appear on the next tick.
    ///
    /// Has no effect unless a reveal is in progress; repeated calls are harmless.
    pub fn skip_to_end(&mut self) {
        if let Some(reveal) = self.current.as_mut() {
            if reveal.phase == RevealPhase::Revealing {
                reveal.skip_requested = true;
            }
        }
    }

    /// True from `begin` until the reveal finishes.
    pub fn is_animating(&self) -> bool {
        self.phase() == RevealPhase::Revealing
    }

    pub fn phase(&self) -> RevealPhase {
        self.current
            .as_ref()
            .map_or(RevealPhase::Idle, |reveal| reveal.phase)
    }

    /// Handle of the reveal currently owned by this box.
    pub fn handle(&self) -> Option<RevealHandle> {
        self.current.as_ref().map(|reveal| reveal.handle)
    }

    pub fn text(&self) -> &str {
        self.current.as_ref().map_or("", |reveal| reveal.text.as_str())
    }

    pub fn char_count(&self) -> usize {
        self.current.as_ref().map_or(0, ActiveReveal::char_count)
    }

    /// Number of characters revealed so far.
    pub fn revealed(&self) -> usize {
        self.current.as_ref().map_or(0, |reveal| reveal.revealed)
    }

    pub fn animation_ranges(&self) -> &[AnimationRange] {
        self.current
            .as_ref()
            .map(|reveal| reveal.ranges.as_slice())
            .unwrap_or_default()
    }

    /// Computes every glyph's frame at `now`.
    ///
    /// Animated ranges keep moving after the reveal has finished.
    pub fn glyph_frames(&self, now: f64) -> Vec<GlyphFrame> {
        let Some(reveal) = &self.current else {
            return Vec::new();
        };

        (0..reveal.char_count())
            .map(|index| GlyphFrame {
                visible: index < reveal.revealed,
                scale: text_motion::pop_in_scale(
                    reveal.started_at[index],
                    now,
                    self.config.pop_in_seconds,
                ),
                offset: text_motion::animation_offset(&reveal.ranges, index, now, &self.config),
            })
            .collect()
    }
}
