//! Per-character text motion.
//!
//! Displacements are returned in ems; the display multiplies them by its
//! font size. All functions are continuous in time so glyphs never jump
//! between frames.

use std::sync::LazyLock;

use bevy::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::resources::reveal_config::RevealConfig;
use crate::utils::markup::TextAnimation;

/// Second noise row, far enough from the first that x and y decorrelate.
const SHAKE_Y_ROW: f64 = 1000.0;

static SHAKE_NOISE: LazyLock<Perlin> = LazyLock::new(|| Perlin::new(0));

/// A contiguous span of visible characters that share an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRange {
    /// First animated character (inclusive).
    pub start: usize,
    /// First character past the range (exclusive).
    pub end: usize,
    pub animation: TextAnimation,
}

impl AnimationRange {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Samples the shake noise, mapped to roughly [-0.5, 0.5].
fn shake_sample(x: f64, row: f64) -> f32 {
    (SHAKE_NOISE.get([x, row]) * 0.5) as f32
}

/// Jitter for one character. Bounded by half the shake magnitude per axis.
pub fn shake_offset(index: usize, time: f64, config: &RevealConfig) -> Vec2 {
    let x = (index as f64 + time) * f64::from(config.shake_frequency);
    Vec2::new(
        shake_sample(x, 0.0) * config.shake_magnitude,
        shake_sample(x, SHAKE_Y_ROW) * config.shake_magnitude,
    )
}

/// Vertical sine offset, phase-shifted per character.
pub fn wave_offset(index: usize, time: f64, config: &RevealConfig) -> Vec2 {
    let phase =
        index as f64 * f64::from(config.wave_char_phase) + time * f64::from(config.wave_speed);
    Vec2::new(0.0, phase.sin() as f32 * config.wave_amplitude)
}

/// Sums the contributions of every range covering `index`.
pub fn animation_offset(
    ranges: &[AnimationRange],
    index: usize,
    time: f64,
    config: &RevealConfig,
) -> Vec2 {
    ranges
        .iter()
        .filter(|range| range.contains(index))
        .map(|range| match range.animation {
            TextAnimation::Shake => shake_offset(index, time, config),
            TextAnimation::Wave => wave_offset(index, time, config),
            TextAnimation::None => Vec2::ZERO,
        })
        .sum()
}

/// Pop-in scale of a glyph: 0 until revealed, then a linear ramp to 1.
pub fn pop_in_scale(started_at: Option<f64>, now: f64, duration: f32) -> f32 {
    let Some(started_at) = started_at else {
        return 0.0;
    };
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - started_at) as f32 / duration).clamp(0.0, 1.0)
}
