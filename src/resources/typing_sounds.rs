//! Round-robin pool of typing sound voices.
//!
//! Typing clicks overlap; rotating through a fixed set of voices lets a new
//! click play without cutting off the one before it. Only when the pool wraps
//! around is the oldest voice restarted.

use bevy::prelude::*;
use bevy_kira_audio::{Audio, AudioControl, AudioInstance, AudioSource, AudioTween};

use crate::components::dialogue_reveal::TypingSoundSink;

/// Fixed set of voices that typing sounds rotate through.
#[derive(Resource, Debug)]
pub struct TypingSoundPool {
    voices: Vec<Option<Handle<AudioInstance>>>,
    next_voice: usize,
}

impl Default for TypingSoundPool {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TypingSoundPool {
    /// Creates a pool with `size` voices (at least one).
    pub fn new(size: usize) -> Self {
        Self {
            voices: vec![None; size.max(1)],
            next_voice: 0,
        }
    }

    /// Number of voices in the pool.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Returns the voice to play on next and advances the rotation.
    pub fn next_voice(&mut self) -> usize {
        let voice = self.next_voice;
        self.next_voice = (self.next_voice + 1) % self.voices.len();
        voice
    }

    /// Stores the instance now playing on `voice`, returning the one it replaces.
    pub fn replace(
        &mut self,
        voice: usize,
        instance: Handle<AudioInstance>,
    ) -> Option<Handle<AudioInstance>> {
        self.voices.get_mut(voice)?.replace(instance)
    }
}

/// Plays typing sounds through the pool on the kira audio channel.
pub struct PooledTypingSound<'a> {
    pub pool: &'a mut TypingSoundPool,
    pub audio: &'a Audio,
    pub instances: &'a mut Assets<AudioInstance>,
}

impl TypingSoundSink for PooledTypingSound<'_> {
    fn play_from_next(&mut self, clip: &Handle<AudioSource>) {
        let voice = self.pool.next_voice();
        let instance = self.audio.play(clip.clone()).handle();
        if let Some(previous) = self.pool.replace(voice, instance) {
            // Restart the voice like a single audio source would.
            if let Some(previous) = self.instances.get_mut(&previous) {
                previous.stop(AudioTween::default());
            }
        }
    }
}
