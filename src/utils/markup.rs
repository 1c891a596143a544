//! Inline dialogue markup.
//!
//! Authored dialogue lines carry flat tags that never reach the screen:
//!
//! - `<p:NAME>` pauses the reveal (`tiny`, `short`, `normal`, `long`, `read`)
//! - `<sp:NUMBER>` changes the reveal speed in characters per second
//! - `<anim:NAME>` ... `</anim>` marks a range to shake or wave
//!
//! [`parse_markup`] strips the tags and records each one as a
//! [`DialogueCommand`] positioned at the visible character it applies to.
//!
//! Any other complete `<...>` tag is rich text a dialogue box cannot draw and
//! is dropped from the display text, except inline sprites, which keep their
//! single slot as [`SPRITE_PLACEHOLDER`]. A `<` that no `>` closes before the
//! next `<` or line break is an ordinary character.

use std::sync::LazyLock;

use bevy::prelude::*;
use regex::Regex;

/// Reveal speed used when a `<sp:>` tag cannot be read.
pub const DEFAULT_CHARS_PER_SECOND: f32 = 150.0;

/// Pause name used when a `<p:>` tag names an unregistered pause.
pub const FALLBACK_PAUSE: &str = "normal";

/// Named pause durations in seconds.
pub const PAUSE_DURATIONS: &[(&str, f32)] = &[
    ("tiny", 0.1),
    ("short", 0.25),
    ("normal", 0.666),
    ("long", 1.0),
    ("read", 2.0),
];

/// Tag name of inline sprite images, which occupy one visible slot.
const SPRITE_TAG: &str = "sprite";

/// Glyph standing in for an inline sprite in the display text.
pub const SPRITE_PLACEHOLDER: char = '\u{FFFC}';

static PAUSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p:(?P<name>[^<>\n]*)>").expect("Invalid pause tag regex"));

static SPEED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<sp:(?P<value>[^<>\n]*)>").expect("Invalid speed tag regex"));

static ANIM_START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<anim:(?P<name>[^<>\n]*)>").expect("Invalid anim start tag regex")
});

static ANIM_END_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</anim>").expect("Invalid anim end tag regex"));

/// Any complete tag: a `<` closed by `>` with no other bracket or line break between.
static MARKUP_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?P<body>[^<>\n]*)>").expect("Invalid markup span regex"));

/// Per-character distortion applied between `<anim:NAME>` and `</anim>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAnimation {
    #[default]
    None,
    Shake,
    Wave,
}

impl TextAnimation {
    /// Looks up an animation by tag name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            ("none", TextAnimation::None),
            ("shake", TextAnimation::Shake),
            ("wave", TextAnimation::Wave),
        ]
        .into_iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(name))
        .map(|(_, animation)| animation)
    }
}

/// What a command does once the reveal cursor reaches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandKind {
    /// Hold the reveal for this many seconds.
    Pause { seconds: f32 },
    /// Reveal subsequent characters at this rate.
    SpeedChange { chars_per_second: f32 },
    /// Open an animated range.
    AnimStart(TextAnimation),
    /// Close the oldest unclosed animated range.
    AnimEnd,
}

/// A directive extracted from markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogueCommand {
    /// Index into the stripped text, counted in characters.
    pub position: usize,
    pub kind: CommandKind,
}

impl DialogueCommand {
    pub fn new(position: usize, kind: CommandKind) -> Self {
        Self { position, kind }
    }
}

/// A recoverable authoring mistake found while parsing or pairing tags.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkupWarning {
    #[error("no pause registered for '{name}', using 'normal'")]
    UnknownPause { name: String },
    #[error("invalid text speed '{value}', using 150 chars/sec")]
    InvalidSpeed { value: String },
    #[error("invalid text animation type '{name}', using none")]
    UnknownAnimation { name: String },
    #[error("unequal number of start and end animation tags (start: {starts}, end: {ends})")]
    UnbalancedAnimation { starts: usize, ends: usize },
}

/// Result of stripping markup from a dialogue line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDialogue {
    /// The text as it should appear on screen.
    pub text: String,
    /// Commands grouped by tag kind (pauses, speeds, anim starts, anim ends),
    /// each group in order of appearance.
    pub commands: Vec<DialogueCommand>,
    pub warnings: Vec<MarkupWarning>,
}

/// Returns the duration registered for a pause name.
pub fn pause_duration(name: &str) -> Option<f32> {
    PAUSE_DURATIONS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, seconds)| *seconds)
}

/// Strips all dialogue tags from `raw`, returning the display text and the
/// positioned commands.
///
/// Tag kinds are processed one after another (pause, speed, anim start,
/// anim end). Each pass measures positions against the string with earlier
/// kinds already removed; tags of later kinds still present are skipped by
/// the bracket-aware count, so every position lands on the final text.
pub fn parse_markup(raw: &str) -> ParsedDialogue {
    let mut parsed = ParsedDialogue::default();
    let mut text = raw.to_string();

    text = strip_tags(&text, &PAUSE_TAG, &mut parsed, |caps, warnings| {
        let name = &caps["name"];
        let seconds = pause_duration(name).unwrap_or_else(|| {
            warnings.push(MarkupWarning::UnknownPause {
                name: name.to_string(),
            });
            pause_duration(FALLBACK_PAUSE).unwrap_or_default()
        });
        CommandKind::Pause { seconds }
    });

    text = strip_tags(&text, &SPEED_TAG, &mut parsed, |caps, warnings| {
        let value = &caps["value"];
        let chars_per_second = match value.trim().parse::<f32>() {
            Ok(speed) if speed.is_finite() && speed > 0.0 => speed,
            _ => {
                warnings.push(MarkupWarning::InvalidSpeed {
                    value: value.to_string(),
                });
                DEFAULT_CHARS_PER_SECOND
            }
        };
        CommandKind::SpeedChange { chars_per_second }
    });

    text = strip_tags(&text, &ANIM_START_TAG, &mut parsed, |caps, warnings| {
        let name = &caps["name"];
        let animation = TextAnimation::from_name(name).unwrap_or_else(|| {
            warnings.push(MarkupWarning::UnknownAnimation {
                name: name.to_string(),
            });
            TextAnimation::None
        });
        CommandKind::AnimStart(animation)
    });

    text = strip_tags(&text, &ANIM_END_TAG, &mut parsed, |_, _| CommandKind::AnimEnd);
    text = strip_unsupported_tags(&text);

    for warning in &parsed.warnings {
        warn!("Dialogue markup: {}", warning);
    }

    parsed.text = text;
    parsed
}

/// Records a command for every match of `tag` in `text`, then returns `text`
/// with those matches removed.
fn strip_tags(
    text: &str,
    tag: &Regex,
    parsed: &mut ParsedDialogue,
    mut to_command: impl FnMut(&regex::Captures<'_>, &mut Vec<MarkupWarning>) -> CommandKind,
) -> String {
    for caps in tag.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let position = visible_chars_before(text, whole.start());
        let kind = to_command(&caps, &mut parsed.warnings);
        parsed.commands.push(DialogueCommand::new(position, kind));
    }
    tag.replace_all(text, "").into_owned()
}

/// Drops the tags left after the dialogue passes, leaving one placeholder
/// glyph per inline sprite.
fn strip_unsupported_tags(text: &str) -> String {
    MARKUP_SPAN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if is_sprite_tag(&caps["body"]) {
                SPRITE_PLACEHOLDER.to_string()
            } else {
                debug!("Dialogue markup: dropping unsupported tag {}", &caps[0]);
                String::new()
            }
        })
        .into_owned()
}

fn is_sprite_tag(body: &str) -> bool {
    body.starts_with(SPRITE_TAG)
}

/// Counts the characters of `text[..byte_offset]` that remain visible once
/// every tag is removed.
///
/// A complete tag contributes nothing, except an inline sprite tag, which
/// counts as one slot. Brackets that do not form a tag count like any other
/// character.
pub fn visible_chars_before(text: &str, byte_offset: usize) -> usize {
    let prefix = &text[..byte_offset.min(text.len())];
    let hidden: usize = MARKUP_SPAN
        .captures_iter(prefix)
        .map(|caps| {
            let width = caps[0].chars().count();
            if is_sprite_tag(&caps["body"]) {
                width - 1
            } else {
                width
            }
        })
        .sum();

    prefix.chars().count() - hidden
}
