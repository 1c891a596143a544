//! Fixed-advance glyph placement for dialogue boxes.
//!
//! Each character gets one slot of `font_size * advance_ems`, which only
//! matches the rendered glyphs for a monospace font. Lines break on
//! `\n`, before a word that would overflow the line, and inside words that
//! are longer than a whole line.

use bevy::prelude::*;

/// Horizontal advance per character in ems of Bevy's default FiraMono font.
pub const ADVANCE_EMS: f32 = 0.6;

/// Distance between baselines in ems.
pub const LINE_HEIGHT_EMS: f32 = 1.2;

/// Returns the rest position of every character of `text`, relative to the
/// top-left of the box (y grows upwards, so later lines are negative).
///
/// The result has exactly one entry per `char`, including whitespace and
/// line breaks, so glyph indices line up with reveal indices.
pub fn layout_glyphs(text: &str, font_size: f32, max_line_width: f32) -> Vec<Vec2> {
    layout_glyphs_with_advance(text, font_size, ADVANCE_EMS, max_line_width)
}

/// [`layout_glyphs`] for a monospace font whose characters advance `advance_ems`.
pub fn layout_glyphs_with_advance(
    text: &str,
    font_size: f32,
    advance_ems: f32,
    max_line_width: f32,
) -> Vec<Vec2> {
    let chars: Vec<char> = text.chars().collect();
    let advance = font_size * advance_ems;
    let line_height = font_size * LINE_HEIGHT_EMS;
    let max_columns = if advance > 0.0 {
        ((max_line_width / advance).floor() as usize).max(1)
    } else {
        usize::MAX
    };

    let mut positions = Vec::with_capacity(chars.len());
    let mut column = 0usize;
    let mut line = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        let slot = |column: usize, line: usize| {
            Vec2::new(column as f32 * advance, -(line as f32) * line_height)
        };

        if c == '\n' {
            positions.push(slot(column, line));
            column = 0;
            line += 1;
            continue;
        }

        let starts_word = !c.is_whitespace() && (i == 0 || chars[i - 1].is_whitespace());
        if starts_word && column > 0 {
            let word_len = chars[i..].iter().take_while(|c| !c.is_whitespace()).count();
            if column + word_len > max_columns {
                column = 0;
                line += 1;
            }
        }

        if column >= max_columns {
            column = 0;
            line += 1;
        }

        positions.push(slot(column, line));
        column += 1;
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(actual: Vec2, expected: Vec2) {
        assert!(
            actual.distance(expected) < 1e-4,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_single_line() {
        let positions = layout_glyphs("abc", 10.0, 1000.0);
        assert_eq!(positions.len(), 3);
        assert_near(positions[0], Vec2::new(0.0, 0.0));
        assert_near(positions[1], Vec2::new(6.0, 0.0));
        assert_near(positions[2], Vec2::new(12.0, 0.0));
    }

    #[test]
    fn test_one_position_per_char() {
        let text = "Ye olde ñandú\nsecond line";
        assert_eq!(layout_glyphs(text, 24.0, 200.0).len(), text.chars().count());
    }

    #[test]
    fn test_newline_starts_next_line() {
        let positions = layout_glyphs("a\nb", 10.0, 1000.0);
        assert_near(positions[2], Vec2::new(0.0, -12.0));
    }

    #[test]
    fn test_word_wrap() {
        // 5 columns per line: "ahoy " fits, "matey" moves down.
        let positions = layout_glyphs("ahoy matey", 10.0, 31.0);
        assert_eq!(positions[3].y, 0.0);
        assert_near(positions[5], Vec2::new(0.0, -12.0));
        assert_near(positions[9], Vec2::new(24.0, -12.0));
    }

    #[test]
    fn test_long_word_hard_wraps() {
        let positions = layout_glyphs("abcdefg", 10.0, 31.0);
        assert_near(positions[4], Vec2::new(24.0, 0.0));
        assert_near(positions[5], Vec2::new(0.0, -12.0));
    }

    #[test]
    fn test_advance_follows_the_font() {
        let positions = layout_glyphs_with_advance("abc", 10.0, 0.5, 1000.0);
        assert_near(positions[1], Vec2::new(5.0, 0.0));
        assert_near(positions[2], Vec2::new(10.0, 0.0));

        // 6 columns per line at 5 units each.
        let positions = layout_glyphs_with_advance("ahoy matey", 10.0, 0.5, 31.0);
        assert_near(positions[5], Vec2::new(0.0, -12.0));
    }
}
