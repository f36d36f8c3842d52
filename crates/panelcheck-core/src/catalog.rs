#![forbid(unsafe_code)]

//! Built-in pattern lists, one per stepped tool.

use crate::color::Rgb;
use crate::pattern::{PatternFill, PatternSequence, TestPattern};
use crate::scene::GradientAxis;

fn sequence(patterns: Vec<TestPattern>) -> PatternSequence {
    PatternSequence::from_literal(patterns)
}

/// Primary colors plus black and white: stuck pixels show up against at
/// least one of them. Also the default five-step color cycle.
#[must_use]
pub fn dead_pixel() -> PatternSequence {
    sequence(vec![
        TestPattern::solid("black", "Black", Rgb::BLACK),
        TestPattern::solid("white", "White", Rgb::WHITE),
        TestPattern::solid("red", "Red", Rgb::RED),
        TestPattern::solid("green", "Green", Rgb::GREEN),
        TestPattern::solid("blue", "Blue", Rgb::BLUE),
    ])
}

/// Pure black then pure white (backlight bleed, uniformity).
#[must_use]
pub fn black_white() -> PatternSequence {
    sequence(vec![
        TestPattern::solid("black", "Black", Rgb::BLACK),
        TestPattern::solid("white", "White", Rgb::WHITE),
    ])
}

/// Primaries, secondaries, white and black.
#[must_use]
pub fn color_test() -> PatternSequence {
    sequence(vec![
        TestPattern::solid("red", "Red", Rgb::RED),
        TestPattern::solid("green", "Green", Rgb::GREEN),
        TestPattern::solid("blue", "Blue", Rgb::BLUE),
        TestPattern::solid("cyan", "Cyan", Rgb::CYAN),
        TestPattern::solid("magenta", "Magenta", Rgb::MAGENTA),
        TestPattern::solid("yellow", "Yellow", Rgb::YELLOW),
        TestPattern::solid("white", "White", Rgb::WHITE),
        TestPattern::solid("black", "Black", Rgb::BLACK),
    ])
}

/// Gradient, geometry and text patterns for contrast and banding.
#[must_use]
pub fn contrast() -> PatternSequence {
    let steps: Vec<Rgb> = (0..8u32)
        .map(|i| Rgb::gray_percent((i * 100 / 7) as u8))
        .collect();
    sequence(vec![
        TestPattern::new(
            "gradient",
            "Gray gradient",
            PatternFill::Gradient {
                axis: GradientAxis::Horizontal,
                from: Rgb::BLACK,
                to: Rgb::WHITE,
            },
        ),
        TestPattern::new(
            "grid",
            "Grid",
            PatternFill::Grid {
                background: Rgb::BLACK,
                line: Rgb::WHITE,
                spacing: 40.0,
                line_width: 1.0,
            },
        ),
        TestPattern::new(
            "checkerboard",
            "Checkerboard",
            PatternFill::Checkerboard {
                even: Rgb::BLACK,
                odd: Rgb::WHITE,
                cell: 32.0,
            },
        ),
        TestPattern::new(
            "gray-steps",
            "Gray steps",
            PatternFill::Bars {
                axis: GradientAxis::Horizontal,
                colors: steps,
            },
        ),
        TestPattern::new(
            "text",
            "Text sample",
            PatternFill::Text {
                background: Rgb::WHITE,
                foreground: Rgb::BLACK,
                lines: vec![
                    "The quick brown fox jumps over the lazy dog".into(),
                    "0123456789 ABCDEFGHIJKLMNOPQRSTUVWXYZ".into(),
                    "abcdefghijklmnopqrstuvwxyz !?.,;:()[]{}".into(),
                ],
            },
        ),
    ])
}

/// Shadow and highlight steps for brightness/gamma adjustment.
#[must_use]
pub fn brightness() -> PatternSequence {
    let shadows: Vec<Rgb> = (1..=10u8).map(Rgb::gray_percent).collect();
    let highlights: Vec<Rgb> = (90..=99u8).map(Rgb::gray_percent).collect();
    sequence(vec![
        TestPattern::new(
            "shadows",
            "Near-black steps",
            PatternFill::Bars {
                axis: GradientAxis::Horizontal,
                colors: shadows,
            },
        ),
        TestPattern::solid("black", "Black level", Rgb::BLACK),
        TestPattern::new(
            "highlights",
            "Near-white steps",
            PatternFill::Bars {
                axis: GradientAxis::Horizontal,
                colors: highlights,
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lists_have_expected_lengths() {
        assert_eq!(dead_pixel().len(), 5);
        assert_eq!(black_white().len(), 2);
        assert_eq!(color_test().len(), 8);
        assert_eq!(contrast().len(), 5);
        assert_eq!(brightness().len(), 3);
    }

    #[test]
    fn ids_are_unique_within_each_list() {
        for seq in [dead_pixel(), black_white(), color_test(), contrast(), brightness()] {
            let mut ids: Vec<&str> = seq.iter().map(TestPattern::id).collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), total);
        }
    }

    #[test]
    fn contrast_steps_span_black_to_white() {
        let seq = contrast();
        let steps = seq.get(seq.position("gray-steps").unwrap()).unwrap();
        let PatternFill::Bars { colors, .. } = steps.fill() else {
            panic!("gray-steps should be bars");
        };
        assert_eq!(colors.first(), Some(&Rgb::BLACK));
        assert_eq!(colors.last(), Some(&Rgb::WHITE));
    }
}
