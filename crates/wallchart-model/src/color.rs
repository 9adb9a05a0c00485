// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Colors, color-history marks, and due colors.
//!
//! A player's color history carries one mark per prior round: a played color
//! (`W`/`B`) or an unplayed placeholder (full, half, or zero-point bye). The
//! due color derived from that history drives the color rules: upper-case
//! "equalization" when the played colors are out of balance, lower-case
//! "alternation" otherwise. The equalization strength is the size of the
//! imbalance.

/// A board color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the opposite color.
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Returns the single-letter code (`W` or `B`).
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One entry of a color history: a played color or an unplayed placeholder.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ColorMark {
    White,
    Black,
    /// Full-point bye (`f`); counted for repeat-bye severity.
    FullBye,
    /// Half-point bye (`h`).
    HalfBye,
    /// Zero-point bye or other unplayed round (`z`).
    ZeroBye,
}

impl ColorMark {
    /// The played color, if this round was played.
    #[inline]
    pub const fn color(self) -> Option<Color> {
        match self {
            ColorMark::White => Some(Color::White),
            ColorMark::Black => Some(Color::Black),
            _ => None,
        }
    }

    /// Returns `true` for a played round.
    #[inline]
    pub const fn is_played(self) -> bool {
        self.color().is_some()
    }

    /// Returns the wire letter (`W`, `B`, `f`, `h`, `z`).
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            ColorMark::White => 'W',
            ColorMark::Black => 'B',
            ColorMark::FullBye => 'f',
            ColorMark::HalfBye => 'h',
            ColorMark::ZeroBye => 'z',
        }
    }
}

impl From<Color> for ColorMark {
    #[inline]
    fn from(color: Color) -> Self {
        match color {
            Color::White => ColorMark::White,
            Color::Black => ColorMark::Black,
        }
    }
}

/// The color a player is due next, per rule 29E.
///
/// `Equalize` (upper-case in the classic notation) outranks `Alternate`
/// (lower-case); the strength records how far out of balance the played
/// colors are, so a player two whites ahead is "more due" black than a
/// player one white ahead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DueColor {
    /// No played games yet (`x`).
    Neither,
    /// Colors are balanced; alternate away from the most recent played color.
    Alternate(Color),
    /// Colors are imbalanced; `strength` is the size of the imbalance.
    Equalize { color: Color, strength: u8 },
}

impl DueColor {
    /// The color this due state asks for, if any.
    #[inline]
    pub const fn color(&self) -> Option<Color> {
        match self {
            DueColor::Neither => None,
            DueColor::Alternate(c) => Some(*c),
            DueColor::Equalize { color, .. } => Some(*color),
        }
    }

    /// Returns `true` when the due color is an equalization demand.
    #[inline]
    pub const fn is_equalize(&self) -> bool {
        matches!(self, DueColor::Equalize { .. })
    }

    /// How overdue the color is: 0 for none, 1 for alternation, the
    /// imbalance size for equalization.
    #[inline]
    pub const fn strength(&self) -> u8 {
        match self {
            DueColor::Neither => 0,
            DueColor::Alternate(_) => 1,
            DueColor::Equalize { strength, .. } => *strength,
        }
    }

    /// Derives the due color from a color history (rule 29E).
    ///
    /// With `multiround > 1` only the first mark of each same-opponent block
    /// is considered. Whites ahead means black is due to equalize and vice
    /// versa; balanced histories alternate away from the most recent played
    /// color; an all-unplayed history is due `Neither`.
    pub fn from_history(history: &[ColorMark], multiround: u16) -> DueColor {
        let step = multiround.max(1) as usize;
        debug_assert!(
            step == 1 || history.len() % step == 0,
            "called `DueColor::from_history` with history length {} not a multiple of multiround {}",
            history.len(),
            step
        );

        let marks = history.iter().step_by(step);
        let mut whites = 0_u32;
        let mut blacks = 0_u32;
        let mut last_played = None;
        for mark in marks {
            match mark.color() {
                Some(Color::White) => {
                    whites += 1;
                    last_played = Some(Color::White);
                }
                Some(Color::Black) => {
                    blacks += 1;
                    last_played = Some(Color::Black);
                }
                None => {}
            }
        }

        if whites > blacks {
            DueColor::Equalize {
                color: Color::Black,
                strength: (whites - blacks).min(u8::MAX as u32) as u8,
            }
        } else if blacks > whites {
            DueColor::Equalize {
                color: Color::White,
                strength: (blacks - whites).min(u8::MAX as u32) as u8,
            }
        } else {
            match last_played {
                Some(color) => DueColor::Alternate(color.flip()),
                None => DueColor::Neither,
            }
        }
    }
}

impl std::fmt::Display for DueColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DueColor::Neither => write!(f, "x"),
            DueColor::Alternate(c) => {
                write!(f, "{}", c.as_char().to_ascii_lowercase())
            }
            DueColor::Equalize { color, strength } => {
                for _ in 0..*strength {
                    write!(f, "{}", color.as_char())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_round_trips() {
        assert_eq!(Color::White.flip(), Color::Black);
        assert_eq!(Color::Black.flip().flip(), Color::Black);
    }

    #[test]
    fn test_due_color_empty_history_is_neither() {
        assert_eq!(DueColor::from_history(&[], 1), DueColor::Neither);
    }

    #[test]
    fn test_due_color_all_byes_is_neither() {
        let h = [ColorMark::HalfBye, ColorMark::ZeroBye, ColorMark::FullBye];
        assert_eq!(DueColor::from_history(&h, 1), DueColor::Neither);
    }

    #[test]
    fn test_due_color_balanced_alternates_from_last_played() {
        let h = [ColorMark::White, ColorMark::Black];
        assert_eq!(
            DueColor::from_history(&h, 1),
            DueColor::Alternate(Color::White)
        );
    }

    #[test]
    fn test_due_color_imbalance_equalizes_with_strength() {
        let h = [ColorMark::White, ColorMark::White, ColorMark::HalfBye];
        assert_eq!(
            DueColor::from_history(&h, 1),
            DueColor::Equalize {
                color: Color::Black,
                strength: 2
            }
        );
    }

    #[test]
    fn test_due_color_trailing_bye_does_not_change_last_played() {
        let h = [ColorMark::Black, ColorMark::White, ColorMark::ZeroBye];
        assert_eq!(
            DueColor::from_history(&h, 1),
            DueColor::Alternate(Color::Black)
        );
    }

    #[test]
    fn test_due_color_multiround_takes_block_heads() {
        // Two games per round: each block head counts once.
        let h = [
            ColorMark::White,
            ColorMark::Black,
            ColorMark::White,
            ColorMark::Black,
        ];
        assert_eq!(
            DueColor::from_history(&h, 2),
            DueColor::Equalize {
                color: Color::Black,
                strength: 2
            }
        );
    }

    #[test]
    fn test_due_color_display_notation() {
        assert_eq!(DueColor::Neither.to_string(), "x");
        assert_eq!(DueColor::Alternate(Color::Black).to_string(), "b");
        assert_eq!(
            DueColor::Equalize {
                color: Color::White,
                strength: 2
            }
            .to_string(),
            "WW"
        );
    }
}
