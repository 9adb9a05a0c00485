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

//! Color allocation (rules 28J, 29E2, 29E4, 30F).

use wallchart_model::{
    color::{Color, DueColor},
    player::Player,
};

/// Decides `x`'s color on a board against `y`.
///
/// The decision ladder, top rule first:
/// 1. A bye board: the active player takes White, the sentinel Black.
/// 2. Neither side has any played games: the first-round color pattern from
///    the top board, alternating down the boards (28J, 29E2).
/// 3. Prior games against this very opponent: equalize against that opponent
///    (30F).
/// 4. Only one side is due a color: that side gets it.
/// 5. Opposite due colors: both get what they are due.
/// 6. Same due color: the stronger equalization claim wins (29E4).
/// 7. Most recent round where the two histories differ decides (29E4.4);
///    finally the better rank keeps its due color (29E4.5).
pub fn allocate_color(x: &Player, y: &Player, is_odd_board: bool) -> Color {
    if y.is_bye() {
        return Color::White;
    }
    if x.is_bye() {
        return Color::Black;
    }

    // Fresh pairings: first-round color by board parity.
    let is_upper = x < y;
    if x.due_color == DueColor::Neither && y.due_color == DueColor::Neither {
        return if is_upper == is_odd_board {
            x.first_color
        } else {
            x.first_color.flip()
        };
    }

    // Equalize against this specific opponent when they met before (30F).
    if let Some(y_id) = y.entry {
        let whites = x.games_against_with_color(y_id, Color::White);
        let blacks = x.games_against_with_color(y_id, Color::Black);
        if whites < blacks {
            return Color::White;
        }
        if blacks < whites {
            return Color::Black;
        }
    }

    // One side without a due color: the other side collects.
    match (x.due_color.color(), y.due_color.color()) {
        (Some(xc), None) => return xc,
        (None, Some(yc)) => return yc.flip(),
        (Some(xc), Some(yc)) if xc != yc => return xc,
        _ => {}
    }

    // Both due the same color: equalization outranks alternation, stronger
    // imbalance outranks weaker.
    let xd = &x.due_color;
    let yd = &y.due_color;
    if xd.is_equalize() && (!yd.is_equalize() || xd.strength() > yd.strength()) {
        return xd.color().expect("equalize carries a color");
    }
    if yd.is_equalize() && (!xd.is_equalize() || yd.strength() > xd.strength()) {
        return yd.color().expect("equalize carries a color").flip();
    }

    // Most recent round with differing colors decides (29E4.4).
    debug_assert!(
        x.color_history.len() == y.color_history.len(),
        "called `allocate_color` with history lengths {} vs {}",
        x.color_history.len(),
        y.color_history.len()
    );
    for (xm, ym) in x
        .color_history
        .iter()
        .rev()
        .zip(y.color_history.iter().rev())
    {
        let xc = xm.color();
        let yc = ym.color();
        if xc != yc {
            return match xc {
                None => yc.expect("one side played"),
                Some(c) => c.flip(),
            };
        }
    }

    // Rank breaks the remaining ties (29E4.5).
    if x.rank < y.rank {
        xd.color().expect("due color checked above")
    } else {
        yd.color().expect("due color checked above").flip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallchart_model::color::ColorMark;
    use wallchart_model::player::PlayerId;

    fn player(id: i32, rating: i16, rand: f64) -> Player {
        let mut p = Player::active(PlayerId::new(id, 0));
        p.rating = rating;
        p.rand = rand;
        p
    }

    fn with_history(mut p: Player, marks: &[ColorMark]) -> Player {
        p.color_history = marks.to_vec();
        p.due_color = DueColor::from_history(marks, 1);
        p
    }

    #[test]
    fn test_bye_board_gives_active_player_white() {
        let p = player(1, 1500, 0.1);
        let bye = Player::bye(1, 1);
        assert_eq!(allocate_color(&p, &bye, true), Color::White);
        assert_eq!(allocate_color(&bye, &p, true), Color::Black);
    }

    #[test]
    fn test_first_round_alternates_down_the_boards() {
        let a = player(1, 1800, 0.1);
        let b = player(2, 1500, 0.2);
        // Odd board: the upper player receives the first color (White).
        assert_eq!(allocate_color(&a, &b, true), Color::White);
        assert_eq!(allocate_color(&b, &a, true), Color::Black);
        // Even board: flipped.
        assert_eq!(allocate_color(&a, &b, false), Color::Black);
    }

    #[test]
    fn test_due_side_gets_its_color() {
        let a = with_history(player(1, 1800, 0.1), &[ColorMark::White]);
        let b = with_history(player(2, 1500, 0.2), &[ColorMark::HalfBye]);
        // a is due black to alternate; b has no due color.
        assert_eq!(allocate_color(&a, &b, true), Color::Black);
        assert_eq!(allocate_color(&b, &a, true), Color::White);
    }

    #[test]
    fn test_opposite_due_colors_both_satisfied() {
        let a = with_history(player(1, 1800, 0.1), &[ColorMark::White]);
        let b = with_history(player(2, 1500, 0.2), &[ColorMark::Black]);
        assert_eq!(allocate_color(&a, &b, true), Color::Black);
        assert_eq!(allocate_color(&b, &a, true), Color::White);
    }

    #[test]
    fn test_stronger_equalization_wins() {
        let a = with_history(
            player(1, 1800, 0.1),
            &[ColorMark::Black, ColorMark::Black, ColorMark::HalfBye],
        );
        let b = with_history(player(2, 1500, 0.2), &[ColorMark::HalfBye, ColorMark::HalfBye, ColorMark::Black]);
        // a is due White twice over, b once; a's claim is stronger.
        assert_eq!(allocate_color(&a, &b, true), Color::White);
    }

    #[test]
    fn test_recent_history_difference_breaks_equal_claims() {
        let a = with_history(
            player(1, 1800, 0.1),
            &[ColorMark::Black, ColorMark::Black, ColorMark::White],
        );
        let b = with_history(
            player(2, 1500, 0.2),
            &[ColorMark::White, ColorMark::Black, ColorMark::Black],
        );
        // Equal White claims; in the most recent round a had White and b had
        // Black, so a now takes Black (29E4.4).
        assert_eq!(allocate_color(&a, &b, true), Color::Black);
    }

    #[test]
    fn test_rematch_equalizes_against_that_opponent() {
        let mut a = with_history(player(1, 1800, 0.1), &[ColorMark::White, ColorMark::Black]);
        let b = with_history(player(2, 1500, 0.2), &[ColorMark::Black, ColorMark::White]);
        a.opponents = vec![PlayerId::new(2, 0)];
        a.played_colors = vec![Color::White];
        // a already had White against b, so a receives Black now.
        assert_eq!(allocate_color(&a, &b, true), Color::Black);
    }

    #[test]
    fn test_rank_breaks_final_tie() {
        use wallchart_model::index::RankIndex;
        // Identical histories, both due white to alternate.
        let mut a = with_history(player(1, 1800, 0.1), &[ColorMark::Black]);
        let mut b = with_history(player(2, 1500, 0.2), &[ColorMark::Black]);
        a.rank = RankIndex::new(0);
        b.rank = RankIndex::new(1);
        assert_eq!(allocate_color(&a, &b, true), Color::White);
        assert_eq!(allocate_color(&b, &a, true), Color::Black);
    }
}
