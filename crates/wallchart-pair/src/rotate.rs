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

//! Compound rotation moves.
//!
//! A plain swap only trades two slots; rotations slide a whole run of slots
//! by one board so a player can travel several boards without wrecking the
//! pairings in between. The parity of the two endpoints decides whether the
//! run stays inside one column (both odd or both even) or wraps through the
//! column boundary. `shift` nudges individual slots across their board's
//! color boundary; the shift-aware variants use it to preserve an expected
//! color pattern derived from the top board.
//!
//! The odd drop-down and pull-up flags extend a score-group-confined
//! rotation by the straggler board above or below the group.

use wallchart_model::{color::Color, index::RankIndex, roster::Roster};

/// Rotates the slots between `x` and `y` one board downward.
#[allow(clippy::too_many_arguments)]
pub fn rotate_pair_down(
    pair: &mut [RankIndex],
    mut x: usize,
    mut y: usize,
    mut p_begin: usize,
    mut p_end: usize,
    odd_drop_down: bool,
    odd_pull_up: bool,
    shift: &[bool],
) {
    debug_assert!(p_begin % 2 == 0 && p_begin <= x && x < y && y <= p_end && p_end % 2 == 0);
    if odd_drop_down {
        debug_assert!(y % 2 == 0 && y == p_end - 2);
        y -= 1;
        p_end -= 2;
    }
    if odd_pull_up {
        debug_assert!(x % 2 == 1 && x == p_begin + 1);
        x += 1;
        p_begin += 2;
        pair.swap(x - 1, x);
    }
    debug_assert!(p_begin <= x && x <= y && y <= p_end);

    let at = |z: usize| z + shift[z] as usize;
    if x % 2 == 0 {
        if y % 2 == 0 {
            let mut z = x;
            while z + 2 <= y {
                pair.swap(at(z), at(z + 2));
                z += 2;
            }
        } else {
            let mut z = x;
            while z + 2 < p_end {
                pair.swap(at(z), at(z + 2));
                z += 2;
            }
            pair.swap(p_end - 2, p_begin + 1);
            let mut z = p_begin + 1;
            while z + 2 <= y {
                pair.swap(at(z), at(z + 2));
                z += 2;
            }
        }
    } else if y % 2 == 0 {
        let mut z = y;
        while z + 2 < p_end {
            pair.swap(at(z), at(z + 2));
            z += 2;
        }
        pair.swap(p_end - 2, p_begin + 1);
        let mut z = p_begin + 1;
        while z + 2 <= x {
            pair.swap(at(z), at(z + 2));
            z += 2;
        }
    } else {
        let mut z = x;
        while z + 2 <= y {
            pair.swap(at(z), at(z + 2));
            z += 2;
        }
    }

    if odd_drop_down {
        pair.swap(y, y + 1);
    }
}

/// Rotates the slots between `x` and `y` one board upward; the inverse of
/// [`rotate_pair_down`].
#[allow(clippy::too_many_arguments)]
pub fn rotate_pair_up(
    pair: &mut [RankIndex],
    mut x: usize,
    mut y: usize,
    mut p_begin: usize,
    mut p_end: usize,
    odd_drop_down: bool,
    odd_pull_up: bool,
    shift: &[bool],
) {
    debug_assert!(p_begin % 2 == 0 && p_begin <= x && x < y && y <= p_end && p_end % 2 == 0);
    if odd_drop_down {
        debug_assert!(y % 2 == 0 && y == p_end - 2);
        y -= 1;
        p_end -= 2;
        pair.swap(y + 1, y);
    }
    if odd_pull_up {
        debug_assert!(x % 2 == 1 && x == p_begin + 1);
        x += 1;
        p_begin += 2;
    }
    debug_assert!(p_begin <= x && x <= y && y <= p_end);

    let at = |z: usize| z + shift[z] as usize;
    if x % 2 == 0 {
        if y % 2 == 0 {
            let mut z = y;
            while z >= x + 2 {
                pair.swap(at(z), at(z - 2));
                z -= 2;
            }
        } else {
            let mut z = y;
            while z >= p_begin + 2 {
                pair.swap(at(z), at(z - 2));
                z -= 2;
            }
            pair.swap(p_begin + 1, p_end - 2);
            let mut z = p_end - 2;
            while z >= x + 2 {
                pair.swap(at(z), at(z - 2));
                z -= 2;
            }
        }
    } else if y % 2 == 0 {
        let mut z = x;
        while z >= p_begin + 2 {
            pair.swap(at(z), at(z - 2));
            z -= 2;
        }
        pair.swap(p_begin + 1, p_end - 2);
        let mut z = p_end - 2;
        while z >= y + 2 {
            pair.swap(at(z), at(z - 2));
            z -= 2;
        }
    } else {
        let mut z = y;
        while z >= x + 2 {
            pair.swap(at(z), at(z - 2));
            z -= 2;
        }
    }

    if odd_pull_up {
        pair.swap(x, x - 1);
    }
}

/// The expected column color of slot `v` given the due colors on its board.
fn column_color(
    roster: &Roster,
    pair: &[RankIndex],
    v: usize,
    is_flip_x: bool,
) -> Option<Color> {
    let partner = if v % 2 == 0 { v + 1 } else { v - 1 };
    let own = roster[pair[v]].due_color.color();
    match own {
        Some(c) => Some(c),
        None => match roster[pair[partner]].due_color.color() {
            None => Some(if v % 2 == 0 { Color::White } else { Color::Black }),
            Some(oc) => Some(if is_flip_x { oc } else { oc.flip() }),
        },
    }
}

/// Rotates same-score players of opposite due colors across the span so
/// that both color histograms stay consistent. Returns `false` when the
/// span offers no such rotation (the caller then skips this move).
#[allow(clippy::too_many_arguments)]
pub fn rotate_color(
    roster: &Roster,
    pair: &mut [RankIndex],
    x: usize,
    y: usize,
    p_begin: usize,
    p_end: usize,
    odd_drop_down: bool,
    odd_pull_up: bool,
) -> bool {
    // A single row gap is an ordinary swap; nothing to rotate.
    if x / 2 + 1 >= y / 2 {
        return false;
    }
    let px = &roster[pair[x]];
    let py = &roster[pair[y]];
    if px.score != py.score {
        return false;
    }
    let x_color = px
        .due_color
        .color()
        .or_else(|| py.due_color.color().map(Color::flip));
    let y_color = py
        .due_color
        .color()
        .or_else(|| px.due_color.color().map(Color::flip));
    if x_color == y_color {
        return false;
    }
    let (x_color, y_color) = match (x_color, y_color) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    let is_flip_x =
        px.due_color.color() == Some(x_color) && py.due_color.color() == Some(y_color);

    let mut top = x;
    if odd_pull_up || x % 2 == 0 {
        top = x / 2 * 2 + 2;
        while top < y / 2 * 2 && column_color(roster, pair, top, is_flip_x) == Some(x_color) {
            top += 2;
        }
        if top >= y / 2 * 2 {
            // Not enough color changes in the span.
            return false;
        }
        let mut z = top;
        loop {
            if z == x || z + 1 == x {
                pair.swap(x, z + 2);
                top += 1;
                break;
            }
            pair.swap(z, z + 2);
            z -= 2;
        }
    }
    debug_assert!(top % 2 == 1);

    if odd_drop_down || y % 2 == 0 {
        let mut w = top;
        let mut z = w + 2;
        while z < y {
            debug_assert!(p_begin <= z - 2 && z - 2 <= p_end);
            if column_color(roster, pair, z, is_flip_x) == Some(y_color) {
                pair.swap(w, z);
                w = z;
            }
            z += 2;
        }
        pair.swap(w, y);
        w = y;
        let mut z = w + 1;
        while z > top + 2 {
            debug_assert!(p_begin <= z && z <= p_end);
            if column_color(roster, pair, z - 2, is_flip_x) == Some(x_color) {
                pair.swap(w, z - 2);
                w = z - 2;
            }
            z -= 2;
        }
    } else {
        let mut z = top;
        while z >= x + 4 {
            debug_assert!(p_begin <= z && z <= p_end);
            pair.swap(z, z - 2);
            z -= 2;
        }
        pair.swap(top, y);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallchart_model::index::RankIndex;

    fn pair_of(n: usize) -> Vec<RankIndex> {
        (0..n).map(RankIndex::new).collect()
    }

    fn r(x: usize) -> RankIndex {
        RankIndex::new(x)
    }

    #[test]
    fn test_rotate_down_same_column() {
        // Upper column slots 0..=4: rotation slides each one board down.
        let mut pair = pair_of(6);
        let shift = vec![false; 6];
        rotate_pair_down(&mut pair, 0, 4, 0, 6, false, false, &shift);
        assert_eq!(pair, vec![r(2), r(1), r(4), r(3), r(0), r(5)]);
    }

    #[test]
    fn test_rotate_up_inverts_rotate_down() {
        let mut pair = pair_of(8);
        let shift = vec![false; 8];
        rotate_pair_down(&mut pair, 0, 6, 0, 8, false, false, &shift);
        rotate_pair_up(&mut pair, 0, 6, 0, 8, false, false, &shift);
        assert_eq!(pair, pair_of(8));
    }

    #[test]
    fn test_rotate_down_cross_column() {
        // Even start, odd end: the run wraps through the column boundary.
        let mut pair = pair_of(6);
        let shift = vec![false; 6];
        rotate_pair_down(&mut pair, 0, 3, 0, 6, false, false, &shift);
        // The even column walks down, crosses at the bottom board, and the
        // odd column walks up to slot 3.
        assert_eq!(pair, vec![r(2), r(3), r(4), r(0), r(1), r(5)]);
    }

    #[test]
    fn test_rotate_up_cross_column_inverts() {
        let mut pair = pair_of(6);
        let shift = vec![false; 6];
        rotate_pair_down(&mut pair, 0, 3, 0, 6, false, false, &shift);
        rotate_pair_up(&mut pair, 0, 3, 0, 6, false, false, &shift);
        assert_eq!(pair, pair_of(6));
    }

    #[test]
    fn test_rotate_down_odd_column_only() {
        let mut pair = pair_of(6);
        let shift = vec![false; 6];
        rotate_pair_down(&mut pair, 1, 5, 0, 6, false, false, &shift);
        assert_eq!(pair, vec![r(0), r(3), r(2), r(5), r(4), r(1)]);
    }

    #[test]
    fn test_shift_crosses_board_boundary() {
        // A shift on slot 2 swaps with its partner instead: slot 3 takes the
        // travelling player.
        let mut pair = pair_of(4);
        let shift = vec![false, false, true, false];
        rotate_pair_down(&mut pair, 0, 2, 0, 4, false, false, &shift);
        assert_eq!(pair, vec![r(3), r(1), r(2), r(0)]);
    }
}
