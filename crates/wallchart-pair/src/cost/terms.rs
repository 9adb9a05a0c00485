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

//! Per-board cost terms.
//!
//! Each function scores one rule for one side of a board: the first player
//! argument is the side the contribution (and its warning code) is
//! attributed to. Terms are pure; the evaluator in the parent module sums
//! them into the priority slots and records the codes.
//!
//! Rule references follow the USCF rule book.

use wallchart_core::num::geometric::severity_weight;
use wallchart_model::{
    color::Color,
    cost::CostValue,
    player::Player,
    roster::Roster,
};

use crate::board::PairVec;

pub const BYE_CHOICE_DESC: &str = "Bye request mismatch (22C,28M1,29K)";
pub const BYE_AGAIN_DESC: &str = "Bye ineligible (28L3)";
pub const IDENTICAL_MATCH_DESC: &str = "Identical rematch (30F)";
pub const MEET_TWICE_DESC: &str = "Players meet twice (27A1,28S1,28S2,29C2)";
pub const TEAM_BLOCKS2_DESC: &str = "Team block violated, not plus-two (28N,U)";
pub const UNEQUAL_SCORES_DESC: &str = "Unequal scores (27A2,29A,29B)";
pub const TEAM_BLOCKS_DESC: &str = "Team block violated (28N,U)";
pub const BYE_AFTER_HALF_DESC: &str = "Bye after half (28L4)";
pub const LOWEST_SCORE_BYE_DESC: &str = "Bye player is not from the lowest score group (28L2)";
pub const LOWEST_RATED_BYE_DESC: &str =
    "Bye player unrated and (if cost=2) may have too few games (28L2)";
pub const ODD_PLAYER_UNRATED_DESC: &str = "Odd player unrated (29D1)";
pub const ODD_PLAYER_GROUPS_DESC: &str = "Odd player across multiple groups (29D2)";
pub const COLOR_IMBALANCE_DESC: &str = "Color not balanced (27A4)";
pub const COLOR_REPEAT3_DESC: &str = "Color 3+ in a row (29E5f)";
pub const COLOR_ALTERNATE_DESC: &str = "Color not alternating (27A5)";
pub const REVERSED_COLORS_DESC: &str = "Colors reversed for pair (28J;29E2,4)";
pub const BOARD_OVERLAP_DESC: &str = "Board number overlap (28J)";
pub const BOARD_ORDER_DESC: &str = "Board number order (28J)";

/// Rules 22C, 28M1, 29K: a player paired against their bye request — either
/// handed the bye while wanting a game, or given a game while requesting a
/// bye.
pub fn bye_choice(x: &Player, y: &Player) -> CostValue {
    let mismatch = !x.is_bye()
        && !x.bye_house
        && if x.bye_request {
            !y.is_bye()
        } else {
            y.is_bye()
        };
    mismatch as CostValue
}

/// Rule 28L3: repeated full-point byes.
pub fn bye_again(x: &Player, y: &Player, players: usize) -> CostValue {
    if !x.is_bye() && y.is_bye() {
        severity_weight(x.full_bye_count() as CostValue, players as CostValue)
    } else {
        0
    }
}

/// Rule 30F: a rematch repeating the exact same colors.
pub fn identical_match(x: &Player, y: &Player, players: usize, x_color: Color) -> CostValue {
    let rematch_x = y
        .entry
        .map_or(0, |id| x.games_against_with_color(id, x_color));
    let rematch_y = x
        .entry
        .map_or(0, |id| y.games_against_with_color(id, x_color.flip()));
    severity_weight(rematch_x.max(rematch_y) as CostValue, players as CostValue)
}

/// Rules 27A1, 28S1, 28S2, 29C2: any repeated pairing.
pub fn players_meet_twice(x: &Player, y: &Player, players: usize) -> CostValue {
    let rematch_x = y.entry.map_or(0, |id| {
        x.opponents.iter().filter(|o| o.id == id.id).count()
    });
    let rematch_y = x.entry.map_or(0, |id| {
        y.opponents.iter().filter(|o| o.id == id.id).count()
    });
    severity_weight(rematch_x.max(rematch_y) as CostValue, players as CostValue)
}

fn plus_score(p: &Player) -> f32 {
    p.score - p.round as f32 / 2.0
}

fn team_block_count(x: &Player, y: &Player) -> CostValue {
    y.entry.map_or(0, |id| {
        x.teammates.iter().filter(|t| **t == id.id).count() as CostValue
    })
}

/// Rules 28N, 28N1, 28T — the below-plus-two half of the team block, used
/// when the zero-threshold variation is off. High scorers are exempt so that
/// prize contention is never distorted.
pub fn team_blocks2(x: &Player, y: &Player, players: usize) -> CostValue {
    if x.rank < y.rank && (plus_score(x) < 2.0 || plus_score(y) < 2.0) {
        severity_weight(team_block_count(x, y), players as CostValue)
    } else {
        0
    }
}

/// Rules 28N, 28N1, 28T — every team block, regardless of score.
pub fn team_blocks(x: &Player, y: &Player, players: usize) -> CostValue {
    if x.rank < y.rank {
        severity_weight(team_block_count(x, y), players as CostValue)
    } else {
        0
    }
}

/// Rules 27A2, 29A, 29B: pairing across score groups, weighted by the score
/// gap and by how high the pairing sits.
pub fn unequal_scores(x: &Player, y: &Player) -> CostValue {
    if x.score == y.score || x.rank >= y.rank {
        return 0;
    }
    let gap = (2.0 * (x.score - y.score).abs()) as CostValue;
    let weight = severity_weight(gap, x.round as CostValue);
    let scaled = weight.saturating_mul(x.round as CostValue) as f64 + 2.0 * x.score.max(y.score) as f64;
    scaled.round() as CostValue
}

/// Rule 28L4: involuntary bye for a player who already has half byes or
/// forfeit wins.
pub fn bye_after_half(x: &Player, y: &Player, players: usize) -> CostValue {
    if !x.is_bye() && y.is_bye() && !x.bye_request {
        severity_weight(x.half_bye_count as CostValue, players as CostValue)
    } else {
        0
    }
}

/// Rule 28L2: the bye should come from the lowest score group.
pub fn lowest_score_bye(x: &Player, y: &Player, players: usize, lowest_score: f32) -> CostValue {
    if !x.is_bye() && y.is_bye() && !x.bye_request && x.score - lowest_score > 0.25 {
        severity_weight(
            (2.0 * (x.score - lowest_score)) as CostValue,
            players as CostValue,
        )
    } else {
        0
    }
}

/// Rules 28L2, 28L5: the bye should not go to an unrated player, and
/// especially not to one who would finish the event without enough games for
/// a rating.
pub fn lowest_rated_bye(x: &Player, y: &Player, remaining_rounds: u16) -> CostValue {
    if x.is_bye() || !y.is_bye() || x.bye_request || !x.unrated_in_rated_section() {
        return 0;
    }
    let expected_games =
        x.provisional as i32 + (x.round as i32 + remaining_rounds as i32 - x.unplayed_count as i32 - 1);
    if expected_games < 4 {
        2
    } else {
        1
    }
}

/// Rule 29D1: the odd player dropped to another score group should not be
/// the unrated one. Disabled in SwissSys compatibility mode.
pub fn odd_player_unrated(x: &Player, y: &Player, swiss_sys_compat: bool) -> CostValue {
    if swiss_sys_compat {
        return 0;
    }
    (!x.is_bye() && !y.is_bye() && x.score != y.score && x.unrated_in_rated_section()) as CostValue
}

/// Rule 29D2: a drop-down spanning more than one score group.
pub fn odd_player_multiple_groups(x: &Player, y: &Player, players: usize) -> CostValue {
    if !x.is_bye() && !y.is_bye() && x.score - y.score > 0.75 {
        severity_weight(
            (2.0 * (x.score - y.score - 0.5)) as CostValue,
            players as CostValue,
        )
    } else {
        0
    }
}

/// Rules 27A4, 29E4: an equalization due color not honoured.
pub fn color_imbalance(x: &Player, y: &Player, x_color: Color) -> CostValue {
    (x.due_color.is_equalize()
        && x.due_color.color() != Some(x_color)
        && !x.is_bye()
        && !y.is_bye()) as CostValue
}

/// Rule 29E5f: three or more consecutive games with the same color.
pub fn color_repeat3(x: &Player, y: &Player, x_color: Color) -> CostValue {
    if x.is_bye() || y.is_bye() {
        return 0;
    }
    let mut streak = 1;
    for mark in x.color_history.iter().rev() {
        match mark.color() {
            Some(c) if c == x_color => streak += 1,
            Some(_) => break,
            None => {}
        }
    }
    (streak >= 3) as CostValue
}

/// Rule 27A5: an alternation due color not honoured (the assigned color
/// repeats the most recent played color).
pub fn color_alternate(x: &Player, y: &Player, x_color: Color) -> CostValue {
    if x.is_bye() || y.is_bye() || x.due_color.color() == Some(x_color) {
        return 0;
    }
    x.color_history
        .iter()
        .rev()
        .find_map(|m| m.color())
        .is_some_and(|last| last == x_color) as CostValue
}

/// Rules 28J, 29E2/4: annotation for a board whose computed White differs
/// from the hinted color. Boards without a color hint are not flagged.
pub fn reversed_colors(x: &Player, _y: &Player, x_color: Color) -> CostValue {
    (x.board_color.is_some_and(|hint| hint != x_color) && x_color == Color::White) as CostValue
}

/// Rule 28J: annotation for a board hint colliding with another board.
pub fn board_overlap(x: &Player, y: &Player, roster: &Roster, pair: &PairVec) -> CostValue {
    if x.rank >= y.rank || x.board_num < 0 {
        return 0;
    }
    let mut cv = 0;
    for z in (0..pair.len()).step_by(2) {
        let upper = &roster[pair[z]];
        let lower = &roster[pair[z + 1]];
        if lower.is_bye() {
            continue;
        }
        if upper.entry == x.entry || lower.entry == x.entry {
            continue;
        }
        if x.board_num == upper.board_num {
            cv += 1;
        }
    }
    cv
}

/// Rule 28J: annotation for boards whose hinted numbers are out of order
/// relative to the board directly above.
#[allow(clippy::too_many_arguments)]
pub fn board_order(
    px: &Player,
    py: &Player,
    roster: &Roster,
    pair: &PairVec,
    x_slot: usize,
    y_slot: usize,
    p_begin: usize,
    p_end: usize,
) -> CostValue {
    debug_assert!(x_slot.abs_diff(y_slot) == 1);
    let w = x_slot.min(y_slot);
    if px < py && !px.is_bye() && !py.is_bye() && p_begin + 2 <= w && w < p_end {
        let prev_upper = &roster[pair[w - 2]];
        let prev_lower = &roster[pair[w - 1]];
        let here = px.board_num.min(py.board_num);
        if prev_upper.board_num > here
            && prev_lower.board_num > here
            && prev_lower.paired == py.paired
            && prev_upper.paired == py.paired
            && !prev_upper.is_bye()
            && !prev_lower.is_bye()
        {
            return 1;
        }
    }
    0
}
