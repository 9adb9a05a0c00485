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

//! The greedy depth-bounded local search.
//!
//! Enumerates `d`-tuples of slot pairs (depth 1 is single swaps) where at
//! least one endpoint contributed cost, applies up to eight move variants
//! per tuple — plain swap, full-range rotations, score-group-confined
//! rotations with odd-player parity handling, the color rotation, and the
//! color-shift-aware rotations — re-sorts the boards, and accepts a
//! candidate iff its cost is strictly lower in the lexicographic order.
//! First improvement commits immediately and the level restarts; a level
//! with no improvement raises the depth until the configured bound.
//!
//! The main pass runs without the expensive multi-round lookahead; a
//! verification pass then re-evaluates with it, and on disagreement the
//! whole search is redone with the lookahead enabled. The final evaluation
//! emits the warning codes.

use tracing::debug;
use wallchart_model::{config::PairingConfig, cost::Cost, roster::Roster};

use crate::{
    board::{self, PairVec},
    color::allocate_color,
    cost::{cost_function, Evaluation},
    rotate,
    stats::SearchStatistics,
};

/// Minimises the pairing cost over the slot range `[p_begin, p_end_const)`;
/// `pair` is updated in place to the best pairing found.
#[allow(clippy::too_many_arguments)]
pub fn minimize_cost(
    roster: &mut Roster,
    pair: &mut PairVec,
    remaining_rounds: u16,
    depth: u8,
    p_begin: usize,
    p_end_const: usize,
    use_pairable: bool,
    config: &PairingConfig,
    stats: &mut SearchStatistics,
) -> Cost {
    let mut p_end = p_end_const;
    let has_bye = p_end % 2 != 0;
    if has_bye && p_end < pair.len() && roster[pair[p_end]].is_bye() {
        p_end += 1;
    }
    debug_assert!(p_begin % 2 == 0 && p_end % 2 == 0);
    debug_assert!(p_begin <= p_end && p_end <= pair.len());
    board::assert_no_duplicates(roster, pair);

    let mut best_pair = pair.clone();
    let mut best: Evaluation = cost_function(
        roster,
        &best_pair,
        remaining_rounds,
        p_begin,
        p_end,
        false,
        use_pairable,
        config,
    );
    stats.on_cost_evaluation();

    let no_shift = vec![false; p_end];

    let mut d: usize = 1;
    while p_begin < p_end && d <= depth as usize {
        let mut i = vec![p_begin; 2 * d];
        let mut found_better = false;

        'tuples: while !best.cost.is_zero() {
            // Odometer advance to the next valid tuple; wrap-around ends the
            // level.
            'advance: loop {
                let mut j = 0;
                while j < i.len() {
                    i[j] += 1;
                    if i[j] >= p_end || roster[best_pair[i[j]]].is_bye() {
                        i[j] = p_begin;
                        j += 1;
                    } else {
                        break;
                    }
                }
                if i.iter().all(|v| *v == p_begin) {
                    break 'tuples;
                }
                for j in (0..i.len()).step_by(2) {
                    // Canonical tuple order, so no candidate repeats.
                    let unordered = if d <= 1 {
                        (j > 0 && i[j] <= i[j - 2]) || i[j + 1] <= i[j]
                    } else {
                        (j > 0 && i[j] < i[j - 2]) || i[j + 1] < i[j]
                    };
                    if unordered {
                        continue 'advance;
                    }
                    // Cost-guided pruning: the pair must touch a player that
                    // contributed cost.
                    if !best.touched.contains(best_pair[i[j]].get())
                        && !best.touched.contains(best_pair[i[j + 1]].get())
                    {
                        continue 'advance;
                    }
                }
                break 'advance;
            }

            let mut max_change = 0;
            for j in (0..i.len()).step_by(2) {
                debug_assert!(if d <= 1 { i[j + 1] > i[j] } else { i[j + 1] >= i[j] });
                max_change = max_change.max(i[j + 1] - i[j]);
            }

            let variants = if max_change <= 2 { 1 } else { 8 };
            's_loop: for s in 0..variants {
                let mut test_pair = best_pair.clone();
                for j in (0..i.len()).step_by(2) {
                    if i[j] >= i[j + 1] {
                        debug_assert!(d >= 2 && i[j] == i[j + 1]);
                        continue;
                    }
                    let has_bye2 = has_bye && (i[j] >= p_end - 2 || i[j + 1] >= p_end - 2);
                    let p_end2 = if has_bye && !has_bye2 { p_end - 2 } else { p_end };
                    match s {
                        0 => test_pair.swap(i[j], i[j + 1]),
                        1 => rotate::rotate_pair_down(
                            &mut test_pair,
                            i[j],
                            i[j + 1],
                            p_begin,
                            p_end2,
                            has_bye2,
                            false,
                            &no_shift,
                        ),
                        2 => rotate::rotate_pair_up(
                            &mut test_pair,
                            i[j],
                            i[j + 1],
                            p_begin,
                            p_end2,
                            has_bye2,
                            false,
                            &no_shift,
                        ),
                        3 | 4 | 5 => {
                            // Confined to the spanning score group, with odd
                            // drop-down and pull-up stragglers included.
                            let score = roster[test_pair[i[j]]].score;
                            if roster[test_pair[i[j + 1]]].score != score {
                                continue 's_loop;
                            }
                            let mut s_begin = i[j] / 2 * 2;
                            while s_begin > p_begin
                                && roster[test_pair[s_begin - 2]].score == score
                                && roster[test_pair[s_begin - 1]].score == score
                            {
                                s_begin -= 2;
                            }
                            let odd_pull_up = i[j] == s_begin + 1
                                && roster[test_pair[s_begin]].score > score;
                            let mut s_end = i[j + 1] / 2 * 2 + 2;
                            while s_end < p_end2
                                && roster[test_pair[s_end]].score == score
                                && roster[test_pair[s_end + 1]].score == score
                            {
                                s_end += 2;
                            }
                            let odd_drop_down = i[j + 1] == s_end - 2
                                && (roster[test_pair[s_end - 1]].score < score
                                    || roster[test_pair[s_end - 1]].is_bye());
                            debug_assert!(
                                p_begin <= s_begin
                                    && s_begin <= i[j]
                                    && i[j] < i[j + 1]
                                    && i[j + 1] <= s_end
                                    && s_end <= p_end2
                            );
                            match s {
                                3 => rotate::rotate_pair_down(
                                    &mut test_pair,
                                    i[j],
                                    i[j + 1],
                                    s_begin,
                                    s_end,
                                    odd_drop_down,
                                    odd_pull_up,
                                    &no_shift,
                                ),
                                4 => rotate::rotate_pair_up(
                                    &mut test_pair,
                                    i[j],
                                    i[j + 1],
                                    s_begin,
                                    s_end,
                                    odd_drop_down,
                                    odd_pull_up,
                                    &no_shift,
                                ),
                                _ => {
                                    if !rotate::rotate_color(
                                        roster,
                                        &mut test_pair,
                                        i[j],
                                        i[j + 1],
                                        s_begin,
                                        s_end,
                                        odd_drop_down,
                                        odd_pull_up,
                                    ) {
                                        continue 's_loop;
                                    }
                                }
                            }
                        }
                        6 | 7 => {
                            // Shift slots whose board's expected color flips
                            // relative to the top board.
                            let mut shift = vec![false; p_end2];
                            let partner = if p_begin % 2 == 0 {
                                p_begin + 1
                            } else {
                                p_begin - 1
                            };
                            let start_color = allocate_color(
                                &roster[test_pair[p_begin]],
                                &roster[test_pair[partner]],
                                (p_begin / 2) % 2 == 0,
                            );
                            let mut c = p_begin / 2 * 2 + 2;
                            while c < p_end2 {
                                shift[c] = start_color
                                    != allocate_color(
                                        &roster[test_pair[c]],
                                        &roster[test_pair[c + 1]],
                                        (c / 2) % 2 == 0,
                                    );
                                c += 2;
                            }
                            if s == 6 {
                                rotate::rotate_pair_down(
                                    &mut test_pair,
                                    i[j],
                                    i[j + 1],
                                    p_begin,
                                    p_end2,
                                    has_bye2,
                                    false,
                                    &shift,
                                );
                            } else {
                                rotate::rotate_pair_up(
                                    &mut test_pair,
                                    i[j],
                                    i[j + 1],
                                    p_begin,
                                    p_end2,
                                    has_bye2,
                                    false,
                                    &shift,
                                );
                            }
                        }
                        _ => unreachable!(),
                    }
                }

                board::normalize_board_slots(&mut test_pair);
                board::sort_boards(roster, &mut test_pair);

                stats.on_try(s);
                let test = cost_function(
                    roster,
                    &test_pair,
                    remaining_rounds,
                    p_begin,
                    p_end,
                    false,
                    use_pairable,
                    config,
                );
                stats.on_cost_evaluation();

                if test.cost < best.cost {
                    stats.on_accept(s);
                    best_pair = test_pair;
                    best = test;
                    found_better = true;
                }
            }
        }

        if !found_better {
            d += 1;
        }
        // An improving level runs again at the same depth.
    }

    *pair = best_pair;

    if !use_pairable {
        // Verify under the full cost; a disagreement means the cheap search
        // painted itself into an unpairable corner.
        let check = cost_function(
            roster,
            pair,
            remaining_rounds,
            p_begin,
            p_end,
            false,
            true,
            config,
        );
        stats.on_cost_evaluation();
        if check.cost != best.cost {
            debug!(
                section = %config.section_name,
                "lookahead disagrees with the fast pass; redoing the search"
            );
            stats.on_lookahead_redo();
            return minimize_cost(
                roster,
                pair,
                remaining_rounds,
                depth,
                p_begin,
                p_end,
                true,
                config,
                stats,
            );
        }
    }

    // Same pairing, but now writing warning codes.
    let final_eval = cost_function(
        roster,
        pair,
        remaining_rounds,
        p_begin,
        p_end,
        true,
        true,
        config,
    );
    stats.on_cost_evaluation();
    board::assert_no_duplicates(roster, pair);
    final_eval.cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallchart_model::index::RankIndex;
    use wallchart_model::player::{Player, PlayerId};

    fn player(id: i32, score: f32, rating: i16, rand: f64) -> Player {
        let mut p = Player::active(PlayerId::new(id, 0));
        p.score = score;
        p.rating = rating;
        p.rand = rand;
        p
    }

    fn r(x: usize) -> RankIndex {
        RankIndex::new(x)
    }

    #[test]
    fn test_optimiser_reaches_zero_from_bad_seed() {
        let mut roster = Roster::canonicalise(vec![
            player(1, 0.0, 2000, 0.1),
            player(2, 0.0, 1800, 0.2),
            player(3, 0.0, 1700, 0.3),
            player(4, 0.0, 1500, 0.4),
        ])
        .expect("canonicalise");
        // Worst seed: top two together, bottom two together.
        let mut pair = vec![r(0), r(1), r(2), r(3)];
        let config = PairingConfig::new(1);
        let mut stats = SearchStatistics::default();
        let cost = minimize_cost(&mut roster, &mut pair, 0, 2, 0, 4, false, &config, &mut stats);
        assert!(cost.is_zero(), "cost was {cost}");
        assert_eq!(pair, vec![r(0), r(2), r(1), r(3)]);
        assert!(stats.total_accepts() >= 1);
    }

    #[test]
    fn test_optimiser_avoids_rematch() {
        use wallchart_model::color::{Color, ColorMark};
        // Round 2 after 1>3, 2>4; the seed repeats round 1.
        let mut a = player(1, 1.0, 2000, 0.1);
        let mut b = player(2, 1.0, 1800, 0.2);
        let mut c = player(3, 0.0, 1700, 0.3);
        let mut d = player(4, 0.0, 1500, 0.4);
        for p in [&mut a, &mut b, &mut c, &mut d] {
            p.round = 2;
        }
        for (winner, loser) in [(&mut a, 3), (&mut b, 4)] {
            winner.opponents = vec![PlayerId::new(loser, 0)];
            winner.played_colors = vec![Color::White];
            winner.color_history = vec![ColorMark::White];
        }
        for (loser, winner) in [(&mut c, 1), (&mut d, 2)] {
            loser.opponents = vec![PlayerId::new(winner, 0)];
            loser.played_colors = vec![Color::Black];
            loser.color_history = vec![ColorMark::Black];
        }
        let mut roster = Roster::canonicalise(vec![a, b, c, d]).expect("canonicalise");
        let mut pair = vec![r(0), r(2), r(1), r(3)];
        let config = PairingConfig::new(2);
        let mut stats = SearchStatistics::default();
        let cost = minimize_cost(&mut roster, &mut pair, 0, 2, 0, 4, false, &config, &mut stats);
        assert_eq!(cost.players_meet_twice, 0, "cost was {cost}");
        // Scenario S2: leaders meet on board one.
        assert_eq!(pair[0], r(0));
        assert_eq!(pair[1], r(1));
    }

    #[test]
    fn test_optimiser_rejects_team_block_swap() {
        // Spec scenario S5: teammates 1 and 2 must not meet; the compliant
        // pairing is already seeded and must survive.
        let mut players: Vec<Player> = (0..8)
            .map(|i| {
                let mut p = player(i as i32 + 1, 0.0, 2000 - 100 * i as i16, 0.1 * (i as f64 + 1.0));
                p.round = 4;
                p
            })
            .collect();
        players[0].team_id = 5;
        players[1].team_id = 5;
        players[0].teammates = vec![2];
        players[1].teammates = vec![1];
        let mut roster = Roster::canonicalise(players).expect("canonicalise");
        let mut pair: Vec<RankIndex> = vec![r(0), r(4), r(1), r(5), r(2), r(6), r(3), r(7)];
        let config = PairingConfig::new(4);
        let mut stats = SearchStatistics::default();
        let cost = minimize_cost(&mut roster, &mut pair, 0, 2, 0, 8, false, &config, &mut stats);
        assert_eq!(cost.team_blocks, 0, "cost was {cost}");
        // Players 1 and 2 (ranks 0 and 1) are on different boards.
        let board_of = |rank: RankIndex| pair.iter().position(|p| *p == rank).unwrap() / 2;
        assert_ne!(board_of(r(0)), board_of(r(1)));
    }

    #[test]
    fn test_skipped_when_already_optimal() {
        let mut roster = Roster::canonicalise(vec![
            player(1, 0.0, 2000, 0.1),
            player(2, 0.0, 1800, 0.2),
            player(3, 0.0, 1700, 0.3),
            player(4, 0.0, 1500, 0.4),
        ])
        .expect("canonicalise");
        let mut pair = vec![r(0), r(2), r(1), r(3)];
        let config = PairingConfig::new(1);
        let mut stats = SearchStatistics::default();
        let cost = minimize_cost(&mut roster, &mut pair, 0, 1, 0, 4, false, &config, &mut stats);
        assert!(cost.is_zero());
        assert_eq!(pair, vec![r(0), r(2), r(1), r(3)]);
        assert_eq!(stats.total_tries(), 0, "zero cost skips the enumeration");
    }
}
