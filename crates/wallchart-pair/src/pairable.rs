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

//! Multi-round feasibility lookahead (rules 27A1, 29C2, 29K, 29L).
//!
//! Answers: can the remaining rounds be completed so that nobody meets twice
//! (and, for the team variant, no team block is violated)? The check blends
//! round-robin and Swiss: as the round count approaches the section size the
//! only completions left are round-robin-like, and the backtracker invents
//! them as needed around withdrawals, late entries, and future byes.
//!
//! The search is exponential in the worst case, so it carries a node budget;
//! exhaustion is reported as infeasible, which over-approximates
//! conservatively and keeps the runtime bounded. The same reasoning backs
//! the one-team-majority short-circuit: such sections can never finish a
//! team-blocked schedule, and proving it row by row is needlessly slow.

use fixedbitset::FixedBitSet;
use tracing::warn;
use wallchart_model::{cost::CostValue, roster::Roster};

use crate::{board::PairVec, warn::WarnCode};

const CANT_PAIR_PLAYERS_DESC: &str = "Can't pair future rounds (27A1)";
const CANT_PAIR_TEAMS_DESC: &str = "Can't pair future rounds with team block (28N,U)";

/// Pairing grid: the lower triangle holds forbidden pairs (history, current
/// round, team blocks), the upper triangle holds the tentative future-round
/// assignments the backtracker is exploring.
#[derive(Clone)]
struct Grid {
    n: usize,
    cells: Vec<i32>,
}

impl Grid {
    fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![0; n * n],
        }
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> i32 {
        self.cells[row * self.n + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: i32) {
        self.cells[row * self.n + col] = value;
    }

    /// Marks an unordered pair as forbidden (lower triangle).
    #[inline]
    fn forbid(&mut self, a: usize, b: usize) {
        if a < b {
            self.set(b, a, -1);
        } else {
            self.set(a, b, -1);
        }
    }

    /// Folds this round's tentative pairs into the forbidden set and clears
    /// the upper triangle for the next round.
    fn fold_round(&self, round: i32) -> Grid {
        let mut next = self.clone();
        for x in 0..self.n {
            for y in x + 1..self.n {
                if self.get(x, y) != 0 {
                    next.set(y, x, round);
                }
                next.set(x, y, 0);
            }
        }
        next
    }
}

struct Search<'a> {
    byes: &'a [FixedBitSet],
    budget: u64,
    nodes: u64,
    exhausted: bool,
}

impl Search<'_> {
    /// One full round: rows up to `players - pairs_needed + 1` may start a
    /// pairing, which leaves room for exactly one odd player to sit out.
    fn round(&mut self, grid: &mut Grid, rounds: usize) -> bool {
        if rounds == 0 {
            return true;
        }
        let players = grid.n;
        let byes = self.byes[rounds - 1].count_ones(..);
        let end = players - (players - byes) / 2 + 1;
        self.rows(grid, rounds, 0, end)
    }

    fn rows(&mut self, grid: &mut Grid, rounds: usize, begin: usize, end: usize) -> bool {
        let players = grid.n;
        if players <= 1 {
            return true;
        }
        for row in begin..end.min(players) {
            if self.byes[rounds - 1].contains(row) {
                continue;
            }
            'col: for col in row + 1..players {
                if self.byes[rounds - 1].contains(col) {
                    continue;
                }
                if grid.get(row, col) != 0 || grid.get(col, row) != 0 {
                    continue;
                }
                for z in 0..row {
                    if grid.get(z, col) != 0 || grid.get(z, row) != 0 {
                        continue 'col;
                    }
                }

                self.nodes += 1;
                if self.nodes > self.budget {
                    self.exhausted = true;
                    return false;
                }

                grid.set(row, col, rounds as i32);
                if end >= players {
                    // Round complete; descend into the next one.
                    if rounds <= 1 {
                        return true;
                    }
                    let mut next = grid.fold_round(rounds as i32);
                    if self.round(&mut next, rounds - 1) {
                        *grid = next;
                        return true;
                    }
                } else if self.rows(grid, rounds, row + 1, end + 1) {
                    return true;
                }
                grid.set(row, col, 0);

                if self.exhausted {
                    return false;
                }
            }
        }
        false
    }
}

/// Returns `true` when one team holds at least half the section. Such a
/// section can never complete under team blocks, and is reported infeasible
/// without searching.
pub fn one_team_majority(roster: &Roster) -> bool {
    let n = roster.section_size();
    let mut teams: Vec<i32> = roster.players()[..n].iter().map(|p| p.team_id).collect();
    teams.sort_unstable();

    let mut mode = 0;
    let mut mode_count = 0usize;
    let mut current = 0;
    let mut current_count = 0usize;
    for team in teams.iter().copied() {
        if team == current {
            current_count += 1;
        } else {
            current = team;
            current_count = 1;
        }
        if current_count > mode_count {
            mode = current;
            mode_count = current_count;
        }
    }
    // >= rather than >: exactly half the section is already a search-killer.
    mode != 0 && 2 * mode_count >= teams.len()
}

/// The lookahead cost: 1 when the remaining rounds cannot be completed, else
/// 0. `code` carries the warning letter on the final codes pass.
pub fn pairable_cost(
    roster: &mut Roster,
    pair: &PairVec,
    remaining_rounds: u16,
    is_team: bool,
    node_budget: u64,
    code: Option<WarnCode>,
) -> CostValue {
    if remaining_rounds == 0 {
        return 0;
    }
    if is_team && one_team_majority(roster) {
        return 1;
    }

    let remaining = remaining_rounds as usize;
    let rounds_total = roster.players()[0].round as usize + remaining;
    let num = roster.section_size();

    let mut byes: Vec<FixedBitSet> = vec![FixedBitSet::with_capacity(num.max(1)); remaining];
    let mut grid = Grid::new(num);

    for y in 0..num {
        let p = &roster.players()[y];
        let r1 = p.rank.get();
        if r1 >= num {
            warn!(player = %p, "rank out of range in pairable lookahead");
            continue;
        }
        for bye_round in p.bye_rounds.iter().copied() {
            let bye_round = bye_round as usize;
            if bye_round > rounds_total {
                warn!(
                    player = %p,
                    bye_round,
                    "bye round past the end of the event ignored in lookahead"
                );
            } else if rounds_total - bye_round < remaining {
                byes[rounds_total - bye_round].insert(r1);
            }
        }
        for r2 in p.opponent_ranks.iter() {
            if r2.get() < num {
                grid.forbid(r1, r2.get());
            }
        }
        if is_team {
            for r2 in p.teammate_ranks.iter() {
                if r2.get() < num {
                    grid.forbid(r1, r2.get());
                }
            }
        }
    }

    // The candidate round under evaluation is forbidden in future rounds too.
    debug_assert!(pair.len() % 2 == 0);
    for board in pair.chunks_exact(2) {
        let (r1, r2) = (board[0], board[1]);
        debug_assert!(r1 != r2);
        if !roster[r1].is_bye() && !roster[r2].is_bye() {
            grid.forbid(r1.get(), r2.get());
        }
    }

    let mut search = Search {
        byes: &byes,
        budget: node_budget,
        nodes: 0,
        exhausted: false,
    };
    let is_pairable = search.round(&mut grid, remaining);

    if search.exhausted {
        warn!(
            section = roster.players()[0].section_id,
            nodes = search.nodes,
            "pairable lookahead node budget exhausted; reporting infeasible"
        );
    }
    if !is_pairable {
        if let Some(code) = code {
            let desc = if is_team {
                CANT_PAIR_TEAMS_DESC
            } else {
                CANT_PAIR_PLAYERS_DESC
            };
            crate::warn::record(&mut roster.players_mut()[0].warn_codes, code, desc);
        }
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallchart_model::index::RankIndex;
    use wallchart_model::player::{Player, PlayerId};

    fn roster_of(n: usize) -> Roster {
        let players = (0..n)
            .map(|i| {
                let mut p = Player::active(PlayerId::new(i as i32 + 1, 0));
                p.rating = 1500 - 10 * i as i16;
                p.rand = 0.01 * (i as f64 + 1.0);
                p
            })
            .collect();
        Roster::canonicalise(players).expect("canonicalise")
    }

    fn r(x: usize) -> RankIndex {
        RankIndex::new(x)
    }

    #[test]
    fn test_fresh_section_is_pairable() {
        let mut roster = roster_of(4);
        let pair = vec![r(0), r(2), r(1), r(3)];
        // Round 1 of 3: two future rounds must be completable.
        let cv = pairable_cost(&mut roster, &pair, 2, false, 1 << 20, None);
        assert_eq!(cv, 0);
    }

    #[test]
    fn test_exhausted_round_robin_is_infeasible() {
        // Four players, everyone has played everyone; one more round cannot
        // avoid a rematch.
        let mut roster = roster_of(4);
        for x in 0..4 {
            let others: Vec<RankIndex> = (0..4).filter(|y| *y != x).map(r).collect();
            roster.players_mut()[x].opponent_ranks = others;
            roster.players_mut()[x].round = 4;
        }
        let pair = vec![r(0), r(1), r(2), r(3)];
        let cv = pairable_cost(&mut roster, &pair, 1, false, 1 << 20, None);
        assert_eq!(cv, 1);
    }

    #[test]
    fn test_current_round_pairs_are_excluded_from_future() {
        // Three of three rounds in a four-player section: a full round robin
        // exists only if the current round does not repeat later.
        let mut roster = roster_of(4);
        let pair = vec![r(0), r(3), r(1), r(2)];
        let cv = pairable_cost(&mut roster, &pair, 2, false, 1 << 20, None);
        assert_eq!(cv, 0, "the two remaining rounds complete the round robin");
    }

    #[test]
    fn test_team_majority_short_circuits() {
        let mut roster = roster_of(4);
        let n = roster.section_size();
        for p in roster.players_mut()[..n].iter_mut().take(2) {
            p.team_id = 7;
        }
        assert!(one_team_majority(&roster));
        let pair = vec![r(0), r(2), r(1), r(3)];
        let cv = pairable_cost(&mut roster, &pair, 1, true, 1 << 20, None);
        assert_eq!(cv, 1);
    }

    #[test]
    fn test_tiny_budget_reports_infeasible() {
        let mut roster = roster_of(8);
        let pair: Vec<RankIndex> = (0..8).map(r).collect();
        let cv = pairable_cost(&mut roster, &pair, 3, false, 1, None);
        assert_eq!(cv, 1, "budget exhaustion is conservative");
    }

    #[test]
    fn test_future_byes_shrink_the_round() {
        // Five players, one with a bye in the last round; the lookahead must
        // still find completions for the others.
        let mut roster = roster_of(5);
        roster.players_mut()[4].bye_rounds = vec![2];
        roster.set_ranks();
        let pair = vec![r(0), r(2), r(1), r(3)];
        let cv = pairable_cost(&mut roster, &pair, 1, false, 1 << 20, None);
        assert_eq!(cv, 0);
    }
}
