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

//! The pairing entry point.
//!
//! `find_pairings` takes the section state, runs the round-robin
//! short-circuit or the Swiss search, and writes the results back into the
//! players: board numbers, colors, warning codes, ranks, and due colors. The
//! sentinel bye entry stays at the tail of the returned list.

use tracing::{info, warn};
use wallchart_model::{
    color::Color,
    config::PairingConfig,
    cost::Cost,
    index::RankIndex,
    player::Player,
    roster::{Roster, RosterError},
};

use crate::{
    board::PairVec,
    color::allocate_color,
    cost::cost_function,
    optimize::minimize_cost,
    roundrobin::crenshaw_berger_lookup,
    seed::{first_pairings, hint_pairings},
    stats::SearchStatistics,
};

/// The result of one pairing run.
#[derive(Clone, Debug)]
pub struct PairingOutcome {
    /// The quality report of the final pairing; zero is perfect.
    pub cost: Cost,
    /// Search counters for tooling and diagnostics.
    pub stats: SearchStatistics,
}

/// Pairs one section for its upcoming round.
///
/// On return the players carry their output fields (`board_num`,
/// `board_color`, `warn_codes`, `rank`, `due_color`, rank lists) and the
/// list is in canonical order with the sentinel last.
///
/// # Errors
///
/// Returns an error when the section cannot be canonicalised (duplicate
/// `rand` keys, more than one sentinel).
pub fn find_pairings(
    players: &mut Vec<Player>,
    config: &PairingConfig,
) -> Result<PairingOutcome, RosterError> {
    if players.len() <= 1 {
        warn!(section = %config.section_name, "nobody active to pair");
    }
    validate_multiround(players);

    // An odd number of active players with a house player available: the
    // house player absorbs the bye.
    let mut active = players
        .iter()
        .filter(|p| !p.bye_request && !p.paired && !p.is_bye())
        .count();
    if active % 2 == 1 {
        let house = players
            .iter_mut()
            .filter(|p| !p.bye_request && !p.paired && !p.is_bye())
            .filter(|p| p.bye_house)
            .next_back();
        if let Some(house) = house {
            info!(player = %house, "requesting bye for house player");
            house.bye_request = true;
            active -= 1;
        }
    }

    let mut roster = Roster::canonicalise(std::mem::take(players))?;

    if roster.section_size() > 0 && roster.players()[0].kind.is_round_robin() {
        let cost = round_robin_pairings(&mut roster, config);
        *players = roster.into_players();
        return Ok(PairingOutcome {
            cost,
            stats: SearchStatistics::default(),
        });
    }

    // First board defaults to the lowest hint on the wall chart.
    let n = roster.section_size();
    let low_board = roster.players()[..n]
        .iter()
        .map(|p| p.board_num)
        .filter(|b| *b > 0)
        .min();
    let first_board_num = if config.first_board_num != 0 {
        config.first_board_num
    } else {
        low_board.unwrap_or(1)
    };

    let mut pair = hint_pairings(&roster, true);
    debug_assert!(
        active == 0 || {
            let p = &roster[pair[active - 1]];
            !p.bye_request && !p.paired
        },
        "active slots must precede granted byes"
    );
    debug_assert!(
        active >= pair.len() || roster[pair[active]].is_bye() || {
            let p = &roster[pair[active]];
            p.bye_request || p.paired
        },
        "slot after the active range must be a bye or a granted request"
    );

    if config.use_first_pairings {
        first_pairings(&roster, &mut pair, active);
    }

    let remaining_rounds = config
        .total_rounds
        .saturating_sub(roster.players()[0].round);
    let mut stats = SearchStatistics::default();
    let cost = if config.skip_optimize {
        let p_end = (active + 1) / 2 * 2;
        let eval = cost_function(
            &mut roster,
            &pair,
            remaining_rounds,
            0,
            p_end,
            true,
            true,
            config,
        );
        stats.on_cost_evaluation();
        eval.cost
    } else {
        minimize_cost(
            &mut roster,
            &mut pair,
            remaining_rounds,
            config.depth,
            0,
            active,
            false,
            config,
            &mut stats,
        )
    };

    finalize_boards(&mut roster, &mut pair, first_board_num);

    *players = roster.into_players();
    Ok(PairingOutcome { cost, stats })
}

/// Multiround sections must repeat each opponent exactly `multiround` times
/// in a row; anything else is reported and pairing continues.
fn validate_multiround(players: &[Player]) {
    let Some(first) = players.first() else {
        return;
    };
    if first.multiround <= 1 {
        return;
    }
    let mr = first.multiround as usize;
    for p in players {
        if p.multiround != first.multiround {
            warn!(player = %p, "multiround differs across the section");
        }
        for block in p.opponents.chunks(mr) {
            if block.iter().any(|o| o != &block[0]) {
                warn!(player = %p, "opponents not identical across a multiround block");
                break;
            }
        }
    }
}

/// Round-robin short-circuit: assign boards and colors straight from the
/// Crenshaw-Berger tables, in pre-tournament lot order.
fn round_robin_pairings(roster: &mut Roster, config: &PairingConfig) -> Cost {
    roster.sort_by_lot();
    let n = roster.section_size();
    let multiround = roster.players()[0].multiround.max(1) as usize;
    let table_rounds = (config.total_rounds as usize) / multiround;
    let expected = if n % 2 == 0 { n - 1 } else { n };
    if table_rounds != expected {
        warn!(
            section = %config.section_name,
            players = n,
            rounds = table_rounds,
            "round count does not fit the round-robin table"
        );
    }

    // A first-half withdrawal changes the second-half colors.
    let mut withdrawn = 0;
    for (x, p) in roster.players()[..n].iter().enumerate() {
        if let Some(first_bye) = p.bye_rounds.first() {
            if (*first_bye as usize) <= (table_rounds + 1) / 2 {
                if withdrawn != 0 {
                    warn!(player = %p, "second withdrawal ignored in round-robin reversal");
                } else {
                    withdrawn = x + 1;
                }
            }
        }
    }

    let round = (roster.players()[0].round as usize - 1) / multiround + 1;
    let mut bye_board = None;
    for x in 0..n {
        let seat = crenshaw_berger_lookup(n, round, x + 1, withdrawn);
        if seat.opponent == n + 1 {
            bye_board = Some(seat.board);
        }
        let p = &mut roster.players_mut()[x];
        p.board_num = seat.board + config.first_board_num - 1;
        p.board_color = Some(seat.color);
    }

    // The player drawn against the virtual opponent has the bye: they take
    // White and the sentinel Black on the same board.
    let bye_rank = roster.bye_rank();
    if let Some(board) = bye_board {
        for x in 0..n {
            let board_num = board + config.first_board_num - 1;
            if roster.players()[x].board_num == board_num {
                roster.players_mut()[x].board_color = Some(Color::White);
            }
        }
        roster[bye_rank].board_num = board + config.first_board_num - 1;
        roster[bye_rank].board_color = Some(Color::Black);
    } else {
        roster[bye_rank].board_num = -1;
    }

    Cost::zero(n)
}

/// Sorts finished boards for the wall chart (byes last, better player
/// first), numbers them from `first_board_num`, and allocates colors.
fn finalize_boards(roster: &mut Roster, pair: &mut PairVec, first_board_num: i32) {
    debug_assert!(pair.len() % 2 == 0);

    let better = |roster: &Roster, a: RankIndex, b: RankIndex| -> RankIndex {
        if roster[a] < roster[b] {
            a
        } else {
            b
        }
    };

    let mut x = 2;
    while x < pair.len() {
        let mut y = x;
        while y > 0 {
            let b1 = roster[pair[y - 2]].is_bye() || roster[pair[y - 1]].is_bye();
            let b2 = roster[pair[y]].is_bye() || roster[pair[y + 1]].is_bye();
            let z1 = better(roster, pair[y - 2], pair[y - 1]);
            let z2 = better(roster, pair[y], pair[y + 1]);
            if !b1 && b2 || (b1 == b2 && roster[z1] < roster[z2]) {
                break;
            }
            pair.swap(y, y - 2);
            pair.swap(y + 1, y - 1);
            y -= 2;
        }
        x += 2;
    }

    for x in (0..pair.len()).step_by(2) {
        debug_assert!(
            !roster[pair[x]].is_bye(),
            "the upper slot of a board is never the sentinel"
        );
        let board_num = first_board_num + (x / 2) as i32;
        // The lower side's color decides; the upper side takes the flip.
        let lower_color = allocate_color(
            &roster[pair[x + 1]],
            &roster[pair[x]],
            (x / 2) % 2 == 0,
        );
        roster[pair[x + 1]].board_num = board_num;
        roster[pair[x + 1]].board_color = Some(lower_color);
        roster[pair[x]].board_num = board_num;
        roster[pair[x]].board_color = Some(lower_color.flip());
    }

    let bye_rank = roster.bye_rank();
    roster[bye_rank].board_num = -1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallchart_model::color::ColorMark;
    use wallchart_model::player::{PlayerId, TournamentKind};

    fn player(id: i32, score: f32, rating: i16, rand: f64) -> Player {
        let mut p = Player::active(PlayerId::new(id, 0));
        p.score = score;
        p.rating = rating;
        p.rand = rand;
        p
    }

    fn by_id(players: &[Player], id: i32) -> &Player {
        players
            .iter()
            .find(|p| p.entry == Some(PlayerId::new(id, 0)))
            .expect("player present")
    }

    #[test]
    fn test_s1_first_round_four_players() {
        // Spec scenario S1: ratings 2000/1800/1700/1500, round 1.
        let mut players = vec![
            player(1, 0.0, 2000, 0.1),
            player(2, 0.0, 1800, 0.2),
            player(3, 0.0, 1700, 0.3),
            player(4, 0.0, 1500, 0.4),
        ];
        let config = PairingConfig::new(3).first_board(1);
        let outcome = find_pairings(&mut players, &config).expect("pairings");
        assert!(outcome.cost.is_zero(), "cost was {}", outcome.cost);
        assert_eq!(by_id(&players, 1).board_num, 1);
        assert_eq!(by_id(&players, 1).board_color, Some(Color::White));
        assert_eq!(by_id(&players, 3).board_num, 1);
        assert_eq!(by_id(&players, 3).board_color, Some(Color::Black));
        // The first-round color alternates down the boards (29E2): the
        // higher seed takes Black on the even board.
        assert_eq!(by_id(&players, 2).board_num, 2);
        assert_eq!(by_id(&players, 2).board_color, Some(Color::Black));
        assert_eq!(by_id(&players, 4).board_num, 2);
        assert_eq!(by_id(&players, 4).board_color, Some(Color::White));
    }

    #[test]
    fn test_s2_second_round_leaders_meet() {
        // Spec scenario S2: after 1>3 and 2>4, the leaders meet on board 1.
        let mut players = vec![
            player(1, 1.0, 2000, 0.1),
            player(2, 1.0, 1800, 0.2),
            player(3, 0.0, 1700, 0.3),
            player(4, 0.0, 1500, 0.4),
        ];
        for p in players.iter_mut() {
            p.round = 2;
        }
        for (id, opp, color) in [(1, 3, Color::White), (2, 4, Color::White), (3, 1, Color::Black), (4, 2, Color::Black)] {
            let p = players.iter_mut().find(|p| p.entry == Some(PlayerId::new(id, 0))).unwrap();
            p.opponents = vec![PlayerId::new(opp, 0)];
            p.played_colors = vec![color];
            p.color_history = vec![ColorMark::from(color)];
        }
        let config = PairingConfig::new(3).first_board(1);
        let outcome = find_pairings(&mut players, &config).expect("pairings");
        assert_eq!(by_id(&players, 1).board_num, 1);
        assert_eq!(by_id(&players, 2).board_num, 1);
        assert_eq!(by_id(&players, 3).board_num, 2);
        assert_eq!(by_id(&players, 4).board_num, 2);
        assert_eq!(outcome.cost.players_meet_twice, 0);
        // Both leaders had White; one must repeat (and the trailers repeat
        // Black).
        assert!(outcome.cost.color_alternate >= 1);
    }

    #[test]
    fn test_s3_five_players_lowest_gets_bye() {
        let mut players = vec![
            player(1, 0.0, 2000, 0.1),
            player(2, 0.0, 1800, 0.2),
            player(3, 0.0, 1700, 0.3),
            player(4, 0.0, 1500, 0.4),
            player(5, 0.0, 1400, 0.5),
        ];
        let config = PairingConfig::new(4).first_board(1);
        let outcome = find_pairings(&mut players, &config).expect("pairings");
        assert_eq!(outcome.cost.bye_choice, 0, "cost was {}", outcome.cost);
        assert_eq!(outcome.cost.lowest_rated_bye, 0, "all players are rated");
        // The sentinel shares a board with exactly one active player, who
        // receives White.
        let bye = players.last().expect("sentinel");
        assert!(bye.is_bye());
        let bye_partner = players
            .iter()
            .filter(|p| !p.is_bye() && p.board_color == Some(Color::White))
            .filter(|w| {
                !players.iter().any(|b| {
                    !b.is_bye()
                        && b.board_num == w.board_num
                        && b.board_color == Some(Color::Black)
                })
            })
            .count();
        assert_eq!(bye_partner, 1, "exactly one player sits out");
    }

    #[test]
    fn test_s4_round_robin_table_with_withdrawal() {
        let mut players: Vec<Player> = (0..4)
            .map(|i| {
                let mut p = player(i + 1, 0.0, 1500, 0.1 * (i as f64 + 1.0));
                p.kind = TournamentKind::RoundRobin;
                p.round = 3;
                p
            })
            .collect();
        // Lot order follows rand, so player ids map to table numbers 1..4.
        // Table player 2 withdrew in the first half.
        players[1].bye_rounds = vec![2];
        let config = PairingConfig::new(3).first_board(1);
        let outcome = find_pairings(&mut players, &config).expect("pairings");
        assert!(outcome.cost.is_zero());
        // Round 3 table: 1-2 3-4; withdrawal 2 reverses 4-3.
        assert_eq!(by_id(&players, 1).board_num, 1);
        assert_eq!(by_id(&players, 1).board_color, Some(Color::White));
        assert_eq!(by_id(&players, 2).board_color, Some(Color::Black));
        assert_eq!(by_id(&players, 4).board_num, 2);
        assert_eq!(by_id(&players, 4).board_color, Some(Color::White));
        assert_eq!(by_id(&players, 3).board_color, Some(Color::Black));
    }

    #[test]
    fn test_house_player_absorbs_odd_bye() {
        let mut players = vec![
            player(1, 0.0, 2000, 0.1),
            player(2, 0.0, 1800, 0.2),
            player(3, 0.0, 1700, 0.3),
            player(4, 0.0, 1500, 0.4),
            player(5, 0.0, 1400, 0.5),
        ];
        players[4].bye_house = true;
        let config = PairingConfig::new(4).first_board(1);
        let outcome = find_pairings(&mut players, &config).expect("pairings");
        assert!(outcome.cost.is_zero(), "cost was {}", outcome.cost);
        let house = by_id(&players, 5);
        assert!(house.bye_request, "house player was converted to a bye");
    }

    #[test]
    fn test_idempotent_rerun_with_output_as_hint() {
        // Spec property 4: feeding the outputs back as hints reproduces the
        // same pairing.
        let mut players = vec![
            player(1, 1.0, 2000, 0.17),
            player(2, 1.0, 1800, 0.23),
            player(3, 0.5, 1700, 0.31),
            player(4, 0.5, 1500, 0.43),
            player(5, 0.0, 1300, 0.51),
            player(6, 0.0, 1200, 0.61),
        ];
        for p in players.iter_mut() {
            p.round = 2;
        }
        let history = [
            (1, 4, Color::White),
            (2, 5, Color::Black),
            (3, 6, Color::White),
            (4, 1, Color::Black),
            (5, 2, Color::White),
            (6, 3, Color::Black),
        ];
        for (id, opp, color) in history {
            let p = players.iter_mut().find(|p| p.entry == Some(PlayerId::new(id, 0))).unwrap();
            p.opponents = vec![PlayerId::new(opp, 0)];
            p.played_colors = vec![color];
            p.color_history = vec![ColorMark::from(color)];
        }
        let config = PairingConfig::new(4).first_board(1);
        let _ = find_pairings(&mut players, &config).expect("pairings");
        let snapshot: Vec<(Option<PlayerId>, i32, Option<Color>)> = players
            .iter()
            .map(|p| (p.entry, p.board_num, p.board_color))
            .collect();
        let _ = find_pairings(&mut players, &config).expect("pairings");
        let again: Vec<(Option<PlayerId>, i32, Option<Color>)> = players
            .iter()
            .map(|p| (p.entry, p.board_num, p.board_color))
            .collect();
        assert_eq!(snapshot, again, "rerun must reproduce the pairing");
    }

    #[test]
    fn test_duplicate_rand_is_rejected() {
        let mut players = vec![player(1, 0.0, 1500, 0.5), player(2, 0.0, 1500, 0.5)];
        let config = PairingConfig::new(3);
        let err = find_pairings(&mut players, &config).unwrap_err();
        assert!(matches!(err, RosterError::DuplicateRand { .. }));
    }
}
