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

//! Crenshaw-Berger round-robin tables.
//!
//! Embedded tab-separated tables for sections of 4, 6, 8, and 10 players:
//! one with the pairings per round, one with the color reversals applied
//! when a first-half player withdrew. Odd sections add a virtual player
//! `size + 1` who collects everyone's bye. Player numbers are the
//! pre-tournament lot order, 1-based.

use wallchart_model::color::Color;

/// `size \t round \t p1-p2 p1-p2 …` — the first player of each pairing has
/// White.
const PAIRINGS: &[&str] = &[
    "4\t1\t1-4 2-3",
    "4\t2\t3-1 4-2",
    "4\t3\t1-2 3-4",
    "6\t1\t3-6 5-4 1-2",
    "6\t2\t2-6 4-1 3-5",
    "6\t3\t6-5 1-3 4-2",
    "6\t4\t6-4 5-1 2-3",
    "6\t5\t1-6 2-5 3-4",
    "8\t1\t4-8 5-3 6-2 7-1",
    "8\t2\t8-7 1-6 2-5 3-4",
    "8\t3\t3-8 4-2 5-1 6-7",
    "8\t4\t8-6 7-5 1-4 2-3",
    "8\t5\t2-8 3-1 4-7 5-6",
    "8\t6\t8-5 6-4 7-3 1-2",
    "8\t7\t1-8 2-7 3-6 4-5",
    "10\t1\t5-10 6-4 7-3 8-2 9-1",
    "10\t2\t10-9 1-8 2-7 3-6 4-5",
    "10\t3\t4-10 5-3 6-2 7-1 8-9",
    "10\t4\t10-8 9-7 1-6 2-5 3-4",
    "10\t5\t3-10 4-2 5-1 6-9 7-8",
    "10\t6\t10-7 8-6 9-5 1-4 2-3",
    "10\t7\t2-10 3-1 4-9 5-8 6-7",
    "10\t8\t10-6 7-5 8-4 9-3 1-2",
    "10\t9\t1-10 2-9 3-8 4-7 5-6",
];

/// `size \t round \t withdrawn \t p1-p2 …` — from `round` on, each listed
/// pairing plays with the first player as White instead of the table color.
const REVERSALS: &[&str] = &[
    "4\t3\t1\t",
    "4\t3\t2\t4-3",
    "4\t3\t3\t2-1",
    "4\t3\t4\t",
    "6\t5\t1\t5-2 4-3",
    "6\t5\t2\t4-3",
    "6\t5\t3\t",
    "6\t5\t4\t6-1 5-2",
    "6\t5\t5\t6-1",
    "6\t5\t6\t",
    "8\t5\t1\t7-2 5-4",
    "8\t5\t2\t6-3",
    "8\t5\t3\t5-4 7-2 2-1",
    "8\t5\t4\t6-3 3-7 7-2",
    "8\t5\t5\t8-1 7-4 4-6 6-3",
    "8\t5\t6\t8-2 5-4",
    "8\t5\t7\t8-1 6-3",
    "8\t5\t8\t",
    "10\t7\t1\t9-2 7-4",
    "10\t7\t2\t8-3 6-5",
    "10\t7\t3\t7-4 9-2 2-1",
    "10\t7\t4\t6-5 8-3 3-9 9-2",
    "10\t7\t5\t9-2 7-4 2-1 4-8 8-3",
    "10\t7\t6\t10-2 8-5 5-7 7-4",
    "10\t7\t7\t10-1 6-5 9-4 4-8 8-3",
    "10\t7\t8\t10-2 7-4",
    "10\t7\t9\t10-1 8-3 6-5",
    "10\t7\t10\t",
];

/// One player's table assignment for a round.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RoundRobinSeat {
    /// Board number, 1-based.
    pub board: i32,
    pub color: Color,
    /// The table opponent, 1-based player number (possibly the virtual bye).
    pub opponent: usize,
}

fn parse_duels(s: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    s.split_whitespace().map(|duel| {
        let (p1, p2) = duel
            .split_once('-')
            .expect("round-robin table duel is 'p1-p2'");
        (
            p1.parse().expect("round-robin table player number"),
            p2.parse().expect("round-robin table player number"),
        )
    })
}

/// Looks up a player's board, color, and opponent in the Crenshaw-Berger
/// tables.
///
/// `competitors` is the real player count; an odd count plays the next table
/// up with the virtual player `competitors + 1` (the bye). `withdrawn` is
/// the pre-tournament number of a first-half withdrawal, 0 for none.
///
/// # Panics
///
/// Panics when the (size, round) combination is not in the tables; the
/// caller validates section size and round range.
pub fn crenshaw_berger_lookup(
    competitors: usize,
    round: usize,
    player: usize,
    withdrawn: usize,
) -> RoundRobinSeat {
    let mut competitors = competitors;
    let is_bye_table = competitors % 2 == 1;
    if is_bye_table {
        debug_assert!(
            withdrawn == 0,
            "called `crenshaw_berger_lookup` with a withdrawal in an odd section"
        );
        competitors += 1;
    }
    let withdrawn = if withdrawn == 0 {
        competitors
    } else {
        withdrawn
    };

    let mut seat: Option<RoundRobinSeat> = None;
    for row in PAIRINGS {
        let mut cols = row.split('\t');
        let size: usize = cols.next().and_then(|c| c.parse().ok()).expect("table size");
        let rnd: usize = cols.next().and_then(|c| c.parse().ok()).expect("table round");
        if size != competitors || rnd != round {
            continue;
        }
        let duels = cols.next().expect("table duels");
        for (board, (p1, p2)) in parse_duels(duels).enumerate() {
            if p1 == player || p2 == player {
                assert!(seat.is_none(), "player listed twice in round {round}");
                seat = Some(RoundRobinSeat {
                    board: board as i32 + 1,
                    color: if p1 == player {
                        Color::White
                    } else {
                        Color::Black
                    },
                    opponent: if p1 == player { p2 } else { p1 },
                });
            }
        }
    }
    let mut seat = seat.unwrap_or_else(|| {
        panic!("no Crenshaw-Berger entry for {competitors} players, round {round}")
    });
    debug_assert!(
        (1..=competitors).contains(&seat.opponent) && seat.opponent != player,
        "table opponent out of range"
    );

    for row in REVERSALS {
        let mut cols = row.split('\t');
        let size: usize = cols.next().and_then(|c| c.parse().ok()).expect("table size");
        let rnd: usize = cols.next().and_then(|c| c.parse().ok()).expect("table round");
        let wd: usize = cols
            .next()
            .and_then(|c| c.parse().ok())
            .expect("table withdrawal");
        if size != competitors || wd != withdrawn {
            continue;
        }
        let duels = cols.next().unwrap_or("");
        for (p1, p2) in parse_duels(duels) {
            if p1 == player && p2 == seat.opponent {
                debug_assert!(!is_bye_table && withdrawn != competitors);
                debug_assert!(round >= rnd);
                seat.color = Color::White;
            } else if p2 == player && p1 == seat.opponent {
                debug_assert!(!is_bye_table && withdrawn != competitors);
                debug_assert!(round >= rnd);
                seat.color = Color::Black;
            }
        }
    }
    seat
}
