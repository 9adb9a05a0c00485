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

//! Starting positions for the search.
//!
//! `hint_pairings` reuses the caller's board hints: boards whose two players
//! share a hint survive, manually paired boards are preserved verbatim, and
//! everyone else becomes a singleton to be packed (or paired with the
//! sentinel). `first_pairings` ignores hints and builds the textbook
//! upper-half versus lower-half pairing inside every score group; it is the
//! better seed for clean rounds with no manual carry-over.

use std::collections::BTreeMap;
use wallchart_model::{index::RankIndex, roster::Roster};

use crate::board::{self, PairVec};

/// Builds the starting pairing from board-number hints.
///
/// With `collapse_byes` the orphaned players are packed against each other
/// and a sentinel bye is inserted for an odd count; otherwise each orphan
/// keeps a bye board of its own.
pub fn hint_pairings(roster: &Roster, collapse_byes: bool) -> PairVec {
    debug_assert!(
        roster.players().last().is_some_and(|p| p.is_bye()),
        "called `hint_pairings` on a roster without the trailing sentinel"
    );
    if cfg!(debug_assertions) {
        for (x, p) in roster.players().iter().enumerate() {
            debug_assert!(p.rank.get() == x, "roster ranks out of date");
        }
    }

    let bye_rank = roster.bye_rank();
    let n = roster.section_size();

    // Hinted players grouped by board number, rank order within a board.
    let mut by_board: BTreeMap<i32, Vec<RankIndex>> = BTreeMap::new();
    let mut unhinted: Vec<RankIndex> = Vec::new();
    for x in 0..n {
        let rank = RankIndex::new(x);
        if roster[rank].board_num != -1 {
            by_board.entry(roster[rank].board_num).or_default().push(rank);
        } else {
            unhinted.push(rank);
        }
    }
    let hinted: Vec<RankIndex> = by_board.into_values().flatten().collect();

    let mut pair: PairVec = Vec::with_capacity(roster.len() + 1);
    let mut single: Vec<RankIndex> = Vec::new();
    let mut other: Vec<RankIndex> = Vec::new();

    let mut orphan = |rank: RankIndex, single: &mut Vec<RankIndex>, other: &mut Vec<RankIndex>| {
        let p = &roster[rank];
        if p.paired || p.bye_request || !collapse_byes {
            other.push(rank);
            other.push(bye_rank);
        } else {
            single.push(rank);
        }
    };

    let mut i = 0;
    while i < hinted.len() {
        let r1 = hinted[i];
        let p1 = &roster[r1];
        let partner = hinted.get(i + 1).copied();
        let joined = partner.is_some_and(|r2| {
            let p2 = &roster[r2];
            p2.board_num == p1.board_num
                && p2.paired == p1.paired
                && (p1.paired || (!p1.bye_request && !p2.bye_request))
        });
        if joined {
            let r2 = partner.expect("joined implies a partner");
            if p1.paired {
                other.push(r1);
                other.push(r2);
            } else {
                pair.push(r1);
                pair.push(r2);
            }
            i += 2;
        } else {
            orphan(r1, &mut single, &mut other);
            i += 1;
        }
    }
    for rank in unhinted {
        orphan(rank, &mut single, &mut other);
    }

    pair.extend(single);
    if pair.len() % 2 != 0 {
        pair.push(bye_rank);
    }
    pair.extend(other);

    board::normalize_board_slots(&mut pair);
    board::sort_boards(roster, &mut pair);
    board::assert_no_duplicates(roster, &pair);
    pair
}

/// Rewrites the first `players` slots with upper-half versus lower-half
/// pairings per score group (rule 27A2); the odd player of a group drops to the
/// top of the next group, or takes the bye when no group is left.
pub fn first_pairings(roster: &Roster, pair: &mut PairVec, players: usize) {
    debug_assert!(players <= pair.len());
    if cfg!(debug_assertions) {
        for x in 0..players {
            debug_assert!(
                !roster[pair[x]].is_bye(),
                "active slot {x} holds the sentinel"
            );
        }
    }

    // Active slots in rank order; byes and granted requests stay at the tail.
    pair[..players].sort_unstable();
    debug_assert!(
        players % 2 == 0 || (players < pair.len() && roster[pair[players]].is_bye()),
        "odd active count without a trailing sentinel"
    );

    let mut x = 0;
    while x < players {
        let score = roster[RankIndex::new(x)].score;
        let mut y = x + 1;
        while y < players && roster[RankIndex::new(y)].score == score {
            y += 1;
        }
        let group = y - x;

        let mut z = 0;
        while z + 1 < group {
            pair[x + z] = RankIndex::new(x + z / 2);
            pair[x + z + 1] = RankIndex::new(x + group / 2 + z / 2);
            z += 2;
        }

        if group % 2 == 0 {
            x = y;
        } else if y < players {
            // Odd player drops to the top of the next score group.
            pair[y - 1] = RankIndex::new(y - 1);
            pair[y] = RankIndex::new(y);
            x = y + 1;
        } else {
            // Odd player takes the bye.
            pair[y - 1] = RankIndex::new(y - 1);
            debug_assert!(roster[pair[y]].is_bye());
            x = y;
        }
    }
    board::assert_no_duplicates(roster, pair);
}
