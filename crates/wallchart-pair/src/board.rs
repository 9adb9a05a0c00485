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

//! The flat pairing vector and board ordering.
//!
//! A pairing is a flat sequence of roster ranks of even length; slots `2k`
//! and `2k+1` are the two players of board `k`, with the better (lower) rank
//! in slot `2k`. If the bye appears it sits in the last slot, and the entry
//! before it is the player receiving the bye.

use std::cmp::Ordering;
use wallchart_model::{index::RankIndex, roster::Roster};

/// The flat pairing vector: roster ranks, two per board.
pub type PairVec = Vec<RankIndex>;

/// Puts the better rank in the first slot of every board.
pub fn normalize_board_slots(pair: &mut [RankIndex]) {
    debug_assert!(pair.len() % 2 == 0);
    for board in pair.chunks_exact_mut(2) {
        if board[0] > board[1] {
            board.swap(0, 1);
        }
    }
}

/// Ordering of two boards during the search: players wanting a game first,
/// bye boards after real games, stronger pairings on lower boards.
fn search_board_cmp(roster: &Roster, pair: &[RankIndex], a: usize, b: usize) -> Ordering {
    let pa = &roster[pair[a]];
    let pa2 = &roster[pair[a + 1]];
    let pb = &roster[pair[b]];
    let pb2 = &roster[pair[b + 1]];
    pa.paired
        .cmp(&pb.paired)
        .then(pa2.is_bye().cmp(&pb2.is_bye()))
        .then(pa.bye_request.cmp(&pb.bye_request))
        .then(pb.score.total_cmp(&pa.score))
        .then(pb2.score.total_cmp(&pa2.score))
        .then(pb.rating.cmp(&pa.rating))
        .then(pb2.rating.cmp(&pa2.rating))
        .then(pa.canonical_cmp(pb))
}

/// Insertion-sorts whole boards into the search order. Stable on already
/// ordered prefixes, which keeps accepted moves minimal.
pub fn sort_boards(roster: &Roster, pair: &mut [RankIndex]) {
    debug_assert!(pair.len() % 2 == 0);
    let mut x = 2;
    while x < pair.len() {
        let mut y = x;
        while y > 0 {
            if search_board_cmp(roster, pair, y - 2, y) != Ordering::Greater {
                break;
            }
            pair.swap(y, y - 2);
            pair.swap(y + 1, y - 1);
            y -= 2;
        }
        x += 2;
    }
}

/// Debug check: no active player appears twice in the vector.
pub fn assert_no_duplicates(roster: &Roster, pair: &[RankIndex]) {
    if cfg!(debug_assertions) {
        for x in 0..pair.len() {
            for y in x + 1..pair.len() {
                debug_assert!(
                    pair[x] != pair[y] || roster[pair[x]].is_bye(),
                    "rank {} appears on two boards",
                    pair[x]
                );
            }
        }
    }
}
