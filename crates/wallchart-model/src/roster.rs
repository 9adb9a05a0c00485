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

//! The canonical roster.
//!
//! Canonicalisation appends the single bye sentinel, sorts the section under
//! the canonical order, assigns dense ranks, resolves every player's due
//! color, and translates opponent and teammate ids into current ranks. The
//! rest of the engine works purely in rank space.

use crate::{
    color::DueColor,
    index::RankIndex,
    player::{Player, PlayerId},
};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// The error type for roster canonicalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterError {
    /// Two players share the same `rand` tiebreak key; the total order (and
    /// with it reproducibility) needs unique keys.
    DuplicateRand { a: PlayerId, b: PlayerId, rand: f64 },
    /// More than one bye sentinel was supplied.
    MultipleSentinels,
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::DuplicateRand { a, b, rand } => write!(
                f,
                "players {} and {} share the tiebreak key {}",
                a, b, rand
            ),
            RosterError::MultipleSentinels => {
                write!(f, "more than one bye sentinel in the section")
            }
        }
    }
}

impl std::error::Error for RosterError {}

/// A canonicalised section: sorted players, dense ranks, one trailing bye.
#[derive(Clone, Debug)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Canonicalises a section: appends the sentinel when missing,
    /// sorts, ranks, resolves due colors, and builds the rank lists.
    ///
    /// # Errors
    ///
    /// Returns an error when two active players share a `rand` key or the
    /// input carries more than one sentinel.
    pub fn canonicalise(mut players: Vec<Player>) -> Result<Roster, RosterError> {
        if players.iter().filter(|p| p.is_bye()).count() > 1 {
            return Err(RosterError::MultipleSentinels);
        }
        if !players.last().is_some_and(|p| p.is_bye()) {
            let round = players.first().map_or(1, |p| p.round);
            let multiround = players.first().map_or(1, |p| p.multiround);
            players.push(Player::bye(round, multiround));
        }

        let mut keys: Vec<(f64, PlayerId)> = players
            .iter()
            .filter(|p| !p.is_bye())
            .map(|p| (p.rand, p.entry.expect("non-bye player has an id")))
            .collect();
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in keys.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(RosterError::DuplicateRand {
                    a: pair[0].1,
                    b: pair[1].1,
                    rand: pair[0].0,
                });
            }
        }

        players.sort();

        let mut roster = Roster { players };
        roster.set_ranks();
        Ok(roster)
    }

    /// Assigns dense ranks, resolves due colors, and rebuilds the opponent
    /// and teammate rank lists from the current ordering.
    ///
    /// Rank lookups match on the bare id: a re-entered player blocks both of
    /// their incarnations.
    pub fn set_ranks(&mut self) {
        let mut rank_of: BTreeMap<i32, RankIndex> = BTreeMap::new();
        for (x, p) in self.players.iter_mut().enumerate() {
            debug_assert!(
                p.opponents.len() == p.played_colors.len(),
                "called `Roster::set_ranks` with opponent/color histories of different lengths for {}",
                p
            );
            p.rank = RankIndex::new(x);
            p.due_color = DueColor::from_history(&p.color_history, p.multiround);
            if let Some(id) = p.entry {
                rank_of.entry(id.id).or_insert(p.rank);
            }
        }

        for x in 0..self.players.len() {
            let opponent_ranks: Vec<RankIndex> = self.players[x]
                .opponents
                .iter()
                .filter_map(|o| rank_of.get(&o.id).copied())
                .collect();
            let teammate_ranks: Vec<RankIndex> = self.players[x]
                .teammates
                .iter()
                .filter_map(|t| rank_of.get(t).copied())
                .collect();
            self.players[x].opponent_ranks = opponent_ranks;
            self.players[x].teammate_ranks = teammate_ranks;
        }
    }

    /// Re-sorts the section for round-robin table lookup: byes last, then
    /// ascending `rand` (the pre-tournament lot order).
    pub fn sort_by_lot(&mut self) {
        self.players.sort_by(|a, b| {
            a.is_bye()
                .cmp(&b.is_bye())
                .then(a.rand.total_cmp(&b.rand))
        });
    }

    /// Total entries including the sentinel.
    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Number of real players (excluding the sentinel).
    #[inline]
    pub fn section_size(&self) -> usize {
        self.players.len().saturating_sub(1)
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[inline]
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Consumes the roster; the sentinel stays at the tail.
    #[inline]
    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    /// The trailing sentinel's rank.
    #[inline]
    pub fn bye_rank(&self) -> RankIndex {
        debug_assert!(
            self.players.last().is_some_and(|p| p.is_bye()),
            "called `Roster::bye_rank` before canonicalisation"
        );
        RankIndex::new(self.players.len() - 1)
    }
}

impl Index<RankIndex> for Roster {
    type Output = Player;

    #[inline]
    fn index(&self, rank: RankIndex) -> &Player {
        &self.players[rank.get()]
    }
}

impl IndexMut<RankIndex> for Roster {
    #[inline]
    fn index_mut(&mut self, rank: RankIndex) -> &mut Player {
        &mut self.players[rank.get()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, ColorMark};

    fn player(id: i32, score: f32, rating: i16, rand: f64) -> Player {
        let mut p = Player::active(PlayerId::new(id, 0));
        p.score = score;
        p.rating = rating;
        p.rand = rand;
        p
    }

    #[test]
    fn test_canonicalise_appends_sentinel_and_ranks() {
        let roster = Roster::canonicalise(vec![
            player(1, 0.0, 1500, 0.1),
            player(2, 0.0, 1800, 0.2),
        ])
        .expect("canonicalise");
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.section_size(), 2);
        assert!(roster[RankIndex::new(2)].is_bye());
        assert_eq!(roster[RankIndex::new(0)].entry, Some(PlayerId::new(2, 0)));
        assert_eq!(roster[RankIndex::new(0)].rank, RankIndex::new(0));
        assert_eq!(roster[RankIndex::new(1)].rank, RankIndex::new(1));
    }

    #[test]
    fn test_canonicalise_rejects_duplicate_rand() {
        let err = Roster::canonicalise(vec![
            player(1, 0.0, 1500, 0.5),
            player(2, 0.0, 1500, 0.5),
        ])
        .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateRand { .. }));
    }

    #[test]
    fn test_canonicalise_rejects_second_sentinel() {
        let err = Roster::canonicalise(vec![
            Player::bye(1, 1),
            player(1, 0.0, 1500, 0.5),
            Player::bye(1, 1),
        ])
        .unwrap_err();
        assert_eq!(err, RosterError::MultipleSentinels);
    }

    #[test]
    fn test_opponent_ranks_follow_current_order() {
        let mut a = player(1, 1.0, 1500, 0.1);
        let mut b = player(2, 0.0, 1800, 0.2);
        a.opponents = vec![PlayerId::new(2, 0)];
        a.played_colors = vec![Color::White];
        a.color_history = vec![ColorMark::White];
        b.opponents = vec![PlayerId::new(1, 0)];
        b.played_colors = vec![Color::Black];
        b.color_history = vec![ColorMark::Black];
        let roster = Roster::canonicalise(vec![a, b]).expect("canonicalise");
        // a leads on score despite the lower rating.
        assert_eq!(roster[RankIndex::new(0)].entry, Some(PlayerId::new(1, 0)));
        assert_eq!(
            roster[RankIndex::new(0)].opponent_ranks,
            vec![RankIndex::new(1)]
        );
        assert_eq!(
            roster[RankIndex::new(1)].opponent_ranks,
            vec![RankIndex::new(0)]
        );
    }

    #[test]
    fn test_opponent_no_longer_present_is_dropped() {
        let mut a = player(1, 0.0, 1500, 0.1);
        a.opponents = vec![PlayerId::new(99, 0)];
        a.played_colors = vec![Color::White];
        a.color_history = vec![ColorMark::White];
        let roster = Roster::canonicalise(vec![a]).expect("canonicalise");
        assert!(roster[RankIndex::new(0)].opponent_ranks.is_empty());
    }

    #[test]
    fn test_sort_by_lot_orders_by_rand() {
        let mut roster = Roster::canonicalise(vec![
            player(1, 2.0, 1500, 0.9),
            player(2, 0.0, 1800, 0.2),
        ])
        .expect("canonicalise");
        roster.sort_by_lot();
        assert_eq!(roster[RankIndex::new(0)].entry, Some(PlayerId::new(2, 0)));
        assert!(roster[RankIndex::new(2)].is_bye());
    }
}
