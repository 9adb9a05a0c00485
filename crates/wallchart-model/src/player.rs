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

//! Players and the canonical ordering.
//!
//! A roster entry is either an active player (identified by a non-zero id
//! plus a re-entry counter) or the single bye sentinel, represented as
//! `entry: None` rather than a magic id. Most fields are inputs the engine
//! treats as read-only; `board_num`, `board_color`, `warn_codes`, `rank`,
//! `due_color`, and the rank lists are outputs.

use crate::{
    color::{Color, ColorMark, DueColor},
    index::RankIndex,
};
use std::cmp::Ordering;

/// Identity of an active (non-bye) player: the section-unique id plus a
/// re-entry counter distinguishing a player who re-entered the event.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PlayerId {
    pub id: i32,
    pub reentry: i16,
}

impl PlayerId {
    /// Creates a new id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is zero; zero is reserved for the bye sentinel, which
    /// is expressed as the absence of a `PlayerId`.
    #[inline]
    pub fn new(id: i32, reentry: i16) -> Self {
        assert!(id != 0, "called `PlayerId::new` with the reserved id 0");
        Self { id, reentry }
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.id, self.reentry)
    }
}

/// The pairing discipline of the section.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TournamentKind {
    Swiss,
    Match,
    RoundRobin,
    DoubleRoundRobin,
    DoubleRoundSwiss,
}

impl TournamentKind {
    /// Round-robin sections bypass the Swiss engine and use the
    /// Crenshaw-Berger tables.
    #[inline]
    pub const fn is_round_robin(self) -> bool {
        matches!(
            self,
            TournamentKind::RoundRobin | TournamentKind::DoubleRoundRobin
        )
    }
}

/// Whether the section is played under a rating system.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RatingMode {
    /// Rated section; unrated players get substitute ratings where the rules
    /// ask for one.
    Uscf,
    /// Unrated section; the unrated flag carries no weight.
    None,
}

impl RatingMode {
    #[inline]
    pub const fn is_rated(self) -> bool {
        matches!(self, RatingMode::Uscf)
    }
}

/// One roster entry: an active player or the bye sentinel.
#[derive(Clone, Debug)]
pub struct Player {
    /// Section this player belongs to; diagnostic only.
    pub section_id: i64,
    /// Pairing discipline; must agree across the section.
    pub kind: TournamentKind,
    /// Upcoming round, 1-based.
    pub round: u16,
    /// Input board hint; output final board number. `-1` means none.
    pub board_num: i32,
    /// Input color hint; output final color.
    pub board_color: Option<Color>,
    /// `None` marks the bye sentinel.
    pub entry: Option<PlayerId>,
    /// Display name; diagnostic only.
    pub name: String,
    /// Primary team id (0 = none); a fast path for team-block feasibility.
    pub team_id: i32,
    /// Player ids this player may not be paired against (rule 28N/T).
    pub teammates: Vec<i32>,
    /// Opponents already played, in round order; byes are not included.
    pub opponents: Vec<PlayerId>,
    /// Total points from prior rounds.
    pub score: f32,
    /// Rating (0 for unrated unless assigned).
    pub rating: i16,
    /// Unrated flag; meaningful only in rated sections.
    pub unrated: bool,
    /// Rating regime of the section.
    pub rating_mode: RatingMode,
    /// Rated games played before this event (rules 28L2, 28L5).
    pub provisional: i16,
    /// Caller-supplied unique tiebreak key; stable across rounds.
    pub rand: f64,
    /// House player who should absorb an odd bye (rule 28M1).
    pub bye_house: bool,
    /// Requested a half- or zero-point bye this round.
    pub bye_request: bool,
    /// Unplayed games over all rounds, taken or committed (28L2, 28L5).
    pub unplayed_count: i16,
    /// Half byes plus forfeit wins over all rounds (rule 28L4).
    pub half_bye_count: i16,
    /// Rounds with requested byes: past, current, and future.
    pub bye_rounds: Vec<u16>,
    /// Output: due color derived from the history.
    pub due_color: DueColor,
    /// One mark per prior round: played color or bye placeholder.
    pub color_history: Vec<ColorMark>,
    /// Played colors only; parallel to `opponents`.
    pub played_colors: Vec<Color>,
    /// First-round color of the top player on the top board (rules 28J, 29E2).
    pub first_color: Color,
    /// Games per round against the same opponent; 1 for ordinary play.
    pub multiround: u16,
    /// Manually pre-paired; the board may renumber but not re-pair.
    pub paired: bool,
    /// Output: warning letters, sorted and deduplicated.
    pub warn_codes: String,
    /// Output: position in the canonical roster.
    pub rank: RankIndex,
    /// Output: ranks of prior opponents still present in the section.
    pub opponent_ranks: Vec<RankIndex>,
    /// Output: ranks of teammates still present in the section.
    pub teammate_ranks: Vec<RankIndex>,
}

impl Player {
    /// Creates an active player with neutral defaults; callers fill in the
    /// fields the scenario needs.
    pub fn active(id: PlayerId) -> Self {
        Self {
            section_id: 0,
            kind: TournamentKind::Swiss,
            round: 1,
            board_num: -1,
            board_color: None,
            entry: Some(id),
            name: String::new(),
            team_id: 0,
            teammates: Vec::new(),
            opponents: Vec::new(),
            score: 0.0,
            rating: 0,
            unrated: false,
            rating_mode: RatingMode::Uscf,
            provisional: 0,
            rand: 0.0,
            bye_house: false,
            bye_request: false,
            unplayed_count: 0,
            half_bye_count: 0,
            bye_rounds: Vec::new(),
            due_color: DueColor::Neither,
            color_history: Vec::new(),
            played_colors: Vec::new(),
            first_color: Color::White,
            multiround: 1,
            paired: false,
            warn_codes: String::new(),
            rank: RankIndex::new(0),
            opponent_ranks: Vec::new(),
            teammate_ranks: Vec::new(),
        }
    }

    /// Creates the bye sentinel for a section.
    pub fn bye(round: u16, multiround: u16) -> Self {
        let mut p = Self::active(PlayerId { id: 1, reentry: 0 });
        p.entry = None;
        p.round = round;
        p.multiround = multiround;
        p.board_num = -1;
        p
    }

    /// Returns `true` for the bye sentinel.
    #[inline]
    pub const fn is_bye(&self) -> bool {
        self.entry.is_none()
    }

    /// Unrated player in a rated section; such players score with substitute
    /// ratings in the transposition rules (29E5g).
    #[inline]
    pub const fn unrated_in_rated_section(&self) -> bool {
        self.unrated && self.rating_mode.is_rated()
    }

    /// Counts how many times `opponent` appears in the prior-opponent list.
    pub fn games_against(&self, opponent: PlayerId) -> usize {
        self.opponents.iter().filter(|o| **o == opponent).count()
    }

    /// Counts prior games against `opponent` where this player held `color`.
    pub fn games_against_with_color(&self, opponent: PlayerId, color: Color) -> usize {
        debug_assert!(
            self.opponents.len() == self.played_colors.len(),
            "called `Player::games_against_with_color` with opponent/color lists of different lengths: {} vs {}",
            self.opponents.len(),
            self.played_colors.len()
        );

        self.opponents
            .iter()
            .zip(self.played_colors.iter())
            .filter(|(o, c)| **o == opponent && **c == color)
            .count()
    }

    /// Full-point byes already received (rule 28L3).
    pub fn full_bye_count(&self) -> usize {
        self.color_history
            .iter()
            .filter(|m| **m == ColorMark::FullBye)
            .count()
    }

    /// The canonical roster ordering: byes last; players who want a game
    /// first; then by descending score, descending rating, ascending `rand`,
    /// and the id as a final tiebreaker.
    pub fn canonical_cmp(&self, other: &Player) -> Ordering {
        self.is_bye()
            .cmp(&other.is_bye())
            .then(self.bye_request.cmp(&other.bye_request))
            .then(self.paired.cmp(&other.paired))
            .then(other.score.total_cmp(&self.score))
            .then(other.rating.cmp(&self.rating))
            .then(self.rand.total_cmp(&other.rand))
            .then(self.entry.cmp(&other.entry))
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_cmp(other) == Ordering::Equal
    }
}

impl Eq for Player {}

impl PartialOrd for Player {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.canonical_cmp(other))
    }
}

impl Ord for Player {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_cmp(other)
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry {
            Some(id) => write!(
                f,
                "{} (score {}, rating {}, rank {})",
                id,
                self.score,
                self.rating,
                self.rank.get()
            ),
            None => write!(f, "bye"),
        }
    }
}
