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

//! Result letters and the per-player tiebreak record.

use wallchart_model::color::ColorMark;

/// One round's result letter. Double-round formats add the combined letters
/// (`$`, `#`, `%`); forfeits and byes have their own letters so the
/// adjustments of rule 34E can tell played from unplayed points.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GameResult {
    /// `$` — two wins in a double-game round.
    DoubleWin,
    /// `#` — one and a half points in a double-game round.
    WinAndDraw,
    /// `%` — an even split of a double-game round.
    SplitDouble,
    /// `W` — played win.
    Win,
    /// `N` — win by forfeit, counted as played.
    ForfeitWin,
    /// `B` — full-point bye.
    FullBye,
    /// `X` — forfeit win counted as unplayed.
    UnplayedWin,
    /// `D` — played draw.
    Draw,
    /// `R` — draw by forfeit or adjudication.
    ForfeitDraw,
    /// `H` — half-point bye.
    HalfBye,
    /// `Z` — zero-point bye.
    ZeroBye,
    /// `L` — played loss.
    Loss,
    /// `S` — loss by forfeit.
    ForfeitLoss,
    /// `U` — unplayed round.
    Unplayed,
    /// `F` — unplayed forfeit.
    Forfeited,
    /// `*` — no game scheduled.
    NoGame,
}

impl GameResult {
    /// Parses a result letter.
    pub fn from_char(letter: char) -> Option<GameResult> {
        Some(match letter {
            '$' => GameResult::DoubleWin,
            '#' => GameResult::WinAndDraw,
            '%' => GameResult::SplitDouble,
            'W' => GameResult::Win,
            'N' => GameResult::ForfeitWin,
            'B' => GameResult::FullBye,
            'X' => GameResult::UnplayedWin,
            'D' => GameResult::Draw,
            'R' => GameResult::ForfeitDraw,
            'H' => GameResult::HalfBye,
            'Z' => GameResult::ZeroBye,
            'L' => GameResult::Loss,
            'S' => GameResult::ForfeitLoss,
            'U' => GameResult::Unplayed,
            'F' => GameResult::Forfeited,
            '*' => GameResult::NoGame,
            _ => return None,
        })
    }

    /// The wire letter.
    pub const fn as_char(self) -> char {
        match self {
            GameResult::DoubleWin => '$',
            GameResult::WinAndDraw => '#',
            GameResult::SplitDouble => '%',
            GameResult::Win => 'W',
            GameResult::ForfeitWin => 'N',
            GameResult::FullBye => 'B',
            GameResult::UnplayedWin => 'X',
            GameResult::Draw => 'D',
            GameResult::ForfeitDraw => 'R',
            GameResult::HalfBye => 'H',
            GameResult::ZeroBye => 'Z',
            GameResult::Loss => 'L',
            GameResult::ForfeitLoss => 'S',
            GameResult::Unplayed => 'U',
            GameResult::Forfeited => 'F',
            GameResult::NoGame => '*',
        }
    }

    /// A round that was actually contested over the board (or by forfeit
    /// decision); byes and unplayed rounds are excluded from opposition
    /// tiebreaks.
    pub const fn is_played(self) -> bool {
        !matches!(
            self,
            GameResult::FullBye
                | GameResult::UnplayedWin
                | GameResult::HalfBye
                | GameResult::ZeroBye
                | GameResult::Unplayed
                | GameResult::Forfeited
                | GameResult::NoGame
        )
    }
}

/// The tiebreak systems emitted, in output order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TiebreakCode {
    /// `M` — Modified Median (Harkness), rule 34E1.
    ModifiedMedian,
    /// `S` — Solkoff, rule 34E2.
    Solkoff,
    /// `C` — Cumulative score, rule 34E3.
    Cumulative,
    /// `B` — Median (not modified), rule 34E4.
    Median,
    /// `H` — head-to-head among tied players, rule 34E5.
    HeadToHead,
    /// `T` — total games with Black, rule 34E6.
    Blacks,
    /// `K` — Kashdan aggressiveness, rule 34E7.
    Kashdan,
    /// `R` — round-robin Sonneborn-Berger, rule 34E8.
    SonnebornBerger,
    /// `O` — opposition cumulative score, rule 34E9.
    OppositionCumulative,
    /// `P` — performance of opposition, rule 34E10.
    OppositionPerformance,
    /// `A` — average rating of opposition, rule 34E11.
    OppositionAverage,
    /// `W` — win count.
    Wins,
    /// `L` — round of first loss.
    FirstLoss,
    /// `Z` — coin flip, rule 34E13.
    CoinFlip,
}

impl TiebreakCode {
    pub const fn as_char(self) -> char {
        match self {
            TiebreakCode::ModifiedMedian => 'M',
            TiebreakCode::Solkoff => 'S',
            TiebreakCode::Cumulative => 'C',
            TiebreakCode::Median => 'B',
            TiebreakCode::HeadToHead => 'H',
            TiebreakCode::Blacks => 'T',
            TiebreakCode::Kashdan => 'K',
            TiebreakCode::SonnebornBerger => 'R',
            TiebreakCode::OppositionCumulative => 'O',
            TiebreakCode::OppositionPerformance => 'P',
            TiebreakCode::OppositionAverage => 'A',
            TiebreakCode::Wins => 'W',
            TiebreakCode::FirstLoss => 'L',
            TiebreakCode::CoinFlip => 'Z',
        }
    }
}

/// One player's tournament record and computed tiebreaks.
///
/// The three input vectors are parallel, one entry per round. Players do not
/// all need the same round count (cross-section calculations differ);
/// withdrawn players should carry `U` for missed games. The intermediate
/// fields are scratch space; callers read `tiebreaks` when the calculation
/// returns.
#[derive(Clone, Debug, Default)]
pub struct PlayerResult {
    /// The map key this record is indexed by (`id_reentry`).
    pub player: String,
    pub rating: i16,

    /// Opponent key per round.
    pub opponents: Vec<String>,
    /// Color per round; bye placeholders for unplayed rounds.
    pub colors: Vec<ColorMark>,
    /// Result letter per round.
    pub results: Vec<GameResult>,

    // Scratch fields, overwritten by the calculation.
    pub raw_score: f32,
    pub adj_score: f32,
    pub cum_score: f32,
    pub cum_score_with_byes: f32,
    pub bye_score: f32,
    pub head_to_head: f32,
    pub bye_count: u16,
    pub black_count: u16,
    pub kashdan: u16,
    pub win_count: u16,
    pub first_loss_round: usize,
    pub performance_rating: f64,
    pub coin_flip: f64,

    /// Output: `(code, value)` pairs in the order of [`TiebreakCode`].
    pub tiebreaks: Vec<(TiebreakCode, f64)>,
}

impl PlayerResult {
    /// A record with the identity and per-round inputs filled in.
    pub fn new(
        player: impl Into<String>,
        rating: i16,
        opponents: Vec<String>,
        colors: Vec<ColorMark>,
        results: Vec<GameResult>,
    ) -> Self {
        Self {
            player: player.into(),
            rating,
            opponents,
            colors,
            results,
            ..Self::default()
        }
    }
}
