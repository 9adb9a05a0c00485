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

//! The priority-ordered pairing cost record.
//!
//! Each field counts violations of one pairing rule; the fields are listed
//! from most to least severe in strict USCF priority order, and two records
//! compare lexicographically over that order. Any improvement in a
//! higher-priority field dominates any regression below it, which is exactly
//! the property the greedy optimiser relies on. Zero is a perfect pairing.
//!
//! Field comments give the relevant USCF rules.

use std::cmp::Ordering;

/// The numeric type of one cost slot.
pub type CostValue = i64;

/// One more than the maximum possible rating; scales the transposition and
/// interchange slots so the violation count dominates the rating delta.
pub const MAX_RATING: CostValue = 30_000 + 1;

/// Number of priority-ordered slots in a [`Cost`].
pub const COST_SLOTS: usize = 26;

/// A pairing quality report; lower is better, zero is perfect.
#[derive(Clone, Copy, Default, Debug)]
pub struct Cost {
    pub bye_choice: CostValue,                // 22C, 29K
    pub bye_again: CostValue,                 // 28L3
    pub players_meet_twice: CostValue,        // 27A1, 28S1, 28S2, 29C2
    pub cant_pair_players: CostValue,         // 27A1, 29C2, 29K, 29L
    pub team_blocks2: CostValue,              // 28N, 28N1, 28T, 29C2
    pub unequal_scores: CostValue,            // 27A2, 29A, 29B
    pub team_blocks: CostValue,               // 28N, 28N1, 28T, 29C2
    pub cant_pair_teams: CostValue,           // 28N, 28N1, 28T, 29C2, 29K, 29L
    pub bye_after_half: CostValue,            // 28L4
    pub lowest_score_bye: CostValue,          // 28L2, 28L5
    pub lowest_rated_bye: CostValue,          // 28L2, 28L5
    pub odd_player_unrated: CostValue,        // 29D1
    pub odd_player_multiple_groups: CostValue, // 29D2
    pub interchange_200: CostValue,           // 27A3, 29C, 29D, 29E5
    pub transpose_200: CostValue,             // 27A5, 29C, 29D, 29E
    pub color_imbalance: CostValue,           // 27A4, 29E4
    pub color_repeat3: CostValue,             // 29E5f
    pub interchange_80: CostValue,            // 27A3, 29D, 29E5
    pub transpose_80: CostValue,              // 27A5, 29C, 29D, 29E
    pub color_alternate: CostValue,           // 27A5
    pub interchange_0: CostValue,             // 27A3, 29D, 29E5
    pub transpose_0: CostValue,               // 27A5, 29C, 29D, 29E
    pub pairing_card: CostValue,              // 28A, 28B, 29A
    pub reversed_colors: CostValue,           // 28J, 29E
    pub board_overlap: CostValue,             // 28J
    pub board_order: CostValue,               // 28J

    /// Section size for display scaling; not part of the ordering.
    pub players: usize,
}

impl Cost {
    /// Creates a zero cost for a section of `players`.
    #[inline]
    pub fn zero(players: usize) -> Self {
        Cost {
            players,
            ..Cost::default()
        }
    }

    /// The slots in strict priority order, most severe first.
    #[inline]
    pub fn priority_slots(&self) -> [CostValue; COST_SLOTS] {
        [
            self.bye_choice,
            self.bye_again,
            self.players_meet_twice,
            self.cant_pair_players,
            self.team_blocks2,
            self.unequal_scores,
            self.team_blocks,
            self.cant_pair_teams,
            self.bye_after_half,
            self.lowest_score_bye,
            self.lowest_rated_bye,
            self.odd_player_unrated,
            self.odd_player_multiple_groups,
            self.interchange_200,
            self.transpose_200,
            self.color_imbalance,
            self.color_repeat3,
            self.interchange_80,
            self.transpose_80,
            self.color_alternate,
            self.interchange_0,
            self.transpose_0,
            self.pairing_card,
            self.reversed_colors,
            self.board_overlap,
            self.board_order,
        ]
    }

    /// Returns `true` when every slot is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.priority_slots().iter().all(|v| *v == 0)
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.priority_slots() == other.priority_slots()
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority_slots().cmp(&other.priority_slots())
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; COST_SLOTS] = [
            "byeChoice",
            "byeAgain",
            "playersMeetTwice",
            "cantPairPlayers",
            "teamBlocks2",
            "unequalScores",
            "teamBlocks",
            "cantPairTeams",
            "byeAfterHalf",
            "lowestScoreBye",
            "lowestRatedBye",
            "oddPlayerUnrated",
            "oddPlayerMultipleGroups",
            "interchange200",
            "transpose200",
            "colorImbalance",
            "colorRepeat3",
            "interchange80",
            "transpose80",
            "colorAlternate",
            "interchange0",
            "transpose0",
            "pairingCard",
            "reversedColors",
            "boardOverlap",
            "boardOrder",
        ];
        // Rating-scaled slots render as count,delta.
        const SCALED: [bool; COST_SLOTS] = [
            false, false, false, false, false, false, false, false, false, false, false, false,
            false, true, true, false, false, true, true, false, true, true, false, false, false,
            false,
        ];

        let slots = self.priority_slots();
        let mut found = false;
        for (num, ((name, value), scaled)) in
            NAMES.iter().zip(slots.iter()).zip(SCALED.iter()).enumerate()
        {
            if *value == 0 {
                continue;
            }
            if found {
                write!(f, " ")?;
            }
            found = true;
            let scale = MAX_RATING * self.players as CostValue;
            if *scaled && scale > 0 {
                write!(
                    f,
                    "{}){}={},{}",
                    num + 1,
                    name,
                    value / scale,
                    value % scale
                )?;
            } else {
                write!(f, "{}){}={}", num + 1, name, value)?;
            }
        }
        if !found {
            write!(f, "zero")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_zero() {
        assert!(Cost::zero(8).is_zero());
    }

    #[test]
    fn test_higher_priority_dominates() {
        let mut a = Cost::zero(8);
        a.players_meet_twice = 1;
        let mut b = Cost::zero(8);
        b.transpose_0 = 1_000_000;
        b.color_alternate = 50;
        assert!(b < a, "any amount of low-priority cost beats one rematch");
    }

    #[test]
    fn test_equal_prefix_falls_through() {
        let mut a = Cost::zero(8);
        a.color_alternate = 1;
        let mut b = Cost::zero(8);
        b.color_alternate = 1;
        b.transpose_0 = 5;
        assert!(a < b);
        assert_eq!(a, {
            let mut c = Cost::zero(4);
            c.color_alternate = 1;
            c
        });
    }

    #[test]
    fn test_display_lists_only_nonzero() {
        let mut c = Cost::zero(8);
        c.bye_choice = 2;
        let s = c.to_string();
        assert!(s.contains("byeChoice=2"), "got {s}");
        assert!(!s.contains("transpose"), "got {s}");
        assert_eq!(Cost::zero(8).to_string(), "zero");
    }
}
