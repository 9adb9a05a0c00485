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

//! Engine configuration.

/// Operator-facing knobs for one pairing run.
#[derive(Clone, Debug)]
pub struct PairingConfig {
    /// Total number of rounds in the event; drives the multi-round lookahead.
    pub total_rounds: u16,
    /// Number of the top board; `0` means "use the lowest board hint".
    pub first_board_num: i32,
    /// Optimiser search depth: 1 is fast, 2 is slow, 3+ is a debugging aid.
    pub depth: u8,
    /// Ignore board hints and seed from textbook upper-vs-lower pairings.
    pub use_first_pairings: bool,
    /// Skip the optimiser and only evaluate the seeded pairing.
    pub skip_optimize: bool,
    /// Compatibility mode matching the SwissSys program: drops the
    /// odd-player-unrated cost and changes the opposition cumulative
    /// tiebreak.
    pub swiss_sys_compat: bool,
    /// Variation 28N3 with a zero score threshold: every team block counts,
    /// and the separate below-plus-two block term and its team lookahead are
    /// disabled. On by default.
    pub team_block_zero_threshold: bool,
    /// Node budget for one feasibility lookahead; exhaustion is reported as
    /// infeasible.
    pub lookahead_node_budget: u64,
    /// Section name for diagnostics.
    pub section_name: String,
}

impl PairingConfig {
    /// A production-shaped configuration for an event of `total_rounds`.
    pub fn new(total_rounds: u16) -> Self {
        Self {
            total_rounds,
            first_board_num: 0,
            depth: 2,
            use_first_pairings: false,
            skip_optimize: false,
            swiss_sys_compat: false,
            team_block_zero_threshold: true,
            lookahead_node_budget: 1 << 20,
            section_name: String::new(),
        }
    }

    /// Builder-style override for the top board number.
    pub fn first_board(mut self, first_board_num: i32) -> Self {
        self.first_board_num = first_board_num;
        self
    }

    /// Builder-style override for the optimiser depth.
    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// Builder-style override for the section name.
    pub fn section_name(mut self, name: impl Into<String>) -> Self {
        self.section_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_production_shaped() {
        let c = PairingConfig::new(5);
        assert_eq!(c.total_rounds, 5);
        assert_eq!(c.depth, 2);
        assert!(c.team_block_zero_threshold);
        assert!(!c.swiss_sys_compat);
        assert!(!c.skip_optimize);
    }

    #[test]
    fn test_builder_overrides() {
        let c = PairingConfig::new(4).depth(1).first_board(10).section_name("Open");
        assert_eq!(c.depth, 1);
        assert_eq!(c.first_board_num, 10);
        assert_eq!(c.section_name, "Open");
    }
}
