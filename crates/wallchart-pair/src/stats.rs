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

//! Statistics for one pairing search.
//!
//! Tracks cost evaluations plus tries and accepts per move variant (swap,
//! the rotation family, the color moves). Updates use saturating arithmetic
//! so the hot loop can never trap on overflow.

use wallchart_core::num::ops::saturating_arithmetic::SaturatingAddVal;

/// Number of move variants in the optimiser (`s = 0..7`).
pub const MOVE_VARIANTS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Total cost-function evaluations.
    pub cost_evaluations: u64,
    /// Candidate moves applied and evaluated, per move variant.
    pub tries: [u64; MOVE_VARIANTS],
    /// Moves accepted as strict improvements, per move variant.
    pub accepts: [u64; MOVE_VARIANTS],
    /// Full restarts with the lookahead cost enabled.
    pub lookahead_redos: u64,
}

impl SearchStatistics {
    #[inline]
    pub fn on_cost_evaluation(&mut self) {
        self.cost_evaluations = self.cost_evaluations.saturating_add_val(1);
    }

    #[inline]
    pub fn on_try(&mut self, variant: usize) {
        self.tries[variant] = self.tries[variant].saturating_add_val(1);
    }

    #[inline]
    pub fn on_accept(&mut self, variant: usize) {
        self.accepts[variant] = self.accepts[variant].saturating_add_val(1);
    }

    #[inline]
    pub fn on_lookahead_redo(&mut self) {
        self.lookahead_redos = self.lookahead_redos.saturating_add_val(1);
    }

    /// Total candidates evaluated across all variants.
    pub fn total_tries(&self) -> u64 {
        self.tries.iter().fold(0_u64, |a, v| a.saturating_add_val(*v))
    }

    /// Total accepted moves across all variants.
    pub fn total_accepts(&self) -> u64 {
        self.accepts.iter().fold(0_u64, |a, v| a.saturating_add_val(*v))
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pairing Search Statistics:")?;
        writeln!(f, "   Cost Evaluations:  {}", self.cost_evaluations)?;
        writeln!(f, "   Moves Tried:       {}", self.total_tries())?;
        writeln!(f, "   Moves Accepted:    {}", self.total_accepts())?;
        writeln!(f, "   Lookahead Redos:   {}", self.lookahead_redos)?;
        for (s, (t, a)) in self.tries.iter().zip(self.accepts.iter()).enumerate() {
            if *t != 0 || *a != 0 {
                writeln!(f, "   Variant {s}: tried {t}, accepted {a}")?;
            }
        }
        Ok(())
    }
}
