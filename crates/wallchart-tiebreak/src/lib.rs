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

//! # Wallchart Tiebreak
//!
//! Post-tournament tiebreak calculation (USCF rule 34E). Given each
//! player's per-round opponents, colors, and result letters, fills a vector
//! of standard tiebreak scores per player: Modified Median, Solkoff,
//! Cumulative, Median, head-to-head, total blacks, Kashdan,
//! Sonneborn-Berger, opposition cumulative, opposition performance and
//! average, wins, first-loss round, and a unique coin flip.

pub mod calc;
pub mod result;

pub use calc::{tiebreak_calculation, TiebreakConfig};
pub use result::{GameResult, PlayerResult, TiebreakCode};
