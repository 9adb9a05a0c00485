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

//! # Wallchart Pair
//!
//! The Swiss-system pairing engine: given one section's state after some
//! number of completed rounds, assign every active player an opponent for
//! the upcoming round, decide colors, number the boards, and report pairing
//! quality as a priority-ordered cost record.
//!
//! The pipeline: canonicalise the roster, seed a starting pairing from board
//! hints (or textbook first pairings), minimise the rule-violation cost with
//! a greedy depth-bounded local search over swap and rotation moves, then
//! finalise boards, colors, and warning codes. Round-robin sections bypass
//! the search and use the embedded Crenshaw-Berger tables.
//!
//! The entry point is [`find_pairings`].

pub mod board;
pub mod color;
pub mod cost;
pub mod find;
pub mod optimize;
pub mod pairable;
pub mod rotate;
pub mod roundrobin;
pub mod seed;
pub mod stats;
pub mod warn;

pub use board::PairVec;
pub use find::{find_pairings, PairingOutcome};
