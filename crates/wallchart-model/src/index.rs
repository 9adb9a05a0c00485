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

//! Index types of the pairing domain.
//!
//! Two index spaces coexist: *ranks* into the canonical roster (dense, byes
//! last) and *boards* on the wall chart. Both are phantom-tagged so they
//! cannot be confused.

use wallchart_core::utils::index::{TypedIndex, TypedIndexTag};

/// Tag for indices into the canonical roster ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RankTag;

impl TypedIndexTag for RankTag {
    const NAME: &'static str = "RankIndex";
}

/// A player's position in the canonical roster (0 = strongest wanting a game,
/// highest = the bye sentinel).
pub type RankIndex = TypedIndex<RankTag>;

/// Tag for zero-based board positions in a finished pairing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BoardTag;

impl TypedIndexTag for BoardTag {
    const NAME: &'static str = "BoardIndex";
}

/// A zero-based board position; the published board number is
/// `first_board_num + board.get()`.
pub type BoardIndex = TypedIndex<BoardTag>;
