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

//! Warning codes.
//!
//! Every cost term that fires on the final pairing appends a single-letter
//! code to the affected player's `warn_codes`. Letters are assigned by a
//! deterministic counter tied to the per-board evaluation order (`A..Z` then
//! `a..z`), so a given letter always means the same rule across the run. The
//! letter → description catalog is a per-process table filled the first time
//! each letter is emitted and read-only afterwards.

use std::sync::{Mutex, OnceLock};

const MAX_CODES: usize = 26 * 2;

/// A single warning letter, `A..=Z` or `a..=z`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WarnCode(char);

impl WarnCode {
    /// Wraps a letter.
    ///
    /// # Panics
    ///
    /// Panics if `letter` is not an ASCII letter.
    pub fn new(letter: char) -> Self {
        assert!(
            letter.is_ascii_alphabetic(),
            "called `WarnCode::new` with non-letter {letter:?}"
        );
        Self(letter)
    }

    /// The letter itself.
    #[inline]
    pub const fn as_char(self) -> char {
        self.0
    }

    fn slot(self) -> usize {
        if self.0.is_ascii_uppercase() {
            self.0 as usize - 'A' as usize
        } else {
            26 + self.0 as usize - 'a' as usize
        }
    }
}

/// Deterministic letter dispenser: `A..Z`, then `a..z`.
#[derive(Clone, Debug)]
pub struct CodeAssigner {
    next: char,
}

impl CodeAssigner {
    /// Starts a fresh sequence; the first [`CodeAssigner::next`] yields `A`.
    #[inline]
    pub fn new() -> Self {
        Self { next: 'A' }
    }

    /// Yields the next letter in sequence.
    ///
    /// # Panics
    ///
    /// Panics when more than 52 letters are requested; the cost model uses
    /// far fewer.
    pub fn next(&mut self) -> WarnCode {
        let code = WarnCode(self.next);
        self.next = match self.next {
            'Z' => 'a',
            'z' => panic!("called `CodeAssigner::next` past the last letter"),
            c => (c as u8 + 1) as char,
        };
        code
    }
}

impl Default for CodeAssigner {
    fn default() -> Self {
        Self::new()
    }
}

fn catalog() -> &'static Mutex<[Option<&'static str>; MAX_CODES]> {
    static CATALOG: OnceLock<Mutex<[Option<&'static str>; MAX_CODES]>> = OnceLock::new();
    CATALOG.get_or_init(|| Mutex::new([None; MAX_CODES]))
}

/// Records `code` on a player's warning string and pins its description in
/// the per-process catalog on first emission. Repeated letters are kept
/// unique per player.
pub fn record(warn_codes: &mut String, code: WarnCode, description: &'static str) {
    {
        let mut table = catalog().lock().expect("warn catalog poisoned");
        let slot = &mut table[code.slot()];
        if slot.is_none() {
            *slot = Some(description);
        }
    }
    if !warn_codes.contains(code.as_char()) {
        warn_codes.push(code.as_char());
    }
}

/// Looks up the recorded description for a letter, if that letter has ever
/// been emitted in this process.
pub fn description(code: WarnCode) -> Option<&'static str> {
    catalog().lock().expect("warn catalog poisoned")[code.slot()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigner_sequence_wraps_case() {
        let mut a = CodeAssigner::new();
        for expected in 'A'..='Z' {
            assert_eq!(a.next().as_char(), expected);
        }
        assert_eq!(a.next().as_char(), 'a');
    }

    #[test]
    fn test_record_is_unique_per_player() {
        let mut codes = String::new();
        record(&mut codes, WarnCode::new('Q'), "test description");
        record(&mut codes, WarnCode::new('Q'), "test description");
        assert_eq!(codes, "Q");
        assert_eq!(description(WarnCode::new('Q')), Some("test description"));
    }

    #[test]
    fn test_first_description_wins() {
        let mut codes = String::new();
        record(&mut codes, WarnCode::new('q'), "first");
        record(&mut codes, WarnCode::new('q'), "second");
        assert_eq!(description(WarnCode::new('q')), Some("first"));
    }
}
