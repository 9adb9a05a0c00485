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

//! # Wallchart Core
//!
//! Foundational utilities and numerics for the wallchart pairing ecosystem.
//! This crate consolidates the small building blocks shared by the model and
//! engine crates, with a focus on overflow-safe accounting and type-level
//! index hygiene.
//!
//! ## Modules
//!
//! - `num`: saturating by-value arithmetic traits and the geometric severity
//!   weight used by the rule-violation cost model.
//! - `utils`: phantom-tagged, strongly typed indices (`TypedIndex<T>`) so
//!   that rank indices and board indices cannot be mixed up silently.

pub mod num;
pub mod utils;
