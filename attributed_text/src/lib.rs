// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attributed Text is a Rust crate which stores text together with named attributes over
//! character ranges.
//!
//! The store supports splicing content (plain or attributed), composing attributes over arbitrary
//! sub-ranges with last-writer-wins semantics, longest-effective-range lookups, and snapshots that
//! capture the exact run structure of a range so temporary overrides can be undone.
//!
//! ## Example
//!
//! ```
//! use attributed_text::{AttributeName, AttributedText};
//!
//! const UNDERLINE: AttributeName = AttributeName::from_static("underline");
//!
//! let mut text = AttributedText::new("Call 555-1234 now");
//! text.add_attribute(UNDERLINE, true, 5..13).unwrap();
//! assert_eq!(text.attribute(&UNDERLINE, 7, 0..text.len()), Some((&true, 5..13)));
//!
//! text.replace(0..4, "Dial").unwrap();
//! assert_eq!(text.as_str(), "Dial 555-1234 now");
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): This is currently unused and is provided for forward compatibility.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

mod attribute_set;
mod attributed_text;
mod error;
mod runs;
mod text_range;

pub use crate::attribute_set::{AttributeName, AttributeSet};
pub use crate::attributed_text::AttributedText;
pub use crate::error::{Error, ErrorKind};
pub use crate::runs::{AttributeSnapshot, Runs};
pub use crate::text_range::TextRange;
