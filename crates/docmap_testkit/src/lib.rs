//! # docmap Testkit
//!
//! Test utilities for docmap.
//!
//! This crate provides:
//! - Fixture entities covering every built-in converter
//! - Property-based test generators using proptest
//! - Wire vectors pairing entities with their exact CBOR encoding
//! - Concurrent stress helpers
//!
//! ## Usage
//!
//! ```
//! use docmap_testkit::prelude::*;
//!
//! let mapper = fixture_mapper();
//! let widget: Widget = mapper.from_document(&widget_document()).unwrap();
//! assert_eq!(widget.name, "gizmo");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;
