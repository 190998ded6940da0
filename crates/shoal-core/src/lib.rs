#![forbid(unsafe_code)]

//! Card data model and value extraction for the `shoal` positioning engine.
//!
//! `shoal-core` holds everything the layout strategies consume but do not
//! own: the [`DataAccessor`] seam to the application's record storage,
//! [`CardElement`] identity, value extraction with configurable NaN handling
//! and rank modes, cooperative cancellation, and the flat key-value
//! configuration surface used to persist a positioner setup.
//!
//! Design goals:
//! - deterministic, testable outputs (seeded randomness, stable rank order)
//! - runtime-agnostic cancellation (no specific executor required)

pub mod cancel;
pub mod data;
pub mod element;
pub mod error;
pub mod extract;
pub mod geom;
pub mod props;
pub mod rng;

pub use cancel::CancelToken;
pub use data::{ColumnId, DataAccessor, MemoryTable, RecordId};
pub use element::{CardElement, ElementId};
pub use error::{Error, Result};
pub use extract::{ExtractionMode, NanPolicy};
pub use props::PropertyMap;
