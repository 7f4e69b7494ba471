//! Schema inference.
//!
//! Turns an open catalog capability into a [`RawGraph`](crate::graph::RawGraph):
//!
//! - [`RelationalExtractor`] reads declared keys from a relational catalog
//! - [`DocumentExtractor`] samples documents, unions the [`classify`]d types
//!   of each field and guesses references through the [`naming`] policy

pub mod classifier;
pub mod document;
pub mod naming;
pub mod relational;

pub use classifier::classify;
pub use document::{DocumentExtractor, ID_FIELD};
pub use naming::{guess_referenced_collection, has_reference_suffix, ReferenceRule, REFERENCE_RULES};
pub use relational::RelationalExtractor;
