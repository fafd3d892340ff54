//! Identifier types.
//!
//! These types enforce their invariants at construction time, so an
//! `ObjectId` always holds exactly twelve bytes.

mod document_id;
mod object_id;

pub use document_id::DocumentId;
pub use object_id::ObjectId;
