//! Store driver traits.

mod collection;
mod cursor;

pub use collection::Collection;
pub use cursor::DocumentCursor;
