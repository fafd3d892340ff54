//! Schema-less documents.
//!
//! Every ingress point (JSON from a request body, a file on disk, a driver
//! response) is normalized once into [`Document`]; nothing past that
//! boundary looks at the source representation again.

mod accessor;
mod doc;
mod value;

pub use doc::Document;
pub use value::Value;
