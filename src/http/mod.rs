//! Engine-facing HTTP object model
//!
//! The engine depends only on these types, never on a concrete HTTP
//! client. Adapters convert to and from their client's types.

mod body;
mod headers;
mod message;

pub use body::{Body, Chunks};
pub use headers::Headers;
pub use message::{Request, Response};

pub(crate) use message::media_type;
