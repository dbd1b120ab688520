//! HTTP request handlers.

pub mod records;
pub mod status;
pub mod trash;

pub use records::*;
pub use status::*;
pub use trash::*;
