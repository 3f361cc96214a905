//! Core traits and types.

pub mod batch;
pub mod error;
pub mod manifold;
pub mod points;
pub mod types;

// Re-export core types
pub use batch::*;
pub use error::*;
pub use manifold::*;
pub use points::*;
pub use types::*;
