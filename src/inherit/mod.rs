//! Class inheritance over rendered documents.

pub mod hierarchy;
pub mod merge;

pub use hierarchy::{AncestorResolver, ClassRegistry};
pub use merge::merge;
