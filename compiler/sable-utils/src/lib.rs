//! Self-contained utilities and scoped re-exports of common external
//! dependencies that are used across the whole Sable compiler source.

pub mod counter;
pub mod highlight;
pub mod logging;
pub mod printing;

// Re-export commonly used dependencies so that down-stream crates don't need
// to declare them as their own dependencies.
pub use bitflags;
pub use dashmap;
pub use derive_more;
pub use fnv;
pub use fxhash;
pub use index_vec;
pub use indexmap;
pub use itertools;
pub use lazy_static;
pub use log;
pub use once_cell;
pub use thin_vec;
