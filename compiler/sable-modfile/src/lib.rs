//! Sable compiler module file support. A module file is the binary
//! artifact that a compiled module leaves behind, carrying the attribute
//! records that downstream compilations need to consume the module. This
//! crate implements the value encoding and the surrounding framing, the
//! attribute layer decides what goes into the records.

pub mod error;
pub mod module;
pub mod value;

pub use error::{CorruptKind, ModfileError, ModfileResult};
