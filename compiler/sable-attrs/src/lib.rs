//! Sable compiler attribute definitions and management. This crate
//! defines the builtin attributes such as `@[extern]` and `@[export]`,
//! the [`registry::AttrRegistry`] that maps attribute names to their
//! parsing and serialisation schemas, the [`env::ModuleEnv`] that attaches
//! parsed attributes onto declarations, and the [`persist`] bridge that
//! records them into module files and loads them back.

pub mod adapter;
pub mod builtin;
pub mod checks;
pub mod diagnostics;
pub mod env;
pub mod export;
pub mod foreign;
pub mod parser;
pub mod persist;
pub mod registry;
pub mod target;
