//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod lookup;

pub(crate) use build::BuildArgs;
pub(crate) use lookup::{SearchArgs, ShowArgs, SymbolArgs};
