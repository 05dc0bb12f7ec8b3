//! Symbol graph: the decompiler's view of declarations.
//!
//! The bytecode front end fills a [`SymbolGraph`] once per job. The rename
//! engine reads its shape (packages, names, super-types, interfaces,
//! members) and writes back only through the alias setters.

mod index;
mod symbols;

pub use index::SymbolGraph;
pub use symbols::{
    FieldSymbol, MethodSymbol, NESTED_SEPARATOR, PACKAGE_SEPARATOR, TypeDecl, TypeRef, TypeSymbol,
};
