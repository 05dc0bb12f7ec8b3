//! # unobf
//!
//! Identifier rename engine for decompiled JVM code.
//!
//! Obfuscators shrink names to `a`, `b`, `lIl1` or reserved words. This
//! crate replaces such names with readable aliases that are unique,
//! consistent across overriding methods and stable between runs through
//! alias presets.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! deobf   → Rename engine (Deobfuscator, override groups, presets)
//!   ↓
//! graph   → Symbol graph the decompiler fills and the engine renames
//!   ↓
//! base    → Primitives (arena ids, identifier classification)
//! ```
//!
//! ## Example
//!
//! ```
//! use unobf::{DeobfConfig, Deobfuscator, SymbolGraph, TypeDecl};
//!
//! let mut graph = SymbolGraph::new();
//! let ty = graph.add_type(TypeDecl::new("com.example.a"));
//! let field = graph.add_field(ty, "b", "I");
//!
//! let mut deobf = Deobfuscator::new(DeobfConfig::new());
//! let report = deobf.process(&mut graph);
//!
//! assert_eq!(report.fields_renamed, 1);
//! assert!(graph.field(field).alias().is_some());
//! assert_ne!(graph.type_symbol(ty).display_name(), "com.example.a");
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Foundation types: arena ids, identifier classification
pub mod base;

/// Rename engine: orchestrator, override groups, package tree, presets
pub mod deobf;

/// Symbol graph: types, fields, methods and their aliases
pub mod graph;

// Re-export the common surface
pub use base::{FieldId, IdentifierClassifier, JavaIdentifiers, MethodId, PackageId, TypeId};
pub use deobf::{AliasPresets, DeobfConfig, DeobfError, Deobfuscator, MapFilePresets, MemoryPresets, PresetStore, RenameReport};
pub use graph::{SymbolGraph, TypeDecl, TypeRef};
