//! Rename engine.
//!
//! ```text
//! Deobfuscator   → per-run orchestration (discovery, application, post-process)
//!   ↓
//! overrides      → override resolution and alias groups
//! packages       → package trie with parent-first decisions
//! registry       → synthetic name source
//! scopes         → names taken per package, type and member scope
//! presets        → alias tables loaded before and saved after a run
//! ```

mod config;
mod deobfuscator;
mod diagnostics;
mod error;
mod overrides;
mod packages;
mod presets;
mod registry;
mod scopes;

pub use config::DeobfConfig;
pub use deobfuscator::{ClassAlias, Deobfuscator, RenameReport};
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticSink, Severity, codes};
pub use error::{DeobfError, DeobfResult};
pub use overrides::{OverrideGroup, OverrideGroups, resolve_overriding};
pub use packages::{PackageNode, PackageTree};
pub use presets::{AliasPresets, MapFilePresets, MemoryPresets, PresetStore};
pub use registry::AliasRegistry;
pub use scopes::{NameScopes, TypeScope};
