//! Foundation types for the rename engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TypeId`], [`FieldId`], [`MethodId`] - Symbol graph indices
//! - [`PackageId`], [`GroupId`] - Engine-side arena indices
//! - [`IdentifierClassifier`], [`JavaIdentifiers`] - Identifier predicates
//!
//! This module has NO dependencies on other crate modules.

mod ids;
mod naming;

pub use ids::{FieldId, GroupId, MethodId, PackageId, TypeId};
pub use naming::{IdentifierClassifier, JavaIdentifiers, contains_digit, is_reserved_word};
