//! The symbol graph: every type, field and method of the analyzed program.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::symbols::{
    FieldSymbol, MethodSymbol, NESTED_SEPARATOR, PACKAGE_SEPARATOR, TypeDecl, TypeRef, TypeSymbol,
};
use crate::base::{FieldId, MethodId, TypeId};

/// Arena of declaration-level symbols.
///
/// Symbols are stored in one vector per kind and referenced by index from
/// everywhere else, so the super-type/interface graph is a graph of ids and
/// never a graph of owned objects. The graph is built once by the front end;
/// after that only alias fields change.
#[derive(Clone, Debug, Default)]
pub struct SymbolGraph {
    types: Vec<TypeSymbol>,
    fields: Vec<FieldSymbol>,
    methods: Vec<MethodSymbol>,
    /// Original full name -> type.
    by_name: FxHashMap<SmolStr, TypeId>,
}

impl SymbolGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Add a top-level type.
    pub fn add_type(&mut self, decl: TypeDecl) -> TypeId {
        let full_name = if decl.package.is_empty() {
            decl.short_name.clone()
        } else {
            SmolStr::from(format!("{}{}{}", decl.package, PACKAGE_SEPARATOR, decl.short_name))
        };
        self.push_type(decl, None, full_name)
    }

    /// Add a type nested inside `outer`. The package of `decl` is ignored;
    /// nested types always live in the package of their enclosing type.
    pub fn add_nested_type(&mut self, outer: TypeId, mut decl: TypeDecl) -> TypeId {
        let outer_sym = self.type_symbol(outer);
        let full_name = SmolStr::from(format!("{}{}{}", outer_sym.full_name, NESTED_SEPARATOR, decl.short_name));
        decl.package = outer_sym.package.clone();
        self.push_type(decl, Some(outer), full_name)
    }

    fn push_type(&mut self, decl: TypeDecl, enclosing: Option<TypeId>, full_name: SmolStr) -> TypeId {
        let id = TypeId::from_usize(self.types.len());
        self.by_name.insert(full_name.clone(), id);
        self.types.push(TypeSymbol {
            package: decl.package,
            short_name: decl.short_name,
            enclosing,
            super_type: decl.super_type,
            interfaces: decl.interfaces,
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: decl.source_file,
            full_name,
            alias: None,
        });
        id
    }

    /// Declare a field on `owner`.
    pub fn add_field(&mut self, owner: TypeId, name: &str, descriptor: &str) -> FieldId {
        let id = FieldId::from_usize(self.fields.len());
        self.fields.push(FieldSymbol {
            owner,
            name: name.into(),
            descriptor: descriptor.into(),
            alias: None,
        });
        self.types[owner.as_usize()].fields.push(id);
        id
    }

    /// Declare a method on `owner`.
    pub fn add_method(
        &mut self,
        owner: TypeId,
        name: &str,
        params: &[&str],
        return_type: &str,
        is_virtual: bool,
    ) -> MethodId {
        let id = MethodId::from_usize(self.methods.len());
        self.methods.push(MethodSymbol {
            owner,
            name: name.into(),
            params: params.iter().map(|p| SmolStr::new(p)).collect(),
            return_type: return_type.into(),
            is_virtual,
            alias: None,
            alias_from_preset: false,
            renamed: false,
        });
        self.types[owner.as_usize()].methods.push(id);
        id
    }

    pub fn set_super_type(&mut self, ty: TypeId, super_type: impl Into<TypeRef>) {
        self.types[ty.as_usize()].super_type = Some(super_type.into());
    }

    pub fn add_interface(&mut self, ty: TypeId, interface: impl Into<TypeRef>) {
        self.types[ty.as_usize()].interfaces.push(interface.into());
    }

    pub fn set_source_file(&mut self, ty: TypeId, file: impl Into<SmolStr>) {
        self.types[ty.as_usize()].source_file = Some(file.into());
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Resolve a type reference. Returns `None` for types outside the graph.
    pub fn resolve(&self, reference: &TypeRef) -> Option<TypeId> {
        self.lookup_type(reference.name())
    }

    /// Look up a type by its original full name.
    pub fn lookup_type(&self, full_name: &str) -> Option<TypeId> {
        self.by_name.get(full_name).copied()
    }

    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.as_usize()]
    }

    pub fn field(&self, id: FieldId) -> &FieldSymbol {
        &self.fields[id.as_usize()]
    }

    pub fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.as_usize()]
    }

    /// All types in insertion order.
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len()).map(TypeId::from_usize)
    }

    /// All fields in insertion order.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + use<> {
        (0..self.fields.len()).map(FieldId::from_usize)
    }

    /// All methods in insertion order.
    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + use<> {
        (0..self.methods.len()).map(MethodId::from_usize)
    }

    /// Identity of a field: `<owner>.<name>:<descriptor>`.
    pub fn field_identity(&self, id: FieldId) -> String {
        let field = self.field(id);
        format!("{}.{}:{}", self.type_symbol(field.owner).full_name, field.name, field.descriptor)
    }

    /// Identity of a method: `<owner>.<name>(<params>)<ret>`.
    pub fn method_identity(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!("{}.{}{}", self.type_symbol(method.owner).full_name, method.name, method.descriptor())
    }

    /// Get the number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the graph has no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // ALIAS WRITE-BACK
    // ========================================================================

    /// Remove and return the source file hint. A hint is consumed at most once.
    pub fn take_source_file(&mut self, ty: TypeId) -> Option<SmolStr> {
        self.types[ty.as_usize()].source_file.take()
    }

    /// Give a type a new fully-qualified name.
    pub fn rename_type(&mut self, ty: TypeId, full_alias: impl Into<SmolStr>) {
        self.types[ty.as_usize()].alias = Some(full_alias.into());
    }

    pub fn set_field_alias(&mut self, field: FieldId, alias: impl Into<SmolStr>) {
        self.fields[field.as_usize()].alias = Some(alias.into());
    }

    /// Bind an alias onto a method and mark it renamed.
    pub fn set_method_alias(&mut self, method: MethodId, alias: impl Into<SmolStr>) {
        let sym = &mut self.methods[method.as_usize()];
        sym.alias = Some(alias.into());
        sym.renamed = true;
    }

    pub fn mark_method_preset(&mut self, method: MethodId, from_preset: bool) {
        self.methods[method.as_usize()].alias_from_preset = from_preset;
    }

    /// Drop every alias and rename flag, returning the graph to its
    /// pre-rename state. Source file hints already consumed stay consumed.
    pub fn clear_aliases(&mut self) {
        for ty in &mut self.types {
            ty.alias = None;
        }
        for field in &mut self.fields {
            field.alias = None;
        }
        for method in &mut self.methods {
            method.alias = None;
            method.alias_from_preset = false;
            method.renamed = false;
        }
    }
}
