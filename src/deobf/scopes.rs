//! Names in use, per declaration scope.
//!
//! A synthesized alias must not repeat a name its scope already declares.
//! Top-level types share their package, nested types share their enclosing
//! type, fields and methods share their owner. Methods are tracked by
//! override key (`name(params)`) so overloads stay apart.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::overrides::OverrideGroup;
use super::registry::AliasRegistry;
use crate::base::{MethodId, TypeId};
use crate::graph::SymbolGraph;

/// The scope a type's short name lives in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeScope {
    /// Original dotted package path.
    Package(SmolStr),
    Enclosing(TypeId),
}

impl TypeScope {
    pub fn of(graph: &SymbolGraph, ty: TypeId) -> Self {
        let sym = graph.type_symbol(ty);
        match sym.enclosing {
            Some(outer) => Self::Enclosing(outer),
            None => Self::Package(sym.package.clone()),
        }
    }
}

/// Taken names for every scope seen in a run.
///
/// Seeded with every original name in the graph, then grows with each alias
/// decided. Names are never released, so an alias also avoids the original
/// name of a sibling that was itself renamed.
#[derive(Clone, Debug, Default)]
pub struct NameScopes {
    types: FxHashMap<TypeScope, FxHashSet<SmolStr>>,
    fields: FxHashMap<TypeId, FxHashSet<SmolStr>>,
    methods: FxHashMap<TypeId, FxHashSet<SmolStr>>,
}

impl NameScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every declared name in `graph`.
    pub fn seed(&mut self, graph: &SymbolGraph) {
        for ty in graph.type_ids() {
            let sym = graph.type_symbol(ty);
            self.types
                .entry(TypeScope::of(graph, ty))
                .or_default()
                .insert(sym.short_name.clone());

            let fields = self.fields.entry(ty).or_default();
            fields.extend(sym.fields.iter().map(|&f| graph.field(f).name.clone()));

            let methods = self.methods.entry(ty).or_default();
            methods.extend(sym.methods.iter().map(|&m| SmolStr::from(graph.method(m).override_key())));
        }
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.fields.clear();
        self.methods.clear();
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    pub fn is_type_free(&self, scope: &TypeScope, name: &str) -> bool {
        self.types.get(scope).is_none_or(|taken| !taken.contains(name))
    }

    pub fn claim_type(&mut self, scope: TypeScope, name: SmolStr) {
        self.types.entry(scope).or_default().insert(name);
    }

    /// A registry name free in `scope`, claimed before returning.
    pub fn draw_type(&mut self, scope: TypeScope, registry: &mut AliasRegistry) -> SmolStr {
        draw(self.types.entry(scope).or_default(), registry)
    }

    // ========================================================================
    // MEMBERS
    // ========================================================================

    pub fn claim_field(&mut self, owner: TypeId, name: SmolStr) {
        self.fields.entry(owner).or_default().insert(name);
    }

    pub fn draw_field(&mut self, owner: TypeId, registry: &mut AliasRegistry) -> SmolStr {
        draw(self.fields.entry(owner).or_default(), registry)
    }

    /// Claim `name` for `method` in its owner.
    pub fn claim_method(&mut self, graph: &SymbolGraph, method: MethodId, name: &str) {
        let sym = graph.method(method);
        self.methods
            .entry(sym.owner)
            .or_default()
            .insert(sym.override_key_as(name).into());
    }

    /// A registry name that gives `method` an override key its owner does
    /// not declare yet, claimed before returning.
    pub fn draw_method(&mut self, graph: &SymbolGraph, method: MethodId, registry: &mut AliasRegistry) -> SmolStr {
        let sym = graph.method(method);
        let taken = self.methods.entry(sym.owner).or_default();
        let name = registry.next_name_where(|n| !taken.contains(sym.override_key_as(n).as_str()));
        taken.insert(sym.override_key_as(&name).into());
        name
    }

    /// `chosen` when every member of `group` can carry it, otherwise a
    /// registry name that all of them can. The result is claimed in every
    /// member's owner.
    pub fn fit_group(
        &mut self,
        graph: &SymbolGraph,
        group: &OverrideGroup,
        chosen: SmolStr,
        registry: &mut AliasRegistry,
    ) -> SmolStr {
        let fits = |scopes: &Self, name: &str| group.members().all(|m| scopes.member_fits(graph, group, m, name));

        let name = if fits(self, &chosen) {
            chosen
        } else {
            let replacement = registry.next_name_where(|n| fits(self, n));
            tracing::debug!(%chosen, %replacement, "group alias clashes with a declared method");
            replacement
        };
        for method in group.members() {
            self.claim_method(graph, method, &name);
        }
        name
    }

    /// A name is free for `method` unless its owner already declares the
    /// key for a method outside `group`.
    fn member_fits(&self, graph: &SymbolGraph, group: &OverrideGroup, method: MethodId, name: &str) -> bool {
        let sym = graph.method(method);
        let key = sym.override_key_as(name);
        let Some(taken) = self.methods.get(&sym.owner) else {
            return true;
        };
        if !taken.contains(key.as_str()) {
            return true;
        }
        group.members().map(|m| graph.method(m)).any(|m| {
            m.owner == sym.owner && (m.alias() == Some(name) || m.override_key() == key)
        })
    }
}

fn draw(taken: &mut FxHashSet<SmolStr>, registry: &mut AliasRegistry) -> SmolStr {
    let name = registry.next_name_where(|n| !taken.contains(n));
    taken.insert(name.clone());
    name
}

#[cfg(test)]
mod tests {
    use indexmap::IndexSet;

    use super::*;
    use crate::deobf::overrides::OverrideGroups;
    use crate::graph::TypeDecl;

    #[test]
    fn test_type_draw_skips_declared_names() {
        let mut graph = SymbolGraph::new();
        let a = graph.add_type(TypeDecl::new("p.a"));
        graph.add_type(TypeDecl::new("p.b"));
        let mut scopes = NameScopes::new();
        scopes.seed(&graph);
        let mut registry = AliasRegistry::new();

        let scope = TypeScope::of(&graph, a);
        assert_eq!(scopes.draw_type(scope.clone(), &mut registry), "c");
        assert!(!scopes.is_type_free(&scope, "c"));
        // Another package has nothing declared.
        assert_eq!(scopes.draw_type(TypeScope::Package("q".into()), &mut registry), "d");
    }

    #[test]
    fn test_nested_types_have_their_own_scope() {
        let mut graph = SymbolGraph::new();
        let outer = graph.add_type(TypeDecl::new("p.Outer"));
        let inner = graph.add_nested_type(outer, TypeDecl::new("a"));
        let mut scopes = NameScopes::new();
        scopes.seed(&graph);

        assert_eq!(TypeScope::of(&graph, inner), TypeScope::Enclosing(outer));
        assert!(scopes.is_type_free(&TypeScope::Package("p".into()), "a"));
        assert!(!scopes.is_type_free(&TypeScope::Enclosing(outer), "a"));
    }

    #[test]
    fn test_field_draw_skips_siblings() {
        let mut graph = SymbolGraph::new();
        let ty = graph.add_type(TypeDecl::new("p.Main"));
        graph.add_field(ty, "a", "I");
        graph.add_field(ty, "Il", "I");
        let mut scopes = NameScopes::new();
        scopes.seed(&graph);
        let mut registry = AliasRegistry::new();

        assert_eq!(scopes.draw_field(ty, &mut registry), "b");
        assert_eq!(scopes.draw_field(ty, &mut registry), "c");
    }

    #[test]
    fn test_method_draw_respects_overloads() {
        let mut graph = SymbolGraph::new();
        let ty = graph.add_type(TypeDecl::new("p.Main"));
        graph.add_method(ty, "a", &["I"], "V", false);
        let m = graph.add_method(ty, "Il", &[], "V", false);
        let mut scopes = NameScopes::new();
        scopes.seed(&graph);
        let mut registry = AliasRegistry::new();

        // a(I) exists but a() does not.
        assert_eq!(scopes.draw_method(&graph, m, &mut registry), "a");
        let other = graph.add_method(ty, "lI", &[], "V", false);
        assert_eq!(scopes.draw_method(&graph, other, &mut registry), "b");
    }

    #[test]
    fn test_group_alias_replaced_on_clash() {
        let mut graph = SymbolGraph::new();
        let base = graph.add_type(TypeDecl::new("p.Base"));
        let sub = graph.add_type(TypeDecl::new("p.Sub").extends("p.Base"));
        let base_run = graph.add_method(base, "Il", &[], "V", true);
        let sub_run = graph.add_method(sub, "Il", &[], "V", true);
        // Sub already declares an unrelated `b()`.
        graph.add_method(sub, "b", &[], "V", false);
        graph.set_method_alias(base_run, "b");

        let mut groups = OverrideGroups::new();
        groups.merge(&IndexSet::from([sub_run, base_run]));
        let (_, group) = groups.groups().next().unwrap();

        let mut scopes = NameScopes::new();
        scopes.seed(&graph);
        scopes.claim_method(&graph, base_run, "b");
        let mut registry = AliasRegistry::new();

        let name = scopes.fit_group(&graph, group, "b".into(), &mut registry);
        assert_ne!(name, "b");
        assert_ne!(name, "Il");
    }

    #[test]
    fn test_group_alias_kept_when_free() {
        let mut graph = SymbolGraph::new();
        let base = graph.add_type(TypeDecl::new("p.Base"));
        let sub = graph.add_type(TypeDecl::new("p.Sub").extends("p.Base"));
        let base_run = graph.add_method(base, "Il", &[], "V", true);
        let sub_run = graph.add_method(sub, "Il", &[], "V", true);
        graph.set_method_alias(base_run, "b");

        let mut groups = OverrideGroups::new();
        groups.merge(&IndexSet::from([sub_run, base_run]));
        let (_, group) = groups.groups().next().unwrap();

        let mut scopes = NameScopes::new();
        scopes.seed(&graph);
        scopes.claim_method(&graph, base_run, "b");
        let mut registry = AliasRegistry::new();

        assert_eq!(scopes.fit_group(&graph, group, "b".into(), &mut registry), "b");
        assert_eq!(registry.issued(), 0);
    }
}
