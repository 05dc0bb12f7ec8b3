//! Override equivalence: methods that must share one alias.
//!
//! A virtual method and every method it overrides (or is overridden by),
//! anywhere in the super-type/interface closure, form an override group.
//! Groups are discovered one starting method at a time, in whatever order
//! the symbol graph is walked, and merged as overlaps show up.
//!
//! ## Ordering
//!
//! Group members are kept in first-discovery order: members of the group
//! that absorbed the others come first, then members merged in from other
//! groups, then members new to this traversal in traversal order (own type,
//! then super type, then interfaces, depth first). Alias unification picks
//! the first eligible member in that order, so for a fixed graph order the
//! outcome is fully deterministic.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::diagnostics::{DiagnosticSink, diamond_override};
use super::registry::AliasRegistry;
use super::scopes::NameScopes;
use crate::base::{GroupId, MethodId, TypeId};
use crate::graph::SymbolGraph;

// ============================================================================
// RESOLVER
// ============================================================================

/// Collect every method sharing `method`'s override key in the super-type
/// and interface closure of `ty`, `method` itself included.
///
/// References leaving the graph are skipped. When two inheritance branches
/// name different declaring types, a diamond warning is reported and the
/// first one found stays representative.
pub fn resolve_overriding(
    graph: &SymbolGraph,
    ty: TypeId,
    method: MethodId,
    sink: &mut dyn DiagnosticSink,
) -> IndexSet<MethodId> {
    let mut walk = OverrideWalk {
        graph,
        key: graph.method(method).override_key(),
        root: ty,
        found: IndexSet::new(),
        memo: FxHashMap::default(),
        sink,
    };
    walk.collect(ty);
    walk.found
}

struct OverrideWalk<'a> {
    graph: &'a SymbolGraph,
    key: String,
    root: TypeId,
    found: IndexSet<MethodId>,
    /// Declaring type found below each visited type. Entered as `None`
    /// before recursing, which also stops a malformed super-type cycle.
    memo: FxHashMap<TypeId, Option<TypeId>>,
    sink: &'a mut dyn DiagnosticSink,
}

impl OverrideWalk<'_> {
    fn collect(&mut self, ty: TypeId) -> Option<TypeId> {
        if let Some(&known) = self.memo.get(&ty) {
            return known;
        }
        self.memo.insert(ty, None);

        let graph = self.graph;
        let sym = graph.type_symbol(ty);
        let mut origin = None;

        // All matches count: a bridge method and its target share the key.
        for &m in &sym.methods {
            let candidate = graph.method(m);
            if candidate.is_virtual && candidate.override_key() == self.key {
                origin = Some(ty);
                self.found.insert(m);
            }
        }

        for parent_ref in sym.super_type.iter().chain(&sym.interfaces) {
            let Some(parent) = graph.resolve(parent_ref) else {
                continue;
            };
            let Some(inherited) = self.collect(parent) else {
                continue;
            };
            match origin {
                Some(first) if first != ty => {
                    if inherited != first {
                        self.report_diamond(first, inherited);
                    }
                }
                _ => origin = Some(inherited),
            }
        }

        self.memo.insert(ty, origin);
        origin
    }

    fn report_diamond(&mut self, first: TypeId, second: TypeId) {
        let graph = self.graph;
        let first = graph.type_symbol(first).full_name();
        let second = graph.type_symbol(second).full_name();
        let root = graph.type_symbol(self.root).full_name();
        tracing::warn!(
            signature = %self.key,
            first,
            second,
            root,
            "multiple overriding methods"
        );
        self.sink.report(diamond_override(&self.key, first, second, root));
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// A set of methods overriding one another, in first-discovery order.
#[derive(Clone, Debug, Default)]
pub struct OverrideGroup {
    members: IndexSet<MethodId>,
}

impl OverrideGroup {
    pub fn members(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.members.iter().copied()
    }

    pub fn contains(&self, method: MethodId) -> bool {
        self.members.contains(&method)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Disjoint sets of methods keyed by method id.
///
/// Groups live in an arena and methods point at their group by index. When
/// a discovery joins existing groups, all of them are emptied into the first
/// one it touched and left behind as empty slots.
#[derive(Clone, Debug, Default)]
pub struct OverrideGroups {
    groups: Vec<OverrideGroup>,
    group_of: FxHashMap<MethodId, GroupId>,
}

impl OverrideGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// The group a method belongs to, if any.
    pub fn group_of(&self, method: MethodId) -> Option<GroupId> {
        self.group_of.get(&method).copied()
    }

    pub fn group(&self, id: GroupId) -> &OverrideGroup {
        &self.groups[id.as_usize()]
    }

    /// Live groups in creation order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &OverrideGroup)> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_empty())
            .map(|(idx, g)| (GroupId::from_usize(idx), g))
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.groups().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.group_of.clear();
    }

    /// Union a freshly discovered set into the groups.
    ///
    /// Sets of fewer than two methods carry no linkage and are ignored.
    /// Every existing group touched by the set is merged into the first one
    /// found (in the set's order); a new group is created when none is.
    pub fn merge(&mut self, discovered: &IndexSet<MethodId>) -> Option<GroupId> {
        if discovered.len() < 2 {
            return None;
        }

        let mut touched: Vec<GroupId> = Vec::new();
        for method in discovered {
            if let Some(group) = self.group_of(*method) {
                if !touched.contains(&group) {
                    touched.push(group);
                }
            }
        }

        let target = match touched.first() {
            Some(&group) => group,
            None => {
                let group = GroupId::from_usize(self.groups.len());
                self.groups.push(OverrideGroup::default());
                group
            }
        };

        for &other in touched.iter().skip(1) {
            let absorbed = std::mem::take(&mut self.groups[other.as_usize()].members);
            for method in absorbed {
                self.group_of.insert(method, target);
                self.groups[target.as_usize()].members.insert(method);
            }
        }

        for &method in discovered {
            if !self.group_of.contains_key(&method) {
                self.group_of.insert(method, target);
                self.groups[target.as_usize()].members.insert(method);
            }
        }

        Some(target)
    }

    /// Give every member of each group the same alias.
    ///
    /// The alias comes from the first member that was renamed with a
    /// synthesized (non-preset) alias; failing that, from the first member
    /// whose alias came from a preset; failing that, from the first member.
    /// If some member's owner already declares that name for an unrelated
    /// method, a fresh name from `registry` is used instead. `aliases` is
    /// kept in step with the graph.
    pub fn unify_aliases(
        &self,
        graph: &mut SymbolGraph,
        aliases: &mut IndexMap<MethodId, SmolStr>,
        scopes: &mut NameScopes,
        registry: &mut AliasRegistry,
    ) -> usize {
        let mut changed = 0;
        for (_, group) in self.groups() {
            let Some(chosen) = chosen_alias(graph, group) else {
                continue;
            };
            let chosen = scopes.fit_group(graph, group, chosen, registry);
            for method in group.members() {
                if graph.method(method).alias() != Some(chosen.as_str()) {
                    graph.set_method_alias(method, chosen.clone());
                    changed += 1;
                }
                aliases.insert(method, chosen.clone());
            }
        }
        changed
    }
}

fn chosen_alias(graph: &SymbolGraph, group: &OverrideGroup) -> Option<SmolStr> {
    let methods = || group.members().map(|m| graph.method(m));

    methods()
        .find(|m| m.is_renamed() && !m.is_alias_from_preset())
        .or_else(|| methods().find(|m| m.is_alias_from_preset() && m.alias.is_some()))
        .or_else(|| methods().next())
        .and_then(|m| m.alias.clone())
}
