//! Package tree with per-segment aliases.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::registry::AliasRegistry;
use crate::base::PackageId;
use crate::graph::PACKAGE_SEPARATOR;

/// One package segment.
#[derive(Clone, Debug)]
pub struct PackageNode {
    name: SmolStr,
    parent: Option<PackageId>,
    children: IndexMap<SmolStr, PackageId>,
    alias: Option<SmolStr>,
    decided_at: Option<usize>,
}

impl PackageNode {
    fn new(name: SmolStr, parent: Option<PackageId>) -> Self {
        Self {
            name,
            parent,
            children: IndexMap::new(),
            alias: None,
            decided_at: None,
        }
    }

    /// The original segment name (empty for the root).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<PackageId> {
        self.parent
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn has_alias(&self) -> bool {
        self.alias.is_some()
    }

    /// Child segments in creation order.
    pub fn children(&self) -> impl Iterator<Item = (&str, PackageId)> {
        self.children.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Position of this node in the decision sequence, if it was decided.
    pub fn decided_at(&self) -> Option<usize> {
        self.decided_at
    }
}

/// A trie of package segments rooted at the unnamed package.
///
/// Nodes live in an arena; [`PackageId::ROOT`] is always present. The tree is
/// grown lazily as types are discovered and is discarded with the run.
#[derive(Clone, Debug)]
pub struct PackageTree {
    nodes: Vec<PackageNode>,
    /// Full original paths already run through `decide_and_assign`.
    processed: FxHashSet<SmolStr>,
    decision_order: Vec<PackageId>,
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![PackageNode::new(SmolStr::default(), None)],
            processed: FxHashSet::default(),
            decision_order: Vec::new(),
        }
    }

    pub fn root(&self) -> PackageId {
        PackageId::ROOT
    }

    pub fn node(&self, id: PackageId) -> &PackageNode {
        &self.nodes[id.as_usize()]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Walk `path` from the root, creating missing segments.
    pub fn get_or_create(&mut self, path: &str) -> PackageId {
        let mut current = PackageId::ROOT;
        for segment in segments(path) {
            current = match self.nodes[current.as_usize()].children.get(segment) {
                Some(&child) => child,
                None => {
                    let child = PackageId::from_usize(self.nodes.len());
                    self.nodes.push(PackageNode::new(segment.into(), Some(current)));
                    self.nodes[current.as_usize()].children.insert(segment.into(), child);
                    child
                }
            };
        }
        current
    }

    /// Walk `path` from the root without creating anything.
    pub fn lookup(&self, path: &str) -> Option<PackageId> {
        let mut current = PackageId::ROOT;
        for segment in segments(path) {
            current = *self.nodes[current.as_usize()].children.get(segment)?;
        }
        Some(current)
    }

    /// Set a node's alias directly (presets).
    pub fn assign_alias(&mut self, id: PackageId, alias: impl Into<SmolStr>) {
        self.nodes[id.as_usize()].alias = Some(alias.into());
    }

    /// Decide whether `id` needs an alias and assign one from `registry`.
    ///
    /// Every alias-less ancestor below the root is decided first, outermost
    /// first, so a package is never decided before its parent. Each full path
    /// is decided at most once per run.
    pub fn decide_and_assign(
        &mut self,
        id: PackageId,
        should_rename: &dyn Fn(&str) -> bool,
        registry: &mut AliasRegistry,
    ) {
        if id == PackageId::ROOT {
            return;
        }
        let full_name = self.full_name(id);
        if !self.processed.insert(full_name) {
            return;
        }

        let mut ancestors = Vec::new();
        let mut parent = self.nodes[id.as_usize()].parent;
        while let Some(p) = parent {
            if p == PackageId::ROOT {
                break;
            }
            ancestors.push(p);
            parent = self.nodes[p.as_usize()].parent;
        }
        for &ancestor in ancestors.iter().rev() {
            if !self.nodes[ancestor.as_usize()].has_alias() {
                self.decide_and_assign(ancestor, should_rename, registry);
            }
        }

        self.nodes[id.as_usize()].decided_at = Some(self.decision_order.len());
        self.decision_order.push(id);
        let node = &self.nodes[id.as_usize()];
        if node.alias.is_none() && should_rename(&node.name) {
            let alias = self.fresh_segment(id, registry);
            let node = &mut self.nodes[id.as_usize()];
            tracing::trace!(package = %node.name, %alias, "package alias");
            node.alias = Some(alias);
        }
    }

    /// A registry name that is neither `id`'s own segment nor a sibling's
    /// segment or alias.
    pub fn fresh_segment(&self, id: PackageId, registry: &mut AliasRegistry) -> SmolStr {
        let Some(parent) = self.nodes[id.as_usize()].parent else {
            return registry.next_name();
        };
        let siblings = &self.nodes[parent.as_usize()].children;
        registry.next_name_where(|name| {
            !siblings
                .iter()
                .any(|(segment, &sib)| segment == name || self.nodes[sib.as_usize()].alias() == Some(name))
        })
    }

    /// Nodes in the order `decide_and_assign` processed them.
    pub fn decision_order(&self) -> &[PackageId] {
        &self.decision_order
    }

    /// Original dotted path of a node.
    pub fn full_name(&self, id: PackageId) -> SmolStr {
        self.join_chain(id, |node| &node.name)
    }

    /// Dotted path using each segment's alias where one is set.
    pub fn full_alias(&self, id: PackageId) -> SmolStr {
        self.join_chain(id, |node| node.alias.as_ref().unwrap_or(&node.name))
    }

    fn join_chain(&self, id: PackageId, pick: impl Fn(&PackageNode) -> &SmolStr) -> SmolStr {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == PackageId::ROOT {
                break;
            }
            let node = &self.nodes[cur.as_usize()];
            chain.push(pick(node).as_str());
            current = node.parent;
        }
        chain.reverse();
        let sep = PACKAGE_SEPARATOR.to_string();
        SmolStr::from(chain.join(sep.as_str()))
    }

    /// `(original full path, segment alias)` for every aliased node, in
    /// creation order.
    pub fn aliased(&self) -> impl Iterator<Item = (SmolStr, &str)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(idx, node)| {
            node.alias()
                .map(|alias| (self.full_name(PackageId::from_usize(idx)), alias))
        })
    }

    /// Drop every node except an alias-less root.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(PACKAGE_SEPARATOR).filter(|s| !s.is_empty())
}
