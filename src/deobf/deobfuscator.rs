//! The rename orchestrator.
//!
//! A run has three passes over the symbol graph:
//!
//! 1. **Discovery** - decide package, type, field and method aliases
//!    (presets first, then the should-rename policy) and collect override
//!    groups.
//! 2. **Application** - compose each type's new full name and bind field
//!    and method aliases onto the graph.
//! 3. **Post-process** - give every override group a single alias.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::config::DeobfConfig;
use super::diagnostics::{self, Diagnostic, DiagnosticCollector, DiagnosticSink};
use super::error::DeobfResult;
use super::overrides::{OverrideGroups, resolve_overriding};
use super::packages::PackageTree;
use super::presets::{AliasPresets, PresetStore};
use super::registry::AliasRegistry;
use super::scopes::{NameScopes, TypeScope};
use crate::base::{
    FieldId, IdentifierClassifier, JavaIdentifiers, MethodId, PackageId, TypeId, contains_digit,
};
use crate::graph::{NESTED_SEPARATOR, PACKAGE_SEPARATOR, SymbolGraph};

/// Source file extensions stripped when deriving a type alias from a hint.
const SOURCE_EXTENSIONS: &[&str] = &[".java", ".kt"];

/// The alias decided for one type.
#[derive(Clone, Debug)]
pub struct ClassAlias {
    package: PackageId,
    alias: SmolStr,
    /// Filled once discovery is complete.
    name_without_package: Option<SmolStr>,
    full_name: Option<SmolStr>,
}

impl ClassAlias {
    fn new(package: PackageId, alias: SmolStr) -> Self {
        Self {
            package,
            alias,
            name_without_package: None,
            full_name: None,
        }
    }

    pub fn package(&self) -> PackageId {
        self.package
    }

    /// The short alias (no package, no enclosing types).
    pub fn alias(&self) -> &str {
        &self.alias
    }
}

/// Counts and findings of one run.
#[derive(Clone, Debug, Default)]
pub struct RenameReport {
    pub types_renamed: usize,
    pub fields_renamed: usize,
    pub methods_renamed: usize,
    /// Live override groups at the end of discovery.
    pub override_groups: usize,
    /// Methods whose alias changed during group unification.
    pub methods_unified: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-run rename context.
///
/// Owns every table a run needs; nothing is global. Build one per
/// decompilation job, or [`reset`](Self::reset) it between runs.
pub struct Deobfuscator {
    config: DeobfConfig,
    classifier: Box<dyn IdentifierClassifier>,
    registry: AliasRegistry,
    packages: PackageTree,
    cls_map: IndexMap<TypeId, ClassAlias>,
    fld_map: IndexMap<FieldId, SmolStr>,
    mth_map: IndexMap<MethodId, SmolStr>,
    /// Type, field and method presets; package presets go straight into the tree.
    presets: AliasPresets,
    /// Names taken per scope; every drawn alias avoids these.
    scopes: NameScopes,
    overrides: OverrideGroups,
    diagnostics: DiagnosticCollector,
    discovered: bool,
}

impl Deobfuscator {
    /// Create a context using the Java identifier rules.
    pub fn new(config: DeobfConfig) -> Self {
        Self::with_classifier(config, JavaIdentifiers)
    }

    pub fn with_classifier(config: DeobfConfig, classifier: impl IdentifierClassifier + 'static) -> Self {
        Self {
            config,
            classifier: Box::new(classifier),
            registry: AliasRegistry::new(),
            packages: PackageTree::new(),
            cls_map: IndexMap::new(),
            fld_map: IndexMap::new(),
            mth_map: IndexMap::new(),
            presets: AliasPresets::new(),
            scopes: NameScopes::new(),
            overrides: OverrideGroups::new(),
            diagnostics: DiagnosticCollector::new(),
            discovered: false,
        }
    }

    pub fn config(&self) -> &DeobfConfig {
        &self.config
    }

    /// Drop all run state: counter, package tree, alias tables, presets,
    /// taken names, override groups and diagnostics.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.packages.clear();
        self.cls_map.clear();
        self.fld_map.clear();
        self.mth_map.clear();
        self.presets.clear();
        self.scopes.clear();
        self.overrides.clear();
        self.diagnostics.clear();
        self.discovered = false;
    }

    // ========================================================================
    // RUN
    // ========================================================================

    /// Full pipeline: load presets (unless regenerating), rename, save.
    ///
    /// A load failure is returned before anything is touched; the context
    /// can then still [`process`](Self::process) with no presets. A save
    /// failure is returned after the graph has been renamed.
    pub fn execute(&mut self, graph: &mut SymbolGraph, store: &mut dyn PresetStore) -> DeobfResult<RenameReport> {
        self.reset();
        if !self.config.force_regenerate {
            let presets = store.load()?;
            self.load_presets(presets);
        }

        let mut report = self.process(graph);

        let export = self.export_presets(graph);
        if !store.save(&export, self.config.force_regenerate)? {
            report
                .diagnostics
                .push(diagnostics::preset_not_overwritten(export.len()));
        }
        store.clear();
        self.presets.clear();
        Ok(report)
    }

    /// Install presets for the next [`process`](Self::process).
    pub fn load_presets(&mut self, mut presets: AliasPresets) {
        for (path, alias) in std::mem::take(&mut presets.packages) {
            let pkg = self.packages.get_or_create(&path);
            let alias = self.usable_or(&path, alias, |this| this.packages.fresh_segment(pkg, &mut this.registry));
            self.packages.assign_alias(pkg, alias);
        }
        self.presets = presets;
    }

    /// Run discovery, application and post-processing over `graph`.
    ///
    /// Aliases left on the graph by an earlier run are cleared first.
    pub fn process(&mut self, graph: &mut SymbolGraph) -> RenameReport {
        graph.clear_aliases();
        self.discover(graph);

        let mut report = self.apply(graph);
        report.override_groups = self.overrides.len();
        report.methods_unified =
            self.overrides
                .unify_aliases(graph, &mut self.mth_map, &mut self.scopes, &mut self.registry);
        report.diagnostics = self.diagnostics.take();

        tracing::debug!(
            types = report.types_renamed,
            fields = report.fields_renamed,
            methods = report.methods_renamed,
            groups = report.override_groups,
            unified = report.methods_unified,
            "rename run finished"
        );
        report
    }

    // ========================================================================
    // DISCOVERY
    // ========================================================================

    fn discover(&mut self, graph: &mut SymbolGraph) {
        // Every declared name and package segment is known before the first
        // alias is drawn.
        self.scopes.seed(graph);
        for ty in graph.type_ids() {
            self.packages.get_or_create(&graph.type_symbol(ty).package);
        }

        for ty in graph.type_ids() {
            self.discover_type(graph, ty);

            let fields = graph.type_symbol(ty).fields.clone();
            for field in fields {
                self.decide_field(graph, field);
            }

            let methods = graph.type_symbol(ty).methods.clone();
            for method in methods {
                self.decide_method(graph, method);
                if graph.method(method).is_virtual {
                    let found = resolve_overriding(graph, ty, method, &mut self.diagnostics);
                    self.overrides.merge(&found);
                }
            }
        }
        self.discovered = true;
    }

    fn discover_type(&mut self, graph: &mut SymbolGraph, ty: TypeId) {
        let sym = graph.type_symbol(ty);
        let pkg = self.packages.get_or_create(&sym.package);
        let (config, classifier) = (&self.config, &*self.classifier);
        self.packages
            .decide_and_assign(pkg, &|name: &str| should_rename(config, classifier, name), &mut self.registry);

        let scope = TypeScope::of(graph, ty);
        if let Some(preset) = self.presets.types.get(sym.full_name()).cloned() {
            let identity = sym.full_name().to_owned();
            let alias = self.usable_or(&identity, preset, |this| {
                this.scopes.draw_type(scope.clone(), &mut this.registry)
            });
            self.scopes.claim_type(scope, alias.clone());
            self.cls_map.insert(ty, ClassAlias::new(pkg, alias));
            return;
        }
        if self.cls_map.contains_key(&ty) {
            return;
        }
        if self.should_rename(&sym.short_name) {
            let alias = self.make_type_alias(graph, ty, scope);
            tracing::trace!(ty = graph.type_symbol(ty).full_name(), %alias, "type alias");
            self.cls_map.insert(ty, ClassAlias::new(pkg, alias));
        }
    }

    fn make_type_alias(&mut self, graph: &mut SymbolGraph, ty: TypeId, scope: TypeScope) -> SmolStr {
        if self.config.use_source_name_as_alias {
            if let Some(alias) = self.alias_from_source_file(graph, ty, &scope) {
                self.scopes.claim_type(scope, alias.clone());
                return alias;
            }
        }
        self.scopes.draw_type(scope, &mut self.registry)
    }

    /// Use the recorded source file name as alias when it is a good name
    /// that no other top-level type in the package already has. The hint is
    /// consumed only when used.
    fn alias_from_source_file(&mut self, graph: &mut SymbolGraph, ty: TypeId, scope: &TypeScope) -> Option<SmolStr> {
        let sym = graph.type_symbol(ty);
        if sym.is_nested() {
            return None;
        }
        let file = sym.source_file.as_deref()?;
        let stem = SOURCE_EXTENSIONS
            .iter()
            .find_map(|ext| file.strip_suffix(ext))
            .unwrap_or(file);

        if !self.classifier.is_valid_identifier(stem)
            || self.classifier.is_reserved(stem)
            || self.should_rename(stem)
            || contains_digit(stem)
            || !self.scopes.is_type_free(scope, stem)
        {
            return None;
        }

        let alias = SmolStr::new(stem);
        graph.take_source_file(ty);
        Some(alias)
    }

    fn decide_field(&mut self, graph: &SymbolGraph, field: FieldId) -> Option<SmolStr> {
        if let Some(alias) = self.fld_map.get(&field) {
            return Some(alias.clone());
        }
        let identity = graph.field_identity(field);
        let owner = graph.field(field).owner;
        if let Some(preset) = self.presets.fields.get(identity.as_str()).cloned() {
            self.scopes.claim_field(owner, preset.clone());
            self.fld_map.insert(field, preset.clone());
            return Some(preset);
        }
        if self.should_rename(&graph.field(field).name) {
            let alias = self.scopes.draw_field(owner, &mut self.registry);
            self.fld_map.insert(field, alias.clone());
            return Some(alias);
        }
        None
    }

    fn decide_method(&mut self, graph: &mut SymbolGraph, method: MethodId) -> Option<SmolStr> {
        if let Some(alias) = self.mth_map.get(&method) {
            return Some(alias.clone());
        }
        let identity = graph.method_identity(method);
        if let Some(preset) = self.presets.methods.get(identity.as_str()).cloned() {
            self.scopes.claim_method(graph, method, &preset);
            self.mth_map.insert(method, preset.clone());
            graph.mark_method_preset(method, true);
            return Some(preset);
        }
        if self.should_rename(&graph.method(method).name) {
            let alias = self.scopes.draw_method(graph, method, &mut self.registry);
            self.mth_map.insert(method, alias.clone());
            return Some(alias);
        }
        None
    }

    // ========================================================================
    // APPLICATION
    // ========================================================================

    fn apply(&mut self, graph: &mut SymbolGraph) -> RenameReport {
        let mut report = RenameReport::default();

        for ty in graph.type_ids() {
            let full_name = self.class_full_name(graph, ty);
            let sym = graph.type_symbol(ty);
            if full_name != sym.full_name() && !contains_digit(&full_name) {
                graph.rename_type(ty, full_name);
                report.types_renamed += 1;
            }

            let fields = graph.type_symbol(ty).fields.clone();
            for field in fields {
                let Some(alias) = self.fld_map.get(&field).filter(|a| !a.is_empty()).cloned() else {
                    continue;
                };
                let alias = self.usable_or(&graph.field_identity(field), alias, |this| {
                    this.scopes.draw_field(ty, &mut this.registry)
                });
                self.fld_map.insert(field, alias.clone());
                graph.set_field_alias(field, alias);
                report.fields_renamed += 1;
            }

            let methods = graph.type_symbol(ty).methods.clone();
            for method in methods {
                let Some(alias) = self.mth_map.get(&method).filter(|a| !a.is_empty()).cloned() else {
                    continue;
                };
                let usable = self.usable_or(&graph.method_identity(method), alias.clone(), |this| {
                    this.scopes.draw_method(&*graph, method, &mut this.registry)
                });
                if usable != alias {
                    graph.mark_method_preset(method, false);
                }
                self.mth_map.insert(method, usable.clone());
                graph.set_method_alias(method, usable);
                report.methods_renamed += 1;
            }
        }

        report
    }

    /// `alias` if it can be emitted as-is, otherwise whatever `fresh` draws.
    fn usable_or(&mut self, identity: &str, alias: SmolStr, fresh: impl FnOnce(&mut Self) -> SmolStr) -> SmolStr {
        if is_usable_alias(&*self.classifier, &alias) {
            return alias;
        }
        let replacement = fresh(self);
        tracing::warn!(identity, %alias, %replacement, "unusable alias replaced");
        self.diagnostics
            .report(diagnostics::unusable_alias(identity, &alias, &replacement));
        replacement
    }

    // ========================================================================
    // NAME COMPOSITION
    // ========================================================================

    /// The full name a type is emitted under: package full alias, enclosing
    /// type chain and the type's own alias or original short name.
    pub fn class_full_name(&mut self, graph: &SymbolGraph, ty: TypeId) -> SmolStr {
        if let Some(cached) = self.cls_map.get(&ty).and_then(|rec| rec.full_name.clone()) {
            return cached;
        }

        let sym = graph.type_symbol(ty);
        let package = match self.cls_map.get(&ty) {
            Some(rec) => self.packages.full_alias(rec.package),
            None => match self.packages.lookup(&sym.package) {
                Some(pkg) => self.packages.full_alias(pkg),
                None => sym.package.clone(),
            },
        };
        let name = self.name_without_package(graph, ty);
        let full_name = if package.is_empty() {
            name
        } else {
            SmolStr::from(format!("{package}{PACKAGE_SEPARATOR}{name}"))
        };

        if self.discovered {
            if let Some(rec) = self.cls_map.get_mut(&ty) {
                rec.full_name = Some(full_name.clone());
            }
        }
        full_name
    }

    /// Enclosing type chain plus short name, each using its alias if decided.
    pub fn name_without_package(&mut self, graph: &SymbolGraph, ty: TypeId) -> SmolStr {
        if let Some(cached) = self.cls_map.get(&ty).and_then(|rec| rec.name_without_package.clone()) {
            return cached;
        }

        let sym = graph.type_symbol(ty);
        let own = match self.cls_map.get(&ty) {
            Some(rec) => rec.alias.clone(),
            None => sym.short_name.clone(),
        };
        let name = match sym.enclosing {
            Some(outer) => {
                let prefix = self.name_without_package(graph, outer);
                SmolStr::from(format!("{prefix}{NESTED_SEPARATOR}{own}"))
            }
            None => own,
        };

        if self.discovered {
            if let Some(rec) = self.cls_map.get_mut(&ty) {
                rec.name_without_package = Some(name.clone());
            }
        }
        name
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Whether a bare identifier needs a replacement.
    pub fn should_rename(&self, name: &str) -> bool {
        should_rename(&self.config, &*self.classifier, name)
    }

    /// The short alias decided for a type.
    pub fn type_alias(&self, ty: TypeId) -> Option<&str> {
        self.cls_map.get(&ty).map(ClassAlias::alias)
    }

    pub fn field_alias(&self, field: FieldId) -> Option<&str> {
        self.fld_map.get(&field).map(SmolStr::as_str)
    }

    pub fn method_alias(&self, method: MethodId) -> Option<&str> {
        self.mth_map.get(&method).map(SmolStr::as_str)
    }

    /// Full alias of a package path, or `None` if the path was never seen.
    pub fn package_alias(&self, path: &str) -> Option<SmolStr> {
        self.packages.lookup(path).map(|pkg| self.packages.full_alias(pkg))
    }

    pub fn packages(&self) -> &PackageTree {
        &self.packages
    }

    pub fn root_package(&self) -> PackageId {
        self.packages.root()
    }

    pub fn class_map(&self) -> &IndexMap<TypeId, ClassAlias> {
        &self.cls_map
    }

    pub fn field_map(&self) -> &IndexMap<FieldId, SmolStr> {
        &self.fld_map
    }

    pub fn method_map(&self) -> &IndexMap<MethodId, SmolStr> {
        &self.mth_map
    }

    pub fn override_groups(&self) -> &OverrideGroups {
        &self.overrides
    }

    /// Snapshot the run's decisions as presets keyed by symbol identity.
    pub fn export_presets(&self, graph: &SymbolGraph) -> AliasPresets {
        let mut presets = AliasPresets::new();
        for (path, alias) in self.packages.aliased() {
            presets.packages.insert(path, alias.into());
        }
        for (&ty, rec) in &self.cls_map {
            presets.types.insert(graph.type_symbol(ty).full_name().into(), rec.alias.clone());
        }
        for (&field, alias) in &self.fld_map {
            presets.fields.insert(graph.field_identity(field).into(), alias.clone());
        }
        for (&method, alias) in &self.mth_map {
            presets.methods.insert(graph.method_identity(method).into(), alias.clone());
        }
        presets
    }
}

fn should_rename(config: &DeobfConfig, classifier: &dyn IdentifierClassifier, name: &str) -> bool {
    let len = name.chars().count();
    len > config.max_length
        || len < config.min_length
        || classifier.is_reserved(name)
        || !classifier.is_all_printable(name)
        || classifier.looks_obfuscated(name)
}

fn is_usable_alias(classifier: &dyn IdentifierClassifier, alias: &str) -> bool {
    classifier.is_valid_identifier(alias)
        && !classifier.is_reserved(alias)
        && classifier.is_all_printable(alias)
        && !contains_digit(alias)
}
