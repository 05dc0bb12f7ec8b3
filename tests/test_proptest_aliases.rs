//! Property-based tests over generated symbol graphs.
//!
//! Graphs are random chains of types (each extending the previous one)
//! with random member names, so override groups, bad names and package
//! sharing all show up.
#![cfg(feature = "proptest")]

use std::collections::{BTreeSet, HashMap, HashSet};

use proptest::prelude::*;
use unobf::base::{IdentifierClassifier, JavaIdentifiers, contains_digit};
use unobf::deobf::AliasRegistry;
use unobf::{AliasPresets, DeobfConfig, Deobfuscator, MemoryPresets, SymbolGraph, TypeDecl, TypeId};

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Member and type names, good and bad.
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]",
        "[A-Z][a-zA-Z]{2,12}",
        "[lI1]{2,5}",
        "[0-9][a-z]{0,3}",
        Just("do".to_string()),
        Just("class".to_string()),
    ]
}

fn arb_package() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(|segs| segs.join("."))
}

#[derive(Debug, Clone)]
struct TypeSpec {
    package: String,
    name: String,
    methods: Vec<String>,
    fields: Vec<String>,
}

fn arb_type() -> impl Strategy<Value = TypeSpec> {
    (
        arb_package(),
        arb_name(),
        prop::collection::vec(arb_name(), 0..4),
        prop::collection::vec(arb_name(), 0..3),
    )
        .prop_map(|(package, name, methods, fields)| TypeSpec {
            package,
            name,
            methods,
            fields,
        })
}

fn build(specs: &[TypeSpec]) -> SymbolGraph {
    let mut graph = SymbolGraph::new();
    let mut previous: Option<String> = None;
    for (idx, spec) in specs.iter().enumerate() {
        // Suffix keeps full names distinct without touching the short name.
        let package = format!("{}.q{}", spec.package, char::from(b'a' + idx as u8));
        let full = format!("{package}.{}", spec.name);
        let mut decl = TypeDecl::new(&full);
        if let Some(parent) = &previous {
            decl = decl.extends(parent.as_str());
        }
        let ty = graph.add_type(decl);
        // Members are keyed by identity, so a type declares each name once.
        for method in spec.methods.iter().collect::<BTreeSet<_>>() {
            graph.add_method(ty, method, &[], "V", true);
        }
        for field in spec.fields.iter().collect::<BTreeSet<_>>() {
            graph.add_field(ty, field, "I");
        }
        previous = Some(full);
    }
    graph
}

fn aliases(graph: &SymbolGraph) -> Vec<Option<String>> {
    graph
        .method_ids()
        .map(|m| graph.method(m).alias().map(str::to_owned))
        .chain(graph.field_ids().map(|f| graph.field(f).alias().map(str::to_owned)))
        .chain(graph.type_ids().map(|t| graph.type_symbol(t).alias().map(str::to_owned)))
        .collect()
}

/// Whether every package, type and member scope holds each final name once.
fn scopes_are_distinct(graph: &SymbolGraph) -> bool {
    let mut types: HashMap<(String, Option<TypeId>), HashSet<String>> = HashMap::new();
    for ty in graph.type_ids() {
        let sym = graph.type_symbol(ty);
        let short = sym.display_name().rsplit(['.', '$']).next().unwrap_or_default();
        if !types.entry((sym.package.to_string(), sym.enclosing)).or_default().insert(short.to_owned()) {
            return false;
        }

        let mut fields = HashSet::new();
        for &f in &sym.fields {
            let field = graph.field(f);
            if !fields.insert(field.alias().unwrap_or(&field.name).to_owned()) {
                return false;
            }
        }
        let mut methods = HashSet::new();
        for &m in &sym.methods {
            let method = graph.method(m);
            if !methods.insert(method.override_key_as(method.alias().unwrap_or(&method.name))) {
                return false;
            }
        }
    }
    true
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn registry_names_are_fresh_identifiers(count in 1usize..3000) {
        let java = JavaIdentifiers::new();
        let mut registry = AliasRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..count {
            let name = registry.next_name();
            prop_assert!(java.is_valid_identifier(&name));
            prop_assert!(!contains_digit(&name));
            prop_assert!(seen.insert(name));
        }
    }

    #[test]
    fn member_aliases_are_usable(specs in prop::collection::vec(arb_type(), 1..8)) {
        let mut graph = build(&specs);
        let mut deobf = Deobfuscator::new(DeobfConfig::new());
        deobf.process(&mut graph);

        let java = JavaIdentifiers::new();
        for m in graph.method_ids() {
            if let Some(alias) = graph.method(m).alias() {
                prop_assert!(java.is_valid_identifier(alias), "{alias}");
                prop_assert!(!contains_digit(alias), "{alias}");
            }
        }
        for f in graph.field_ids() {
            if let Some(alias) = graph.field(f).alias() {
                prop_assert!(java.is_valid_identifier(alias), "{alias}");
                prop_assert!(!contains_digit(alias), "{alias}");
            }
        }
    }

    #[test]
    fn no_scope_repeats_a_name(specs in prop::collection::vec(arb_type(), 1..8)) {
        let mut graph = build(&specs);
        let mut deobf = Deobfuscator::new(DeobfConfig::new());
        deobf.process(&mut graph);

        prop_assert!(scopes_are_distinct(&graph));
    }

    #[test]
    fn renamed_types_change_name(specs in prop::collection::vec(arb_type(), 1..8)) {
        let mut graph = build(&specs);
        let mut deobf = Deobfuscator::new(DeobfConfig::new().with_source_name_alias(false));
        deobf.process(&mut graph);

        for ty in graph.type_ids() {
            let sym = graph.type_symbol(ty);
            let Some(alias) = deobf.type_alias(ty).map(str::to_owned) else {
                continue;
            };
            prop_assert_ne!(alias.as_str(), sym.short_name.as_str());
            let composed = deobf.class_full_name(&graph, ty);
            prop_assert_ne!(composed.as_str(), sym.full_name());
            if !contains_digit(&composed) {
                prop_assert_eq!(sym.display_name(), composed.as_str());
            }
        }
    }

    #[test]
    fn override_groups_share_one_alias(specs in prop::collection::vec(arb_type(), 1..8)) {
        let mut graph = build(&specs);
        let mut deobf = Deobfuscator::new(DeobfConfig::new());
        deobf.process(&mut graph);

        for (_, group) in deobf.override_groups().groups() {
            let mut members = group.members();
            let first = members.next().map(|m| graph.method(m).alias());
            for m in members {
                prop_assert_eq!(Some(graph.method(m).alias()), first);
            }
        }
    }

    #[test]
    fn saved_presets_reproduce_aliases(specs in prop::collection::vec(arb_type(), 1..8)) {
        let mut store = MemoryPresets::new();
        let mut graph = build(&specs);
        Deobfuscator::new(DeobfConfig::new()).execute(&mut graph, &mut store).unwrap();
        let first = aliases(&graph);

        let mut rebuilt = build(&specs);
        let saved: AliasPresets = store.presets().clone();
        let mut again = Deobfuscator::new(DeobfConfig::new());
        again.execute(&mut rebuilt, &mut MemoryPresets::with_presets(saved)).unwrap();

        prop_assert_eq!(aliases(&rebuilt), first);
    }
}
