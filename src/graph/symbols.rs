//! Declaration-level symbols of a decompiled program.

use smol_str::SmolStr;

use crate::base::{FieldId, MethodId, TypeId};

/// Separator between package segments and between package and type name.
pub const PACKAGE_SEPARATOR: char = '.';
/// Separator between an enclosing type and a nested type.
pub const NESTED_SEPARATOR: char = '$';

/// A reference to a type by its original fully-qualified name.
///
/// References are resolved against the [`SymbolGraph`](super::SymbolGraph);
/// types outside the analyzed set (framework classes, missing libraries)
/// simply fail to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef(pub SmolStr);

impl TypeRef {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A class or interface.
#[derive(Clone, Debug)]
pub struct TypeSymbol {
    /// Dotted package path, empty for the default package.
    pub package: SmolStr,
    /// Simple name without package or enclosing types.
    pub short_name: SmolStr,
    /// The enclosing type for nested types.
    pub enclosing: Option<TypeId>,
    pub super_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldId>,
    pub methods: Vec<MethodId>,
    /// Declaring source file recorded by the compiler, if any.
    pub source_file: Option<SmolStr>,
    /// Original fully-qualified name, the identity of this type.
    pub(crate) full_name: SmolStr,
    /// Renamed fully-qualified name.
    pub(crate) alias: Option<SmolStr>,
}

impl TypeSymbol {
    /// The original fully-qualified name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The renamed fully-qualified name, if this type was renamed.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name emitted for this type: alias if renamed, original otherwise.
    pub fn display_name(&self) -> &str {
        self.alias().unwrap_or(&self.full_name)
    }

    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }
}

/// A field declared on a type.
#[derive(Clone, Debug)]
pub struct FieldSymbol {
    pub owner: TypeId,
    pub name: SmolStr,
    /// Type descriptor, e.g. `I` or `Ljava/lang/String;`.
    pub descriptor: SmolStr,
    pub(crate) alias: Option<SmolStr>,
}

impl FieldSymbol {
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// A method declared on a type.
#[derive(Clone, Debug)]
pub struct MethodSymbol {
    pub owner: TypeId,
    pub name: SmolStr,
    /// Parameter type descriptors in declaration order.
    pub params: Vec<SmolStr>,
    pub return_type: SmolStr,
    /// Dispatched virtually (neither static, private nor a constructor).
    pub is_virtual: bool,
    pub(crate) alias: Option<SmolStr>,
    pub(crate) alias_from_preset: bool,
    pub(crate) renamed: bool,
}

impl MethodSymbol {
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether the current alias was taken from a preset.
    pub fn is_alias_from_preset(&self) -> bool {
        self.alias_from_preset
    }

    /// Whether the application pass bound an alias onto this method.
    pub fn is_renamed(&self) -> bool {
        self.renamed
    }

    /// The key two methods must share to override one another: name plus
    /// parameter descriptors. The return type does not take part.
    pub fn override_key(&self) -> String {
        self.override_key_as(&self.name)
    }

    /// The override key this method would have if it were called `name`.
    pub fn override_key_as(&self, name: &str) -> String {
        let mut key = String::with_capacity(name.len() + 2 + self.params.iter().map(|p| p.len()).sum::<usize>());
        key.push_str(name);
        key.push('(');
        for param in &self.params {
            key.push_str(param);
        }
        key.push(')');
        key
    }

    /// Descriptor suffix used in method identities: `(params)ret`.
    pub fn descriptor(&self) -> String {
        let mut desc = String::from("(");
        for param in &self.params {
            desc.push_str(param);
        }
        desc.push(')');
        desc.push_str(&self.return_type);
        desc
    }
}

/// Input describing a top-level type to add to the graph.
#[derive(Clone, Debug, Default)]
pub struct TypeDecl {
    pub package: SmolStr,
    pub short_name: SmolStr,
    pub super_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub source_file: Option<SmolStr>,
}

impl TypeDecl {
    /// Split a fully-qualified top-level name into package and short name.
    pub fn new(full_name: &str) -> Self {
        let (package, short_name) = match full_name.rfind(PACKAGE_SEPARATOR) {
            Some(idx) => (&full_name[..idx], &full_name[idx + 1..]),
            None => ("", full_name),
        };
        Self {
            package: package.into(),
            short_name: short_name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, super_type: impl Into<TypeRef>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn source_file(mut self, file: impl Into<SmolStr>) -> Self {
        self.source_file = Some(file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, params: &[&str], ret: &str) -> MethodSymbol {
        MethodSymbol {
            owner: TypeId::new(0),
            name: name.into(),
            params: params.iter().map(|p| SmolStr::new(p)).collect(),
            return_type: ret.into(),
            is_virtual: true,
            alias: None,
            alias_from_preset: false,
            renamed: false,
        }
    }

    #[test]
    fn test_override_key_ignores_return_type() {
        let a = method("run", &["I", "Ljava/lang/String;"], "V");
        let b = method("run", &["I", "Ljava/lang/String;"], "Ljava/lang/Object;");
        assert_eq!(a.override_key(), "run(ILjava/lang/String;)");
        assert_eq!(a.override_key(), b.override_key());
        assert_ne!(a.descriptor(), b.descriptor());
    }

    #[test]
    fn test_type_decl_split() {
        let decl = TypeDecl::new("com.example.Main");
        assert_eq!(decl.package, "com.example");
        assert_eq!(decl.short_name, "Main");

        let decl = TypeDecl::new("Main");
        assert_eq!(decl.package, "");
        assert_eq!(decl.short_name, "Main");
    }
}
