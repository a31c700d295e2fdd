//! The `TypeInfo` sum type and its validating constructors.

use crate::ScopeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction errors for composite types. These are values the
/// analyzer turns into diagnostics; nothing here panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("a union needs at least one member")]
    EmptyUnion,
    #[error("a tuple needs between 2 and 16 elements, got {0}")]
    TupleArity(usize),
    #[error("tuple elements cannot have type null")]
    NullTupleElement,
    #[error("map keys cannot have type null")]
    NullMapKey,
}

/// Reference to a user-defined class type.
///
/// Classes compare nominally: two `ClassRef`s are equal when their names
/// are, regardless of which scope arena slot holds their members. The
/// scope id lets member lookup reach the class scope without a reference
/// cycle between types and scopes.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    /// Class name, the identity of the type
    pub name: String,
    /// The class member scope in the owning symbol table
    pub scope: ScopeId,
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Reference to an imported module bound by `import * as X`.
///
/// The scope holds the importing file's copies of the target module's
/// exported symbols, so member lookup and completion on the alias work
/// without reaching into another file's tables.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    /// The local alias name
    pub name: String,
    /// Scope holding the re-bound exported symbols
    pub scope: ScopeId,
}

impl PartialEq for ModuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// What a function returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReturnType {
    /// One value (possibly `void`)
    Single(Box<TypeInfo>),
    /// The multi-return marker: materializes as a `Tuple` at call sites
    /// consumed by a matching arity context
    Multi(Vec<TypeInfo>),
}

/// A function's type: parameters, return, variadic marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Parameter names and types. Names are carried for signature help
    /// but ignored by equality.
    pub params: Vec<(String, TypeInfo)>,
    /// Return type
    pub return_type: ReturnType,
    /// Whether the last parameter position accepts any number of values
    pub is_variadic: bool,
}

impl FunctionSignature {
    /// A signature with a single return value.
    pub fn new(params: Vec<(String, TypeInfo)>, return_type: TypeInfo) -> Self {
        FunctionSignature { params, return_type: ReturnType::Single(Box::new(return_type)), is_variadic: false }
    }

    /// Mark the signature variadic.
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    /// The single return type, or `None` for multi-return signatures.
    pub fn single_return(&self) -> Option<&TypeInfo> {
        match &self.return_type {
            ReturnType::Single(ty) => Some(ty),
            ReturnType::Multi(_) => None,
        }
    }
}

impl PartialEq for FunctionSignature {
    fn eq(&self, other: &Self) -> bool {
        if self.is_variadic != other.is_variadic || self.params.len() != other.params.len() {
            return false;
        }
        let params_match =
            self.params.iter().zip(&other.params).all(|((_, a), (_, b))| a == b);
        let returns_match = match (&self.return_type, &other.return_type) {
            (ReturnType::Single(a), ReturnType::Single(b)) => a == b,
            (ReturnType::Multi(a), ReturnType::Multi(b)) => a == b,
            _ => false,
        };
        params_match && returns_match
    }
}

/// Every type an expression or symbol can have.
///
/// Equality is structural for every variant except `Class`, which is
/// nominal by name. `Union` values are canonical by construction: use
/// [`TypeInfo::union`] rather than building the variant directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeInfo {
    /// Not yet known, or unresolvable; absorbs errors without cascading
    Unknown,
    /// The gradual-typing escape hatch
    Any,
    Void,
    Null,
    Int,
    Float,
    /// `int | float` as a primitive
    Number,
    Bool,
    String,
    /// The bare `function` type keyword (any function)
    FunctionKeyword,
    /// The bare `coroutine` type keyword
    CoroutineKeyword,
    List(Box<TypeInfo>),
    Map(Box<TypeInfo>, Box<TypeInfo>),
    Tuple(Vec<TypeInfo>),
    Union(Vec<TypeInfo>),
    Function(Box<FunctionSignature>),
    Class(ClassRef),
    /// An imported module alias; not a value type, but expressions like
    /// `X.helper` flow through it
    Module(ModuleRef),
}

impl TypeInfo {
    /// `list<elem>`.
    pub fn list(elem: TypeInfo) -> TypeInfo {
        TypeInfo::List(Box::new(elem))
    }

    /// `map<key, value>`. Null keys are rejected.
    pub fn map(key: TypeInfo, value: TypeInfo) -> Result<TypeInfo, TypeError> {
        if key == TypeInfo::Null {
            return Err(TypeError::NullMapKey);
        }
        Ok(TypeInfo::Map(Box::new(key), Box::new(value)))
    }

    /// A function type.
    pub fn function(signature: FunctionSignature) -> TypeInfo {
        TypeInfo::Function(Box::new(signature))
    }

    /// Canonical union construction: flattens nested unions, removes
    /// duplicates, sorts members, and collapses singletons. The result
    /// is order-independent: `union([a, b]) == union([b, a])`.
    pub fn union(members: Vec<TypeInfo>) -> Result<TypeInfo, TypeError> {
        let mut flat = Vec::new();
        for member in members {
            match member {
                TypeInfo::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat.sort_by(|a, b| a.canonical_key().cmp(&b.canonical_key()));
        flat.dedup_by(|a, b| a == b);
        match flat.len() {
            0 => Err(TypeError::EmptyUnion),
            1 => Ok(flat.remove(0)),
            _ => Ok(TypeInfo::Union(flat)),
        }
    }

    /// Validated tuple construction: 2..=16 elements, none `null`-typed.
    pub fn tuple(elements: Vec<TypeInfo>) -> Result<TypeInfo, TypeError> {
        if !(2..=16).contains(&elements.len()) {
            return Err(TypeError::TupleArity(elements.len()));
        }
        if elements.iter().any(|e| *e == TypeInfo::Null) {
            return Err(TypeError::NullTupleElement);
        }
        Ok(TypeInfo::Tuple(elements))
    }

    /// Whether this is a `Union` that includes `null`.
    pub fn union_contains_null(&self) -> bool {
        matches!(self, TypeInfo::Union(members) if members.contains(&TypeInfo::Null))
    }

    /// Sort key that makes union member order canonical. The rendered
    /// type string is injective over this type algebra (class names are
    /// assumed unique per workspace).
    pub fn canonical_key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeInfo::Unknown => write!(f, "unknown"),
            TypeInfo::Any => write!(f, "any"),
            TypeInfo::Void => write!(f, "void"),
            TypeInfo::Null => write!(f, "null"),
            TypeInfo::Int => write!(f, "int"),
            TypeInfo::Float => write!(f, "float"),
            TypeInfo::Number => write!(f, "number"),
            TypeInfo::Bool => write!(f, "bool"),
            TypeInfo::String => write!(f, "string"),
            TypeInfo::FunctionKeyword => write!(f, "function"),
            TypeInfo::CoroutineKeyword => write!(f, "coroutine"),
            TypeInfo::List(elem) => write!(f, "list<{elem}>"),
            TypeInfo::Map(key, value) => write!(f, "map<{key}, {value}>"),
            TypeInfo::Tuple(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            TypeInfo::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TypeInfo::Function(signature) => {
                write!(f, "function(")?;
                for (i, (name, ty)) in signature.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if name.is_empty() {
                        write!(f, "{ty}")?;
                    } else {
                        write!(f, "{name}: {ty}")?;
                    }
                }
                if signature.is_variadic {
                    if !signature.params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ")")?;
                match &signature.return_type {
                    ReturnType::Single(ty) => write!(f, ": {ty}"),
                    ReturnType::Multi(types) => {
                        write!(f, ": (")?;
                        for (i, ty) in types.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{ty}")?;
                        }
                        write!(f, ")")
                    }
                }
            }
            TypeInfo::Class(class) => write!(f, "{}", class.name),
            TypeInfo::Module(module) => write!(f, "module {}", module.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> TypeInfo {
        TypeInfo::Class(ClassRef { name: name.to_string(), scope: ScopeId(0) })
    }

    #[test]
    fn union_is_order_independent() {
        let a = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::String]).unwrap();
        let b = TypeInfo::union(vec![TypeInfo::String, TypeInfo::Int]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn union_deduplicates() {
        let a = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::Int, TypeInfo::Bool]).unwrap();
        let b = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::Bool]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn union_collapses_singleton() {
        assert_eq!(TypeInfo::union(vec![TypeInfo::Int, TypeInfo::Int]).unwrap(), TypeInfo::Int);
        assert_eq!(TypeInfo::union(vec![]).unwrap_err(), TypeError::EmptyUnion);
    }

    #[test]
    fn union_flattens_nested() {
        let inner = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::Null]).unwrap();
        let outer = TypeInfo::union(vec![inner, TypeInfo::String]).unwrap();
        match &outer {
            TypeInfo::Union(members) => assert_eq!(members.len(), 3),
            other => panic!("expected union, got {other}"),
        }
    }

    #[test]
    fn tuple_validates_arity() {
        assert_eq!(TypeInfo::tuple(vec![TypeInfo::Int]).unwrap_err(), TypeError::TupleArity(1));
        assert!(TypeInfo::tuple(vec![TypeInfo::Int; 16]).is_ok());
        assert_eq!(
            TypeInfo::tuple(vec![TypeInfo::Int; 17]).unwrap_err(),
            TypeError::TupleArity(17)
        );
    }

    #[test]
    fn tuple_rejects_null_elements() {
        assert_eq!(
            TypeInfo::tuple(vec![TypeInfo::Int, TypeInfo::Null]).unwrap_err(),
            TypeError::NullTupleElement
        );
    }

    #[test]
    fn map_rejects_null_keys() {
        assert_eq!(
            TypeInfo::map(TypeInfo::Null, TypeInfo::Int).unwrap_err(),
            TypeError::NullMapKey
        );
        assert!(TypeInfo::map(TypeInfo::String, TypeInfo::Null).is_ok());
    }

    #[test]
    fn classes_compare_nominally() {
        let a = TypeInfo::Class(ClassRef { name: "P".to_string(), scope: ScopeId(1) });
        let b = TypeInfo::Class(ClassRef { name: "P".to_string(), scope: ScopeId(9) });
        assert_eq!(a, b);
        assert_ne!(a, class("Q"));
    }

    #[test]
    fn signatures_ignore_param_names() {
        let a = FunctionSignature::new(vec![("a".into(), TypeInfo::Int)], TypeInfo::Void);
        let b = FunctionSignature::new(vec![("x".into(), TypeInfo::Int)], TypeInfo::Void);
        assert_eq!(a, b);
    }

    #[test]
    fn display_renders_composites() {
        assert_eq!(TypeInfo::list(TypeInfo::Int).to_string(), "list<int>");
        assert_eq!(
            TypeInfo::map(TypeInfo::String, TypeInfo::list(TypeInfo::Int)).unwrap().to_string(),
            "map<string, list<int>>"
        );
        let u = TypeInfo::union(vec![TypeInfo::Null, TypeInfo::Int]).unwrap();
        assert_eq!(u.to_string(), "int | null");
    }
}
