//! Builtin symbol seed table.
//!
//! Signatures and documentation for the functions every Lang program can
//! use without importing. Built once behind a `OnceLock`; the symbol
//! table copies them into each file's global scope at construction.

use lang_symbol_types::{FunctionSignature, TypeInfo};
use std::sync::OnceLock;

static BUILTINS: OnceLock<Vec<(String, TypeInfo, String)>> = OnceLock::new();

/// `(name, type, documentation)` for every builtin.
pub fn builtin_symbols() -> &'static [(String, TypeInfo, String)] {
    BUILTINS.get_or_init(|| {
        let mut builtins = Vec::new();
        let mut add = |name: &str, signature: FunctionSignature, doc: &str| {
            builtins.push((name.to_string(), TypeInfo::function(signature), doc.to_string()));
        };

        add(
            "print",
            FunctionSignature::new(Vec::new(), TypeInfo::Void).variadic(),
            "Writes its arguments to the standard output, separated by tabs.",
        );
        add(
            "type",
            FunctionSignature::new(vec![("value".into(), TypeInfo::Any)], TypeInfo::String),
            "Returns the name of the dynamic type of `value`.",
        );
        add(
            "tostring",
            FunctionSignature::new(vec![("value".into(), TypeInfo::Any)], TypeInfo::String),
            "Converts `value` to its string representation.",
        );
        add(
            "tonumber",
            FunctionSignature {
                params: vec![("value".into(), TypeInfo::Any)],
                return_type: lang_symbol_types::ReturnType::Single(Box::new(
                    // union() cannot fail on two distinct members.
                    TypeInfo::union(vec![TypeInfo::Number, TypeInfo::Null])
                        .unwrap_or(TypeInfo::Number),
                )),
                is_variadic: false,
            },
            "Parses `value` as a number; returns null when it cannot.",
        );
        add(
            "ipairs",
            FunctionSignature::new(
                vec![("list_obj".into(), TypeInfo::list(TypeInfo::Any))],
                TypeInfo::Any,
            ),
            "Returns an iterator over the index/value pairs of a list.",
        );
        add(
            "pairs",
            FunctionSignature::new(
                vec![(
                    "map_obj".into(),
                    TypeInfo::Map(Box::new(TypeInfo::Any), Box::new(TypeInfo::Any)),
                )],
                TypeInfo::Any,
            ),
            "Returns an iterator over the key/value pairs of a map.",
        );
        add(
            "error",
            FunctionSignature::new(vec![("message".into(), TypeInfo::String)], TypeInfo::Void),
            "Raises a runtime error with the given message.",
        );
        add(
            "assert",
            FunctionSignature::new(vec![("condition".into(), TypeInfo::Bool)], TypeInfo::Void)
                .variadic(),
            "Raises a runtime error when `condition` is false; an optional second argument overrides the message.",
        );

        builtins
    })
}
