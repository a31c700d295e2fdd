//! Ordered assignability rules.

use crate::type_info::TypeInfo;

/// Verdict of an assignability check. `OkWithWarning` means the
/// assignment is allowed but the caller should attach a warning
/// diagnostic with the carried message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignability {
    Ok,
    OkWithWarning(String),
    No,
}

impl Assignability {
    /// Whether the assignment is allowed at all.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Assignability::No)
    }
}

/// Can a value of type `source` be assigned to a slot of type `target`?
///
/// Rules are applied in order; the top match wins:
///
/// 1. `target == any` ⇒ yes.
/// 2. `source == any` ⇒ yes with an "implicit narrowing" warning.
/// 3. Structural equality ⇒ yes.
/// 4. `source == null` ⇒ yes iff target is a list, map, class, or a
///    union containing `null` (the `any` target already matched rule 1).
/// 5. Numeric widening: `int → float`, `int|float → number`.
/// 6. Union target ⇒ yes iff some member accepts the source.
/// 7. Union source ⇒ yes iff every member is accepted by the target.
/// 8. `list<S> → list<T>` iff `S → T`; maps need both key and value.
/// 9. Tuple → list iff every element fits; tuple → tuple pairwise.
/// 10. Function → function only on structural equality (conservative).
/// 11. Any function signature → the bare `function` keyword type.
/// 12. Otherwise no.
pub fn is_assignable(source: &TypeInfo, target: &TypeInfo) -> Assignability {
    // Rule 1
    if *target == TypeInfo::Any {
        return Assignability::Ok;
    }
    // Rule 2
    if *source == TypeInfo::Any {
        return Assignability::OkWithWarning("implicit narrowing from any".to_string());
    }
    // Rule 3
    if source == target {
        return Assignability::Ok;
    }
    // Rule 4
    if *source == TypeInfo::Null {
        let ok = matches!(
            target,
            TypeInfo::List(_) | TypeInfo::Map(_, _) | TypeInfo::Class(_)
        ) || target.union_contains_null();
        return if ok { Assignability::Ok } else { Assignability::No };
    }
    // Rule 5
    match (source, target) {
        (TypeInfo::Int, TypeInfo::Float) => return Assignability::Ok,
        (TypeInfo::Int | TypeInfo::Float, TypeInfo::Number) => return Assignability::Ok,
        _ => {}
    }
    // Rule 6
    if let TypeInfo::Union(members) = target {
        let mut warning = None;
        for member in members {
            match is_assignable(source, member) {
                Assignability::Ok => return Assignability::Ok,
                Assignability::OkWithWarning(message) => warning = Some(message),
                Assignability::No => {}
            }
        }
        return match warning {
            Some(message) => Assignability::OkWithWarning(message),
            None => Assignability::No,
        };
    }
    // Rule 7
    if let TypeInfo::Union(members) = source {
        let mut warning = None;
        for member in members {
            match is_assignable(member, target) {
                Assignability::Ok => {}
                Assignability::OkWithWarning(message) => warning = Some(message),
                Assignability::No => return Assignability::No,
            }
        }
        return match warning {
            Some(message) => Assignability::OkWithWarning(message),
            None => Assignability::Ok,
        };
    }
    // Rule 8
    match (source, target) {
        (TypeInfo::List(src), TypeInfo::List(tgt)) => return is_assignable(src, tgt),
        (TypeInfo::Map(src_key, src_value), TypeInfo::Map(tgt_key, tgt_value)) => {
            return combine(is_assignable(src_key, tgt_key), is_assignable(src_value, tgt_value));
        }
        _ => {}
    }
    // Rule 9
    match (source, target) {
        (TypeInfo::Tuple(elements), TypeInfo::List(tgt)) => {
            let mut verdict = Assignability::Ok;
            for elem in elements {
                verdict = combine(verdict, is_assignable(elem, tgt));
                if verdict == Assignability::No {
                    return Assignability::No;
                }
            }
            return verdict;
        }
        (TypeInfo::Tuple(src), TypeInfo::Tuple(tgt)) => {
            if src.len() != tgt.len() {
                return Assignability::No;
            }
            let mut verdict = Assignability::Ok;
            for (s, t) in src.iter().zip(tgt) {
                verdict = combine(verdict, is_assignable(s, t));
                if verdict == Assignability::No {
                    return Assignability::No;
                }
            }
            return verdict;
        }
        _ => {}
    }
    // Rules 10 and 11
    match (source, target) {
        (TypeInfo::Function(src), TypeInfo::Function(tgt)) => {
            return if src == tgt { Assignability::Ok } else { Assignability::No };
        }
        (TypeInfo::Function(_), TypeInfo::FunctionKeyword) => return Assignability::Ok,
        _ => {}
    }
    // Rule 12
    Assignability::No
}

fn combine(a: Assignability, b: Assignability) -> Assignability {
    match (a, b) {
        (Assignability::No, _) | (_, Assignability::No) => Assignability::No,
        (Assignability::OkWithWarning(message), _) | (_, Assignability::OkWithWarning(message)) => {
            Assignability::OkWithWarning(message)
        }
        _ => Assignability::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_info::{ClassRef, FunctionSignature};
    use crate::ScopeId;
    use proptest::prelude::*;

    fn class(name: &str) -> TypeInfo {
        TypeInfo::Class(ClassRef { name: name.to_string(), scope: ScopeId(0) })
    }

    #[test]
    fn anything_assigns_to_any() {
        assert_eq!(is_assignable(&TypeInfo::Int, &TypeInfo::Any), Assignability::Ok);
        assert_eq!(is_assignable(&class("P"), &TypeInfo::Any), Assignability::Ok);
    }

    #[test]
    fn any_narrows_with_warning() {
        match is_assignable(&TypeInfo::Any, &TypeInfo::Int) {
            Assignability::OkWithWarning(message) => {
                assert!(message.contains("implicit narrowing"));
            }
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn null_into_containers_and_classes() {
        assert_eq!(is_assignable(&TypeInfo::Null, &TypeInfo::list(TypeInfo::Int)), Assignability::Ok);
        assert_eq!(
            is_assignable(&TypeInfo::Null, &TypeInfo::map(TypeInfo::String, TypeInfo::Int).unwrap()),
            Assignability::Ok
        );
        assert_eq!(is_assignable(&TypeInfo::Null, &class("P")), Assignability::Ok);
        assert_eq!(is_assignable(&TypeInfo::Null, &TypeInfo::Int), Assignability::No);
        let nullable = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::Null]).unwrap();
        assert_eq!(is_assignable(&TypeInfo::Null, &nullable), Assignability::Ok);
    }

    #[test]
    fn numeric_widening() {
        assert_eq!(is_assignable(&TypeInfo::Int, &TypeInfo::Float), Assignability::Ok);
        assert_eq!(is_assignable(&TypeInfo::Int, &TypeInfo::Number), Assignability::Ok);
        assert_eq!(is_assignable(&TypeInfo::Float, &TypeInfo::Number), Assignability::Ok);
        assert_eq!(is_assignable(&TypeInfo::Float, &TypeInfo::Int), Assignability::No);
    }

    #[test]
    fn union_target_accepts_any_member_match() {
        let target = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::String]).unwrap();
        assert_eq!(is_assignable(&TypeInfo::Int, &target), Assignability::Ok);
        assert_eq!(is_assignable(&TypeInfo::Bool, &target), Assignability::No);
    }

    #[test]
    fn union_source_requires_every_member() {
        let source = TypeInfo::union(vec![TypeInfo::Int, TypeInfo::Float]).unwrap();
        assert_eq!(is_assignable(&source, &TypeInfo::Number), Assignability::Ok);
        assert_eq!(is_assignable(&source, &TypeInfo::Float), Assignability::No);
    }

    #[test]
    fn covariant_lists_and_maps() {
        assert_eq!(
            is_assignable(&TypeInfo::list(TypeInfo::Int), &TypeInfo::list(TypeInfo::Float)),
            Assignability::Ok
        );
        assert_eq!(
            is_assignable(&TypeInfo::list(TypeInfo::Float), &TypeInfo::list(TypeInfo::Int)),
            Assignability::No
        );
    }

    #[test]
    fn tuples_into_lists() {
        let tuple = TypeInfo::tuple(vec![TypeInfo::Int, TypeInfo::Int]).unwrap();
        assert_eq!(is_assignable(&tuple, &TypeInfo::list(TypeInfo::Int)), Assignability::Ok);
        assert_eq!(is_assignable(&tuple, &TypeInfo::list(TypeInfo::String)), Assignability::No);
        let mixed = TypeInfo::tuple(vec![TypeInfo::Int, TypeInfo::String]).unwrap();
        assert_eq!(is_assignable(&mixed, &TypeInfo::list(TypeInfo::Any)), Assignability::Ok);
    }

    #[test]
    fn tuple_to_tuple_needs_matching_arity() {
        let two = TypeInfo::tuple(vec![TypeInfo::Int, TypeInfo::Int]).unwrap();
        let three = TypeInfo::tuple(vec![TypeInfo::Int, TypeInfo::Int, TypeInfo::Int]).unwrap();
        assert_eq!(is_assignable(&two, &three), Assignability::No);
        let wider = TypeInfo::tuple(vec![TypeInfo::Float, TypeInfo::Float]).unwrap();
        assert_eq!(is_assignable(&two, &wider), Assignability::Ok);
    }

    #[test]
    fn functions_are_conservative() {
        let a = TypeInfo::function(FunctionSignature::new(vec![], TypeInfo::Void));
        let b = TypeInfo::function(FunctionSignature::new(vec![], TypeInfo::Int));
        assert_eq!(is_assignable(&a, &a.clone()), Assignability::Ok);
        assert_eq!(is_assignable(&a, &b), Assignability::No);
        assert_eq!(is_assignable(&a, &TypeInfo::FunctionKeyword), Assignability::Ok);
    }

    #[test]
    fn string_not_assignable_to_int() {
        assert_eq!(is_assignable(&TypeInfo::String, &TypeInfo::Int), Assignability::No);
    }

    fn arb_type() -> impl Strategy<Value = TypeInfo> {
        let leaf = prop_oneof![
            Just(TypeInfo::Unknown),
            Just(TypeInfo::Any),
            Just(TypeInfo::Void),
            Just(TypeInfo::Null),
            Just(TypeInfo::Int),
            Just(TypeInfo::Float),
            Just(TypeInfo::Number),
            Just(TypeInfo::Bool),
            Just(TypeInfo::String),
            Just(TypeInfo::FunctionKeyword),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                inner.clone().prop_map(TypeInfo::list),
                (inner.clone(), inner.clone())
                    .prop_filter_map("null map key", |(k, v)| TypeInfo::map(k, v).ok()),
                prop::collection::vec(inner.clone(), 2..4)
                    .prop_filter_map("tuple rules", |elems| TypeInfo::tuple(elems).ok()),
                prop::collection::vec(inner, 2..4)
                    .prop_filter_map("union rules", |members| TypeInfo::union(members).ok()),
            ]
        })
    }

    proptest! {
        #[test]
        fn assignability_is_reflexive(ty in arb_type()) {
            prop_assert!(is_assignable(&ty, &ty).is_ok());
        }

        #[test]
        fn everything_assigns_to_any(ty in arb_type()) {
            prop_assert_eq!(is_assignable(&ty, &TypeInfo::Any), Assignability::Ok);
        }

        #[test]
        fn null_assigns_to_any_list(elem in arb_type()) {
            prop_assert_eq!(
                is_assignable(&TypeInfo::Null, &TypeInfo::list(elem)),
                Assignability::Ok
            );
        }

        #[test]
        fn union_equality_is_order_independent(a in arb_type(), b in arb_type()) {
            let ab = TypeInfo::union(vec![a.clone(), b.clone()]);
            let ba = TypeInfo::union(vec![b, a]);
            if let (Ok(ab), Ok(ba)) = (ab, ba) {
                prop_assert_eq!(ab, ba);
            }
        }
    }
}
