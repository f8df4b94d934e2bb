//! End-to-end resolution over the fixture corpus
//!
//! Covers laziness, ordering, fallbacks, join barriers, callback delivery and
//! diagnostics through the public session API only.

#[path = "../common/mod.rs"]
mod common;

use codegraph_resolver::errors::ErrorKind;
use codegraph_resolver::prelude::*;
use common::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn session() -> ResolutionSession {
    ResolutionSession::new(fixture_corpus(), fixture_config()).unwrap()
}

fn names(types: &[TypeEntity]) -> Vec<&str> {
    types.iter().map(TypeEntity::name).collect()
}

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    (count.clone(), count)
}

// ═══════════════════════════════════════════════════════════════════════════
// Type criteria
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unconstrained_types_match_whole_corpus_in_order() {
    let session = session();
    let all = session.types(TypeCriteria::new().key("all")).unwrap();
    let first = session.first_type(TypeCriteria::new().key("first")).unwrap();

    let report = session.resolve_blocking().unwrap();

    let all = all.value().unwrap();
    assert_eq!(names(&all), vec!["a.A", "a.B", "b.C"]);
    assert_eq!(first.value(), Some(TypeEntity::new("a.A")));
    assert_eq!(report.matches.types["first"], TypeEntity::new("a.A"));
    assert_eq!(report.matches.collections["all"].len(), 3);
    assert!(report.is_clean());
}

#[test]
fn test_exact_and_prefix_names() {
    let session = session();
    let exact = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.B")))
        .unwrap();
    let prefix = session
        .types(TypeCriteria::new().name(NamePattern::prefix("a.")))
        .unwrap();
    let first_prefix = session
        .types(TypeCriteria::new().name(NamePattern::first_prefix("a.")))
        .unwrap();
    let nothing = session
        .types(TypeCriteria::new().name(NamePattern::prefix("zz.")))
        .unwrap();
    for set in [&prefix, &first_prefix, &nothing] {
        set.on_match(|_| {});
    }
    exact.on_match(|_| {});

    session.resolve_blocking().unwrap();

    assert_eq!(exact.value(), Some(TypeEntity::new("a.B")));
    assert_eq!(names(&prefix.value().unwrap()), vec!["a.A", "a.B"]);
    assert_eq!(names(&first_prefix.value().unwrap()), vec!["a.A"]);
    assert_eq!(nothing.state(), CellState::Missed);
    assert!(nothing.value().is_none());
}

#[test]
fn test_modifier_filters() {
    let session = session();
    let finals = session
        .types(TypeCriteria::new().is_final(true).key("finals"))
        .unwrap();
    let package_private = session
        .types(TypeCriteria::new().is_package(true).key("package"))
        .unwrap();
    let public_non_final = session
        .types(TypeCriteria::new().is_public(true).is_final(false).key("open"))
        .unwrap();

    session.resolve_blocking().unwrap();

    assert_eq!(names(&finals.value().unwrap()), vec!["a.B"]);
    assert_eq!(names(&package_private.value().unwrap()), vec!["b.C"]);
    assert_eq!(names(&public_non_final.value().unwrap()), vec!["a.A"]);
}

#[test]
fn test_supertype_and_interfaces() {
    let session = session();
    let a = session.exact_type("a.A").unwrap();
    let b = session.exact_type("a.B").unwrap();

    let subtypes = session
        .types(TypeCriteria::new().super_type(&a).key("sub"))
        .unwrap();
    let parent = session.super_type(&b);
    parent.set_key("parent").unwrap();
    let interfaces = session.interfaces(&b);
    let implementors = session
        .types(TypeCriteria::new().interfaces(interfaces.disjunction()).key("impl"))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(names(&subtypes.value().unwrap()), vec!["a.B"]);
    assert_eq!(report.matches.types["parent"], TypeEntity::new("a.A"));
    assert_eq!(names(&interfaces.value().unwrap()), vec!["a.I"]);
    assert_eq!(names(&implementors.value().unwrap()), vec!["a.B", "b.C"]);
}

#[test]
fn test_interface_free_type_matches_empty_interfaces() {
    let session = session();
    let a = session.exact_type("a.A").unwrap();
    let none = session.interfaces(&a);
    let delivered = Arc::new(Mutex::new(None));
    let slot = delivered.clone();
    none.on_match(move |values| *slot.lock() = Some(values.len()));
    none.on_miss(|| panic!("an interface-free type still has an interface list"));

    // ∀ over an empty list holds for every candidate, so the dependent runs
    let every = session
        .types(TypeCriteria::new().interfaces(none.conjunction()).key("every"))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(none.state(), CellState::Matched);
    assert_eq!(none.value().map(|v| v.len()), Some(0));
    assert_eq!(*delivered.lock(), Some(0));
    assert_eq!(names(&every.value().unwrap()), vec!["a.A", "a.B", "b.C"]);
    assert!(report.is_clean());
}

#[test]
fn test_user_filter() {
    let session = session();
    let set = session
        .types(
            TypeCriteria::new()
                .filter(|ty: &TypeEntity| ty.name().ends_with('C'))
                .key("filtered"),
        )
        .unwrap();

    session.resolve_blocking().unwrap();
    assert_eq!(names(&set.value().unwrap()), vec!["b.C"]);
}

#[test]
fn test_panicking_filter_is_reported() {
    let session = session();
    let set = session
        .types(
            TypeCriteria::new()
                .filter(|ty: &TypeEntity| {
                    if ty.name() == "a.B" {
                        panic!("bad candidate");
                    }
                    true
                })
                .key("filtered"),
        )
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(names(&set.value().unwrap()), vec!["a.A", "b.C"]);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.kind == ErrorKind::UserCallback && d.message.contains("bad candidate")));
}

// ═══════════════════════════════════════════════════════════════════════════
// Members and strings
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_members_of_a_resolved_type() {
    let session = session();
    let a = session.exact_type("a.A").unwrap();

    let count = session
        .first_field(
            FieldCriteria::new()
                .declared_by(&a)
                .name(NamePattern::exact("count"))
                .key("count"),
        )
        .unwrap();
    let statics = session
        .methods(MethodCriteria::new().declared_by(&a).is_static(true).key("statics"))
        .unwrap();
    let one_arg = session
        .first_constructor(
            ConstructorCriteria::new()
                .declared_by(&a)
                .parameter_count(1)
                .key("ctor"),
        )
        .unwrap();
    let count_type = count.field_type();
    count_type.set_key("count.type").unwrap();

    let report = session.resolve_blocking().unwrap();

    let count = count.value().unwrap();
    assert_eq!(&*count.name, "count");
    assert_eq!(&*count.field_type, "int");
    assert_eq!(report.matches.types["count.type"], TypeEntity::new("int"));

    let statics = statics.value().unwrap();
    assert_eq!(statics.len(), 1);
    assert_eq!(&*statics[0].name, "add");

    assert_eq!(one_arg.value().unwrap().parameters.len(), 1);
    assert!(report.is_clean());
}

#[test]
fn test_include_super_walks_hierarchy() {
    let session = session();
    let b = session.exact_type("a.B").unwrap();
    let runs = session
        .methods(
            MethodCriteria::new()
                .declared_by(&b)
                .include_super(true)
                .name(NamePattern::exact("run"))
                .key("runs"),
        )
        .unwrap();
    let declaring = runs.declaring_types();
    declaring.set_key("owners").unwrap();

    session.resolve_blocking().unwrap();

    let owners = declaring.value().unwrap();
    assert_eq!(names(&owners), vec!["a.B", "a.A"]);
}

#[test]
fn test_filtered_declaring_types_keep_member_order() {
    let session = session();
    let b = session.exact_type("a.B").unwrap();
    let runs = session
        .methods(
            MethodCriteria::new()
                .declared_by(&b)
                .include_super(true)
                .name(NamePattern::exact("run")),
        )
        .unwrap();
    let first = session
        .first_declaring_type(&runs, TypeCriteria::new().key("first"))
        .unwrap();
    let open = session
        .declaring_types(&runs, TypeCriteria::new().is_final(false).key("open"))
        .unwrap();
    let outsider = session
        .types(
            TypeCriteria::new()
                .among(&runs.declaring_types())
                .name(NamePattern::exact("b.C"))
                .key("outsider"),
        )
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(first.value(), Some(TypeEntity::new("a.B")));
    assert_eq!(names(&open.value().unwrap()), vec!["a.A"]);
    assert_eq!(outsider.state(), CellState::Missed);
    assert!(report.matches.collections.contains_key("open"));
}

#[test]
fn test_positional_parameter_and_array_type() {
    let session = session();
    let a = session.exact_type("a.A").unwrap();
    let int = session
        .first_field(FieldCriteria::new().declared_by(&a).name(NamePattern::exact("count")))
        .unwrap()
        .field_type();
    let second_int = session
        .methods(MethodCriteria::new().declared_by(&a).parameter(1, &int).key("second"))
        .unwrap();
    let third_int = session
        .methods(MethodCriteria::new().declared_by(&a).parameter(2, &int).key("third"))
        .unwrap();
    let int_ctor = session
        .first_constructor(ConstructorCriteria::new().declared_by(&a).parameter(0, &int))
        .unwrap();
    let int_array = int.array_type();
    let a_array = a.array_type();
    for cell in [&int_ctor.declaring_type(), &int_array, &a_array] {
        cell.on_match(|_| {});
    }

    let report = session.resolve_blocking().unwrap();

    let second_int = second_int.value().unwrap();
    assert_eq!(second_int.len(), 1);
    assert_eq!(&*second_int[0].name, "add");
    assert_eq!(third_int.state(), CellState::Missed);
    assert_eq!(&*int_ctor.value().unwrap().parameters[0], "int");
    assert_eq!(int_array.value(), Some(TypeEntity::new("int[]")));
    assert_eq!(a_array.value(), Some(TypeEntity::new("a.A[]")));
    assert!(report.is_clean());
}

#[test]
fn test_exact_member_lookups() {
    let session = session();
    let add = session.exact_method("La/A;->add(II)I").unwrap();
    let name = session.exact_field("a.A.name").unwrap();
    let ctor = session.exact_constructor("a.A.<init>(int)").unwrap();
    let params = add.parameter_types();
    let ret = add.return_type();
    for cell in [&name.declaring_type(), &ret] {
        cell.on_match(|_| {});
    }
    ctor.on_match(|_| {});
    params.on_match(|_| {});

    let report = session.resolve_blocking().unwrap();

    assert_eq!(&*add.value().unwrap().name, "add");
    assert_eq!(names(&params.value().unwrap()), vec!["int", "int"]);
    assert_eq!(ret.value(), Some(TypeEntity::new("int")));
    assert_eq!(&*name.value().unwrap().field_type, "java.lang.String");
    assert_eq!(ctor.value().unwrap().parameters.len(), 1);
    assert!(report.is_clean());
}

#[test]
fn test_missing_exact_entity_reports_not_found() {
    let session = session();
    let missing = session.exact_method("La/A;->nope()V").unwrap();
    let (misses, seen) = counter();
    missing.on_miss(move || {
        misses.fetch_add(1, Ordering::SeqCst);
    });

    let report = session.resolve_blocking().unwrap();

    assert_eq!(missing.state(), CellState::Missed);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.kind == ErrorKind::EntityNotFound));
}

#[test]
fn test_unbounded_member_query_misses() {
    let session = session();
    let runs = session
        .methods(MethodCriteria::new().name(NamePattern::exact("run")).key("runs"))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(runs.state(), CellState::Missed);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, ErrorKind::UnboundedQuery);
}

#[test]
fn test_exhaustive_member_scan() {
    let mut config = fixture_config();
    config.scan.exhaustive_member_scan = true;
    let session = ResolutionSession::new(fixture_corpus(), config).unwrap();
    let runs = session
        .methods(MethodCriteria::new().name(NamePattern::exact("run")).key("runs"))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    let runs = runs.value().unwrap();
    let owners: Vec<&str> = runs.iter().map(|m| &*m.declaring).collect();
    assert_eq!(owners, vec!["a.A", "a.B"]);
    assert!(report.is_clean());
}

#[test]
fn test_string_literals() {
    let session = session();
    let api = session
        .strings(StringCriteria::new().value(NamePattern::prefix("api_")).key("api"))
        .unwrap();
    let hello = session
        .first_string(StringCriteria::new().value(NamePattern::exact("hello")).key("hello"))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    let api_values = api.value().unwrap();
    let api: Vec<&str> = api_values.iter().map(StringEntity::value).collect();
    assert_eq!(api, vec!["api_key", "api_secret"]);
    assert_eq!(hello.value().unwrap().value(), "hello");
    assert_eq!(report.matches.strings["hello"].value(), "hello");
}

// ═══════════════════════════════════════════════════════════════════════════
// Laziness and ordering
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unconsumed_criteria_never_evaluate() {
    let session = session();
    let wanted = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.A")).key("wanted"))
        .unwrap();
    let ignored = session
        .types(TypeCriteria::new().name(NamePattern::prefix("b.")))
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(wanted.state(), CellState::Matched);
    assert_eq!(ignored.state(), CellState::Pending);
    assert!(!ignored.is_demanded());
    assert_eq!(report.evaluations, 1);
    assert!(report.stalled.is_empty());
}

#[test]
fn test_missing_prerequisite_forces_miss_without_scan() {
    let session = session();
    let ghost = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("no.Such")))
        .unwrap();
    let methods = session
        .methods(MethodCriteria::new().declared_by(&ghost).key("ghost.methods"))
        .unwrap();
    let (misses, seen) = counter();
    methods.on_miss(move || {
        misses.fetch_add(1, Ordering::SeqCst);
    });

    let report = session.resolve_blocking().unwrap();

    assert_eq!(ghost.state(), CellState::Missed);
    assert_eq!(methods.state(), CellState::Missed);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(report.evaluations, 1);
    assert!(report.matches.collections.get("ghost.methods").is_none());
}

#[test]
fn test_dependent_evaluates_after_prerequisite() {
    let session = session();
    let order = Arc::new(Mutex::new(Vec::new()));

    let b = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.B")))
        .unwrap();
    let seen = order.clone();
    b.on_match(move |_| seen.lock().push("type"));

    // the filter runs on the scan pool; record what it saw of `b` each time
    let owner_states = Arc::new(Mutex::new(Vec::new()));
    let states = owner_states.clone();
    let owner = b.clone();
    let helper = session
        .first_method(MethodCriteria::new().declared_by(&b).filter(move |m: &MethodEntity| {
            states.lock().push((owner.state(), owner.value()));
            &*m.name == "helper"
        }))
        .unwrap();
    let seen = order.clone();
    helper.on_match(move |_| seen.lock().push("method"));

    let report = session.resolve_blocking().unwrap();

    assert_eq!(&*helper.value().unwrap().name, "helper");
    assert_eq!(report.rounds, 2);
    assert_eq!(order.lock().len(), 2);

    let states = owner_states.lock();
    assert!(!states.is_empty());
    for (state, value) in states.iter() {
        assert_eq!(*state, CellState::Matched);
        assert_eq!(value.as_ref(), Some(&TypeEntity::new("a.B")));
    }
}

#[test]
fn test_fallback_chain_substitutes_in_order() {
    let session = session();
    let primary = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("x.Missing")))
        .unwrap();
    let second = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("y.Missing")))
        .unwrap();
    let third = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("b.C")))
        .unwrap();
    let unused = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.A")))
        .unwrap();
    primary.or_else(&second).or_else(&third).or_else(&unused);
    primary.set_key("chosen").unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(report.matches.types["chosen"], TypeEntity::new("b.C"));
    assert_eq!(primary.value(), Some(TypeEntity::new("b.C")));
    assert_eq!(unused.state(), CellState::Pending);
}

#[test]
fn test_fallback_loop_is_a_cycle() {
    let session = session();
    let a = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("x.Missing")))
        .unwrap();
    let b = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("y.Missing")))
        .unwrap();
    a.or_else(&b);
    b.or_else(&a);
    a.set_key("a").unwrap();

    let err = session.resolve_blocking().unwrap_err();
    assert!(matches!(err, ResolverError::CycleDetected { .. }));
}

// ═══════════════════════════════════════════════════════════════════════════
// Settlement, callbacks, join barriers
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_callbacks_run_once_on_delivery_threads() {
    let session = session();
    let threads = Arc::new(Mutex::new(Vec::new()));
    let a = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.A")))
        .unwrap();
    for _ in 0..3 {
        let threads = threads.clone();
        a.on_match(move |_| {
            let name = std::thread::current().name().unwrap_or_default().to_string();
            threads.lock().push(name);
        });
    }

    session.resolve_blocking().unwrap();

    let threads = threads.lock();
    assert_eq!(threads.len(), 3);
    assert!(threads
        .iter()
        .all(|name| name.starts_with("codegraph-resolver-delivery-")));
}

#[test]
fn test_callback_panic_becomes_diagnostic() {
    let session = session();
    let a = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.A")))
        .unwrap();
    let (calls, seen) = counter();
    a.on_match(|_| panic!("consumer blew up"));
    a.on_match(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });

    let report = session.resolve_blocking().unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.kind == ErrorKind::UserCallback));
}

#[test]
fn test_join_barrier_two_matches_one_miss() {
    let session = session();
    let a = session.exact_type("a.A").unwrap();
    let b = session.exact_type("a.B").unwrap();
    let ghost = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("no.Such")))
        .unwrap();

    let (matches, matched) = counter();
    let (misses, missed) = counter();
    let barrier = session.join_barrier("all three");
    barrier
        .join(&a)
        .join(&b)
        .join(&ghost)
        .on_match(move || {
            matches.fetch_add(1, Ordering::SeqCst);
        })
        .on_miss(move || {
            misses.fetch_add(1, Ordering::SeqCst);
        });

    session.resolve_blocking().unwrap();

    assert!(barrier.is_fired());
    assert_eq!(matched.load(Ordering::SeqCst), 0);
    assert_eq!(missed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_join_barrier_binds_values() {
    let session = session();
    let a = session.exact_type("a.A").unwrap();
    let run = session
        .first_method(
            MethodCriteria::new()
                .declared_by(&a)
                .name(NamePattern::exact("run")),
        )
        .unwrap();

    let bound = Arc::new(Mutex::new(None));
    let (fired, seen) = counter();
    let slot = bound.clone();
    session
        .join_barrier("bind")
        .bind(&run, move |m: &MethodEntity| *slot.lock() = Some(m.clone()))
        .join(&a)
        .on_match(move || {
            fired.fetch_add(1, Ordering::SeqCst);
        });

    session.resolve_blocking().unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(bound.lock().as_ref().map(|m| &*m.name), Some("run"));
}

#[test]
fn test_duplicate_key_is_rejected() {
    let session = session();
    session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.A")).key("dup"))
        .unwrap();
    let second: ResolverResult<_> =
        session.first_type(TypeCriteria::new().name(NamePattern::exact("a.B")).key("dup"));

    assert!(matches!(second, Err(ResolverError::KeyConflict { .. })));
}

#[test]
fn test_escalating_handler_stops_scan() {
    let session = session();
    session.set_error_handler(|err| err.kind() != ErrorKind::UserCallback);
    let set = session
        .types(
            TypeCriteria::new()
                .filter(|ty: &TypeEntity| {
                    if ty.name() == "a.A" {
                        panic!("stop here");
                    }
                    true
                })
                .key("stopped"),
        )
        .unwrap();

    let report = session.resolve_blocking().unwrap();

    assert_eq!(set.state(), CellState::Missed);
    assert!(report.diagnostics.iter().any(|d| d.escalated));
}

#[test]
fn test_async_resolve_completes() {
    let session = session();
    let a = session
        .first_type(TypeCriteria::new().name(NamePattern::exact("a.A")).key("a"))
        .unwrap();
    let completion = session.resolve().unwrap();

    let report = completion.wait().unwrap();
    assert_eq!(report.matches.types["a"], TypeEntity::new("a.A"));
    assert_eq!(a.state(), CellState::Matched);
}
