//! Signature parsing, descriptor conversion and the weak lookup cache

#[path = "../common/mod.rs"]
mod common;

use codegraph_resolver::errors::{ErrorKind, ResolverError};
use codegraph_resolver::features::signature::{parse, SignatureResolver, SignatureShape};
use codegraph_resolver::shared::models::{Entity, EntityKind, TypeEntity};
use codegraph_resolver::shared::utils::descriptor::{from_descriptor, split_descriptors, to_descriptor};
use common::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn resolver() -> SignatureResolver {
    SignatureResolver::new(fixture_corpus())
}

#[test]
fn test_descriptor_conversions() {
    assert_eq!(to_descriptor("a.b.C"), "La/b/C;");
    assert_eq!(to_descriptor("int[][]"), "[[I");
    assert_eq!(from_descriptor("[La/b/C;").as_deref(), Some("a.b.C[]"));
    assert_eq!(from_descriptor("La/b/C;x"), None);
    assert_eq!(
        split_descriptors("IJ[La/B;").unwrap(),
        vec!["int".to_string(), "long".to_string(), "a.B[]".to_string()]
    );
}

#[test]
fn test_both_forms_parse_to_the_same_signature() {
    let descriptor = parse("La/A;->add(II)I").unwrap();
    let qualified = parse("a.A.add(int,int)int").unwrap();

    assert_eq!(descriptor, qualified);
    assert_eq!(descriptor.owner, "a.A");
    assert_eq!(
        descriptor.shape,
        SignatureShape::Executable {
            parameters: vec!["int".into(), "int".into()],
            return_type: Some("int".into()),
        }
    );
}

#[test]
fn test_malformed_signatures_are_rejected() {
    for text in ["", "La/A;->", "La/A;->run(I", "noowner", "La/A;->run(Q)V"] {
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSignature, "{}", text);
    }
}

#[test]
fn test_resolves_every_member_kind() {
    let resolver = resolver();

    let field = resolver.resolve_field("La/A;->count:I").unwrap();
    assert_eq!(&*field.declaring, "a.A");
    assert_eq!(field.identifier(), "La/A;->count:I");

    let method = resolver.resolve_method("a.B.helper()").unwrap();
    assert_eq!(&*method.declaring, "a.B");

    let ctor = resolver.resolve_constructor("La/A;-><init>()V").unwrap();
    assert!(ctor.parameters.is_empty());

    assert_eq!(resolver.resolve_type("[La/A;").unwrap(), TypeEntity::new("a.A[]"));
    assert_eq!(resolver.resolve_type("J").unwrap(), TypeEntity::new("long"));
}

#[test]
fn test_wrong_kind_is_invalid() {
    let err = resolver().resolve_method("La/A;->count:I").unwrap_err();
    assert!(matches!(err, ResolverError::InvalidSignature { .. }));
}

#[test]
fn test_missing_member_is_cached_negative() {
    let resolver = resolver();
    for _ in 0..2 {
        let err = resolver.resolve("La/A;->missing()V").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
    }
    let err = resolver.resolve("Lno/Such;->x:I").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EntityNotFound);
}

#[test]
fn test_positive_cache_is_weak() {
    let corpus = fixture_sharded();
    let resolver = SignatureResolver::new(corpus.clone());

    let first = resolver.resolve("La/A;->run()V").unwrap();
    let again = resolver.resolve("La/A;->run()V").unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    drop(first);
    drop(again);

    // the cache held no strong reference, so this is a fresh lookup
    let fresh = resolver.resolve("La/A;->run()V").unwrap();
    assert!(matches!(&*fresh, Entity::Method(m) if &*m.name == "run"));
    assert_eq!(Arc::strong_count(&fresh), 1);
}
