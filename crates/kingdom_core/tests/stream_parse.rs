mod common;

use std::rc::Rc;

use kingdom_core::serialization::error::{FieldError, ParseError};
use kingdom_core::serialization::graph::{Entity, MemberValue};
use kingdom_core::serialization::patch::FieldSlot;
use kingdom_core::serialization::wire::PrimitiveType;
use kingdom_core::serialization::{FieldValue, SaveDocument};

use common::{CELL_CLASS, StreamBuilder, TOWN_NAME_CLASS, WORLD_CLASS, kingdom_save};

#[test]
fn full_save_parses_with_all_roots() {
    let doc = SaveDocument::parse(kingdom_save()).expect("fixture parses");

    assert_eq!(doc.header().root_id, 1);
    assert_eq!(doc.header().major_version, 1);

    assert!(doc.roots().contains_key(WORLD_CLASS));
    assert!(doc.roots().contains_key(TOWN_NAME_CLASS));
    assert!(doc.roots().contains_key(CELL_CLASS));
}

#[test]
fn class_with_id_instances_share_the_declared_shape() {
    let doc = SaveDocument::parse(kingdom_save()).expect("fixture parses");

    let cell_class = doc
        .graph()
        .class_id_by_name(CELL_CLASS)
        .expect("cell class declared");
    assert_eq!(doc.graph().instances_of_class(cell_class), &[5, 6, 7]);

    let first = doc.graph().instance(5).expect("first cell");
    let second = doc.graph().instance(6).expect("second cell");
    assert!(Rc::ptr_eq(first.shape(), second.shape()));
}

#[test]
fn string_members_resolve_through_the_graph() {
    let doc = SaveDocument::parse(kingdom_save()).expect("fixture parses");
    let town = doc.root_id(TOWN_NAME_CLASS).expect("town root");
    let value = doc.field(town, "townName").expect("member exists");
    assert_eq!(value, FieldValue::Str("Porthaven".to_string()));
}

#[test]
fn fixed_width_members_decode_with_values() {
    let doc = SaveDocument::parse(kingdom_save()).expect("fixture parses");
    let world = doc.root_id(WORLD_CLASS).expect("world root");

    assert_eq!(
        doc.field(world, "gridWidth").expect("width"),
        FieldValue::Int32(3)
    );
    assert_eq!(
        doc.field(world, "gridHeight").expect("height"),
        FieldValue::Int32(2)
    );
    assert_eq!(
        doc.field(6, "fertile").expect("fertile"),
        FieldValue::Boolean(true)
    );
    assert_eq!(doc.field(7, "amount").expect("amount"), FieldValue::Int32(25));
}

#[test]
fn stream_must_start_with_a_header() {
    let mut b = StreamBuilder::new();
    b.library();
    b.end();
    let err = SaveDocument::parse(b.finish()).expect_err("no header");
    assert!(matches!(err, ParseError::BadLeadingTag(12)));
}

#[test]
fn unknown_record_tag_reports_its_offset() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.push_u8(99);
    let err = SaveDocument::parse(b.finish()).expect_err("bad tag");
    match err {
        ParseError::UnknownRecordTag { tag: 99, offset } => assert_eq!(offset, 17),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn truncated_stream_is_fatal() {
    let mut bytes = kingdom_save();
    bytes.truncate(bytes.len() - 10);
    let err = SaveDocument::parse(bytes).expect_err("short input");
    assert!(matches!(err, ParseError::Truncated { .. }));
}

#[test]
fn class_referencing_undeclared_library_fails() {
    let mut b = StreamBuilder::new();
    b.header(1);
    // World declaration without the preceding library record.
    b.world(1, 3, 2);
    b.end();
    let err = SaveDocument::parse(b.finish()).expect_err("missing library");
    assert!(matches!(err, ParseError::UnknownLibrary { library_id: 2, .. }));
}

#[test]
fn class_with_id_without_metadata_fails() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    b.cell_with_id(6, 5, true, false, false, 0);
    b.end();
    let err = SaveDocument::parse(b.finish()).expect_err("missing metadata");
    assert!(matches!(
        err,
        ParseError::UnknownClassMetadata {
            object_id: 6,
            metadata_id: 5,
        }
    ));
}

#[test]
fn duplicate_object_ids_are_rejected() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    b.cell_class(5, false, false, false, 0);
    b.cell_with_id(5, 5, true, true, true, 1);
    b.end();
    let err = SaveDocument::parse(b.finish()).expect_err("duplicate id");
    assert!(matches!(err, ParseError::DuplicateObjectId(5)));
}

#[test]
fn null_runs_expand_across_members() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    // Three Object-typed members, all filled by one ObjectNullMultiple256.
    b.push_u8(5);
    b.push_i32(1);
    b.push_str("Building+BuildingSaveData");
    b.push_i32(3);
    b.push_str("a");
    b.push_str("b");
    b.push_str("c");
    b.push_u8(2);
    b.push_u8(2);
    b.push_u8(2);
    b.push_i32(common::LIBRARY_ID);
    b.push_u8(13);
    b.push_u8(3);
    b.end();

    let doc = SaveDocument::parse(b.finish()).expect("parses");
    for member in ["a", "b", "c"] {
        assert_eq!(doc.field(1, member).expect("member"), FieldValue::Null);
    }
}

#[test]
fn oversized_null_run_is_a_shape_mismatch() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    b.push_u8(5);
    b.push_i32(1);
    b.push_str("Building+BuildingSaveData");
    b.push_i32(2);
    b.push_str("a");
    b.push_str("b");
    b.push_u8(2);
    b.push_u8(2);
    b.push_i32(common::LIBRARY_ID);
    b.push_u8(13);
    b.push_u8(5);
    b.end();

    let err = SaveDocument::parse(b.finish()).expect_err("null run overflows");
    assert!(matches!(err, ParseError::ShapeMismatch { .. }));
}

#[test]
fn primitive_arrays_decode_positionally() {
    let mut b = StreamBuilder::new();
    b.header(1);
    // ArraySinglePrimitive of three Int32 values.
    b.push_u8(15);
    b.push_i32(8);
    b.push_i32(3);
    b.push_u8(8);
    b.push_i32(10);
    b.push_i32(-20);
    b.push_i32(30);
    b.end();

    let doc = SaveDocument::parse(b.finish()).expect("parses");
    let Some(Entity::Array(array)) = doc.graph().lookup(8) else {
        panic!("array entity missing");
    };
    assert_eq!(array.length, 3);
    assert_eq!(array.primitive_type, PrimitiveType::Int32);
    let values: Vec<i32> = array
        .values()
        .iter()
        .map(|v| match v {
            MemberValue::Field(FieldSlot::Int32 { value, .. }) => *value,
            other => panic!("unexpected element {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![10, -20, 30]);
}

#[test]
fn forward_references_resolve_at_consumption_time() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    // Member points at object 9, which only appears after this record.
    b.push_u8(5);
    b.push_i32(1);
    b.push_str("Building+BuildingSaveData");
    b.push_i32(1);
    b.push_str("label");
    b.push_u8(1);
    b.push_i32(common::LIBRARY_ID);
    b.push_u8(9);
    b.push_i32(9);
    // The referent.
    b.push_u8(6);
    b.push_i32(9);
    b.push_str("granary");
    b.end();

    let doc = SaveDocument::parse(b.finish()).expect("parses");
    assert_eq!(
        doc.field(1, "label").expect("resolves"),
        FieldValue::Str("granary".to_string())
    );
}

#[test]
fn dangling_references_fail_only_when_consumed() {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    b.push_u8(5);
    b.push_i32(1);
    b.push_str("Building+BuildingSaveData");
    b.push_i32(1);
    b.push_str("label");
    b.push_u8(1);
    b.push_i32(common::LIBRARY_ID);
    b.push_u8(9);
    b.push_i32(404);
    b.end();

    let doc = SaveDocument::parse(b.finish()).expect("parse succeeds despite dangling id");
    let err = doc.field(1, "label").expect_err("resolution fails");
    assert!(matches!(err, FieldError::Unresolved(404)));
}

#[test]
fn unsupported_records_fail_loudly() {
    // MethodCall (tag 21) directly after the header.
    let mut b = StreamBuilder::new();
    b.header(1);
    b.push_u8(21);
    let err = SaveDocument::parse(b.finish()).expect_err("unsupported record");
    assert!(matches!(err, ParseError::Unsupported(_)));
}
