//! Fatal-path coverage: every distinct error kind must be produced by the
//! matching malformed input, and none may silently succeed.

mod common;

use std::sync::Arc;

use common::*;
use dillscope::prelude::*;
use dillscope::Error;

fn minimal_component() -> Vec<u8> {
    let mut encoder = ComponentEncoder::new();
    let library_ref = encoder.name(0, "package:demo/e.dart");
    encoder.add_library(LibrarySpec {
        reference: library_ref,
        name_index: 0,
        file_uri: 0,
        classes: Vec::new(),
        fields: Vec::new(),
        procedures: Vec::new(),
    });
    encoder.finish()
}

fn body_component(body: Vec<u8>) -> Vec<u8> {
    let mut encoder = ComponentEncoder::new();
    let library_ref = encoder.name(0, "package:demo/e.dart");
    let procedure_ref = encoder.name(library_ref, "f");
    let procedure_name = encoder.intern("f");
    encoder.add_library(LibrarySpec {
        reference: library_ref,
        name_index: 0,
        file_uri: 0,
        classes: Vec::new(),
        fields: Vec::new(),
        procedures: vec![ProcedureSpec {
            reference: procedure_ref,
            name_index: procedure_name,
            kind: 0,
            flags: 0,
            function: FunctionSpec::returning(body),
        }],
    });
    encoder.finish()
}

fn load_eager(bytes: Vec<u8>) -> dillscope::Result<Component> {
    ComponentLoader::new()
        .with_options(LoadOptions {
            eager: true,
            ..LoadOptions::default()
        })
        .load(&Arc::new(Buffer::from_vec(bytes)))
}

#[test]
fn corrupted_magic_is_bad_magic() {
    let mut bytes = minimal_component();
    bytes[0] = 0xFF;
    match load_eager(bytes) {
        Err(Error::BadMagic { found }) => assert_eq!(found, 0xFFAB_CDEF),
        other => panic!("expected BadMagic, got {other:?}"),
    }
}

#[test]
fn out_of_range_version_is_unsupported() {
    let mut bytes = minimal_component();
    bytes[4..8].copy_from_slice(&99u32.to_be_bytes());
    match load_eager(bytes) {
        Err(Error::UnsupportedVersion { found, expected }) => {
            assert_eq!(found, 99);
            assert_eq!(expected, 42);
        }
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn zero_trailer_size_is_malformed() {
    let mut bytes = minimal_component();
    let len = bytes.len();
    bytes[len - 4..].copy_from_slice(&0u32.to_be_bytes());
    assert!(matches!(load_eager(bytes), Err(Error::Malformed { .. })));
}

#[test]
fn oversized_trailer_size_is_malformed() {
    let mut bytes = minimal_component();
    let len = bytes.len();
    bytes[len - 4..].copy_from_slice(&u32::MAX.to_be_bytes());
    assert!(matches!(load_eager(bytes), Err(Error::Malformed { .. })));
}

#[test]
fn out_of_bounds_variable_reference_is_fatal() {
    // A body reading variable 5 with nothing on the stack.
    let bytes = body_component(stmt_return(Some(expr_variable_get(0, 5))));
    match load_eager(bytes) {
        Err(Error::VariableIndexOutOfRange { index, depth }) => {
            assert_eq!(index, 5);
            assert_eq!(depth, 0);
        }
        other => panic!("expected VariableIndexOutOfRange, got {other:?}"),
    }
}

#[test]
fn unknown_tag_is_rejected() {
    // 74 is a hole in the statement tag space.
    let bytes = body_component(vec![74]);
    match load_eager(bytes) {
        Err(Error::UnexpectedTag { tag, context, .. }) => {
            assert_eq!(tag, 74);
            assert!(context.contains('f'), "context was `{context}`");
        }
        other => panic!("expected UnexpectedTag, got {other:?}"),
    }
}

#[test]
fn sdk_hash_checking() {
    let mut encoder = ComponentEncoder::new();
    encoder.set_sdk_hash("abcdef1234");
    let library_ref = encoder.name(0, "package:demo/e.dart");
    encoder.add_library(LibrarySpec {
        reference: library_ref,
        name_index: 0,
        file_uri: 0,
        classes: Vec::new(),
        fields: Vec::new(),
        procedures: Vec::new(),
    });
    let bytes = encoder.finish();

    // Accepted when listed.
    let accepting = ComponentLoader::new().with_options(LoadOptions {
        accepted_sdk_hashes: Some(vec!["abcdef1234".to_string()]),
        ..LoadOptions::default()
    });
    assert!(accepting.load(&Arc::new(Buffer::from_vec(bytes.clone()))).is_ok());

    // Rejected when not listed.
    let rejecting = ComponentLoader::new().with_options(LoadOptions {
        accepted_sdk_hashes: Some(vec!["fedcba4321".to_string()]),
        ..LoadOptions::default()
    });
    match rejecting.load(&Arc::new(Buffer::from_vec(bytes))) {
        Err(Error::UnknownSdkHash { found }) => assert_eq!(found, "abcdef1234"),
        other => panic!("expected UnknownSdkHash, got {other:?}"),
    }

    // The all-zero signature passes any accepted set.
    let zeroed = minimal_component();
    match rejecting.load(&Arc::new(Buffer::from_vec(zeroed))) {
        Ok(_) => {}
        other => panic!("expected the unverified hash to pass, got {other:?}"),
    }
}

#[test]
fn empty_input_is_distinct() {
    let loader = ComponentLoader::new();
    assert!(matches!(
        loader.load(&Arc::new(Buffer::from_vec(Vec::new()))),
        Err(Error::Empty)
    ));
    assert!(matches!(
        loader.load_single(&Arc::new(Buffer::from_vec(Vec::new()))),
        Err(Error::Empty)
    ));
}

#[test]
fn trailing_bytes_after_single_component() {
    let mut bytes = minimal_component();
    let size = bytes.len() as u32;
    // Append a stray copy of the size field; the buffer no longer partitions.
    bytes.extend_from_slice(&size.to_be_bytes());

    match ComponentLoader::new().load_single(&Arc::new(Buffer::from_vec(bytes))) {
        Err(Error::TrailingBytes { count }) => assert_eq!(count, 4),
        other => panic!("expected TrailingBytes, got {other:?}"),
    }
}

#[test]
fn unresolved_constant_back_reference_is_fatal() {
    let mut encoder = ComponentEncoder::new();
    // A list referencing a pool offset nothing lives at.
    let list_offset = encoder.add_constant(&const_list(ty_dynamic(), &[999]));
    let library_ref = encoder.name(0, "package:demo/e.dart");
    let procedure_ref = encoder.name(library_ref, "k");
    let procedure_name = encoder.intern("k");
    encoder.add_library(LibrarySpec {
        reference: library_ref,
        name_index: 0,
        file_uri: 0,
        classes: Vec::new(),
        fields: Vec::new(),
        procedures: vec![ProcedureSpec {
            reference: procedure_ref,
            name_index: procedure_name,
            kind: 0,
            flags: 0,
            function: FunctionSpec::returning(stmt_return(Some(expr_constant(list_offset)))),
        }],
    });

    match load_eager(encoder.finish()) {
        Err(Error::ConstantOffsetUnresolved { offset }) => assert_eq!(offset, 999),
        other => panic!("expected ConstantOffsetUnresolved, got {other:?}"),
    }
}

#[test]
fn dangling_canonical_name_reference_is_fatal() {
    let mut encoder = ComponentEncoder::new();
    encoder.name(0, "package:demo/e.dart");
    // Library claims canonical name entry #5; only one entry exists.
    encoder.add_library(LibrarySpec {
        reference: 5,
        name_index: 0,
        file_uri: 0,
        classes: Vec::new(),
        fields: Vec::new(),
        procedures: Vec::new(),
    });

    match load_eager(encoder.finish()) {
        Err(Error::MissingCanonicalName { index }) => assert_eq!(index, 4),
        other => panic!("expected MissingCanonicalName, got {other:?}"),
    }
}

#[test]
fn unknown_compilation_mode_is_malformed() {
    let mut encoder = ComponentEncoder::new();
    encoder.set_compilation_mode(7);
    let library_ref = encoder.name(0, "package:demo/e.dart");
    encoder.add_library(LibrarySpec {
        reference: library_ref,
        name_index: 0,
        file_uri: 0,
        classes: Vec::new(),
        fields: Vec::new(),
        procedures: Vec::new(),
    });

    assert!(matches!(
        load_eager(encoder.finish()),
        Err(Error::Malformed { .. })
    ));
}
