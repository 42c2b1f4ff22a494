use graphjson_core::{decode, CoderError, Mapping, Value};

fn seq(items: impl IntoIterator<Item = Value>) -> Value {
    Value::sequence(items)
}

fn assert_decode_err(text: &str, expected: CoderError) {
    let err = decode(text).unwrap_err();
    assert_eq!(err, expected, "decoding {text:?}");
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn decode_null_and_bools() {
    assert_eq!(decode("null").unwrap(), Value::Null);
    assert_eq!(decode("true").unwrap(), Value::Bool(true));
    assert_eq!(decode("false").unwrap(), Value::Bool(false));
}

#[test]
fn decode_surrounding_whitespace_ignored() {
    assert_eq!(decode("  \n\t42 \r\n").unwrap(), Value::Int(42));
}

#[test]
fn decode_truncated_literal() {
    assert_decode_err(
        "tru",
        CoderError::UnexpectedEnd {
            position: 3,
            context: "true",
        },
    );
}

#[test]
fn decode_malformed_literal() {
    assert!(matches!(
        decode("trux").unwrap_err(),
        CoderError::Syntax { position: 0, .. }
    ));
    assert!(matches!(
        decode("nil").unwrap_err(),
        CoderError::Syntax { position: 0, .. }
    ));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn decode_integers() {
    assert_eq!(decode("42").unwrap(), Value::Int(42));
    assert_eq!(decode("-7").unwrap(), Value::Int(-7));
    assert_eq!(decode("+5").unwrap(), Value::Int(5));
    assert_eq!(decode("0").unwrap(), Value::Int(0));
}

#[test]
fn decode_floats_need_decimal_point() {
    assert_eq!(decode("3.0").unwrap(), Value::Float(3.0));
    assert_eq!(decode("3.14").unwrap(), Value::Float(3.14));
    assert_eq!(decode("3.").unwrap(), Value::Float(3.0));
    assert_eq!(decode(".5").unwrap(), Value::Float(0.5));
    assert_eq!(decode("-1.5e3").unwrap(), Value::Float(-1500.0));
    assert_eq!(decode("2.5E-1").unwrap(), Value::Float(0.25));
}

#[test]
fn decode_exponent_without_point_is_invalid() {
    assert_decode_err(
        "1e5",
        CoderError::InvalidNumber {
            position: 0,
            literal: "1e5".into(),
        },
    );
}

#[test]
fn decode_integer_overflow_is_invalid() {
    assert_decode_err(
        "[99999999999999999999]",
        CoderError::InvalidNumber {
            position: 1,
            literal: "99999999999999999999".into(),
        },
    );
}

#[test]
fn decode_lone_sign_is_invalid() {
    assert_decode_err(
        "-",
        CoderError::InvalidNumber {
            position: 0,
            literal: "-".into(),
        },
    );
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn decode_text() {
    assert_eq!(decode(r#""hello""#).unwrap(), Value::text("hello"));
    assert_eq!(decode(r#""""#).unwrap(), Value::text(""));
}

#[test]
fn decode_escapes_make_next_char_literal() {
    assert_eq!(decode(r#""a\"b\\c""#).unwrap(), Value::text(r#"a"b\c"#));
    assert_eq!(decode(r#""\n\é""#).unwrap(), Value::text("né"));
}

#[test]
fn decode_unicode_text() {
    assert_eq!(decode("\"日本語\"").unwrap(), Value::text("日本語"));
}

#[test]
fn decode_unterminated_text() {
    assert_decode_err(
        r#""abc"#,
        CoderError::UnexpectedEnd {
            position: 0,
            context: "string",
        },
    );
    assert_decode_err(
        r#""abc\"#,
        CoderError::UnexpectedEnd {
            position: 0,
            context: "string",
        },
    );
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn decode_sequences() {
    assert_eq!(decode("[]").unwrap(), Value::from(Vec::<Value>::new()));
    assert_eq!(
        decode("[1, 2.0, \"x\", null]").unwrap(),
        seq([
            Value::Int(1),
            Value::Float(2.0),
            Value::text("x"),
            Value::Null
        ])
    );
    assert_eq!(
        decode("[ [ ] , [1] ]").unwrap(),
        seq([Value::from(Vec::<Value>::new()), seq([Value::Int(1)])])
    );
}

#[test]
fn decode_mappings() {
    assert_eq!(decode("{}").unwrap(), Value::from(Mapping::new()));
    assert_eq!(
        decode(r#"{"b": 2, "a": {"c": true}}"#).unwrap(),
        Value::mapping([
            ("a", Value::mapping([("c", Value::Bool(true))])),
            ("b", Value::Int(2)),
        ])
    );
}

#[test]
fn decode_accepts_trailing_commas() {
    assert_eq!(
        decode("[1, 2,]").unwrap(),
        seq([Value::Int(1), Value::Int(2)])
    );
    assert_eq!(
        decode(r#"{"a": 1,}"#).unwrap(),
        Value::mapping([("a", Value::Int(1))])
    );
}

#[test]
fn decode_unterminated_containers() {
    assert_decode_err(
        "[1, 2",
        CoderError::UnexpectedEnd {
            position: 0,
            context: "sequence",
        },
    );
    assert_decode_err(
        r#"{"a": 1"#,
        CoderError::UnexpectedEnd {
            position: 0,
            context: "mapping",
        },
    );
    assert_decode_err(
        "[",
        CoderError::UnexpectedEnd {
            position: 1,
            context: "value",
        },
    );
}

#[test]
fn decode_requires_string_keys_and_colons() {
    assert!(matches!(
        decode("{1: 2}").unwrap_err(),
        CoderError::Syntax { position: 1, .. }
    ));
    assert!(matches!(
        decode(r#"{"a" 1}"#).unwrap_err(),
        CoderError::Syntax { position: 5, .. }
    ));
}

#[test]
fn decode_missing_separator() {
    assert!(matches!(
        decode("[1 2]").unwrap_err(),
        CoderError::Syntax { position: 3, .. }
    ));
}

// ============================================================================
// Input-level errors
// ============================================================================

#[test]
fn decode_empty_input() {
    assert_decode_err(
        "   ",
        CoderError::UnexpectedEnd {
            position: 0,
            context: "value",
        },
    );
}

#[test]
fn decode_unknown_leading_character() {
    assert!(matches!(
        decode("@").unwrap_err(),
        CoderError::Syntax { position: 0, .. }
    ));
}

#[test]
fn decode_trailing_characters() {
    assert_decode_err("1 2", CoderError::TrailingCharacters { position: 2 });
}

// ============================================================================
// Definitions and references
// ============================================================================

#[test]
fn decode_definition_is_transparent() {
    assert_eq!(
        decode(r#"{"__id": 4, "value": [1]}"#).unwrap(),
        seq([Value::Int(1)])
    );
}

#[test]
fn decode_reference_yields_same_instance() {
    let value = decode(r#"[{"__id": 2, "value": {"k": 1}}, {"__ref": 2}]"#).unwrap();
    let items = value.as_sequence().unwrap();
    assert_eq!(items[0], items[1]);
    assert!(items[0].same_instance(&items[1]));
}

#[test]
fn decode_undefined_reference_fails() {
    assert_decode_err(r#"{"__ref": 9}"#, CoderError::UndefinedReference { id: 9 });
}

#[test]
fn decode_reference_before_definition_fails() {
    assert_decode_err(
        r#"[{"__ref": 2}, {"__id": 2, "value": 1}]"#,
        CoderError::UndefinedReference { id: 2 },
    );
}

#[test]
fn decode_malformed_reference_ids() {
    assert!(matches!(
        decode(r#"{"__ref": "x"}"#).unwrap_err(),
        CoderError::InvalidEnvelope { .. }
    ));
    assert!(matches!(
        decode(r#"{"__id": -1, "value": 1}"#).unwrap_err(),
        CoderError::InvalidEnvelope { .. }
    ));
}

#[test]
fn decode_lone_id_key_is_plain_mapping() {
    assert_eq!(
        decode(r#"{"__id": 1}"#).unwrap(),
        Value::mapping([("__id", Value::Int(1))])
    );
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn decode_builtin_extension() {
    let value = decode(r#"{"__type": "i32", "value": 7}"#).unwrap();
    assert_eq!(value, Value::from(7i32));
    assert_eq!(value.downcast_ref::<i32>(), Some(&7));
}

#[test]
fn decode_alias_keeps_its_tag() {
    let value = decode(r#"{"__type": "int", "value": 7}"#).unwrap();
    assert_eq!(value.type_name(), "int");
    assert_eq!(value.downcast_ref::<i32>(), Some(&7));
    assert_eq!(value, Value::extension("int", 7i32));
}

#[test]
fn decode_unregistered_tag_fails() {
    assert_decode_err(
        r#"{"__type": "celsius", "value": 1.0}"#,
        CoderError::UnregisteredType {
            type_name: "celsius".into(),
        },
    );
}

#[test]
fn decode_non_text_tag_fails() {
    assert!(matches!(
        decode(r#"{"__type": 5, "value": 1}"#).unwrap_err(),
        CoderError::InvalidEnvelope { .. }
    ));
}

#[test]
fn decode_out_of_range_representation_fails() {
    assert!(matches!(
        decode(r#"{"__type": "i8", "value": 300}"#).unwrap_err(),
        CoderError::Representation { .. }
    ));
    assert!(matches!(
        decode(r#"{"__type": "i32", "value": 2.0}"#).unwrap_err(),
        CoderError::Representation { .. }
    ));
}

// ============================================================================
// Typed arrays
// ============================================================================

#[test]
fn decode_typed_array_of_extension_items() {
    let value = decode(r#"{"__itemtype": "i16", "array": [1, null, 3]}"#).unwrap();
    assert_eq!(
        value,
        Value::typed_array("i16", vec![Value::from(1i16), Value::Null, Value::from(3i16)])
    );
}

#[test]
fn decode_typed_array_alias_keeps_item_type() {
    let value = decode(r#"{"__itemtype": "short", "array": [1]}"#).unwrap();
    let array = value.as_typed_array().unwrap();
    assert_eq!(array.item_type(), "short");
    // Bare items are tagged with the canonical identifier.
    assert_eq!(array.items(), &[Value::from(1i16)]);
}

#[test]
fn decode_typed_array_keeps_alias_tagged_items() {
    let value = decode(
        r#"{"__itemtype": "i32", "array": [{"__type": "int", "value": 5}, 6]}"#,
    )
    .unwrap();
    assert_eq!(
        value,
        Value::typed_array("i32", vec![Value::extension("int", 5i32), Value::from(6i32)])
    );
}

#[test]
fn decode_typed_array_keeps_tagged_items() {
    let value = decode(r#"{"__itemtype": "i32", "array": [{"__type": "i32", "value": 5}]}"#).unwrap();
    assert_eq!(value, Value::typed_array("i32", vec![Value::from(5i32)]));
}

#[test]
fn decode_typed_float_array_coerces_integral_items() {
    let value = decode(r#"{"__itemtype": "f64", "array": [1, 2.5, null]}"#).unwrap();
    assert_eq!(
        value,
        Value::typed_array(
            "f64",
            vec![Value::Float(1.0), Value::Float(2.5), Value::Null]
        )
    );
}

#[test]
fn decode_typed_array_item_mismatch_fails() {
    assert_decode_err(
        r#"{"__itemtype": "text", "array": [1]}"#,
        CoderError::ItemTypeMismatch {
            item_type: "text".into(),
            found: "i64".into(),
        },
    );
}

#[test]
fn decode_typed_array_requires_sequence_payload() {
    assert!(matches!(
        decode(r#"{"__itemtype": "text", "array": 5}"#).unwrap_err(),
        CoderError::InvalidEnvelope { .. }
    ));
}

#[test]
fn decode_typed_array_of_unknown_type_fails() {
    assert_decode_err(
        r#"{"__itemtype": "celsius", "array": []}"#,
        CoderError::UnregisteredType {
            type_name: "celsius".into(),
        },
    );
}
