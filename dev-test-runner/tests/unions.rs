use dev_test_runner::oneof::{Aged, ComplexdataType, Either, Holder, Named, NotSoAnonymous, OnlyFloat, OnlyInt, TextOrList};
use json_codegen::runtime::{self as rt, WireShape};

fn complex(src: &str) -> ComplexdataType {
    rt::from_str(src).unwrap()
}

// ————————————————————————————————————————————————————————————————————————————
// SCALARS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn numbers_prefer_the_integer_alternative() {
    assert_eq!(complex("16"), ComplexdataType::Int(16));
    assert_eq!(complex("-3"), ComplexdataType::Int(-3));
    assert_eq!(complex("16.2"), ComplexdataType::Float64(16.2));
    assert_eq!(complex("1e3"), ComplexdataType::Float64(1000.0));
    // does not fit an i64, falls back to the float reading
    assert_eq!(complex("18446744073709551615"), ComplexdataType::Float64(18446744073709551615.0));
}

#[test]
fn strings_are_never_read_as_numbers() {
    assert_eq!(complex(r#""16""#), ComplexdataType::String("16".into()));
}

#[test]
fn null_and_booleans() {
    assert_eq!(complex("null"), ComplexdataType::Nil);
    assert_eq!(complex("true"), ComplexdataType::Bool(true));
    assert_eq!(complex("false"), ComplexdataType::Bool(false));
}

#[test]
fn single_numeric_alternative_is_strict() {
    assert_eq!(rt::from_str::<OnlyInt>("16").unwrap(), OnlyInt::Int(16));
    let err = rt::from_str::<OnlyInt>("16.5").unwrap_err();
    assert!(err.message().contains("number 16.5 is not an integer"), "{err}");
    assert_eq!(err.kind(), rt::ErrorKind::ValueCodecFailure);
    let err = rt::from_str::<OnlyInt>("18446744073709551615").unwrap_err();
    assert!(err.message().contains("does not fit a 64-bit signed integer"), "{err}");

    assert_eq!(rt::from_str::<OnlyFloat>("16").unwrap(), OnlyFloat::Float64(16.0));
}

#[test]
fn undeclared_shapes_are_rejected() {
    let err = rt::from_str::<ComplexdataType>("[1]").unwrap_err();
    assert!(err.message().contains("ComplexdataType: unsupported wire shape for union: array"), "{err}");
    assert_eq!(err.kind(), rt::ErrorKind::ShapeMismatch);

    let err = rt::from_str::<OnlyInt>(r#""16""#).unwrap_err();
    assert!(err.message().contains("OnlyInt: unsupported wire shape for union: string"), "{err}");

    let err = rt::from_str::<OnlyFloat>("null").unwrap_err();
    assert!(err.message().contains("unsupported wire shape for union: null"), "{err}");
}

#[test]
fn encoding_writes_the_selected_payload() {
    assert_eq!(rt::to_string(&ComplexdataType::Int(16)).unwrap(), "16");
    assert_eq!(rt::to_string(&ComplexdataType::Float64(16.2)).unwrap(), "16.2");
    assert_eq!(rt::to_string(&ComplexdataType::String("16".into())).unwrap(), r#""16""#);
    assert_eq!(rt::to_string(&ComplexdataType::Nil).unwrap(), "null");
    assert_eq!(rt::to_string(&ComplexdataType::Bool(false)).unwrap(), "false");
    assert_eq!(
        rt::to_string(&ComplexdataType::NotSoAnonymous(NotSoAnonymous { age: 4 })).unwrap(),
        r#"{"age":4}"#
    );
}

#[test]
fn encoding_an_unset_union_fails() {
    let err = rt::to_string(&ComplexdataType::NotSet).unwrap_err();
    assert!(err.to_string().contains("ComplexdataType: cannot encode a union with no alternative set"), "{err}");
    assert_eq!(err.kind(), rt::ErrorKind::ValueCodecFailure);
}

// ————————————————————————————————————————————————————————————————————————————
// OBJECTS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn object_alternative_is_decoded() {
    assert_eq!(complex(r#"{"age":30}"#), ComplexdataType::NotSoAnonymous(NotSoAnonymous { age: 30 }));
}

#[test]
fn first_matching_object_alternative_wins() {
    assert_eq!(rt::from_str::<Either>(r#"{"age":1}"#).unwrap(), Either::A(Aged { age: 1 }));
    assert_eq!(rt::from_str::<Either>(r#"{"name":"x"}"#).unwrap(), Either::B(Named { name: "x".into() }));
}

#[test]
fn unmatched_object_reports_every_attempt() {
    let err = rt::from_str::<Either>(r#"{"other":1}"#).unwrap_err();
    let message = err.message();
    assert!(message.contains("Either: no alternative matched"), "{message}");
    assert!(message.contains("A: Aged: extension property not permitted: \"other\""), "{message}");
    assert!(message.contains("B: Named: extension property not permitted: \"other\""), "{message}");
    assert!(message.find("A: ").unwrap() < message.find("B: ").unwrap());
    // the per-alternative failures are schema violations, the union failure is not
    assert_eq!(err.kind(), rt::ErrorKind::ShapeMismatch);
}

#[test]
fn arrays_are_tried_against_array_alternatives_only() {
    assert_eq!(
        rt::from_str::<TextOrList>(r#"["a","b"]"#).unwrap(),
        TextOrList::List(vec!["a".into(), "b".into()])
    );
    assert_eq!(rt::from_str::<TextOrList>(r#""a""#).unwrap(), TextOrList::Text("a".into()));
    let err = rt::from_str::<TextOrList>(r#"{"a":1}"#).unwrap_err();
    assert!(err.message().contains("TextOrList: unsupported wire shape for union: object"), "{err}");

    let err = rt::from_str::<TextOrList>("[1]").unwrap_err();
    assert!(err.message().contains("TextOrList: no alternative matched"), "{err}");
    assert!(err.message().contains("List: "), "{err}");
    assert_eq!(err.kind(), rt::ErrorKind::ShapeMismatch);
    assert_eq!(rt::to_string(&TextOrList::List(vec!["z".into()])).unwrap(), r#"["z"]"#);
}

// ————————————————————————————————————————————————————————————————————————————
// ACCESSORS AND FIELDS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn accessors_follow_the_tag() {
    let mut value = ComplexdataType::default();
    assert!(value.is_not_set());
    assert_eq!(value.shape(), None);

    value.set_int(3);
    assert!(value.is_int());
    assert_eq!(value.as_int(), Some(&3));
    assert_eq!(value.as_float64(), None);
    assert_eq!(value.shape(), Some(WireShape::Integer));

    value.set_nil();
    assert!(value.is_nil());
    assert_eq!(value.shape(), Some(WireShape::Null));

    assert_eq!(ComplexdataType::from_string("s".into()).shape(), Some(WireShape::String));
}

#[test]
fn union_fields_are_omitted_until_set() {
    assert_eq!(rt::to_string(&Holder::default()).unwrap(), "{}");

    let holder = Holder { data: ComplexdataType::Nil, pick: Either::B(Named { name: "n".into() }) };
    let text = rt::to_string(&holder).unwrap();
    assert_eq!(text, r#"{"data":null,"pick":{"name":"n"}}"#);
    assert_eq!(rt::from_str::<Holder>(&text).unwrap(), holder);

    let holder: Holder = rt::from_str(r#"{"data":16.0}"#).unwrap();
    assert_eq!(holder.data, ComplexdataType::Float64(16.0));
    assert!(holder.pick.is_not_set());
}
