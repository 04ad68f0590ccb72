use dev_test_runner::compat::{Inner, Kind, Legacy};
use json_codegen::runtime as rt;

#[test]
fn literal_false_means_no_data() {
    let legacy: Legacy = rt::from_str(r#"{"id":false,"name":false,"child":false,"kind":false,"flag":false}"#).unwrap();
    assert_eq!(legacy, Legacy::default());
}

#[test]
fn false_still_counts_as_received() {
    assert!(rt::from_str::<Legacy>(r#"{"id":false}"#).is_ok());

    let err = rt::from_str::<Legacy>(r#"{"name":false}"#).unwrap_err();
    assert!(err.message().contains(r#"Legacy: required fields not present: "id""#), "{err}");
}

#[test]
fn literal_true_is_still_an_error() {
    let err = rt::from_str::<Legacy>(r#"{"id":1,"name":true}"#).unwrap_err();
    assert!(err.message().contains("literal 'true' where a non-boolean value was expected"), "{err}");
    assert_eq!(err.path, "name");
    assert_eq!(err.kind(), rt::ErrorKind::ValueCodecFailure);
}

#[test]
fn nested_failures_keep_their_path() {
    let err = rt::from_str::<Legacy>(r#"{"id":1,"child":{"v":"x"}}"#).unwrap_err();
    assert_eq!(err.path, "child.v");
    assert!(err.message().contains("line 1 column"), "{err}");
    assert_eq!(err.kind(), rt::ErrorKind::ValueCodecFailure);

    let err = rt::from_str::<Legacy>(r#"{"id":1,"kind":[1]}"#).unwrap_err();
    assert_eq!(err.path, "kind");
    assert_eq!(err.kind(), rt::ErrorKind::ShapeMismatch);
}

#[test]
fn boolean_fields_keep_their_value() {
    let legacy: Legacy = rt::from_str(r#"{"id":1,"flag":true}"#).unwrap();
    assert!(legacy.flag);
}

#[test]
fn real_values_decode_as_usual() {
    let legacy: Legacy = rt::from_str(r#"{"id":7,"name":"n","child":{"v":false},"kind":"k"}"#).unwrap();
    assert_eq!(legacy.id, 7);
    assert_eq!(legacy.name, "n");
    assert_eq!(legacy.child, Some(Box::new(Inner { v: 0 })));
    assert_eq!(legacy.kind, Kind::Text("k".into()));

    let legacy: Legacy = rt::from_str(r#"{"id":7,"kind":12}"#).unwrap();
    assert_eq!(legacy.kind, Kind::Code(12));
    assert_eq!(rt::to_string(&legacy).unwrap(), r#"{"id":7,"kind":12}"#);
}
