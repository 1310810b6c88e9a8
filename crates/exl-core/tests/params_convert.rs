use exl_core::{LaunchError, ParamValue, ParameterSet, Scalar};
use serde_json::json;

#[test]
fn json_mapping_converts_in_order() {
    let value = json!({"arg1": "hi", "lr": 0.1, "sizes": [32, 64], "flag": true});
    let params = ParameterSet::try_from(value).expect("valid parameters");
    assert_eq!(params.len(), 4);
    assert_eq!(params.get("arg1"), Some(&ParamValue::Scalar(Scalar::Str("hi".into()))));
    assert_eq!(
        params.get("sizes"),
        Some(&ParamValue::Sequence(vec![Scalar::Int(32), Scalar::Int(64)]))
    );
}

#[test]
fn nested_mapping_is_rejected() {
    let value = json!({"optim": {"lr": 0.1}});
    let err = ParameterSet::try_from(value).expect_err("mapping rejected");
    match err {
        LaunchError::InvalidParameterType(info) => {
            assert_eq!(info.code, "params.invalid_type");
            assert_eq!(info.context["key"], "optim");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nested_sequence_is_rejected_with_index() {
    let value = json!({"grid": [1, [2, 3]]});
    let err = ParameterSet::try_from(value).expect_err("nested list rejected");
    assert!(matches!(err, LaunchError::InvalidParameterType(_)));
    assert_eq!(err.info().context["index"], "1");
}

#[test]
fn null_value_is_rejected() {
    let err = ParameterSet::try_from(json!({"ckpt": null})).expect_err("null rejected");
    assert!(matches!(err, LaunchError::InvalidParameterType(_)));
}

#[test]
fn non_mapping_root_is_rejected() {
    let err = ParameterSet::try_from(json!([1, 2])).expect_err("list root rejected");
    assert_eq!(err.info().code, "params.not_a_mapping");
}

#[test]
fn oversized_unsigned_keeps_digits() {
    let params = ParameterSet::try_from(json!({"big": u64::MAX})).expect("valid");
    assert_eq!(params.get("big").map(ParamValue::tokens), Some(vec![u64::MAX.to_string()]));
}

#[test]
fn scalars_render_in_python_literal_form() {
    let params = ParameterSet::new()
        .with("flag", true)
        .with("quiet", false)
        .with("lr", 0.00001)
        .with("big", 1e16)
        .with("eps", 1.5e-7)
        .with("min_lr", 0.0001)
        .with("steps", 1e15)
        .with("decay", -2.5);
    assert_eq!(
        exl_core::to_command_line(&params),
        "--flag True --quiet False --lr 1e-05 --big 1e+16 --eps 1.5e-07 \
         --min_lr 0.0001 --steps 1000000000000000.0 --decay -2.5"
    );
}

#[test]
fn non_finite_floats_render_like_python() {
    assert_eq!(Scalar::Float(f64::NAN).to_string(), "nan");
    assert_eq!(Scalar::Float(f64::INFINITY).to_string(), "inf");
    assert_eq!(Scalar::Float(f64::NEG_INFINITY).to_string(), "-inf");
    assert_eq!(Scalar::Float(-0.0).to_string(), "-0.0");
    assert_eq!(Scalar::Float(123.456).to_string(), "123.456");
}
