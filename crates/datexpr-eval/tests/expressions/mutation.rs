//! `$dateSet` field overwrites and `$dateSetConfig` zone changes.

use datexpr_eval::ExprError;
use datexpr_types::ExprValue;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::common::{call, registry, s, v, REFERENCE};

#[rstest]
#[case(json!({"month": 1}), "2021-01-12T15:34:15.020Z")]
#[case(json!({"year": 2020}), "2020-02-12T15:34:15.020Z")]
#[case(json!({"day": 1}), "2021-02-01T15:34:15.020Z")]
#[case(json!({"hour": 1}), "2021-02-12T01:34:15.020Z")]
#[case(json!({"minute": 1}), "2021-02-12T15:01:15.020Z")]
#[case(json!({"second": 1}), "2021-02-12T15:34:01.020Z")]
#[case(json!({"millisecond": 999}), "2021-02-12T15:34:15.999Z")]
#[case(json!({"year": 2022, "month": 7, "day": 4}), "2022-07-04T15:34:15.020Z")]
#[case(json!({"days": 1}), "2021-02-01T15:34:15.020Z")]
#[case(json!({"ordinal": 1}), "2021-01-01T15:34:15.020Z")]
#[case(json!({"weekday": 1}), "2021-02-08T15:34:15.020Z")]
fn set_overwrites_fields(#[case] fields: serde_json::Value, #[case] expected: &str) {
    let registry = registry();
    let values = v(json!([fields, "utc"]));
    let result = call(&registry, "$dateSet", &[values, ExprValue::Null, s(REFERENCE)]);
    assert_eq!(result, s(expected), "fields {fields}");
}

#[test]
fn set_clamps_a_carried_day_to_the_new_month() {
    let registry = registry();
    // Setting February on January 31st leaves the day untouched, so it
    // clamps to the 28th instead of overflowing.
    let date = v(json!(["2021-01-31T10:00:00.000Z", { "zone": "utc" }]));
    let values = v(json!([{ "month": 2 }, "utc"]));
    let result = call(&registry, "$dateSet", &[values, ExprValue::Null, date]);
    assert_eq!(result, s("2021-02-28T10:00:00.000Z"));

    // Same for a leap day carried into a common year.
    let date = v(json!(["2020-02-29T10:00:00.000Z", { "zone": "utc" }]));
    let values = v(json!([{ "year": 2021 }, "utc"]));
    let result = call(&registry, "$dateSet", &[values, ExprValue::Null, date]);
    assert_eq!(result, s("2021-02-28T10:00:00.000Z"));
}

#[test]
fn set_never_clamps_a_stated_day() {
    let registry = registry();
    // A day named in the overwrite is taken literally; February 31st
    // degrades rather than clamping.
    let date = v(json!(["2021-01-15T10:00:00.000Z", { "zone": "utc" }]));
    let values = v(json!([{ "month": 2, "day": 31 }, "utc"]));
    let result = call(&registry, "$dateSet", &[values.clone(), ExprValue::Null, date.clone()]);
    assert!(result.is_null());

    let validity = call(
        &registry,
        "$dateSet",
        &[values, v(json!(["CalendarInstantProperty", "isValid"])), date],
    );
    assert_eq!(validity, ExprValue::Bool(false));
}

#[test]
fn set_rejects_unknown_fields() {
    let registry = registry();
    let values = v(json!([{ "fortnight": 1 }, "utc"]));
    assert!(matches!(
        registry.call("$dateSet", &[values, ExprValue::Null, s(REFERENCE)]),
        Err(ExprError::InvalidUnit { .. })
    ));
}

#[test]
fn set_rejects_mixed_date_systems() {
    let registry = registry();
    let values = v(json!([{ "weekNumber": 6, "month": 2 }, "utc"]));
    assert!(matches!(
        registry.call("$dateSet", &[values, ExprValue::Null, s(REFERENCE)]),
        Err(ExprError::ConflictingFields { .. })
    ));
}

#[test]
fn set_rejects_non_numeric_values() {
    let registry = registry();
    let values = v(json!([{ "month": "January" }, "utc"]));
    assert!(matches!(
        registry.call("$dateSet", &[values, ExprValue::Null, s(REFERENCE)]),
        Err(ExprError::TypeMismatch { .. })
    ));
}

#[rstest]
#[case("UTC+0", "2021-02-12T15:34:15.020Z")]
#[case("utc", "2021-02-12T15:34:15.020Z")]
#[case("UTC+1", "2021-02-12T16:34:15.020+01:00")]
#[case("UTC-3:30", "2021-02-12T12:04:15.020-03:30")]
#[case("America/Sao_Paulo", "2021-02-12T12:34:15.020-03:00")]
fn set_config_moves_the_zone(#[case] zone: &str, #[case] expected: &str) {
    let registry = registry();
    let config = v(json!({ "zone": zone }));
    let result = call(&registry, "$dateSetConfig", &[config, ExprValue::Null, s(REFERENCE)]);
    assert_eq!(result, s(expected), "zone {zone}");
}

#[test]
fn set_config_preserves_the_absolute_instant() {
    let registry = registry();
    let config = v(json!({ "zone": "UTC+1" }));
    let moved = call(
        &registry,
        "$dateSetConfig",
        &[config, s("UnixEpochMs"), s(REFERENCE)],
    );
    assert_eq!(moved, ExprValue::Number(1_613_144_055_020.0));
}

#[test]
fn set_config_rejects_unknown_keys() {
    let registry = registry();
    let config = v(json!({ "unknownConfig": "value" }));
    assert!(matches!(
        registry.call("$dateSetConfig", &[config, ExprValue::Null, s(REFERENCE)]),
        Err(ExprError::UnknownConfig { .. })
    ));
}

#[test]
fn set_config_rejects_non_string_zones() {
    let registry = registry();
    let config = v(json!({ "zone": 3 }));
    assert!(matches!(
        registry.call("$dateSetConfig", &[config, ExprValue::Null, s(REFERENCE)]),
        Err(ExprError::TypeMismatch { .. })
    ));
}

#[test]
fn set_config_degrades_on_unresolvable_zones() {
    let registry = registry();
    let config = v(json!({ "zone": "Neverland/Nowhere" }));
    let result = call(&registry, "$dateSetConfig", &[config, ExprValue::Null, s(REFERENCE)]);
    assert!(result.is_null());
}
