//! `$dateStartOf` / `$dateEndOf`: unit boundaries taken in the unit's
//! zone.

use datexpr_eval::ExprError;
use datexpr_types::ExprValue;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::common::{call, registry, s, v, REFERENCE};

fn unit_utc(unit: &str) -> ExprValue {
    v(json!([unit, "utc"]))
}

#[rstest]
#[case("year", "2021-01-01T00:00:00.000Z")]
#[case("quarter", "2021-01-01T00:00:00.000Z")]
#[case("month", "2021-02-01T00:00:00.000Z")]
#[case("week", "2021-02-08T00:00:00.000Z")]
#[case("day", "2021-02-12T00:00:00.000Z")]
#[case("hour", "2021-02-12T15:00:00.000Z")]
#[case("minute", "2021-02-12T15:34:00.000Z")]
#[case("second", "2021-02-12T15:34:15.000Z")]
#[case("millisecond", "2021-02-12T15:34:15.020Z")]
fn start_of_each_unit(#[case] unit: &str, #[case] expected: &str) {
    let registry = registry();
    let result = call(
        &registry,
        "$dateStartOf",
        &[unit_utc(unit), ExprValue::Null, s(REFERENCE)],
    );
    assert_eq!(result, s(expected), "unit {unit}");
}

#[rstest]
#[case("year", "2021-12-31T23:59:59.999Z")]
#[case("quarter", "2021-03-31T23:59:59.999Z")]
#[case("month", "2021-02-28T23:59:59.999Z")]
#[case("week", "2021-02-14T23:59:59.999Z")]
#[case("day", "2021-02-12T23:59:59.999Z")]
#[case("hour", "2021-02-12T15:59:59.999Z")]
#[case("minute", "2021-02-12T15:34:59.999Z")]
#[case("second", "2021-02-12T15:34:15.999Z")]
#[case("millisecond", "2021-02-12T15:34:15.020Z")]
fn end_of_each_unit(#[case] unit: &str, #[case] expected: &str) {
    let registry = registry();
    let result = call(
        &registry,
        "$dateEndOf",
        &[unit_utc(unit), ExprValue::Null, s(REFERENCE)],
    );
    assert_eq!(result, s(expected), "unit {unit}");
}

#[test]
fn units_accept_plural_names() {
    let registry = registry();
    let result = call(
        &registry,
        "$dateStartOf",
        &[v(json!(["months", "utc"])), ExprValue::Null, s(REFERENCE)],
    );
    assert_eq!(result, s("2021-02-01T00:00:00.000Z"));
}

#[test]
fn boundaries_are_idempotent() {
    let registry = registry();
    let once = call(
        &registry,
        "$dateStartOf",
        &[unit_utc("month"), ExprValue::Null, s(REFERENCE)],
    );
    let twice = call(
        &registry,
        "$dateStartOf",
        &[unit_utc("month"), ExprValue::Null, once.clone()],
    );
    assert_eq!(once, twice);
}

#[test]
fn the_zone_decides_the_boundary() {
    let registry = registry();
    // 2021-02-12T15:34Z is still Feb 12 in UTC but already Feb 13 in
    // UTC+10, so the day boundary moves a calendar day.
    let in_utc = call(
        &registry,
        "$dateStartOf",
        &[unit_utc("day"), ExprValue::Null, s(REFERENCE)],
    );
    assert_eq!(in_utc, s("2021-02-12T00:00:00.000Z"));
    let in_plus_ten = call(
        &registry,
        "$dateStartOf",
        &[v(json!(["day", "UTC+10"])), ExprValue::Null, s(REFERENCE)],
    );
    assert_eq!(in_plus_ten, s("2021-02-13T00:00:00.000+10:00"));
}

#[test]
fn unknown_unit_raises() {
    let registry = registry();
    assert!(matches!(
        registry.call(
            "$dateStartOf",
            &[s("fortnight"), ExprValue::Null, s(REFERENCE)]
        ),
        Err(ExprError::InvalidUnit { .. })
    ));
    assert!(matches!(
        registry.call("$dateEndOf", &[s("eon"), ExprValue::Null, s(REFERENCE)]),
        Err(ExprError::InvalidUnit { .. })
    ));
}

#[test]
fn unresolvable_zone_degrades() {
    let registry = registry();
    let result = call(
        &registry,
        "$dateStartOf",
        &[
            v(json!(["month", "Neverland/Nowhere"])),
            ExprValue::Null,
            s(REFERENCE),
        ],
    );
    assert!(result.is_null());
}

#[test]
fn invalid_dates_stay_invalid() {
    let registry = registry();
    let result = call(
        &registry,
        "$dateEndOf",
        &[unit_utc("month"), ExprValue::Null, s("garbage")],
    );
    assert!(result.is_null());
}
