//! Comparison operations. Each reads as `date OP reference`: the
//! reference comes first and the date under test trails.

use datexpr_types::ExprValue;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::common::{call, registry, s, v};

const DATE_BEFORE: &str = "2019-10-14T23:09:30.787Z";
const DATE_REFERENCE: &str = "2020-10-14T23:09:30.787Z";
const DATE_REFERENCE_OTHER_TZ: &str = "2020-10-14T20:09:30.787-03:00";
const DATE_AFTER: &str = "2021-10-14T23:09:30.787Z";

#[rstest]
#[case("$dateGt", DATE_BEFORE, false)]
#[case("$dateGt", DATE_REFERENCE, false)]
#[case("$dateGt", DATE_REFERENCE_OTHER_TZ, false)]
#[case("$dateGt", DATE_AFTER, true)]
#[case("$dateGte", DATE_BEFORE, false)]
#[case("$dateGte", DATE_REFERENCE, true)]
#[case("$dateGte", DATE_REFERENCE_OTHER_TZ, true)]
#[case("$dateGte", DATE_AFTER, true)]
#[case("$dateLt", DATE_BEFORE, true)]
#[case("$dateLt", DATE_REFERENCE, false)]
#[case("$dateLt", DATE_REFERENCE_OTHER_TZ, false)]
#[case("$dateLt", DATE_AFTER, false)]
#[case("$dateLte", DATE_BEFORE, true)]
#[case("$dateLte", DATE_REFERENCE, true)]
#[case("$dateLte", DATE_REFERENCE_OTHER_TZ, true)]
#[case("$dateLte", DATE_AFTER, false)]
fn ordering_table(#[case] name: &str, #[case] date: &str, #[case] expected: bool) {
    let registry = registry();
    let result = call(&registry, name, &[s(DATE_REFERENCE), s(date)]);
    assert_eq!(result, ExprValue::Bool(expected), "{name} with {date}");
}

#[rstest]
#[case(DATE_BEFORE, false)]
#[case(DATE_REFERENCE, true)]
#[case(DATE_REFERENCE_OTHER_TZ, true)]
#[case(DATE_AFTER, false)]
fn eq_defaults_to_millisecond_identity(#[case] date: &str, #[case] expected: bool) {
    let registry = registry();
    let result = call(
        &registry,
        "$dateEq",
        &[s(DATE_REFERENCE), ExprValue::Null, s(date)],
    );
    assert_eq!(result, ExprValue::Bool(expected), "date {date}");
}

#[rstest]
#[case("2020-07-03T01:02:03.004Z", "year", true)]
#[case("2020-07-03T01:02:03.004Z", "month", false)]
#[case("2020-10-03T01:02:03.004Z", "month", true)]
#[case("2020-10-03T01:02:03.004Z", "day", false)]
#[case("2020-10-14T05:00:00.000Z", "day", true)]
#[case("2020-10-14T05:00:00.000Z", "hour", false)]
#[case("2020-10-14T23:09:45.123Z", "minute", true)]
#[case("2020-10-14T23:09:30.999Z", "second", true)]
#[case("2020-10-14T23:09:30.999Z", "millisecond", false)]
fn eq_floors_to_the_unit(#[case] date: &str, #[case] unit: &str, #[case] expected: bool) {
    let registry = registry();
    // Pin the reference's zone: the flooring happens there.
    let reference = v(json!([DATE_REFERENCE, { "zone": "utc" }]));
    let result = call(&registry, "$dateEq", &[reference, s(unit), s(date)]);
    assert_eq!(result, ExprValue::Bool(expected), "{date} by {unit}");
}

#[test]
fn eq_floors_in_the_reference_zone() {
    let registry = registry();
    let reference = v(json!([DATE_REFERENCE, { "zone": "utc" }]));
    // 01:00+03:00 on Oct 15 is still Oct 14 viewed from UTC.
    let date = s("2020-10-15T01:00:00.000+03:00");
    let result = call(&registry, "$dateEq", &[reference, s("day"), date]);
    assert_eq!(result, ExprValue::Bool(true));
}

#[test]
fn operands_compare_across_formats() {
    let registry = registry();
    let epoch = v(json!([1_602_716_970_787.0, "UnixEpochMs"]));
    let result = call(&registry, "$dateEq", &[s(DATE_REFERENCE), ExprValue::Null, epoch]);
    assert_eq!(result, ExprValue::Bool(true));

    let sql = v(json!(["2020-10-14 23:09:30.787 +00:00", "SQL"]));
    let result = call(&registry, "$dateGte", &[s(DATE_REFERENCE), sql]);
    assert_eq!(result, ExprValue::Bool(true));
}

#[test]
fn invalid_operands_fail_every_comparison() {
    let registry = registry();
    for name in ["$dateGt", "$dateGte", "$dateLt", "$dateLte"] {
        let garbage_left = call(&registry, name, &[s("garbage"), s(DATE_REFERENCE)]);
        assert_eq!(garbage_left, ExprValue::Bool(false), "{name} garbage left");
        let garbage_right = call(&registry, name, &[s(DATE_REFERENCE), s("garbage")]);
        assert_eq!(garbage_right, ExprValue::Bool(false), "{name} garbage right");
    }
    let eq = call(
        &registry,
        "$dateEq",
        &[s("garbage"), ExprValue::Null, s("garbage")],
    );
    assert_eq!(eq, ExprValue::Bool(false));
}
