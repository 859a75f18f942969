//! `$date` and `$dateNow`: decoding, re-encoding, patterns, and
//! instant property reads.

use std::time::{SystemTime, UNIX_EPOCH};

use datexpr_eval::ExprError;
use datexpr_types::ExprValue;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::common::{call, iso_utc, reference_utc, registry, s, text, v, REFERENCE};

const REFERENCE_MILLIS: f64 = 1_613_144_055_020.0;

#[test]
fn default_serialization_is_full_iso() {
    let registry = registry();
    let date = v(json!([REFERENCE_MILLIS, "UnixEpochMs", { "zone": "utc" }]));
    let result = call(&registry, "$date", &[ExprValue::Null, date]);
    assert_eq!(result, s("2021-02-12T15:34:15.020Z"));
}

#[rstest]
#[case("ISO", "2021-02-12T15:34:15.020Z")]
#[case("ISODate", "2021-02-12")]
#[case("ISOWeekDate", "2021-W06-5")]
#[case("ISOTime", "15:34:15.020Z")]
#[case("RFC2822", "Fri, 12 Feb 2021 15:34:15 +0000")]
#[case("HTTP", "Fri, 12 Feb 2021 15:34:15 GMT")]
#[case("SQL", "2021-02-12 15:34:15.020 +00:00")]
#[case("SQLDate", "2021-02-12")]
#[case("SQLTime", "15:34:15.020 +00:00")]
fn encodes_every_string_grammar(#[case] tag: &str, #[case] expected: &str) {
    let registry = registry();
    let request = v(json!([tag, { "zone": "utc" }]));
    let result = call(&registry, "$date", &[request, s(REFERENCE)]);
    assert_eq!(text(result), expected, "tag {tag}");
}

#[rstest]
#[case(json!(["2021-02-12T15:34:15.020Z", "ISO"]))]
#[case(json!(["2021-W06-5T15:34:15.020Z", "ISO"]))]
#[case(json!(["2021-043T15:34:15.020Z", "ISO"]))]
#[case(json!(["Fri, 12 Feb 2021 15:34:15 +0000", "RFC2822"]))]
#[case(json!(["2021-02-12 15:34:15.020 +00:00", "SQL"]))]
#[case(json!([1_613_144_055_020.0, "UnixEpochMs"]))]
#[case(json!([1_613_144_055.02, "UnixEpochS"]))]
fn decodes_every_tagged_form(#[case] date: serde_json::Value) {
    let registry = registry();
    let result = call(&registry, "$date", &[s("UnixEpochMs"), v(date.clone())]);
    let millis = match &date[0] {
        value if value.is_string() && value.as_str().unwrap().contains("Fri,") => {
            1_613_144_055_000.0
        }
        _ => REFERENCE_MILLIS,
    };
    assert_eq!(result, ExprValue::Number(millis), "input {date}");
}

#[test]
fn http_decodes_all_three_grammars() {
    let registry = registry();
    for input in [
        "Fri, 12 Feb 2021 15:34:15 GMT",
        "Friday, 12-Feb-21 15:34:15 GMT",
        "Fri Feb 12 15:34:15 2021",
    ] {
        let result = call(&registry, "$date", &[s("UnixEpochMs"), v(json!([input, "HTTP"]))]);
        assert_eq!(result, ExprValue::Number(1_613_144_055_000.0), "input {input}");
    }
}

#[test]
fn structured_values_round_trip() {
    let registry = registry();

    let native = call(&registry, "$date", &[s("NativeDate"), s(REFERENCE)]);
    assert!(matches!(native, ExprValue::NativeDate(_)));
    let back = call(
        &registry,
        "$date",
        &[iso_utc(), ExprValue::Array(vec![native, s("NativeDate")])],
    );
    assert_eq!(text(back), "2021-02-12T15:34:15.020Z");

    let object = call(
        &registry,
        "$date",
        &[v(json!(["PlainObject", { "zone": "utc" }])), s(REFERENCE)],
    );
    let back = call(
        &registry,
        "$date",
        &[
            iso_utc(),
            ExprValue::Array(vec![object, s("PlainObject"), v(json!({ "zone": "utc" }))]),
        ],
    );
    assert_eq!(text(back), "2021-02-12T15:34:15.020Z");

    let instant = call(&registry, "$date", &[s("CalendarInstant"), s(REFERENCE)]);
    assert!(matches!(instant, ExprValue::Instant(_)));
    let back = call(
        &registry,
        "$date",
        &[iso_utc(), ExprValue::Array(vec![instant, s("CalendarInstant")])],
    );
    assert_eq!(text(back), "2021-02-12T15:34:15.020Z");
}

#[rstest]
#[case("y", "2020")]
#[case("yyyy", "2020")]
#[case("MMMM", "October")]
#[case("MMM", "Oct")]
#[case("EEEE", "Wednesday")]
#[case("dd.MM.yyyy", "14.10.2020")]
#[case("HH:mm:ss.SSS", "23:09:30.787")]
#[case("q 'of' yyyy", "4 of 2020")]
fn encodes_custom_patterns(#[case] pattern: &str, #[case] expected: &str) {
    let registry = registry();
    let request = v(json!([pattern, { "zone": "utc" }]));
    let result = call(&registry, "$date", &[request, s("2020-10-14T23:09:30.787Z")]);
    assert_eq!(text(result), expected, "pattern {pattern}");
}

#[test]
fn decodes_custom_patterns() {
    let registry = registry();
    let date = v(json!(["14 October 2020", "dd MMMM yyyy", { "zone": "utc" }]));
    let result = call(&registry, "$date", &[iso_utc(), date]);
    assert_eq!(text(result), "2020-10-14T00:00:00.000Z");

    let date = v(json!(["2020/10/14 23-09", "yyyy/MM/dd HH-mm", { "zone": "utc" }]));
    let result = call(&registry, "$date", &[iso_utc(), date]);
    assert_eq!(text(result), "2020-10-14T23:09:00.000Z");
}

#[rstest]
#[case("year", json!(2021.0))]
#[case("month", json!(2.0))]
#[case("day", json!(12.0))]
#[case("weekday", json!(5.0))]
#[case("weekdayLong", json!("Friday"))]
#[case("monthShort", json!("Feb"))]
#[case("ordinal", json!(43.0))]
#[case("quarter", json!(1.0))]
#[case("daysInMonth", json!(28.0))]
#[case("daysInYear", json!(365.0))]
#[case("isInLeapYear", json!(false))]
#[case("isValid", json!(true))]
#[case("offset", json!(0.0))]
#[case("zoneName", json!("UTC"))]
fn reads_instant_properties(#[case] property: &str, #[case] expected: serde_json::Value) {
    let registry = registry();
    let request = v(json!(["CalendarInstantProperty", property]));
    let result = call(&registry, "$date", &[request, reference_utc()]);
    assert_eq!(result, v(expected), "property {property}");
}

#[test]
fn unknown_property_raises() {
    let registry = registry();
    let request = v(json!(["CalendarInstantProperty", "locale"]));
    assert!(matches!(
        registry.call("$date", &[request, s(REFERENCE)]),
        Err(ExprError::InvalidProperty { .. })
    ));
}

#[test]
fn unparseable_content_degrades_per_tag() {
    let registry = registry();
    let garbage = s("some random string");

    assert!(call(&registry, "$date", &[s("ISO"), garbage.clone()]).is_null());
    assert!(call(&registry, "$date", &[s("NativeDate"), garbage.clone()]).is_null());
    match call(&registry, "$date", &[s("UnixEpochMs"), garbage.clone()]) {
        ExprValue::Number(n) => assert!(n.is_nan()),
        other => panic!("expected NaN, got {other:?}"),
    }
    let object = call(&registry, "$date", &[s("PlainObject"), garbage.clone()]);
    assert_eq!(object, v(json!({})));
    assert_eq!(
        text(call(&registry, "$date", &[s("dd/MM/yyyy"), garbage])),
        "Invalid DateTime"
    );
}

#[test]
fn type_contradicting_tag_raises() {
    let registry = registry();
    assert!(matches!(
        registry.call("$date", &[s("ISO"), v(json!([10, "ISO"]))]),
        Err(ExprError::TypeMismatch { .. })
    ));
    assert!(matches!(
        registry.call("$date", &[s("ISO"), v(json!(["text", "UnixEpochMs"]))]),
        Err(ExprError::TypeMismatch { .. })
    ));
}

#[test]
fn now_tracks_the_wall_clock() {
    let registry = registry();
    let before = epoch_now_millis();
    let result = call(&registry, "$dateNow", &[s("UnixEpochMs")]);
    let after = epoch_now_millis();
    let millis = match result {
        ExprValue::Number(n) => n as i64,
        other => panic!("expected a number, got {other:?}"),
    };
    assert!(
        (before..=after).contains(&millis),
        "now {millis} outside [{before}, {after}]"
    );
}

fn epoch_now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
