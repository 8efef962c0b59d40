use chrono::{NaiveDate, TimeZone, Utc};
use fieldexpr::{evaluate, Error, Value};
use std::collections::HashMap;

fn eval0(expr: &str) -> Result<Value, Error> {
    evaluate(expr, &HashMap::new())
}

#[test]
fn date_parse_with_padded_time_field() {
    let mut vars = HashMap::new();
    vars.insert("date".to_string(), Value::String("20221123".into()));
    vars.insert("time".to_string(), Value::String("94625100".into()));

    let result = evaluate(
        "date_parse(date + left_pad(time, \"0\", 9), \"YYYYMMDDHHmmssSSS\")",
        &vars,
    )
    .unwrap();

    let expected = NaiveDate::from_ymd_opt(2022, 11, 23)
        .unwrap()
        .and_hms_milli_opt(9, 46, 25, 100)
        .unwrap()
        .and_utc();
    assert_eq!(result, Value::Timestamp(expected));
}

#[test]
fn date_parse_separated_formats() {
    assert_eq!(
        eval0("date_parse(\"2022-11-23 09:46:25\", \"YYYY-MM-DD HH:mm:ss\")").unwrap(),
        Value::Timestamp(Utc.with_ymd_and_hms(2022, 11, 23, 9, 46, 25).unwrap())
    );
    assert_eq!(
        eval0("date_parse(\"23/11/2022\", \"dd/MM/yyyy\")").unwrap(),
        Value::Timestamp(Utc.with_ymd_and_hms(2022, 11, 23, 0, 0, 0).unwrap())
    );

    let with_dot = eval0("date_parse(\"2022-11-23 09:46:25.250\", \"YYYY-MM-DD HH:mm:ss.SSS\")").unwrap();
    let expected = NaiveDate::from_ymd_opt(2022, 11, 23)
        .unwrap()
        .and_hms_milli_opt(9, 46, 25, 250)
        .unwrap()
        .and_utc();
    assert_eq!(with_dot, Value::Timestamp(expected));
}

#[test]
fn date_parse_microseconds() {
    let result = eval0("date_parse(\"20221123094625123456\", \"YYYYMMDDHHmmssSSSSSS\")").unwrap();
    let expected = NaiveDate::from_ymd_opt(2022, 11, 23)
        .unwrap()
        .and_hms_micro_opt(9, 46, 25, 123456)
        .unwrap()
        .and_utc();
    assert_eq!(result, Value::Timestamp(expected));
}

#[test]
fn date_parse_failures() {
    assert!(matches!(eval0("date_parse(\"2022-13-01\", \"YYYY-MM-DD\")"), Err(Error::DateParse(_))));
    assert!(matches!(eval0("date_parse(\"garbage\", \"YYYYMMDD\")"), Err(Error::DateParse(_))));
    assert!(matches!(eval0("date_parse(\"2022\")"), Err(Error::IllegalParams(_))));
}

#[test]
fn timestamps_do_not_support_operators() {
    let mut vars = HashMap::new();
    vars.insert("ts".to_string(), Value::Timestamp(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
    assert!(matches!(evaluate("ts == ts", &vars), Err(Error::UnsupportedOperator(_))));
    // As a right operand it is coerced to the left side's type
    assert!(matches!(evaluate("1 == ts", &vars), Err(Error::TypeCoercion(_))));
    assert_eq!(
        evaluate("\"at \" + ts", &vars).unwrap(),
        Value::String(format!("at {}", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()))
    );
}
