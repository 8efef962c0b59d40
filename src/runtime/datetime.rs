use crate::ast::Expr;
use crate::custom::CustomFunction;
use crate::error::Error;
use crate::runtime::type_casting::to_string;
use crate::runtime::Scope;
use crate::types::Value;
use chrono::format::ParseErrorKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Human-readable format tokens and their strftime equivalents, longest first
/// so a nine-digit fraction is never taken for a three-digit one.
const DATE_TOKENS: &[(&str, &str)] = &[
    ("SSSSSSSSS", "%.9f"),
    ("SSSSSS", "%.6f"),
    ("SSS", "%.3f"),
    ("YYYY", "%Y"),
    ("yyyy", "%Y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// Rewrites a human-readable format into a strftime pattern and aligns the date text with it.
///
/// Fractional-second specifiers consume a leading '.', so a fraction token that is not
/// already preceded by a literal '.' gets one inserted into the date text at the token's
/// offset. Every recognised token spans exactly as many characters as the digits it
/// matches, which keeps format offsets and date offsets in step.
pub fn translate_format(format: &str, date: &str) -> Result<(String, String), Error> {
    let mut pattern = String::with_capacity(format.len() * 2);
    let mut date = date.to_string();
    let mut inserted = 0usize;
    let mut i = 0usize;

    'scan: while i < format.len() {
        let rest = &format[i..];
        for (token, spec) in DATE_TOKENS {
            if !rest.starts_with(token) {
                continue;
            }
            if spec.starts_with("%.") {
                if format[..i].ends_with('.') {
                    pattern.pop();
                } else {
                    let at = i + inserted;
                    if at > date.len() || !date.is_char_boundary(at) {
                        return Err(Error::date_parse(format!(
                            "date {:?} is too short for format {:?}",
                            date, format
                        )));
                    }
                    date.insert(at, '.');
                    inserted += 1;
                }
            }
            pattern.push_str(spec);
            i += token.len();
            continue 'scan;
        }

        let Some(ch) = rest.chars().next() else { break };
        if ch == '%' {
            pattern.push_str("%%");
        } else {
            pattern.push(ch);
        }
        i += ch.len_utf8();
    }

    Ok((pattern, date))
}

/// Parses against a strftime pattern; missing time defaults to midnight and a
/// missing date to 0000-01-01, all in UTC.
pub fn parse_timestamp(date: &str, pattern: &str) -> Result<DateTime<Utc>, Error> {
    let failed = |e: chrono::ParseError| {
        Error::date_parse(format!("cannot parse {:?} with {:?}: {}", date, pattern, e))
    };

    match NaiveDateTime::parse_from_str(date, pattern) {
        Ok(dt) => Ok(dt.and_utc()),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => {
            if let Ok(d) = NaiveDate::parse_from_str(date, pattern) {
                return Ok(d.and_time(NaiveTime::MIN).and_utc());
            }
            if let Ok(t) = NaiveTime::parse_from_str(date, pattern) {
                let epoch = NaiveDate::from_ymd_opt(0, 1, 1)
                    .ok_or_else(|| Error::date_parse("year 0 is out of range"))?;
                return Ok(epoch.and_time(t).and_utc());
            }
            Err(failed(e))
        }
        Err(e) => Err(failed(e)),
    }
}

pub struct DateParse;

impl CustomFunction for DateParse {
    fn name(&self) -> &str { "date_parse" }
    fn min_args(&self) -> usize { 2 }
    fn max_args(&self) -> Option<usize> { Some(2) }

    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let date = to_string(&scope.eval(&args[0])?);
        let format = to_string(&scope.eval(&args[1])?);
        let (pattern, date) = translate_format(&format, &date)?;
        tracing::trace!(%pattern, %date, "date_parse");
        parse_timestamp(&date, &pattern).map(Value::Timestamp)
    }

    fn description(&self) -> Option<&str> {
        Some("date_parse(date, format): parse date text using YYYY MM DD HH mm ss SSS tokens")
    }
}
