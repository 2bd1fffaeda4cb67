//! .NET `TimeSpan` text form, `[-][d.]hh:mm:ss[.fffffff]`
//!
//! Statistics endpoints may report uptime either as a millisecond count or
//! in this form. Both end up as milliseconds.

const TICKS_PER_MILLISECOND: i64 = 10_000;
const FRACTION_DIGITS: usize = 7;

/// Parse a `TimeSpan` string into milliseconds
///
/// Sub-millisecond ticks are truncated. Returns `None` for anything that is
/// not a well-formed `TimeSpan` or that overflows an `i64`.
pub fn parse_timespan(input: &str) -> Option<i64> {
    let input = input.trim();
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let mut parts = body.split(':');
    let (days_hours, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let (days, hours) = match days_hours.split_once('.') {
        Some((days, hours)) => (parse_digits(days)?, parse_field(hours, 23)?),
        None => (0, parse_field(days_hours, 23)?),
    };
    let minutes = parse_field(minutes, 59)?;

    let (seconds, fraction) = match seconds.split_once('.') {
        Some((seconds, fraction)) => (seconds, Some(fraction)),
        None => (seconds, None),
    };
    let seconds = parse_field(seconds, 59)?;
    let fraction_ms = match fraction {
        Some(fraction) => parse_fraction(fraction)? / TICKS_PER_MILLISECOND,
        None => 0,
    };

    let total = days
        .checked_mul(24)?
        .checked_add(hours)?
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)?
        .checked_add(fraction_ms)?;

    Some(if negative { -total } else { total })
}

/// Format milliseconds as a `TimeSpan` string
///
/// The fraction is only written when the value is not a whole second.
pub fn format_timespan(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let millis = millis.unsigned_abs();

    let fraction = millis % 1000;
    let total_secs = millis / 1000;
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::from(sign);
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if fraction > 0 {
        out.push_str(&format!(".{:07}", fraction * TICKS_PER_MILLISECOND as u64));
    }
    out
}

fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_field(text: &str, max: i64) -> Option<i64> {
    if text.len() > 2 {
        return None;
    }
    parse_digits(text).filter(|value| *value <= max)
}

/// Fractional seconds as ticks (100ns units)
fn parse_fraction(text: &str) -> Option<i64> {
    if text.len() > FRACTION_DIGITS {
        return None;
    }
    let digits = parse_digits(text)?;
    Some(digits * 10_i64.pow((FRACTION_DIGITS - text.len()) as u32))
}
