use chrono::Duration;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_DURATION: Regex = Regex::new(
        r"^(?P<sign>[+-])?P(?:(?P<W>\d+)W|(?:(?P<D>\d+)D)?(?:T(?:(?P<H>\d+)H)?(?:(?P<M>\d+)M)?(?:(?P<S>\d+)S)?)?)$"
    )
    .unwrap();
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("Invalid duration: {0}")]
pub struct InvalidDuration(pub String);

/// Parse an RFC 5545 §3.3.6 DURATION value.
pub fn parse_duration(value: &str) -> Result<Duration, InvalidDuration> {
    let err = || InvalidDuration(value.to_owned());
    let captures = RE_DURATION.captures(value.trim()).ok_or_else(err)?;

    // "P" and "PT" alone match the pattern but carry no component
    let mut any = false;
    let mut part = |name: &str| -> Result<i64, InvalidDuration> {
        match captures.name(name) {
            Some(m) => {
                any = true;
                m.as_str().parse().map_err(|_| err())
            }
            None => Ok(0),
        }
    };
    let weeks = part("W")?;
    let days = part("D")?;
    let hours = part("H")?;
    let minutes = part("M")?;
    let seconds = part("S")?;
    if !any {
        return Err(err());
    }

    let duration = Duration::try_weeks(weeks)
        .zip(Duration::try_days(days))
        .zip(Duration::try_hours(hours))
        .zip(Duration::try_minutes(minutes))
        .zip(Duration::try_seconds(seconds))
        .map(|((((w, d), h), m), s)| w + d + h + m + s)
        .ok_or_else(err)?;
    Ok(match captures.name("sign").map(|m| m.as_str()) {
        Some("-") => -duration,
        _ => duration,
    })
}

/// Format a duration the way RFC 5545 §3.3.6 writes it, preferring whole weeks.
pub fn format_duration(duration: &Duration) -> String {
    let sign = if *duration < Duration::zero() { "-" } else { "" };
    let mut seconds = duration.num_seconds().abs();
    if seconds == 0 {
        return "PT0S".to_owned();
    }
    if seconds % (7 * 86400) == 0 {
        return format!("{sign}P{}W", seconds / (7 * 86400));
    }

    let mut out = format!("{sign}P");
    let days = seconds / 86400;
    seconds %= 86400;
    if days > 0 {
        out += &format!("{days}D");
    }
    if seconds > 0 {
        out.push('T');
        let (hours, minutes) = (seconds / 3600, seconds % 3600 / 60);
        seconds %= 60;
        if hours > 0 {
            out += &format!("{hours}H");
        }
        if minutes > 0 {
            out += &format!("{minutes}M");
        }
        if seconds > 0 {
            out += &format!("{seconds}S");
        }
    }
    out
}
