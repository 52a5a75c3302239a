//! Date helper functions

use chrono::{DateTime, Locale, TimeZone, Utc};
use chrono_tz::Tz;

/// Format a date using a Moment.js-style pattern in the given locale
///
/// # Examples
/// ```ignore
/// format_date(&date, "D MMM YYYY", Locale::pt_BR) // -> "25 mar 2021"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, format: &str, locale: Locale) -> String
where
    Z::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format_localized(&chrono_format, locale).to_string()
}

/// Format a publication timestamp in the site timezone
pub fn format_in_timezone<Z: TimeZone>(
    date: &DateTime<Z>,
    format: &str,
    locale: Locale,
    timezone: Option<Tz>,
) -> String
where
    Z::Offset: std::fmt::Display,
{
    match timezone {
        Some(tz) => format_date(&date.with_timezone(&tz), format, locale),
        None => format_date(&date.with_timezone(&Utc), format, locale),
    }
}

/// Resolve a locale name such as `pt_BR`, falling back to `en_US`
pub fn parse_locale(name: &str) -> Locale {
    Locale::try_from(name).unwrap_or_else(|_| {
        tracing::warn!("Unknown locale {:?}, using en_US", name);
        Locale::en_US
    })
}

/// Resolve an IANA timezone name; empty means UTC
pub fn parse_timezone(name: &str) -> Option<Tz> {
    if name.trim().is_empty() {
        return None;
    }
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            tracing::warn!("Unknown timezone {:?}, using UTC", name);
            None
        }
    }
}

/// The twelve abbreviated month names (`MMM`) of a locale, January first
pub fn month_abbreviations(locale: Locale) -> Vec<String> {
    month_names(locale, "%b")
}

/// The twelve full month names (`MMMM`) of a locale
pub fn month_full_names(locale: Locale) -> Vec<String> {
    month_names(locale, "%B")
}

fn month_names(locale: Locale, spec: &str) -> Vec<String> {
    (1..=12)
        .filter_map(|month| Utc.with_ymd_and_hms(2000, month, 1, 12, 0, 0).single())
        .map(|date| date.format_localized(spec, locale).to_string())
        .collect()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each letter
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
        // Hour
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
        // Timezone
        ("ZZ", "%z"),
        // Milliseconds
        ("SSS", "%3f"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn sample() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2021-03-25T19:25:28+00:00").unwrap()
    }

    #[test]
    fn test_format_date_pt_br() {
        assert_eq!(
            format_date(&sample(), "D MMM YYYY", Locale::pt_BR),
            "25 mar 2021"
        );
    }

    #[test]
    fn test_single_digit_day_is_not_padded() {
        let date = DateTime::parse_from_rfc3339("2021-04-05T12:00:00+00:00").unwrap();
        assert_eq!(format_date(&date, "D MMM YYYY", Locale::pt_BR), "5 abr 2021");
        assert_eq!(format_date(&date, "DD/MM/YYYY", Locale::pt_BR), "05/04/2021");
    }

    #[test]
    fn test_timezone_shifts_day() {
        let date = DateTime::parse_from_rfc3339("2021-03-26T01:00:00+00:00").unwrap();
        let tz = parse_timezone("America/Sao_Paulo");
        assert!(tz.is_some());
        assert_eq!(
            format_in_timezone(&date, "D MMM YYYY", Locale::pt_BR, tz),
            "25 mar 2021"
        );
        assert_eq!(
            format_in_timezone(&date, "D MMM YYYY", Locale::pt_BR, None),
            "26 mar 2021"
        );
    }

    #[test]
    fn test_month_abbreviations() {
        let months = month_abbreviations(Locale::pt_BR);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], "jan");
        assert_eq!(months[1], "fev");
        assert_eq!(months[11], "dez");
        assert_eq!(month_full_names(Locale::pt_BR)[2], "março");
    }

    #[test]
    fn test_parse_locale_and_timezone() {
        assert_eq!(parse_locale("pt_BR"), Locale::pt_BR);
        assert_eq!(parse_locale("not_a_locale"), Locale::en_US);
        assert!(parse_timezone("").is_none());
        assert!(parse_timezone("Mars/Olympus").is_none());
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("D MMM YYYY"), "%-d %b %Y");
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
