//! Natural-language date and hour resolution.
//!
//! Free-form date and hour text is resolved against the request's invocation
//! instant. Explicit formats are tried before the natural-language parser,
//! and any failure falls back silently to the anchor. Results are truncated
//! to hour granularity for forecast lookups.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use interim::{parse_date_string, Dialect};
use once_cell::sync::Lazy;
use regex::Regex;

/// "<number>h" hour shorthand, optionally preceded by a language-specific
/// preposition ("à 14h", "at 9h", "um 14h", "a las 9h").
static HOUR_SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:à|at|um|a las|a)?\s*(\d{1,2})\s*h\b").expect("valid regex")
});

/// Relative-word lexicon for the supported language hints. The natural
/// language parser is English-dialect, so localized relative words are
/// rewritten before parsing.
fn translate_relative_words(text: &str, lang: &str) -> String {
    let table: &[(&str, &str)] = match lang {
        "fr" => &[
            ("aujourd'hui", "today"),
            ("demain", "tomorrow"),
            ("hier", "yesterday"),
            ("maintenant", "now"),
            ("dans", "in"),
            ("heures", "hours"),
            ("heure", "hour"),
            ("jours", "days"),
            ("jour", "day"),
        ],
        "de" => &[
            ("heute", "today"),
            ("morgen", "tomorrow"),
            ("gestern", "yesterday"),
            ("jetzt", "now"),
            ("stunden", "hours"),
            ("stunde", "hour"),
            ("tagen", "days"),
            ("tag", "day"),
        ],
        "es" => &[
            ("hoy", "today"),
            ("mañana", "tomorrow"),
            ("ayer", "yesterday"),
            ("ahora", "now"),
            ("en", "in"),
            ("horas", "hours"),
            ("hora", "hour"),
            ("días", "days"),
            ("día", "day"),
        ],
        _ => &[],
    };
    if table.is_empty() {
        return text.to_string();
    }
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            table
                .iter()
                .find(|(from, _)| *from == word)
                .map(|(_, to)| *to)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn dialect_for(lang: &str) -> Dialect {
    let lang = lang.to_lowercase();
    if lang == "us" || lang.starts_with("en-us") {
        Dialect::Us
    } else {
        Dialect::Uk
    }
}

/// Normalize hour text: "<number>h" shorthand becomes "HH:00", anything else
/// passes through trimmed. Empty input yields `None`.
pub fn normalize_hour_text(hour: &str) -> Option<String> {
    let trimmed = hour.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(caps) = HOUR_SHORTHAND.captures(trimmed) {
        if let Ok(hour) = caps[1].parse::<u32>() {
            if hour < 24 {
                return Some(format!("{:02}:00", hour));
            }
        }
    }
    Some(trimmed.to_string())
}

/// Parse "HH:MM"-shaped (or bare "HHMM") clock text.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        return Some(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M:%S") {
        return Some(time);
    }
    // Bare digit strings: "1400", "930"
    if (3..=4).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let padded = format!("{:0>4}", trimmed);
        let hour: u32 = padded[..2].parse().ok()?;
        let minute: u32 = padded[2..].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    None
}

fn explicit_date(text: &str) -> Option<NaiveDate> {
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

fn explicit_datetime(text: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%d/%m/%Y %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime);
        }
    }
    None
}

/// Resolve free-form date text to a concrete instant, `None` when nothing
/// parses. No anchor fallback here; callers decide what absence means.
pub fn resolve_date(text: &str, lang: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = explicit_date(trimmed) {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Some(datetime) = explicit_datetime(trimmed) {
        return Some(datetime.and_utc());
    }
    let translated = translate_relative_words(trimmed, lang);
    parse_date_string(&translated, anchor, dialect_for(lang)).ok()
}

/// Resolve free-form date and hour text against the invocation anchor.
///
/// The hour text is normalized first; a clock-shaped hour overrides the hour
/// of whatever date resolves. Unparseable input falls back silently to the
/// anchor. The result is truncated to the hour.
pub fn resolve_datetime(
    date: Option<&str>,
    hour: Option<&str>,
    lang: &str,
    anchor: DateTime<Utc>,
) -> DateTime<Utc> {
    let normalized_hour = hour.and_then(normalize_hour_text);
    let clock = normalized_hour.as_deref().and_then(parse_clock_time);
    let date_text = date.map(str::trim).filter(|s| !s.is_empty());

    let resolved_date = match (date_text, normalized_hour.as_deref()) {
        (Some(d), Some(h)) if clock.is_none() => {
            // Hour text was not clock-shaped; let the parser see both.
            resolve_date(&format!("{} {}", d, h), lang, anchor).unwrap_or(anchor)
        }
        (Some(d), _) => resolve_date(d, lang, anchor).unwrap_or(anchor),
        (None, Some(h)) if clock.is_none() => resolve_date(h, lang, anchor).unwrap_or(anchor),
        (None, _) => anchor,
    };

    let resolved = match clock {
        Some(time) => resolved_date.date_naive().and_time(time).and_utc(),
        None => resolved_date,
    };
    truncate_to_hour(resolved)
}

/// Resolve free-form hour text to an "HHMM" key for hour-keyed upstream
/// records. Falls back to zero-padding the raw digits.
pub fn resolve_hour_key(hour: &str, lang: &str, anchor: DateTime<Utc>) -> String {
    let normalized = normalize_hour_text(hour).unwrap_or_default();
    if let Some(time) = parse_clock_time(&normalized) {
        return format!("{:02}00", time.hour());
    }
    let translated = translate_relative_words(&normalized, lang);
    if let Ok(parsed) = parse_date_string(&translated, anchor, dialect_for(lang)) {
        return format!("{:02}00", parsed.hour());
    }
    format!("{:0>4}", normalized.replace(':', ""))
}

/// Hour-granularity timestamp key used for forecast lookups.
pub fn target_hour_string(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:00").to_string()
}

fn truncate_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_minute(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(instant)
}
