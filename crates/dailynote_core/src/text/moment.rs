//! Moment-style date patterns (`YYYY-MM-DD`, `dddd, MMMM Do`, ...).
//!
//! Daily-note users write date formats in the moment.js token language, both
//! for note file names and for `<#dnm>date:FORMAT</#dnm>` modifiers. This
//! module renders and parses that language on top of `chrono`.
//!
//! # Invariants
//! - Unknown characters are emitted verbatim; `[...]` escapes literal text.
//! - Rendering never fails; parsing returns `None` for patterns or inputs it
//!   cannot map to a calendar date.

use chrono::{Datelike, Days, NaiveDate};

/// Tokens ordered so that longer tokens win over their prefixes.
const TOKENS: &[&str] = &[
    "YYYY", "YY", "Q", "MMMM", "MMM", "MM", "M", "DDDD", "DDD", "DD", "Do", "D", "dddd", "ddd",
    "dd", "d", "E", "e", "ww", "w", "WW", "W", "gggg", "GGGG", "X", "x", "HH", "H", "hh", "h", "mm",
    "m", "ss", "s", "A", "a",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Token(&'a str),
    Literal(&'a str),
}

fn tokenize(pattern: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = pattern;

    while let Some(first) = rest.chars().next() {
        if first == '[' {
            if let Some(close) = rest.find(']') {
                pieces.push(Piece::Literal(&rest[1..close]));
                rest = &rest[close + 1..];
                continue;
            }
        }

        if let Some(token) = TOKENS.iter().find(|token| rest.starts_with(**token)) {
            pieces.push(Piece::Token(*token));
            rest = &rest[token.len()..];
            continue;
        }

        let width = first.len_utf8();
        pieces.push(Piece::Literal(&rest[..width]));
        rest = &rest[width..];
    }

    pieces
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn render_token(date: NaiveDate, token: &str) -> String {
    match token {
        "YYYY" => format!("{:04}", date.year()),
        "YY" => format!("{:02}", date.year().rem_euclid(100)),
        "Q" => ((date.month0() / 3) + 1).to_string(),
        "MMMM" => date.format("%B").to_string(),
        "MMM" => date.format("%b").to_string(),
        "MM" => format!("{:02}", date.month()),
        "M" => date.month().to_string(),
        "DDDD" => format!("{:03}", date.ordinal()),
        "DDD" => date.ordinal().to_string(),
        "DD" => format!("{:02}", date.day()),
        "Do" => format!("{}{}", date.day(), ordinal_suffix(date.day())),
        "D" => date.day().to_string(),
        "dddd" => date.format("%A").to_string(),
        "ddd" => date.format("%a").to_string(),
        "dd" => date.format("%a").to_string().chars().take(2).collect(),
        "d" | "e" => date.weekday().num_days_from_sunday().to_string(),
        "E" => date.weekday().number_from_monday().to_string(),
        "ww" => format!("{:02}", locale_week(date).1),
        "w" => locale_week(date).1.to_string(),
        "gggg" => format!("{:04}", locale_week(date).0),
        "WW" => format!("{:02}", date.iso_week().week()),
        "W" => date.iso_week().week().to_string(),
        "GGGG" => format!("{:04}", date.iso_week().year()),
        "X" => midnight_timestamp_millis(date).div_euclid(1000).to_string(),
        "x" => midnight_timestamp_millis(date).to_string(),
        // Dates carry no time of day; render midnight.
        "HH" | "mm" | "ss" => "00".to_string(),
        "H" | "m" | "s" => "0".to_string(),
        "hh" | "h" => "12".to_string(),
        "A" => "AM".to_string(),
        "a" => "am".to_string(),
        other => other.to_string(),
    }
}

/// English-locale week-year and week: weeks start on Sunday and week 1 is the
/// one containing January 1st.
fn locale_week(date: NaiveDate) -> (i32, u32) {
    let to_saturday = 6 - u64::from(date.weekday().num_days_from_sunday());
    let saturday = date.checked_add_days(Days::new(to_saturday)).unwrap_or(date);
    (saturday.year(), saturday.ordinal0() / 7 + 1)
}

fn midnight_timestamp_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map_or(0, |midnight| midnight.and_utc().timestamp_millis())
}

/// Renders `date` with a moment-style `pattern`.
pub fn format_moment(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    for piece in tokenize(pattern) {
        match piece {
            Piece::Token(token) => out.push_str(&render_token(date, token)),
            Piece::Literal(text) => out.push_str(text),
        }
    }
    out
}

/// Translates a moment pattern into a `chrono` parse pattern.
///
/// Returns `None` when the pattern uses a token that cannot be parsed back
/// into a date (ordinals, quarters, timestamps, ...).
pub fn to_chrono_pattern(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len() * 2);
    for piece in tokenize(pattern) {
        match piece {
            Piece::Token(token) => out.push_str(match token {
                "YYYY" => "%Y",
                "YY" => "%y",
                "MMMM" => "%B",
                "MMM" => "%b",
                "MM" | "M" => "%m",
                "DD" | "D" => "%d",
                "dddd" => "%A",
                "ddd" => "%a",
                _ => return None,
            }),
            Piece::Literal(text) => {
                for ch in text.chars() {
                    if ch == '%' {
                        out.push_str("%%");
                    } else {
                        out.push(ch);
                    }
                }
            }
        }
    }
    Some(out)
}

/// Parses `text` written with a moment-style `pattern`.
pub fn parse_moment(text: &str, pattern: &str) -> Option<NaiveDate> {
    let chrono_pattern = to_chrono_pattern(pattern)?;
    NaiveDate::parse_from_str(text, &chrono_pattern).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn renders_common_daily_note_patterns() {
        let date = day(2024, 3, 4);
        assert_eq!(format_moment(date, "YYYY"), "2024");
        assert_eq!(format_moment(date, "YYYY-MM-DD"), "2024-03-04");
        assert_eq!(format_moment(date, "dddd, MMMM Do"), "Monday, March 4th");
        assert_eq!(format_moment(date, "ddd D MMM YY"), "Mon 4 Mar 24");
        assert_eq!(format_moment(date, "[Week] WW, Q"), "Week 10, 1");
        assert_eq!(format_moment(date, "gggg-[W]ww"), "2024-W10");
        assert_eq!(format_moment(day(2024, 1, 6), "w"), "1");
        assert_eq!(format_moment(day(2024, 1, 7), "w"), "2");
    }

    #[test]
    fn locale_week_year_follows_the_saturday_of_the_week() {
        let sunday = day(2024, 12, 29);
        assert_eq!(format_moment(sunday, "gggg w"), "2025 1");
        assert_eq!(format_moment(sunday, "GGGG WW"), "2024 52");
        assert_eq!(format_moment(day(2022, 12, 31), "gggg ww"), "2022 53");
    }

    #[test]
    fn ordinal_suffixes_follow_english_rules() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23]
            .into_iter()
            .map(|d| format_moment(day(2024, 1, d), "Do"))
            .collect();
        assert_eq!(
            rendered,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd"]
        );
    }

    #[test]
    fn bracketed_text_and_unknown_characters_pass_through() {
        assert_eq!(format_moment(day(2024, 3, 4), "[Today is] dddd!"), "Today is Monday!");
        assert_eq!(format_moment(day(2024, 3, 4), "YYYY/MM/DD"), "2024/03/04");
    }

    #[test]
    fn weekday_numbers_use_sunday_zero_and_iso_one() {
        let sunday = day(2024, 3, 3);
        assert_eq!(format_moment(sunday, "d"), "0");
        assert_eq!(format_moment(sunday, "E"), "7");
        assert_eq!(format_moment(sunday, "dd"), "Su");
    }

    #[test]
    fn parses_file_names_written_with_a_pattern() {
        assert_eq!(parse_moment("2024-03-04", "YYYY-MM-DD"), Some(day(2024, 3, 4)));
        assert_eq!(parse_moment("04.03.2024", "DD.MM.YYYY"), Some(day(2024, 3, 4)));
        assert_eq!(parse_moment("notes", "YYYY-MM-DD"), None);
        assert_eq!(parse_moment("4th", "Do"), None);
    }
}
