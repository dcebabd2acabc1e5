//! Daily-note template placeholders (`{{date}}`, `{{title}}`, `{{date:FORMAT}}`).

use crate::text::moment::format_moment;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\{\s*(date|title)\s*(?::(.*?))?\s*\}\}").expect("valid placeholder regex")
});

/// Renders a template for the note of `date`, whose file name uses
/// `date_format`.
///
/// `{{title}}` and `{{date}}` render with `date_format`; a `:FORMAT` suffix
/// overrides it.
pub fn render_template(template: &str, date: NaiveDate, date_format: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let format = caps
                .get(2)
                .map(|found| found.as_str().trim())
                .filter(|found| !found.is_empty())
                .unwrap_or(date_format);
            format_moment(date, format)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_title_and_formatted_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let template = "# {{title}}\nCreated {{ date:dddd }} ({{DATE}})\n<#dnm>dotw</#dnm>";
        assert_eq!(
            render_template(template, date, "YYYY-MM-DD"),
            "# 2024-03-04\nCreated Monday (2024-03-04)\n<#dnm>dotw</#dnm>"
        );
    }
}
