//! Shared helpers for code emission.

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Lowercase the first character, leaving the rest untouched.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Convert a camelCase or PascalCase name to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Escape a string for inclusion inside a double-quoted literal.
pub fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Join a description and an optional format note into one doc line.
pub fn doc_line(description: Option<&str>, note: Option<&str>) -> Option<String> {
    match (description, note) {
        (Some(d), Some(n)) => Some(format!("{d}. {n}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(n)) => Some(n.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_and_lower_first() {
        assert_eq!(capitalize_first("billEvent"), "BillEvent");
        assert_eq!(lower_first("BillEvent"), "billEvent");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn snake_case_handles_camel_and_acronym_boundaries() {
        assert_eq!(to_snake_case("BillEvent"), "bill_event");
        assert_eq!(to_snake_case("amountInCents"), "amount_in_cents");
        assert_eq!(to_snake_case("BillLineItem"), "bill_line_item");
        assert_eq!(to_snake_case("id"), "id");
    }

    #[test]
    fn escaping_covers_quotes_and_backslashes() {
        assert_eq!(escape_double_quoted(r#"a"b\c"#), r#"a\"b\\c"#);
    }

    #[test]
    fn doc_line_joins_description_and_note() {
        assert_eq!(
            doc_line(Some("Bill date"), Some("ISO 8601 date format (YYYY-MM-DD)")),
            Some("Bill date. ISO 8601 date format (YYYY-MM-DD)".to_string())
        );
        assert_eq!(doc_line(None, None), None);
    }
}
