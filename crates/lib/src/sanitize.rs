//! # SQL Sanitization
//!
//! Models frequently wrap their answer in a markdown code fence even when told
//! not to. This strips the fence so the remaining text can be executed. No SQL
//! validation happens here.

/// Strips a leading code-fence opener (with an optional language tag) and a
/// trailing fence marker, along with surrounding whitespace.
pub fn strip_sql_fences(raw: &str) -> String {
    let mut sql = raw.trim();

    if let Some(rest) = sql.strip_prefix("```") {
        // The language tag, if any, runs to the end of the opener line.
        sql = match rest.find('\n') {
            Some(newline) if is_language_tag(&rest[..newline]) => &rest[newline + 1..],
            None if is_language_tag(rest) => "",
            _ => rest,
        };
        // A tag on the same line as the query, e.g. "```sql SELECT 1```".
        if let Some(after_tag) = strip_tag_prefix(sql) {
            sql = after_tag;
        }
    }

    sql = sql.trim_end();
    if let Some(rest) = sql.strip_suffix("```") {
        sql = rest;
    }

    sql.trim().to_string()
}

fn is_language_tag(s: &str) -> bool {
    let tag = s.trim();
    tag.is_empty() || tag.chars().all(|c| c.is_ascii_alphanumeric())
}

fn strip_tag_prefix(s: &str) -> Option<&str> {
    let head = s.get(..4)?;
    if head.eq_ignore_ascii_case("sql ") {
        Some(&s[4..])
    } else {
        None
    }
}
