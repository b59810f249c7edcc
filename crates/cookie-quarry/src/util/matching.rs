//! Name and domain matching shared by every strategy, so one spec
//! behaves identically against SQL-backed and in-memory stores.

/// `%`, `*`, and the empty string all mean "match everything".
pub fn is_wildcard(pattern: &str) -> bool {
    matches!(pattern.trim(), "" | "%" | "*")
}

/// SQL-LIKE subset used for in-memory name matching: `%` matches any
/// run of characters, everything else is literal. A pattern without `%`
/// is an exact match.
pub fn like_matches(pattern: &str, value: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let v: Vec<char> = value.chars().collect();

    let (mut pi, mut vi) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while vi < v.len() {
        if pi < p.len() && p[pi] == '%' {
            star = Some(pi);
            mark = vi;
            pi += 1;
        } else if pi < p.len() && p[pi] == v[vi] {
            pi += 1;
            vi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            vi = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '%' {
        pi += 1;
    }
    pi == p.len()
}

pub fn name_matches(pattern: &str, name: &str) -> bool {
    is_wildcard(pattern) || like_matches(pattern, name)
}

/// Domain rule: wildcard matches all; otherwise both sides drop any
/// leading dot and the stored domain must contain the query domain as a
/// substring. Comparison is case-insensitive, as host names are.
pub fn domain_matches(query: &str, stored: &str) -> bool {
    if is_wildcard(query) {
        return true;
    }
    let query = strip_leading_dot(query).to_lowercase();
    let stored = strip_leading_dot(stored).to_lowercase();
    stored.contains(&query)
}

pub fn strip_leading_dot(domain: &str) -> &str {
    domain.strip_prefix('.').unwrap_or(domain)
}

/// LIKE pattern bound as `?1` in the store SELECTs. `*` maps to the SQL
/// wildcard; any other pattern passes through so callers may embed `%`
/// themselves.
pub fn sql_name_pattern(name: &str) -> String {
    if is_wildcard(name) {
        "%".to_string()
    } else {
        name.to_string()
    }
}

/// LIKE pattern bound as `?2`. Substring semantics, so the stored
/// host's leading dot never defeats the match; the precise rule is
/// re-applied in memory via [`domain_matches`].
pub fn sql_domain_pattern(domain: &str) -> String {
    if is_wildcard(domain) {
        "%".to_string()
    } else {
        format!("%{}%", strip_leading_dot(domain))
    }
}
