//! Pointcut glob matching.
//!
//! The pattern language is literal characters plus `*`, which matches zero
//! or more characters. No character classes, no escaping.

/// Match a function name against a pointcut pattern.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }

    // Prefix patterns (`test_*`) are the overwhelmingly common case.
    if let Some(prefix) = pattern.strip_suffix('*')
        && !prefix.contains('*')
    {
        return name.starts_with(prefix);
    }

    match_from(pattern.as_bytes(), name.as_bytes())
}

fn match_from(pattern: &[u8], name: &[u8]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((b'*', rest)) => (0..=name.len()).any(|skip| match_from(rest, &name[skip..])),
        Some((byte, rest)) => name.first() == Some(byte) && match_from(rest, &name[1..]),
    }
}
