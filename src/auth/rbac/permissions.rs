//! Wildcard matching for permissions, models and features

/// `*` grants everything; `category:*` grants every action in `category`
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == "*" || granted == required {
        return true;
    }
    match granted.strip_suffix(":*") {
        Some(category) => required
            .split_once(':')
            .is_some_and(|(req_category, _)| req_category == category),
        None => false,
    }
}

/// `*` matches everything; a trailing `*` matches by prefix; anything else must be equal
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

pub fn any_matches(patterns: &[String], value: &str) -> bool {
    patterns.iter().any(|p| pattern_matches(p, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_wildcards() {
        assert!(permission_matches("*", "gateway:status"));
        assert!(permission_matches("gateway:*", "gateway:status"));
        assert!(permission_matches("gateway:status", "gateway:status"));
        assert!(!permission_matches("gateway:*", "usage:read"));
        assert!(!permission_matches("gateway:read", "gateway:status"));
        assert!(!permission_matches("gateway:*", "gateway"));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("gpt-4*", "gpt-4o"));
        assert!(!pattern_matches("gpt-4*", "gpt-3.5-turbo"));
        assert!(pattern_matches("gpt-3.5-turbo", "gpt-3.5-turbo"));
        assert!(!pattern_matches("gpt-3.5-turbo", "gpt-3.5-turbo-16k"));
    }
}
