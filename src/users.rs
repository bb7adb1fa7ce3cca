/// Derive a display user from a raw credential string.
///
/// Two naming conventions are recognized, tried in order:
///
/// 1. `claude_code_key_<first>-<last>_<suffix>` — strip the prefix, take the
///    segment before the next underscore, turn the first hyphen into a space.
///    `"claude_code_key_alice-smith_xyz"` → `"alice smith"`
/// 2. `<first>-<last>-api-key` — drop the `-api-key` marker, turn the first
///    remaining hyphen into a space.
///    `"bob-api-key"` → `"bob"`
///
/// Anything else passes through unchanged. Distinct raw credentials that
/// extract to the same display user are merged downstream on purpose: the
/// summary is a per-person view, not a per-key audit.
pub fn extract_user(api_key: &str) -> String {
    if let Some(rest) = api_key.strip_prefix("claude_code_key_") {
        let user_part = rest.split('_').next().unwrap_or(rest);
        return user_part.replacen('-', " ", 1);
    }
    if api_key.contains("-api-key") {
        return api_key.replacen("-api-key", "", 1).replacen('-', " ", 1);
    }
    api_key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_code_key_convention() {
        assert_eq!(extract_user("claude_code_key_alice-smith_xyz"), "alice smith");
    }

    #[test]
    fn api_key_suffix_convention() {
        assert_eq!(extract_user("bob-api-key"), "bob");
        assert_eq!(extract_user("carol-jones-api-key"), "carol jones");
    }

    #[test]
    fn unrecognized_credential_passes_through() {
        assert_eq!(extract_user("plainkey123"), "plainkey123");
    }

    #[test]
    fn only_first_hyphen_becomes_a_space() {
        // Double-barrelled surnames keep their hyphen.
        assert_eq!(
            extract_user("claude_code_key_anna-maria-lee_99"),
            "anna maria-lee"
        );
    }
}
