//! Cross-language identifier sanitization

/// Turn an arbitrary string into an identifier that is valid in every
/// code-generation target: every character outside `[A-Za-z0-9_]` becomes
/// an underscore.
///
/// Pure and total; the output is non-empty whenever the input is.
/// Idempotent, since the output contains only characters the map keeps.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize("get_/users/{id}"), "get__users__id_");
    }

    #[test]
    fn test_sanitize_keeps_valid_identifiers() {
        assert_eq!(sanitize("getUser"), "getUser");
        assert_eq!(sanitize("list_users_v2"), "list_users_v2");
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize("Pet Store API"), "Pet_Store_API");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for input in ["get_/users/{id}", "a-b.c d/e", "héllo", "already_clean"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }
}
