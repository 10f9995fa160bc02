//! Reverse domain name handling

/// Folds an identifier into the package-name alphabet.
///
/// Case-folds the input and replaces every character outside
/// `[a-z0-9.+-]` with the delimiter.
pub fn sanitize(rdnn: &str, delimiter: char) -> String {
    rdnn.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '+' | '-' => c,
            _ => delimiter,
        })
        .collect()
}

/// Derives a reverse domain name from a repository URL.
///
/// `https://github.com/acme/app.git` becomes `com.github.acme.app`.
/// Used when a submission does not carry its own identifier.
pub fn from_repository(url: &str) -> String {
    let trimmed = url
        .trim()
        .trim_end_matches('/')
        .trim_end_matches(".git");
    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => trimmed,
    };
    let without_auth = without_scheme
        .rsplit_once('@')
        .map(|(_, rest)| rest)
        .unwrap_or(without_scheme);

    let mut segments = without_auth.split('/');
    let first = segments.next().unwrap_or_default();

    // scp-style URLs separate host and path with a colon; a numeric
    // remainder is a port instead.
    let (host, first_path) = match first.split_once(':') {
        Some((host, rest)) if rest.parse::<u16>().is_err() => (host, Some(rest)),
        Some((host, _)) => (host, None),
        None => (first, None),
    };

    let mut parts: Vec<&str> = host.split('.').rev().collect();
    parts.extend(first_path.into_iter().filter(|s| !s.is_empty()));
    parts.extend(segments.filter(|s| !s.is_empty()));

    sanitize(&parts.join("."), '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_case_folds() {
        assert_eq!(sanitize("com.github.App", '-'), "com.github.app");
    }

    #[test]
    fn test_sanitize_replaces_invalid_characters() {
        assert_eq!(sanitize("com.acme.my_app", '-'), "com.acme.my-app");
        assert_eq!(sanitize("com.acme.caf\u{e9}", '-'), "com.acme.caf-");
    }

    #[test]
    fn test_sanitize_keeps_allowed_punctuation() {
        assert_eq!(sanitize("lib.c++.v2-rc.1", '-'), "lib.c++.v2-rc.1");
    }

    #[test]
    fn test_from_repository() {
        assert_eq!(
            from_repository("https://github.com/acme/app.git"),
            "com.github.acme.app"
        );
        assert_eq!(from_repository("https://example/git/app"), "example.git.app");
        assert_eq!(
            from_repository("git@github.com:acme/app.git"),
            "com.github.acme.app"
        );
    }
}
