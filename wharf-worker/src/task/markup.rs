//! Change-list derivation from free-form text
//!
//! Release notes arrive as lightweight markup. An itemized list wins,
//! then paragraphs, then a single fallback entry; the derived list is
//! never empty.

/// Change string used when the text yields nothing usable.
pub const FALLBACK_CHANGE: &str = "Version Bump";

/// Derives discrete change strings from a free-form description.
pub fn derive_changes(text: &str) -> Vec<String> {
    let items = list_items(text);
    if !items.is_empty() {
        return items;
    }

    let paragraphs = paragraphs(text);
    if !paragraphs.is_empty() {
        return paragraphs;
    }

    vec![FALLBACK_CHANGE.to_string()]
}

/// Items of an itemized list, trimmed of markup, in document order.
fn list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .or_else(|| line.strip_prefix("+ "))
        })
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Paragraphs joined to single lines, in document order.
fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|block| {
            block
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_items_one_per_entry_in_order() {
        let text = "Highlights:\n\n- Fixed the crash\n- Faster startup\n* New icon";
        assert_eq!(
            derive_changes(text),
            vec!["Fixed the crash", "Faster startup", "New icon"]
        );
    }

    #[test]
    fn test_list_wins_over_paragraphs() {
        let text = "This release is big.\n\n- Only this item counts";
        assert_eq!(derive_changes(text), vec!["Only this item counts"]);
    }

    #[test]
    fn test_paragraphs_become_changes() {
        let text = "Fixed the crash\non startup.\n\nFaster rendering.";
        assert_eq!(
            derive_changes(text),
            vec!["Fixed the crash on startup.", "Faster rendering."]
        );
    }

    #[test]
    fn test_single_line_is_one_paragraph() {
        assert_eq!(derive_changes("Fixed a thing"), vec!["Fixed a thing"]);
    }

    #[test]
    fn test_blank_text_falls_back() {
        assert_eq!(derive_changes(""), vec![FALLBACK_CHANGE]);
        assert_eq!(derive_changes("   \n\n  \n"), vec![FALLBACK_CHANGE]);
    }
}
