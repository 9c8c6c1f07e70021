//! Named sections embedded in free-form text.
//!
//! A section is delimited by `<!-- SECTION: title -->` and
//! `<!-- END SECTION: title -->`. Markers are matched as literal text, so
//! titles may contain any characters. Everything outside the markers is
//! left untouched.

fn start_marker(title: &str) -> String {
    format!("<!-- SECTION: {title} -->")
}

fn end_marker(title: &str) -> String {
    format!("<!-- END SECTION: {title} -->")
}

/// The canonical block written for `title`.
pub fn wrap_section(title: &str, body: &str) -> String {
    format!("{}\n{}\n{}", start_marker(title), body, end_marker(title))
}

/// Byte ranges `(block_start, inner_start, inner_end, block_end)` of every
/// section titled `title`, scanning left to right and pairing each start
/// marker with the nearest following end marker.
fn locate(text: &str, title: &str) -> Vec<(usize, usize, usize, usize)> {
    let start = start_marker(title);
    let end = end_marker(title);

    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(found) = text[pos..].find(&start) {
        let block_start = pos + found;
        let inner_start = block_start + start.len();
        let Some(found_end) = text[inner_start..].find(&end) else {
            break;
        };
        let inner_end = inner_start + found_end;
        let block_end = inner_end + end.len();
        spans.push((block_start, inner_start, inner_end, block_end));
        pos = block_end;
    }
    spans
}

/// Replaces every `title` section in `text` with `body`, or appends a new
/// section separated by a blank line when none exists.
///
/// Applying the same patch twice yields the same text.
pub fn patch_section(text: &str, title: &str, body: &str) -> String {
    let block = wrap_section(title, body);
    let spans = locate(text, title);

    if spans.is_empty() {
        return format!("{text}\n\n{block}");
    }

    let mut out = String::with_capacity(text.len() + block.len());
    let mut pos = 0;
    for (block_start, _, _, block_end) in spans {
        out.push_str(&text[pos..block_start]);
        out.push_str(&block);
        pos = block_end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Inner content of the first `title` section, without the line breaks
/// that follow the start marker and precede the end marker.
pub fn extract_section<'a>(text: &'a str, title: &str) -> Option<&'a str> {
    let (_, inner_start, inner_end, _) = *locate(text, title).first()?;
    let inner = &text[inner_start..inner_end];
    let inner = inner.strip_prefix('\n').unwrap_or(inner);
    let inner = inner.strip_suffix('\n').unwrap_or(inner);
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_when_section_is_absent() {
        assert_eq!(
            patch_section("Hello", "X", "World"),
            "Hello\n\n<!-- SECTION: X -->\nWorld\n<!-- END SECTION: X -->"
        );
    }

    #[test]
    fn append_keeps_existing_text_as_prefix() {
        let text = "Intro\n\n<!-- SECTION: other -->\nkeep\n<!-- END SECTION: other -->";
        let out = patch_section(text, "mine", "body");
        assert!(out.starts_with(text));
        assert_eq!(out.matches("<!-- SECTION: mine -->").count(), 1);
    }

    #[test]
    fn replaces_only_the_named_section() {
        let text = "before\n<!-- SECTION: a -->\nold\n<!-- END SECTION: a -->\nmiddle\n<!-- SECTION: b -->\nother\n<!-- END SECTION: b -->\nafter";
        let out = patch_section(text, "a", "new");
        assert_eq!(
            out,
            "before\n<!-- SECTION: a -->\nnew\n<!-- END SECTION: a -->\nmiddle\n<!-- SECTION: b -->\nother\n<!-- END SECTION: b -->\nafter"
        );
    }

    #[test]
    fn same_titled_sections_are_replaced_independently() {
        let text = "<!-- SECTION: a -->\n1\n<!-- END SECTION: a -->\nkeep me\n<!-- SECTION: a -->\n2\n<!-- END SECTION: a -->";
        let out = patch_section(text, "a", "x");
        assert_eq!(
            out,
            "<!-- SECTION: a -->\nx\n<!-- END SECTION: a -->\nkeep me\n<!-- SECTION: a -->\nx\n<!-- END SECTION: a -->"
        );
    }

    #[test]
    fn patch_is_idempotent() {
        let once = patch_section("Hello", "X", "World");
        assert_eq!(patch_section(&once, "X", "World"), once);
    }

    #[test]
    fn titles_with_pattern_characters_match_literally() {
        let title = "results (v1.*)[x]";
        let patched = patch_section("doc", title, "body");
        assert_eq!(extract_section(&patched, title), Some("body"));
        assert_eq!(extract_section(&patched, "results (v1.x)[x]"), None);
    }

    #[test]
    fn extract_round_trips_multiline_bodies() {
        let body = "| name | status |\n| ---- | ------ |\n| a    | b      |";
        let patched = patch_section("# Title\n\nText", "squawk-check-results", body);
        assert_eq!(extract_section(&patched, "squawk-check-results"), Some(body));
    }

    #[test]
    fn extract_round_trips_empty_body() {
        let patched = patch_section("", "t", "");
        assert_eq!(extract_section(&patched, "t"), Some(""));
    }

    #[test]
    fn unterminated_section_is_ignored() {
        let text = "<!-- SECTION: a -->\nno end";
        assert_eq!(extract_section(text, "a"), None);
        assert!(patch_section(text, "a", "x").starts_with(text));
    }
}
