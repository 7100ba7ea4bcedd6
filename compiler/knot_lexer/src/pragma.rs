//! Recognition of `# type: ignore` comments.

/// Byte offset, within `comment`, of the tag that follows a
/// `# type: ignore` pragma, or `None` if `comment` is not one.
///
/// Whitespace is allowed after `#` and after `type:`. The word `ignore`
/// must end there: `# type: ignored` is an ordinary comment, while
/// `# type: ignore[import]` carries the tag `[import]`.
pub(crate) fn type_ignore_tag(comment: &str) -> Option<usize> {
    let rest = comment.strip_prefix('#')?.trim_start_matches([' ', '\t']);
    let rest = rest.strip_prefix("type:")?.trim_start_matches([' ', '\t']);
    let tag = rest.strip_prefix("ignore")?;
    match tag.chars().next() {
        Some(c) if c == '_' || c.is_alphanumeric() || !c.is_ascii() => None,
        _ => Some(comment.len() - tag.len()),
    }
}
