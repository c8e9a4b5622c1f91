//! Locating the JSON object inside raw model output.

/// Returns the slice of `output` most likely to hold the JSON payload.
///
/// Looks inside the first ```` ``` ```` fence when there is one, whatever its
/// language tag, then cuts from the first `{` to the last `}` so prose on
/// either side is dropped. Falls back to the trimmed text.
pub(crate) fn json_payload(output: &str) -> &str {
    let body = fenced(output).unwrap_or(output).trim();
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

/// Body of the first closed fence. The opening line, tag included, is skipped.
fn fenced(text: &str) -> Option<&str> {
    let after_open = &text[text.find("```")? + 3..];
    let body = &after_open[after_open.find('\n')? + 1..];
    let end = body.find("```")?;
    Some(&body[..end])
}
