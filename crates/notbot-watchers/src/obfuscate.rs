//! Mention-safe rendering of display names.

/// Zero width space.
pub const ZWSP: char = '\u{200B}';

/// Insert a zero width space after the first character of `name`, so chat
/// clients don't treat the rendered name as a mention of that person.
///
/// Returns `None` for an empty name: there is no first character to split
/// after. Callers drop empty identities before rendering.
pub fn obfuscate(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next()?;

    let mut out = String::with_capacity(name.len() + ZWSP.len_utf8());
    out.push(first);
    out.push(ZWSP);
    out.push_str(chars.as_str());
    Some(out)
}

/// Obfuscate every non-empty name, keeping order.
pub fn obfuscate_all<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().filter_map(|n| obfuscate(n.as_ref())).collect()
}
