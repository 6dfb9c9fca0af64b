//! Cleanup for text that reaches the line editor in one piece (pastes).

/// Make pasted text safe to echo on a single prompt line.
///
/// Tabs become a single space, `\r\n` and lone `\r` become `\n`, and other
/// control characters are dropped. Newlines are kept so the editor can
/// submit at the first one.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\t' => sanitized.push(' '),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                sanitized.push('\n');
            }
            '\n' => sanitized.push('\n'),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}
