/// Rewrites every line ending (`\r\n` or bare `\n`) as `\r\n`.
///
/// Zoho expects CRLF line breaks in plaintext bodies. A lone `\r` is left as is.
pub fn normalize_line_endings(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + content.len() / 16);
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            other => out.push(other),
        }
    }

    out
}

/// Prefixes `Re: ` unless the subject already reads as a reply.
pub fn reply_subject(subject: &str) -> String {
    if subject.to_lowercase().starts_with("re:") {
        return subject.to_string();
    }

    format!("Re: {subject}")
}
