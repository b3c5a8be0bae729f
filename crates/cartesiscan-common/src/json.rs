//! Lenient JSON handling for broken token metadata.

/// Sanitize a JSON string by dropping control characters and escaping
/// double quotes that appear unescaped inside string values.
///
/// Contracts in the wild serve documents like `{"name":""Rage Shout" Wolf"}`;
/// a quote is treated as closing the string only when the next
/// non-whitespace character is a structural one (`:`, `,`, `}`, `]`) or the
/// input ends.
pub fn sanitize_json_string(s: &str) -> String {
    let filtered: String = s
        .chars()
        .filter(|c| !c.is_ascii_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();

    let mut result = String::with_capacity(filtered.len());
    let mut chars = filtered.chars().peekable();
    let mut in_string = false;
    let mut backslashes: usize = 0;

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
                backslashes = 0;
            }
            result.push(c);
            continue;
        }

        match c {
            '\\' => {
                backslashes += 1;
                result.push('\\');
            }
            '"' if backslashes % 2 == 1 => {
                result.push('"');
                backslashes = 0;
            }
            '"' => {
                let closes = chars
                    .clone()
                    .find(|next| !next.is_whitespace())
                    .map_or(true, |next| matches!(next, ':' | ',' | '}' | ']'));
                if closes {
                    result.push('"');
                    in_string = false;
                } else {
                    result.push_str("\\\"");
                }
                backslashes = 0;
            }
            _ => {
                result.push(c);
                backslashes = 0;
            }
        }
    }

    result
}

/// Parse `raw` as JSON, falling back to the sanitized text when strict
/// parsing fails.
pub fn parse_lenient(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(raw).or_else(|strict_err| {
        let sanitized = sanitize_json_string(raw);
        serde_json::from_str(&sanitized).map_err(|_| strict_err)
    })
}
