//! Extraction of the JSON state that upstream pages embed in their HTML.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::FetchError;

static INITIAL_DATA_RAW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var ytInitialData = \{").expect("valid regex"));

static INITIAL_DATA_ESCAPED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var ytInitialData = '(.*?)';").expect("valid regex"));

static REHYDRATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">(?P<data>\{.*?\})</script>"#,
    )
    .expect("valid regex")
});

/// Extracts the `ytInitialData` render state from a channel page.
///
/// The page assigns it either as a raw object literal or as a JS string
/// literal with `\xNN`/`\uNNNN` escapes; both forms are accepted.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if neither form is present or the payload
/// is not valid JSON.
pub fn extract_initial_data(html: &str) -> Result<Value, FetchError> {
    let payload = if let Some(m) = INITIAL_DATA_RAW_RE.find(html) {
        // The match ends just past the opening brace.
        let start = m.end() - 1;
        extract_balanced_object(&html[start..])
            .map(str::to_owned)
            .ok_or_else(|| FetchError::Parse("ytInitialData object is unterminated".to_string()))?
    } else if let Some(caps) = INITIAL_DATA_ESCAPED_RE.captures(html) {
        decode_js_escapes(&caps[1])?
    } else {
        return Err(FetchError::Parse("ytInitialData not found".to_string()));
    };

    serde_json::from_str(&payload)
        .map_err(|e| FetchError::Parse(format!("ytInitialData is not valid JSON: {e}")))
}

/// Extracts the rehydration payload from a short-video profile page.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if the script tag is missing or its content
/// is not valid JSON.
pub fn extract_rehydration_data(html: &str) -> Result<Value, FetchError> {
    let caps = REHYDRATION_RE.captures(html).ok_or_else(|| {
        FetchError::Parse("profile page data not found on the TikTok page".to_string())
    })?;
    serde_json::from_str(&caps["data"])
        .map_err(|e| FetchError::Parse(format!("error parsing TikTok page data: {e}")))
}

/// Depth-first search for the first non-empty object stored under `key`.
#[must_use]
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key).filter(|v| is_non_empty_object(v)) {
                return Some(found);
            }
            map.values().find_map(|child| find_key(child, key))
        }
        Value::Array(items) => items.iter().find_map(|child| find_key(child, key)),
        _ => None,
    }
}

fn is_non_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(|m| !m.is_empty())
}

/// Returns the shortest prefix of `s` forming a balanced `{…}` object.
///
/// Tracks nesting across both brace kinds while skipping string literals and
/// their escapes. Returns `None` when `s` does not start with `{` or never
/// closes.
pub(crate) fn extract_balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            ']' => depth -= 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decodes the escapes a JS single-quoted string literal may contain.
///
/// Handles `\xNN`, `\uNNNN` (joining surrogate pairs), `\UNNNNNNNN` and the
/// single-character escapes. Unknown escapes are kept verbatim.
pub(crate) fn decode_js_escapes(input: &str) -> Result<String, FetchError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(kind) = chars.next() else {
            out.push('\\');
            break;
        };
        match kind {
            'x' => out.push(read_code_point(&mut chars, 2)?),
            'U' => out.push(read_code_point(&mut chars, 8)?),
            'u' => {
                let high = read_hex(&mut chars, 4)?;
                if (0xD800..0xDC00).contains(&high) {
                    let mut lookahead = chars.clone();
                    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        let low = read_hex(&mut lookahead, 4)?;
                        if (0xDC00..0xE000).contains(&low) {
                            chars = lookahead;
                            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                            out.push(to_char(combined)?);
                            continue;
                        }
                    }
                    out.push(char::REPLACEMENT_CHARACTER);
                } else {
                    out.push(to_char(high)?);
                }
            }
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\\' | '\'' | '"' | '/' => out.push(kind),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn read_hex(chars: &mut std::str::Chars<'_>, len: usize) -> Result<u32, FetchError> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return Err(FetchError::Parse(format!(
            "truncated escape sequence in ytInitialData: \\{digits}"
        )));
    }
    u32::from_str_radix(&digits, 16).map_err(|_| {
        FetchError::Parse(format!("invalid escape sequence in ytInitialData: {digits}"))
    })
}

fn read_code_point(chars: &mut std::str::Chars<'_>, len: usize) -> Result<char, FetchError> {
    to_char(read_hex(chars, len)?)
}

fn to_char(code: u32) -> Result<char, FetchError> {
    char::from_u32(code)
        .ok_or_else(|| FetchError::Parse(format!("invalid code point U+{code:X} in ytInitialData")))
}
