//! Reading the authorization token out of the identity provider's authorize page.
//!
//! With `response_mode=okta_post_message` the identity provider answers with an HTML page
//! whose script contains `data.access_token = '...';`. The quoted value is escaped twice
//! over: it holds backslash escapes (`\x2D`, `\xc3\xa9`, ...) of the UTF-8 bytes of the token.
//! Undoing that takes four steps: take the text as Latin-1 bytes, decode backslash escapes,
//! take the result as Latin-1 bytes again, decode those as UTF-8.

use curbside_core::ClientError;

const TOKEN_ASSIGNMENT: &str = "access_token";

/// Find `access_token = '<value>'` in `body` and return the decoded value.
///
/// # Errors
///
/// Returns [`ClientError::Authorization`] when no assignment is present or the value
/// does not decode.
pub(crate) fn extract_authorization_token(body: &str) -> Result<String, ClientError> {
    let raw = find_quoted_assignment(body).ok_or_else(|| {
        ClientError::Authorization("no access_token assignment in authorize response".into())
    })?;

    decode_escaped_token(raw)
        .map_err(|reason| ClientError::Authorization(format!("undecodable access_token: {reason}")))
}

/// Match `access_token\s*=\s*'(.+?)'` where `.` excludes newlines.
fn find_quoted_assignment(body: &str) -> Option<&str> {
    body.match_indices(TOKEN_ASSIGNMENT).find_map(|(pos, name)| {
        let rest = body.get(pos + name.len()..)?;
        let rest = rest.trim_start().strip_prefix('=')?;
        let rest = rest.trim_start().strip_prefix('\'')?;

        // the first character is taken even when it is a quote
        let first = rest.chars().next().filter(|ch| *ch != '\n')?;
        let value_start = first.len_utf8();
        let tail = rest.get(value_start..)?;
        let close = tail.find(['\'', '\n'])?;
        if tail.get(close..)?.starts_with('\n') {
            return None;
        }
        rest.get(..value_start + close)
    })
}

/// Reverse the double escaping of the token value.
fn decode_escaped_token(raw: &str) -> Result<String, String> {
    let latin1 = encode_latin1(raw.chars())?;
    let unescaped = decode_unicode_escape(&latin1)?;
    let utf8_bytes = encode_latin1(unescaped.into_iter())?;
    String::from_utf8(utf8_bytes).map_err(|err| format!("not UTF-8: {err}"))
}

fn encode_latin1<I: Iterator<Item = char>>(chars: I) -> Result<Vec<u8>, String> {
    chars
        .map(|ch| u8::try_from(u32::from(ch)).map_err(|_err| format!("{ch:?} is not Latin-1")))
        .collect()
}

/// Decode backslash escapes in Latin-1 bytes, the way Python's `unicode_escape` codec does.
fn decode_unicode_escape(bytes: &[u8]) -> Result<Vec<char>, String> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();

    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            out.push(char::from(byte));
            continue;
        }

        let Some(escape) = iter.next() else {
            return Err("trailing backslash".into());
        };

        match escape {
            b'\n' => {}
            b'\\' => out.push('\\'),
            b'\'' => out.push('\''),
            b'"' => out.push('"'),
            b'a' => out.push('\u{07}'),
            b'b' => out.push('\u{08}'),
            b'f' => out.push('\u{0c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'v' => out.push('\u{0b}'),
            b'0'..=b'7' => {
                let mut value = u32::from(escape - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(digit @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(*digit - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value).ok_or("octal escape out of range")?);
            }
            b'x' => out.push(hex_escape(&mut iter, 2)?),
            b'u' => out.push(hex_escape(&mut iter, 4)?),
            b'U' => out.push(hex_escape(&mut iter, 8)?),
            b'N' => return Err("named escapes are not supported".into()),
            other => {
                out.push('\\');
                out.push(char::from(other));
            }
        }
    }

    Ok(out)
}

fn hex_escape<I: Iterator<Item = u8>>(iter: &mut I, width: usize) -> Result<char, String> {
    let mut value: u32 = 0;
    for _ in 0..width {
        let digit = iter
            .next()
            .and_then(|byte| char::from(byte).to_digit(16))
            .ok_or_else(|| format!("truncated \\x/\\u escape, expected {width} hex digits"))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| format!("escape {value:#x} is not a character"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_plain_token() {
        let body = r#"<script>
            var data = {};
            data.access_token = 'eyJraWQiOiJ4In0.eyJzdWIiOiJ5In0.c2ln';
            data.token_type = 'Bearer';
        </script>"#;

        assert_eq!(
            extract_authorization_token(body).unwrap(),
            "eyJraWQiOiJ4In0.eyJzdWIiOiJ5In0.c2ln"
        );
    }

    #[test]
    fn test_decodes_hex_escapes() {
        let body = r"data.access_token='abc\x2Ddef\x2E';";
        assert_eq!(extract_authorization_token(body).unwrap(), "abc-def.");
    }

    #[test]
    fn test_decodes_escaped_utf8_bytes() {
        // U+00E9 as the escaped UTF-8 sequence C3 A9
        let body = r"access_token = 'caf\xc3\xa9'";
        assert_eq!(extract_authorization_token(body).unwrap(), "café");
    }

    #[test]
    fn test_decodes_unicode_and_octal_escapes() {
        let body = r"access_token='A\101\u0042\\z'";
        assert_eq!(extract_authorization_token(body).unwrap(), r"AAB\z");
    }

    #[test]
    fn test_missing_assignment() {
        let err = extract_authorization_token("<html>login_required</html>").unwrap_err();
        assert!(matches!(err, ClientError::Authorization(_)));
    }

    #[test]
    fn test_value_may_not_span_lines() {
        assert!(extract_authorization_token("access_token = 'abc\ndef'").is_err());
        assert!(extract_authorization_token("access_token = ''").is_err());
    }

    #[test]
    fn test_skips_unassigned_mentions() {
        let body = "if (data.access_token) {}\ndata.access_token = 'tok';";
        assert_eq!(extract_authorization_token(body).unwrap(), "tok");
    }

    #[test]
    fn test_rejects_bad_escapes() {
        assert!(extract_authorization_token(r"access_token='\x4'").is_err());
        assert!(extract_authorization_token(r"access_token='€'").is_err());
        assert!(extract_authorization_token(r"access_token='\xff'").is_err());
        assert!(extract_authorization_token(r"access_token='\u20ac'").is_err());
    }
}
