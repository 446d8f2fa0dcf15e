//! Quote-aware delimited-string splitting.
//!
//! Header values use `,` and `;` as structural delimiters, but a
//! double-quoted span may contain either character verbatim. The splitter
//! is a small state machine tracking which character classes are legal at
//! the current position; anything out of place is a hard error.

use crate::error::{ManifestError, ManifestResult};

const CHAR: u8 = 1;
const DELIMITER: u8 = 2;
const START_QUOTE: u8 = 4;
const END_QUOTE: u8 = 8;

/// Split `value` on any character in `delimiters`, honoring double quotes
///
/// Quote characters are retained verbatim in the produced tokens; each
/// token is trimmed. Empty input yields no tokens. The quote character
/// must not itself be a delimiter.
///
/// # Errors
///
/// Returns [`ManifestError::MalformedHeader`] on an unterminated quote or
/// a character appearing where the parse state forbids it.
pub fn split_delimited(value: &str, delimiters: &str) -> ManifestResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut expecting = CHAR | DELIMITER | START_QUOTE;

    for c in value.chars() {
        let is_delimiter = delimiters.contains(c);
        let is_quote = c == '"';

        if is_delimiter && (expecting & DELIMITER) != 0 {
            tokens.push(current.trim().to_string());
            current.clear();
            expecting = CHAR | DELIMITER | START_QUOTE;
        } else if is_quote && (expecting & START_QUOTE) != 0 {
            current.push(c);
            expecting = CHAR | END_QUOTE;
        } else if is_quote && (expecting & END_QUOTE) != 0 {
            current.push(c);
            expecting = CHAR | DELIMITER | START_QUOTE;
        } else if (expecting & CHAR) != 0 {
            current.push(c);
        } else {
            return Err(ManifestError::malformed(format!(
                "invalid delimited string: {value}"
            )));
        }
    }

    if (expecting & END_QUOTE) != 0 {
        return Err(ManifestError::malformed(format!(
            "unterminated quote in: {value}"
        )));
    }

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_split() {
        let tokens = split_delimited("a, b ,c", ",").unwrap();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_delimited("", ",").unwrap().is_empty());
    }

    #[test]
    fn test_delimiter_inside_quotes_is_literal() {
        let tokens = split_delimited(r#"a;version="[1.0,2.0)";b"#, ";").unwrap();
        assert_eq!(tokens, vec!["a", r#"version="[1.0,2.0)""#, "b"]);
    }

    #[test]
    fn test_quotes_retained_verbatim() {
        let tokens = split_delimited(r#"x="v""#, ",").unwrap();
        assert_eq!(tokens, vec![r#"x="v""#]);
    }

    #[test]
    fn test_multiple_delimiters() {
        let tokens = split_delimited("a;b,c", ",;").unwrap();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unterminated_quote_fails() {
        assert!(split_delimited(r#"a,version="1.0"#, ",").is_err());
    }

    #[test]
    fn test_consecutive_quoted_spans() {
        let tokens = split_delimited(r#""a","b""#, ",").unwrap();
        assert_eq!(tokens, vec![r#""a""#, r#""b""#]);
    }
}
