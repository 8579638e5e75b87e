//! Text filters used by reference detection
//!
//! These are deliberately textual: no tokenizer, no grammar. A quoted
//! literal is anything between a pair of matching `"`, `'` or `` ` ``
//! characters on the same line, matched lazily from the left.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref QUOTED_LITERAL: Regex =
        Regex::new(r#"".*?"|'.*?'|`.*?`"#).expect("quoted literal pattern is valid");
}

/// Remove every quoted literal from `text`
///
/// Adjacent or unbalanced quotes can pair up across literal boundaries;
/// that mis-stripping is accepted.
pub fn strip_quoted_literals(text: &str) -> String {
    QUOTED_LITERAL.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_each_literal_kind() {
        let code = r#"String s = "GameObject"; char c = 'x'; String t = `Player`;"#;
        let stripped = strip_quoted_literals(code);
        assert_eq!(stripped, "String s = ; char c = ; String t = ;");
    }

    #[test]
    fn test_lazy_matching_keeps_code_between_literals() {
        let code = r#"call("a", Sprite, "b")"#;
        assert_eq!(strip_quoted_literals(code), "call(, Sprite, )");
    }

    #[test]
    fn test_literals_do_not_span_lines() {
        let code = "char q = '\"';\nGame g;\n\"";
        let stripped = strip_quoted_literals(code);
        assert!(stripped.contains("Game g;"));
    }

    #[test]
    fn test_code_without_literals_unchanged() {
        let code = "class Game { GameObject g; }";
        assert_eq!(strip_quoted_literals(code), code);
        assert!(!strip_quoted_literals(r#"log("GameObject");"#).contains("GameObject"));
    }
}
