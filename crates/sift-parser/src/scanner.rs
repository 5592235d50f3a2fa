//! Scanner primitives.
//!
//! There is no token stream. The parser drives a byte cursor directly and
//! asks the scanner to consume fixed text (`eat`, `match_keyword`) or one
//! literal at a time. Trivia (whitespace and comments) is skipped as a prefix
//! of every consumption, never after it, so the cursor always rests right
//! behind the last consumed lexeme. That keeps "was there a line break before
//! the next lexeme" answerable at any point.

use crate::error::SyntaxErrorKind;

/// Every punctuator, longest first within each leading byte.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@", "#",
];

// ─── Character classes ──────────────────────────────────────────────────────

#[inline]
pub fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

#[inline]
pub fn is_id_part(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit() || c == '\u{200c}' || c == '\u{200d}'
}

#[inline]
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[inline]
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0b}' | '\u{0c}' | '\u{a0}' | '\u{feff}')
        || (!c.is_ascii() && c.is_whitespace() && !is_line_terminator(c))
}

/// Result of looking past trivia without moving.
#[derive(Debug, Clone, Copy)]
pub struct Trivia {
    /// Offset of the next significant byte.
    pub end: usize,
    /// Whether a line terminator was crossed.
    pub newline: bool,
    /// Start of a block comment that never closes.
    pub unclosed: Option<usize>,
}

/// Byte cursor over the source text.
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// First unclosed comment seen; surfaced by the parser in place of the
    /// end-of-input error it causes.
    pub(crate) comment_error: Option<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            comment_error: None,
        }
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Restore a previously saved position.
    #[inline]
    pub fn backtrack(&mut self, pos: usize) {
        self.pos = pos;
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    /// Look past whitespace and comments starting at the cursor.
    pub fn trivia(&self) -> Trivia {
        let mut i = self.pos;
        let mut newline = false;
        // Hashbang line
        if i == 0 && self.source.starts_with("#!") {
            i = self.source.find('\n').unwrap_or(self.source.len());
        }
        while i < self.bytes.len() {
            let b = self.bytes[i];
            match b {
                b'\n' | b'\r' => {
                    newline = true;
                    i += 1;
                }
                b' ' | b'\t' | 0x0b | 0x0c => i += 1,
                b'/' if self.bytes.get(i + 1) == Some(&b'/') => {
                    while i < self.bytes.len() && self.bytes[i] != b'\n' && self.bytes[i] != b'\r' {
                        i += 1;
                    }
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    match self.source[i + 2..].find("*/") {
                        Some(close) => {
                            if self.source[i + 2..i + 2 + close].contains(['\n', '\r']) {
                                newline = true;
                            }
                            i += close + 4;
                        }
                        None => {
                            return Trivia {
                                end: self.bytes.len(),
                                newline,
                                unclosed: Some(i),
                            }
                        }
                    }
                }
                b if b < 0x80 => break,
                _ => {
                    let c = self.source[i..].chars().next().unwrap_or(' ');
                    if is_line_terminator(c) {
                        newline = true;
                    } else if !is_space(c) {
                        break;
                    }
                    i += c.len_utf8();
                }
            }
        }
        Trivia { end: i, newline, unclosed: None }
    }

    /// Move past trivia. Returns whether a line terminator was crossed.
    pub fn skip_trivia(&mut self) -> bool {
        let trivia = self.trivia();
        if let Some(at) = trivia.unclosed {
            self.comment_error.get_or_insert(at);
        }
        self.pos = trivia.end;
        trivia.newline
    }

    /// Whether a line terminator separates the cursor from the next lexeme.
    #[inline]
    pub fn newline_ahead(&self) -> bool {
        self.trivia().newline
    }

    /// Offset of the next significant byte.
    #[inline]
    pub fn next_start(&self) -> usize {
        self.trivia().end
    }

    /// Remaining input after trivia.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.source[self.trivia().end..]
    }

    /// Next significant byte.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.trivia().end).copied()
    }

    /// Next significant character.
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Whether only trivia remains.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.trivia().end >= self.bytes.len()
    }

    // =========================================================================
    // Fixed text
    // =========================================================================

    /// Longest punctuator at the start of `rest`.
    fn punctuator(rest: &str) -> Option<&'static str> {
        let found = PUNCTUATORS.iter().copied().find(|p| rest.starts_with(p))?;
        // `a?.5:b` is a conditional, not an optional chain
        if found == "?." && rest.as_bytes().get(2).is_some_and(u8::is_ascii_digit) {
            return Some("?");
        }
        Some(found)
    }

    /// Whether the next lexeme is exactly `lit`.
    ///
    /// Punctuators never match a prefix of a longer punctuator, so `at("=")`
    /// is false in front of `==` or `=>`. Words require a boundary.
    pub fn at(&self, lit: &str) -> bool {
        let rest = self.rest();
        if !rest.starts_with(lit) {
            return false;
        }
        if lit.chars().next().is_some_and(is_id_start) {
            return !rest[lit.len()..].chars().next().is_some_and(is_id_part);
        }
        match Self::punctuator(rest) {
            Some(p) => p == lit,
            None => true,
        }
    }

    /// Whether the next lexeme is the word `word`.
    #[inline]
    pub fn at_keyword(&self, word: &str) -> bool {
        self.at(word)
    }

    /// Consume `lit` if it is the next lexeme. No effect on failure.
    pub fn eat(&mut self, lit: &str) -> bool {
        if self.at(lit) {
            self.skip_trivia();
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Consume the keyword `word` if it is the next lexeme.
    #[inline]
    pub fn match_keyword(&mut self, word: &str) -> bool {
        self.eat(word)
    }

    /// The punctuator that starts the next lexeme, if any.
    pub fn peek_punctuator(&self) -> Option<&'static str> {
        Self::punctuator(self.rest())
    }

    /// Consume one raw byte at the cursor (no trivia skipping).
    #[inline]
    pub fn bump(&mut self) {
        self.pos += 1;
    }

    /// Consume `len` raw bytes at the cursor.
    #[inline]
    pub fn advance(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.source.len());
    }

    /// Raw byte at the cursor (no trivia skipping).
    #[inline]
    pub fn raw_peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Raw remaining input at the cursor (no trivia skipping).
    #[inline]
    pub fn raw_rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    // =========================================================================
    // Literals. Each expects the cursor on the literal's first byte.
    // =========================================================================

    /// Whether an identifier (or keyword) starts at the next lexeme.
    pub fn at_identifier(&self) -> bool {
        let rest = self.rest();
        rest.chars().next().is_some_and(is_id_start) || rest.starts_with("\\u")
    }

    /// The plain word (no escapes) that starts the next lexeme, if any.
    pub fn peek_word(&self) -> Option<&'a str> {
        let rest = self.rest();
        if !rest.chars().next().is_some_and(is_id_start) {
            return None;
        }
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_id_part(c))
            .map_or(rest.len(), |(i, _)| i);
        Some(&rest[..len])
    }

    /// Scan an identifier name after trivia, keywords included.
    pub fn identifier(&mut self) -> Option<String> {
        if !self.at_identifier() {
            return None;
        }
        self.skip_trivia();
        let mut name = String::new();
        while let Some(c) = self.raw_rest().chars().next() {
            if c == '\\' && self.raw_rest().starts_with("\\u") {
                self.pos += 2;
                name.push(self.unicode_escape().unwrap_or('\u{fffd}'));
            } else if is_id_part(c) {
                name.push(c);
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Some(name)
    }

    /// Scan a numeric literal. Returns the value and, for BigInt, its digits.
    pub fn number(&mut self) -> Result<(f64, Option<String>), SyntaxErrorKind> {
        let start = self.pos;
        let radix = match self.raw_rest().as_bytes() {
            [b'0', b'x' | b'X', ..] => 16,
            [b'0', b'o' | b'O', ..] => 8,
            [b'0', b'b' | b'B', ..] => 2,
            _ => 10,
        };
        let mut digits = String::new();
        if radix != 10 {
            self.pos += 2;
            while let Some(b) = self.raw_peek() {
                if (b as char).is_digit(radix) {
                    digits.push(b as char);
                } else if b != b'_' {
                    break;
                }
                self.pos += 1;
            }
        } else {
            let mut seen_dot = false;
            let mut seen_exp = false;
            while let Some(b) = self.raw_peek() {
                match b {
                    b'0'..=b'9' => digits.push(b as char),
                    b'_' => {}
                    b'.' if !seen_dot && !seen_exp => {
                        seen_dot = true;
                        digits.push('.');
                    }
                    b'e' | b'E' if !seen_exp => {
                        seen_exp = true;
                        digits.push('e');
                        if let Some(sign @ (b'+' | b'-')) = self.bytes.get(self.pos + 1).copied() {
                            digits.push(sign as char);
                            self.pos += 1;
                        }
                    }
                    _ => break,
                }
                self.pos += 1;
            }
        }
        let bigint = if self.raw_peek() == Some(b'n') {
            self.pos += 1;
            Some(self.source[start..self.pos - 1].replace('_', ""))
        } else {
            None
        };
        if self.raw_rest().chars().next().is_some_and(is_id_start) {
            return Err(SyntaxErrorKind::IdFollowsLiteral);
        }
        let value = if radix == 10 {
            let text = if digits.ends_with('.') { &digits[..digits.len() - 1] } else { &digits };
            let text = if text.starts_with('.') { format!("0{text}") } else { text.to_string() };
            text.parse::<f64>().unwrap_or(f64::NAN)
        } else {
            digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0f64, |acc, d| acc * radix as f64 + d as f64)
        };
        Ok((value, bigint))
    }

    /// Scan a quoted string literal, returning its cooked value.
    pub fn string(&mut self) -> Result<String, SyntaxErrorKind> {
        let quote = self.raw_peek().unwrap_or(b'"');
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.raw_rest().chars().next() else {
                return Err(SyntaxErrorKind::UnterminatedString);
            };
            match c {
                c if c as u32 == quote as u32 => {
                    self.pos += 1;
                    return Ok(value);
                }
                '\n' | '\r' => return Err(SyntaxErrorKind::UnterminatedString),
                '\\' => {
                    self.pos += 1;
                    if let Some(c) = self.escape()? {
                        value.push(c);
                    }
                }
                c => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Process an escape sequence after the backslash. `None` for a line
    /// continuation.
    fn escape(&mut self) -> Result<Option<char>, SyntaxErrorKind> {
        let Some(c) = self.raw_rest().chars().next() else {
            return Err(SyntaxErrorKind::UnterminatedString);
        };
        self.pos += c.len_utf8();
        let out = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'v' => '\u{0b}',
            '0' if !self.raw_peek().is_some_and(|b| b.is_ascii_digit()) => '\0',
            'x' => {
                let hex = self.raw_rest().get(..2).unwrap_or("");
                let code = u32::from_str_radix(hex, 16).map_err(|_| SyntaxErrorKind::UnterminatedString)?;
                self.pos += 2;
                char::from_u32(code).unwrap_or('\u{fffd}')
            }
            'u' => self.unicode_escape().unwrap_or('\u{fffd}'),
            '\r' => {
                if self.raw_peek() == Some(b'\n') {
                    self.pos += 1;
                }
                return Ok(None);
            }
            '\n' | '\u{2028}' | '\u{2029}' => return Ok(None),
            c => c,
        };
        Ok(Some(out))
    }

    /// `XXXX` or `{X…}` after `\u`.
    fn unicode_escape(&mut self) -> Option<char> {
        let rest = self.raw_rest();
        let (hex, len) = if let Some(body) = rest.strip_prefix('{') {
            let close = body.find('}')?;
            (&body[..close], close + 2)
        } else {
            (rest.get(..4)?, 4)
        };
        let code = u32::from_str_radix(hex, 16).ok()?;
        self.pos += len;
        char::from_u32(code)
    }

    /// Scan one template chunk after `` ` `` or `}`. Returns `(raw, cooked,
    /// ends_template)`; when `ends_template` is false the cursor sits behind
    /// `${`.
    pub fn template_chunk(&mut self) -> Result<(String, String, bool), SyntaxErrorKind> {
        let start = self.pos;
        let mut cooked = String::new();
        loop {
            let Some(c) = self.raw_rest().chars().next() else {
                return Err(SyntaxErrorKind::UnterminatedTemplate);
            };
            match c {
                '`' => {
                    let raw = self.source[start..self.pos].to_string();
                    self.pos += 1;
                    return Ok((raw, cooked, true));
                }
                '$' if self.raw_rest().starts_with("${") => {
                    let raw = self.source[start..self.pos].to_string();
                    self.pos += 2;
                    return Ok((raw, cooked, false));
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(c) = self.escape().map_err(|_| SyntaxErrorKind::UnterminatedTemplate)? {
                        cooked.push(c);
                    }
                }
                c => {
                    cooked.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Scan a regular expression literal starting at `/`.
    pub fn regex(&mut self) -> Result<(String, String), SyntaxErrorKind> {
        self.pos += 1;
        let start = self.pos;
        let mut in_class = false;
        loop {
            let Some(c) = self.raw_rest().chars().next() else {
                return Err(SyntaxErrorKind::UnterminatedRegex);
            };
            match c {
                '\\' => {
                    self.pos += 1;
                    match self.raw_rest().chars().next() {
                        Some(c) if !is_line_terminator(c) => self.pos += c.len_utf8(),
                        _ => return Err(SyntaxErrorKind::UnterminatedRegex),
                    }
                    continue;
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                c if is_line_terminator(c) => return Err(SyntaxErrorKind::UnterminatedRegex),
                _ => {}
            }
            self.pos += c.len_utf8();
        }
        let pattern = self.source[start..self.pos].to_string();
        self.pos += 1;
        let flags_start = self.pos;
        while self.raw_rest().chars().next().is_some_and(is_id_part) {
            self.pos += 1;
        }
        Ok((pattern, self.source[flags_start..self.pos].to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eat_skips_trivia_and_respects_longer_punctuators() {
        let mut s = Scanner::new("  /* c */ == x");
        assert!(!s.eat("="));
        assert_eq!(s.pos(), 0);
        assert!(s.eat("=="));
        assert!(s.at_keyword("x"));
    }

    #[test]
    fn test_keyword_boundary() {
        let s = Scanner::new("instanceofFoo");
        assert!(!s.at_keyword("instanceof"));
        let s = Scanner::new("in x");
        assert!(s.at_keyword("in"));
    }

    #[test]
    fn test_newline_ahead() {
        let mut s = Scanner::new("a // c\n++b");
        assert_eq!(s.identifier().as_deref(), Some("a"));
        assert!(s.newline_ahead());
        assert!(s.at("++"));
    }

    #[test]
    fn test_numbers() {
        let mut s = Scanner::new("0x1F");
        assert_eq!(s.number(), Ok((31.0, None)));
        let mut s = Scanner::new("1_000.5e2");
        assert_eq!(s.number(), Ok((100050.0, None)));
        let mut s = Scanner::new("10n");
        assert_eq!(s.number(), Ok((10.0, Some("10".to_string()))));
        let mut s = Scanner::new("3in");
        assert_eq!(s.number(), Err(SyntaxErrorKind::IdFollowsLiteral));
    }

    #[test]
    fn test_string_escapes() {
        let mut s = Scanner::new(r#""a\n\x41\u{1F600}""#);
        assert_eq!(s.string().unwrap(), "a\nA\u{1F600}");
        let mut s = Scanner::new("'abc\n'");
        assert_eq!(s.string(), Err(SyntaxErrorKind::UnterminatedString));
    }

    #[test]
    fn test_regex_with_class() {
        let mut s = Scanner::new("/[/]+\\//gi;");
        assert_eq!(s.regex().unwrap(), ("[/]+\\/".to_string(), "gi".to_string()));
    }

    #[test]
    fn test_unclosed_comment_is_recorded() {
        let mut s = Scanner::new("a /* never");
        s.identifier();
        s.skip_trivia();
        assert_eq!(s.comment_error, Some(2));
        assert!(s.at_end());
    }
}
