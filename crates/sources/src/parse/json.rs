//! Recursive-descent JSON parser which tags every node and mapping key with
//! its source byte span.

use super::{MapEntry, Number, ParseError, ParseNode, ParseWarning, Scalar};
use crate::span::Span;

pub fn parse(text: &str) -> Result<(ParseNode, Vec<ParseWarning>), ParseError> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
        warnings: Vec::new(),
    };

    parser.skip_ws();
    let root = parser.value()?;
    parser.skip_ws();

    if parser.pos != parser.bytes.len() {
        return Err(ParseError::at(
            "unexpected trailing content after the document",
            Span::new(parser.pos, parser.bytes.len()),
        ));
    }
    Ok((root, parser.warnings))
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    warnings: Vec<ParseWarning>,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.bytes.get(self.pos) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> Result<(), ParseError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::at(
                format!("expected `{}`", b as char),
                Span::point(self.pos),
            ))
        }
    }

    fn value(&mut self) -> Result<ParseNode, ParseError> {
        match self.peek() {
            Some(b'{') => self.object(),
            Some(b'[') => self.array(),
            Some(b'"') => {
                let begin = self.pos;
                let s = self.string()?;
                Ok(ParseNode::Scalar {
                    value: Scalar::String(s),
                    span: Span::new(begin, self.pos),
                })
            }
            Some(b't') | Some(b'f') | Some(b'n') => self.literal(),
            Some(b'-') | Some(b'0'..=b'9') => self.number(),
            Some(other) => Err(ParseError::at(
                format!("unexpected character `{}`", other as char),
                Span::point(self.pos),
            )),
            None => Err(ParseError::at(
                "unexpected end of input",
                Span::point(self.pos),
            )),
        }
    }

    fn literal(&mut self) -> Result<ParseNode, ParseError> {
        let begin = self.pos;
        for (text, value) in [
            ("true", Scalar::Bool(true)),
            ("false", Scalar::Bool(false)),
            ("null", Scalar::Null),
        ] {
            if self.bytes[self.pos..].starts_with(text.as_bytes()) {
                self.pos += text.len();
                return Ok(ParseNode::Scalar {
                    value,
                    span: Span::new(begin, self.pos),
                });
            }
        }
        Err(ParseError::at("invalid literal", Span::point(begin)))
    }

    fn number(&mut self) -> Result<ParseNode, ParseError> {
        let begin = self.pos;
        let mut is_float = false;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while let Some(b'0'..=b'9') = self.peek() {
                self.pos += 1;
            }
        }
        if let Some(b'e' | b'E') = self.peek() {
            is_float = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            while let Some(b'0'..=b'9') = self.peek() {
                self.pos += 1;
            }
        }

        let span = Span::new(begin, self.pos);
        let text = std::str::from_utf8(&self.bytes[begin..self.pos])
            .expect("number bytes are ASCII");

        let number = if !is_float {
            if let Ok(u) = text.parse::<u64>() {
                Number::Unsigned(u)
            } else if let Ok(i) = text.parse::<i64>() {
                Number::Signed(i)
            } else {
                Number::Float(
                    text.parse::<f64>()
                        .map_err(|_| ParseError::at("invalid number", span))?,
                )
            }
        } else {
            Number::Float(
                text.parse::<f64>()
                    .map_err(|_| ParseError::at("invalid number", span))?,
            )
        };

        Ok(ParseNode::Scalar {
            value: Scalar::Number(number),
            span,
        })
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let begin = self.pos;
        self.expect(b'"')?;
        let mut out = String::new();

        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escape = self.peek().ok_or_else(|| {
                        ParseError::at("unterminated string", Span::new(begin, self.pos))
                    })?;
                    self.pos += 1;
                    match escape {
                        b'"' => out.push('"'),
                        b'\\' => out.push('\\'),
                        b'/' => out.push('/'),
                        b'b' => out.push('\u{0008}'),
                        b'f' => out.push('\u{000C}'),
                        b'n' => out.push('\n'),
                        b'r' => out.push('\r'),
                        b't' => out.push('\t'),
                        b'u' => {
                            let c = self.unicode_escape()?;
                            out.push(c);
                        }
                        other => {
                            return Err(ParseError::at(
                                format!("invalid escape `\\{}`", other as char),
                                Span::new(self.pos - 2, self.pos),
                            ))
                        }
                    }
                }
                Some(_) => {
                    // Consume one UTF-8 character.
                    let remainder = &self.bytes[self.pos..];
                    let text = std::str::from_utf8(remainder).map_err(|_| {
                        ParseError::at("invalid UTF-8 in string", Span::point(self.pos))
                    })?;
                    let c = text.chars().next().expect("non-empty remainder");
                    out.push(c);
                    self.pos += c.len_utf8();
                }
                None => {
                    return Err(ParseError::at(
                        "unterminated string",
                        Span::new(begin, self.pos),
                    ))
                }
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let first = self.hex4()?;
        // Surrogate pairs encode as two consecutive \u escapes.
        if (0xD800..0xDC00).contains(&first) {
            if self.bytes[self.pos..].starts_with(b"\\u") {
                self.pos += 2;
                let second = self.hex4()?;
                let combined =
                    0x10000 + ((first - 0xD800) as u32) * 0x400 + (second - 0xDC00) as u32;
                if let Some(c) = char::from_u32(combined) {
                    return Ok(c);
                }
            }
            return Err(ParseError::at(
                "invalid surrogate pair",
                Span::new(self.pos - 6, self.pos),
            ));
        }
        char::from_u32(first as u32)
            .ok_or_else(|| ParseError::at("invalid unicode escape", Span::point(self.pos)))
    }

    fn hex4(&mut self) -> Result<u16, ParseError> {
        let begin = self.pos;
        let digits = self
            .bytes
            .get(begin..begin + 4)
            .and_then(|b| std::str::from_utf8(b).ok())
            .ok_or_else(|| ParseError::at("truncated unicode escape", Span::point(begin)))?;
        self.pos += 4;
        u16::from_str_radix(digits, 16)
            .map_err(|_| ParseError::at("invalid unicode escape", Span::new(begin, self.pos)))
    }

    fn array(&mut self) -> Result<ParseNode, ParseError> {
        let begin = self.pos;
        self.expect(b'[')?;
        let mut items = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(ParseNode::Sequence {
                items,
                span: Span::new(begin, self.pos),
            });
        }
        loop {
            self.skip_ws();
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(ParseNode::Sequence {
                        items,
                        span: Span::new(begin, self.pos),
                    });
                }
                _ => {
                    return Err(ParseError::at(
                        "expected `,` or `]`",
                        Span::point(self.pos),
                    ))
                }
            }
        }
    }

    fn object(&mut self) -> Result<ParseNode, ParseError> {
        let begin = self.pos;
        self.expect(b'{')?;
        let mut entries: Vec<MapEntry> = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(ParseNode::Mapping {
                entries,
                span: Span::new(begin, self.pos),
            });
        }
        loop {
            self.skip_ws();
            let key_begin = self.pos;
            let key = self.string()?;
            let key_span = Span::new(key_begin, self.pos);

            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let value = self.value()?;

            if entries.iter().any(|e| e.key == key) {
                self.warnings.push(ParseWarning::DuplicateKey {
                    key,
                    span: key_span,
                });
            } else {
                entries.push(MapEntry {
                    key,
                    key_span,
                    value,
                });
            }

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(ParseNode::Mapping {
                        entries,
                        span: Span::new(begin, self.pos),
                    });
                }
                _ => {
                    return Err(ParseError::at(
                        "expected `,` or `}`",
                        Span::point(self.pos),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_values_and_spans() {
        let text = r#"{"a": [1, -2, 3.5e2], "b": "x\ny", "c": null}"#;
        let (node, warnings) = parse(text).unwrap();
        assert!(warnings.is_empty());

        assert_eq!(node.span(), Span::new(0, text.len()));
        assert_eq!(
            node.to_value(),
            serde_json::json!({"a": [1, -2, 350.0], "b": "x\ny", "c": null}),
        );

        // The span of "a"'s value covers exactly `[1, -2, 3.5e2]`.
        let a = node.get("a").unwrap();
        assert_eq!(&text[a.span().begin..a.span().end], "[1, -2, 3.5e2]");

        let entry = node.entry("b").unwrap();
        assert_eq!(&text[entry.key_span.begin..entry.key_span.end], "\"b\"");
    }

    #[test]
    fn test_duplicate_keys() {
        let (node, warnings) = parse(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(node.to_value(), serde_json::json!({"a": 1}));
        assert!(matches!(
            warnings.as_slice(),
            [ParseWarning::DuplicateKey { key, .. }] if key == "a"
        ));
    }

    #[test]
    fn test_unicode_escapes() {
        let (node, _) = parse(r#"{"s": "é😀"}"#).unwrap();
        assert_eq!(node.get("s").unwrap().as_str(), Some("é😀"));
    }

    #[test]
    fn test_syntax_errors() {
        for text in [r#"{"a": }"#, r#"{"a": 1"#, "[1, 2", r#""open"#, "{]}"] {
            assert!(parse(text).is_err(), "expected error for {text}");
        }

        let err = parse("[1, 2 3]").unwrap_err();
        assert_eq!(err.message, "expected `,` or `]`");
        assert_eq!(err.span.begin, 6);
    }
}
