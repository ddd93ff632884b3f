//! Line-oriented parser for the block-and-flow YAML subset in which API
//! description documents are written: block and flow collections, plain and
//! quoted scalars, literal and folded block scalars, comments, anchors and
//! aliases, and a leading `---` document marker.

use super::{MapEntry, Number, ParseError, ParseNode, ParseWarning, Scalar};
use crate::span::Span;
use std::collections::BTreeMap;

pub fn parse(text: &str) -> Result<(ParseNode, Vec<ParseWarning>), ParseError> {
    let mut warnings = Vec::new();
    let lines = scan_lines(text, &mut warnings);

    let mut parser = Parser {
        text,
        end: lines.len(),
        lines,
        idx: 0,
        warnings,
        anchors: BTreeMap::new(),
    };

    // Prologue: blank lines, `%` directives, and at most one `---` marker.
    let mut seen_marker = false;
    while parser.idx < parser.lines.len() {
        let line = parser.lines[parser.idx].clone();
        let content = parser.content(&line);
        if line.is_blank() || content.starts_with('%') {
            parser.idx += 1;
        } else if content == "---" && !seen_marker {
            seen_marker = true;
            parser.idx += 1;
        } else {
            break;
        }
    }

    // The first document ends at `...` or at a second `---`.
    parser.end = parser
        .lines
        .iter()
        .enumerate()
        .skip(parser.idx)
        .find(|(_, l)| l.indent == 0 && matches!(&text[l.content_start..l.content_end], "..." | "---"))
        .map(|(ind, _)| ind)
        .unwrap_or(parser.lines.len());

    parser.skip_blank();
    if parser.idx >= parser.end {
        return Ok((
            ParseNode::Scalar {
                value: Scalar::Null,
                span: Span::point(0),
            },
            parser.warnings,
        ));
    }

    let root = parser.block_node(false)?;

    parser.skip_blank();
    if parser.idx < parser.end {
        let line = parser.lines[parser.idx].clone();
        return Err(ParseError::at(
            "unexpected content after the document",
            Span::new(line.content_start, line.content_end),
        ));
    }
    Ok((root, parser.warnings))
}

#[derive(Debug, Clone)]
struct Line {
    begin: usize,
    indent: usize,
    content_start: usize,
    content_end: usize,
    raw_end: usize,
}

impl Line {
    fn is_blank(&self) -> bool {
        self.content_start == self.content_end
    }
}

fn scan_lines(text: &str, warnings: &mut Vec<ParseWarning>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut begin = 0;

    for raw in text.split_inclusive('\n') {
        let mut end = begin + raw.len();
        if raw.ends_with('\n') {
            end -= 1;
        }
        if text[begin..end].ends_with('\r') {
            end -= 1;
        }

        // Leading whitespace, counting a tab as a single column.
        let mut indent = 0;
        let mut content_start = begin;
        for b in text[begin..end].bytes() {
            match b {
                b' ' => {}
                b'\t' => warnings.push(ParseWarning::TabIndent {
                    span: Span::new(content_start, content_start + 1),
                }),
                _ => break,
            }
            indent += 1;
            content_start += 1;
        }

        // Strip a trailing comment: `#` at content start or preceded by
        // whitespace, outside of quoted scalars.
        let mut content_end = content_start;
        let (mut in_single, mut in_double, mut escaped) = (false, false, false);
        let mut prev_ws = true;
        for (rel, c) in text[content_start..end].char_indices() {
            let at = content_start + rel;
            if in_double {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_double = false;
                }
            } else if in_single {
                if c == '\'' {
                    in_single = false;
                }
            } else if c == '#' && prev_ws {
                break;
            } else if c == '"' {
                in_double = true;
            } else if c == '\'' {
                in_single = true;
            }
            prev_ws = c == ' ' || c == '\t';
            if !prev_ws {
                content_end = at + c.len_utf8();
            }
        }

        lines.push(Line {
            begin,
            indent,
            content_start,
            content_end,
            raw_end: end,
        });
        begin += raw.len();
    }
    lines
}

struct Parser<'a> {
    text: &'a str,
    lines: Vec<Line>,
    // One past the last line of the first document.
    end: usize,
    idx: usize,
    warnings: Vec<ParseWarning>,
    anchors: BTreeMap<String, ParseNode>,
}

impl<'a> Parser<'a> {
    fn content(&self, line: &Line) -> &'a str {
        &self.text[line.content_start..line.content_end]
    }

    fn skip_blank(&mut self) {
        while self.idx < self.end && self.lines[self.idx].is_blank() {
            self.idx += 1;
        }
    }

    /// The current non-blank line within the document, if any.
    fn cur(&mut self) -> Option<Line> {
        self.skip_blank();
        if self.idx < self.end {
            Some(self.lines[self.idx].clone())
        } else {
            None
        }
    }

    fn is_seq_entry(&self, line: &Line) -> bool {
        let content = self.content(line);
        content == "-" || content.starts_with("- ")
    }

    fn has_key_colon(&self, line: &Line) -> bool {
        self.find_key_colon(line.content_start, line.content_end)
            .is_some()
    }

    /// Parse the node rooted at the current line, whose own indent fixes the
    /// block's indentation level. `seq_ok` permits a sequence at the same
    /// indent as the enclosing mapping key, which YAML allows only there.
    fn block_node(&mut self, seq_ok: bool) -> Result<ParseNode, ParseError> {
        let line = self.cur().expect("caller ensured a current line");

        if self.is_seq_entry(&line) {
            self.block_sequence(line.indent)
        } else if self.content(&line).starts_with("? ") {
            Err(ParseError::at(
                "complex mapping keys are not supported",
                Span::new(line.content_start, line.content_end),
            ))
        } else if self.has_key_colon(&line) {
            self.block_mapping(line.indent)
        } else {
            let (node, _) =
                self.inline_value(line.content_start, line.content_end, line.indent, seq_ok)?;
            Ok(node)
        }
    }

    fn block_mapping(&mut self, indent: usize) -> Result<ParseNode, ParseError> {
        let first = self.lines[self.idx].content_start;
        let mut entries: Vec<MapEntry> = Vec::new();
        let mut span = Span::point(first);

        while let Some(line) = self.cur() {
            if line.indent < indent || self.is_seq_entry(&line) {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::at(
                    "invalid indentation",
                    Span::new(line.content_start, line.content_end),
                ));
            }
            let Some(colon) = self.find_key_colon(line.content_start, line.content_end) else {
                return Err(ParseError::at(
                    "expected a `key: value` mapping entry",
                    Span::new(line.content_start, line.content_end),
                ));
            };

            let (key, key_span) = self.mapping_key(&line, colon)?;

            // Value begins after the colon and any following spaces.
            let mut rest = colon + 1;
            while self.text[rest..line.content_end].starts_with(' ') {
                rest += 1;
            }
            let (value, value_end) = if rest < line.content_end {
                self.inline_value(rest, line.content_end, indent, true)?
            } else {
                self.idx += 1;
                self.nested_value(indent, colon + 1, true)?
            };

            span.begin = span.begin.min(key_span.begin);
            span.end = span.end.max(value_end).max(key_span.end);

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
        }
        Ok(ParseNode::Mapping { entries, span })
    }

    fn mapping_key(&mut self, line: &Line, colon: usize) -> Result<(String, Span), ParseError> {
        let start = line.content_start;
        let first = self.text[start..].chars().next().expect("non-blank line");

        if first == '"' || first == '\'' {
            let (key, end) = self.quoted_scalar(start)?;
            // Only whitespace may separate the closing quote and the colon.
            if self.text[end..colon].trim().is_empty() {
                return Ok((key, Span::new(start, end)));
            }
            return Err(ParseError::at(
                "expected `:` after quoted mapping key",
                Span::new(end, colon),
            ));
        }

        let raw = self.text[start..colon].trim_end();
        let key_span = Span::new(start, start + raw.len());
        if !matches!(resolve_plain(raw), Scalar::String(_)) {
            self.warnings.push(ParseWarning::NonStringKey { span: key_span });
        }
        Ok((raw.to_string(), key_span))
    }

    /// A value with nothing after its indicator on the current line: a
    /// more-indented block, a sequence at the enclosing key's own indent
    /// (mapping values only), or null. The cursor is already past the
    /// indicator's line.
    fn nested_value(
        &mut self,
        indent: usize,
        at: usize,
        seq_ok: bool,
    ) -> Result<(ParseNode, usize), ParseError> {
        match self.cur() {
            Some(next) if next.indent > indent => {
                let node = self.block_node(false)?;
                let end = node.span().end;
                Ok((node, end))
            }
            Some(next) if seq_ok && next.indent == indent && self.is_seq_entry(&next) => {
                let node = self.block_sequence(indent)?;
                let end = node.span().end;
                Ok((node, end))
            }
            _ => Ok((
                ParseNode::Scalar {
                    value: Scalar::Null,
                    span: Span::point(at),
                },
                at,
            )),
        }
    }

    fn block_sequence(&mut self, indent: usize) -> Result<ParseNode, ParseError> {
        let mut items = Vec::new();
        let mut span = Span::point(self.lines[self.idx].content_start);

        while let Some(line) = self.cur() {
            if line.indent != indent || !self.is_seq_entry(&line) {
                break;
            }
            span.begin = span.begin.min(line.content_start);

            let item = if self.content(&line) == "-" {
                self.idx += 1;
                let (node, _) = self.nested_value(indent, line.content_start + 1, false)?;
                node
            } else {
                // Re-root the remainder of the line as a deeper virtual line,
                // so `- name: x` parses as a mapping whose continuation lines
                // are indented to the column after the dash.
                let mut rest = line.content_start + 1;
                while self.text[rest..line.content_end].starts_with(' ') {
                    rest += 1;
                }
                self.lines[self.idx] = Line {
                    indent: rest - line.begin,
                    content_start: rest,
                    ..line.clone()
                };
                self.block_node(false)?
            };
            span.end = span.end.max(item.span().end);
            items.push(item);
        }
        Ok(ParseNode::Sequence { items, span })
    }

    /// Parse a value which begins in the middle of a line: an anchor or
    /// alias, a tag, a block scalar indicator, a flow collection, or a
    /// scalar. `indent` is the indent of the enclosing block, which bounds
    /// plain-scalar folding and block-scalar extents. Consumes the current
    /// line and any continuation lines.
    fn inline_value(
        &mut self,
        start: usize,
        end: usize,
        indent: usize,
        seq_ok: bool,
    ) -> Result<(ParseNode, usize), ParseError> {
        let rest = &self.text[start..end];

        if let Some(name) = rest.strip_prefix('&') {
            let name: String = name
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if name.is_empty() {
                return Err(ParseError::at("expected anchor name", Span::point(start)));
            }
            let mut after = start + 1 + name.len();
            while self.text[after..end].starts_with(' ') {
                after += 1;
            }
            let (node, node_end) = if after < end {
                self.inline_value(after, end, indent, seq_ok)?
            } else {
                self.idx += 1;
                self.nested_value(indent, after, seq_ok)?
            };
            self.anchors.insert(name, node.clone());
            return Ok((node, node_end));
        }

        if let Some(after) = rest.strip_prefix('*') {
            let name: String = after
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if !after[name.len()..].trim().is_empty() {
                return Err(ParseError::at(
                    "unexpected content after alias",
                    Span::new(start, end),
                ));
            }
            let node = self.anchors.get(&name).cloned().ok_or_else(|| {
                ParseError::at(format!("unknown anchor '{name}'"), Span::new(start, end))
            })?;
            self.idx += 1;
            return Ok((node, end));
        }

        if rest.starts_with('!') {
            // Tags are recognized and dropped.
            let tag_len: usize = rest
                .chars()
                .take_while(|c| *c != ' ')
                .map(|c| c.len_utf8())
                .sum();
            let mut after = start + tag_len;
            while self.text[after..end].starts_with(' ') {
                after += 1;
            }
            if after < end {
                return self.inline_value(after, end, indent, seq_ok);
            }
            self.idx += 1;
            return self.nested_value(indent, after, seq_ok);
        }

        if rest.starts_with('|') || rest.starts_with('>') {
            return self.block_scalar(start, end, indent);
        }

        if rest.starts_with('[') || rest.starts_with('{') {
            let mut pos = start;
            let node = self.flow_node(&mut pos)?;
            self.sync_to_offset(pos)?;
            return Ok((node, pos));
        }

        if rest.starts_with('"') || rest.starts_with('\'') {
            let (value, scalar_end) = self.quoted_scalar(start)?;
            if !self.text[scalar_end..end].trim().is_empty() {
                return Err(ParseError::at(
                    "unexpected content after quoted scalar",
                    Span::new(scalar_end, end),
                ));
            }
            self.idx += 1;
            return Ok((
                ParseNode::Scalar {
                    value: Scalar::String(value),
                    span: Span::new(start, scalar_end),
                },
                scalar_end,
            ));
        }

        // Plain scalar, folded over following more-indented lines.
        self.idx += 1;
        let mut text = rest.to_string();
        let mut span = Span::new(start, end);
        while self.idx < self.end {
            let line = self.lines[self.idx].clone();
            if line.is_blank() {
                self.idx += 1;
                continue;
            }
            if line.indent <= indent {
                break;
            }
            if self.has_key_colon(&line) {
                return Err(ParseError::at(
                    "mapping values are not allowed in this context",
                    Span::new(line.content_start, line.content_end),
                ));
            }
            if self.is_seq_entry(&line) {
                return Err(ParseError::at(
                    "sequence entries are not allowed in this context",
                    Span::new(line.content_start, line.content_end),
                ));
            }
            text.push(' ');
            text.push_str(self.content(&line));
            span.end = line.content_end;
            self.idx += 1;
        }

        Ok((
            ParseNode::Scalar {
                value: resolve_plain(&text),
                span,
            },
            span.end,
        ))
    }

    fn block_scalar(
        &mut self,
        start: usize,
        end: usize,
        indent: usize,
    ) -> Result<(ParseNode, usize), ParseError> {
        let header = &self.text[start..end];
        let folded = header.starts_with('>');

        let mut chomp_strip = false;
        let mut chomp_keep = false;
        let mut explicit_indent = None;
        for c in header[1..].chars() {
            match c {
                '-' => chomp_strip = true,
                '+' => chomp_keep = true,
                '1'..='9' => explicit_indent = Some(indent + (c as usize - '0' as usize)),
                _ => {
                    return Err(ParseError::at(
                        "invalid block scalar header",
                        Span::new(start, end),
                    ))
                }
            }
        }
        self.idx += 1;

        // Block indentation comes from the header or the first non-blank line.
        let mut block_indent = explicit_indent;
        let mut pieces: Vec<Option<String>> = Vec::new(); // None is a blank line
        let mut span = Span::new(start, end);

        while self.idx < self.end {
            let line = self.lines[self.idx].clone();
            let raw = &self.text[line.begin..line.raw_end];

            if raw.trim().is_empty() {
                pieces.push(None);
                self.idx += 1;
                continue;
            }
            let raw_indent = raw.len() - raw.trim_start_matches(' ').len();
            let effective = match block_indent {
                Some(i) => i,
                None if raw_indent > indent => {
                    block_indent = Some(raw_indent);
                    raw_indent
                }
                None => break,
            };
            if raw_indent < effective {
                break;
            }
            pieces.push(Some(
                self.text[line.begin + effective..line.raw_end].to_string(),
            ));
            span.end = line.raw_end;
            self.idx += 1;
        }

        // Trailing blank lines participate only under `+` chomping.
        if !chomp_keep {
            let blanks = pieces.iter().rev().take_while(|p| p.is_none()).count();
            pieces.truncate(pieces.len() - blanks);
        }

        let mut out = String::new();
        if folded {
            let mut prev_content = false;
            for piece in &pieces {
                match piece {
                    Some(text) => {
                        if prev_content {
                            out.push(' ');
                        }
                        out.push_str(text);
                        prev_content = true;
                    }
                    None => {
                        out.push('\n');
                        prev_content = false;
                    }
                }
            }
        } else {
            out = pieces
                .iter()
                .map(|p| p.as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\n");
        }
        if !chomp_strip && !out.is_empty() {
            out.push('\n');
        }

        Ok((
            ParseNode::Scalar {
                value: Scalar::String(out),
                span,
            },
            span.end,
        ))
    }

    /// Scan a quoted scalar starting at `start`, returning its unescaped
    /// value and the offset one past the closing quote. Quoted scalars do
    /// not continue across lines.
    fn quoted_scalar(&self, start: usize) -> Result<(String, usize), ParseError> {
        let quote = self.text.as_bytes()[start];
        let mut out = String::new();
        let mut chars = self.text[start + 1..].char_indices();

        while let Some((rel, c)) = chars.next() {
            let at = start + 1 + rel;
            if c == '\n' {
                break;
            }
            if quote == b'\'' {
                if c == '\'' {
                    // A doubled quote is an escaped quote.
                    if self.text[at + 1..].starts_with('\'') {
                        chars.next();
                        out.push('\'');
                    } else {
                        return Ok((out, at + 1));
                    }
                } else {
                    out.push(c);
                }
            } else if c == '"' {
                return Ok((out, at + 1));
            } else if c == '\\' {
                let (_, escape) = chars
                    .next()
                    .ok_or_else(|| ParseError::at("unterminated escape", Span::point(at)))?;
                match escape {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    '/' => out.push('/'),
                    'u' => {
                        let hex: String =
                            (0..4).filter_map(|_| chars.next().map(|(_, c)| c)).collect();
                        let code = u32::from_str_radix(&hex, 16).map_err(|_| {
                            ParseError::at("invalid unicode escape", Span::point(at))
                        })?;
                        out.push(char::from_u32(code).ok_or_else(|| {
                            ParseError::at("invalid unicode escape", Span::point(at))
                        })?);
                    }
                    other => {
                        return Err(ParseError::at(
                            format!("invalid escape `\\{other}`"),
                            Span::point(at),
                        ))
                    }
                }
            } else {
                out.push(c);
            }
        }
        Err(ParseError::at(
            "unterminated quoted scalar",
            Span::point(start),
        ))
    }

    /// Advance the line cursor past `offset`, verifying nothing but blanks
    /// and comments trail it on its line.
    fn sync_to_offset(&mut self, offset: usize) -> Result<(), ParseError> {
        while self.idx < self.lines.len() && self.lines[self.idx].raw_end < offset {
            self.idx += 1;
        }
        if self.idx < self.lines.len() {
            let line = self.lines[self.idx].clone();
            if offset < line.content_end && !self.text[offset..line.content_end].trim().is_empty() {
                return Err(ParseError::at(
                    "unexpected content after flow collection",
                    Span::new(offset, line.content_end),
                ));
            }
            self.idx += 1;
        }
        Ok(())
    }

    fn flow_skip_ws(&self, pos: &mut usize) {
        let bytes = self.text.as_bytes();
        loop {
            match bytes.get(*pos) {
                Some(b' ' | b'\t' | b'\n' | b'\r') => *pos += 1,
                Some(b'#') if *pos > 0 && matches!(bytes[*pos - 1], b' ' | b'\t' | b'\n') => {
                    while !matches!(bytes.get(*pos), Some(b'\n') | None) {
                        *pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    /// Character-level parser for flow collections and their scalars, which
    /// may continue across lines.
    fn flow_node(&mut self, pos: &mut usize) -> Result<ParseNode, ParseError> {
        self.flow_skip_ws(pos);
        let begin = *pos;

        match self.text.as_bytes().get(*pos) {
            Some(b'[') => {
                *pos += 1;
                let mut items = Vec::new();
                loop {
                    self.flow_skip_ws(pos);
                    if self.text[*pos..].starts_with(']') {
                        *pos += 1;
                        break;
                    }
                    items.push(self.flow_node(pos)?);
                    self.flow_skip_ws(pos);
                    if self.text[*pos..].starts_with(',') {
                        *pos += 1;
                    } else if !self.text[*pos..].starts_with(']') {
                        return Err(ParseError::at("expected `,` or `]`", Span::point(*pos)));
                    }
                }
                Ok(ParseNode::Sequence {
                    items,
                    span: Span::new(begin, *pos),
                })
            }
            Some(b'{') => {
                *pos += 1;
                let mut entries: Vec<MapEntry> = Vec::new();
                loop {
                    self.flow_skip_ws(pos);
                    if self.text[*pos..].starts_with('}') {
                        *pos += 1;
                        break;
                    }
                    let key_begin = *pos;
                    let (key, key_span) = match self.text.as_bytes()[*pos] {
                        b'"' | b'\'' => {
                            let (key, end) = self.quoted_scalar(*pos)?;
                            *pos = end;
                            (key, Span::new(key_begin, end))
                        }
                        _ => {
                            let raw = self.flow_plain(pos, true);
                            let span = Span::new(key_begin, *pos);
                            if !matches!(resolve_plain(&raw), Scalar::String(_)) {
                                self.warnings.push(ParseWarning::NonStringKey { span });
                            }
                            (raw, span)
                        }
                    };
                    self.flow_skip_ws(pos);
                    if !self.text[*pos..].starts_with(':') {
                        return Err(ParseError::at("expected `:`", Span::point(*pos)));
                    }
                    *pos += 1;
                    let value = self.flow_node(pos)?;

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
                    self.flow_skip_ws(pos);
                    if self.text[*pos..].starts_with(',') {
                        *pos += 1;
                    } else if !self.text[*pos..].starts_with('}') {
                        return Err(ParseError::at("expected `,` or `}`", Span::point(*pos)));
                    }
                }
                Ok(ParseNode::Mapping {
                    entries,
                    span: Span::new(begin, *pos),
                })
            }
            Some(b'"') | Some(b'\'') => {
                let (value, end) = self.quoted_scalar(*pos)?;
                *pos = end;
                Ok(ParseNode::Scalar {
                    value: Scalar::String(value),
                    span: Span::new(begin, end),
                })
            }
            Some(b'*') => {
                *pos += 1;
                let name = self.flow_plain(pos, false);
                self.anchors.get(name.trim()).cloned().ok_or_else(|| {
                    ParseError::at(
                        format!("unknown anchor '{}'", name.trim()),
                        Span::new(begin, *pos),
                    )
                })
            }
            Some(_) => {
                let raw = self.flow_plain(pos, false);
                if raw.is_empty() {
                    return Err(ParseError::at("expected a value", Span::point(begin)));
                }
                Ok(ParseNode::Scalar {
                    value: resolve_plain(&raw),
                    span: Span::new(begin, begin + raw.len()),
                })
            }
            None => Err(ParseError::at(
                "unexpected end of flow collection",
                Span::point(*pos),
            )),
        }
    }

    /// A plain scalar inside a flow collection, ended by flow punctuation.
    fn flow_plain(&self, pos: &mut usize, stop_at_colon: bool) -> String {
        let begin = *pos;
        for (rel, c) in self.text[begin..].char_indices() {
            let stop =
                matches!(c, ',' | ']' | '}' | '[' | '{' | '\n') || (stop_at_colon && c == ':');
            if stop {
                let raw = self.text[begin..begin + rel].trim_end();
                *pos = begin + raw.len();
                return raw.to_string();
            }
        }
        let raw = self.text[begin..].trim_end();
        *pos = begin + raw.len();
        raw.to_string()
    }

    fn find_key_colon(&self, start: usize, end: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let (mut in_single, mut in_double, mut escaped) = (false, false, false);
        let mut flow_depth = 0usize;

        for at in start..end {
            let b = bytes[at];
            if in_double {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_double = false;
                }
            } else if in_single {
                if b == b'\'' {
                    in_single = false;
                }
            } else {
                match b {
                    b'"' => in_double = true,
                    b'\'' => in_single = true,
                    b'[' | b'{' => flow_depth += 1,
                    b']' | b'}' => flow_depth = flow_depth.saturating_sub(1),
                    b':' if flow_depth == 0
                        && (at + 1 == end || matches!(bytes[at + 1], b' ' | b'\t')) =>
                    {
                        return Some(at);
                    }
                    _ => {}
                }
            }
        }
        None
    }
}

/// Resolve a plain scalar per the YAML core schema.
fn resolve_plain(s: &str) -> Scalar {
    let s = s.trim();
    match s {
        "" | "~" | "null" | "Null" | "NULL" => return Scalar::Null,
        "true" | "True" | "TRUE" => return Scalar::Bool(true),
        "false" | "False" | "FALSE" => return Scalar::Bool(false),
        ".inf" | "+.inf" => return Scalar::Number(Number::Float(f64::INFINITY)),
        "-.inf" => return Scalar::Number(Number::Float(f64::NEG_INFINITY)),
        ".nan" => return Scalar::Number(Number::Float(f64::NAN)),
        _ => {}
    }

    let unsigned = s.strip_prefix('+').unwrap_or(s);
    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(u) = unsigned.parse::<u64>() {
            return Scalar::Number(Number::Unsigned(u));
        }
    }
    if let Some(negative) = s.strip_prefix('-') {
        if !negative.is_empty() && negative.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = s.parse::<i64>() {
                return Scalar::Number(Number::Signed(i));
            }
        }
    }
    if looks_like_float(s) {
        if let Ok(f) = s.parse::<f64>() {
            return Scalar::Number(Number::Float(f));
        }
    }
    Scalar::String(s.to_string())
}

fn looks_like_float(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'-' | b'+'))
        && body.bytes().any(|b| b.is_ascii_digit())
        && body.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn value_of(text: &str) -> serde_json::Value {
        parse(text).unwrap().0.to_value()
    }

    #[test]
    fn test_block_structures() {
        let text = "\
openapi: 3.0.0
info:
  title: Test API
  version: '1.0'
tags:
- name: pets
  description: All about pets
- name: store
paths: {}
";
        assert_eq!(
            value_of(text),
            json!({
                "openapi": "3.0.0",
                "info": {"title": "Test API", "version": "1.0"},
                "tags": [
                    {"name": "pets", "description": "All about pets"},
                    {"name": "store"},
                ],
                "paths": {},
            }),
        );
    }

    #[test]
    fn test_scalars() {
        let text = "\
a: 12
b: -7
c: 3.5
d: true
e: null
f: ~
g:
h: 2023-01-02
i: +8
j: https://example.com/path
";
        assert_eq!(
            value_of(text),
            json!({
                "a": 12, "b": -7, "c": 3.5, "d": true, "e": null,
                "f": null, "g": null, "h": "2023-01-02", "i": 8,
                "j": "https://example.com/path",
            }),
        );
    }

    #[test]
    fn test_spans_and_key_spans() {
        let text = "info:\n  title: Test\n";
        let (node, _) = parse(text).unwrap();

        let info = node.entry("info").unwrap();
        assert_eq!(&text[info.key_span.begin..info.key_span.end], "info");

        let title = info.value.entry("title").unwrap();
        assert_eq!(&text[title.key_span.begin..title.key_span.end], "title");
        let span = title.value.span();
        assert_eq!(&text[span.begin..span.end], "Test");
    }

    #[test]
    fn test_flow_collections() {
        let text = "type: [string, 'null']\nmap: {a: 1, b: [2, 3]}\n";
        assert_eq!(
            value_of(text),
            json!({"type": ["string", "null"], "map": {"a": 1, "b": [2, 3]}}),
        );

        // Multi-line flow.
        let text = "type: [\n  string,\n  integer,\n]\nnext: 1\n";
        assert_eq!(
            value_of(text),
            json!({"type": ["string", "integer"], "next": 1}),
        );
    }

    #[test]
    fn test_comments_and_quotes() {
        let text = "\
a: value # trailing comment
# full-line comment
b: 'single # not a comment'
c: \"double \\\" quote\"
d: plain#notcomment
";
        assert_eq!(
            value_of(text),
            json!({
                "a": "value",
                "b": "single # not a comment",
                "c": "double \" quote",
                "d": "plain#notcomment",
            }),
        );
    }

    #[test]
    fn test_block_scalars() {
        let text = "\
literal: |
  line one
  line two
folded: >
  fold
  these
stripped: |-
  no newline
keeps_blank: |
  a

  b
next: 1
";
        assert_eq!(
            value_of(text),
            json!({
                "literal": "line one\nline two\n",
                "folded": "fold these\n",
                "stripped": "no newline",
                "keeps_blank": "a\n\nb\n",
                "next": 1,
            }),
        );
    }

    #[test]
    fn test_plain_scalar_folding() {
        let text = "description: a long\n  folded description\nnext: 1\n";
        assert_eq!(
            value_of(text),
            json!({"description": "a long folded description", "next": 1}),
        );
    }

    #[test]
    fn test_anchors_and_aliases() {
        let text = "base: &shared\n  a: 1\ncopy: *shared\ninline: &num 7\nalso: *num\n";
        assert_eq!(
            value_of(text),
            json!({"base": {"a": 1}, "copy": {"a": 1}, "inline": 7, "also": 7}),
        );

        // Aliases of undefined (or still-open) anchors are rejected.
        assert!(parse("a: *missing\n").is_err());
    }

    #[test]
    fn test_reported_not_fatal() {
        let (node, warnings) = parse("a: 1\na: 2\n1: x\n").unwrap();
        assert_eq!(node.to_value(), json!({"a": 1, "1": "x"}));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::DuplicateKey { key, .. } if key == "a")));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::NonStringKey { .. })));

        let (_, warnings) = parse("a:\n\tb: 1\n").unwrap();
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::TabIndent { .. })));
    }

    #[test]
    fn test_document_markers() {
        let text = "---\na: 1\n...\nignored: 2\n";
        assert_eq!(value_of(text), json!({"a": 1}));

        let text = "%YAML 1.2\n---\na: 1\n";
        assert_eq!(value_of(text), json!({"a": 1}));
    }

    #[test]
    fn test_nested_sequences() {
        let text = "matrix:\n- - 1\n  - 2\n- - 3\n";
        assert_eq!(value_of(text), json!({"matrix": [[1, 2], [3]]}));

        // A lone dash does not swallow its same-indent sibling.
        let text = "seq:\n-\n- a\n";
        assert_eq!(value_of(text), json!({"seq": [null, "a"]}));
    }

    #[test]
    fn test_syntax_errors() {
        // Unterminated quote.
        assert!(parse("a: 'open\n").is_err());
        // Stray indentation after a complete value.
        assert!(parse("a: 1\n    b: 2\n").is_err());
        // Complex keys.
        assert!(parse("? [a, b]\n: 1\n").is_err());
    }

    #[test]
    fn test_empty_document() {
        let (node, _) = parse("# only comments\n").unwrap();
        assert_eq!(node.to_value(), json!(null));
    }
}
