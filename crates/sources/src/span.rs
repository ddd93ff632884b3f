/// Half-open `[begin, end)` byte range into the text of a single Source.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Span {
        Span { begin, end }
    }

    /// A zero-width span anchored at `at`, used for locations which exist
    /// logically but have no text of their own (an omitted mapping value).
    pub fn point(at: usize) -> Span {
        Span { begin: at, end: at }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.begin <= offset && offset < self.end
    }
}

/// LineMap maps byte offsets of a text to 1-based (line, column) positions.
/// Columns are counted in characters, not bytes.
#[derive(Debug)]
pub struct LineMap {
    // Byte offset at which each line starts. starts[0] is always zero.
    starts: Vec<usize>,
    text_len: usize,
}

impl LineMap {
    pub fn new(text: &str) -> LineMap {
        let mut starts = vec![0];
        for (offset, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(offset + 1);
            }
        }
        LineMap {
            starts,
            text_len: text.len(),
        }
    }

    /// Map `offset` to its 1-based (line, column). Offsets beyond the text
    /// clamp to its end.
    pub fn position(&self, text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text_len);
        let line = match self.starts.binary_search(&offset) {
            Ok(ind) => ind,
            Err(ind) => ind - 1,
        };
        let column = text[self.starts[line]..offset].chars().count();
        (line + 1, column + 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_positions() {
        let text = "openapi: 3.0.0\ninfo:\n  title: naïve\n";
        let map = LineMap::new(text);

        assert_eq!(map.position(text, 0), (1, 1));
        assert_eq!(map.position(text, 9), (1, 10));
        assert_eq!(map.position(text, 15), (2, 1));
        assert_eq!(map.position(text, 23), (3, 3));
        // The two-byte ï counts as a single column.
        let eol = text.len() - 1;
        assert_eq!(map.position(text, eol), (3, 15));
        // Clamped.
        assert_eq!(map.position(text, 10_000), (4, 1));
    }

    #[test]
    fn test_span_containment() {
        let span = Span::new(4, 10);
        assert!(!span.contains(3));
        assert!(span.contains(4));
        assert!(span.contains(9));
        assert!(!span.contains(10));
        assert!(!Span::point(4).contains(4));
    }
}
