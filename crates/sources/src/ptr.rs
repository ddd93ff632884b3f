use crate::location::Location;
use crate::parse::ParseNode;
use std::str::FromStr;

/// Token is one parsed segment of an RFC 6901 JSON pointer.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Token {
    /// Integer index into a sequence. When applied to a mapping the decimal
    /// rendering doubles as a property name.
    Index(usize),
    /// Mapping property name, unescaped. Never a canonical integer.
    Property(String),
}

impl Token {
    fn from_segment(s: &str) -> Token {
        // "01" and "+2" are valid property names but not canonical indices.
        if s.starts_with('+') || (s.starts_with('0') && s.len() > 1) {
            Token::Property(s.to_string())
        } else if let Ok(ind) = usize::from_str(s) {
            Token::Index(ind)
        } else {
            Token::Property(s.to_string())
        }
    }

    pub fn as_property(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Token::Index(ind) => std::borrow::Cow::Owned(ind.to_string()),
            Token::Property(p) => std::borrow::Cow::Borrowed(p),
        }
    }
}

/// Pointer is a parsed JSON pointer: an ordered sequence of Tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pointer(pub Vec<Token>);

impl Pointer {
    /// An empty Pointer referencing the document root.
    pub fn root() -> Pointer {
        Pointer(Vec::new())
    }

    /// Parse an encoded JSON pointer, decoding `~1` then `~0` escapes.
    /// Un-rooted pointers are tolerated and treated as rooted.
    pub fn parse(s: &str) -> Pointer {
        if s.is_empty() {
            return Pointer(Vec::new());
        }
        let segments = s
            .split('/')
            .skip(if s.starts_with('/') { 1 } else { 0 })
            .map(|t| t.replace("~1", "/").replace("~0", "~"));

        Pointer(segments.map(|s| Token::from_segment(&s)).collect())
    }

    /// Build a Pointer from a Location. Neither representation escapes
    /// property names, so steps carry over verbatim.
    pub fn from_location(location: &Location) -> Pointer {
        location.fold(Pointer::root(), |location, mut ptr| {
            match location {
                Location::Root => {}
                Location::Property { name, .. } => {
                    ptr.0.push(Token::Property(name.to_string()));
                }
                Location::Item { index, .. } => {
                    ptr.0.push(Token::Index(*index));
                }
            }
            ptr
        })
    }

    pub fn push(&mut self, token: Token) -> &mut Pointer {
        self.0.push(token);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.0.iter()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Query the node at this pointer's location, or None if the location
    /// (or a parent thereof) does not exist.
    pub fn query<'n>(&self, mut node: &'n ParseNode) -> Option<&'n ParseNode> {
        for token in self.iter() {
            let next = match node {
                ParseNode::Mapping { entries, .. } => {
                    let name = token.as_property();
                    entries
                        .iter()
                        .find(|e| e.key == name.as_ref())
                        .map(|e| &e.value)
                }
                ParseNode::Sequence { items, .. } => match token {
                    Token::Index(ind) => items.get(*ind),
                    Token::Property(_) => None,
                },
                _ => None,
            };
            node = next?;
        }
        Some(node)
    }
}

impl<S: AsRef<str>> From<S> for Pointer {
    fn from(s: S) -> Self {
        Pointer::parse(s.as_ref())
    }
}

impl std::fmt::Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for token in self.iter() {
            write!(f, "/")?;
            match token {
                Token::Index(ind) => write!(f, "{ind}")?,
                Token::Property(p) => write!(f, "{}", p.replace('~', "~0").replace('/', "~1"))?,
            }
        }
        Ok(())
    }
}

impl serde::Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Pointer::parse(&s))
    }
}
