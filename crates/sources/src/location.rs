use std::fmt::{self, Write};

/// `Location` of a value within a single parsed document, represented as a
/// stack-allocated linked list of property and item steps.
///
/// Locations render as RFC 6901 JSON pointers. Two renderings are offered:
/// `pointer_str` escapes only `~` and `/`, while `url_escaped` additionally
/// percent-encodes for inclusion in a URL fragment.
#[derive(Copy, Clone)]
pub enum Location<'a> {
    Root,
    Property {
        parent: &'a Location<'a>,
        name: &'a str,
    },
    Item {
        parent: &'a Location<'a>,
        index: usize,
    },
}

impl<'a> Location<'a> {
    /// Extend this Location with a mapping property.
    pub fn push_prop(&'a self, name: &'a str) -> Location<'a> {
        Location::Property { parent: self, name }
    }

    /// Extend this Location with a sequence index.
    pub fn push_item(&'a self, index: usize) -> Location<'a> {
        Location::Item {
            parent: self,
            index,
        }
    }

    /// Fold over the steps of this Location, root first.
    pub fn fold<T, F>(&self, init: T, mut fun: F) -> T
    where
        F: FnMut(&Location<'a>, T) -> T,
    {
        fn inner<'a, T, F>(loc: &Location<'a>, init: T, fun: &mut F) -> T
        where
            F: FnMut(&Location<'a>, T) -> T,
        {
            let acc = match loc {
                Location::Root => init,
                Location::Property { parent, .. } | Location::Item { parent, .. } => {
                    inner(parent, init, fun)
                }
            };
            fun(loc, acc)
        }
        inner(self, init, &mut fun)
    }

    /// Rendering which escapes only `~` and `/` of property names.
    pub fn pointer_str(&'a self) -> impl fmt::Display + 'a {
        DisplayWith(self, false)
    }

    /// Rendering which is additionally percent-encoded for URL fragments.
    pub fn url_escaped(&'a self) -> impl fmt::Display + 'a {
        DisplayWith(self, true)
    }
}

impl<'a> fmt::Debug for Location<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pointer_str())
    }
}

struct DisplayWith<'a>(&'a Location<'a>, bool);

impl<'a> fmt::Display for DisplayWith<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fold(Ok(()), |loc, result: fmt::Result| {
            result.and_then(|()| match loc {
                Location::Root => Ok(()),
                Location::Item { index, .. } => write!(f, "/{index}"),
                Location::Property { name, .. } if self.1 => {
                    f.write_char('/')?;
                    for piece in percent_encoding::utf8_percent_encode(name, FRAGMENT_ESCAPE_SET) {
                        write_escaped(f, piece)?;
                    }
                    Ok(())
                }
                Location::Property { name, .. } => {
                    f.write_char('/')?;
                    write_escaped(f, name)
                }
            })
        })
    }
}

fn write_escaped(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '~' => f.write_str("~0")?,
            '/' => f.write_str("~1")?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

// Superset of the fragment and query percent-encode sets.
// See: https://url.spec.whatwg.org/#fragment-percent-encode-set
const FRAGMENT_ESCAPE_SET: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b'%')
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'&')
    .add(b'=');
