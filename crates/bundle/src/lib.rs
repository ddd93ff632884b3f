//! Emission modes over a loaded document graph: bundling external
//! references into `components`, dereferencing them inline, and normalizing
//! top-level key order.

mod normalize;
mod rewrite;

pub use normalize::normalize;
pub use rewrite::{bundle, dereference};

use sources::{Pointer, ResolveError, Token};
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum BundleError {
    #[error("circular reference at '{uri}#{pointer}' cannot be dereferenced to JSON")]
    CircularJsonNotSupported { uri: Url, pointer: Pointer },

    #[error("'{uri}' was not loaded")]
    MissingSource { uri: Url },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub fn to_json_string(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).expect("JSON values serialize")
}

pub fn to_yaml_string(value: &serde_json::Value) -> String {
    serde_yaml::to_string(value).expect("JSON values serialize as YAML")
}

/// Apply decorator edits recorded during a walk: each `(source, pointer)`
/// addressed value is replaced in the emitted document. Only edits against
/// `root` apply; edits inside referenced sources surface where the bundler
/// inlined them, which is already their rewritten form.
pub fn apply_edits(
    value: &mut serde_json::Value,
    edits: &[(Url, Pointer, serde_json::Value)],
    root: &Url,
) {
    for (source, pointer, replacement) in edits {
        if source != root {
            continue;
        }
        if let Some(slot) = value_at_mut(value, pointer) {
            *slot = replacement.clone();
        }
    }
}

fn value_at_mut<'v>(
    value: &'v mut serde_json::Value,
    pointer: &Pointer,
) -> Option<&'v mut serde_json::Value> {
    let mut cursor = value;
    for token in pointer.iter() {
        cursor = match cursor {
            serde_json::Value::Object(map) => map.get_mut(token.as_property().as_ref())?,
            serde_json::Value::Array(items) => match token {
                Token::Index(index) => items.get_mut(*index)?,
                Token::Property(_) => return None,
            },
            _ => return None,
        };
    }
    Some(cursor)
}
