pub mod fetch;
pub mod location;
pub mod parse;
pub mod ptr;
pub mod resolve;
pub mod scope;
pub mod span;
pub mod store;

pub use fetch::{FetchError, Fetcher, MapFetcher, SourceFetcher};
pub use location::Location;
pub use parse::{MapEntry, Number, ParseError, ParseNode, ParseWarning, Scalar};
pub use ptr::{Pointer, Token};
pub use resolve::{Catalog, CircularRef, Loader, ResolveError, ResolvedRef, Resolution};
pub use scope::Scope;
pub use span::Span;
pub use store::Source;
