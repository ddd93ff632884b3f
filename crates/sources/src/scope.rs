use crate::location::Location;
use crate::ptr::Pointer;
use url::Url;

/// Scope is a stack-based mechanism tracking the fine-grained location of a
/// walk through one or more resources. A new resource is pushed each time
/// traversal crosses a `$ref` boundary, which resets the Location while
/// preserving the outer chain.
#[derive(Copy, Clone)]
pub struct Scope<'a> {
    /// Parent of this Scope, or None if this is the walk root.
    pub parent: Option<&'a Scope<'a>>,
    /// Resource of this Scope, Some if and only if this Scope roots
    /// processing of a new resource.
    pub resource: Option<&'a Url>,
    /// Location within the current resource.
    pub location: Location<'a>,
}

impl<'a> Scope<'a> {
    /// Create a new Scope rooted at the given resource.
    pub fn new(resource: &'a Url) -> Scope<'a> {
        Scope {
            parent: None,
            resource: Some(resource),
            location: Location::Root,
        }
    }

    /// Push a resource boundary, returning a new Scope rooted in it.
    pub fn push_resource(&'a self, resource: &'a Url) -> Scope<'a> {
        Scope {
            parent: Some(self),
            resource: Some(resource),
            location: Location::Root,
        }
    }

    /// Push a mapping property onto the current Scope.
    pub fn push_prop(&'a self, name: &'a str) -> Scope<'a> {
        Scope {
            parent: Some(self),
            resource: None,
            location: self.location.push_prop(name),
        }
    }

    /// Push a sequence index onto the current Scope.
    pub fn push_item(&'a self, index: usize) -> Scope<'a> {
        Scope {
            parent: Some(self),
            resource: None,
            location: self.location.push_item(index),
        }
    }

    /// The resource within which this Scope is located.
    pub fn resource(&self) -> &'a Url {
        let mut cur = self;
        loop {
            match (cur.resource, cur.parent) {
                (Some(r), _) => return r,
                (None, Some(p)) => cur = p,
                (None, None) => unreachable!("root scope always has a resource"),
            }
        }
    }

    /// The pointer of this Scope within its resource.
    pub fn pointer(&self) -> Pointer {
        Pointer::from_location(&self.location)
    }

    /// Number of resources on the stack of this Scope.
    pub fn resource_depth(&self) -> usize {
        self.parent.map_or(0, |p| p.resource_depth()) + self.resource.map_or(0, |_| 1)
    }

    /// Flatten into the current resource URI extended with a fragment-encoded
    /// JSON pointer of the current location.
    pub fn flatten(&self) -> Url {
        let mut url = self.resource().clone();
        if !matches!(self.location, Location::Root) {
            url.set_fragment(Some(&self.location.url_escaped().to_string()));
        }
        url
    }

    /// Unwind into `(resource, pointer)` steps, innermost first: the current
    /// location, then the location of each `$ref` site crossed to reach it.
    pub fn chain(&self) -> Vec<(Url, Pointer)> {
        let mut out = Vec::new();
        let mut scope = Some(self);

        while let Some(s) = scope {
            // Find the Scope which roots s's resource; s's location is
            // relative to it. The resource root's parent, if any, is the
            // ref site within the enclosing resource.
            let mut root = s;
            while root.resource.is_none() {
                root = root.parent.expect("non-resource scope has a parent");
            }
            out.push((root.resource.expect("root scope").clone(), s.pointer()));
            scope = root.parent;
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::{Scope, Url};

    #[test]
    fn test_flatten_and_chain() {
        let ra = Url::parse("https://example/openapi.yaml").unwrap();
        let rb = Url::parse("https://example/shared.yaml").unwrap();

        let s1 = Scope::new(&ra);
        let s2 = s1.push_prop("paths");
        let s3 = s2.push_prop("/test");
        let s4 = s3.push_resource(&rb);
        let s5 = s4.push_prop("get");

        assert_eq!(s3.flatten().as_str(), "https://example/openapi.yaml#/paths/~1test");
        assert_eq!(s5.flatten().as_str(), "https://example/shared.yaml#/get");

        assert_eq!(s1.resource_depth(), 1);
        assert_eq!(s5.resource_depth(), 2);

        let chain = s5.chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].0, rb);
        assert_eq!(chain[0].1.to_string(), "/get");
        assert_eq!(chain[1].0, ra);
        assert_eq!(chain[1].1.to_string(), "/paths/~1test");
    }
}
