//! Lazy navigation over JSON response bodies.

use serde_json::Value;

/// A borrow-based navigator over a parsed JSON document.
///
/// API responses are deeply nested and most call sites only want one or
/// two leaves; `JsonTree` walks the parsed tree on demand instead of
/// deserializing whole responses into structs. Navigation never fails
/// loudly: a missing key or wrong type yields `None`, so probing
/// alternate shapes is cheap.
///
/// # Example
///
/// ```rust
/// use lightbox_api::clients::JsonTree;
/// use serde_json::json;
///
/// let body = json!({
///     "photos": [
///         { "id": 42, "name": "Dawn over the ridge" }
///     ],
///     "total_items": 1
/// });
///
/// let tree = JsonTree::new(&body);
/// assert_eq!(tree.at("photos").index(0).at("name").str(), Some("Dawn over the ridge"));
/// assert_eq!(tree.at("photos").index(0).at("id").i64(), Some(42));
/// assert_eq!(tree.at("total_items").i64(), Some(1));
/// assert_eq!(tree.at("missing").at("deeper").str(), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct JsonTree<'a> {
    node: Option<&'a Value>,
}

impl<'a> JsonTree<'a> {
    /// Wraps a parsed document root.
    #[must_use]
    pub const fn new(root: &'a Value) -> Self {
        Self { node: Some(root) }
    }

    const EMPTY: Self = Self { node: None };

    /// Descends into an object field.
    ///
    /// `path` may be a single key or a dot-separated chain
    /// (`"user.avatar.url"`).
    #[must_use]
    pub fn at(&self, path: &str) -> Self {
        let mut node = self.node;
        for key in path.split('.') {
            node = node.and_then(|value| value.get(key));
        }
        Self { node }
    }

    /// Descends into an array element.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self {
            node: self.node.and_then(|value| value.get(index)),
        }
    }

    /// Returns the node as a string.
    #[must_use]
    pub fn str(&self) -> Option<&'a str> {
        self.node.and_then(Value::as_str)
    }

    /// Returns the node as a signed integer.
    #[must_use]
    pub fn i64(&self) -> Option<i64> {
        self.node.and_then(Value::as_i64)
    }

    /// Returns the node as a float.
    #[must_use]
    pub fn f64(&self) -> Option<f64> {
        self.node.and_then(Value::as_f64)
    }

    /// Returns the node as a boolean.
    #[must_use]
    pub fn bool(&self) -> Option<bool> {
        self.node.and_then(Value::as_bool)
    }

    /// Returns the length of an array node.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        self.node.and_then(Value::as_array).map(Vec::len)
    }

    /// Returns `true` if the node is an empty array, or absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len().map_or(true, |len| len == 0)
    }

    /// Returns `true` if navigation reached an existing node.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.node.is_some()
    }

    /// Returns the underlying value, when present.
    #[must_use]
    pub const fn value(&self) -> Option<&'a Value> {
        self.node
    }

    /// Iterates over the elements of an array node.
    pub fn iter(&self) -> impl Iterator<Item = JsonTree<'a>> + '_ {
        self.node
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|value| Self { node: Some(value) })
    }
}

impl Default for JsonTree<'_> {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "photo": {
                "id": 7,
                "name": "Harbor light",
                "user": { "username": "ansel" },
                "tags": ["mono", "coastal"],
                "nsfw": false
            }
        })
    }

    #[test]
    fn test_dot_path_navigation() {
        let body = body();
        let tree = JsonTree::new(&body);
        assert_eq!(tree.at("photo.user.username").str(), Some("ansel"));
        assert_eq!(tree.at("photo.id").i64(), Some(7));
        assert_eq!(tree.at("photo.nsfw").bool(), Some(false));
    }

    #[test]
    fn test_missing_paths_yield_none_not_panic() {
        let body = body();
        let tree = JsonTree::new(&body);
        assert_eq!(tree.at("photo.missing.deeper").str(), None);
        assert!(!tree.at("nothing").exists());
        assert_eq!(tree.at("photo.name").i64(), None); // wrong type
    }

    #[test]
    fn test_array_access_and_iteration() {
        let body = body();
        let tags = JsonTree::new(&body).at("photo.tags");
        assert_eq!(tags.len(), Some(2));
        assert!(!tags.is_empty());
        assert_eq!(tags.index(0).str(), Some("mono"));
        assert_eq!(tags.index(9).str(), None);

        let collected: Vec<_> = tags.iter().filter_map(|tag| tag.str()).collect();
        assert_eq!(collected, vec!["mono", "coastal"]);
    }

    #[test]
    fn test_is_empty_for_absent_nodes() {
        let body = body();
        assert!(JsonTree::new(&body).at("photo.absent").is_empty());
    }
}
