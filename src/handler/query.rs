//! Query string carried in the invocation event
//!
//! API Gateway renders `$input.params().querystring` as `{key=val, key2=val2}`.

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// Parse the `{key=val, key2=val2}` form.
    ///
    /// The outer braces are removed, `", "` separators become `&` and the
    /// result is form-decoded. Pairs with an empty key are dropped.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let inner = raw
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(raw);
        let joined = inner.replace(", ", "&");

        let pairs = url::form_urlencoded::parse(joined.as_bytes())
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self(pairs)
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
