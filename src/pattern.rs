//! Path-template compilation and matching.
//!
//! A template is a `/`-separated sequence of segments. Each segment is either
//! a literal (`users`) or a named capture (`{id}`) that binds exactly one
//! non-empty path segment. Matching is anchored at both ends: `/users/{id}`
//! matches `/users/42` but not `/users/42/edit`.
//!
//! Templates are compiled once at startup; matching a request path allocates
//! only when captures are extracted.

use std::collections::HashMap;

use crate::error::ConfigError;

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters extracted by a successful template match.
///
/// For the template `/users/{id}` matched against `/users/42`,
/// `params.get("id")` returns `Some("42")`. Captured values are
/// percent-decoded; literal segments are compared raw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub(crate) fn new() -> Self {
        Self(HashMap::new())
    }

    pub(crate) fn insert(&mut self, name: &str, value: String) {
        self.0.insert(name.to_owned(), value);
    }

    /// Returns the value captured under `name`, if the template had such a capture.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ── PathPattern ───────────────────────────────────────────────────────────────

/// One compiled path-template segment.
#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Capture(String),
}

/// A compiled path template.
///
/// Obtained via [`PathPattern::compile`]; immutable afterwards. Captures are
/// confined to a single segment, so matching needs no backtracking: each
/// pattern segment is checked against exactly one path segment.
#[derive(Clone, Debug)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles `template` into a matcher.
    ///
    /// Fails with [`ConfigError::MalformedTemplate`] when the template does
    /// not start with `/`, a segment mixes braces with other characters, a
    /// capture name is empty or contains characters outside
    /// `[A-Za-z_][A-Za-z0-9_]*`, or two captures share a name.
    pub fn compile(template: &str) -> Result<Self, ConfigError> {
        let malformed = |reason: &str| ConfigError::MalformedTemplate {
            template: template.to_owned(),
            reason: reason.to_owned(),
        };

        if !template.starts_with('/') {
            return Err(malformed("template must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut seen = Vec::new();

        // split('/') on "/users/{id}" yields ["", "users", "{id}"]; the
        // leading empty literal is what anchors the leading slash.
        for raw in template.split('/') {
            if let Some(name) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if !valid_capture_name(name) {
                    return Err(malformed("capture name must match [A-Za-z_][A-Za-z0-9_]*"));
                }
                if seen.contains(&name) {
                    return Err(malformed("duplicate capture name"));
                }
                seen.push(name);
                segments.push(Segment::Capture(name.to_owned()));
            } else if raw.contains('{') || raw.contains('}') {
                return Err(malformed("braces are only valid as a whole-segment capture"));
            } else {
                segments.push(Segment::Literal(raw.to_owned()));
            }
        }

        Ok(Self { template: template.to_owned(), segments })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Matches `path` against the compiled template.
    ///
    /// The whole path must match — no prefix matching. Returns the extracted
    /// capture values on success, `None` on any structural mismatch.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut parts = path.split('/');
        let mut params = Params::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                // A capture never binds an empty segment.
                Segment::Capture(_) if part.is_empty() => return None,
                Segment::Capture(name) => params.insert(name, percent_decode(part)),
            }
        }

        // Anchored: a leftover path segment means no match.
        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }
}

fn valid_capture_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Percent decoding ──────────────────────────────────────────────────────────

/// Decodes `%XX` escapes in a captured segment.
///
/// Raw request paths arrive undecoded, so captured values are decoded here,
/// once, uniformly. Invalid escapes (`%`, `%G1`, truncated) are kept verbatim;
/// decoded bytes that do not form valid UTF-8 are replaced lossily.
fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: Option<&u8>) -> Option<u8> {
    match *b? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> PathPattern {
        PathPattern::compile(template).expect("template should compile")
    }

    #[test]
    fn literal_template_matches_exact_path() {
        let pattern = compile("/home");
        assert!(pattern.matches("/home").is_some());
        assert!(pattern.matches("/home/").is_none());
        assert!(pattern.matches("/Home").is_none());
        assert!(pattern.matches("home").is_none());
    }

    #[test]
    fn capture_extracts_segment_value() {
        let pattern = compile("/users/{id}");
        let params = pattern.matches("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn extra_segment_breaks_full_path_anchor() {
        let pattern = compile("/users/{id}");
        assert!(pattern.matches("/users/42/edit").is_none());
        assert!(pattern.matches("/users").is_none());
    }

    #[test]
    fn capture_requires_non_empty_segment() {
        let pattern = compile("/users/{id}");
        assert!(pattern.matches("/users/").is_none());
    }

    #[test]
    fn multiple_captures_round_trip() {
        let pattern = compile("/orgs/{org}/repos/{repo}");
        let params = pattern.matches("/orgs/acme/repos/widget").unwrap();
        assert_eq!(params.get("org"), Some("acme"));
        assert_eq!(params.get("repo"), Some("widget"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn captured_values_are_percent_decoded() {
        let pattern = compile("/files/{name}");
        let params = pattern.matches("/files/a%20b%2Fc").unwrap();
        assert_eq!(params.get("name"), Some("a b/c"));
    }

    #[test]
    fn invalid_escapes_kept_verbatim() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%GZ"), "%GZ");
        assert_eq!(percent_decode("%2"), "%2");
    }

    #[test]
    fn literal_segments_are_not_decoded() {
        let pattern = compile("/a%20b/{x}");
        assert!(pattern.matches("/a b/1").is_none());
        assert!(pattern.matches("/a%20b/1").is_some());
    }

    #[test]
    fn rejects_template_without_leading_slash() {
        assert!(PathPattern::compile("home").is_err());
    }

    #[test]
    fn rejects_stray_braces_in_segment() {
        assert!(PathPattern::compile("/users/x{id}").is_err());
        assert!(PathPattern::compile("/users/{id").is_err());
    }

    #[test]
    fn rejects_bad_capture_names() {
        assert!(PathPattern::compile("/{}").is_err());
        assert!(PathPattern::compile("/{1abc}").is_err());
        assert!(PathPattern::compile("/{a-b}").is_err());
        assert!(PathPattern::compile("/{_ok}").is_ok());
    }

    #[test]
    fn rejects_duplicate_capture_names() {
        let err = PathPattern::compile("/{id}/x/{id}").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedTemplate { .. }));
    }

    #[test]
    fn root_template_matches_root() {
        let pattern = compile("/");
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/x").is_none());
    }
}
