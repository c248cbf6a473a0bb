//! Reference classification and location path helpers.
//!
//! Reference strings are interpreted as URI references and decomposed the way
//! RFC 3986 Appendix B does: `scheme ":" "//" authority path "?" query "#" fragment`.
//! On top of that decomposition this module provides:
//!
//! - [`normalize`] - syntactic normalization (`.`/`..` removal)
//! - [`is_relative`] - relative vs absolute classification
//! - segment and directory helpers used by both resolvers and the uploader
//!
//! All functions are pure string manipulation; nothing touches the filesystem
//! or the model tree.

use crate::core::ResolverError;

/// Characters that may never appear unescaped in a reference.
const FORBIDDEN_CHARS: &[char] = &['<', '>', '"', '{', '}', '|', '\\', '^', '`'];

/// The components of a parsed URI reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UriParts<'a> {
    /// Scheme without the trailing `:`
    pub scheme: Option<&'a str>,
    /// Authority without the leading `//`
    pub authority: Option<&'a str>,
    /// Path component (may be empty)
    pub path: &'a str,
    /// Query without the leading `?`
    pub query: Option<&'a str>,
    /// Fragment without the leading `#`
    pub fragment: Option<&'a str>,
}

impl UriParts<'_> {
    /// Whether the reference is opaque (`urn:isbn:1234`, `mailto:x`): it has a
    /// scheme but no authority and its path is not rooted.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.scheme.is_some() && self.authority.is_none() && !self.path.starts_with('/')
    }

    /// `scheme:` and `//authority`, whichever are present.
    #[must_use]
    pub fn root_prefix(&self) -> String {
        let mut prefix = String::new();
        if let Some(scheme) = self.scheme {
            prefix.push_str(scheme);
            prefix.push(':');
        }
        if let Some(authority) = self.authority {
            prefix.push_str("//");
            prefix.push_str(authority);
        }
        prefix
    }

    /// Scheme, authority and path without query or fragment.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}{}", self.root_prefix(), self.path)
    }

    fn assemble(&self, path: &str) -> String {
        let mut out = self.root_prefix();
        out.push_str(path);
        if let Some(query) = self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// Parses `reference` as a URI reference.
///
/// # Errors
///
/// Returns [`ResolverError::MalformedReference`] when the reference is empty,
/// contains whitespace, control or forbidden characters, has a broken percent
/// escape, an invalid scheme, a scheme with nothing after it, or more than one
/// fragment delimiter.
pub fn parse_reference(reference: &str) -> Result<UriParts<'_>, ResolverError> {
    let malformed = |reason: String| ResolverError::MalformedReference {
        reference: reference.to_string(),
        reason,
    };

    if reference.is_empty() {
        return Err(malformed("empty reference".to_string()));
    }
    if let Some(c) = reference
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(malformed(format!("illegal character {c:?}")));
    }
    check_percent_escapes(reference).map_err(malformed)?;

    let (rest, fragment) = match reference.split_once('#') {
        Some((rest, fragment)) => {
            if fragment.contains('#') {
                return Err(malformed("more than one '#' delimiter".to_string()));
            }
            (rest, Some(fragment))
        }
        None => (reference, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (rest, None),
    };

    // A ':' only starts a scheme when it precedes every '/'.
    let (scheme, rest) = match rest.find(':') {
        Some(colon) if !rest[..colon].contains('/') => {
            let scheme = &rest[..colon];
            if !is_valid_scheme(scheme) {
                return Err(malformed(format!("invalid scheme '{scheme}'")));
            }
            (Some(scheme), &rest[colon + 1..])
        }
        _ => (None, rest),
    };
    if scheme.is_some() && rest.is_empty() && query.is_none() && fragment.is_none() {
        return Err(malformed("expected a scheme-specific part".to_string()));
    }

    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find('/').unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    };

    Ok(UriParts {
        scheme,
        authority,
        path,
        query,
        fragment,
    })
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn check_percent_escapes(reference: &str) -> Result<(), String> {
    let bytes = reference.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let valid = bytes.get(index + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(index + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return Err(format!("malformed escape at index {index}"));
            }
        }
    }
    Ok(())
}

/// Replaces `%XX` escapes with the bytes they stand for.
///
/// # Examples
///
/// ```
/// use artifact_deps::resolver::path_helpers::percent_decode;
///
/// assert_eq!(percent_decode("/My%20Schemas/x.xsd").unwrap(), "/My Schemas/x.xsd");
/// assert_eq!(percent_decode("/plain/x.xsd").unwrap(), "/plain/x.xsd");
/// ```
///
/// # Errors
///
/// Fails with [`ResolverError::MalformedReference`] for a broken escape or
/// when the decoded bytes are not UTF-8.
pub fn percent_decode(text: &str) -> Result<String, ResolverError> {
    let malformed = |reason: String| ResolverError::MalformedReference {
        reference: text.to_string(),
        reason,
    };
    check_percent_escapes(text).map_err(malformed)?;

    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let escape = &text[index + 1..index + 3];
            let byte = u8::from_str_radix(escape, 16)
                .map_err(|e| malformed(format!("malformed escape %{escape}: {e}")))?;
            decoded.push(byte);
            index += 3;
        } else {
            decoded.push(bytes[index]);
            index += 1;
        }
    }
    String::from_utf8(decoded).map_err(|_| malformed("escapes do not decode to UTF-8".to_string()))
}

/// Removes `.` segments and collapses `segment/..` pairs in a URI path.
///
/// Leading `..` segments are kept, so relative references that climb out of
/// their directory survive normalization. A trailing `.` or `..` leaves a
/// trailing slash.
#[must_use]
pub fn remove_dot_segments(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let absolute = path.starts_with('/');
    let body = if absolute { &path[1..] } else { path };
    let segments: Vec<&str> = body.split('/').collect();
    let last = segments.len() - 1;

    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    let mut trailing_slash = false;
    for (index, segment) in segments.iter().enumerate() {
        match *segment {
            "." => trailing_slash |= index == last,
            ".." if out.last().is_some_and(|prev| *prev != "..") => {
                out.pop();
                trailing_slash |= index == last;
            }
            other => out.push(other),
        }
    }

    let mut joined = out.join("/");
    if trailing_slash && !joined.is_empty() && !joined.ends_with('/') {
        joined.push('/');
    }
    if absolute { format!("/{joined}") } else { joined }
}

/// Returns the syntactically normalized form of `reference`.
///
/// Scheme, authority, query and fragment are preserved; only the path is
/// rewritten. Opaque references are returned unchanged.
///
/// # Errors
///
/// Returns [`ResolverError::MalformedReference`] if `reference` is not a URI.
///
/// # Examples
///
/// ```
/// use artifact_deps::resolver::path_helpers::normalize;
///
/// assert_eq!(normalize("a/./b/../c").unwrap(), "a/c");
/// assert_eq!(normalize("http://h/x/../y.xsd").unwrap(), "http://h/y.xsd");
/// ```
pub fn normalize(reference: &str) -> Result<String, ResolverError> {
    let parts = parse_reference(reference)?;
    if parts.is_opaque() {
        return Ok(reference.to_string());
    }

    let mut path = remove_dot_segments(parts.path);
    // "a:b/c.xsd" would otherwise read back as scheme "a".
    if parts.scheme.is_none() && parts.authority.is_none() {
        let first = path.split('/').next().unwrap_or_default();
        if first.contains(':') {
            path = format!("./{path}");
        }
    }
    Ok(parts.assemble(&path))
}

/// Classifies `reference` as relative (`true`) or absolute (`false`).
///
/// A leading `/` is absolute and a leading `./` or `../` is relative without
/// parsing; everything else is relative exactly when it has no scheme.
///
/// # Errors
///
/// Returns [`ResolverError::MalformedReference`] when the fallback parse fails.
///
/// # Examples
///
/// ```
/// use artifact_deps::resolver::path_helpers::is_relative;
///
/// assert!(!is_relative("/x/y").unwrap());
/// assert!(is_relative("../x").unwrap());
/// assert!(!is_relative("http://h/x").unwrap());
/// assert!(is_relative("x.xsd").unwrap());
/// ```
pub fn is_relative(reference: &str) -> Result<bool, ResolverError> {
    if reference.starts_with('/') {
        return Ok(false);
    }
    if reference.starts_with("./") || reference.starts_with("../") {
        return Ok(true);
    }
    Ok(parse_reference(reference)?.scheme.is_none())
}

/// Splits a location into `/`-delimited segments after dropping query and
/// fragment. Returns the segments and how many leading segments belong to the
/// scheme/authority root (`http://h/a` has root `["http:", "", "h"]`).
pub fn location_segments(location: &str) -> Result<(Vec<String>, usize), ResolverError> {
    let parts = parse_reference(location)?;
    let prefix = parts.root_prefix();
    let root_len = if prefix.is_empty() {
        usize::from(parts.path.starts_with('/'))
    } else {
        prefix.split('/').count()
    };
    let segments = parts.location().split('/').map(str::to_string).collect();
    Ok((segments, root_len))
}

/// Strips the last `/`-segment of a location (`http://h/a/B.xsd` → `http://h/a`).
///
/// The root keeps its slash (`/B.xsd` → `/`, `http://h/B.xsd` → `http://h/`).
/// A location without any `/` lives in the current directory, which is the
/// empty string. Query and fragment are dropped.
#[must_use]
pub fn parent_location(location: &str) -> String {
    let Ok(parts) = parse_reference(location) else {
        return match location.rfind('/') {
            Some(0) => "/".to_string(),
            Some(index) => location[..index].to_string(),
            None => String::new(),
        };
    };

    let mut parent = parts.root_prefix();
    match parts.path.rfind('/') {
        Some(0) => parent.push('/'),
        Some(index) => parent.push_str(&parts.path[..index]),
        None => {}
    }
    parent
}

/// Ascends `hops` directories from `directory`.
///
/// Rooted directories (URLs, absolute paths) cannot ascend past their root and
/// yield `None`; relative directories grow leading `..` segments instead.
///
/// # Examples
///
/// ```
/// use artifact_deps::resolver::path_helpers::ascend_location;
///
/// assert_eq!(ascend_location("http://h/a/b", 1).as_deref(), Some("http://h/a"));
/// assert_eq!(ascend_location("/a", 1).as_deref(), Some("/"));
/// assert_eq!(ascend_location("/a", 2), None);
/// assert_eq!(ascend_location("imports", 2).as_deref(), Some(".."));
/// ```
#[must_use]
pub fn ascend_location(directory: &str, hops: usize) -> Option<String> {
    let (mut segments, root_len) = location_segments(directory).unwrap_or_else(|_| {
        // Workspace paths are not always valid URIs ("My Schemas/x.xsd").
        if directory.is_empty() {
            (Vec::new(), 0)
        } else {
            let segments = directory.split('/').map(str::to_string).collect();
            (segments, usize::from(directory.starts_with('/')))
        }
    });
    let rooted_path = parse_reference(directory)
        .map_or_else(|_| directory.starts_with('/'), |parts| parts.path.starts_with('/'));

    // A trailing slash adds no level.
    if segments.len() > root_len && segments.last().is_some_and(String::is_empty) {
        segments.pop();
    }

    for _ in 0..hops {
        if root_len == 0 && segments.last().is_none_or(|segment| segment == "..") {
            segments.push("..".to_string());
        } else if segments.len() > root_len {
            segments.pop();
        } else {
            return None;
        }
    }

    let mut ascended = segments.join("/");
    if rooted_path && segments.len() == root_len {
        ascended.push('/');
    }
    Some(ascended)
}

/// Joins a directory location and a relative path.
#[must_use]
pub fn join_location(directory: &str, relative: &str) -> String {
    if directory.is_empty() {
        relative.to_string()
    } else if directory.ends_with('/') {
        format!("{directory}{relative}")
    } else {
        format!("{directory}/{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dot_segments() {
        assert_eq!(normalize("a/./b/../c").unwrap(), "a/c");
        assert_eq!(normalize("./data/types/BookDatatypes.xsd").unwrap(), "data/types/BookDatatypes.xsd");
        assert_eq!(normalize("../x.xsd").unwrap(), "../x.xsd");
        assert_eq!(normalize("a/../../b.xsd").unwrap(), "../b.xsd");
        assert_eq!(normalize("/a/b/../c.xsd").unwrap(), "/a/c.xsd");
    }

    #[test]
    fn test_normalize_trailing_dot_segments() {
        assert_eq!(normalize("a/b/.").unwrap(), "a/b/");
        assert_eq!(normalize("a/b/..").unwrap(), "a/");
        assert_eq!(normalize("a/b/").unwrap(), "a/b/");
    }

    #[test]
    fn test_normalize_preserves_scheme_authority_query_fragment() {
        assert_eq!(
            normalize("http://example.com/schemas/./books/../Books.xsd?v=1#top").unwrap(),
            "http://example.com/schemas/Books.xsd?v=1#top"
        );
        assert_eq!(normalize("file:///tmp/./a.xsd").unwrap(), "file:///tmp/a.xsd");
    }

    #[test]
    fn test_normalize_opaque_unchanged() {
        assert_eq!(normalize("urn:example:books").unwrap(), "urn:example:books");
    }

    #[test]
    fn test_normalize_guards_colon_in_first_segment() {
        assert_eq!(normalize("./a:b/c.xsd").unwrap(), "./a:b/c.xsd");
    }

    #[test]
    fn test_malformed_references() {
        for bad in ["", "has space.xsd", "a<b.xsd", "bad%zzescape", "1http://x/y", "http:", "a#b#c", "C:\\x.xsd"] {
            assert!(
                matches!(normalize(bad), Err(ResolverError::MalformedReference { .. })),
                "expected '{bad}' to be malformed"
            );
        }
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/tmp/My%20Schemas/Books.xsd").unwrap(), "/tmp/My Schemas/Books.xsd");
        assert_eq!(percent_decode("%C3%A9t%C3%A9.xsd").unwrap(), "\u{e9}t\u{e9}.xsd");
        assert_eq!(percent_decode("100%25.xsd").unwrap(), "100%.xsd");
        assert!(matches!(percent_decode("bad%2"), Err(ResolverError::MalformedReference { .. })));
        assert!(matches!(percent_decode("%FF.xsd"), Err(ResolverError::MalformedReference { .. })));
    }

    #[test]
    fn test_is_relative() {
        assert!(!is_relative("/x/y").unwrap());
        assert!(is_relative("../x").unwrap());
        assert!(is_relative("./x").unwrap());
        assert!(!is_relative("http://h/x").unwrap());
        assert!(is_relative("x.xsd").unwrap());
        assert!(is_relative("data/types/x.xsd").unwrap());
        assert!(!is_relative("file:/tmp/x.xsd").unwrap());
        assert!(!is_relative("//host/x.xsd").unwrap());
        assert!(is_relative("bad ref").is_err());
    }

    #[test]
    fn test_parse_reference_parts() {
        let parts = parse_reference("https://example.com:8080/a/b.xsd?q#f").unwrap();
        assert_eq!(parts.scheme, Some("https"));
        assert_eq!(parts.authority, Some("example.com:8080"));
        assert_eq!(parts.path, "/a/b.xsd");
        assert_eq!(parts.query, Some("q"));
        assert_eq!(parts.fragment, Some("f"));

        let relative = parse_reference("dir/a:b.xsd").unwrap();
        assert_eq!(relative.scheme, None);
        assert_eq!(relative.path, "dir/a:b.xsd");
    }

    #[test]
    fn test_location_segments_root_lengths() {
        let (segments, root) = location_segments("http://h/a/b.xsd").unwrap();
        assert_eq!(segments, vec!["http:", "", "h", "a", "b.xsd"]);
        assert_eq!(root, 3);

        let (segments, root) = location_segments("/a/b.xsd").unwrap();
        assert_eq!(segments, vec!["", "a", "b.xsd"]);
        assert_eq!(root, 1);

        let (_, root) = location_segments("file:///a/b.xsd").unwrap();
        assert_eq!(root, 3);

        let (_, root) = location_segments("file:/a/b.xsd").unwrap();
        assert_eq!(root, 1);

        let (_, root) = location_segments("imports/b.xsd").unwrap();
        assert_eq!(root, 0);
    }

    #[test]
    fn test_parent_location() {
        assert_eq!(parent_location("http://h/a/B.xsd"), "http://h/a");
        assert_eq!(parent_location("http://h/B.xsd?v=2"), "http://h/");
        assert_eq!(parent_location("file:///B.xsd"), "file:///");
        assert_eq!(parent_location("/B.xsd"), "/");
        assert_eq!(parent_location("imports/B.xsd"), "imports");
        assert_eq!(parent_location("B.xsd"), "");
        assert_eq!(parent_location("My Schemas/B.xsd"), "My Schemas");
    }

    #[test]
    fn test_ascend_location() {
        assert_eq!(ascend_location("http://h/a/b", 0).as_deref(), Some("http://h/a/b"));
        assert_eq!(ascend_location("http://h/a/b", 2).as_deref(), Some("http://h/"));
        assert_eq!(ascend_location("http://h/a/b", 3), None);
        assert_eq!(ascend_location("file:///a", 1).as_deref(), Some("file:///"));
        assert_eq!(ascend_location("/Model/Books", 1).as_deref(), Some("/Model"));
        assert_eq!(ascend_location("/", 0).as_deref(), Some("/"));
        assert_eq!(ascend_location("/", 1), None);
        assert_eq!(ascend_location("imports/books", 1).as_deref(), Some("imports"));
        assert_eq!(ascend_location("../shared", 2).as_deref(), Some("../.."));
        assert_eq!(ascend_location("", 1).as_deref(), Some(".."));
        assert_eq!(ascend_location("My Schemas/books", 1).as_deref(), Some("My Schemas"));
    }

    #[test]
    fn test_join_location() {
        assert_eq!(join_location("http://h/a", "b.xsd"), "http://h/a/b.xsd");
        assert_eq!(join_location("", "b.xsd"), "b.xsd");
        assert_eq!(join_location("/", "b.xsd"), "/b.xsd");
        assert_eq!(join_location("file:///", "b.xsd"), "file:///b.xsd");
    }
}
