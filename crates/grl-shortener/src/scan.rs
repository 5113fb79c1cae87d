use linkify::{LinkFinder, LinkKind};

/// Scheme prepended to candidates that do not carry one.
pub const DEFAULT_SCHEME: &str = "http";

/// A piece of scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Text that is not a link and is copied through unchanged.
    Text(&'t str),
    /// A URL-like substring.
    Url(&'t str),
}

/// Splits `text` into link and non-link segments.
///
/// Recognition is relaxed: bare domains such as `example.com/path` count as
/// links even without a scheme. Concatenating the segments yields `text`.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut finder = LinkFinder::new();
    finder.url_must_have_scheme(false);
    finder.kinds(&[LinkKind::Url]);

    finder
        .spans(text)
        .map(|span| match span.kind() {
            Some(LinkKind::Url) => Segment::Url(span.as_str()),
            _ => Segment::Text(span.as_str()),
        })
        .collect()
}

/// Returns `true` if `candidate` starts with `<scheme>://`.
pub fn has_scheme(candidate: &str) -> bool {
    let Some((scheme, _)) = candidate.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Prepends `http://` to candidates without a scheme.
pub fn normalize(candidate: &str) -> String {
    if has_scheme(candidate) {
        candidate.to_owned()
    } else {
        format!("{DEFAULT_SCHEME}://{candidate}")
    }
}
