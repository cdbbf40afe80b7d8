//! Header sources and the merge fold

use std::collections::HashSet;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;

/// A single source of headers accepted by [`merge_headers`]
///
/// Either an already-built [`HeaderMap`] or a list of name/value string
/// pairs. A repeated name within one `Pairs` source models a multi-valued
/// header: each entry is appended in order.
#[derive(Debug, Clone)]
pub enum HeaderSource {
    /// A headers container
    Map(HeaderMap),
    /// Name/value pairs, parsed into header names and values at merge time
    Pairs(Vec<(String, String)>),
}

impl HeaderSource {
    /// Flatten this source into (name, value) entries, in source order
    fn entries(&self) -> Result<Vec<(HeaderName, HeaderValue)>, Error> {
        match self {
            HeaderSource::Map(map) => Ok(map
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()),
            HeaderSource::Pairs(pairs) => pairs
                .iter()
                .map(|(name, value)| {
                    let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                        Error::InvalidRequest(format!("invalid header name: {name}"))
                    })?;
                    let value = HeaderValue::from_str(value).map_err(|_| {
                        Error::InvalidRequest(format!("invalid value for header {name}"))
                    })?;
                    Ok((name, value))
                })
                .collect(),
        }
    }
}

impl From<HeaderMap> for HeaderSource {
    fn from(map: HeaderMap) -> Self {
        HeaderSource::Map(map)
    }
}

impl From<Vec<(String, String)>> for HeaderSource {
    fn from(pairs: Vec<(String, String)>) -> Self {
        HeaderSource::Pairs(pairs)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for HeaderSource {
    fn from(pairs: [(&str, &str); N]) -> Self {
        HeaderSource::Pairs(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl From<&[(&str, &str)]> for HeaderSource {
    fn from(pairs: &[(&str, &str)]) -> Self {
        HeaderSource::Pairs(
            pairs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

/// Fold header sources into a single [`HeaderMap`], later sources winning
///
/// `None` sources are skipped. When a later source carries a name that an
/// earlier source already set, the later source replaces every prior value
/// for that name; a name repeated *within* one source appends instead, so
/// multi-valued headers survive with their order intact. Name comparison is
/// case-insensitive, as the header map defines. Empty string values are
/// kept.
pub fn merge_headers<I>(sources: I) -> Result<HeaderMap, Error>
where
    I: IntoIterator<Item = Option<HeaderSource>>,
{
    let mut merged = HeaderMap::new();

    for source in sources.into_iter().flatten() {
        let mut seen: HashSet<HeaderName> = HashSet::new();
        for (name, value) in source.entries()? {
            if seen.insert(name.clone()) {
                // First occurrence in this source evicts all earlier values.
                merged.insert(name, value);
            } else {
                merged.append(name, value);
            }
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(map: &HeaderMap, name: &str) -> Option<String> {
        map.get(name)
            .map(|value| value.to_str().unwrap_or_default().to_string())
    }

    #[test]
    fn test_merge_two_disjoint_sources() {
        let source_a = HeaderSource::from([("A-1", "A-1"), ("A-2", "A-2"), ("A-3", "A-3")]);
        let source_b = HeaderSource::from([("B-1", "B-1"), ("B-2", "B-2"), ("B-3", "B-3")]);

        let merged =
            merge_headers([Some(source_a), Some(source_b)]).expect("merge should succeed");

        assert_eq!(merged.len(), 6);
        assert_eq!(get(&merged, "A-1").as_deref(), Some("A-1"));
        assert_eq!(get(&merged, "B-3").as_deref(), Some("B-3"));
    }

    #[test]
    fn test_later_source_overrides_duplicate() {
        let source_a = HeaderSource::from([("My-Header", "One")]);
        let source_b = HeaderSource::from([("My-Header", "Two")]);

        let merged =
            merge_headers([Some(source_a), Some(source_b)]).expect("merge should succeed");

        assert_eq!(get(&merged, "My-Header").as_deref(), Some("Two"));
        assert_eq!(merged.get_all("My-Header").iter().count(), 1);
    }

    #[test]
    fn test_override_is_case_insensitive() {
        let source_a = HeaderSource::from([("MY-HEADER", "One")]);
        let source_b = HeaderSource::from([("my-header", "Two")]);

        let merged =
            merge_headers([Some(source_a), Some(source_b)]).expect("merge should succeed");

        assert_eq!(merged.len(), 1);
        assert_eq!(get(&merged, "My-Header").as_deref(), Some("Two"));
    }

    #[test]
    fn test_undefined_source_skipped() {
        let merged = merge_headers([None, Some(HeaderSource::from([("My-Header", "One")]))])
            .expect("merge should succeed");

        assert_eq!(get(&merged, "My-Header").as_deref(), Some("One"));
    }

    #[test]
    fn test_all_undefined_gives_empty_map() {
        let sources: [Option<HeaderSource>; 2] = [None, None];
        let merged = merge_headers(sources).expect("merge should succeed");
        assert!(merged.is_empty());
    }

    #[test]
    fn test_empty_value_preserved() {
        let merged = merge_headers([Some(HeaderSource::from([("X-Empty", "")]))])
            .expect("merge should succeed");

        assert_eq!(get(&merged, "X-Empty").as_deref(), Some(""));
    }

    #[test]
    fn test_multi_value_appends_within_source() {
        let source = HeaderSource::from([("Accept", "text/html"), ("Accept", "application/json")]);

        let merged = merge_headers([Some(source)]).expect("merge should succeed");

        let values: Vec<_> = merged
            .get_all("Accept")
            .iter()
            .map(|v| v.to_str().unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["text/html", "application/json"]);
    }

    #[test]
    fn test_later_source_replaces_all_prior_values() {
        let source_a = HeaderSource::from([("Accept", "text/html"), ("Accept", "text/plain")]);
        let source_b = HeaderSource::from([("Accept", "application/json")]);

        let merged =
            merge_headers([Some(source_a), Some(source_b)]).expect("merge should succeed");

        let values: Vec<_> = merged
            .get_all("Accept")
            .iter()
            .map(|v| v.to_str().unwrap_or_default())
            .collect();
        assert_eq!(values, vec!["application/json"]);
    }

    #[test]
    fn test_header_map_source_round_trips() {
        let mut map = HeaderMap::new();
        map.insert("X-From-Map", HeaderValue::from_static("mapped"));

        let merged = merge_headers([Some(HeaderSource::from(map))]).expect("merge should succeed");

        assert_eq!(get(&merged, "X-From-Map").as_deref(), Some("mapped"));
    }

    #[test]
    fn test_invalid_header_name_errors() {
        let source = HeaderSource::from([("not a header\n", "value")]);

        let result = merge_headers([Some(source)]);

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }
}
