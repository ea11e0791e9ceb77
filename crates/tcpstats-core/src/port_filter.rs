//! Local port filter built from a comma-separated list such as `"80,443"`.

use std::collections::HashSet;

use crate::error::FilterTokenError;
use crate::warning::{Warning, WarningSink};

/// Parse a single filter token as a base-10 integer.
///
/// The token is taken as is, so `" 443"` is rejected. Range checking is
/// left to configuration validation; any value that fits an `i64` is
/// accepted here.
pub fn parse_port_token(token: &str) -> Result<i64, FilterTokenError> {
    token.parse::<i64>().map_err(|source| FilterTokenError {
        token: token.to_string(),
        source,
    })
}

/// Set of local ports a pass is restricted to. Empty matches every port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortFilter {
    ports: HashSet<i64>,
}

impl PortFilter {
    /// Filter that accepts every port.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from a comma-separated list.
    ///
    /// Tokens that do not parse are reported to `sink` and dropped; the rest
    /// of the list still applies.
    pub fn parse(list: &str, sink: &impl WarningSink) -> Self {
        if list.is_empty() {
            return Self::all();
        }

        let mut ports = HashSet::new();
        for token in list.split(',') {
            match parse_port_token(token) {
                Ok(port) => {
                    ports.insert(port);
                }
                Err(err) => sink.warn(&Warning::FilterToken(err)),
            }
        }
        Self { ports }
    }

    /// True when no port restriction applies.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether rows on `port` pass the filter.
    pub fn matches(&self, port: u32) -> bool {
        self.ports.is_empty() || self.ports.contains(&i64::from(port))
    }
}

impl FromIterator<u16> for PortFilter {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self {
            ports: iter.into_iter().map(i64::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::{CollectingSink, NopSink};

    #[test]
    fn test_empty_matches_everything() {
        let filter = PortFilter::parse("", &NopSink);
        assert!(filter.is_empty());
        assert!(filter.matches(0));
        assert!(filter.matches(22));
        assert!(filter.matches(u32::from(u16::MAX)));
    }

    #[test]
    fn test_list_restricts_ports() {
        let filter = PortFilter::parse("80,443", &NopSink);
        assert_eq!(filter.len(), 2);
        assert!(filter.matches(80));
        assert!(filter.matches(443));
        assert!(!filter.matches(8080));
    }

    #[test]
    fn test_duplicates_collapse() {
        let filter = PortFilter::parse("80,80,80", &NopSink);
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_bad_token_skipped_with_warning() {
        let sink = CollectingSink::new();
        let filter = PortFilter::parse("1000,invalid,2000", &sink);

        assert_eq!(filter.len(), 2);
        assert!(filter.matches(1000));
        assert!(filter.matches(2000));

        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            Warning::FilterToken(err) => assert_eq!(err.token, "invalid"),
            other => panic!("unexpected warning: {other:?}"),
        }
    }

    #[test]
    fn test_only_bad_tokens_means_no_filtering() {
        let sink = CollectingSink::new();
        let filter = PortFilter::parse("a,b", &sink);
        assert!(filter.is_empty());
        assert!(filter.matches(1234));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_empty_tokens_warn() {
        let sink = CollectingSink::new();
        let filter = PortFilter::parse("80,,443,", &sink);
        assert_eq!(filter.len(), 2);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_whitespace_around_tokens_rejected() {
        let sink = CollectingSink::new();
        let filter = PortFilter::parse("80, 443,8080 ", &sink);

        assert_eq!(filter.len(), 1);
        assert!(filter.matches(80));
        assert!(!filter.matches(443));
        assert!(!filter.matches(8080));

        let tokens: Vec<String> = sink
            .warnings()
            .iter()
            .map(|w| match w {
                Warning::FilterToken(err) => err.token.clone(),
                other => panic!("unexpected warning: {other:?}"),
            })
            .collect();
        assert_eq!(tokens, vec![" 443".to_string(), "8080 ".to_string()]);
    }

    #[test]
    fn test_out_of_range_tokens_accepted() {
        let sink = CollectingSink::new();
        let filter = PortFilter::parse("70000,-1", &sink);
        assert!(sink.is_empty());
        assert_eq!(filter.len(), 2);
        assert!(filter.matches(70000));
        assert!(!filter.matches(4464));
        assert!(!filter.matches(u32::MAX));
    }

    #[test]
    fn test_from_iter() {
        let filter: PortFilter = [22, 80].into_iter().collect();
        assert!(filter.matches(22));
        assert!(!filter.matches(23));
    }

    #[test]
    fn test_parse_port_token() {
        assert_eq!(parse_port_token("8080").unwrap(), 8080);
        assert_eq!(parse_port_token("-1").unwrap(), -1);
        assert!(parse_port_token(" 53").is_err());
        assert!(parse_port_token("0x50").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_matches_exactly_listed_ports(ports in vec(any::<u16>(), 1..16), port in any::<u16>()) {
                let list = ports.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
                let filter = PortFilter::parse(&list, &NopSink);
                prop_assert_eq!(filter.matches(u32::from(port)), ports.contains(&port));
            }
        }
    }
}
