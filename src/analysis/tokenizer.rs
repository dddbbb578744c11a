//! Tokenizer for `HCK` metric records.
//!
//! Node logs are free-form text. A metric record is a line whose message
//! part (everything after the first `"] "`) starts with the `HCK` tag:
//!
//! ```text
//! [INFO: App       ] HCK tx_up 15 |                       (multi, one pair)
//! [INFO: App       ] HCK ip_qloss 0 ip_enq 42 ip_ok 40 |  (multi)
//! [INFO: App       ] HCK tx_up 15                         (simple, older format)
//! [INFO: App       ] HCK reset_log at 1a2b |              (reset marker)
//! ```

/// First token of every metric record
pub const RECORD_TAG: &str = "HCK";
/// First token of every registry declaration
pub const REGISTRY_TAG: &str = "HCK-NODE";
/// Standalone token closing a multi-metric record
pub const RECORD_END: &str = "|";
/// Metric name that moves a node into the data period
pub const RESET_MARKER: &str = "reset_log";

/// Separator between the timestamp/level prefix and the message
const PREFIX_SEPARATOR: &str = "] ";

/// Split a raw log line into its space-separated message tokens.
///
/// Returns `None` for lines that cannot carry a record: lines of length
/// <= 1 and lines without a `"] "` prefix separator.
pub fn split_message(line: &str) -> Option<Vec<&str>> {
    if line.len() <= 1 {
        return None;
    }
    let line = line.trim_end_matches(['\n', '\r']);
    let (_, message) = line.split_once(PREFIX_SEPARATOR)?;
    Some(message.split(' ').collect())
}

/// Record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Exactly one metric/value pair, no terminator
    Simple,
    /// Alternating metric/value pairs closed by `|`
    Multi,
}

/// A tokenized `HCK` record
#[derive(Debug, Clone)]
pub struct MetricRecord<'a> {
    tokens: Vec<&'a str>,
    shape: Shape,
}

impl<'a> MetricRecord<'a> {
    /// Tokenize a log line, keeping it only if it is an `HCK` record
    pub fn parse(line: &'a str) -> Option<Self> {
        let tokens = split_message(line)?;
        if tokens.first() != Some(&RECORD_TAG) {
            return None;
        }
        let shape = if tokens.contains(&RECORD_END) {
            Shape::Multi
        } else {
            Shape::Simple
        };
        Some(Self { tokens, shape })
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Walk the record's metric/value pairs in order
    pub fn entries(&self) -> Entries<'_, 'a> {
        Entries {
            record: self,
            position: 1,
            pairs: 0,
            done: false,
        }
    }
}

/// One step of a record walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// `name value` at token `position` (the name's index)
    Pair {
        name: &'a str,
        value: &'a str,
        position: usize,
    },
    /// The reset marker; the remainder of the record is discarded
    Reset,
    /// The record ran out of tokens before its terminator
    Truncated { pairs: usize },
}

/// Iterator over the entries of a [`MetricRecord`]
pub struct Entries<'r, 'a> {
    record: &'r MetricRecord<'a>,
    position: usize,
    pairs: usize,
    done: bool,
}

impl<'r, 'a> Iterator for Entries<'r, 'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tokens = &self.record.tokens;
        let position = self.position;

        let Some(&name) = tokens.get(position) else {
            self.done = true;
            // A simple record that already yielded its pair is complete.
            return match (self.record.shape, self.pairs) {
                (Shape::Simple, n) if n > 0 => None,
                _ => Some(Entry::Truncated { pairs: self.pairs }),
            };
        };

        if name == RECORD_END {
            self.done = true;
            return None;
        }
        if name == RESET_MARKER {
            self.done = true;
            return Some(Entry::Reset);
        }

        let value = match tokens.get(position + 1) {
            Some(&value) if value != RECORD_END => value,
            _ => {
                self.done = true;
                return Some(Entry::Truncated { pairs: self.pairs });
            }
        };

        self.pairs += 1;
        self.position += 2;
        if self.record.shape == Shape::Simple {
            self.done = true;
        }
        Some(Entry::Pair {
            name,
            value,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(line: &str) -> Vec<Entry<'_>> {
        MetricRecord::parse(line)
            .map(|r| r.entries().collect::<Vec<_>>())
            .unwrap_or_default()
    }

    fn pair<'a>(name: &'a str, value: &'a str, position: usize) -> Entry<'a> {
        Entry::Pair {
            name,
            value,
            position,
        }
    }

    #[test]
    fn test_split_message_strips_prefix() {
        let tokens = split_message("1614.200;m3-10;[INFO: App       ] HCK tx_up 3 |\n").unwrap();
        assert_eq!(tokens, vec!["HCK", "tx_up", "3", "|"]);
    }

    #[test]
    fn test_split_message_splits_on_first_separator_only() {
        let tokens = split_message("[a] HCK x ] y").unwrap();
        assert_eq!(tokens, vec!["HCK", "x", "]", "y"]);
    }

    #[test]
    fn test_short_and_unprefixed_lines_are_skipped() {
        assert!(split_message("").is_none());
        assert!(split_message("\n").is_none());
        assert!(split_message("HCK tx_up 3 |").is_none());
        assert!(MetricRecord::parse("[INFO: App] hello world").is_none());
        assert!(MetricRecord::parse("[INFO: App] HCK-NODE end").is_none());
    }

    #[test]
    fn test_multi_record_pairs() {
        let got = entries("[I] HCK ip_qloss 0 ip_enq 42 ip_ok 40 |");
        assert_eq!(
            got,
            vec![
                pair("ip_qloss", "0", 1),
                pair("ip_enq", "42", 3),
                pair("ip_ok", "40", 5),
            ]
        );
    }

    #[test]
    fn test_multi_record_with_trailing_space() {
        let record = MetricRecord::parse("[I] HCK tx_up 10 | ").unwrap();
        assert_eq!(record.shape(), Shape::Multi);
        assert_eq!(record.entries().collect::<Vec<_>>(), vec![pair("tx_up", "10", 1)]);
    }

    #[test]
    fn test_simple_record_reads_first_pair_only() {
        let record = MetricRecord::parse("[I] HCK tx_up 15 from 3 3").unwrap();
        assert_eq!(record.shape(), Shape::Simple);
        assert_eq!(record.entries().collect::<Vec<_>>(), vec![pair("tx_up", "15", 1)]);
    }

    #[test]
    fn test_truncated_multi_record_keeps_consumed_pairs() {
        let got = entries("[I] HCK tx_up 15 rx_up |");
        assert_eq!(got, vec![pair("tx_up", "15", 1), Entry::Truncated { pairs: 1 }]);
    }

    #[test]
    fn test_simple_record_without_value_is_truncated() {
        assert_eq!(entries("[I] HCK tx_up"), vec![Entry::Truncated { pairs: 0 }]);
        assert_eq!(entries("[I] HCK"), vec![Entry::Truncated { pairs: 0 }]);
    }

    #[test]
    fn test_reset_marker_ends_the_record() {
        assert_eq!(entries("[I] HCK reset_log at 1a2b |"), vec![Entry::Reset]);
        assert_eq!(
            entries("[I] HCK tx_up 4 reset_log at 1a2b |"),
            vec![pair("tx_up", "4", 1), Entry::Reset]
        );
    }
}
