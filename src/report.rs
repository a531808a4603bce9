//! Threshold-filtered, count-sorted text tables

use std::collections::HashMap;
use std::fmt;

use crate::stats::{AddressStats, DomainStats, SenderStats};

const COLUMN_GAP: &str = "  ";

/// A row source for a report: anything counted and ordered by first sighting.
pub trait Tally {
    fn count(&self) -> u32;
    fn first_seen(&self) -> usize;
    /// Third column text
    fn detail(&self) -> String;
}

impl Tally for AddressStats {
    fn count(&self) -> u32 {
        self.count
    }

    fn first_seen(&self) -> usize {
        self.first_seen
    }

    fn detail(&self) -> String {
        // BTreeSet iterates in sorted order
        self.names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl Tally for DomainStats {
    fn count(&self) -> u32 {
        self.count
    }

    fn first_seen(&self) -> usize {
        self.first_seen
    }

    fn detail(&self) -> String {
        String::new()
    }
}

/// Rows of `[count, key, detail]`, most frequent first.
///
/// Displays as a left-justified table with two spaces between columns, or
/// `None` when no row passed the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    rows: Vec<[String; 3]>,
}

impl Report {
    /// Keeps entries counted at least `threshold` times, ordered by count
    /// descending and then by first sighting.
    pub fn build<T: Tally>(stats: &HashMap<String, T>, threshold: u32) -> Self {
        let mut entries: Vec<(&String, &T)> = stats
            .iter()
            .filter(|(_, tally)| tally.count() >= threshold)
            .collect();

        entries.sort_by(|a, b| {
            b.1.count()
                .cmp(&a.1.count())
                .then_with(|| a.1.first_seen().cmp(&b.1.first_seen()))
        });

        let rows = entries
            .into_iter()
            .map(|(key, tally)| [tally.count().to_string(), key.clone(), tally.detail()])
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[[String; 3]] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> [usize; 3] {
        let mut widths = [0; 3];
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str("None");
        }

        let widths = self.column_widths();
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            f.write_str(&line)?;
        }
        Ok(())
    }
}

/// The "Email addresses:" and "Domains:" sections printed by the CLI.
pub fn render_sections(stats: &SenderStats, threshold: u32) -> String {
    format!(
        "\nEmail addresses:\n{}\n\nDomains:\n{}\n",
        Report::build(&stats.addresses, threshold),
        Report::build(&stats.domains, threshold)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn address(count: u32, first_seen: usize, names: &[&str]) -> AddressStats {
        AddressStats {
            count,
            names: names.iter().map(|n| n.to_string()).collect::<BTreeSet<_>>(),
            first_seen,
        }
    }

    fn domains(entries: &[(&str, u32)]) -> HashMap<String, DomainStats> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (k, count))| {
                (
                    k.to_string(),
                    DomainStats {
                        count: *count,
                        first_seen: i,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_address_table_layout() {
        let stats = HashMap::from([
            (
                "bob@example.org".to_string(),
                address(12, 1, &["Robert Ferris", "Bob Ferris"]),
            ),
            ("al@x.io".to_string(), address(3, 0, &["Al"])),
            ("quiet@x.io".to_string(), address(1, 2, &[])),
        ]);

        let report = Report::build(&stats, 2);
        assert_eq!(
            report.to_string(),
            "12  bob@example.org  Bob Ferris, Robert Ferris\n\
             3   al@x.io          Al                       "
        );
    }

    #[test]
    fn test_domain_rows_have_empty_detail() {
        let report = Report::build(&domains(&[("example.org", 2)]), 1);
        assert_eq!(
            report.rows(),
            &[["2".to_string(), "example.org".to_string(), String::new()]]
        );
        assert_eq!(report.to_string(), "2  example.org  ");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let stats = domains(&[("a.org", 2), ("b.org", 1), ("c.org", 3)]);
        let keys: Vec<String> = Report::build(&stats, 2)
            .rows()
            .iter()
            .map(|r| r[1].clone())
            .collect();
        assert_eq!(keys, vec!["c.org", "a.org"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let stats = domains(&[("z.org", 2), ("a.org", 5), ("m.org", 2), ("b.org", 2)]);
        let keys: Vec<String> = Report::build(&stats, 0)
            .rows()
            .iter()
            .map(|r| r[1].clone())
            .collect();
        assert_eq!(keys, vec!["a.org", "z.org", "m.org", "b.org"]);
    }

    #[test]
    fn test_nothing_above_threshold_prints_none() {
        let stats = HashMap::from([("solo@x.org".to_string(), address(1, 0, &["Solo"]))]);
        let report = Report::build(&stats, 2);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "None");
    }

    #[test]
    fn test_width_counts_characters() {
        let stats = HashMap::from([
            ("jose@x.es".to_string(), address(2, 0, &["José"])),
            ("al@x.es".to_string(), address(2, 1, &["Alfredo"])),
        ]);
        let text = Report::build(&stats, 2).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2  jose@x.es  José   ");
        assert_eq!(lines[1], "2  al@x.es    Alfredo");
    }

    #[test]
    fn test_sections() {
        let mut stats = SenderStats::default();
        stats.addresses.insert("a@x.org".to_string(), address(1, 0, &[]));
        stats.domains = domains(&[("x.org", 3)]);

        assert_eq!(
            render_sections(&stats, 2),
            "\nEmail addresses:\nNone\n\nDomains:\n3  x.org  \n"
        );
    }

    proptest! {
        #[test]
        fn prop_threshold_rows_sorted_and_nested(counts in prop::collection::vec(1u32..8, 0..30), threshold in 0u32..9) {
            let entries: Vec<(String, u32)> = counts
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("d{i}.org"), *c))
                .collect();
            let borrowed: Vec<(&str, u32)> = entries.iter().map(|(k, c)| (k.as_str(), *c)).collect();
            let stats = domains(&borrowed);

            let report = Report::build(&stats, threshold);
            let counts: Vec<u32> = report.rows().iter().map(|r| r[0].parse().unwrap()).collect();
            prop_assert!(counts.iter().all(|c| *c >= threshold));
            prop_assert!(counts.windows(2).all(|w| w[0] >= w[1]));

            let stricter = Report::build(&stats, threshold + 1);
            for row in stricter.rows() {
                prop_assert!(report.rows().contains(row));
            }
        }
    }
}
