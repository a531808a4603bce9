use std::collections::{BTreeSet, HashMap};

use crate::config::EmptyDomainPolicy;
use crate::domain::domain_of;
use crate::sender::SenderRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressStats {
    pub count: u32,
    /// Distinct non-empty display names seen with this address
    pub names: BTreeSet<String>,
    /// Position of this address in first-seen order
    pub first_seen: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStats {
    pub count: u32,
    pub first_seen: usize,
}

pub type AddressTable = HashMap<String, AddressStats>;
pub type DomainTable = HashMap<String, DomainStats>;

/// Folds one sender into the address and domain tables.
pub fn accumulate(
    record: &SenderRecord,
    addresses: &mut AddressTable,
    domains: &mut DomainTable,
    empty_domains: EmptyDomainPolicy,
) {
    if !record.address.is_empty() {
        let next = addresses.len();
        let entry = addresses
            .entry(record.address.clone())
            .or_insert_with(|| AddressStats {
                count: 0,
                names: BTreeSet::new(),
                first_seen: next,
            });
        entry.count += 1;
        if !record.display_name.is_empty() {
            entry.names.insert(record.display_name.clone());
        }
    }

    let domain = domain_of(&record.address);
    if domain.is_empty() && empty_domains == EmptyDomainPolicy::Skip {
        return;
    }

    let next = domains.len();
    domains
        .entry(domain.to_string())
        .or_insert(DomainStats {
            count: 0,
            first_seen: next,
        })
        .count += 1;
}

/// Address and domain counts gathered over one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub addresses: AddressTable,
    pub domains: DomainTable,
}

impl SenderStats {
    pub fn add(&mut self, record: &SenderRecord, empty_domains: EmptyDomainPolicy) {
        accumulate(record, &mut self.addresses, &mut self.domains, empty_domains);
    }
}

/// Tallies of what happened to each file during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_seen: usize,
    pub messages_counted: usize,
    pub deleted: usize,
    pub without_sender: usize,
    pub unparsed_senders: usize,
    pub malformed_skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub stats: SenderStats,
    pub summary: ScanSummary,
}
