//! File-derivation rules engine
//!
//! Maps the domain codes on a setup record to file-operation descriptors.
//! Domains form a strict priority list: the first domain column present on a
//! record selects the single rule branch that fires, and lower-priority
//! domains are not evaluated for that record. Derivation is total and pure;
//! a record with no recognized domain yields an empty list.

pub mod descriptor;
pub mod record;
pub mod tables;

pub use descriptor::{Cadence, FileDescriptor, Refresh};
pub use record::OrgSetupRecord;
pub use tables::{refresh_for_code, rule_for, Domain, FileRule, DOMAIN_PRIORITY};

/// Derive file descriptors for a setup record
pub fn derive(record: &OrgSetupRecord) -> Vec<FileDescriptor> {
    for domain in DOMAIN_PRIORITY {
        let Some(code) = domain.code_of(record) else {
            continue;
        };
        // One branch fires per record; an unrecognized code in a code-keyed
        // map (MORS) still consumes the match and yields nothing.
        return match rule_for(domain, code, record) {
            Some(rule) => vec![attach_key_block(rule, record)],
            None => Vec::new(),
        };
    }
    Vec::new()
}

/// Copy the record's key block into a descriptor, unchanged
fn attach_key_block(rule: FileRule, record: &OrgSetupRecord) -> FileDescriptor {
    FileDescriptor {
        file: rule.file,
        delimiter: rule.delimiter,
        file_type: rule.file_type,
        cadence: rule.cadence,
        refresh: rule.refresh,
        has_header: rule.has_header,
        cycle: record.dx_cycle,
        org_log: record.org_log.clone(),
        org_cd: record.org_cd.clone(),
        engmt_manager: record.engmt_manager.clone(),
        aco_analyst: record.aco_analyst.clone(),
        custom_logic: None,
        column: None,
        value: None,
        notify_changes: None,
    }
}
