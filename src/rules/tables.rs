//! Per-domain rule tables
//!
//! Each domain maps its code value to cadence, refresh mode, header presence
//! and file naming through an explicit lookup. Domains are evaluated in the
//! order of [`DOMAIN_PRIORITY`]; the first one present on a record wins and
//! the rest are not consulted for that record.

use super::descriptor::{Cadence, Refresh};
use super::record::OrgSetupRecord;

/// A file-exchange domain carried as a code column on a setup record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Claims,
    Enroll,
    Rx,
    Lab,
    Case,
    Elig6,
    Cap,
    ClaimsXwalk,
    Gic,
    Dns,
    Provider,
    Code,
}

/// Evaluation order: first present domain wins, the rest are skipped
pub const DOMAIN_PRIORITY: [Domain; 12] = [
    Domain::Claims,
    Domain::Enroll,
    Domain::Rx,
    Domain::Lab,
    Domain::Case,
    Domain::Elig6,
    Domain::Cap,
    Domain::ClaimsXwalk,
    Domain::Gic,
    Domain::Dns,
    Domain::Provider,
    Domain::Code,
];

// Header yes-lists per domain
const RX_HEADER_CODES: [&str; 5] = ["H", "S", "HS", "DHI", "DHF"];
const LAB_HEADER_CODES: [&str; 4] = ["H", "S", "DHI", "DHF"];
const ELIG6_HEADER_CODES: [&str; 5] = ["Y", "T", "X", "Z", "TZ"];
/// Override list: forces the header off even if the code is in the yes-list
const ELIG6_HEADER_OVERRIDES: [&str; 3] = ["WX", "WT", "WY"];
const PROVIDER_HEADER_CODES: [&str; 2] = ["Y", "P"];
const CLAIMS_HEADER_CODES: [&str; 2] = ["H", "S"];

/// Claims codes that defer their refresh mode to the `incremental` column
const CLAIMS_INCREMENTAL_CODES: [&str; 2] = ["Y", "O"];

/// Shared refresh-code mapping used by claims, rx, lab, cap and claims_xwalk
pub fn refresh_for_code(code: &str) -> Refresh {
    match code {
        "Y" | "O" | "W" | "WS" => Refresh::Incremental,
        _ => Refresh::Full,
    }
}

/// Rule output before the record's key block is attached
#[derive(Debug, Clone, PartialEq)]
pub struct FileRule {
    pub file: String,
    pub delimiter: Option<String>,
    pub file_type: Option<String>,
    pub cadence: Cadence,
    pub refresh: Refresh,
    pub has_header: bool,
}

impl FileRule {
    fn new(file: &str, cadence: Cadence, refresh: Refresh, has_header: bool) -> Self {
        Self {
            file: file.to_string(),
            delimiter: None,
            file_type: None,
            cadence,
            refresh,
            has_header,
        }
    }
}

impl Domain {
    /// Code value for this domain on the record, if present
    pub fn code_of<'a>(&self, record: &'a OrgSetupRecord) -> Option<&'a str> {
        let field = match self {
            Self::Claims => &record.claims,
            Self::Enroll => &record.enroll,
            Self::Rx => &record.rx,
            Self::Lab => &record.lab,
            Self::Case => &record.case,
            Self::Elig6 => &record.elig6,
            Self::Cap => &record.cap,
            Self::ClaimsXwalk => &record.claims_xwalk,
            Self::Gic => &record.gic,
            Self::Dns => &record.dns,
            Self::Provider => &record.provider,
            Self::Code => &record.code,
        };
        field.as_deref()
    }
}

/// Resolve the rule for a (domain, code) pair
///
/// Returns None only where the table has no entry for the code (the MORS
/// file-name map); every other domain has a default row.
pub fn rule_for(domain: Domain, code: &str, record: &OrgSetupRecord) -> Option<FileRule> {
    match domain {
        Domain::Claims => Some(claims_rule(code, record)),
        Domain::Enroll => Some(enroll_rule(record)),
        Domain::Rx => Some(rx_rule(code)),
        Domain::Lab => Some(lab_rule(code)),
        Domain::Case => Some(case_rule(code)),
        Domain::Elig6 => Some(elig6_rule(code)),
        Domain::Cap => Some(cap_rule(code)),
        Domain::ClaimsXwalk => Some(claims_xwalk_rule(code)),
        Domain::Gic => Some(gic_rule(record)),
        Domain::Dns => Some(dns_rule()),
        Domain::Provider => Some(provider_rule(code)),
        Domain::Code => mors_rule(code),
    }
}

fn claims_rule(code: &str, record: &OrgSetupRecord) -> FileRule {
    // Codes Y/O defer to the incremental column; everything else is a full load
    let refresh = if CLAIMS_INCREMENTAL_CODES.contains(&code) {
        refresh_for_code(record.incremental.as_deref().unwrap_or("No"))
    } else {
        Refresh::Full
    };
    FileRule::new(
        "Medical Claims",
        Cadence::Monthly,
        refresh,
        CLAIMS_HEADER_CODES.contains(&code),
    )
}

fn enroll_rule(record: &OrgSetupRecord) -> FileRule {
    let mut rule = FileRule::new("Enrollment/COE6", Cadence::Monthly, Refresh::Full, false);
    rule.delimiter = Some(
        record
            .enroll_delimiter
            .clone()
            .unwrap_or_else(|| "NA".to_string()),
    );
    rule
}

fn rx_rule(code: &str) -> FileRule {
    match code {
        "Y" | "H" | "S" => FileRule::new(
            "Pharmacy Claims",
            Cadence::Monthly,
            refresh_for_code(code),
            true,
        ),
        "W" | "WS" => FileRule::new(
            "Pharmacy Claims",
            Cadence::Weekly,
            refresh_for_code(code),
            RX_HEADER_CODES.contains(&code),
        ),
        "DHI" | "DHF" => FileRule::new(
            "Pharmacy Claims",
            Cadence::Daily,
            Refresh::Incremental,
            true,
        ),
        _ => FileRule::new(
            "Pharmacy Claims",
            Cadence::Monthly,
            Refresh::Incremental,
            false,
        ),
    }
}

fn lab_rule(code: &str) -> FileRule {
    let (cadence, refresh) = match code {
        "Y" | "H" | "S" => (Cadence::Monthly, refresh_for_code(code)),
        "DHI" | "DHF" => (Cadence::Daily, Refresh::Incremental),
        _ => (Cadence::Monthly, Refresh::Incremental),
    };
    FileRule::new(
        "Lab Results",
        cadence,
        refresh,
        LAB_HEADER_CODES.contains(&code),
    )
}

fn case_rule(code: &str) -> FileRule {
    FileRule::new("Medical Case", Cadence::Monthly, Refresh::Full, code == "H")
}

fn elig6_rule(code: &str) -> FileRule {
    let mut has_header = ELIG6_HEADER_CODES.contains(&code);
    if ELIG6_HEADER_OVERRIDES.contains(&code) {
        has_header = false;
    }
    FileRule::new("Eligibility/COE6", Cadence::Weekly, Refresh::Full, has_header)
}

fn cap_rule(code: &str) -> FileRule {
    FileRule::new("Capitation", Cadence::Monthly, refresh_for_code(code), false)
}

fn claims_xwalk_rule(code: &str) -> FileRule {
    FileRule::new(
        "Claims Crosswalk",
        Cadence::Monthly,
        refresh_for_code(code),
        code == "H",
    )
}

fn gic_rule(record: &OrgSetupRecord) -> FileRule {
    // The FTP tag flips the package name when it carries a real value
    let file = match record.elig_ftp_tag.as_deref() {
        Some(tag) if !tag.is_empty() && tag != "null" => "Clinical Reporting Package",
        _ => "Commercial Gaps in Care",
    };
    FileRule::new(file, Cadence::Monthly, Refresh::Full, false)
}

fn dns_rule() -> FileRule {
    FileRule::new("Premium/MNR", Cadence::Monthly, Refresh::Full, true)
}

fn provider_rule(code: &str) -> FileRule {
    FileRule::new(
        "Provider",
        Cadence::Monthly,
        Refresh::Full,
        PROVIDER_HEADER_CODES.contains(&code),
    )
}

fn mors_rule(tag: &str) -> Option<FileRule> {
    let file = match tag {
        "D" => "MORS-D",
        "E" => "MORS-E-G",
        "J" => "MORS-J",
        "M" => "MORS-M",
        "W" => "MORS-W",
        "L" => "MORS-L",
        "A" => "NAOA",
        _ => return None,
    };
    Some(FileRule::new(file, Cadence::Monthly, Refresh::Full, false))
}
