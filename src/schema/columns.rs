//! The column vocabulary of the pipeline.
//!
//! Column names are the de facto schema contract between stages: raw export
//! headers on the way in, canonical names on the way out. The rename maps
//! and orders here must match what the downstream import tooling expects.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Tag column checked by the contact normalizer.
pub const TAGS_COLUMN: &str = "TAGS";

/// Substring identifying raw-export phone columns ("PHONE NUMBER 1", ...).
pub const RAW_PHONE_NEEDLE: &str = "PHONE NUMBER";

/// Raw marketing-export headers → canonical contact names.
pub static CONTACT_RENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("FOLIO", "Folio"),
        ("OWNER FULL NAME", "OwnerFullName"),
        ("OWNER FIRST NAME", "OwnerFirstName"),
        ("OWNER LAST NAME", "OwnerLastName"),
        ("ADDRESS", "PropertyAddress"),
        ("CITY", "PropertyCity"),
        ("STATE", "PropertyState"),
        ("ZIP", "PropertyZip"),
        ("MAILING ADDRESS", "MailingAddress"),
        ("MAILING CITY", "MailingCity"),
        ("MAILING STATE", "MailingState"),
        ("MAILING ZIP", "MailingZip"),
    ])
});

/// Output column order for normalized contact exports.
pub const CONTACT_ORDER: &[&str] = &[
    "Folio",
    "OwnerFullName",
    "OwnerFirstName",
    "OwnerLastName",
    "MailingAddress",
    "MailingCity",
    "MailingState",
    "MailingZip",
    "PropertyAddress",
    "PropertyCity",
    "PropertyState",
    "PropertyZip",
];

/// The (MailingAddress, MailingZip) pair used for SMS vs Cold Calling dedup.
pub const DEDUP_COLUMNS: (&str, &str) = ("MailingAddress", "MailingZip");

/// Skiptrace flag columns recoded from Y/N to 1/blank before renaming.
pub const DECEASED_COLUMN: &str = "DEC: Deceased (Y/N)";
pub const BANKRUPT_COLUMN: &str = "BNK: Bankrupt (Y/N)";

/// Skiptrace result headers → canonical merged-dataset names.
pub static SKIPTRACE_RENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("INPUT: First Name", "First Name"),
        ("INPUT: Last Name", "Last Name"),
        ("INPUT: Address 1", "Mailing Address"),
        ("INPUT: City", "Mailing city"),
        ("INPUT: State", "Mailing state"),
        ("INPUT: Zip Code", "Mailing zip"),
        ("INPUT: Extra 1", "Property Address"),
        ("INPUT: Extra 2", "Property city"),
        ("INPUT: Extra 3", "Property State"),
        ("INPUT: Extra 4", "Property zip"),
        ("BNK: Bankrupt (Y/N)", "Bankrupcy"),
        ("DEC: Deceased (Y/N)", "Estate"),
        ("ADD: Address1", "Golden Address"),
        ("ADD: Address1 City", "Golden city"),
        ("ADD: Address1 State", "Golden State"),
        ("ADD: Address1 Zip", "Golden Zip"),
    ])
});

/// The phone slot columns of a merged skiptrace record. Source of the
/// number registry and the non-hit test: a record with every one of these
/// blank produced no usable phone number.
pub const PHONE_SLOT_COLUMNS: &[&str] = &[
    "PH: Phone1",
    "PH: Phone2",
    "PH: Phone3",
    "PH: Phone4",
    "PH: Phone5",
    "REL1: Phone 1",
    "REL1: Phone 2",
    "REL1: Phone 3",
    "REL2: Phone 1",
    "REL2: Phone 2",
    "REL2: Phone 3",
    "REL3: Phone 1",
    "REL3: Phone 2",
    "REL3: Phone 3",
];

/// ID column added by the merger; join key for all downstream stages.
pub const ID_COLUMN: &str = "ID";
/// Column holding phone numbers in the registry and the clean list.
pub const NUMBERS_COLUMN: &str = "Numbers";
/// Property/parcel identifier carried through every stage.
pub const FOLIO_COLUMN: &str = "Folio";

/// Merged-dataset headers → contact-only names for the non-hit report.
pub static NON_HIT_RENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Folio", "Folio"),
        ("First Name", "FirstName"),
        ("Last Name", "LastName"),
        ("Mailing Address", "MailingAddress"),
        ("Mailing city", "MailingCity"),
        ("Mailing state", "MailingState"),
        ("Mailing zip", "MailingZip"),
        ("Property Address", "PropertyAddress"),
        ("Property city", "PropertyCity"),
        ("Property State", "PropertyState"),
        ("Property zip", "PropertyZip"),
    ])
});

/// Output column order for the non-hit report.
pub const NON_HIT_ORDER: &[&str] = &[
    "Folio",
    "FirstName",
    "LastName",
    "MailingAddress",
    "MailingCity",
    "MailingState",
    "MailingZip",
    "PropertyAddress",
    "PropertyCity",
    "PropertyState",
    "PropertyZip",
];

/// Contact columns projected into both ready-to-import extracts.
pub const IMPORT_CONTACT_COLUMNS: &[&str] = &[
    "Folio",
    "Property Address",
    "Property zip",
    "Bankrupcy",
    "Estate",
    "Golden Address",
    "Golden city",
    "Golden State",
    "Golden Zip",
];

/// Full column sequence of the Import T1 Skiptrace extract.
pub const IMPORT_FINAL_COLUMNS: &[&str] = &[
    "Folio",
    "Property Address",
    "Property zip",
    "Bankrupcy",
    "Estate",
    "Golden Address",
    "Golden city",
    "Golden State",
    "Golden Zip",
    "PH: Phone1",
    "PH: Phone1 Type",
    "PH: Phone2",
    "PH: Phone2 Type",
    "PH: Phone3",
    "PH: Phone3 Type",
    "PH: Phone4",
    "PH: Phone4 Type",
    "PH: Phone5",
    "PH: Phone5 Type",
    "EMAIL: Email1",
    "EMAIL: Email2",
    "EMAIL: Email3",
    "EMAIL: Email4",
    "EMAIL: Email5",
    "REL1: Phone 1",
    "REL1: Phone 2",
    "REL1: Phone 3",
    "REL2: Phone 1",
    "REL2: Phone 2",
    "REL2: Phone 3",
    "REL3: Phone 1",
    "REL3: Phone 2",
    "REL3: Phone 3",
];

/// Fixed metadata appended to the flagged-litigator import extract,
/// in output order.
pub const IMPORT_LITIGATOR_METADATA: &[(&str, &str)] = &[
    ("Property Skip Trace", "BST"),
    ("Number Source", "T1Skiptrace"),
    ("Phone number skip trace", "BST"),
    ("TAG", "T1Skiptrace"),
    ("Note", "Possible Litigator"),
    ("Action Plan", "30"),
];

/// Fixed metadata appended to the cleaned-dataset import extract.
pub const IMPORT_SKIPTRACE_METADATA: &[(&str, &str)] = &[
    ("Property Skip Trace", "BST"),
    ("Number Source", "T1Skiptrace"),
    ("Phone number skip trace", "BST"),
    ("TAG", "T1Skiptrace"),
];
