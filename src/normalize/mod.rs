use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{error, info, instrument, warn};

use crate::discover;
use crate::error::PipelineError;
use crate::history::RunLog;
use crate::schema;
use crate::table::{is_blank, Table};

pub const STAGE: &str = "normalize";

/// Tag substring marking records that already went through skiptrace.
const SKIPTRACE_TAG: &str = "Skiptrace";

/// Contact Normalizer: read raw SMS / Cold Calling exports, keep the
/// un-contacted rows with no phone number on file, project them to the
/// canonical contact schema, drop cross-file duplicates, and write one
/// ` - BST` output per input.
#[instrument(level = "info", skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub fn run(input_dir: &Path, output_dir: &Path, log: &RunLog) -> Result<()> {
    let files = discover::files_matching(input_dir, &["SMS", "Cold Calling"], "csv")?;
    if files.is_empty() {
        warn!("no SMS or Cold Calling files found in {}", input_dir.display());
        return Ok(());
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {:?}", output_dir))?;

    // (file name, input row count, normalized table)
    let mut results: Vec<(String, usize, Table)> = Vec::new();
    for path in &files {
        let name = discover::file_name(path);
        let table = match Table::read_csv(path) {
            Ok(t) => t,
            Err(e) => {
                error!("An error occurred when reading {}: {}", name, e);
                continue;
            }
        };
        let rows_in = table.num_rows();
        match normalize_contacts(&table, &name) {
            Ok(normalized) => results.push((name, rows_in, normalized)),
            Err(PipelineError::MissingColumn { .. }) => {
                warn!("The column \"TAGS\" is missing in {}, skipping this file", name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Cold Calling is the keeper list; matching SMS rows are the duplicates.
    let cold_calling = results
        .iter()
        .position(|(name, _, _)| name.contains("Cold Calling"));
    let sms = results.iter().position(|(name, _, _)| name.contains("SMS"));
    if let (Some(cc_idx), Some(sms_idx)) = (cold_calling, sms) {
        if cc_idx == sms_idx {
            warn!("one file matched both SMS and Cold Calling; skipping dedup");
            return write_results(&results, output_dir, log);
        }
        let cold_calling_table = results[cc_idx].2.clone();
        let removed = remove_cross_file_duplicates(&mut results[sms_idx].2, &cold_calling_table);
        info!(
            "Removed {} duplicate entries from SMS based on mailing criteria",
            removed
        );
    }

    write_results(&results, output_dir, log)
}

/// Write one ` - BST` output per processed input. A failed write is logged
/// and does not block the remaining files.
fn write_results(results: &[(String, usize, Table)], output_dir: &Path, log: &RunLog) -> Result<()> {
    for (name, rows_in, table) in results {
        let out_name = output_name(name);
        let out_path = output_dir.join(&out_name);
        if let Err(e) = table.write_csv(&out_path) {
            error!("Failed to save the output file {}: {}", out_name, e);
            continue;
        }
        info!("Output file created at {}", out_path.display());
        info!(
            "Total properties processed for {}: {}",
            name,
            table.num_rows()
        );
        log.record(STAGE, &out_name, *rows_in, table.num_rows())?;
    }
    Ok(())
}

/// Keep rows whose tag does not contain `Skiptrace` and whose phone columns
/// are all blank, then reconcile to the canonical contact schema.
///
/// Phone columns are discovered dynamically (any header containing
/// `PHONE NUMBER`); with none present the phone condition holds vacuously.
pub fn normalize_contacts(table: &Table, name: &str) -> Result<Table, PipelineError> {
    let tags_idx = table.require_column(schema::TAGS_COLUMN, name)?;
    let phone_idxs = table.columns_containing(schema::RAW_PHONE_NEEDLE);

    let mut filtered = table.clone();
    filtered.retain_rows(|row| {
        !row[tags_idx].contains(SKIPTRACE_TAG) && phone_idxs.iter().all(|&i| is_blank(&row[i]))
    });

    Ok(schema::reconcile(
        &filtered,
        &schema::CONTACT_RENAMES,
        schema::CONTACT_ORDER,
    ))
}

/// Remove from `sms` every row whose (MailingAddress, MailingZip) pair
/// matches a `cold_calling` row. The match is a joint, row-wise pair
/// comparison; a pair with a blank half never matches anything.
///
/// Returns the number of rows removed.
pub fn remove_cross_file_duplicates(sms: &mut Table, cold_calling: &Table) -> usize {
    let (addr_name, zip_name) = schema::DEDUP_COLUMNS;
    let (Some(cc_addr), Some(cc_zip)) = (
        cold_calling.column_index(addr_name),
        cold_calling.column_index(zip_name),
    ) else {
        return 0;
    };
    let (Some(sms_addr), Some(sms_zip)) =
        (sms.column_index(addr_name), sms.column_index(zip_name))
    else {
        return 0;
    };

    let keep_pairs: HashSet<(&str, &str)> = cold_calling
        .rows
        .iter()
        .filter(|row| !is_blank(&row[cc_addr]) && !is_blank(&row[cc_zip]))
        .map(|row| (row[cc_addr].as_str(), row[cc_zip].as_str()))
        .collect();

    let before = sms.num_rows();
    sms.rows.retain(|row| {
        if is_blank(&row[sms_addr]) || is_blank(&row[sms_zip]) {
            return true;
        }
        !keep_pairs.contains(&(row[sms_addr].as_str(), row[sms_zip].as_str()))
    });
    before - sms.num_rows()
}

/// `SMS.csv` becomes `SMS - BST.csv`.
fn output_name(input_name: &str) -> String {
    match input_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{} - BST.{}", stem, ext),
        None => format!("{} - BST", input_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_export() -> Table {
        Table {
            headers: vec![
                "FOLIO".into(),
                "TAGS".into(),
                "PHONE NUMBER 1".into(),
                "PHONE NUMBER 2".into(),
                "MAILING ADDRESS".into(),
                "MAILING ZIP".into(),
            ],
            rows: vec![
                // kept: no skiptrace tag, no phones
                vec![
                    "f1".into(),
                    "hot lead".into(),
                    String::new(),
                    String::new(),
                    "1 Main St".into(),
                    "33101".into(),
                ],
                // dropped: tagged Skiptrace
                vec![
                    "f2".into(),
                    "Skiptrace 2023".into(),
                    String::new(),
                    String::new(),
                    "2 Main St".into(),
                    "33102".into(),
                ],
                // dropped: has a phone on file
                vec![
                    "f3".into(),
                    String::new(),
                    "555-0001".into(),
                    String::new(),
                    "3 Main St".into(),
                    "33103".into(),
                ],
                // kept: blank tag counts as not containing Skiptrace
                vec![
                    "f4".into(),
                    String::new(),
                    String::new(),
                    String::new(),
                    "4 Main St".into(),
                    "33104".into(),
                ],
            ],
        }
    }

    #[test]
    fn filters_tagged_and_phoned_rows() {
        let out = normalize_contacts(&raw_export(), "SMS.csv").unwrap();
        let folios: Vec<&str> = out.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(folios, vec!["f1", "f4"]);
    }

    #[test]
    fn output_uses_canonical_order_with_blank_missing_columns() {
        let out = normalize_contacts(&raw_export(), "SMS.csv").unwrap();
        assert_eq!(out.headers, schema::CONTACT_ORDER);
        // OwnerFullName was not in the source; it must exist and be blank
        let owner_idx = out.column_index("OwnerFullName").unwrap();
        assert!(is_blank(&out.rows[0][owner_idx]));
        let addr_idx = out.column_index("MailingAddress").unwrap();
        assert_eq!(out.rows[0][addr_idx], "1 Main St");
    }

    #[test]
    fn missing_tags_column_is_reported() {
        let table = Table {
            headers: vec!["FOLIO".into()],
            rows: vec![vec!["f1".into()]],
        };
        let err = normalize_contacts(&table, "SMS.csv").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }

    #[test]
    fn no_phone_columns_keeps_untagged_rows() {
        let table = Table {
            headers: vec!["FOLIO".into(), "TAGS".into()],
            rows: vec![vec!["f1".into(), "warm".into()]],
        };
        let out = normalize_contacts(&table, "SMS.csv").unwrap();
        assert_eq!(out.num_rows(), 1);
    }

    fn contact(addr: &str, zip: &str) -> Vec<String> {
        schema::CONTACT_ORDER
            .iter()
            .map(|col| match *col {
                "MailingAddress" => addr.to_string(),
                "MailingZip" => zip.to_string(),
                _ => String::new(),
            })
            .collect()
    }

    fn contact_table(rows: Vec<Vec<String>>) -> Table {
        Table {
            headers: schema::CONTACT_ORDER.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn dedup_removes_matching_pair_and_keeps_different_zip() {
        let cold_calling = contact_table(vec![contact("1 Main St", "33101")]);
        let mut sms = contact_table(vec![
            contact("1 Main St", "33101"),
            contact("1 Main St", "33199"),
        ]);

        let removed = remove_cross_file_duplicates(&mut sms, &cold_calling);
        assert_eq!(removed, 1);
        assert_eq!(sms.num_rows(), 1);
        let zip_idx = sms.column_index("MailingZip").unwrap();
        assert_eq!(sms.rows[0][zip_idx], "33199");
    }

    #[test]
    fn dedup_never_matches_blank_pairs() {
        let cold_calling = contact_table(vec![contact("", "")]);
        let mut sms = contact_table(vec![contact("", "")]);

        let removed = remove_cross_file_duplicates(&mut sms, &cold_calling);
        assert_eq!(removed, 0);
        assert_eq!(sms.num_rows(), 1);
    }

    #[test]
    fn bst_suffix_lands_before_the_extension() {
        assert_eq!(output_name("SMS.csv"), "SMS - BST.csv");
        assert_eq!(output_name("Cold Calling.csv"), "Cold Calling - BST.csv");
    }
}
