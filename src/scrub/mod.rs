use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::discover;
use crate::error::PipelineError;
use crate::history::RunLog;
use crate::schema;
use crate::table::{is_blank, Table};

pub const STAGE: &str = "scrub";

const CLEANED_FILE: &str = "T1Skiptrace BST_out_Cleaned.csv";
const FLAGGED_FILE: &str = "Flagged_Litigators.csv";
const NON_HITS_FILE: &str = "Non_Hits.csv";
const IMPORT_FLAGGED_FILE: &str = "Import_Flagged_Litigators.csv";
const IMPORT_SKIPTRACE_FILE: &str = "Import_T1_Skiptrace.csv";
const TESTING_FILE: &str = "Testing_Flagged_Litigators.csv";

/// Result of screening the number registry against the clean list.
///
/// `missing_numbers` is the one-directional set difference
/// registry minus clean; `missing_ids` the IDs owning those numbers.
pub struct LitigatorScreen {
    pub missing_numbers: HashSet<String>,
    pub missing_ids: HashSet<String>,
}

/// Litigator Filter & Report Generator: screen the number registry against
/// the externally supplied clean list, split the merged dataset into cleaned
/// and flagged halves, and emit the downstream reports and import extracts.
#[instrument(level = "info", skip_all, fields(result = %result_dir.display()))]
pub fn run(
    input_dir: &Path,
    merge_output_dir: &Path,
    result_dir: &Path,
    log: &RunLog,
) -> Result<()> {
    let clean_path = discover::required_file(input_dir, &["all_clean"], "csv")?;
    let registry_path = discover::required_file(merge_output_dir, &["Litigator scrubbing"], "csv")?;
    let t1_path = discover::required_file(merge_output_dir, &["T1Skiptrace BST_out"], "csv")?;
    let t1_name = discover::file_name(&t1_path);

    let clean = Table::read_csv(&clean_path)
        .with_context(|| format!("Failed to read {}", clean_path.display()))?;
    let registry = Table::read_csv(&registry_path)
        .with_context(|| format!("Failed to read {}", registry_path.display()))?;
    let t1 = Table::read_csv(&t1_path).with_context(|| format!("Failed to read {}", t1_name))?;

    let screen = screen_litigators(&clean, "clean number list", &registry, "number registry")?;
    info!(
        missing_numbers = screen.missing_numbers.len(),
        missing_ids = screen.missing_ids.len(),
        "litigator screen complete"
    );

    fs::create_dir_all(result_dir)
        .with_context(|| format!("creating result directory {:?}", result_dir))?;

    let id_idx = t1.require_column(schema::ID_COLUMN, &t1_name)?;
    let (flagged, cleaned) = t1.partition_rows(|row| screen.missing_ids.contains(&row[id_idx]));

    let cleaned_path = result_dir.join(CLEANED_FILE);
    cleaned.write_csv(&cleaned_path)?;
    info!(
        "Cleaned T1Skiptrace file saved successfully at {}",
        cleaned_path.display()
    );
    log.record(STAGE, CLEANED_FILE, t1.num_rows(), cleaned.num_rows())?;

    let flagged_path = result_dir.join(FLAGGED_FILE);
    flagged.write_csv(&flagged_path)?;
    info!(
        "Flagged Litigators file saved successfully at {}",
        flagged_path.display()
    );
    log.record(STAGE, FLAGGED_FILE, t1.num_rows(), flagged.num_rows())?;

    let non_hits = non_hit_report(&cleaned, &t1_name)?;
    let non_hits_path = result_dir.join(NON_HITS_FILE);
    non_hits.write_csv(&non_hits_path)?;
    info!(
        "Non Hits file saved successfully at {}",
        non_hits_path.display()
    );
    log.record(STAGE, NON_HITS_FILE, cleaned.num_rows(), non_hits.num_rows())?;

    let import_flagged = import_flagged_extract(&flagged);
    let import_flagged_path = result_dir.join(IMPORT_FLAGGED_FILE);
    import_flagged.write_csv(&import_flagged_path)?;
    info!(
        "Import Flagged Litigators file saved successfully at {}",
        import_flagged_path.display()
    );
    log.record(
        STAGE,
        IMPORT_FLAGGED_FILE,
        flagged.num_rows(),
        import_flagged.num_rows(),
    )?;

    // Diagnostic (ID, Numbers) extract, reusing the screen already computed
    // instead of re-reading the clean and registry files.
    let testing = testing_extract(&registry, "number registry", &screen)?;
    let testing_path = result_dir.join(TESTING_FILE);
    testing.write_csv(&testing_path)?;
    info!(
        "Testing Flagged Litigators file saved successfully at {}",
        testing_path.display()
    );
    log.record(STAGE, TESTING_FILE, registry.num_rows(), testing.num_rows())?;

    let import_skiptrace = import_skiptrace_extract(&cleaned);
    let import_path = result_dir.join(IMPORT_SKIPTRACE_FILE);
    import_skiptrace.write_csv(&import_path)?;
    info!(
        "Import T1 Skiptrace file saved successfully at {}",
        import_path.display()
    );
    log.record(
        STAGE,
        IMPORT_SKIPTRACE_FILE,
        cleaned.num_rows(),
        import_skiptrace.num_rows(),
    )?;
    Ok(())
}

/// Numbers present in the registry but absent from the clean list, and the
/// IDs owning them. Clean is ground truth: the difference is one-directional,
/// never symmetric.
pub fn screen_litigators(
    clean: &Table,
    clean_name: &str,
    registry: &Table,
    registry_name: &str,
) -> Result<LitigatorScreen, PipelineError> {
    let clean_idx = clean.require_column(schema::NUMBERS_COLUMN, clean_name)?;
    let reg_id_idx = registry.require_column(schema::ID_COLUMN, registry_name)?;
    let reg_num_idx = registry.require_column(schema::NUMBERS_COLUMN, registry_name)?;

    let clean_numbers: HashSet<&str> = clean
        .rows
        .iter()
        .map(|row| row[clean_idx].as_str())
        .filter(|n| !is_blank(n))
        .collect();

    let mut missing_numbers = HashSet::new();
    let mut missing_ids = HashSet::new();
    for row in &registry.rows {
        let number = row[reg_num_idx].as_str();
        if is_blank(number) || clean_numbers.contains(number) {
            continue;
        }
        missing_numbers.insert(number.to_string());
        missing_ids.insert(row[reg_id_idx].clone());
    }

    Ok(LitigatorScreen {
        missing_numbers,
        missing_ids,
    })
}

/// Rows of the cleaned dataset with every phone slot blank, projected to the
/// contact-only schema with normalized names.
pub fn non_hit_report(cleaned: &Table, table_name: &str) -> Result<Table, PipelineError> {
    let slot_idxs: Vec<usize> = schema::PHONE_SLOT_COLUMNS
        .iter()
        .map(|col| cleaned.require_column(col, table_name))
        .collect::<Result<_, _>>()?;

    let (non_hits, _) = cleaned.partition_rows(|row| slot_idxs.iter().all(|&i| is_blank(&row[i])));
    let mut projected = schema::reconcile(&non_hits, &schema::NON_HIT_RENAMES, schema::NON_HIT_ORDER);
    normalize_names(&mut projected);
    Ok(projected)
}

/// Collapse single-name records into the LastName slot: a blank LastName
/// takes the FirstName value, and a LastName equal to FirstName blanks
/// FirstName.
pub fn normalize_names(table: &mut Table) {
    let (Some(first), Some(last)) = (
        table.column_index("FirstName"),
        table.column_index("LastName"),
    ) else {
        return;
    };
    for row in &mut table.rows {
        if is_blank(&row[last]) {
            row[last] = row[first].clone();
        }
        if row[last] == row[first] {
            row[first].clear();
        }
    }
}

/// Flagged-litigator rows projected to the import contact columns with the
/// litigator metadata constants appended.
pub fn import_flagged_extract(flagged: &Table) -> Table {
    let mut extract = schema::reconcile(flagged, &HashMap::new(), schema::IMPORT_CONTACT_COLUMNS);
    for (name, value) in schema::IMPORT_LITIGATOR_METADATA {
        extract.append_constant_column(name, value);
    }
    extract
}

/// Cleaned-dataset rows reconciled to the full import column sequence,
/// keeping only rows with a value in at least one phone-bearing column, with
/// the skiptrace metadata constants appended.
pub fn import_skiptrace_extract(cleaned: &Table) -> Table {
    let mut extract = schema::reconcile(cleaned, &HashMap::new(), schema::IMPORT_FINAL_COLUMNS);
    let phone_idxs = extract.columns_containing("Phone");
    extract.retain_rows(|row| phone_idxs.iter().any(|&i| !is_blank(&row[i])));
    for (name, value) in schema::IMPORT_SKIPTRACE_METADATA {
        extract.append_constant_column(name, value);
    }
    extract
}

/// The registry rows whose number failed the screen, as bare (ID, Numbers)
/// pairs for inspection.
pub fn testing_extract(
    registry: &Table,
    registry_name: &str,
    screen: &LitigatorScreen,
) -> Result<Table, PipelineError> {
    let id_idx = registry.require_column(schema::ID_COLUMN, registry_name)?;
    let num_idx = registry.require_column(schema::NUMBERS_COLUMN, registry_name)?;

    let mut out = Table::new(vec![
        schema::ID_COLUMN.to_string(),
        schema::NUMBERS_COLUMN.to_string(),
    ]);
    for row in &registry.rows {
        if screen.missing_numbers.contains(&row[num_idx]) {
            out.rows.push(vec![row[id_idx].clone(), row[num_idx].clone()]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers_table(numbers: &[&str]) -> Table {
        Table {
            headers: vec!["Numbers".into()],
            rows: numbers.iter().map(|n| vec![n.to_string()]).collect(),
        }
    }

    fn registry_table(pairs: &[(&str, &str)]) -> Table {
        Table {
            headers: vec!["ID".into(), "Numbers".into()],
            rows: pairs
                .iter()
                .map(|(id, n)| vec![id.to_string(), n.to_string()])
                .collect(),
        }
    }

    #[test]
    fn screen_is_one_directional_set_difference() {
        let clean = numbers_table(&["555-0001", "555-0002"]);
        let registry = registry_table(&[("1", "555-0001"), ("2", "555-0099")]);

        let screen = screen_litigators(&clean, "clean", &registry, "registry").unwrap();
        assert_eq!(
            screen.missing_numbers,
            HashSet::from(["555-0099".to_string()])
        );
        assert_eq!(screen.missing_ids, HashSet::from(["2".to_string()]));
    }

    #[test]
    fn screen_is_empty_when_registry_is_subset_of_clean() {
        let clean = numbers_table(&["555-0001", "555-0002", "555-0003"]);
        let registry = registry_table(&[("1", "555-0001"), ("2", "555-0002")]);

        let screen = screen_litigators(&clean, "clean", &registry, "registry").unwrap();
        assert!(screen.missing_numbers.is_empty());
        assert!(screen.missing_ids.is_empty());
        // clean-only numbers must NOT surface (that would be the symmetric
        // difference, the latent bug in the legacy flow)
        assert!(!screen.missing_numbers.contains("555-0003"));
    }

    /// Merged dataset with ID + the phone slots + contact columns the
    /// reports project.
    fn merged_table(rows: Vec<(&str, &str, &str, Option<&str>)>) -> Table {
        // (id, first, last, phone1)
        let mut headers = vec![
            "ID".to_string(),
            "Folio".into(),
            "First Name".into(),
            "Last Name".into(),
            "Mailing Address".into(),
            "Mailing city".into(),
            "Mailing state".into(),
            "Mailing zip".into(),
            "Property Address".into(),
            "Property city".into(),
            "Property State".into(),
            "Property zip".into(),
            "Bankrupcy".into(),
            "Estate".into(),
            "Golden Address".into(),
            "Golden city".into(),
            "Golden State".into(),
            "Golden Zip".into(),
        ];
        let contact_width = headers.len();
        headers.extend(schema::PHONE_SLOT_COLUMNS.iter().map(|s| s.to_string()));

        let table_rows = rows
            .into_iter()
            .map(|(id, first, last, phone)| {
                let mut row = vec![String::new(); contact_width];
                row[0] = id.to_string();
                row[1] = format!("folio-{}", id);
                row[2] = first.to_string();
                row[3] = last.to_string();
                let mut slots = vec![String::new(); schema::PHONE_SLOT_COLUMNS.len()];
                if let Some(p) = phone {
                    slots[0] = p.to_string();
                }
                row.extend(slots);
                row
            })
            .collect();
        Table {
            headers,
            rows: table_rows,
        }
    }

    #[test]
    fn partition_by_flagged_ids_is_disjoint_and_complete() {
        let t1 = merged_table(vec![
            ("1", "Ann", "Smith", Some("555-0001")),
            ("2", "Bo", "Jones", Some("555-0099")),
            ("3", "Cy", "Doe", None),
        ]);
        let flagged_ids = HashSet::from(["2".to_string()]);
        let id_idx = t1.column_index("ID").unwrap();

        let (flagged, cleaned) = t1.partition_rows(|row| flagged_ids.contains(&row[id_idx]));
        assert_eq!(flagged.num_rows(), 1);
        assert_eq!(flagged.rows[0][0], "2");
        assert_eq!(cleaned.num_rows(), 2);

        let mut ids: Vec<String> = flagged
            .rows
            .iter()
            .chain(cleaned.rows.iter())
            .map(|r| r[0].clone())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn non_hits_are_rows_with_every_phone_slot_blank() {
        let cleaned = merged_table(vec![
            ("1", "Ann", "Smith", Some("555-0001")),
            ("3", "Cy", "Doe", None),
        ]);
        let report = non_hit_report(&cleaned, "cleaned").unwrap();

        assert_eq!(report.headers, schema::NON_HIT_ORDER);
        assert_eq!(report.num_rows(), 1);
        let folio_idx = report.column_index("Folio").unwrap();
        assert_eq!(report.rows[0][folio_idx], "folio-3");
    }

    #[test]
    fn name_normalization_collapses_single_names() {
        let cleaned = merged_table(vec![("3", "Acme LLC", "", None)]);
        let report = non_hit_report(&cleaned, "cleaned").unwrap();

        let first = report.column_index("FirstName").unwrap();
        let last = report.column_index("LastName").unwrap();
        assert_eq!(report.rows[0][last], "Acme LLC");
        assert_eq!(report.rows[0][first], "");
    }

    #[test]
    fn name_normalization_is_idempotent() {
        let mut table = Table {
            headers: vec!["FirstName".into(), "LastName".into()],
            rows: vec![
                vec!["Acme LLC".into(), String::new()],
                vec!["Ann".into(), "Smith".into()],
                vec!["Pat".into(), "Pat".into()],
            ],
        };
        normalize_names(&mut table);
        let once = table.rows.clone();
        normalize_names(&mut table);
        assert_eq!(once, table.rows);
    }

    #[test]
    fn import_flagged_extract_appends_constant_metadata() {
        let flagged = merged_table(vec![("2", "Bo", "Jones", Some("555-0099"))]);
        let extract = import_flagged_extract(&flagged);

        let mut expected: Vec<&str> = schema::IMPORT_CONTACT_COLUMNS.to_vec();
        expected.extend(schema::IMPORT_LITIGATOR_METADATA.iter().map(|(n, _)| *n));
        assert_eq!(extract.headers, expected);

        let note_idx = extract.column_index("Note").unwrap();
        let plan_idx = extract.column_index("Action Plan").unwrap();
        assert_eq!(extract.rows[0][note_idx], "Possible Litigator");
        assert_eq!(extract.rows[0][plan_idx], "30");
    }

    #[test]
    fn import_skiptrace_extract_drops_phoneless_rows_and_orders_columns() {
        let cleaned = merged_table(vec![
            ("1", "Ann", "Smith", Some("555-0001")),
            ("3", "Cy", "Doe", None),
        ]);
        let extract = import_skiptrace_extract(&cleaned);

        let mut expected: Vec<&str> = schema::IMPORT_FINAL_COLUMNS.to_vec();
        expected.extend(schema::IMPORT_SKIPTRACE_METADATA.iter().map(|(n, _)| *n));
        assert_eq!(extract.headers, expected);

        // the phoneless row is gone
        assert_eq!(extract.num_rows(), 1);
        let folio_idx = extract.column_index("Folio").unwrap();
        assert_eq!(extract.rows[0][folio_idx], "folio-1");
        // email columns absent upstream come through blank
        let email_idx = extract.column_index("EMAIL: Email1").unwrap();
        assert!(is_blank(&extract.rows[0][email_idx]));
    }

    #[test]
    fn testing_extract_reuses_screen_result() {
        let registry = registry_table(&[("1", "555-0001"), ("2", "555-0099"), ("2", "555-0100")]);
        let screen = LitigatorScreen {
            missing_numbers: HashSet::from(["555-0099".to_string(), "555-0100".to_string()]),
            missing_ids: HashSet::from(["2".to_string()]),
        };

        let out = testing_extract(&registry, "registry", &screen).unwrap();
        assert_eq!(out.num_rows(), 2);
        assert!(out.rows.iter().all(|r| r[0] == "2"));
    }
}
