use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::discover;
use crate::error::PipelineError;
use crate::history::RunLog;
use crate::schema;
use crate::table::{is_blank, Table};

pub const STAGE: &str = "integrate";

/// Output name of the number registry consumed by the litigator screen.
pub const REGISTRY_FILE: &str = "Litigator scrubbing.csv";

/// Skiptrace Merger: align the skiptrace result file with its campaign file
/// row by row, recode flags, rename to canonical columns, assign sequential
/// IDs, and flatten the phone slots into the number registry.
#[instrument(level = "info", skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub fn run(input_dir: &Path, output_dir: &Path, log: &RunLog) -> Result<()> {
    let t1_path = discover::required_file(input_dir, &["T1Skiptrace BST_out"], "csv")?;
    let campaign_path = discover::required_file(input_dir, &["Cold Calling", "SMS"], "csv")?;
    let t1_name = discover::file_name(&t1_path);
    let campaign_name = discover::file_name(&campaign_path);

    let t1 = Table::read_csv(&t1_path)
        .with_context(|| format!("Failed to read the skiptrace file {}", t1_name))?;
    let campaign = Table::read_csv(&campaign_path)
        .with_context(|| format!("Failed to read the campaign file {}", campaign_name))?;
    let rows_in = t1.num_rows();

    let merged = merge_skiptrace(t1, &t1_name, &campaign, &campaign_name)?;
    let registry = build_number_registry(&merged, &t1_name)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {:?}", output_dir))?;

    let merged_name = format!("modified_{}", t1_name);
    let merged_path = output_dir.join(&merged_name);
    merged.write_csv(&merged_path)?;
    info!("Modified file saved successfully at {}", merged_path.display());
    log.record(STAGE, &merged_name, rows_in, merged.num_rows())?;

    let registry_path = output_dir.join(REGISTRY_FILE);
    registry.write_csv(&registry_path)?;
    info!(
        "Litigator scrubbing file saved successfully at {}",
        registry_path.display()
    );
    log.record(STAGE, REGISTRY_FILE, merged.num_rows(), registry.num_rows())?;
    Ok(())
}

/// Merge a skiptrace result table with its campaign table.
///
/// The two files have no join key; correspondence is purely positional, so
/// equal row counts are a hard precondition. The campaign file contributes
/// only its Folio column.
pub fn merge_skiptrace(
    mut t1: Table,
    t1_name: &str,
    campaign: &Table,
    campaign_name: &str,
) -> Result<Table, PipelineError> {
    if t1.num_rows() != campaign.num_rows() {
        return Err(PipelineError::RowCountMismatch {
            left_name: t1_name.to_string(),
            left: t1.num_rows(),
            right_name: campaign_name.to_string(),
            right: campaign.num_rows(),
        });
    }

    let folio_idx = campaign.require_column(schema::FOLIO_COLUMN, campaign_name)?;
    t1.insert_column(0, schema::FOLIO_COLUMN, campaign.column_values(folio_idx));

    // Y/N flags become 1/blank for the import tooling; anything else is
    // passed through untouched.
    for flag in [schema::DECEASED_COLUMN, schema::BANKRUPT_COLUMN] {
        let idx = t1.require_column(flag, t1_name)?;
        for row in &mut t1.rows {
            match row[idx].as_str() {
                "N" => row[idx].clear(),
                "Y" => row[idx] = "1".to_string(),
                _ => {}
            }
        }
    }

    schema::rename_headers(&mut t1, &schema::SKIPTRACE_RENAMES);

    let ids: Vec<String> = (1..=t1.num_rows()).map(|i| i.to_string()).collect();
    t1.insert_column(0, schema::ID_COLUMN, ids);
    Ok(t1)
}

/// Flatten the phone slot columns of the merged dataset into the number
/// registry: one (ID, Numbers) row per non-blank phone cell, slots scanned
/// left to right within each record. Blank cells are dropped entirely, so
/// the registry never carries a null number.
pub fn build_number_registry(merged: &Table, table_name: &str) -> Result<Table, PipelineError> {
    let id_idx = merged.require_column(schema::ID_COLUMN, table_name)?;
    let slot_idxs: Vec<usize> = schema::PHONE_SLOT_COLUMNS
        .iter()
        .map(|col| merged.require_column(col, table_name))
        .collect::<Result<_, _>>()?;

    let mut registry = Table::new(vec![
        schema::ID_COLUMN.to_string(),
        schema::NUMBERS_COLUMN.to_string(),
    ]);
    for row in &merged.rows {
        for &slot in &slot_idxs {
            if !is_blank(&row[slot]) {
                registry
                    .rows
                    .push(vec![row[id_idx].clone(), row[slot].clone()]);
            }
        }
    }
    Ok(registry)
}
