use std::collections::HashMap;

use crate::table::Table;

/// Reconcile `table` against a target schema.
///
/// Each output column is looked up in the source by canonical name: a source
/// header matches if renaming it via `renames` (or leaving it untouched)
/// yields the target name. Matched columns are copied through, unmatched
/// target columns are filled with blanks, and source columns outside the
/// target set are dropped. The output column order is exactly `target`.
///
/// Every per-stage projection in the pipeline goes through here; the stages
/// only differ in which rename map and order they feed in.
pub fn reconcile(table: &Table, renames: &HashMap<&str, &str>, target: &[&str]) -> Table {
    // canonical name of each source column
    let canonical: Vec<&str> = table
        .headers
        .iter()
        .map(|h| renames.get(h.as_str()).copied().unwrap_or(h.as_str()))
        .collect();

    // first source column matching each target name wins
    let source_idx: Vec<Option<usize>> = target
        .iter()
        .map(|t| canonical.iter().position(|c| c == t))
        .collect();

    let mut out = Table::new(target.iter().map(|t| t.to_string()).collect());
    for row in &table.rows {
        let projected: Vec<String> = source_idx
            .iter()
            .map(|idx| match idx {
                Some(i) => row[*i].clone(),
                None => String::new(),
            })
            .collect();
        out.rows.push(projected);
    }
    out
}

/// Rename headers in place, leaving unmapped columns untouched.
pub fn rename_headers(table: &mut Table, renames: &HashMap<&str, &str>) {
    for header in &mut table.headers {
        if let Some(new_name) = renames.get(header.as_str()) {
            *header = new_name.to_string();
        }
    }
}
