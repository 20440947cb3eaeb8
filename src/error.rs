use thiserror::Error;

/// Failure categories that terminate a stage. None of these are fatal to the
/// process: the pipeline runner logs the diagnostic and moves on to the next
/// stage, whose own input discovery then reports what is missing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input file was absent from its directory, detected before
    /// any read is attempted.
    #[error("no file matching \"{pattern}\" with extension .{ext} found in {dir}")]
    MissingInputFile {
        dir: String,
        pattern: String,
        ext: String,
    },

    /// The positional merge requires both files to have exactly the same
    /// number of rows.
    #[error("row count mismatch: {left_name} has {left} rows, {right_name} has {right}")]
    RowCountMismatch {
        left_name: String,
        left: usize,
        right_name: String,
        right: usize,
    },

    /// A column the stage depends on is not present in the table.
    #[error("column \"{column}\" missing from {table}")]
    MissingColumn { table: String, column: String },
}
