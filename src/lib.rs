//! Batch pipeline reshaping marketing/skiptrace spreadsheet exports for a
//! real-estate outreach workflow: normalize raw campaign exports, merge
//! skiptrace results, screen phone numbers for litigators, and emit the
//! downstream reports. Stages integrate only through the file system.

pub mod discover;
pub mod error;
pub mod history;
pub mod integrate;
pub mod normalize;
pub mod schema;
pub mod scrub;
pub mod table;

use std::path::PathBuf;

/// Fixed directory layout of a pipeline run, relative to the working
/// directory. These are the literal folder names the operator workflow
/// expects; there is no flag or environment override.
pub struct PipelineDirs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub t1_input: PathBuf,
    pub t1_output: PathBuf,
    pub result: PathBuf,
    pub history: PathBuf,
}

impl Default for PipelineDirs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input"),
            output: PathBuf::from("output"),
            t1_input: PathBuf::from("t1 input"),
            t1_output: PathBuf::from("t1 output"),
            result: PathBuf::from("after t1 output"),
            history: PathBuf::from("history"),
        }
    }
}
