pub mod columns;
pub mod reconcile;

pub use columns::*;
pub use reconcile::{reconcile, rename_headers};
