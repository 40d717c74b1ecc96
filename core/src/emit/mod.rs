//! Output emitters (§6): SQL `INSERT` stream, per-table CSV, per-table JSON.

pub mod csv;
pub mod json;
pub mod sql;
