pub mod csv;
pub mod rules;

pub use csv::{import_csv, import_files, ImportError, ImportOutcome, SkippedRow};
pub use rules::Categorizer;
