pub mod filter;
pub mod merchant;
pub mod recurring;
pub mod render;
pub mod summary;

pub use filter::{FilterError, FilterSpec};
pub use recurring::{detect_recurring, RecurringConfig};
pub use summary::{build_summary, BudgetState, Summary, SummaryOptions};
