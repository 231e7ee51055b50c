pub mod config;
pub mod money;
pub mod period;
pub mod text;
pub mod transaction;

pub use config::{AppConfig, Budget, ConfigError, RuleSet};
pub use money::Money;
pub use period::{month_key, window_start, DateRange};
pub use transaction::{Transaction, UNCATEGORIZED};
