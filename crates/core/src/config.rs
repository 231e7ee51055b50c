use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Built-in categorization defaults. Evaluated in this order; entries
/// earlier in the table win keyword ties.
pub const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("Income", &["payroll", "direct deposit", "salary", "stripe payout", "refund"]),
    ("Rent", &["apartment", "rent", "landlord"]),
    ("Groceries", &["whole foods", "trader joe", "kroger", "walmart grocery", "aldi", "heb"]),
    ("Dining", &["starbucks", "mcdonald", "ubereats", "doordash", "grubhub", "restaurant", "bar"]),
    ("Transport", &["uber", "lyft", "shell", "exxon", "chevron", "gas", "metro", "transit"]),
    ("Utilities", &["comcast", "xfinity", "att", "verizon", "electric", "water", "gas co"]),
    ("Subscriptions", &["netflix", "spotify", "icloud", "google storage", "prime", "hulu"]),
    ("Shopping", &["amazon", "target", "walmart", "best buy", "ebay"]),
    ("Health", &["pharmacy", "cvs", "walgreens", "doctor", "dentist", "copay"]),
    ("Entertainment", &["movie", "theater", "concert", "ticketmaster"]),
    ("Travel", &["airbnb", "hotel", "delta", "united", "southwest", "booking"]),
    ("Savings", &["transfer to savings", "ally", "capital one 360"]),
    ("Fees", &["fee", "interest charge", "atm fee"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Ordered keyword rules. Order is the tie-break: when keywords from
/// several categories match one description, the earliest entry wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub entries: Vec<RuleEntry>,
}

impl RuleSet {
    pub fn defaults() -> Self {
        let entries = DEFAULT_RULES
            .iter()
            .map(|(category, keywords)| RuleEntry {
                category: category.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        RuleSet { entries }
    }

    /// User entries come first, in file order, so they take precedence
    /// over the built-ins. A user category with the same name replaces
    /// the default entry outright.
    pub fn with_overrides(user_entries: Vec<RuleEntry>) -> Self {
        let mut entries = user_entries;
        for default in RuleSet::defaults().entries {
            if !entries.iter().any(|e| e.category == default.category) {
                entries.push(default);
            }
        }
        RuleSet { entries }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub monthly_limit: Decimal,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("config {path}: {reason}")]
    Shape { path: String, reason: String },
}

/// Runtime configuration: categorization rules plus optional budgets.
///
/// JSON shape:
/// ```json
/// {
///   "rules": { "Pets": ["chewy", "petco"] },
///   "budgets": [{ "category": "Groceries", "monthly_limit": 400 }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub rules: RuleSet,
    pub budgets: Vec<Budget>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rules: RuleSet::defaults(),
            budgets: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&raw, &display)
    }

    pub fn from_json(raw: &str, path: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?;
        let Value::Object(map) = value else {
            return Err(ConfigError::Shape {
                path: path.to_string(),
                reason: "top level must be a JSON object".to_string(),
            });
        };

        let rules = match map.get("rules") {
            None => RuleSet::defaults(),
            Some(Value::Object(rules_map)) => {
                let mut entries = Vec::with_capacity(rules_map.len());
                for (category, keywords) in rules_map {
                    let Value::Array(items) = keywords else {
                        return Err(ConfigError::Shape {
                            path: path.to_string(),
                            reason: format!("rules.{category} must be an array of keywords"),
                        });
                    };
                    let mut kws = Vec::with_capacity(items.len());
                    for item in items {
                        match item.as_str() {
                            Some(s) if !s.trim().is_empty() => {
                                kws.push(s.trim().to_lowercase());
                            }
                            Some(_) => {}
                            None => {
                                return Err(ConfigError::Shape {
                                    path: path.to_string(),
                                    reason: format!("rules.{category} keywords must be strings"),
                                });
                            }
                        }
                    }
                    entries.push(RuleEntry {
                        category: category.clone(),
                        keywords: kws,
                    });
                }
                RuleSet::with_overrides(entries)
            }
            Some(_) => {
                return Err(ConfigError::Shape {
                    path: path.to_string(),
                    reason: "rules must be an object of category -> keyword list".to_string(),
                });
            }
        };

        let budgets = match map.get("budgets") {
            None => Vec::new(),
            Some(value) => {
                serde_json::from_value::<Vec<Budget>>(value.clone()).map_err(|e| {
                    ConfigError::Shape {
                        path: path.to_string(),
                        reason: format!("budgets must be a list of {{category, monthly_limit}}: {e}"),
                    }
                })?
            }
        };

        Ok(AppConfig { rules, budgets })
    }
}
