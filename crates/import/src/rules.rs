use finsight_core::text::normalize;
use finsight_core::{RuleSet, Transaction, UNCATEGORIZED};

/// Keyword categorizer. Flattens an ordered rule set into a lookup
/// table at construction; categorization itself is a pure function of
/// (transactions, rules).
pub struct Categorizer {
    /// (normalized keyword, category), in rule-set order. The first
    /// occurrence of a keyword wins, so earlier categories take
    /// precedence on ties.
    table: Vec<(String, String)>,
}

impl Categorizer {
    pub fn new(rules: &RuleSet) -> Self {
        let mut table: Vec<(String, String)> = Vec::new();
        for entry in &rules.entries {
            for keyword in &entry.keywords {
                let kw = normalize(keyword);
                if kw.is_empty() || table.iter().any(|(existing, _)| *existing == kw) {
                    continue;
                }
                table.push((kw, entry.category.clone()));
            }
        }
        Categorizer { table }
    }

    /// First category whose keyword is a substring of the normalized
    /// description.
    pub fn match_category(&self, description: &str) -> Option<&str> {
        let norm = normalize(description);
        self.table
            .iter()
            .find(|(kw, _)| norm.contains(kw.as_str()))
            .map(|(_, cat)| cat.as_str())
    }

    /// Fills in the category of every transaction that lacks one.
    /// Existing non-blank categories are left alone, so running this
    /// twice changes nothing. Unmatched income falls back to `Income`;
    /// everything else unmatched becomes `Uncategorized`.
    pub fn categorize(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions
            .into_iter()
            .map(|mut tx| {
                if !tx.is_categorized() {
                    let category = match self.match_category(&tx.description) {
                        Some(cat) => cat,
                        None if tx.amount.is_income() => "Income",
                        None => UNCATEGORIZED,
                    };
                    tx.category = Some(category.to_string());
                }
                tx
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finsight_core::config::RuleEntry;
    use finsight_core::Money;

    fn tx(desc: &str, cents: i64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            desc,
            Money::from_cents(cents),
            "checking",
        )
    }

    fn rules(entries: &[(&str, &[&str])]) -> RuleSet {
        RuleSet {
            entries: entries
                .iter()
                .map(|(category, keywords)| RuleEntry {
                    category: category.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let categorizer = Categorizer::new(&rules(&[("Pets", &["chewy"])]));
        let out = categorizer.categorize(vec![tx("Chewy Pet Store", -4210)]);
        assert_eq!(out[0].category.as_deref(), Some("Pets"));
    }

    #[test]
    fn punctuation_in_description_does_not_block_match() {
        let categorizer = Categorizer::new(&rules(&[("Subscriptions", &["netflix"])]));
        let out = categorizer.categorize(vec![tx("NETFLIX.COM*123", -1599)]);
        assert_eq!(out[0].category.as_deref(), Some("Subscriptions"));
    }

    #[test]
    fn first_matching_category_wins() {
        let categorizer = Categorizer::new(&rules(&[
            ("Shopping", &["amazon"]),
            ("Subscriptions", &["amazon prime"]),
        ]));
        let out = categorizer.categorize(vec![tx("AMAZON PRIME", -1499)]);
        assert_eq!(out[0].category.as_deref(), Some("Shopping"));
    }

    #[test]
    fn duplicate_keyword_keeps_first_category() {
        let categorizer = Categorizer::new(&rules(&[
            ("Dining", &["uber eats"]),
            ("Transport", &["uber eats"]),
        ]));
        assert_eq!(categorizer.match_category("UBER EATS ORDER"), Some("Dining"));
    }

    #[test]
    fn existing_categories_are_untouched() {
        let categorizer = Categorizer::new(&rules(&[("Shopping", &["amazon"])]));
        let pre = tx("AMAZON", -999).with_category("Gifts");
        let out = categorizer.categorize(vec![pre]);
        assert_eq!(out[0].category.as_deref(), Some("Gifts"));
    }

    #[test]
    fn categorize_is_idempotent() {
        let categorizer = Categorizer::new(&rules(&[("Pets", &["chewy"])]));
        let once = categorizer.categorize(vec![tx("CHEWY", -4210), tx("MYSTERY", -100)]);
        let twice = categorizer.categorize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn unmatched_income_gets_income_category() {
        let categorizer = Categorizer::new(&rules(&[("Pets", &["chewy"])]));
        let out = categorizer.categorize(vec![tx("ACME CORP PAYMENT", 250000)]);
        assert_eq!(out[0].category.as_deref(), Some("Income"));
    }

    #[test]
    fn unmatched_expense_is_uncategorized() {
        let categorizer = Categorizer::new(&rules(&[("Pets", &["chewy"])]));
        let out = categorizer.categorize(vec![tx("MYSTERY STORE", -100)]);
        assert_eq!(out[0].category.as_deref(), Some(UNCATEGORIZED));
    }

    #[test]
    fn default_rules_cover_common_merchants() {
        let categorizer = Categorizer::new(&RuleSet::defaults());
        assert_eq!(categorizer.match_category("STARBUCKS #1234"), Some("Dining"));
        assert_eq!(categorizer.match_category("NETFLIX.COM"), Some("Subscriptions"));
        assert_eq!(categorizer.match_category("Whole Foods Market"), Some("Groceries"));
    }
}
