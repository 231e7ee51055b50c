use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use finsight_core::{AppConfig, Transaction};
use finsight_import::ImportOutcome;

/// Transactions a visitor has added on top of the seed data: uploads
/// and manual entries. Held only in process memory.
#[derive(Debug, Default, Clone)]
pub struct SessionData {
    pub transactions: Vec<Transaction>,
    pub skipped_rows: usize,
}

/// Shared server state. Sessions are plain per-id buckets; every
/// request copies the relevant transactions out and hands them to the
/// core pipeline, which itself holds no state between calls.
pub struct AppState {
    pub config: AppConfig,
    seed: Vec<Transaction>,
    seed_skipped: usize,
    sessions: RwLock<HashMap<Uuid, SessionData>>,
}

impl AppState {
    pub fn new(config: AppConfig, seed: ImportOutcome) -> Self {
        AppState {
            config,
            seed: seed.transactions,
            seed_skipped: seed.skipped.len(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Seed data plus whatever the session has accumulated, and the
    /// combined skipped-row count. Unknown or absent session ids just
    /// yield the seed data.
    pub fn snapshot(&self, session: Option<Uuid>) -> (Vec<Transaction>, usize) {
        let mut transactions = self.seed.clone();
        let mut skipped = self.seed_skipped;
        if let Some(id) = session {
            let sessions = self.sessions.read().expect("session lock poisoned");
            if let Some(data) = sessions.get(&id) {
                transactions.extend(data.transactions.iter().cloned());
                skipped += data.skipped_rows;
            }
        }
        (transactions, skipped)
    }

    /// Appends to an existing session, or creates one when `session`
    /// is absent or unknown. Returns the id the caller should keep
    /// using.
    pub fn append(
        &self,
        session: Option<Uuid>,
        transactions: Vec<Transaction>,
        skipped_rows: usize,
    ) -> Uuid {
        let id = session.unwrap_or_else(Uuid::new_v4);
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let data = sessions.entry(id).or_default();
        data.transactions.extend(transactions);
        data.skipped_rows += skipped_rows;
        id
    }
}
