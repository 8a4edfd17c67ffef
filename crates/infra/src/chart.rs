//! In-memory chart-of-accounts registry.

use std::collections::HashMap;

use costbooks_accounting::{ChartOfAccount, ChartOfAccounts};
use costbooks_core::{LedgerError, LedgerResult};

/// Read-only code → account lookup, seeded once at construction.
///
/// Account CRUD lives outside this core; the registry is deliberately
/// immutable after seeding.
#[derive(Debug, Default)]
pub struct InMemoryChartOfAccounts {
    accounts: HashMap<String, ChartOfAccount>,
}

impl InMemoryChartOfAccounts {
    pub fn from_accounts(accounts: impl IntoIterator<Item = ChartOfAccount>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|a| (a.code.clone(), a))
                .collect(),
        }
    }

    /// Seed from a JSON array of accounts (deployment configuration).
    pub fn from_json(json: &str) -> LedgerResult<Self> {
        let accounts: Vec<ChartOfAccount> = serde_json::from_str(json)
            .map_err(|e| LedgerError::validation(format!("chart of accounts: {e}")))?;
        Ok(Self::from_accounts(accounts))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl ChartOfAccounts for InMemoryChartOfAccounts {
    fn resolve(&self, code: &str) -> Option<ChartOfAccount> {
        self.accounts.get(code).cloned()
    }

    fn accounts(&self) -> Vec<ChartOfAccount> {
        let mut accounts: Vec<_> = self.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costbooks_accounting::AccountCodes;

    #[test]
    fn resolves_seeded_codes() {
        let registry = InMemoryChartOfAccounts::from_accounts(AccountCodes::standard_chart());
        let inventory = registry.resolve("1300").unwrap();
        assert_eq!(inventory.name, "Inventory");
        assert!(registry.resolve("0000").is_none());
    }

    #[test]
    fn loads_from_json_configuration() {
        let registry = InMemoryChartOfAccounts::from_accounts(AccountCodes::standard_chart());
        let json = serde_json::to_string(&registry.accounts()).unwrap();

        let reloaded = InMemoryChartOfAccounts::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), registry.len());
        assert_eq!(
            reloaded.resolve("5000").unwrap().id,
            registry.resolve("5000").unwrap().id
        );
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        assert!(matches!(
            InMemoryChartOfAccounts::from_json("not json"),
            Err(LedgerError::Validation(_))
        ));
    }
}
