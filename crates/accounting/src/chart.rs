//! Chart of accounts: stable external codes, internal ids, and the
//! classification buckets financial reports group by.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use costbooks_core::AccountId;

/// Report classification bucket (determines normal balance side).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    CurrentAssets,
    NonCurrentAssets,
    TradeReceivables,
    CurrentLiability,
    NonCurrentLiability,
    TradePayables,
    Equity,
    Income,
    OtherIncome,
    CostOfSales,
    Expenses,
}

impl AccountType {
    /// Whether a debit increases this account's reported balance.
    pub fn is_debit_normal(&self) -> bool {
        matches!(
            self,
            AccountType::CurrentAssets
                | AccountType::NonCurrentAssets
                | AccountType::TradeReceivables
                | AccountType::CostOfSales
                | AccountType::Expenses
        )
    }
}

/// Account identity + metadata. The `code` is the stable external key
/// callers reference; `id` is internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOfAccount {
    pub id: AccountId,
    pub code: String, // e.g. "1300"
    pub name: String, // e.g. "Inventory"
    pub account_type: AccountType,
}

impl ChartOfAccount {
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            account_type,
        }
    }
}

/// Read-only lookup from account code to account.
///
/// The registry is a leaf dependency of the journal poster; account CRUD is
/// outside this core, so there is no write surface here.
pub trait ChartOfAccounts: Send + Sync {
    fn resolve(&self, code: &str) -> Option<ChartOfAccount>;

    /// All accounts, for report classification.
    fn accounts(&self) -> Vec<ChartOfAccount>;
}

impl<S> ChartOfAccounts for Arc<S>
where
    S: ChartOfAccounts + ?Sized,
{
    fn resolve(&self, code: &str) -> Option<ChartOfAccount> {
        (**self).resolve(code)
    }

    fn accounts(&self) -> Vec<ChartOfAccount> {
        (**self).accounts()
    }
}

/// The fixed account-code contract callers post against.
///
/// These are external configuration: the engine never hard-codes them, and a
/// deployment maps each role to whatever code its chart uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCodes {
    pub inventory: String,
    pub work_in_progress: String,
    pub finished_goods: String,
    pub accounts_payable: String,
    pub accounts_receivable: String,
    pub cash: String,
    pub cost_of_sales: String,
    pub inventory_adjustment: String,
    pub depreciation_expense: String,
    pub accumulated_depreciation: String,
    pub disposal_gain_loss: String,
}

impl AccountCodes {
    /// The conventional numbering used by the seeded chart.
    pub fn standard() -> Self {
        Self {
            inventory: "1300".to_string(),
            work_in_progress: "1310".to_string(),
            finished_goods: "1320".to_string(),
            accounts_payable: "2100".to_string(),
            accounts_receivable: "1100".to_string(),
            cash: "1000".to_string(),
            cost_of_sales: "5000".to_string(),
            inventory_adjustment: "5100".to_string(),
            depreciation_expense: "6100".to_string(),
            accumulated_depreciation: "1590".to_string(),
            disposal_gain_loss: "4900".to_string(),
        }
    }

    /// Accounts matching [`AccountCodes::standard`], for seeding a registry.
    pub fn standard_chart() -> Vec<ChartOfAccount> {
        vec![
            ChartOfAccount::new("1000", "Cash", AccountType::CurrentAssets),
            ChartOfAccount::new("1100", "Accounts Receivable", AccountType::TradeReceivables),
            ChartOfAccount::new("1300", "Inventory", AccountType::CurrentAssets),
            ChartOfAccount::new("1310", "Work in Progress", AccountType::CurrentAssets),
            ChartOfAccount::new("1320", "Finished Goods", AccountType::CurrentAssets),
            ChartOfAccount::new("1590", "Accumulated Depreciation", AccountType::NonCurrentAssets),
            ChartOfAccount::new("2100", "Accounts Payable", AccountType::TradePayables),
            ChartOfAccount::new("4900", "Gain/Loss on Disposal", AccountType::OtherIncome),
            ChartOfAccount::new("5000", "Cost of Sales", AccountType::CostOfSales),
            ChartOfAccount::new("5100", "Inventory Adjustment", AccountType::CostOfSales),
            ChartOfAccount::new("6100", "Depreciation Expense", AccountType::Expenses),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_balance_sides() {
        assert!(AccountType::CurrentAssets.is_debit_normal());
        assert!(AccountType::CostOfSales.is_debit_normal());
        assert!(!AccountType::TradePayables.is_debit_normal());
        assert!(!AccountType::Income.is_debit_normal());
    }

    #[test]
    fn standard_chart_covers_the_account_code_contract() {
        let codes = AccountCodes::standard();
        let chart = AccountCodes::standard_chart();
        let find = |code: &str| chart.iter().find(|a| a.code == code);

        for code in [
            &codes.inventory,
            &codes.work_in_progress,
            &codes.finished_goods,
            &codes.accounts_payable,
            &codes.accounts_receivable,
            &codes.cash,
            &codes.cost_of_sales,
            &codes.inventory_adjustment,
            &codes.depreciation_expense,
            &codes.accumulated_depreciation,
            &codes.disposal_gain_loss,
        ] {
            assert!(find(code).is_some(), "missing account for code {code}");
        }
    }

    #[test]
    fn account_codes_load_from_configuration() {
        let json = r#"{
            "inventory": "130000",
            "work_in_progress": "131000",
            "finished_goods": "132000",
            "accounts_payable": "210000",
            "accounts_receivable": "110000",
            "cash": "100000",
            "cost_of_sales": "500000",
            "inventory_adjustment": "510000",
            "depreciation_expense": "610000",
            "accumulated_depreciation": "159000",
            "disposal_gain_loss": "490000"
        }"#;
        let codes: AccountCodes = serde_json::from_str(json).unwrap();
        assert_eq!(codes.inventory, "130000");
    }
}
