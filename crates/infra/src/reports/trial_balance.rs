//! Trial balance: per-account debit/credit sums over a date range.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use costbooks_accounting::{ChartOfAccount, ChartOfAccounts};
use costbooks_core::{AccountId, LedgerError, LedgerResult, Money};

use crate::journal_store::JournalStore;

/// One trial-balance row: an account with its movement totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialBalanceRow {
    pub account: ChartOfAccount,
    pub debit: Money,
    pub credit: Money,
}

impl TrialBalanceRow {
    /// Balance on the account's normal side (debit-positive for
    /// debit-normal accounts).
    pub fn normal_balance(&self) -> Money {
        if self.account.account_type.is_debit_normal() {
            self.debit - self.credit
        } else {
            self.credit - self.debit
        }
    }
}

/// The trial balance over a date range, rows ordered by account code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub debit_total: Money,
    pub credit_total: Money,
}

impl TrialBalance {
    /// A trial balance built from balanced journals must itself balance;
    /// anything else means a journal bypassed validation.
    pub fn is_balanced(&self) -> bool {
        self.debit_total == self.credit_total
    }
}

/// Builds trial balances from the journal store.
#[derive(Debug)]
pub struct TrialBalanceReport<J, C> {
    journals: J,
    chart: C,
}

impl<J, C> TrialBalanceReport<J, C> {
    pub fn new(journals: J, chart: C) -> Self {
        Self { journals, chart }
    }
}

impl<J, C> TrialBalanceReport<J, C>
where
    J: JournalStore,
    C: ChartOfAccounts,
{
    pub fn build(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<TrialBalance> {
        let journals = self.journals.in_range(from, to)?;

        let accounts: HashMap<AccountId, ChartOfAccount> = self
            .chart
            .accounts()
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut sums: HashMap<AccountId, (Money, Money)> = HashMap::new();
        for journal in &journals {
            for line in &journal.lines {
                let slot = sums
                    .entry(line.account_id)
                    .or_insert((Money::ZERO, Money::ZERO));
                slot.0 += line.debit;
                slot.1 += line.credit;
            }
        }

        let mut rows = Vec::with_capacity(sums.len());
        let mut debit_total = Money::ZERO;
        let mut credit_total = Money::ZERO;

        for (account_id, (debit, credit)) in sums {
            let account = accounts.get(&account_id).cloned().ok_or_else(|| {
                LedgerError::validation("journal references an account missing from the chart")
            })?;
            debit_total += debit;
            credit_total += credit;
            rows.push(TrialBalanceRow {
                account,
                debit,
                credit,
            });
        }
        rows.sort_by(|a, b| a.account.code.cmp(&b.account.code));

        Ok(TrialBalance {
            rows,
            debit_total,
            credit_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::InMemoryChartOfAccounts;
    use crate::journal_store::InMemoryJournalStore;
    use crate::poster::JournalPoster;
    use chrono::Duration;
    use costbooks_accounting::{AccountCodes, AccountType, DraftLine, JournalDraft};
    use costbooks_core::{DocRef, RefId, RefType, UserId};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup() -> (
        JournalPoster<Arc<InMemoryChartOfAccounts>, Arc<InMemoryJournalStore>>,
        TrialBalanceReport<Arc<InMemoryJournalStore>, Arc<InMemoryChartOfAccounts>>,
    ) {
        let chart = Arc::new(InMemoryChartOfAccounts::from_accounts(
            AccountCodes::standard_chart(),
        ));
        let store = Arc::new(InMemoryJournalStore::new());
        (
            JournalPoster::new(chart.clone(), store.clone()),
            TrialBalanceReport::new(store, chart),
        )
    }

    fn post(
        poster: &JournalPoster<Arc<InMemoryChartOfAccounts>, Arc<InMemoryJournalStore>>,
        date: DateTime<Utc>,
        debit_code: &str,
        credit_code: &str,
        amount: Money,
    ) {
        let reference = DocRef::new(RefType::Purchase, RefId::new());
        poster
            .post_journal(JournalDraft {
                date,
                memo: String::new(),
                posted_by: UserId::new(),
                lines: vec![
                    DraftLine::debit(debit_code, amount, reference),
                    DraftLine::credit(credit_code, amount, reference),
                ],
            })
            .unwrap();
    }

    #[test]
    fn trial_balance_sums_and_classifies_accounts() {
        let (poster, report) = setup();
        let now = Utc::now();

        post(&poster, now, "1300", "2100", Money::new(dec!(1000)));
        post(&poster, now, "5000", "1300", Money::new(dec!(400)));

        let tb = report.build(None, None).unwrap();
        assert!(tb.is_balanced());
        assert_eq!(tb.debit_total, Money::new(dec!(1400)));

        let inventory = tb.rows.iter().find(|r| r.account.code == "1300").unwrap();
        assert_eq!(inventory.debit, Money::new(dec!(1000)));
        assert_eq!(inventory.credit, Money::new(dec!(400)));
        assert_eq!(inventory.account.account_type, AccountType::CurrentAssets);
        assert_eq!(inventory.normal_balance(), Money::new(dec!(600)));

        let payable = tb.rows.iter().find(|r| r.account.code == "2100").unwrap();
        assert_eq!(payable.normal_balance(), Money::new(dec!(1000)));
    }

    #[test]
    fn date_range_limits_the_sums() {
        let (poster, report) = setup();
        let now = Utc::now();

        post(&poster, now - Duration::days(40), "1300", "2100", Money::new(dec!(100)));
        post(&poster, now, "1300", "2100", Money::new(dec!(50)));

        let tb = report
            .build(Some(now - Duration::days(7)), None)
            .unwrap();
        assert_eq!(tb.debit_total, Money::new(dec!(50)));
        assert!(tb.is_balanced());
    }
}
