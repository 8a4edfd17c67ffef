//! Journals: balanced multi-line double-entry records.
//!
//! A draft arrives with account *codes* and leaves, validated, with resolved
//! account ids. Posted journals are immutable; corrections are new journals
//! with swapped debit/credit legs, composed by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use costbooks_core::{AccountId, DocRef, JournalId, LedgerError, LedgerResult, Money, UserId};

use crate::chart::ChartOfAccounts;

/// One leg of a journal. Exactly one of debit/credit is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_id: AccountId,
    pub debit: Money,
    pub credit: Money,
    pub reference: DocRef,
}

/// A posted journal with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    /// Sequential position in the books, allocated at persist time.
    pub journal_no: u64,
    pub date: DateTime<Utc>,
    pub memo: String,
    pub posted_by: UserId,
    pub lines: Vec<JournalLine>,
}

impl Journal {
    /// Human-readable journal number, e.g. `JRN-000042`.
    pub fn journal_no_string(&self) -> String {
        format!("JRN-{:06}", self.journal_no)
    }

    pub fn debit_total(&self) -> Money {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn credit_total(&self) -> Money {
        self.lines.iter().map(|l| l.credit).sum()
    }
}

/// An unvalidated journal line as supplied by a caller: account referenced by
/// its stable code, amounts already split into debit/credit legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    pub account_code: String,
    pub debit: Money,
    pub credit: Money,
    pub reference: DocRef,
}

impl DraftLine {
    pub fn debit(account_code: impl Into<String>, amount: Money, reference: DocRef) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Money::ZERO,
            reference,
        }
    }

    pub fn credit(account_code: impl Into<String>, amount: Money, reference: DocRef) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Money::ZERO,
            credit: amount,
            reference,
        }
    }
}

/// A journal awaiting validation and posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDraft {
    pub date: DateTime<Utc>,
    pub memo: String,
    pub posted_by: UserId,
    pub lines: Vec<DraftLine>,
}

impl JournalDraft {
    /// Validate the draft and resolve account codes into ids.
    ///
    /// Checks, in order: the draft has lines; every line carries exactly one
    /// non-negative side; every code resolves; debit and credit totals are
    /// exactly equal (decimal comparison, no tolerance). Nothing is persisted
    /// here; a failed draft leaves no trace by construction.
    pub fn resolve(&self, chart: &impl ChartOfAccounts) -> LedgerResult<Vec<JournalLine>> {
        if self.lines.is_empty() {
            return Err(LedgerError::validation("journal must have lines"));
        }

        let mut resolved = Vec::with_capacity(self.lines.len());
        let mut debits = Money::ZERO;
        let mut credits = Money::ZERO;

        for line in &self.lines {
            if line.debit.is_negative() || line.credit.is_negative() {
                return Err(LedgerError::validation("journal amounts must not be negative"));
            }
            match (line.debit.is_zero(), line.credit.is_zero()) {
                (true, true) => {
                    return Err(LedgerError::validation(
                        "journal line must debit or credit an account",
                    ));
                }
                (false, false) => {
                    return Err(LedgerError::validation(
                        "journal line cannot debit and credit at once",
                    ));
                }
                _ => {}
            }

            let account = chart
                .resolve(&line.account_code)
                .ok_or_else(|| LedgerError::unknown_account(line.account_code.clone()))?;

            debits += line.debit;
            credits += line.credit;
            resolved.push(JournalLine {
                account_id: account.id,
                debit: line.debit,
                credit: line.credit,
                reference: line.reference,
            });
        }

        if debits != credits {
            return Err(LedgerError::unbalanced(debits, credits));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountType, ChartOfAccount};
    use costbooks_core::{RefId, RefType};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct TestChart(HashMap<String, ChartOfAccount>);

    impl TestChart {
        fn with(codes: &[(&str, AccountType)]) -> Self {
            Self(
                codes
                    .iter()
                    .map(|(code, account_type)| {
                        (
                            code.to_string(),
                            ChartOfAccount::new(*code, *code, *account_type),
                        )
                    })
                    .collect(),
            )
        }
    }

    impl ChartOfAccounts for TestChart {
        fn resolve(&self, code: &str) -> Option<ChartOfAccount> {
            self.0.get(code).cloned()
        }

        fn accounts(&self) -> Vec<ChartOfAccount> {
            self.0.values().cloned().collect()
        }
    }

    fn test_ref() -> DocRef {
        DocRef::new(RefType::Purchase, RefId::new())
    }

    fn draft(lines: Vec<DraftLine>) -> JournalDraft {
        JournalDraft {
            date: Utc::now(),
            memo: "Test entry".to_string(),
            posted_by: UserId::new(),
            lines,
        }
    }

    #[test]
    fn balanced_draft_resolves_account_ids() {
        let chart = TestChart::with(&[
            ("1300", AccountType::CurrentAssets),
            ("2100", AccountType::TradePayables),
        ]);
        let reference = test_ref();

        let lines = draft(vec![
            DraftLine::debit("1300", Money::new(dec!(500)), reference),
            DraftLine::credit("2100", Money::new(dec!(500)), reference),
        ])
        .resolve(&chart)
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].account_id, chart.resolve("1300").unwrap().id);
        assert_eq!(lines[0].debit, Money::new(dec!(500)));
        assert_eq!(lines[1].credit, Money::new(dec!(500)));
    }

    #[test]
    fn unbalanced_draft_is_rejected() {
        let chart = TestChart::with(&[
            ("1300", AccountType::CurrentAssets),
            ("2100", AccountType::TradePayables),
        ]);

        let err = draft(vec![
            DraftLine::debit("1300", Money::new(dec!(900)), test_ref()),
            DraftLine::credit("2100", Money::new(dec!(1000)), test_ref()),
        ])
        .resolve(&chart)
        .unwrap_err();

        assert_eq!(
            err,
            LedgerError::unbalanced(Money::new(dec!(900)), Money::new(dec!(1000)))
        );
    }

    #[test]
    fn unknown_account_code_is_rejected() {
        let chart = TestChart::with(&[("1300", AccountType::CurrentAssets)]);

        let err = draft(vec![
            DraftLine::debit("1300", Money::new(dec!(100)), test_ref()),
            DraftLine::credit("9999", Money::new(dec!(100)), test_ref()),
        ])
        .resolve(&chart)
        .unwrap_err();

        assert_eq!(err, LedgerError::unknown_account("9999"));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let chart = TestChart::with(&[("1300", AccountType::CurrentAssets)]);
        let reference = test_ref();

        // Both sides set.
        let both = draft(vec![DraftLine {
            account_code: "1300".to_string(),
            debit: Money::new(dec!(10)),
            credit: Money::new(dec!(10)),
            reference,
        }]);
        assert!(matches!(
            both.resolve(&chart),
            Err(LedgerError::Validation(_))
        ));

        // Neither side set.
        let neither = draft(vec![DraftLine {
            account_code: "1300".to_string(),
            debit: Money::ZERO,
            credit: Money::ZERO,
            reference,
        }]);
        assert!(matches!(
            neither.resolve(&chart),
            Err(LedgerError::Validation(_))
        ));

        // Negative amount.
        let negative = draft(vec![DraftLine::debit(
            "1300",
            Money::new(dec!(-5)),
            reference,
        )]);
        assert!(matches!(
            negative.resolve(&chart),
            Err(LedgerError::Validation(_))
        ));

        // No lines at all.
        assert!(matches!(
            draft(vec![]).resolve(&chart),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn journal_number_formats_for_humans() {
        let journal = Journal {
            id: JournalId::new(),
            journal_no: 42,
            date: Utc::now(),
            memo: String::new(),
            posted_by: UserId::new(),
            lines: vec![],
        };
        assert_eq!(journal.journal_no_string(), "JRN-000042");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a draft built from any set of positive amounts, mirrored
        /// onto a debit and a credit leg, always resolves, and the resolved
        /// lines always sum to equal totals.
        #[test]
        fn mirrored_drafts_always_balance(
            amounts in prop::collection::vec(1i64..1_000_000i64, 1..10)
        ) {
            let chart = TestChart::with(&[
                ("1300", AccountType::CurrentAssets),
                ("2100", AccountType::TradePayables),
            ]);

            let mut lines = Vec::new();
            for cents in amounts {
                let amount = Money::new(Decimal::new(cents, 2));
                let reference = test_ref();
                lines.push(DraftLine::debit("1300", amount, reference));
                lines.push(DraftLine::credit("2100", amount, reference));
            }

            let resolved = draft(lines).resolve(&chart).unwrap();
            let debits: Money = resolved.iter().map(|l| l.debit).sum();
            let credits: Money = resolved.iter().map(|l| l.credit).sum();
            prop_assert_eq!(debits, credits);
        }
    }
}
