//! Movement orchestration: one unit of work per business event.
//!
//! Every stock movement must (a) run the costing engine and (b) post the
//! matching journal from the engine's returned amounts, so the value in the
//! inventory ledger and the value in the books never diverge. The service
//! sequences each movement as: resolve the movement's account codes →
//! append the ledger entry → post the journal. Code resolution happens
//! before the append, and the service only builds mirrored two-leg drafts,
//! so the journal step cannot fail deterministically once the ledger entry
//! is committed: the append is the single point of no return. A SQL-backed
//! deployment wraps the same seam in one database transaction.

use chrono::Utc;

use costbooks_accounting::{AccountCodes, ChartOfAccounts, DraftLine, Journal, JournalDraft};
use costbooks_core::{
    DocRef, ItemId, LedgerError, LedgerResult, Money, Qty, RefId, RefType, UserId, WarehouseId,
};
use costbooks_inventory::{CostedMovement, CostingMethod, CostingPolicy, Item, ItemType, StockKey};

use crate::engine::CostingEngine;
use crate::journal_store::JournalStore;
use crate::ledger_store::ValuedLedgerStore;
use crate::poster::JournalPoster;

/// Result of one orchestrated movement.
///
/// `journal` is `None` for movements that book no value (zero-cost receipts,
/// opening balances, and transfers between warehouses that share an
/// inventory account).
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    pub costed: CostedMovement,
    pub journal: Option<Journal>,
}

/// Caller-side orchestration of the costing engine and the journal poster.
#[derive(Debug)]
pub struct MovementService<S, C, J> {
    engine: CostingEngine<S>,
    poster: JournalPoster<C, J>,
    codes: AccountCodes,
    policy: CostingPolicy,
}

impl<S, C, J> MovementService<S, C, J> {
    pub fn new(
        engine: CostingEngine<S>,
        poster: JournalPoster<C, J>,
        codes: AccountCodes,
        policy: CostingPolicy,
    ) -> Self {
        Self {
            engine,
            poster,
            codes,
            policy,
        }
    }

    pub fn engine(&self) -> &CostingEngine<S> {
        &self.engine
    }

    pub fn poster(&self) -> &JournalPoster<C, J> {
        &self.poster
    }
}

impl<S, C, J> MovementService<S, C, J>
where
    S: ValuedLedgerStore,
    C: ChartOfAccounts,
    J: JournalStore,
{
    /// Opening stock: a receive with no journal (the opening trial balance
    /// is entered separately by the accountant).
    pub fn opening_balance(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        unit_cost: Money,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::OpeningBalance, ref_id);
        let costed = self.engine.receive_inventory(
            self.key(item.id, warehouse_id),
            qty,
            unit_cost,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        Ok(MovementOutcome {
            costed,
            journal: None,
        })
    }

    /// Purchase receipt: Inventory↑ / Accounts Payable↑.
    pub fn purchase_receipt(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        unit_cost: Money,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::Purchase, ref_id);
        let stock = self.stock_account(item).to_string();
        let payable = self.codes.accounts_payable.clone();
        self.ensure_accounts(&[&stock, &payable])?;

        let costed = self.engine.receive_inventory(
            self.key(item.id, warehouse_id),
            qty,
            unit_cost,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        let journal = self.post_two_leg(
            &stock,
            &payable,
            costed.value,
            format!("Purchase receipt: {}", item.name),
            reference,
            user_id,
        )?;

        Ok(MovementOutcome { costed, journal })
    }

    /// Production material issue: WIP↑ / Inventory↓.
    pub fn production_issue(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::Production, ref_id);
        let stock = self.stock_account(item).to_string();
        let wip = self.codes.work_in_progress.clone();
        self.ensure_accounts(&[&wip, &stock])?;

        let costed = self.engine.issue_inventory(
            self.key(item.id, warehouse_id),
            qty,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        let journal = self.post_two_leg(
            &wip,
            &stock,
            costed.value,
            format!("Material issue: {}", item.name),
            reference,
            user_id,
        )?;

        Ok(MovementOutcome { costed, journal })
    }

    /// Finished-goods receipt at accumulated production cost:
    /// Finished Goods↑ / WIP↓. The unit cost is `wip_value / qty`, carried
    /// as a total so the WIP account drains by exactly what the ledger
    /// gains.
    pub fn production_receipt(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        wip_value: Money,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::Production, ref_id);
        let stock = self.stock_account(item).to_string();
        let wip = self.codes.work_in_progress.clone();
        self.ensure_accounts(&[&stock, &wip])?;

        let costed = self.engine.receive_inventory_at_value(
            self.key(item.id, warehouse_id),
            qty,
            wip_value,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        let journal = self.post_two_leg(
            &stock,
            &wip,
            costed.value,
            format!("Finished goods receipt: {}", item.name),
            reference,
            user_id,
        )?;

        Ok(MovementOutcome { costed, journal })
    }

    /// Sale delivery: COGS↑ / Inventory↓, charged at the costed value of the
    /// delivered quantity.
    pub fn sale_delivery(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::Sale, ref_id);
        let stock = self.stock_account(item).to_string();
        let cogs = self.codes.cost_of_sales.clone();
        self.ensure_accounts(&[&cogs, &stock])?;

        let costed = self.engine.issue_inventory(
            self.key(item.id, warehouse_id),
            qty,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        let journal = self.post_two_leg(
            &cogs,
            &stock,
            costed.value,
            format!("Cost of sales: {}", item.name),
            reference,
            user_id,
        )?;

        Ok(MovementOutcome { costed, journal })
    }

    /// Write-on adjustment: Inventory↑ / Adjustment↓ (credit).
    pub fn adjustment_in(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        unit_cost: Money,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::Adjustment, ref_id);
        let stock = self.stock_account(item).to_string();
        let adjustment = self.codes.inventory_adjustment.clone();
        self.ensure_accounts(&[&stock, &adjustment])?;

        let costed = self.engine.receive_inventory(
            self.key(item.id, warehouse_id),
            qty,
            unit_cost,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        let journal = self.post_two_leg(
            &stock,
            &adjustment,
            costed.value,
            format!("Stock adjustment (in): {}", item.name),
            reference,
            user_id,
        )?;

        Ok(MovementOutcome { costed, journal })
    }

    /// Write-off adjustment: Adjustment↑ (debit) / Inventory↓.
    pub fn adjustment_out(
        &self,
        item: &Item,
        warehouse_id: WarehouseId,
        qty: Qty,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        let reference = DocRef::new(RefType::Adjustment, ref_id);
        let stock = self.stock_account(item).to_string();
        let adjustment = self.codes.inventory_adjustment.clone();
        self.ensure_accounts(&[&adjustment, &stock])?;

        let costed = self.engine.issue_inventory(
            self.key(item.id, warehouse_id),
            qty,
            self.policy.method_for(item),
            reference,
            user_id,
        )?;
        let journal = self.post_two_leg(
            &adjustment,
            &stock,
            costed.value,
            format!("Stock adjustment (out): {}", item.name),
            reference,
            user_id,
        )?;

        Ok(MovementOutcome { costed, journal })
    }

    /// Warehouse transfer: issue at the source, receive at the destination,
    /// one shared reference id.
    ///
    /// Under FIFO the destination mirrors the consumed lots, preserving lot
    /// identity and cost; under weighted average it receives the issued value
    /// verbatim. Either way the value entering the destination equals the
    /// value leaving the source, and with both warehouses mapping to the same
    /// inventory account there is no account-level value movement to journal.
    pub fn transfer(
        &self,
        item: &Item,
        from_warehouse: WarehouseId,
        to_warehouse: WarehouseId,
        qty: Qty,
        ref_id: RefId,
        user_id: UserId,
    ) -> LedgerResult<MovementOutcome> {
        if from_warehouse == to_warehouse {
            return Err(LedgerError::validation(
                "transfer source and destination must differ",
            ));
        }

        let method = self.policy.method_for(item);
        let reference = DocRef::new(RefType::Transfer, ref_id);
        let source = self.key(item.id, from_warehouse);
        let destination = self.key(item.id, to_warehouse);

        let issued = self
            .engine
            .issue_inventory_detailed(source, qty, method, reference, user_id)?;

        match method {
            CostingMethod::Fifo => {
                for lot in &issued.consumed {
                    self.engine.receive_inventory(
                        destination,
                        lot.qty,
                        lot.unit_cost,
                        method,
                        reference,
                        user_id,
                    )?;
                }
            }
            CostingMethod::WeightedAverage => {
                self.engine.receive_inventory_at_value(
                    destination,
                    qty,
                    issued.entry.value,
                    method,
                    reference,
                    user_id,
                )?;
            }
        }

        Ok(MovementOutcome {
            costed: CostedMovement {
                unit_cost: issued.entry.unit_cost,
                value: issued.entry.value,
            },
            journal: None,
        })
    }

    fn key(&self, item_id: ItemId, warehouse_id: WarehouseId) -> StockKey {
        StockKey::new(item_id, warehouse_id)
    }

    /// The inventory account a given item's stock value sits on.
    fn stock_account<'a>(&'a self, item: &Item) -> &'a str {
        match item.item_type {
            ItemType::FinishedGood => &self.codes.finished_goods,
            ItemType::WorkInProgress => &self.codes.work_in_progress,
            ItemType::RawMaterial | ItemType::Consumable => &self.codes.inventory,
        }
    }

    /// Pre-flight: every account code this movement will post against must
    /// resolve *before* the ledger append commits.
    fn ensure_accounts(&self, codes: &[&str]) -> LedgerResult<()> {
        for code in codes {
            if !self.poster.resolves(code) {
                return Err(LedgerError::unknown_account(*code));
            }
        }
        Ok(())
    }

    fn post_two_leg(
        &self,
        debit_code: &str,
        credit_code: &str,
        amount: Money,
        memo: String,
        reference: DocRef,
        user_id: UserId,
    ) -> LedgerResult<Option<Journal>> {
        if amount.is_zero() {
            // No value moved, nothing to book.
            return Ok(None);
        }

        let journal = self.poster.post_journal(JournalDraft {
            date: Utc::now(),
            memo,
            posted_by: user_id,
            lines: vec![
                DraftLine::debit(debit_code, amount, reference),
                DraftLine::credit(credit_code, amount, reference),
            ],
        })?;

        Ok(Some(journal))
    }
}
