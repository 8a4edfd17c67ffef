//! Items, warehouses, and costing policy.

use serde::{Deserialize, Serialize};

use costbooks_core::{Entity, ItemId, WarehouseId};

/// How issues from stock are costed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostingMethod {
    /// Unit cost recalculated as total value ÷ total quantity after every
    /// receipt; issues are costed at the current average.
    WeightedAverage,
    /// Issues consume the oldest unconsumed receipt lots first.
    Fifo,
}

/// Stock classification used by purchasing/production flows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    RawMaterial,
    WorkInProgress,
    FinishedGood,
    Consumable,
}

/// A stock-keeping unit. Identity is immutable; the costing method may be a
/// per-item override of the system default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Unit of measure code (e.g. "EA", "KG").
    pub uom: String,
    pub item_type: ItemType,
    /// Per-item costing override; `None` falls back to the policy default.
    pub costing_method: Option<CostingMethod>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The unit of running-balance tracking: one ledger stream per key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub item_id: ItemId,
    pub warehouse_id: WarehouseId,
}

impl StockKey {
    pub fn new(item_id: ItemId, warehouse_id: WarehouseId) -> Self {
        Self {
            item_id,
            warehouse_id,
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.item_id, self.warehouse_id)
    }
}

/// Explicit costing policy, resolved at call time.
///
/// Passed into the engine on every movement so a calculation can never pick
/// up a different method from ambient settings mid-flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostingPolicy {
    pub default_method: CostingMethod,
}

impl CostingPolicy {
    pub fn new(default_method: CostingMethod) -> Self {
        Self { default_method }
    }

    /// Resolve the effective method for an item (override wins).
    pub fn method_for(&self, item: &Item) -> CostingMethod {
        item.costing_method.unwrap_or(self.default_method)
    }
}

impl Default for CostingPolicy {
    fn default() -> Self {
        Self::new(CostingMethod::WeightedAverage)
    }
}
