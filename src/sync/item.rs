use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// An item that can be reconciled between a local store and a remote
/// collection. Identity is the key; two items with the same key are the
/// same line and merge by quantity.
pub trait SyncItem: Clone {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
    fn quantity(&self) -> i64;
    fn set_quantity(&mut self, quantity: i64);

    /// Unit price used for total recomputation. `None` means the price is
    /// unknown and the line contributes zero.
    fn unit_price(&self) -> Option<i64>;
}

/// A cart line as held on the client. The populated product price wins over
/// the price stored on the line itself, since the product record is the
/// fresher of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCartItem {
    pub product_id: String,
    pub name: String,
    pub price: Option<i64>,
    #[serde(default)]
    pub populated_price: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl SyncItem for LocalCartItem {
    type Key = (String, Option<String>, Option<String>);

    fn key(&self) -> Self::Key {
        (self.product_id.clone(), self.size.clone(), self.color.clone())
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    fn unit_price(&self) -> Option<i64> {
        self.populated_price.or(self.price)
    }
}
