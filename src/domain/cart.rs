use crate::domain::product::{Price, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry in the cart.
///
/// `price` is a snapshot of the unit price at the last add; `total` is kept
/// equal to `price * quantity` after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
    pub total: Decimal,
}

impl LineItem {
    fn new(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
            total: product.price.value() * Decimal::from(quantity),
        }
    }

    fn recompute_total(&mut self) {
        self.total = self.price.value() * Decimal::from(self.quantity);
    }
}

/// Insertion-ordered collection of line items, unique by product id.
///
/// Removal leaves no gap; re-adding a previously removed id appends at the
/// end rather than restoring its old position. Serializes as a plain JSON
/// array of line items, which is the persisted wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Merges `quantity` of `product` into the cart.
    ///
    /// If the id is already present its quantity is incremented and its unit
    /// price overwritten with the incoming product's price (the latest price
    /// wins); otherwise a new line item is appended. Callers must pass
    /// `quantity >= 1`; this is not clamped here.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => {
                item.quantity += quantity;
                item.price = product.price;
                item.recompute_total();
            }
            None => self.items.push(LineItem::new(product, quantity)),
        }
    }

    /// Sets the quantity of the item with `id`, clamped to a minimum of 1.
    ///
    /// Unknown ids are a no-op. The stored unit price is unchanged.
    pub fn update_quantity(&mut self, id: u64, quantity: i64) {
        let quantity = quantity.clamp(1, i64::from(u32::MAX)) as u32;
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
            item.recompute_total();
        }
    }

    /// Removes the item with `id` if present. Idempotent.
    pub fn remove(&mut self, id: u64) {
        self.items.retain(|item| item.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price * quantity` across all items, recomputed fresh rather
    /// than read from the stored `total` fields.
    pub fn pre_discount_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price.value() * Decimal::from(item.quantity))
            .sum()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
