//! Shopping cart kept in client storage.
//!
//! Storage failures never reach the caller: they are logged and the cart
//! behaves as if it were empty.

use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageError};

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// A line in the cart. Items are identified by id, size and colour together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    fn matches(&self, id: &str, size: Option<&str>, color: Option<&str>) -> bool {
        self.id == id && self.size.as_deref() == size && self.color.as_deref() == color
    }
}

/// Product being added to the cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Defaults to one
    pub quantity: Option<u32>,
}

pub struct Cart<S: Storage> {
    storage: S,
}

impl<S: Storage> Cart<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current items.
    pub fn items(&self) -> Vec<CartItem> {
        match self.load() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Discarding unreadable cart: {}", e);
                Vec::new()
            }
        }
    }

    fn load(&self) -> Result<Vec<CartItem>, StorageError> {
        match self.storage.get(CART_KEY)? {
            Some(data) if !data.trim().is_empty() => Ok(serde_json::from_str(&data)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, items: &[CartItem]) {
        let result = serde_json::to_string(items)
            .map_err(StorageError::from)
            .and_then(|data| self.storage.set(CART_KEY, &data));

        if let Err(e) = result {
            tracing::error!("Failed to save cart: {}", e);
        }
    }

    /// Add a product, merging with an existing line of the same variant.
    pub fn add(&self, product: Product) -> Vec<CartItem> {
        let mut items = self.items();
        let quantity = product.quantity.filter(|q| *q > 0).unwrap_or(1);

        let existing = items.iter_mut().find(|item| {
            item.matches(&product.id, product.size.as_deref(), product.color.as_deref())
        });

        match existing {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => items.push(CartItem {
                id: product.id,
                name: product.name,
                price: product.price,
                image_url: product.image_url,
                size: product.size,
                color: product.color,
                quantity,
            }),
        }

        self.save(&items);
        items
    }

    pub fn remove(&self, id: &str, size: Option<&str>, color: Option<&str>) -> Vec<CartItem> {
        let mut items = self.items();
        items.retain(|item| !item.matches(id, size, color));
        self.save(&items);
        items
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn update_quantity(
        &self,
        id: &str,
        quantity: i64,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Vec<CartItem> {
        let mut items = self.items();

        if let Some(index) = items.iter().position(|item| item.matches(id, size, color)) {
            if quantity <= 0 {
                items.remove(index);
            } else {
                items[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        }

        self.save(&items);
        items
    }

    /// Total number of units.
    pub fn count(&self) -> u64 {
        self.items().iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of price times quantity.
    pub fn total(&self) -> f64 {
        self.items()
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }

    pub fn clear(&self) -> Vec<CartItem> {
        if let Err(e) = self.storage.remove(CART_KEY) {
            tracing::error!("Failed to clear cart: {}", e);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStorage, MemoryStorage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn shirt(size: &str) -> Product {
        Product {
            id: "shirt".into(),
            name: "Shirt".into(),
            price: 20.0,
            size: Some(size.into()),
            color: Some("blue".into()),
            ..Default::default()
        }
    }

    #[test]
    fn add_merges_same_variant() {
        let cart = Cart::new(MemoryStorage::new());

        cart.add(shirt("M"));
        cart.add(Product {
            quantity: Some(2),
            ..shirt("M")
        });
        let items = cart.add(shirt("L"));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[1].quantity, 1);
        assert_eq!(cart.count(), 4);
        assert_eq!(cart.total(), 80.0);
    }

    #[test]
    fn remove_only_matching_variant() {
        let cart = Cart::new(MemoryStorage::new());
        cart.add(shirt("M"));
        cart.add(shirt("L"));

        let items = cart.remove("shirt", Some("M"), Some("blue"));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].size.as_deref(), Some("L"));
    }

    #[test]
    fn update_quantity_zero_removes() {
        let cart = Cart::new(MemoryStorage::new());
        cart.add(shirt("M"));

        let items = cart.update_quantity("shirt", 5, Some("M"), Some("blue"));
        assert_eq!(items[0].quantity, 5);

        let items = cart.update_quantity("shirt", 0, Some("M"), Some("blue"));
        assert!(items.is_empty());
    }

    #[test]
    fn huge_quantities_saturate() {
        let cart = Cart::new(MemoryStorage::new());
        cart.add(shirt("M"));
        cart.update_quantity("shirt", i64::MAX, Some("M"), Some("blue"));

        let items = cart.add(shirt("M"));
        assert_eq!(items[0].quantity, u32::MAX);

        cart.add(Product {
            quantity: Some(3_000_000_000),
            ..shirt("L")
        });
        cart.update_quantity("shirt", 3_000_000_000, Some("M"), Some("blue"));
        assert_eq!(cart.count(), 6_000_000_000);
    }

    #[test]
    fn clear_empties_storage() {
        let cart = Cart::new(MemoryStorage::new());
        cart.add(shirt("M"));

        assert!(cart.clear().is_empty());
        assert_eq!(cart.storage().get(CART_KEY).unwrap(), None);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn corrupt_data_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.set(CART_KEY, "{broken").unwrap();
        let cart = Cart::new(storage);

        assert!(cart.items().is_empty());
        assert_eq!(cart.add(shirt("S")).len(), 1);
    }

    #[test]
    fn quota_failure_is_swallowed() {
        let cart = Cart::new(MemoryStorage::with_quota(8));

        let items = cart.add(shirt("M"));

        assert_eq!(items.len(), 1);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn persists_through_file_storage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        Cart::new(JsonFileStorage::new(&path)).add(shirt("M"));
        let cart = Cart::new(JsonFileStorage::new(&path));

        assert_eq!(cart.count(), 1);
        assert_eq!(cart.items()[0].name, "Shirt");
    }
}
