use uuid::Uuid;

use crate::products::dto::{round_cents, ProductResponse, StockStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Price,
    Quantity,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Table,
    Compact,
}

/// Active filter over the collection: everything, low stock only, or one
/// category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Low,
    Category(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryStats {
    pub total: usize,
    pub low_stock: usize,
    pub total_value: f64,
    pub average_price: f64,
}

/// Client-side view over the product collection. The collection itself only
/// changes through the `replace_all`/`apply_*` commands, which take the
/// canonical records the server returned; the rest is presentation state.
#[derive(Debug, Clone)]
pub struct ProductView {
    products: Vec<ProductResponse>,
    pub search: String,
    pub filter: Filter,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
}

impl Default for ProductView {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            search: String::new(),
            filter: Filter::All,
            sort_key: SortKey::Name,
            sort_order: SortOrder::Asc,
            view_mode: ViewMode::Table,
        }
    }
}

impl ProductView {
    pub fn new(products: Vec<ProductResponse>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn replace_all(&mut self, products: Vec<ProductResponse>) {
        self.products = products;
    }

    pub fn apply_created(&mut self, product: ProductResponse) {
        self.products.push(product);
    }

    pub fn apply_updated(&mut self, product: ProductResponse) {
        if let Some(existing) = self.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product;
        }
    }

    pub fn apply_deleted(&mut self, id: Uuid) {
        self.products.retain(|p| p.id != id);
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Sorting by the current key again flips the direction; a new key
    /// resets to ascending.
    pub fn sort_by(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_order = match self.sort_order {
                SortOrder::Asc => SortOrder::Desc,
                SortOrder::Desc => SortOrder::Asc,
            };
        } else {
            self.sort_key = key;
            self.sort_order = SortOrder::Asc;
        }
    }

    fn matches(&self, product: &ProductResponse) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = term.is_empty()
            || product.name.to_lowercase().contains(&term)
            || product
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false);
        let matches_filter = match &self.filter {
            Filter::All => true,
            Filter::Low => product.status == StockStatus::Low,
            Filter::Category(category) => &product.category == category,
        };
        matches_search && matches_filter
    }

    /// The filtered, sorted slice the UI renders.
    pub fn visible(&self) -> Vec<&ProductResponse> {
        let mut items: Vec<&ProductResponse> =
            self.products.iter().filter(|p| self.matches(p)).collect();
        items.sort_by(|a, b| {
            let ordering = match self.sort_key {
                SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortKey::Price => a
                    .price
                    .partial_cmp(&b.price)
                    .unwrap_or(std::cmp::Ordering::Equal),
                SortKey::Quantity => a.quantity.cmp(&b.quantity),
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            match self.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        items
    }

    /// Distinct categories present in the collection, for filter menus.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.products.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn stats(&self) -> InventoryStats {
        let total = self.products.len();
        let low_stock = self
            .products
            .iter()
            .filter(|p| p.status == StockStatus::Low)
            .count();
        let total_value = round_cents(
            self.products
                .iter()
                .map(|p| p.price * p.quantity as f64)
                .sum(),
        );
        let average_price = if total > 0 {
            round_cents(self.products.iter().map(|p| p.price).sum::<f64>() / total as f64)
        } else {
            0.0
        };
        InventoryStats {
            total,
            low_stock,
            total_value,
            average_price,
        }
    }
}
