//! Shopping cart with per-variant stock enforcement.
//!
//! The cart is a plain ordered list of lines plus derived totals. Totals
//! are recomputed on every read, never cached, so displayed numbers cannot
//! drift from the underlying lines. Every mutation is written through to
//! durable storage so a restart does not lose the cart.
//!
//! Stock policy is clamp-and-warn, not hard-reject: adding more than a
//! variant has in stock adds whatever headroom remains and tells the
//! caller, and a quantity update beyond stock is clamped to the maximum.
//! The outcomes are structured enums; how they are surfaced (toast, inline
//! message) is the presentation layer's decision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use woolly_core::{CurrencyCode, LineId, Price, ProductId};

use crate::storage::{KeyValueStore, StorageError, keys};
use crate::woo::types::Product;

/// Free-shipping threshold and flat fee, injected via configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShippingConfig {
    /// Subtotals at or above this ship free.
    pub free_shipping_threshold: Decimal,
    /// Flat fee charged below the threshold.
    pub flat_fee: Decimal,
}

/// Where a line came from. Cosmetic grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    /// Normal catalog browsing.
    #[default]
    Catalog,
    /// A promotional landing page.
    Promotion,
}

/// One cart line: a product snapshot plus quantity and size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Local line identity; distinguishes same-product-different-size lines.
    pub line_id: LineId,
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Name at add time.
    pub name: String,
    /// Unit price at add time.
    pub price: Price,
    /// Primary image at add time, if any.
    pub image: Option<String>,
    /// Selected size label; matches one of the product's variant labels.
    pub size: String,
    /// Units in the line; always >= 1 and <= the variant stock at the time
    /// it was last validated.
    pub quantity: u32,
    /// Variant stock snapshot taken at add time, used to re-validate
    /// quantity updates.
    pub variant_stock: u32,
    /// Origin of the line.
    pub source: LineSource,
}

impl CartItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount * Decimal::from(self.quantity)
    }
}

/// Errors adding to the cart. All are recoverable at the point of call.
#[derive(Debug, Error)]
pub enum CartError {
    /// No size selected.
    #[error("select a size")]
    SizeRequired,

    /// The selected size is not one of the product's variants.
    #[error("size {0:?} is not available for this product")]
    UnknownSize(String),

    /// The selected variant has no stock.
    #[error("this size is out of stock")]
    OutOfStock,

    /// Persisting the cart failed.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What an `add_item` call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The full requested quantity was added.
    Added {
        /// Line the units landed on.
        line_id: LineId,
        /// Units added.
        added: u32,
    },
    /// Stock allowed only part of the request; the rest was dropped and
    /// the caller should warn the shopper.
    AddedPartial {
        /// Line the units landed on.
        line_id: LineId,
        /// Units requested.
        requested: u32,
        /// Units actually added.
        added: u32,
        /// Variant stock that capped the line.
        available: u32,
    },
    /// The line already holds everything the variant has; nothing changed.
    NoHeadroom {
        /// The saturated line.
        line_id: LineId,
        /// Variant stock.
        available: u32,
    },
    /// Zero-quantity requests are ignored; quantities are positive.
    Ignored,
}

/// What an `update_quantity` call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The requested quantity was applied.
    Updated,
    /// The request exceeded variant stock and was clamped; warn the shopper.
    Clamped {
        /// The quantity actually applied.
        max: u32,
    },
    /// Quantities below 1 and unknown line ids are ignored.
    Ignored,
}

/// The cart store: ordered lines, derived totals, write-through persistence.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    items: Vec<CartItem>,
    shipping: ShippingConfig,
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart from storage, or start empty.
    ///
    /// A missing, corrupt, or old-shape blob yields an empty cart; the
    /// blob format is unversioned, so discarding is the tolerant option.
    pub fn load(storage: S, shipping: ShippingConfig) -> Self {
        let items = match storage.get(keys::CART) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<CartItem>>(&blob) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable persisted cart");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Cart storage unreadable, starting empty");
                Vec::new()
            }
        };

        Self {
            items,
            shipping,
            storage,
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        // Serializing Vec<CartItem> cannot fail; map_err keeps the
        // signature honest without unwrap.
        let blob = serde_json::to_string(&self.items)
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        self.storage.set(keys::CART, &blob)
    }

    /// Add `quantity` units of `product` in `size`.
    ///
    /// If a line for the same product and size exists, units are added to
    /// it up to the variant's stock (partial fulfillment). A new line is
    /// clamped to stock. A zero quantity is ignored, matching
    /// [`CartStore::update_quantity`]. See [`AddOutcome`].
    ///
    /// # Errors
    ///
    /// - [`CartError::SizeRequired`] if `size` is empty
    /// - [`CartError::UnknownSize`] if the product has no such variant
    /// - [`CartError::OutOfStock`] if the variant stock is zero
    /// - [`CartError::Storage`] if persisting fails
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: &str,
        source: LineSource,
    ) -> Result<AddOutcome, CartError> {
        if quantity == 0 {
            return Ok(AddOutcome::Ignored);
        }
        if size.is_empty() {
            return Err(CartError::SizeRequired);
        }
        let variant = product
            .variant(size)
            .ok_or_else(|| CartError::UnknownSize(size.to_string()))?;
        if variant.stock == 0 {
            return Err(CartError::OutOfStock);
        }
        let available = variant.stock;

        let existing = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id && item.size == size);

        let outcome = if let Some(item) = existing {
            let headroom = available.saturating_sub(item.quantity);
            if headroom == 0 {
                debug!(line_id = %item.line_id, "Add request with no headroom");
                return Ok(AddOutcome::NoHeadroom {
                    line_id: item.line_id,
                    available,
                });
            }
            let added = quantity.min(headroom);
            item.quantity += added;
            item.variant_stock = available;
            if added == quantity {
                AddOutcome::Added {
                    line_id: item.line_id,
                    added,
                }
            } else {
                AddOutcome::AddedPartial {
                    line_id: item.line_id,
                    requested: quantity,
                    added,
                    available,
                }
            }
        } else {
            let added = quantity.min(available);
            let line_id = LineId::generate();
            self.items.push(CartItem {
                line_id,
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                image: product.primary_image().map(str::to_string),
                size: size.to_string(),
                quantity: added,
                variant_stock: available,
                source,
            });
            if added == quantity {
                AddOutcome::Added { line_id, added }
            } else {
                AddOutcome::AddedPartial {
                    line_id,
                    requested: quantity,
                    added,
                    available,
                }
            }
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Set a line's quantity, clamped to the variant's stock.
    ///
    /// Quantities below 1 and unknown line ids are no-ops (removal is a
    /// separate operation).
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting fails.
    pub fn update_quantity(
        &mut self,
        line_id: LineId,
        quantity: u32,
    ) -> Result<QuantityOutcome, CartError> {
        if quantity < 1 {
            return Ok(QuantityOutcome::Ignored);
        }

        let Some(item) = self.items.iter_mut().find(|i| i.line_id == line_id) else {
            return Ok(QuantityOutcome::Ignored);
        };

        let outcome = if quantity > item.variant_stock {
            item.quantity = item.variant_stock;
            QuantityOutcome::Clamped {
                max: item.variant_stock,
            }
        } else {
            item.quantity = quantity;
            QuantityOutcome::Updated
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Remove a line. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting fails.
    pub fn remove_item(&mut self, line_id: LineId) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.line_id != line_id);
        if self.items.len() != before {
            self.persist()?;
        }
        Ok(())
    }

    /// Empty the cart. Called after confirmed payment reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting fails.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()?;
        Ok(())
    }

    // =========================================================================
    // Derived values (pure, recomputed on every read)
    // =========================================================================

    /// The cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let amount = self.items.iter().map(CartItem::line_total).sum();
        Price::new(amount, self.currency())
    }

    /// Flat fee below the free-shipping threshold, zero at or above it.
    #[must_use]
    pub fn shipping_cost(&self) -> Price {
        let subtotal = self.subtotal().amount;
        let fee = if subtotal >= self.shipping.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.shipping.flat_fee
        };
        Price::new(fee, self.currency())
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        Price::new(
            self.subtotal().amount + self.shipping_cost().amount,
            self.currency(),
        )
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    fn currency(&self) -> CurrencyCode {
        self.items
            .first()
            .map_or(CurrencyCode::default(), |i| i.price.currency_code)
    }
}
