use uuid::Uuid;

use crate::domain::cart::{self, CartLine, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, CatalogReader};

pub struct CartService<C, R> {
    catalog: C,
    carts: R,
}

impl<C: CatalogReader, R: CartRepository> CartService<C, R> {
    pub fn new(catalog: C, carts: R) -> Self {
        Self { catalog, carts }
    }

    /// The user's cart priced at current catalog prices. An absent cart is
    /// an empty view, never an error.
    pub fn get_cart(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        let lines = self.carts.lines_for_user(user_id)?;
        if lines.is_empty() {
            return Ok(CartView::new(vec![]));
        }
        let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products = self.catalog.find_products(&ids)?;
        Ok(CartView::new(cart::price_lines(lines, &products)))
    }

    pub fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        variant_id: Option<&str>,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        cart::validate_add_quantity(quantity)?;
        match self.catalog.find_product(product_id)? {
            Some(product) if product.is_active => {}
            _ => return Err(DomainError::NotFound),
        }
        let line = self
            .carts
            .add_quantity(user_id, product_id, variant_id, quantity)?;
        log::debug!(
            "Cart line {} for user {} now has quantity {}",
            line.id,
            user_id,
            line.quantity
        );
        Ok(line)
    }

    /// Overwrite a line's quantity. Zero or below removes the line.
    pub fn update_item(&self, user_id: Uuid, line_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let found = if quantity <= 0 {
            self.carts.delete_line(user_id, line_id)?
        } else {
            self.carts.set_quantity(user_id, line_id, quantity)?
        };
        if found {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    pub fn remove_item(&self, user_id: Uuid, line_id: Uuid) -> Result<(), DomainError> {
        if self.carts.delete_line(user_id, line_id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    pub fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        let removed = self.carts.clear(user_id)?;
        log::debug!("Cleared {} cart lines for user {}", removed, user_id);
        Ok(())
    }
}
