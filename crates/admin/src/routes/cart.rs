//! Store cart route handlers.
//!
//! The cart is read from the session on every request and written back
//! after every mutation. Responses always carry the whole cart with its
//! totals so the page never computes money itself.

use axum::{Json, extract::State};
use invoice_desk_core::{Cart, CartEntry, CartError, OrderTotals, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::{CartStore, SessionCartStore};
use crate::state::AppState;

/// Cart as shown to the shopper.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub item_count: i64,
    pub totals: OrderTotals,
}

impl TryFrom<&Cart> for CartView {
    type Error = CartError;

    fn try_from(cart: &Cart) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            items: cart.entries().to_vec(),
            item_count: cart.item_count(),
            totals: cart.totals()?,
        })
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
}

/// Change quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCart {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCart {
    pub product_id: ProductId,
}

#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = SessionCartStore::new(session).load().await?;
    Ok(Json(CartView::try_from(&cart)?))
}

/// Add one of a product, looked up in the live catalog.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCart>,
) -> Result<Json<CartView>> {
    let product = state.billing().get_product(&request.product_id).await?;
    if !product.is_active {
        return Err(AppError::BadRequest(format!(
            "{} is not available",
            product.name
        )));
    }

    let store = SessionCartStore::new(session);
    let mut cart = store.load().await?;
    cart.add_product(&product.to_catalog());
    let view = CartView::try_from(&cart)?;
    store.save(&cart).await?;

    tracing::debug!(items = view.item_count, "Added to cart");
    Ok(Json(view))
}

#[instrument(skip(session), fields(product_id = %request.product_id, quantity = request.quantity))]
pub async fn update(session: Session, Json(request): Json<UpdateCart>) -> Result<Json<CartView>> {
    let store = SessionCartStore::new(session);
    let mut cart = store.load().await?;
    cart.set_quantity(&request.product_id, request.quantity)?;
    let view = CartView::try_from(&cart)?;
    store.save(&cart).await?;
    Ok(Json(view))
}

#[instrument(skip(session), fields(product_id = %request.product_id))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveFromCart>,
) -> Result<Json<CartView>> {
    let store = SessionCartStore::new(session);
    let mut cart = store.load().await?;
    if !cart.remove(&request.product_id) {
        return Err(CartError::NotInCart(request.product_id).into());
    }
    let view = CartView::try_from(&cart)?;
    store.save(&cart).await?;
    Ok(Json(view))
}

/// Empty the cart. Also the way out of a corrupt stored cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    SessionCartStore::new(session).clear().await?;
    Ok(Json(CartView::try_from(&Cart::new())?))
}
