//! Cart route handlers.
//!
//! The cart lives in the session and is written back on every change. Cart
//! mutations are HTMX requests: they answer with a fragment (or nothing) and
//! an `HX-Trigger` carrying `cart-updated` and a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::ProductId;
use bazaar_core::cart::{AddOutcome, Cart, CartError, CartItem};
use bazaar_core::catalog::excerpt;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Toast;
use crate::models::session::{load_cart, save_cart, set_flash};
use crate::state::AppState;

const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Event that refreshes the header badge.
const CART_UPDATED: &str = "cart-updated";

const QUANTITY_TOO_LOW: &str = "Quantity must be at least 1";

/// Description length in cart rows.
const CART_EXCERPT_CHARS: usize = 80;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub excerpt: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            excerpt: excerpt(&item.description, CART_EXCERPT_CHARS),
            price: item.price.display(),
            quantity: item.quantity,
            line_total: item.line_total().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub line_count: usize,
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub total_with_tax: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.items().iter().map(CartLineView::from).collect(),
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal().display(),
            tax: cart.tax().display(),
            total: cart.total().display(),
            total_with_tax: cart.total_with_tax().display(),
        }
    }
}

/// What the checkout panel offers.
#[derive(Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Anonymous shopper: link to login.
    LoginRequired,
    /// Signed in without a shipping address: link to the profile.
    AddressRequired,
    /// Signed in with an address to ship to.
    Ready(String),
}

impl CheckoutState {
    #[must_use]
    pub const fn login_required(&self) -> bool {
        matches!(self, Self::LoginRequired)
    }

    #[must_use]
    pub const fn address_required(&self) -> bool {
        matches!(self, Self::AddressRequired)
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Ready(address) => Some(address),
            _ => None,
        }
    }
}

/// Add to cart form data. A missing quantity means one unit.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub quantity: Option<String>,
}

impl AddToCartForm {
    /// Requested units, or `None` for blank, non-numeric or sub-1 input.
    fn units(&self) -> Option<u32> {
        match self.quantity.as_deref() {
            None => Some(1),
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|q| *q >= 1),
        }
    }
}

/// Update cart form data. Quantity stays raw text so that blank or garbled
/// input gets the same toast as a `0`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    #[serde(default)]
    pub quantity: String,
}

impl UpdateCartForm {
    fn requested(&self) -> Option<i64> {
        self.quantity.trim().parse().ok()
    }
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub store_name: String,
    pub greeting: Option<String>,
    pub cart: CartView,
    pub checkout: CheckoutState,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

fn items_response(cart: &Cart, toast: &Toast, events: &[&str]) -> Response {
    (
        [(HX_TRIGGER, toast.trigger(events))],
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;

    let checkout = match &auth {
        None => CheckoutState::LoginRequired,
        Some(auth) if !auth.user.has_address() => CheckoutState::AddressRequired,
        Some(auth) => CheckoutState::Ready(auth.user.address.clone()),
    };

    Ok(CartShowTemplate {
        store_name: state.store_name(),
        greeting: auth.map(|a| a.user.name),
        cart: CartView::from(&cart),
        checkout,
    })
}

/// Add a product to the cart (HTMX).
///
/// The product snapshot is fetched from the backend so the cart holds the
/// current name and price.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let Some(units) = form.units() else {
        let toast = Toast::error(QUANTITY_TOO_LOW);
        return Ok((StatusCode::OK, [(HX_TRIGGER, toast.trigger(&[]))]).into_response());
    };

    let product = match state.backend().product(&form.slug).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to load product for cart: {e}");
            let toast = Toast::error("Something went wrong");
            return Ok((StatusCode::OK, [(HX_TRIGGER, toast.trigger(&[]))]).into_response());
        }
    };

    let mut cart = load_cart(&session).await?;
    let outcome = cart.add(CartItem::from(&product), units);
    save_cart(&session, &cart).await?;

    let toast = match outcome {
        AddOutcome::Added => Toast::success("Item Added to cart"),
        AddOutcome::Incremented => Toast::success("Quantity increased in cart"),
    };

    Ok((
        [(HX_TRIGGER, toast.trigger(&[CART_UPDATED]))],
        CartCountTemplate {
            count: cart.line_count(),
        },
    )
        .into_response())
}

/// Change a line's quantity (HTMX). Quantities below 1 are refused and the
/// cart is left as it was.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;

    let Some(quantity) = form.requested() else {
        return Ok(items_response(&cart, &Toast::error(QUANTITY_TOO_LOW), &[]));
    };

    match cart.set_quantity(&ProductId::new(form.id), quantity) {
        Ok(_) => {
            save_cart(&session, &cart).await?;
            Ok(items_response(
                &cart,
                &Toast::success("Cart updated"),
                &[CART_UPDATED],
            ))
        }
        Err(CartError::InvalidQuantity(_)) => Ok(items_response(
            &cart,
            &Toast::error(QUANTITY_TOO_LOW),
            &[],
        )),
        Err(CartError::NotInCart(_)) => Ok(items_response(
            &cart,
            &Toast::error("Item is no longer in your cart"),
            &[],
        )),
    }
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;

    let toast = match cart.remove(&ProductId::new(form.id)) {
        Ok(_) => {
            save_cart(&session, &cart).await?;
            Toast::success("Item removed from cart")
        }
        Err(_) => Toast::error("Item is no longer in your cart"),
    };

    Ok(items_response(&cart, &toast, &[CART_UPDATED]))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.line_count(),
    })
}

/// Pay for the cart.
///
/// The cart is only cleared once the backend confirms the payment; on any
/// failure it stays untouched and the shopper is sent back to it.
#[instrument(skip(state, session, auth))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;

    if cart.is_empty() {
        set_flash(&session, Toast::error("Your cart is empty")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    if !auth.user.has_address() {
        set_flash(
            &session,
            Toast::error("Please add a shipping address before checkout"),
        )
        .await;
        return Ok(Redirect::to("/dashboard/user/profile").into_response());
    }

    match state.backend().pay(&auth.token, &cart).await {
        Ok(()) => {
            cart.clear();
            save_cart(&session, &cart).await?;
            tracing::info!(user_id = %auth.user.id, "Checkout completed");
            set_flash(&session, Toast::success("Payment Completed Successfully")).await;
            Ok(Redirect::to("/dashboard/user/orders").into_response())
        }
        Err(e) => {
            tracing::error!(user_id = %auth.user.id, "Payment failed: {e}");
            set_flash(&session, Toast::error("Payment failed. Please try again.")).await;
            Ok(Redirect::to("/cart").into_response())
        }
    }
}
