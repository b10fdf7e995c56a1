//! Order management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use bazaar_core::account::{Order, filter_orders, revenue};
use bazaar_core::catalog::excerpt;
use bazaar_core::{OrderId, OrderStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    components::{FilterOption, ListSummary},
    error::{AppError, Result},
    middleware::RequireAdminAuth,
    models::Flash,
    state::AppState,
};

use super::{dashboard::AdminUserView, render};

/// Description length in order lines.
const LINE_EXCERPT_CHARS: usize = 30;

/// List filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: String,
}

impl OrderListQuery {
    /// Path back to the list with the same filters applied.
    fn list_url(&self) -> String {
        if self.search.is_empty() && self.status.is_empty() {
            return "/orders".to_string();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("search", &self.search)
            .append_pair("status", &self.status)
            .finish();
        format!("/orders?{query}")
    }
}

/// One product line inside an order.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub excerpt: String,
    pub price: String,
}

/// Order view for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub short_id: String,
    /// 1-based position in the filtered list.
    pub index: usize,
    pub status: &'static str,
    pub status_class: &'static str,
    pub status_options: Vec<FilterOption>,
    pub buyer: String,
    pub date: String,
    pub paid: bool,
    pub quantity: usize,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    fn new(index: usize, order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: order.id.short(),
            index: index + 1,
            status: order.status.as_str(),
            status_class: order.status.css_class(),
            status_options: status_options(order.status.as_str()),
            buyer: order.buyer.name.clone(),
            date: order
                .created_at
                .map(|d| d.format("%b %e, %Y").to_string())
                .unwrap_or_default(),
            paid: order.payment_succeeded(),
            quantity: order.products.len(),
            total: order.total().display(),
            lines: order
                .products
                .iter()
                .map(|p| OrderLineView {
                    name: p.name.clone(),
                    excerpt: excerpt(&p.description, LINE_EXCERPT_CHARS),
                    price: p.price.display(),
                })
                .collect(),
        }
    }
}

fn status_options(current: &str) -> Vec<FilterOption> {
    OrderStatus::ALL
        .iter()
        .map(|status| FilterOption::new(status.as_str(), status.as_str(), current))
        .collect()
}

/// Orders list template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub store_name: String,
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub orders: Vec<OrderView>,
    pub total_orders: usize,
    pub revenue: String,
    pub search: String,
    pub status: String,
    pub status_filter: Vec<FilterOption>,
    pub summary: ListSummary,
}

/// Status change form. `search` and `status_filter` carry the list filters
/// through the redirect.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status_filter: String,
}

/// Orders list with search, status filter and revenue.
///
/// GET /orders
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrderListQuery>,
) -> Result<Html<String>> {
    let orders = state.backend().all_orders(&admin.token).await?;

    let shown = filter_orders(&orders, &query.search, &query.status);
    let current_status = if query.status.is_empty() {
        "all"
    } else {
        query.status.as_str()
    };
    let status_filter = std::iter::once(FilterOption::new("all", "All Status", current_status))
        .chain(
            OrderStatus::ALL
                .iter()
                .map(|s| FilterOption::new(s.as_str(), s.as_str(), current_status)),
        )
        .collect();

    Ok(render(&OrdersTemplate {
        store_name: state.config().store_name.clone(),
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        flash: Flash::take(&session).await,
        summary: ListSummary::new(shown.len(), orders.len(), "orders"),
        orders: shown
            .into_iter()
            .enumerate()
            .map(|(i, order)| OrderView::new(i, order))
            .collect(),
        total_orders: orders.len(),
        revenue: revenue(&orders).display(),
        search: query.search,
        status: query.status,
        status_filter,
    }))
}

/// Change an order's status, then show the refreshed list.
///
/// POST /orders/{id}/status
#[instrument(skip(admin, state, session, form))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let status: OrderStatus = form.status.parse().map_err(AppError::BadRequest)?;
    let id = OrderId::new(id);

    let flash = match state
        .backend()
        .set_order_status(&admin.token, &id, status)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %id, status = %status, "Order status changed");
            Flash::success("Order status updated successfully")
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::error!(order_id = %id, "Failed to update order status: {e}");
            Flash::error("Failed to update order status")
        }
    };
    flash.store(&session).await;

    let back = OrderListQuery {
        search: form.search,
        status: form.status_filter,
    };
    Ok(Redirect::to(&back.list_url()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_url_keeps_filters() {
        let query = OrderListQuery {
            search: "ada lovelace".to_string(),
            status: "Shipped".to_string(),
        };
        assert_eq!(
            query.list_url(),
            "/orders?search=ada+lovelace&status=Shipped"
        );
    }

    #[test]
    fn test_list_url_without_filters() {
        assert_eq!(OrderListQuery::default().list_url(), "/orders");
    }

    #[test]
    fn test_status_options_select_current() {
        let options = status_options("deliverd");
        assert_eq!(options.len(), OrderStatus::ALL.len());
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.value == "deliverd"));
    }
}
