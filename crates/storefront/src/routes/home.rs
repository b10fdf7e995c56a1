//! Home page: paged product grid with category and price filters.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use bazaar_core::CategoryId;
use bazaar_core::catalog::{Category, PriceRange, ProductFilter};
use serde::Deserialize;
use tracing::instrument;

use super::products::ProductCard;
use crate::state::AppState;

/// Category checkbox in the filter sidebar.
#[derive(Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

/// Price radio button in the filter sidebar.
#[derive(Clone)]
pub struct PriceOption {
    pub id: u8,
    pub label: &'static str,
    pub checked: bool,
}

/// Filter selection parsed from the query string.
///
/// Checkboxes repeat the `category` key, so the query is read as raw pairs.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub categories: Vec<CategoryId>,
    pub price: Option<PriceRange>,
}

impl Selection {
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut selection = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "category" if !value.is_empty() => {
                    let id = CategoryId::new(value.as_str());
                    if !selection.categories.contains(&id) {
                        selection.categories.push(id);
                    }
                }
                "price" => {
                    selection.price = value.parse::<u8>().ok().and_then(PriceRange::by_id);
                }
                _ => {}
            }
        }
        selection
    }

    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        ProductFilter::new(self.categories.clone(), self.price)
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub store_name: String,
    pub categories: Vec<CategoryOption>,
    pub price_ranges: Vec<PriceOption>,
    pub products: Vec<ProductCard>,
    pub filtered: bool,
    pub more: Option<LoadMore>,
    pub error: Option<String>,
}

/// "Load more" button state: which page comes next and how many cards are
/// already on screen.
#[derive(Clone, Copy)]
pub struct LoadMore {
    pub page: u32,
    pub shown: usize,
}

impl LoadMore {
    /// Offer the next page while fewer than `total` products are shown.
    #[must_use]
    pub fn next(page: u32, shown: usize, total: u64) -> Option<Self> {
        let shown_u64 = u64::try_from(shown).unwrap_or(u64::MAX);
        (shown_u64 < total).then_some(Self {
            page: page.saturating_add(1),
            shown,
        })
    }
}

/// Next page of cards plus the following "load more" button (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/load_more.html")]
pub struct LoadMoreTemplate {
    pub products: Vec<ProductCard>,
    pub more: Option<LoadMore>,
}

#[derive(Debug, Deserialize)]
pub struct LoadMoreQuery {
    pub page: u32,
    #[serde(default)]
    pub shown: usize,
}

fn category_options(categories: &[Category], selection: &Selection) -> Vec<CategoryOption> {
    categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id.to_string(),
            name: c.name.clone(),
            checked: selection.categories.contains(&c.id),
        })
        .collect()
}

fn price_options(selection: &Selection) -> Vec<PriceOption> {
    PriceRange::ALL
        .iter()
        .map(|range| PriceOption {
            id: range.id,
            label: range.label,
            checked: selection.price.is_some_and(|p| p.id == range.id),
        })
        .collect()
}

/// Display the home page.
///
/// Without a filter the first page of the listing is shown with a "load
/// more" button; with one, every match from the filter endpoint.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let selection = Selection::from_pairs(&pairs);
    let backend = state.backend();

    let categories = backend.categories().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to load categories: {e}");
        Vec::new()
    });

    let filter = selection.filter();
    let filtered = !filter.is_empty();

    let listing = if filtered {
        backend.filter_products(&filter).await.map(|p| (p, None))
    } else {
        match backend.product_page(1).await {
            Ok(products) => {
                let total = backend.product_count().await.unwrap_or_else(|e| {
                    tracing::warn!("Failed to load product count: {e}");
                    0
                });
                let more = LoadMore::next(1, products.len(), total);
                Ok((products, more))
            }
            Err(e) => Err(e),
        }
    };

    let (products, more, error) = match listing {
        Ok((products, more)) => (products, more, None),
        Err(e) => {
            tracing::error!("Failed to load products: {e}");
            (Vec::new(), None, Some("Could not load products".to_string()))
        }
    };

    HomeTemplate {
        store_name: state.store_name(),
        categories: category_options(&categories, &selection),
        price_ranges: price_options(&selection),
        products: products.iter().map(ProductCard::from).collect(),
        filtered,
        more,
        error,
    }
}

/// Append the next page of the listing (HTMX).
#[instrument(skip(state))]
pub async fn load_more(
    State(state): State<AppState>,
    Query(query): Query<LoadMoreQuery>,
) -> impl IntoResponse {
    let page = query.page.max(1);
    let backend = state.backend();

    let products = backend.product_page(page).await.unwrap_or_else(|e| {
        tracing::error!("Failed to load page {page}: {e}");
        Vec::new()
    });

    let more = if products.is_empty() {
        None
    } else {
        let shown = query.shown + products.len();
        match backend.product_count().await {
            Ok(total) => LoadMore::next(page, shown, total),
            Err(e) => {
                tracing::warn!("Failed to load product count: {e}");
                None
            }
        }
    };

    LoadMoreTemplate {
        products: products.iter().map(ProductCard::from).collect(),
        more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_selection_collects_repeated_categories() {
        let selection = Selection::from_pairs(&pairs(&[
            ("category", "c1"),
            ("category", "c2"),
            ("category", "c1"),
            ("price", "1"),
        ]));
        assert_eq!(
            selection.categories,
            vec![CategoryId::new("c1"), CategoryId::new("c2")]
        );
        assert_eq!(selection.filter().radio, vec![20, 39]);
    }

    #[test]
    fn test_selection_ignores_unknown_price() {
        let selection = Selection::from_pairs(&pairs(&[("price", "42"), ("category", "")]));
        assert!(selection.filter().is_empty());
    }

    #[test]
    fn test_load_more_until_total() {
        let more = LoadMore::next(1, 6, 10).map(|m| (m.page, m.shown));
        assert_eq!(more, Some((2, 6)));
        assert!(LoadMore::next(2, 10, 10).is_none());
        assert!(LoadMore::next(1, 0, 0).is_none());
    }

    #[test]
    fn test_load_more_last_page_does_not_overflow() {
        let more = LoadMore::next(u32::MAX, 6, 10).map(|m| m.page);
        assert_eq!(more, Some(u32::MAX));
    }
}
