//! Search results, typeahead suggestions and the recent-search list.
//!
//! The search box asks for suggestions with
//! `hx-trigger="input changed delay:300ms"` and `hx-sync="this:replace"`, so
//! the browser debounces typing and aborts a request still in flight when a
//! newer one fires. This module applies the keyword-length and fallback
//! rules.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use bazaar_core::search::{Keyword, POPULAR_SEARCHES, SuggestionSource, Suggestions};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::products::ProductCard;
use crate::error::Result;
use crate::models::session::{load_recent_searches, save_recent_searches};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRecentForm {
    pub term: String,
    #[serde(default)]
    pub keyword: String,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/results.html")]
pub struct SearchResultsTemplate {
    pub store_name: String,
    pub keyword: String,
    pub products: Vec<ProductCard>,
    pub error: Option<String>,
}

/// Suggestion dropdown fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/suggestions.html")]
pub struct SuggestionsTemplate {
    pub keyword: String,
    pub items: Vec<String>,
    pub fallback: bool,
    /// The keyword was long enough to ask for suggestions.
    pub searched: bool,
    pub recent: Vec<String>,
    /// Only offered when there are no suggestions.
    pub popular: Vec<&'static str>,
}

impl SuggestionsTemplate {
    fn new(keyword: &str, suggestions: Suggestions, recent: Vec<String>) -> Self {
        let popular = if suggestions.is_empty() {
            POPULAR_SEARCHES.to_vec()
        } else {
            Vec::new()
        };
        Self {
            keyword: keyword.trim().to_string(),
            searched: Keyword::parse(keyword).is_some(),
            fallback: suggestions.source == SuggestionSource::Fallback,
            items: suggestions.items,
            recent,
            popular,
        }
    }
}

/// Suggestions for raw input: nothing below the minimum length, the
/// backend's list otherwise, and the filtered popular terms if the backend
/// call fails.
pub async fn suggestions_for(state: &AppState, raw: &str) -> Suggestions {
    let Some(keyword) = Keyword::parse(raw) else {
        return Suggestions::empty();
    };

    match state.backend().search_suggestions(&keyword).await {
        Ok(items) => Suggestions::remote(items),
        Err(e) => {
            tracing::warn!(
                keyword = keyword.as_str(),
                "Suggestion request failed, using popular terms: {e}"
            );
            Suggestions::fallback(&keyword)
        }
    }
}

/// Display search results and remember the keyword.
#[instrument(skip(state, session))]
pub async fn results(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let keyword = query.keyword.trim().to_string();

    if keyword.is_empty() {
        return Ok(SearchResultsTemplate {
            store_name: state.store_name(),
            keyword,
            products: Vec::new(),
            error: None,
        }
        .into_response());
    }

    let mut recent = load_recent_searches(&session).await?;
    if recent.record(&keyword) {
        save_recent_searches(&session, &recent).await?;
    }

    let (products, error) = match state.backend().search(&keyword).await {
        Ok(products) => (products, None),
        Err(e) => {
            tracing::error!("Search failed: {e}");
            (Vec::new(), Some("Search is unavailable right now".to_string()))
        }
    };

    Ok(SearchResultsTemplate {
        store_name: state.store_name(),
        keyword,
        products: products.iter().map(ProductCard::from).collect(),
        error,
    }
    .into_response())
}

/// Suggestion dropdown (HTMX).
#[instrument(skip(state, session))]
pub async fn suggest(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let recent = load_recent_searches(&session).await?;
    let suggestions = suggestions_for(&state, &query.keyword).await;
    Ok(SuggestionsTemplate::new(
        &query.keyword,
        suggestions,
        recent.terms().to_vec(),
    ))
}

/// Drop one recent search and re-render the dropdown (HTMX).
#[instrument(skip(state, session))]
pub async fn remove_recent(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveRecentForm>,
) -> Result<impl IntoResponse> {
    let mut recent = load_recent_searches(&session).await?;
    if recent.remove(&form.term) {
        save_recent_searches(&session, &recent).await?;
    }

    let suggestions = suggestions_for(&state, &form.keyword).await;
    Ok(SuggestionsTemplate::new(
        &form.keyword,
        suggestions,
        recent.terms().to_vec(),
    ))
}
