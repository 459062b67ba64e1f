use crate::clients::{BookClient, OrderClient};
use crate::domain::{Book, Caller, Order};
use crate::recommendation::{Recommendation, RecommendationEngine, RecommendationKind};
use chrono::Utc;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Serves recommendations from catalog and order snapshots.
///
/// Recommendations are advisory: a failing store degrades to an empty list
/// and never surfaces an error.
#[derive(Clone)]
pub struct RecommendationClient {
    book_client: BookClient,
    order_client: OrderClient,
    engine: Arc<RecommendationEngine>,
}

impl RecommendationClient {
    pub fn new(book_client: BookClient, order_client: OrderClient, engine: RecommendationEngine) -> Self {
        Self { book_client, order_client, engine: Arc::new(engine) }
    }

    /// Up to five books to show next to a cart.
    #[instrument(skip(self))]
    pub async fn recommend(
        &self,
        categories_in_cart: Vec<String>,
        book_ids_in_cart: Vec<String>,
        user_id: Option<String>,
    ) -> Vec<Book> {
        let Some(catalog) = self.catalog().await else {
            return Vec::new();
        };
        let history = match user_id {
            Some(user_id) => self.orders_where(move |o| o.user_id == user_id).await.unwrap_or_default(),
            None => Vec::new(),
        };
        let books = self.engine.recommend_for_cart(
            &catalog,
            &categories_in_cart,
            &book_ids_in_cart,
            &history,
            &mut rand::rng(),
        );
        info!(count = books.len(), "Cart recommendations served");
        books
    }

    #[instrument(skip(self))]
    pub async fn personalized(&self, caller: &Caller) -> Recommendation {
        let Some(catalog) = self.catalog().await else {
            return Recommendation::empty(RecommendationKind::Fallback);
        };
        let user_id = caller.user_id.clone();
        let Some(history) = self.orders_where(move |o| o.user_id == user_id).await else {
            return Recommendation::empty(RecommendationKind::Fallback);
        };
        let rec = self.engine.personalized(&catalog, &history);
        info!(kind = ?rec.kind, count = rec.books.len(), "Personalized recommendations served");
        rec
    }

    #[instrument(skip(self))]
    pub async fn also_bought(&self, book_id: String) -> Recommendation {
        let Some(catalog) = self.catalog().await else {
            return Recommendation::empty(RecommendationKind::AlsoBought);
        };
        let seed = book_id.clone();
        let Some(orders) = self.orders_where(move |o| o.contains(&seed)).await else {
            return Recommendation::empty(RecommendationKind::AlsoBought);
        };
        self.engine.also_bought(&catalog, &book_id, &orders)
    }

    #[instrument(skip(self))]
    pub async fn trending(&self) -> Recommendation {
        let Some(catalog) = self.catalog().await else {
            return Recommendation::empty(RecommendationKind::Trending);
        };
        let Some(orders) = self.orders_where(|_| true).await else {
            return Recommendation::empty(RecommendationKind::Trending);
        };
        self.engine.trending(&catalog, &orders, Utc::now())
    }

    async fn catalog(&self) -> Option<Vec<Book>> {
        degrade(self.book_client.list_books(None).await)
    }

    async fn orders_where(&self, predicate: impl Fn(&Order) -> bool + Send + Sync + 'static) -> Option<Vec<Order>> {
        degrade(self.order_client.find_orders(predicate).await)
    }
}

fn degrade<T, E: Display>(result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "Recommendation data unavailable, degrading");
            None
        }
    }
}
