use super::config::RecommendationConfig;
use crate::domain::{Book, Order, OrderStatus};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Personalized,
    /// No usable history: global best sellers instead.
    Fallback,
    AlsoBought,
    Trending,
}

impl RecommendationKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::Personalized => "Recommended for you, based on your purchases",
            Self::Fallback => "Our best sellers",
            Self::AlsoBought => "Readers who bought this book also bought",
            Self::Trending => "Trending this month",
        }
    }
}

/// A labelled recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    pub books: Vec<Book>,
}

impl Recommendation {
    pub fn new(kind: RecommendationKind, books: Vec<Book>) -> Self {
        Self { kind, message: kind.message().to_string(), books }
    }

    pub fn empty(kind: RecommendationKind) -> Self {
        Self::new(kind, Vec::new())
    }
}

/// Signals the cart scorer reads for every candidate.
struct CartContext<'a> {
    favorites: Vec<String>,
    associated: Vec<String>,
    avg_price: Option<Decimal>,
    authors: HashSet<&'a str>,
    purchased_categories: HashSet<&'a str>,
}

fn is_active(order: &&Order) -> bool {
    order.status != OrderStatus::Cancelled
}

/// Rating, then review count, both descending.
fn by_rating(a: &Book, b: &Book) -> Ordering {
    b.rating.total_cmp(&a.rating).then(b.num_reviews.cmp(&a.num_reviews))
}

/// Review count, then rating, both descending.
fn by_popularity(a: &Book, b: &Book) -> Ordering {
    b.num_reviews.cmp(&a.num_reviews).then(b.rating.total_cmp(&a.rating))
}

/// Keys by descending total; ties keep first-seen order.
fn ranked<K: PartialEq>(entries: impl IntoIterator<Item = (K, u32)>) -> Vec<K> {
    let mut totals: Vec<(K, u32)> = Vec::new();
    for (key, n) in entries {
        match totals.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += n,
            None => totals.push((key, n)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.into_iter().map(|(k, _)| k).collect()
}

fn index(catalog: &[Book]) -> HashMap<&str, &Book> {
    catalog.iter().map(|b| (b.id.as_str(), b)).collect()
}

fn newest_first(mut orders: Vec<&Order>, cap: usize) -> Vec<&Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders.truncate(cap);
    orders
}

/// Appends the best-rated books of `pool` until `picked` holds `limit`.
fn top_up<'a>(picked: &mut Vec<&'a Book>, mut pool: Vec<&'a Book>, skip_id: Option<&str>, limit: usize) {
    pool.sort_by(|a, b| by_rating(a, b));
    for book in pool {
        if picked.len() >= limit {
            break;
        }
        if skip_id == Some(book.id.as_str()) || picked.iter().any(|p| p.id == book.id) {
            continue;
        }
        picked.push(book);
    }
}

/// Heuristic recommender over catalog and order snapshots.
///
/// Every mode is a pure function of its inputs (plus the injected RNG for
/// cart jitter) and degrades to a bounded cold-start list rather than
/// failing. An empty catalog always yields an empty list.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Cart-based recommendations.
    ///
    /// `cart_categories` may repeat a category once per cart line; when it is
    /// empty the categories of `cart_ids` are used. `history` is the user's
    /// own orders, if known.
    pub fn recommend_for_cart(
        &self,
        catalog: &[Book],
        cart_categories: &[String],
        cart_ids: &[String],
        history: &[Order],
        rng: &mut impl Rng,
    ) -> Vec<Book> {
        let limit = self.config.cart_limit;
        if cart_categories.is_empty() && cart_ids.is_empty() {
            return self.popular(catalog);
        }

        let by_id = index(catalog);
        let cart_books: Vec<&Book> = cart_ids.iter().filter_map(|id| by_id.get(id.as_str()).copied()).collect();
        let categories: Vec<&str> = if cart_categories.is_empty() {
            cart_books.iter().map(|b| b.category.as_str()).collect()
        } else {
            cart_categories.iter().map(String::as_str).collect()
        };

        let favorites: Vec<String> = ranked(categories.into_iter().map(|c| (c, 1)))
            .into_iter()
            .take(self.config.favorite_categories)
            .map(str::to_string)
            .collect();
        let mut associated: Vec<String> = Vec::new();
        for favorite in &favorites {
            for related in self.config.associated(favorite) {
                if !favorites.contains(related) && !associated.contains(related) {
                    associated.push(related.clone());
                }
            }
        }

        let avg_price = (!cart_books.is_empty()).then(|| {
            cart_books.iter().map(|b| b.price).sum::<Decimal>() / Decimal::from(cart_books.len())
        });
        let purchased_categories = history
            .iter()
            .filter(is_active)
            .flat_map(|o| o.items.iter())
            .filter_map(|item| by_id.get(item.product_id.as_str()))
            .map(|b| b.category.as_str())
            .collect();
        let ctx = CartContext {
            favorites,
            associated,
            avg_price,
            authors: cart_books.iter().map(|b| b.author.as_str()).collect(),
            purchased_categories,
        };

        let eligible = |b: &&Book| b.in_stock() && !cart_ids.contains(&b.id);
        let mut candidates: Vec<&Book> = catalog
            .iter()
            .filter(eligible)
            .filter(|b| ctx.favorites.contains(&b.category) || ctx.associated.contains(&b.category))
            .collect();
        if candidates.len() < limit {
            let pool = catalog.iter().filter(eligible).collect();
            top_up(&mut candidates, pool, None, limit);
        }

        let mut scored: Vec<(f64, &Book)> = candidates
            .into_iter()
            .map(|b| (self.score(b, &ctx) + self.jitter(rng), b))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, b)| b.clone()).collect()
    }

    /// Personalized list from the user's own purchase history.
    pub fn personalized(&self, catalog: &[Book], history: &[Order]) -> Recommendation {
        let orders = newest_first(history.iter().filter(is_active).collect(), self.config.history_orders);
        if orders.is_empty() {
            return self.best_sellers(catalog);
        }

        let by_id = index(catalog);
        let mut purchased: HashSet<&str> = HashSet::new();
        let mut categories: Vec<(&str, u32)> = Vec::new();
        let mut authors: Vec<(&str, u32)> = Vec::new();
        for item in orders.iter().flat_map(|o| o.items.iter()) {
            purchased.insert(item.product_id.as_str());
            // books deleted since contribute nothing
            if let Some(book) = by_id.get(item.product_id.as_str()) {
                categories.push((book.category.as_str(), item.qty));
                authors.push((book.author.as_str(), item.qty));
            }
        }
        let top_categories: Vec<&str> = ranked(categories).into_iter().take(self.config.top_categories).collect();
        let top_authors: Vec<&str> = ranked(authors).into_iter().take(self.config.top_authors).collect();

        let mut books: Vec<&Book> = catalog
            .iter()
            .filter(|b| b.in_stock() && !purchased.contains(b.id.as_str()))
            .filter(|b| top_categories.contains(&b.category.as_str()) || top_authors.contains(&b.author.as_str()))
            .collect();
        if books.is_empty() {
            return self.best_sellers(catalog);
        }
        books.sort_by(|a, b| by_rating(a, b));
        books.truncate(self.config.personalized_limit);
        Recommendation::new(RecommendationKind::Personalized, books.into_iter().cloned().collect())
    }

    /// Books most often ordered together with `book_id`.
    pub fn also_bought(&self, catalog: &[Book], book_id: &str, orders: &[Order]) -> Recommendation {
        let limit = self.config.also_bought_limit;
        let by_id = index(catalog);
        let containing = newest_first(
            orders.iter().filter(is_active).filter(|o| o.contains(book_id)).collect(),
            self.config.also_bought_orders,
        );

        let mut co_purchases: Vec<(&str, u32)> = Vec::new();
        for order in containing {
            let mut seen: HashSet<&str> = HashSet::new();
            for item in &order.items {
                let id = item.product_id.as_str();
                if id != book_id && seen.insert(id) {
                    co_purchases.push((id, 1));
                }
            }
        }
        let mut picked: Vec<&Book> = ranked(co_purchases)
            .into_iter()
            .filter_map(|id| by_id.get(id).copied())
            .take(limit)
            .collect();

        if picked.len() < self.config.also_bought_min {
            if let Some(seed) = by_id.get(book_id) {
                let same_category = catalog
                    .iter()
                    .filter(|b| b.in_stock() && b.category == seed.category)
                    .collect();
                top_up(&mut picked, same_category, Some(book_id), limit);
            }
            let in_stock = catalog.iter().filter(|b| b.in_stock()).collect();
            top_up(&mut picked, in_stock, Some(book_id), limit);
        }
        Recommendation::new(RecommendationKind::AlsoBought, picked.into_iter().cloned().collect())
    }

    /// Most ordered books over the configured window ending at `now`.
    pub fn trending(&self, catalog: &[Book], orders: &[Order], now: DateTime<Utc>) -> Recommendation {
        let since = now - Duration::days(self.config.trending_days);
        let by_id = index(catalog);
        let quantities = orders
            .iter()
            .filter(is_active)
            .filter(|o| o.created_at >= since)
            .flat_map(|o| o.items.iter())
            .map(|item| (item.product_id.as_str(), item.qty));

        let mut picked: Vec<&Book> = ranked(quantities)
            .into_iter()
            .filter_map(|id| by_id.get(id).copied())
            .take(self.config.trending_limit)
            .collect();
        if picked.len() < self.config.trending_min {
            let in_stock = catalog.iter().filter(|b| b.in_stock()).collect();
            top_up(&mut picked, in_stock, None, self.config.trending_limit);
        }
        Recommendation::new(RecommendationKind::Trending, picked.into_iter().cloned().collect())
    }

    /// Cold-start cart list. Not filtered on stock.
    fn popular(&self, catalog: &[Book]) -> Vec<Book> {
        let mut books: Vec<&Book> = catalog.iter().collect();
        books.sort_by(|a, b| by_popularity(a, b));
        books.into_iter().take(self.config.cart_limit).cloned().collect()
    }

    fn best_sellers(&self, catalog: &[Book]) -> Recommendation {
        let mut books: Vec<&Book> = catalog.iter().collect();
        books.sort_by(|a, b| by_rating(a, b));
        books.truncate(self.config.personalized_limit);
        Recommendation::new(RecommendationKind::Fallback, books.into_iter().cloned().collect())
    }

    fn score(&self, book: &Book, ctx: &CartContext<'_>) -> f64 {
        let w = &self.config.weights;
        let mut score = 0.0;

        if ctx.favorites.contains(&book.category) {
            score += w.favorite_category;
        } else if ctx.associated.contains(&book.category) {
            score += w.associated_category;
        }

        if book.rating >= w.high_rating_at {
            score += w.rating;
        } else if book.rating >= w.fair_rating_at {
            score += w.rating / 2.0;
        }

        if book.num_reviews >= w.many_reviews_at {
            score += w.reviews;
        } else if book.num_reviews >= w.some_reviews_at {
            score += w.reviews / 2.0;
        }

        if let Some(avg) = ctx.avg_price {
            if (book.price - avg).abs() <= w.price_window {
                score += w.price_proximity;
            }
        }
        if ctx.authors.contains(book.author.as_str()) {
            score += w.same_author;
        }
        if ctx.purchased_categories.contains(book.category.as_str()) {
            score += w.purchased_category;
        }
        score
    }

    fn jitter(&self, rng: &mut impl Rng) -> f64 {
        let max = self.config.weights.max_jitter;
        if max > 0.0 {
            rng.random_range(0.0..max)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItem, PaymentMethod, ShippingAddress};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn book(id: &str, category: &str, ratings: &[u8]) -> Book {
        Book::new(id, format!("Title {id}"), format!("Author {id}"), dec!(10.00), category, 5).with_ratings(ratings)
    }

    fn order(id: &str, user: &str, lines: &[(&str, u32)], days_ago: i64, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            user_id: user.into(),
            items: lines
                .iter()
                .map(|(product_id, qty)| OrderItem {
                    product_id: product_id.to_string(),
                    title: String::new(),
                    image: String::new(),
                    price: dec!(10.00),
                    qty: *qty,
                })
                .collect(),
            shipping_address: ShippingAddress::new("1 rue Lepic", "Paris", "75018", "France"),
            payment_method: PaymentMethod::Card,
            total_price: Decimal::ZERO,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            status,
            payment_id: None,
            stock_released: false,
            created_at: Utc::now() - Duration::days(days_ago),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_empty_cart_cold_start_is_bounded() {
        let engine = RecommendationEngine::default();
        let mut rng = StdRng::seed_from_u64(1);
        let catalog: Vec<Book> = (0..8).map(|i| book(&format!("b{i}"), "Roman", &[3])).collect();

        let books = engine.recommend_for_cart(&catalog, &[], &[], &[], &mut rng);
        assert_eq!(books.len(), 5);
        assert!(engine.recommend_for_cart(&[], &[], &[], &[], &mut rng).is_empty());
    }

    #[test]
    fn test_fantasy_cart_prefers_fantasy_and_its_associate() {
        let engine = RecommendationEngine::default();
        let catalog = vec![
            book("f1", "Fantasy", &[1]),
            book("f3", "Fantasy", &[3]),
            book("f5", "Fantasy", &[5]),
            book("sf1", "Science-Fiction", &[]),
            book("sf2", "Science-Fiction", &[]),
            book("sf3", "Science-Fiction", &[]),
        ];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let books = engine.recommend_for_cart(&catalog, &strings(&["Fantasy"]), &[], &[], &mut rng);
            assert_eq!(books.len(), 5);
            assert!(books.iter().all(|b| b.category == "Fantasy" || b.category == "Science-Fiction"));

            let order = ids(&books);
            let best = order.iter().position(|id| *id == "f5").unwrap();
            let worst = order.iter().position(|id| *id == "f1").unwrap();
            assert!(best < worst);
        }
    }

    #[test]
    fn test_cart_excludes_cart_books_and_out_of_stock() {
        let mut engine_config = RecommendationConfig::default();
        engine_config.weights.max_jitter = 0.0;
        let engine = RecommendationEngine::new(engine_config);
        let mut sold_out = book("f2", "Fantasy", &[5]);
        sold_out.stock = 0;
        let catalog = vec![book("f1", "Fantasy", &[4]), sold_out, book("f3", "Fantasy", &[2])];

        let books = engine.recommend_for_cart(
            &catalog,
            &strings(&["Fantasy"]),
            &strings(&["f1"]),
            &[],
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(ids(&books), vec!["f3"]);
    }

    #[test]
    fn test_same_author_outranks_category_peers() {
        let mut config = RecommendationConfig::default();
        config.weights.max_jitter = 0.0;
        let engine = RecommendationEngine::new(config);
        let in_cart = book("r1", "Roman", &[]);
        let mut sibling = book("r2", "Roman", &[]);
        sibling.author = in_cart.author.clone();
        let catalog = vec![in_cart, book("r3", "Roman", &[4]), sibling];

        let books =
            engine.recommend_for_cart(&catalog, &[], &strings(&["r1"]), &[], &mut StdRng::seed_from_u64(0));
        assert_eq!(ids(&books), vec!["r2", "r3"]);
    }

    #[test]
    fn test_personalized_uses_history_or_falls_back() {
        let engine = RecommendationEngine::default();
        let catalog = vec![
            book("f1", "Fantasy", &[4]),
            book("f2", "Fantasy", &[5]),
            book("p1", "Policier", &[5, 5]),
        ];

        let fallback = engine.personalized(&catalog, &[]);
        assert_eq!(fallback.kind, RecommendationKind::Fallback);
        assert_eq!(ids(&fallback.books), vec!["p1", "f2", "f1"]);

        let history = vec![
            order("o1", "u1", &[("f1", 1)], 2, OrderStatus::Delivered),
            order("o2", "u1", &[("p1", 1)], 1, OrderStatus::Cancelled),
        ];
        let personal = engine.personalized(&catalog, &history);
        assert_eq!(personal.kind, RecommendationKind::Personalized);
        assert_eq!(ids(&personal.books), vec!["f2"]);
    }

    #[test]
    fn test_also_bought_counts_each_order_once_and_pads() {
        let engine = RecommendationEngine::default();
        let catalog = vec![
            book("seed", "Fantasy", &[]),
            book("x", "Roman", &[]),
            book("y", "Roman", &[]),
            book("f2", "Fantasy", &[4]),
            book("f3", "Fantasy", &[2]),
        ];
        let orders = vec![
            order("o1", "u1", &[("seed", 1), ("y", 1), ("y", 1)], 1, OrderStatus::Pending),
            order("o2", "u2", &[("seed", 1), ("x", 2)], 1, OrderStatus::Delivered),
            order("o3", "u3", &[("seed", 1), ("x", 1)], 1, OrderStatus::Shipped),
        ];

        let rec = engine.also_bought(&catalog, "seed", &orders);
        assert_eq!(rec.kind, RecommendationKind::AlsoBought);
        assert_eq!(ids(&rec.books), vec!["x", "y", "f2", "f3"]);
    }

    #[test]
    fn test_trending_window_ignores_old_and_cancelled() {
        let engine = RecommendationEngine::default();
        let catalog: Vec<Book> = ["a", "b", "c", "d", "e", "f"].iter().map(|id| book(id, "Roman", &[])).collect();
        let orders = vec![
            order("o1", "u1", &[("a", 1), ("b", 3)], 3, OrderStatus::Delivered),
            order("o2", "u2", &[("c", 50)], 45, OrderStatus::Delivered),
            order("o3", "u3", &[("d", 40)], 1, OrderStatus::Cancelled),
        ];

        let rec = engine.trending(&catalog, &orders, Utc::now());
        assert_eq!(&ids(&rec.books)[..2], &["b", "a"]);
        assert_eq!(rec.books.len(), catalog.len());
    }
}
