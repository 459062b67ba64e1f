//! Recommendation tuning: category affinities, score weights and list sizes.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Points awarded by the cart scorer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Category is one of the cart's favorite categories.
    pub favorite_category: f64,
    /// Category is associated with a favorite (never added on top of it).
    pub associated_category: f64,
    /// Full bonus at `high_rating_at`, half at `fair_rating_at`.
    pub rating: f64,
    pub high_rating_at: f64,
    pub fair_rating_at: f64,
    /// Full bonus at `many_reviews_at`, half at `some_reviews_at`.
    pub reviews: f64,
    pub many_reviews_at: u32,
    pub some_reviews_at: u32,
    /// Price within `price_window` of the average cart price.
    pub price_proximity: f64,
    pub price_window: Decimal,
    pub same_author: f64,
    /// Category appears in the user's purchase history.
    pub purchased_category: f64,
    /// Upper bound of the random tie-breaking jitter. `0` disables it.
    pub max_jitter: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            favorite_category: 10.0,
            associated_category: 7.0,
            rating: 5.0,
            high_rating_at: 4.0,
            fair_rating_at: 3.0,
            reviews: 3.0,
            many_reviews_at: 10,
            some_reviews_at: 5,
            price_proximity: 2.0,
            price_window: Decimal::from(5),
            same_author: 8.0,
            purchased_category: 6.0,
            max_jitter: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Category -> categories readers of it tend to like as well.
    pub affinities: HashMap<String, Vec<String>>,
    pub weights: ScoreWeights,
    /// Cart mode: list size and number of favorite categories kept.
    pub cart_limit: usize,
    pub favorite_categories: usize,
    /// Personalized mode: orders read, top categories/authors kept, list size.
    pub history_orders: usize,
    pub top_categories: usize,
    pub top_authors: usize,
    pub personalized_limit: usize,
    /// Also-bought mode: orders scanned, list size, padding threshold.
    pub also_bought_orders: usize,
    pub also_bought_limit: usize,
    pub also_bought_min: usize,
    /// Trending mode: window in days, list size, padding threshold.
    pub trending_days: i64,
    pub trending_limit: usize,
    pub trending_min: usize,
}

const DEFAULT_AFFINITIES: &[(&str, &[&str])] = &[
    ("Science-Fiction", &["Fantasy", "Thriller", "Aventure"]),
    ("Fantasy", &["Science-Fiction", "Aventure", "Manga"]),
    ("Policier", &["Roman", "Thriller"]),
    ("Thriller", &["Policier", "Science-Fiction"]),
    ("Roman", &["Policier", "Classique"]),
    ("Classique", &["Roman"]),
    ("Manga", &["Fantasy", "BD"]),
    ("BD", &["Manga", "Aventure"]),
    ("Aventure", &["Fantasy", "Science-Fiction"]),
];

fn default_affinities() -> HashMap<String, Vec<String>> {
    DEFAULT_AFFINITIES
        .iter()
        .map(|(category, related)| {
            (category.to_string(), related.iter().map(|r| r.to_string()).collect())
        })
        .collect()
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            affinities: default_affinities(),
            weights: ScoreWeights::default(),
            cart_limit: 5,
            favorite_categories: 3,
            history_orders: 20,
            top_categories: 3,
            top_authors: 3,
            personalized_limit: 10,
            also_bought_orders: 50,
            also_bought_limit: 5,
            also_bought_min: 3,
            trending_days: 30,
            trending_limit: 10,
            trending_min: 5,
        }
    }
}

impl RecommendationConfig {
    pub fn associated(&self, category: &str) -> &[String] {
        self.affinities.get(category).map(Vec::as_slice).unwrap_or(&[])
    }
}
