use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock given to a new book when the creator does not specify one.
pub const DEFAULT_STOCK: u32 = 10;

/// A reader's review. Owned by its book; `user_id` is only an authorship record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: String,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub category: String,
    pub description: String,
    pub image: String,
    pub stock: u32,
    pub rating: f64,
    pub num_reviews: u32,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a book to the catalog.
#[derive(Debug, Clone, Default)]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub category: String,
    pub description: String,
    pub image: String,
    pub stock: Option<u32>,
}

/// Partial update of a book's editorial fields and stock.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub stock: Option<u32>,
}

/// A review as submitted by a reader, before it is attached to a book.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub rating: u8,
    pub comment: String,
}

impl Book {
    /// Builds an unreviewed book. Mostly useful for tests and seeding.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            price,
            category: category.into(),
            description: String::new(),
            image: String::new(),
            stock,
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn has_review_from(&self, user_id: &str) -> bool {
        self.reviews.iter().any(|r| r.user_id == user_id)
    }

    /// Re-derives `rating` and `num_reviews` from `reviews`.
    pub fn recompute_rating(&mut self) {
        self.num_reviews = self.reviews.len() as u32;
        self.rating = if self.reviews.is_empty() {
            0.0
        } else {
            let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
            f64::from(sum) / self.reviews.len() as f64
        };
    }

    /// Appends reviews with the given ratings from synthetic readers.
    pub fn with_ratings(mut self, ratings: &[u8]) -> Self {
        for (i, rating) in ratings.iter().enumerate() {
            self.reviews.push(Review {
                user_id: format!("reader_{}", i + 1),
                name: format!("reader {}", i + 1),
                rating: *rating,
                comment: String::new(),
                created_at: self.created_at,
            });
        }
        self.recompute_rating();
        self
    }
}
