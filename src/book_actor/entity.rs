use super::actions::{BookAction, BookActionResult};
use super::error::BookError;
use crate::actor_framework::Entity;
use crate::domain::{Book, BookCreate, BookPatch, Review, DEFAULT_STOCK};
use chrono::Utc;
use rust_decimal::Decimal;

fn require_text(field: &str, value: &str) -> Result<(), BookError> {
    if value.trim().is_empty() {
        return Err(BookError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn require_price(price: Decimal) -> Result<(), BookError> {
    if price < Decimal::ZERO {
        return Err(BookError::ValidationError(format!("price must not be negative, got {price}")));
    }
    Ok(())
}

impl Entity for Book {
    type Id = String;
    type CreatePayload = BookCreate;
    type Patch = BookPatch;
    type Action = BookAction;
    type ActionResult = BookActionResult;
    type Error = BookError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Book from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the book
    /// * `params` - Title, author and category are required; stock defaults to
    ///   [`DEFAULT_STOCK`]
    fn from_create(id: String, params: BookCreate) -> Result<Self, BookError> {
        require_text("title", &params.title)?;
        require_text("author", &params.author)?;
        require_text("category", &params.category)?;
        require_price(params.price)?;

        Ok(Self {
            id,
            title: params.title,
            author: params.author,
            price: params.price,
            category: params.category,
            description: params.description,
            image: params.image,
            stock: params.stock.unwrap_or(DEFAULT_STOCK),
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Applies a partial edit. Blank strings are rejected like on creation.
    fn on_update(&mut self, patch: BookPatch) -> Result<(), BookError> {
        if let Some(title) = patch.title {
            require_text("title", &title)?;
            self.title = title;
        }
        if let Some(author) = patch.author {
            require_text("author", &author)?;
            self.author = author;
        }
        if let Some(price) = patch.price {
            require_price(price)?;
            self.price = price;
        }
        if let Some(category) = patch.category {
            require_text("category", &category)?;
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        Ok(())
    }

    /// Handles book-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `ReserveStock(amount)`: Decrements stock only if enough is available
    /// - `ReleaseStock(amount)`: Increments stock
    /// - `AddReview`: Appends a review and recomputes the rating aggregate
    ///
    /// # Errors
    /// Rejects zero quantities, over-reservation, ratings outside 1..=5 and a
    /// second review by the same user.
    fn handle_action(&mut self, action: BookAction) -> Result<BookActionResult, BookError> {
        match action {
            BookAction::CheckStock => Ok(BookActionResult::CheckStock(self.stock)),
            BookAction::ReserveStock(amount) => {
                if amount == 0 {
                    return Err(BookError::InvalidQuantity(amount));
                }
                if self.stock < amount {
                    return Err(BookError::InsufficientStock {
                        title: self.title.clone(),
                        requested: amount,
                        available: self.stock,
                    });
                }
                self.stock -= amount;
                Ok(BookActionResult::ReserveStock(self.stock))
            }
            BookAction::ReleaseStock(amount) => {
                if amount == 0 {
                    return Err(BookError::InvalidQuantity(amount));
                }
                self.stock = self.stock.saturating_add(amount);
                Ok(BookActionResult::ReleaseStock(self.stock))
            }
            BookAction::AddReview { user_id, name, review } => {
                if !(1..=5).contains(&review.rating) {
                    return Err(BookError::ValidationError(format!(
                        "rating must be between 1 and 5, got {}",
                        review.rating
                    )));
                }
                if self.has_review_from(&user_id) {
                    return Err(BookError::DuplicateReview(user_id));
                }
                self.reviews.push(Review {
                    user_id,
                    name,
                    rating: review.rating,
                    comment: review.comment,
                    created_at: Utc::now(),
                });
                self.recompute_rating();
                Ok(BookActionResult::AddReview(self.clone()))
            }
        }
    }
}
