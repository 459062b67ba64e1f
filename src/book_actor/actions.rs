use crate::domain::{Book, ReviewInput};

/// Custom actions for Book entities.
///
/// Each one is a single atomic read-modify-write on one book.
#[derive(Debug, Clone)]
pub enum BookAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Conditionally takes `u32` units: fails without touching the stock when
    /// fewer are available.
    ReserveStock(u32),
    /// Puts `u32` units back. Always succeeds.
    ReleaseStock(u32),
    /// Attaches a review, refusing a second review from the same user.
    AddReview {
        user_id: String,
        name: String,
        review: ReviewInput,
    },
}

/// Results from BookActions - variants match 1:1 with BookAction
#[derive(Debug, Clone)]
pub enum BookActionResult {
    /// Current stock level
    CheckStock(u32),
    /// Stock left after the reservation
    ReserveStock(u32),
    /// Stock after the release
    ReleaseStock(u32),
    /// The book with its recomputed rating
    AddReview(Book),
}
