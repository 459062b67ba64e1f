use crate::actor_framework::ResourceClient;
use crate::book_actor::{BookAction, BookActionResult, BookError};
use crate::clients::UserClient;
use crate::domain::{Book, BookCreate, BookPatch, Caller, OrderLine, Page, ReviewInput};
use crate::user_actor::UserError;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, warn};

/// Category filters that mean "the whole catalog".
const ALL_CATEGORIES: [&str; 2] = ["Tous", "All"];

/// Merges lines for the same book, keeping first-seen order. A combined
/// quantity that does not fit a `u32` is rejected.
pub(crate) fn aggregate_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, BookError> {
    let mut merged: Vec<OrderLine> = Vec::new();
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.qty = existing.qty.checked_add(line.qty).ok_or_else(|| {
                    BookError::ValidationError(format!("total quantity for {} is too large", line.product_id))
                })?;
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}

/// Client for the catalog store and the stock reservation engine.
#[derive(Clone)]
pub struct BookClient {
    inner: ResourceClient<Book>,
    user_client: UserClient,
}

impl_client_methods!(BookClient, Book, BookError, book);

impl BookClient {
    pub fn new(inner: ResourceClient<Book>, user_client: UserClient) -> Self {
        Self { inner, user_client }
    }

    #[instrument(skip(self, book), fields(title = %book.title))]
    pub async fn create_book(&self, caller: &Caller, book: BookCreate) -> Result<Book, BookError> {
        require_admin!(caller, BookError);
        debug!("Sending request");
        let id = self.inner.create(book).await?;
        info!(book_id = %id, "Book added to catalog");
        self.require_book(id).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_book(&self, caller: &Caller, id: String, patch: BookPatch) -> Result<Book, BookError> {
        require_admin!(caller, BookError);
        debug!("Sending request");
        self.inner.update(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn delete_book(&self, caller: &Caller, id: String) -> Result<(), BookError> {
        require_admin!(caller, BookError);
        debug!("Sending request");
        self.inner.delete(id).await?;
        info!("Book removed from catalog");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_book(&self, id: String) -> Result<Book, BookError> {
        self.require_book(id).await
    }

    /// Catalog listing in natural order; `None`, `"Tous"` and `"All"` list
    /// every category.
    #[instrument(skip(self))]
    pub async fn list_books(&self, category: Option<String>) -> Result<Vec<Book>, BookError> {
        debug!("Sending request");
        match category.filter(|c| !ALL_CATEGORIES.contains(&c.as_str())) {
            Some(category) => self.inner.find(move |b: &Book| b.category == category).await,
            None => self.inner.find(|_: &Book| true).await,
        }
    }

    /// Case-insensitive substring match on title or author.
    #[instrument(skip(self))]
    pub async fn search_books(&self, query: String) -> Result<Vec<Book>, BookError> {
        debug!("Sending request");
        let needle = query.trim().to_lowercase();
        self.inner
            .find(move |b: &Book| {
                b.title.to_lowercase().contains(&needle) || b.author.to_lowercase().contains(&needle)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_books_paged(&self, caller: &Caller, page: usize, limit: usize) -> Result<Page<Book>, BookError> {
        require_admin!(caller, BookError);
        let books = self.list_books(None).await?;
        Ok(Page::paginate(books, page, limit))
    }

    /// Attaches the caller's review; the reviewer name is their username.
    #[instrument(skip(self, review), fields(rating = review.rating))]
    pub async fn add_review(&self, caller: &Caller, book_id: String, review: ReviewInput) -> Result<Book, BookError> {
        let reviewer = self
            .user_client
            .require_user(caller.user_id.clone())
            .await
            .map_err(|e| match e {
                UserError::NotFound(id) => BookError::ReviewerNotFound(id),
                other => BookError::ActorCommunicationError(other.to_string()),
            })?;

        debug!("Sending request");
        let action = BookAction::AddReview {
            user_id: reviewer.id,
            name: reviewer.username,
            review,
        };
        match self.inner.perform_action(book_id, action).await? {
            BookActionResult::AddReview(book) => {
                info!(num_reviews = book.num_reviews, rating = book.rating, "Review added");
                Ok(book)
            }
            _ => Err(BookError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, BookError> {
        debug!("Sending request");
        match self.inner.perform_action(id, BookAction::CheckStock).await? {
            BookActionResult::CheckStock(level) => Ok(level),
            _ => Err(BookError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// All-or-nothing gate run before any stock moves.
    ///
    /// Quantities for the same book are summed before comparing against its
    /// stock. Returns the checked books keyed by id.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn check_availability(&self, lines: &[OrderLine]) -> Result<HashMap<String, Book>, BookError> {
        let mut books = HashMap::new();
        for line in aggregate_lines(lines)? {
            if line.qty == 0 {
                return Err(BookError::InvalidQuantity(line.qty));
            }
            let book = self.require_book(line.product_id.clone()).await?;
            if book.stock < line.qty {
                warn!(book_id = %book.id, requested = line.qty, available = book.stock, "Insufficient stock");
                return Err(BookError::InsufficientStock {
                    title: book.title,
                    requested: line.qty,
                    available: book.stock,
                });
            }
            books.insert(book.id.clone(), book);
        }
        Ok(books)
    }

    /// Conditionally decrements every line. If any book cannot cover its
    /// quantity, the decrements already applied are put back and the whole
    /// reservation fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn reserve(&self, lines: &[OrderLine]) -> Result<(), BookError> {
        let mut applied: Vec<OrderLine> = Vec::new();
        for line in aggregate_lines(lines)? {
            debug!(book_id = %line.product_id, qty = line.qty, "Reserving stock");
            match self
                .inner
                .perform_action(line.product_id.clone(), BookAction::ReserveStock(line.qty))
                .await
            {
                Ok(_) => applied.push(line),
                Err(e) => {
                    warn!(book_id = %line.product_id, error = %e, "Reservation failed, compensating");
                    if let Err(release_err) = self.release(&applied).await {
                        error!(error = %release_err, "Compensation failed");
                    }
                    return Err(e);
                }
            }
        }
        info!("Stock reserved");
        Ok(())
    }

    /// Puts stock back. Books deleted since the order was placed are skipped.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn release(&self, lines: &[OrderLine]) -> Result<(), BookError> {
        for line in aggregate_lines(lines)? {
            debug!(book_id = %line.product_id, qty = line.qty, "Releasing stock");
            match self
                .inner
                .perform_action(line.product_id.clone(), BookAction::ReleaseStock(line.qty))
                .await
            {
                Ok(_) => {}
                Err(BookError::NotFound(id)) => warn!(book_id = %id, "Book no longer in catalog, skipping"),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
