//! # Mock Framework
//!
//! Utilities for testing the orchestrating clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then helpers
//! like [`expect_get`] or [`expect_action`] to assert the exact request
//! sequence a client sends and to answer it.

use crate::actor_framework::{Entity, Predicate, ResourceClient, ResourceRequest, Response};
use tokio::sync::mpsc;

pub type MockReceiver<T> = mpsc::Receiver<ResourceRequest<T>>;

/// Creates a client whose requests land on a receiver the test controls
/// instead of a running actor.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, MockReceiver<T>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut MockReceiver<T>,
) -> Option<(T::CreatePayload, Response<T::Id, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut MockReceiver<T>) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Find request
pub async fn expect_find<T: Entity>(receiver: &mut MockReceiver<T>) -> Option<(Predicate<T>, Response<Vec<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Find { predicate, respond_to }) => Some((predicate, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut MockReceiver<T>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_actor::{BookAction, BookActionResult, BookError};
    use crate::clients::{BookClient, OrderClient, UserClient};
    use crate::domain::{
        Book, Caller, NewOrder, Order, OrderLine, OrderStatus, ShippingAddress, User, UserCreate, Role,
    };
    use crate::order_actor::{OrderAction, OrderActionResult, OrderError, StockRelease};
    use crate::user_actor::Sha256Hasher;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn address() -> ShippingAddress {
        ShippingAddress::new("1 rue Lepic", "Paris", "75018", "France")
    }

    fn book_client() -> (BookClient, MockReceiver<Book>) {
        let (users, _user_rx) = create_mock_client::<User>(10);
        let (books, book_rx) = create_mock_client::<Book>(10);
        (BookClient::new(books, UserClient::new(users, Arc::new(Sha256Hasher))), book_rx)
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            let user = UserCreate {
                username: "test".to_string(),
                email: "test@example.com".to_string(),
                password_hash: "salt$digest".to_string(),
                role: Role::User,
            };
            client.create(user).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.username, "test");
        responder.send(Ok("user_1".to_string())).unwrap();

        assert_eq!(create_task.await.unwrap(), Ok("user_1".to_string()));
    }

    #[tokio::test]
    async fn test_order_creation_request_sequence() {
        let (book_client, mut book_rx) = book_client();
        let (orders, mut order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(orders, book_client, 20);

        let order_task = tokio::spawn(async move {
            let order = NewOrder {
                items: vec![OrderLine::new("book_1", 2)],
                shipping_address: address(),
                payment_method: None,
            };
            order_client.create_order(&Caller::user("user_1"), order).await
        });

        // availability check reads the book
        let (book_id, responder) = expect_get(&mut book_rx).await.expect("Expected Book Get");
        assert_eq!(book_id, "book_1");
        let book = Book::new("book_1", "Dune", "Frank Herbert", dec!(9.90), "Science-Fiction", 5);
        responder.send(Ok(Some(book))).unwrap();

        // then reserves
        let (book_id, action, responder) = expect_action(&mut book_rx).await.expect("Expected Book Action");
        assert_eq!(book_id, "book_1");
        assert!(matches!(action, BookAction::ReserveStock(2)));
        responder.send(Ok(BookActionResult::ReserveStock(3))).unwrap();

        // then stores the priced order
        let (payload, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(payload.user_id, "user_1");
        assert_eq!(payload.items[0].price, dec!(9.90));
        assert_eq!(payload.items[0].title, "Dune");
        responder.send(Ok("order_1".to_string())).unwrap();

        let (order_id, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        let stored = Order {
            id: order_id,
            user_id: payload.user_id,
            total_price: dec!(19.80),
            items: payload.items,
            shipping_address: payload.shipping_address,
            payment_method: payload.payment_method,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            status: OrderStatus::Pending,
            payment_id: None,
            stock_released: false,
            created_at: Utc::now(),
        };
        responder.send(Ok(Some(stored))).unwrap();

        let order = order_task.await.unwrap().unwrap();
        assert_eq!(order.total_price, dec!(19.80));
    }

    #[tokio::test]
    async fn test_failed_reservation_compensates_earlier_books() {
        let (book_client, mut book_rx) = book_client();

        let reserve_task = tokio::spawn(async move {
            book_client
                .reserve(&[OrderLine::new("book_1", 1), OrderLine::new("book_2", 4)])
                .await
        });

        let (_, _, responder) = expect_action(&mut book_rx).await.expect("Expected first reservation");
        responder.send(Ok(BookActionResult::ReserveStock(0))).unwrap();

        let (book_id, _, responder) = expect_action(&mut book_rx).await.expect("Expected second reservation");
        assert_eq!(book_id, "book_2");
        let shortage = BookError::InsufficientStock { title: "Emma".into(), requested: 4, available: 1 };
        responder.send(Err(shortage.clone())).unwrap();

        let (book_id, action, responder) = expect_action(&mut book_rx).await.expect("Expected compensation");
        assert_eq!(book_id, "book_1");
        assert!(matches!(action, BookAction::ReleaseStock(1)));
        responder.send(Ok(BookActionResult::ReleaseStock(1))).unwrap();

        assert_eq!(reserve_task.await.unwrap(), Err(shortage));
    }

    #[tokio::test]
    async fn test_cancel_returns_only_released_lines() {
        let (book_client, mut book_rx) = book_client();
        let (orders, mut order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(orders, book_client, 20);

        let cancel_task =
            tokio::spawn(async move { order_client.cancel_order(&Caller::user("user_1"), "order_1".into()).await });

        let mut order = Order {
            id: "order_1".into(),
            user_id: "user_1".into(),
            items: Vec::new(),
            shipping_address: address(),
            payment_method: Default::default(),
            total_price: dec!(0),
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            status: OrderStatus::Pending,
            payment_id: None,
            stock_released: true,
            created_at: Utc::now(),
        };
        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected ownership lookup");
        responder.send(Ok(Some(order.clone()))).unwrap();

        let (_, action, responder) = expect_action(&mut order_rx).await.expect("Expected Cancel");
        assert!(matches!(action, OrderAction::Cancel));
        order.status = OrderStatus::Cancelled;
        let release = StockRelease { order, lines: Vec::new() };
        responder.send(Ok(OrderActionResult::Cancel(release))).unwrap();

        let cancelled = cancel_task.await.unwrap().unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        // nothing to give back, so the catalog was never contacted
        assert!(book_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_mine_filters_by_owner_newest_first() {
        let (book_client, _book_rx) = book_client();
        let (orders, mut order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(orders, book_client, 20);

        let task = tokio::spawn(async move { order_client.list_mine(&Caller::user("user_1")).await });

        let (predicate, responder) = expect_find(&mut order_rx).await.expect("Expected Find");
        let stored: Vec<Order> = ["order_1", "order_2", "order_3"]
            .iter()
            .zip(["user_1", "user_2", "user_1"])
            .map(|(id, user)| Order {
                id: id.to_string(),
                user_id: user.to_string(),
                items: Vec::new(),
                shipping_address: address(),
                payment_method: Default::default(),
                total_price: dec!(0),
                is_paid: false,
                paid_at: None,
                is_delivered: false,
                status: OrderStatus::Pending,
                payment_id: None,
                stock_released: false,
                created_at: Utc::now(),
            })
            .collect();
        let matching: Vec<Order> = stored.into_iter().filter(|o| predicate(o)).collect();
        responder.send(Ok(matching)).unwrap();

        let mine = task.await.unwrap().unwrap();
        let ids: Vec<&str> = mine.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["order_3", "order_1"]);
    }

    #[tokio::test]
    async fn test_foreign_order_is_refused_before_any_mutation() {
        let (book_client, _book_rx) = book_client();
        let (orders, mut order_rx) = create_mock_client::<Order>(10);
        let order_client = OrderClient::new(orders, book_client, 20);

        let task =
            tokio::spawn(async move { order_client.cancel_order(&Caller::user("mallory"), "order_1".into()).await });

        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected ownership lookup");
        let order = Order {
            id: "order_1".into(),
            user_id: "user_1".into(),
            items: Vec::new(),
            shipping_address: address(),
            payment_method: Default::default(),
            total_price: dec!(0),
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            status: OrderStatus::Pending,
            payment_id: None,
            stock_released: false,
            created_at: Utc::now(),
        };
        responder.send(Ok(Some(order))).unwrap();

        assert!(matches!(task.await.unwrap(), Err(OrderError::AccessDenied(_))));
        assert!(order_rx.try_recv().is_err());
    }
}
