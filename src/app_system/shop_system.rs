use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::clients::{BookClient, OrderClient, PaymentClient, RecommendationClient, StatsClient, UserClient};
use crate::config::AppConfig;
use crate::domain::{Book, Order, Payment, User};
use crate::recommendation::RecommendationEngine;
use crate::user_actor::{CredentialHasher, Sha256Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Spawns the actor for one collection. Ids are `<prefix>_<n>`, counting from 1.
fn spawn_store<T: Entity<Id = String>>(prefix: &'static str, buffer_size: usize) -> (ResourceClient<T>, JoinHandle<()>) {
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst));
    let (actor, client) = ResourceActor::<T>::new(buffer_size, next_id);
    (client, tokio::spawn(actor.run()))
}

/// The bookstore core: one actor per collection plus the clients wired on
/// top of them.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct ShopSystem {
    pub user_client: UserClient,
    pub book_client: BookClient,
    pub order_client: OrderClient,
    pub payment_client: PaymentClient,
    pub recommendation_client: RecommendationClient,
    pub stats_client: StatsClient,
    handles: Vec<JoinHandle<()>>,
}

impl ShopSystem {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_hasher(config, Arc::new(Sha256Hasher))
    }

    pub fn with_hasher(config: &AppConfig, hasher: Arc<dyn CredentialHasher>) -> Self {
        let buffer = config.system.actor_buffer_size;

        let (users, user_handle) = spawn_store::<User>("user", buffer);
        let user_client = UserClient::new(users, hasher);

        let (books, book_handle) = spawn_store::<Book>("book", buffer);
        let book_client = BookClient::new(books, user_client.clone());

        let (orders, order_handle) = spawn_store::<Order>("order", buffer);
        let order_client = OrderClient::new(orders, book_client.clone(), config.orders.page_limit);

        let (payments, payment_handle) = spawn_store::<Payment>("payment", buffer);
        let payment_client = PaymentClient::new(
            payments,
            order_client.clone(),
            config.payments.default_refund_reason.clone(),
            config.orders.page_limit,
        );

        let recommendation_client = RecommendationClient::new(
            book_client.clone(),
            order_client.clone(),
            RecommendationEngine::new(config.recommendations.clone()),
        );

        let stats_client = StatsClient::new(
            user_client.clone(),
            book_client.clone(),
            order_client.clone(),
            payment_client.clone(),
            config.stats.clone(),
        );

        info!(actor_buffer_size = buffer, "Shop system started");
        Self {
            user_client,
            book_client,
            order_client,
            payment_client,
            recommendation_client,
            stats_client,
            handles: vec![user_handle, book_handle, order_handle, payment_handle],
        }
    }

    /// Drops every client, which closes the actor inboxes, then waits for
    /// the actors to drain.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.stats_client);
        drop(self.recommendation_client);
        drop(self.payment_client);
        drop(self.order_client);
        drop(self.book_client);
        drop(self.user_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
