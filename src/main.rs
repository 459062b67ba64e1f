use bookstore_core::app_system::{setup_tracing, ShopSystem};
use bookstore_core::config::AppConfig;
use bookstore_core::domain::{
    BookCreate, Caller, NewOrder, OrderLine, PaymentMethod, PaymentRequest, ReviewInput, ShippingAddress,
};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

/// Runs a demo walkthrough of the bookstore core against in-memory stores.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file, layered over `bookstore.yaml` and under
    /// `BOOKSTORE__*` variables.
    #[clap(long, env = "BOOKSTORE_CONFIG")]
    config: Option<String>,
}

fn book(title: &str, author: &str, cents: i64, category: &str, stock: u32) -> BookCreate {
    BookCreate {
        title: title.to_string(),
        author: author.to_string(),
        price: Decimal::new(cents, 2),
        category: category.to_string(),
        stock: Some(stock),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    // Setup tracing once for the entire application
    setup_tracing();
    info!("Starting bookstore walkthrough");

    let system = ShopSystem::new(&config);

    let admin = system
        .user_client
        .register_admin("admin".into(), "admin@bookstore.test".into(), "admin-pass".into())
        .await
        .map_err(|e| e.to_string())?;
    let admin = Caller::admin(admin.id);

    let span = tracing::info_span!("catalog_seeding");
    let book_ids = async {
        let seed = [
            book("Dune", "Frank Herbert", 1290, "Science-Fiction", 5),
            book("Fondation", "Isaac Asimov", 990, "Science-Fiction", 3),
            book("Le Hobbit", "J.R.R. Tolkien", 850, "Fantasy", 4),
            book("Le Seigneur des Anneaux", "J.R.R. Tolkien", 2490, "Fantasy", 2),
            book("Les Misérables", "Victor Hugo", 1100, "Roman", 6),
        ];
        let mut ids = Vec::new();
        for create in seed {
            let created = system.book_client.create_book(&admin, create).await.map_err(|e| e.to_string())?;
            ids.push(created.id);
        }
        Ok::<_, String>(ids)
    }
    .instrument(span)
    .await?;
    info!(books = book_ids.len(), "Catalog seeded");

    system
        .user_client
        .register("alice".into(), "alice@bookstore.test".into(), "alice-pass".into())
        .await
        .map_err(|e| e.to_string())?;
    let alice = system
        .user_client
        .login("alice@bookstore.test".into(), "alice-pass".into())
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("checkout", user_id = %alice.user_id);
    let checkout = async {
        let order = system
            .order_client
            .create_order(
                &alice,
                NewOrder {
                    items: vec![OrderLine::new(book_ids[0].clone(), 1), OrderLine::new(book_ids[2].clone(), 2)],
                    shipping_address: ShippingAddress::new("12 rue des Lilas", "Lyon", "69001", "France"),
                    payment_method: Some(PaymentMethod::Card),
                },
            )
            .await
            .map_err(|e| e.to_string())?;
        info!(order_id = %order.id, total = %order.total_price, "Order placed");

        let payment = system
            .payment_client
            .create_payment(
                &alice,
                PaymentRequest {
                    order_id: order.id.clone(),
                    payment_method: None,
                    card_last4: Some("4242".into()),
                },
            )
            .await
            .map_err(|e| e.to_string())?;

        let refunded = system
            .payment_client
            .refund(&alice, payment.id.clone(), Some(Decimal::new(500, 2)), Some("Damaged cover".into()))
            .await
            .map_err(|e| e.to_string())?;
        info!(status = %refunded.status, refunded = %refunded.refunded_amount, "Partial refund booked");
        Ok::<_, String>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = checkout {
        error!(error = %e, "Checkout failed");
    }

    if let Err(e) = system
        .book_client
        .add_review(&alice, book_ids[2].clone(), ReviewInput { rating: 5, comment: "Un classique".into() })
        .await
    {
        error!(error = %e, "Review failed");
    }

    let span = tracing::info_span!("recommendations");
    async {
        let cart = system.recommendation_client.recommend(vec!["Fantasy".into()], Vec::new(), None).await;
        info!(titles = ?cart.iter().map(|b| b.title.as_str()).collect::<Vec<_>>(), "Cart recommendations");

        let personal = system.recommendation_client.personalized(&alice).await;
        info!(kind = ?personal.kind, count = personal.books.len(), "{}", personal.message);

        let trending = system.recommendation_client.trending().await;
        match serde_json::to_string(&trending) {
            Ok(body) => info!(%body, "{}", trending.message),
            Err(e) => error!(error = %e, "Could not serialize trending list"),
        }
    }
    .instrument(span)
    .await;

    match system.stats_client.admin_stats(&admin).await {
        Ok(stats) => info!(
            orders = stats.total_orders,
            revenue = %stats.total_revenue,
            out_of_stock = stats.out_of_stock,
            "Dashboard"
        ),
        Err(e) => error!(error = %e, "Dashboard unavailable"),
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Walkthrough completed successfully");
    Ok(())
}
