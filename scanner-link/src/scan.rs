//! Inbound-scan consumer
//!
//! Takes validated scan codes off the channel, suppresses rapid repeats,
//! and turns each accepted scan into a catalog lookup plus an order
//! insertion.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::message::{Notice, NoticeCategory};
use tokio::time::Instant;

use crate::catalog::CatalogLookup;
use crate::notify::Notifier;
use crate::order::ActiveOrder;

/// Optional cue fired when a scan is accepted (a short beep on most
/// registers). A cue failure is swallowed, never surfaced.
pub trait ScanCue: Send + Sync {
    fn play(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Consumes scan codes forwarded by the event dispatcher.
pub struct ScanConsumer {
    catalog: Arc<dyn CatalogLookup>,
    order: Arc<Mutex<ActiveOrder>>,
    notifier: Notifier,
    cue: Option<Arc<dyn ScanCue>>,
    dedup_window: Duration,
    last_scan: Option<(String, Instant)>,
}

impl ScanConsumer {
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        order: Arc<Mutex<ActiveOrder>>,
        notifier: Notifier,
        dedup_window: Duration,
    ) -> Self {
        Self {
            catalog,
            order,
            notifier,
            cue: None,
            dedup_window,
            last_scan: None,
        }
    }

    pub fn with_cue(mut self, cue: Arc<dyn ScanCue>) -> Self {
        self.cue = Some(cue);
        self
    }

    /// Handle one scanned code.
    ///
    /// Blank codes and in-window repeats are dropped here; everything
    /// else is recorded, announced, and looked up. The lookup runs on its
    /// own task so a slow search never delays heartbeat replies in the
    /// channel loop.
    pub fn on_scan(&mut self, code: &str) {
        let code = code.trim();
        if code.is_empty() {
            tracing::debug!("blank scan code ignored");
            return;
        }

        let now = Instant::now();
        if let Some((last, accepted_at)) = &self.last_scan {
            if last == code && now.duration_since(*accepted_at) < self.dedup_window {
                tracing::debug!(%code, "duplicate scan inside window, dropped");
                return;
            }
        }
        self.last_scan = Some((code.to_string(), now));

        tracing::info!(%code, "scan accepted");
        self.notifier.send(Notice::success(
            NoticeCategory::Scan,
            "Scanned",
            format!("Code {code} received"),
        ));

        if let Some(cue) = &self.cue {
            if let Err(e) = cue.play() {
                tracing::debug!("scan cue failed: {e}");
            }
        }

        let catalog = self.catalog.clone();
        let order = self.order.clone();
        let notifier = self.notifier.clone();
        let code = code.to_string();
        tokio::spawn(async move {
            lookup_and_insert(catalog, order, notifier, code).await;
        });
    }
}

async fn lookup_and_insert(
    catalog: Arc<dyn CatalogLookup>,
    order: Arc<Mutex<ActiveOrder>>,
    notifier: Notifier,
    code: String,
) {
    let products = match catalog.search(&code).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(%code, "catalog lookup failed: {e}");
            notifier.send(Notice::error(
                NoticeCategory::Lookup,
                "Search failed",
                "Product search failed, rescan to retry",
            ));
            return;
        }
    };

    match products.as_slice() {
        [] => {
            tracing::info!(%code, "no catalog match");
            notifier.send(Notice::warning(
                NoticeCategory::Lookup,
                "Not found",
                format!("No product matches {code}"),
            ));
        }
        [product] => {
            order.lock().unwrap().add_product(product);
            tracing::info!(%code, product_id = product.id, "product added to order");
            notifier.send(Notice::success(
                NoticeCategory::Lookup,
                "Added",
                format!("{} added to order", product.name),
            ));
        }
        many => {
            tracing::info!(%code, matches = many.len(), "ambiguous scan");
            let data = serde_json::to_value(many).unwrap_or(serde_json::Value::Null);
            notifier.send(
                Notice::info(
                    NoticeCategory::Lookup,
                    "Multiple matches",
                    format!("{} products match {code}, pick one", many.len()),
                )
                .with_data(data),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::message::NoticeLevel;
    use shared::models::Product;

    use crate::error::CatalogError;

    /// Records queries, answers from a fixed table.
    struct TableCatalog {
        queries: Mutex<Vec<String>>,
        products: Vec<Product>,
    }

    impl TableCatalog {
        fn new(products: Vec<Product>) -> Arc<Self> {
            Arc::new(Self {
                queries: Mutex::new(Vec::new()),
                products,
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogLookup for TableCatalog {
        async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self
                .products
                .iter()
                .filter(|p| p.sku == query)
                .cloned()
                .collect())
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl CatalogLookup for FailingCatalog {
        async fn search(&self, _query: &str) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError::InvalidResponse("boom".into()))
        }
    }

    fn product(id: i64, sku: &str) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            selling_price: Decimal::new(199, 2),
            stock: 5,
            sku: sku.to_string(),
        }
    }

    async fn settle() {
        // Let spawned lookup tasks run to completion on the test runtime.
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_inside_window_is_dropped() {
        let catalog = TableCatalog::new(vec![]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog.clone(),
            order,
            Notifier::default(),
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        consumer.on_scan("X123");
        settle().await;

        assert_eq!(catalog.queries(), vec!["X123"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_outside_window_is_forwarded() {
        let catalog = TableCatalog::new(vec![]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog.clone(),
            order,
            Notifier::default(),
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        tokio::time::advance(Duration::from_millis(2000)).await;
        consumer.on_scan("X123");
        settle().await;

        assert_eq!(catalog.queries(), vec!["X123", "X123"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_codes_are_not_deduplicated() {
        let catalog = TableCatalog::new(vec![]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog.clone(),
            order,
            Notifier::default(),
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        consumer.on_scan("Y456");
        settle().await;

        assert_eq!(catalog.queries(), vec!["X123", "Y456"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_code_is_a_no_op() {
        let catalog = TableCatalog::new(vec![]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog.clone(),
            order,
            Notifier::default(),
            Duration::from_millis(2000),
        );

        consumer.on_scan("   ");
        consumer.on_scan("");
        settle().await;

        assert!(catalog.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_match_inserted_at_quantity_one() {
        let catalog = TableCatalog::new(vec![product(1, "X123")]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog,
            order.clone(),
            Notifier::default(),
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        settle().await;

        let order = order.lock().unwrap();
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].quantity, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescan_outside_window_increments_quantity() {
        let catalog = TableCatalog::new(vec![product(1, "X123")]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog,
            order.clone(),
            Notifier::default(),
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        settle().await;
        tokio::time::advance(Duration::from_millis(2500)).await;
        consumer.on_scan("X123");
        settle().await;

        let order = order.lock().unwrap();
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].quantity, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_emits_not_found_and_leaves_order_untouched() {
        let catalog = TableCatalog::new(vec![]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();
        let mut consumer = ScanConsumer::new(
            catalog,
            order.clone(),
            notifier,
            Duration::from_millis(2000),
        );

        consumer.on_scan("GHOST");
        settle().await;

        assert!(order.lock().unwrap().is_empty());

        // First the acceptance notice, then the lookup outcome.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.category, NoticeCategory::Scan);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.category, NoticeCategory::Lookup);
        assert_eq!(second.level, NoticeLevel::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ambiguous_match_carries_candidates() {
        let catalog = TableCatalog::new(vec![product(1, "X123"), product(2, "X123")]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();
        let mut consumer = ScanConsumer::new(
            catalog,
            order.clone(),
            notifier,
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        settle().await;

        // No automatic insertion on ambiguity
        assert!(order.lock().unwrap().is_empty());

        let _scanned = rx.recv().await.unwrap();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.category, NoticeCategory::Lookup);
        let data = outcome.data.expect("candidate set attached");
        assert_eq!(data.as_array().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_failure_is_reported_not_propagated() {
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();
        let mut consumer = ScanConsumer::new(
            Arc::new(FailingCatalog),
            order.clone(),
            notifier,
            Duration::from_millis(2000),
        );

        consumer.on_scan("X123");
        settle().await;

        assert!(order.lock().unwrap().is_empty());
        let _scanned = rx.recv().await.unwrap();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.level, NoticeLevel::Error);
        assert_eq!(outcome.category, NoticeCategory::Lookup);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cue_failure_is_swallowed() {
        struct BrokenCue;
        impl ScanCue for BrokenCue {
            fn play(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                Err("no audio device".into())
            }
        }

        let catalog = TableCatalog::new(vec![]);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let mut consumer = ScanConsumer::new(
            catalog.clone(),
            order,
            Notifier::default(),
            Duration::from_millis(2000),
        )
        .with_cue(Arc::new(BrokenCue));

        consumer.on_scan("X123");
        settle().await;

        // Scan still went through
        assert_eq!(catalog.queries(), vec!["X123"]);
    }
}
