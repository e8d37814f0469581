//! End-to-end engine flows against the in-memory collaborator:
//! optimistic transitions racing the reconciliation feed.

use board_engine::{
    BoardConfig, BoardNotice, CardMove, CommitOutcome, MemoryCollaborator, OrderBoard,
    ReconciliationFeed,
};
use shared::message::BoardSync;
use shared::models::{Order, OrderCategory, OrderFilter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn order(id: &str, category: OrderCategory, stage: &str) -> Order {
    Order {
        id: id.to_string(),
        category,
        stage: Some(stage.to_string()),
        items: vec![],
        total_amount: 0.0,
        submitted_at: 0,
        form_owner_id: "form-1".to_string(),
    }
}

struct Harness {
    board: Arc<OrderBoard>,
    store: MemoryCollaborator,
    events: tokio::sync::mpsc::UnboundedSender<BoardSync>,
    worker: tokio::task::JoinHandle<()>,
    shutdown: tokio_util::sync::CancellationToken,
}

async fn start(orders: Vec<Order>, config: BoardConfig) -> Harness {
    init_tracing();
    let store = MemoryCollaborator::new();
    store.seed(orders);
    let board = Arc::new(OrderBoard::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        config,
    ));
    board.load().await.unwrap();

    let (events, feed) = ReconciliationFeed::channel(board.clone());
    let shutdown = feed.shutdown_token();
    let worker = tokio::spawn(feed.run());

    Harness {
        board,
        store,
        events,
        worker,
        shutdown,
    }
}

async fn await_refreshed(rx: &mut broadcast::Receiver<BoardNotice>) {
    timeout(Duration::from_secs(2), async {
        loop {
            if let BoardNotice::Refreshed { .. } = rx.recv().await.unwrap() {
                break;
            }
        }
    })
    .await
    .expect("no refresh within timeout");
}

fn stage_of(board: &OrderBoard, id: &str) -> Option<String> {
    board
        .snapshot()
        .iter()
        .find(|o| o.id == id)
        .and_then(|o| o.stage.clone())
}

#[tokio::test]
async fn test_failed_advance_reverts_and_reconciles_once() {
    let h = start(
        vec![order("o1", OrderCategory::Delivery, "pronto")],
        BoardConfig::default(),
    )
    .await;
    let mut notices = h.board.subscribe();
    let fetches_before = h.store.fetch_count();

    h.store.fail_commits(true);
    let outcome = h.board.advance("o1").await;
    assert!(matches!(outcome, CommitOutcome::Failed { .. }));

    // Rolled back immediately, then reconciled by exactly one fetch.
    let failed = timeout(Duration::from_secs(2), notices.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(failed, BoardNotice::TransitionFailed { .. }));
    await_refreshed(&mut notices).await;

    assert_eq!(stage_of(&h.board, "o1").as_deref(), Some("pronto"));
    assert_eq!(h.store.fetch_count(), fetches_before + 1);
}

#[tokio::test]
async fn test_advance_is_visible_before_store_resolves() {
    let h = start(
        vec![order("o1", OrderCategory::Delivery, "pronto")],
        BoardConfig::default(),
    )
    .await;
    h.store.set_commit_delay(Some(Duration::from_millis(80)));

    let board = h.board.clone();
    let pending = tokio::spawn(async move { board.advance("o1").await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(stage_of(&h.board, "o1").as_deref(), Some("saiu_para_entrega"));
    assert_eq!(pending.await.unwrap(), CommitOutcome::Committed);
    assert_eq!(h.store.stage_of("o1").as_deref(), Some("saiu_para_entrega"));
}

#[tokio::test]
async fn test_push_event_adds_order_without_disturbing_pending_transition() {
    let h = start(
        vec![order("o1", OrderCategory::Delivery, "pronto")],
        BoardConfig::default(),
    )
    .await;
    let mut notices = h.board.subscribe();
    h.store.set_commit_delay(Some(Duration::from_millis(100)));

    let board = h.board.clone();
    let pending = tokio::spawn(async move { board.advance("o1").await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Another actor creates an order the board has never seen.
    let external = order("o9", OrderCategory::Delivery, "novo");
    h.store.insert(external.clone());
    h.events
        .send(BoardSync::Create { order: external })
        .unwrap();
    await_refreshed(&mut notices).await;

    // The new order arrived and the in-flight optimistic stage survived.
    assert!(h.board.snapshot().iter().any(|o| o.id == "o9"));
    assert_eq!(stage_of(&h.board, "o1").as_deref(), Some("saiu_para_entrega"));
    assert_eq!(pending.await.unwrap(), CommitOutcome::Committed);
}

#[tokio::test]
async fn test_delete_event_drops_order_after_refresh() {
    let h = start(
        vec![
            order("o1", OrderCategory::DineIn, "novo"),
            order("o2", OrderCategory::DineIn, "preparando"),
        ],
        BoardConfig::default(),
    )
    .await;
    let mut notices = h.board.subscribe();

    h.store.remove("o2");
    h.events
        .send(BoardSync::Delete {
            order_id: "o2".to_string(),
        })
        .unwrap();
    await_refreshed(&mut notices).await;

    let ids: Vec<String> = h.board.snapshot().iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids, vec!["o1"]);
}

#[tokio::test]
async fn test_event_outside_category_scope_is_ignored() {
    let h = start(
        vec![order("o1", OrderCategory::Delivery, "novo")],
        BoardConfig::with_filter(OrderFilter::for_category(OrderCategory::Delivery)),
    )
    .await;
    let fetches_before = h.store.fetch_count();

    h.events
        .send(BoardSync::Update {
            order: order("x1", OrderCategory::DineIn, "novo"),
        })
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.store.fetch_count(), fetches_before);
}

#[tokio::test]
async fn test_drag_between_columns_lands_at_index() {
    let h = start(
        vec![
            order("o2", OrderCategory::DineIn, "novo"),
            order("o3", OrderCategory::DineIn, "confirmado"),
            order("o4", OrderCategory::DineIn, "confirmado"),
        ],
        BoardConfig::default(),
    )
    .await;

    let mv = CardMove {
        order_id: "o2".to_string(),
        from_stage: "novo".to_string(),
        to_stage: "confirmado".to_string(),
        to_index: 1,
    };
    assert_eq!(h.board.move_card(mv).await, CommitOutcome::Committed);

    let confirmed: Vec<String> = h
        .board
        .column("confirmado")
        .iter()
        .map(|o| o.id.clone())
        .collect();
    assert_eq!(confirmed, vec!["o3", "o2", "o4"]);
    assert!(h.board.column("novo").is_empty());
}

#[tokio::test]
async fn test_rapid_double_advance_commits_once() {
    let h = start(
        vec![order("o1", OrderCategory::Delivery, "novo")],
        BoardConfig::default(),
    )
    .await;
    h.store.set_commit_delay(Some(Duration::from_millis(80)));

    let board = h.board.clone();
    let first = tokio::spawn(async move { board.advance("o1").await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = h.board.advance("o1").await;

    assert_eq!(second, CommitOutcome::AlreadyPending);
    assert_eq!(first.await.unwrap(), CommitOutcome::Committed);
    assert_eq!(h.store.commit_count(), 1);
    assert_eq!(stage_of(&h.board, "o1").as_deref(), Some("confirmado"));
}

#[tokio::test]
async fn test_shutdown_token_stops_worker() {
    let h = start(vec![], BoardConfig::default()).await;
    h.shutdown.cancel();
    timeout(Duration::from_secs(2), h.worker)
        .await
        .expect("worker did not stop")
        .unwrap();
}
