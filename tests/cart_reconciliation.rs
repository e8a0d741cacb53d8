use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use storefront_api::sync::{
    Applied, LocalCartItem, LocalStore, MemoryStore, Phase, RemoteCollection, RemoteError,
    SyncItem, SyncSession,
};

type Key = <LocalCartItem as SyncItem>::Key;

fn line(id: &str, price: i64, quantity: i64) -> LocalCartItem {
    LocalCartItem {
        product_id: id.to_string(),
        name: id.to_string(),
        price: Some(price),
        populated_price: None,
        image: None,
        quantity,
        size: None,
        color: None,
    }
}

#[derive(Default)]
struct RemoteState {
    items: Vec<LocalCartItem>,
    // One entry consumed per fetch; an empty plan means success.
    fetch_plan: VecDeque<Result<(), RemoteError>>,
    // Adds for this key fail with the given error.
    add_error: Option<(Key, RemoteError)>,
    // Returned by the next mutation call, then cleared.
    mutation_error: Option<RemoteError>,
    fetch_calls: usize,
}

#[derive(Clone, Default)]
struct MockRemote(Rc<RefCell<RemoteState>>);

impl MockRemote {
    fn with_items(items: Vec<LocalCartItem>) -> Self {
        let remote = Self::default();
        remote.0.borrow_mut().items = items;
        remote
    }

    fn items(&self) -> Vec<LocalCartItem> {
        self.0.borrow().items.clone()
    }

    fn fetch_calls(&self) -> usize {
        self.0.borrow().fetch_calls
    }

    fn plan_fetches(&self, plan: Vec<Result<(), RemoteError>>) {
        self.0.borrow_mut().fetch_plan = plan.into();
    }

    fn fail_adds_for(&self, key: Key, error: RemoteError) {
        self.0.borrow_mut().add_error = Some((key, error));
    }

    fn fail_next_mutation(&self, error: RemoteError) {
        self.0.borrow_mut().mutation_error = Some(error);
    }
}

impl RemoteCollection<LocalCartItem> for MockRemote {
    async fn fetch(&self) -> Result<Vec<LocalCartItem>, RemoteError> {
        let mut state = self.0.borrow_mut();
        state.fetch_calls += 1;
        if let Some(Err(err)) = state.fetch_plan.pop_front() {
            return Err(err);
        }
        Ok(state.items.clone())
    }

    async fn add(&self, item: &LocalCartItem) -> Result<(), RemoteError> {
        let mut state = self.0.borrow_mut();
        if let Some(err) = state.mutation_error.take() {
            return Err(err);
        }
        if let Some((key, err)) = &state.add_error {
            if *key == item.key() {
                return Err(err.clone());
            }
        }
        match state.items.iter_mut().find(|i| i.key() == item.key()) {
            Some(existing) => {
                let quantity = existing.quantity() + item.quantity();
                existing.set_quantity(quantity);
            }
            None => state.items.push(item.clone()),
        }
        Ok(())
    }

    async fn update_quantity(&self, key: &Key, quantity: i64) -> Result<(), RemoteError> {
        let mut state = self.0.borrow_mut();
        if let Some(err) = state.mutation_error.take() {
            return Err(err);
        }
        for item in &mut state.items {
            if item.key() == *key {
                item.set_quantity(quantity);
            }
        }
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<(), RemoteError> {
        let mut state = self.0.borrow_mut();
        if let Some(err) = state.mutation_error.take() {
            return Err(err);
        }
        state.items.retain(|i| i.key() != *key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        let mut state = self.0.borrow_mut();
        if let Some(err) = state.mutation_error.take() {
            return Err(err);
        }
        state.items.clear();
        Ok(())
    }
}

/// Local store backed by a shared handle so tests can inspect what was
/// persisted after the session takes ownership.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<Vec<LocalCartItem>>>);

impl SharedStore {
    fn with_items(items: Vec<LocalCartItem>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    fn items(&self) -> Vec<LocalCartItem> {
        self.0.borrow().clone()
    }
}

impl LocalStore<LocalCartItem> for SharedStore {
    fn load(&self) -> Vec<LocalCartItem> {
        self.0.borrow().clone()
    }

    fn save(&mut self, items: &[LocalCartItem]) {
        *self.0.borrow_mut() = items.to_vec();
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clear();
    }
}

fn keys(items: &[LocalCartItem]) -> Vec<String> {
    let mut ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn merge_pushes_missing_items_without_duplicates() {
    let store = SharedStore::with_items(vec![line("a", 100, 1), line("b", 200, 2)]);
    let remote = MockRemote::with_items(vec![line("b", 200, 1)]);
    let mut session = SyncSession::new(store);

    session.login(remote.clone());
    assert_eq!(session.phase(), Phase::MergePending);

    let report = session.merge().await;
    assert!(report.attempted);
    assert_eq!(report.pushed, 1);
    assert_eq!(report.failed, 0);
    assert!(report.adopted_remote);

    // Server ends with exactly {a, b}, no duplicate line for b.
    assert_eq!(keys(&remote.items()), vec!["a", "b"]);
    assert_eq!(keys(session.items()), vec!["a", "b"]);
    assert_eq!(session.phase(), Phase::Synced);
}

#[tokio::test]
async fn merge_runs_once_per_login_episode() {
    let store = SharedStore::with_items(vec![line("a", 100, 1)]);
    let remote = MockRemote::default();
    let mut session = SyncSession::new(store);

    session.login(remote.clone());
    let first = session.merge().await;
    assert!(first.attempted);
    let calls_after_first = remote.fetch_calls();

    let second = session.merge().await;
    assert!(!second.attempted);
    assert_eq!(remote.fetch_calls(), calls_after_first);

    // A new login episode allows exactly one more merge.
    session.logout();
    session.login(remote.clone());
    let third = session.merge().await;
    assert!(third.attempted);
}

#[tokio::test]
async fn merge_refetch_failure_keeps_premerge_snapshot() {
    let store = SharedStore::with_items(vec![line("a", 100, 1)]);
    let remote = MockRemote::with_items(vec![line("b", 200, 1)]);
    remote.plan_fetches(vec![Ok(()), Err(RemoteError::Unavailable("boom".into()))]);
    let mut session = SyncSession::new(store);

    session.login(remote.clone());
    let report = session.merge().await;
    assert!(report.attempted);
    assert_eq!(report.pushed, 1);
    assert!(!report.adopted_remote);

    // The push reached the server, but locally the pre-merge snapshot stays.
    assert_eq!(keys(&remote.items()), vec!["a", "b"]);
    assert_eq!(keys(session.items()), vec!["a"]);
}

#[tokio::test]
async fn merge_initial_fetch_failure_is_still_a_consumed_attempt() {
    let store = SharedStore::with_items(vec![line("a", 100, 1)]);
    let remote = MockRemote::default();
    remote.plan_fetches(vec![Err(RemoteError::Unavailable("down".into()))]);
    let mut session = SyncSession::new(store);

    session.login(remote.clone());
    let report = session.merge().await;
    assert!(report.attempted);
    assert!(!report.adopted_remote);
    assert_eq!(keys(session.items()), vec!["a"]);
    assert_eq!(session.phase(), Phase::Synced);

    // The episode's single merge is spent even though it failed.
    assert!(!session.merge().await.attempted);
}

#[tokio::test]
async fn merge_tolerates_per_item_failures() {
    let store = SharedStore::with_items(vec![line("a", 100, 1), line("b", 200, 1)]);
    let remote = MockRemote::default();
    remote.fail_adds_for(line("a", 100, 1).key(), RemoteError::Unavailable("flaky".into()));
    let mut session = SyncSession::new(store);

    session.login(remote.clone());
    let report = session.merge().await;
    assert_eq!(report.pushed, 1);
    assert_eq!(report.failed, 1);
    assert!(report.adopted_remote);

    // The server copy is adopted as-is once the batch completes.
    assert_eq!(keys(session.items()), vec!["b"]);
}

#[tokio::test]
async fn empty_server_copy_never_discards_local_items() {
    let store = SharedStore::with_items(vec![line("a", 100, 1)]);
    let remote = MockRemote::default();
    remote.fail_adds_for(line("a", 100, 1).key(), RemoteError::NotFound);
    let mut session = SyncSession::new(store.clone());

    session.login(remote.clone());
    let report = session.merge().await;
    assert_eq!(report.failed, 1);
    assert!(!report.adopted_remote);

    assert_eq!(keys(session.items()), vec!["a"]);
    assert_eq!(keys(&store.items()), vec!["a"]);
}

#[tokio::test]
async fn anonymous_mutations_stay_local() {
    let store = SharedStore::default();
    let mut session: SyncSession<LocalCartItem, MockRemote, _> = SyncSession::new(store.clone());

    let applied = session.add_item(line("a", 100, 2)).await.unwrap();
    assert_eq!(applied, Applied::LocalOnly { warned: false });
    assert_eq!(keys(&store.items()), vec!["a"]);
    assert_eq!(session.totals().total_items, 2);
    assert_eq!(session.totals().total_price, 200);
}

#[tokio::test]
async fn unavailable_server_falls_back_locally_with_warning() {
    let store = SharedStore::default();
    let remote = MockRemote::default();
    let mut session = SyncSession::new(store.clone());
    session.login(remote.clone());
    session.merge().await;

    remote.fail_next_mutation(RemoteError::Unavailable("503".into()));
    let applied = session.add_item(line("a", 100, 1)).await.unwrap();
    assert_eq!(applied, Applied::LocalOnly { warned: true });

    // Applied locally, pending sync; the server never saw it.
    assert_eq!(keys(session.items()), vec!["a"]);
    assert!(remote.items().is_empty());
}

#[tokio::test]
async fn missing_route_falls_back_locally_without_warning() {
    let store = SharedStore::with_items(vec![line("a", 100, 1)]);
    let remote = MockRemote::with_items(vec![line("a", 100, 1)]);
    let mut session = SyncSession::new(store);
    session.login(remote.clone());
    session.merge().await;

    remote.fail_next_mutation(RemoteError::NotFound);
    let applied = session.remove_item(&line("a", 100, 1).key()).await.unwrap();
    assert_eq!(applied, Applied::LocalOnly { warned: false });
    assert!(session.items().is_empty());
}

#[tokio::test]
async fn rejected_mutation_is_surfaced_and_not_applied() {
    let store = SharedStore::with_items(vec![line("a", 100, 1)]);
    let remote = MockRemote::with_items(vec![line("a", 100, 1)]);
    let mut session = SyncSession::new(store);
    session.login(remote.clone());
    session.merge().await;

    remote.fail_next_mutation(RemoteError::Rejected {
        status: 400,
        message: "Quantity must be at least 1".into(),
    });
    let result = session.update_quantity(&line("a", 100, 1).key(), 5).await;
    assert!(matches!(result, Err(RemoteError::Rejected { status: 400, .. })));

    // Neither side changed.
    assert_eq!(session.items()[0].quantity, 1);
    assert_eq!(remote.items()[0].quantity, 1);
}

#[tokio::test]
async fn successful_mutations_update_both_sides_and_recompute_totals() {
    let store = SharedStore::default();
    let remote = MockRemote::default();
    let mut session = SyncSession::new(store.clone());
    session.login(remote.clone());
    session.merge().await;

    assert_eq!(
        session.add_item(line("a", 100, 1)).await.unwrap(),
        Applied::Remote
    );
    assert_eq!(
        session.add_item(line("a", 100, 2)).await.unwrap(),
        Applied::Remote
    );
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.totals().total_items, 3);
    assert_eq!(session.totals().total_price, 300);

    session
        .update_quantity(&line("a", 100, 1).key(), 5)
        .await
        .unwrap();
    assert_eq!(session.totals().total_items, 5);
    assert_eq!(session.totals().total_price, 500);
    assert_eq!(remote.items()[0].quantity, 5);
}

#[tokio::test]
async fn quantity_below_one_is_a_noop() {
    let store = MemoryStore::with_items(vec![line("a", 100, 2)]);
    let mut session: SyncSession<LocalCartItem, MockRemote, _> = SyncSession::new(store);

    let applied = session
        .update_quantity(&line("a", 100, 1).key(), 0)
        .await
        .unwrap();
    assert_eq!(applied, Applied::Unchanged);
    assert_eq!(session.items()[0].quantity, 2);
}

#[tokio::test]
async fn explicit_clear_empties_local_storage_once() {
    let store = SharedStore::with_items(vec![line("a", 100, 1), line("b", 200, 1)]);
    let remote = MockRemote::with_items(vec![line("a", 100, 1), line("b", 200, 1)]);
    let mut session = SyncSession::new(store.clone());
    session.login(remote.clone());
    session.merge().await;

    let applied = session.clear().await.unwrap();
    assert_eq!(applied, Applied::Remote);
    assert!(session.items().is_empty());
    assert!(remote.items().is_empty());
    assert!(store.items().is_empty());
    assert_eq!(session.totals().total_items, 0);
}
