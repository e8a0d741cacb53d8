use std::collections::HashSet;

use crate::sync::{
    item::SyncItem,
    remote::{RemoteCollection, RemoteError},
    store::LocalStore,
};

/// Where the session is in its lifecycle. Transitions:
/// `Anonymous -> MergePending` on login, `MergePending -> Synced` when the
/// merge runs, `-> Anonymous` on logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Anonymous,
    MergePending,
    Synced,
}

/// Totals recomputed from the full item list after every mutation, never
/// maintained incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub total_items: i64,
    pub total_price: i64,
}

pub fn calculate_totals<T: SyncItem>(items: &[T]) -> Totals {
    let mut totals = Totals::default();
    for item in items {
        totals.total_items += item.quantity();
        totals.total_price += item.unit_price().unwrap_or(0) * item.quantity();
    }
    totals
}

/// How a mutation landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Accepted by the server and mirrored locally.
    Remote,
    /// Applied to the local copy only. `warned` is true when the user was
    /// told the change will sync later.
    LocalOnly { warned: bool },
    /// Nothing to do, e.g. a quantity below 1 or an unknown line.
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub attempted: bool,
    pub pushed: usize,
    pub failed: usize,
    pub adopted_remote: bool,
}

/// A synced collection with its local store, optional remote endpoint and
/// the current lifecycle phase.
pub struct SyncSession<T, R, L>
where
    T: SyncItem,
    R: RemoteCollection<T>,
    L: LocalStore<T>,
{
    phase: Phase,
    items: Vec<T>,
    totals: Totals,
    remote: Option<R>,
    local: L,
    cleared: bool,
}

impl<T, R, L> SyncSession<T, R, L>
where
    T: SyncItem,
    R: RemoteCollection<T>,
    L: LocalStore<T>,
{
    pub fn new(local: L) -> Self {
        let items = local.load();
        let totals = calculate_totals(&items);
        Self {
            phase: Phase::Anonymous,
            items,
            totals,
            remote: None,
            local,
            cleared: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// A fresh login schedules exactly one merge for this episode.
    pub fn login(&mut self, remote: R) {
        self.remote = Some(remote);
        self.phase = Phase::MergePending;
    }

    /// Drops the remote endpoint but deliberately keeps the local data, so
    /// the next login can merge it again.
    pub fn logout(&mut self) {
        self.remote = None;
        self.phase = Phase::Anonymous;
    }

    /// Pushes local items the server does not know about, then adopts the
    /// server copy as the source of truth. Per-item failures are logged and
    /// skipped. If the re-fetch fails the pre-merge local snapshot stays
    /// active.
    pub async fn merge(&mut self) -> MergeReport {
        let mut report = MergeReport::default();
        if self.phase != Phase::MergePending {
            return report;
        }
        // Marked done before any await, so a second call in the same login
        // episode is a no-op even if this one is still in flight.
        self.phase = Phase::Synced;

        let Some(remote) = self.remote.as_ref() else {
            return report;
        };
        report.attempted = true;

        let server_items = match remote.fetch().await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(error = %err, "merge fetch failed, keeping local snapshot");
                return report;
            }
        };

        let server_keys: HashSet<T::Key> = server_items.iter().map(|i| i.key()).collect();
        for item in &self.items {
            if server_keys.contains(&item.key()) {
                continue;
            }
            match remote.add(item).await {
                Ok(()) => report.pushed += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(error = %err, "merge push failed for one item");
                }
            }
        }

        let refreshed = match remote.fetch().await {
            Ok(items) => Some(items),
            Err(err) => {
                tracing::warn!(error = %err, "merge re-fetch failed, keeping local snapshot");
                None
            }
        };

        if let Some(items) = refreshed {
            report.adopted_remote = self.adopt(items);
        }
        report
    }

    pub async fn add_item(&mut self, item: T) -> Result<Applied, RemoteError> {
        if item.quantity() < 1 {
            return Ok(Applied::Unchanged);
        }

        let mut applied = Applied::LocalOnly { warned: false };
        if let Some(remote) = self.remote.as_ref() {
            match remote.add(&item).await {
                Ok(()) => applied = Applied::Remote,
                Err(err) if err.falls_back() => {
                    if err.warns() {
                        tracing::warn!(error = %err, "add applied locally, will sync later");
                    }
                    applied = Applied::LocalOnly { warned: err.warns() };
                }
                Err(err) => return Err(err),
            }
        }

        let key = item.key();
        match self.items.iter_mut().find(|i| i.key() == key) {
            Some(existing) => {
                let quantity = existing.quantity() + item.quantity();
                existing.set_quantity(quantity);
            }
            None => self.items.push(item),
        }
        self.after_mutation();
        Ok(applied)
    }

    pub async fn update_quantity(
        &mut self,
        key: &T::Key,
        quantity: i64,
    ) -> Result<Applied, RemoteError> {
        if quantity < 1 {
            return Ok(Applied::Unchanged);
        }
        if !self.items.iter().any(|i| i.key() == *key) {
            return Ok(Applied::Unchanged);
        }

        let mut applied = Applied::LocalOnly { warned: false };
        if let Some(remote) = self.remote.as_ref() {
            match remote.update_quantity(key, quantity).await {
                Ok(()) => applied = Applied::Remote,
                Err(err) if err.falls_back() => {
                    if err.warns() {
                        tracing::warn!(error = %err, "update applied locally, will sync later");
                    }
                    applied = Applied::LocalOnly { warned: err.warns() };
                }
                Err(err) => return Err(err),
            }
        }

        for item in &mut self.items {
            if item.key() == *key {
                item.set_quantity(quantity);
            }
        }
        self.after_mutation();
        Ok(applied)
    }

    pub async fn remove_item(&mut self, key: &T::Key) -> Result<Applied, RemoteError> {
        if !self.items.iter().any(|i| i.key() == *key) {
            return Ok(Applied::Unchanged);
        }

        let mut applied = Applied::LocalOnly { warned: false };
        if let Some(remote) = self.remote.as_ref() {
            match remote.remove(key).await {
                Ok(()) => applied = Applied::Remote,
                Err(err) if err.falls_back() => {
                    if err.warns() {
                        tracing::warn!(error = %err, "remove applied locally, will sync later");
                    }
                    applied = Applied::LocalOnly { warned: err.warns() };
                }
                Err(err) => return Err(err),
            }
        }

        self.items.retain(|i| i.key() != *key);
        self.after_mutation();
        Ok(applied)
    }

    /// An explicit user-initiated clear. Sets the one-shot flag that allows
    /// the empty list to reach local storage.
    pub async fn clear(&mut self) -> Result<Applied, RemoteError> {
        let mut applied = Applied::LocalOnly { warned: false };
        if let Some(remote) = self.remote.as_ref() {
            match remote.clear().await {
                Ok(()) => applied = Applied::Remote,
                Err(err) if err.falls_back() => {
                    if err.warns() {
                        tracing::warn!(error = %err, "clear applied locally, will sync later");
                    }
                    applied = Applied::LocalOnly { warned: err.warns() };
                }
                Err(err) => return Err(err),
            }
        }

        self.cleared = true;
        self.items.clear();
        self.after_mutation();
        Ok(applied)
    }

    /// Adopts a server copy as the new source of truth. An empty server
    /// copy never replaces non-empty local data unless the emptiness came
    /// from an explicit clear; transient empty reads must not discard items.
    fn adopt(&mut self, items: Vec<T>) -> bool {
        if items.is_empty() && !self.items.is_empty() && !self.cleared {
            return false;
        }
        self.items = items;
        self.after_mutation();
        true
    }

    fn after_mutation(&mut self) {
        self.totals = calculate_totals(&self.items);
        self.persist();
    }

    fn persist(&mut self) {
        if self.items.is_empty() {
            if self.cleared {
                self.local.clear();
                self.cleared = false;
            }
            return;
        }
        self.local.save(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::calculate_totals;
    use crate::sync::item::LocalCartItem;

    fn line(id: &str, price: Option<i64>, populated: Option<i64>, quantity: i64) -> LocalCartItem {
        LocalCartItem {
            product_id: id.to_string(),
            name: id.to_string(),
            price,
            populated_price: populated,
            image: None,
            quantity,
            size: None,
            color: None,
        }
    }

    #[test]
    fn totals_prefer_populated_price_and_default_to_zero() {
        let items = vec![
            line("a", Some(100), Some(120), 2),
            line("b", Some(50), None, 1),
            line("c", None, None, 3),
        ];
        let totals = calculate_totals(&items);
        assert_eq!(totals.total_items, 6);
        assert_eq!(totals.total_price, 120 * 2 + 50);
    }
}
