/// Persistent local storage for a synced collection. The browser analogue
/// is localStorage; tests use the in-memory implementation below.
pub trait LocalStore<T: Clone> {
    fn load(&self) -> Vec<T>;
    fn save(&mut self, items: &[T]);
    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    items: Vec<T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T: Clone> LocalStore<T> for MemoryStore<T> {
    fn load(&self) -> Vec<T> {
        self.items.clone()
    }

    fn save(&mut self, items: &[T]) {
        self.items = items.to_vec();
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}
