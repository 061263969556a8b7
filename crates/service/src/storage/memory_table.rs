use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::errors::ServiceError;

struct Rows<T> {
    rows: BTreeMap<i32, T>,
    // None once every positive i32 has been handed out
    next_id: Option<i32>,
}

/// In-process table keyed by store-assigned integer ids.
///
/// Rows are kept in id order, so listing returns insertion order. Every
/// mutation runs under the write lock, which makes read-modify-write on a
/// single id atomic.
pub struct MemoryTable<T> {
    inner: RwLock<Rows<T>>,
}

impl<T: Clone> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryTable<T> {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Rows { rows: BTreeMap::new(), next_id: Some(1) }) }
    }

    /// Assign the next id and store the row built from it.
    pub async fn insert_with<F>(&self, build: F) -> Result<T, ServiceError>
    where
        F: FnOnce(i32) -> T,
    {
        let mut table = self.inner.write().await;
        let id = table.next_id.ok_or_else(|| ServiceError::Db("id sequence exhausted".into()))?;
        table.next_id = id.checked_add(1);
        let row = build(id);
        table.rows.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get(&self, id: i32) -> Option<T> {
        let table = self.inner.read().await;
        table.rows.get(&id).cloned()
    }

    pub async fn list(&self) -> Vec<T> {
        let table = self.inner.read().await;
        table.rows.values().cloned().collect()
    }

    pub async fn list_where<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        let table = self.inner.read().await;
        table.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    /// Mutate the row `id` in place; `None` when it does not exist.
    pub async fn update_with<F, R>(&self, id: i32, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut table = self.inner.write().await;
        table.rows.get_mut(&id).map(f)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }
}
