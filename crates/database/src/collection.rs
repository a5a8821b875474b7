use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 内存集合：一个带读写锁的文档列表 + 自增ID
///
/// 跨集合的写操作必须按固定顺序加锁：
/// staff → referrals → withdrawals → transactions → notifications → audit_logs
#[derive(Debug)]
pub struct Collection<T> {
    name: &'static str,
    docs: RwLock<Vec<T>>,
    next_id: AtomicI64,
}

impl<T> Collection<T> {
    pub fn new(name: &'static str) -> Self {
        Self::with_documents(name, Vec::new())
    }

    /// 使用已有文档初始化，自增ID从 len + 1 开始
    pub fn with_documents(name: &'static str, docs: Vec<T>) -> Self {
        let next_id = docs.len() as i64 + 1;
        Self {
            name,
            docs: RwLock::new(docs),
            next_id: AtomicI64::new(next_id),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.docs.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.docs.write().await
    }

    pub fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_continue_after_seeded_documents() {
        let collection = Collection::with_documents("numbers", vec![1, 2, 3]);
        assert_eq!(collection.next_id(), 4);
        assert_eq!(collection.next_id(), 5);
        assert_eq!(collection.count().await, 3);
        assert_eq!(collection.name(), "numbers");
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let collection: Collection<&str> = Collection::new("words");
        collection.write().await.push("hello");
        assert_eq!(collection.read().await.as_slice(), &["hello"]);
    }
}
