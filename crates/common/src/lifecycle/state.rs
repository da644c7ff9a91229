//! Observable state shared between a single writer and any number of readers.

use std::sync::Arc;

use tokio::sync::watch;

/// Value that readers can watch for changes.
///
/// Every write publishes the whole value at once, so readers never observe a
/// partially applied update. Clones share the same underlying value.
#[derive(Debug)]
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Receiver that sees the current value and every later publish.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Apply `f` to the value in place. Subscribers are notified only when
    /// `f` returns `true`.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        self.tx.send_if_modified(f)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Observable<T> {
    /// Clone the current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_latest_value() {
        let observable = Observable::new(1u32);
        let mut rx = observable.subscribe();

        observable.set(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
        assert_eq!(observable.get(), 2);
    }

    #[tokio::test]
    async fn update_without_change_does_not_notify() {
        let observable = Observable::new(String::from("a"));
        let mut rx = observable.subscribe();

        assert!(!observable.update(|_| false));
        assert!(!rx.has_changed().unwrap());

        assert!(observable.update(|value| {
            value.push('b');
            true
        }));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "ab");
    }

    #[test]
    fn clones_share_value() {
        let observable = Observable::<u8>::default();
        let clone = observable.clone();
        clone.set(7);
        assert_eq!(observable.get(), 7);
    }
}
