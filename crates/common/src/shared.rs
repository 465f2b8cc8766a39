use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable handle to a value shared between tasks
pub struct SharedRef<T> {
    inner: Arc<Mutex<T>>,
}

impl<T: Default> Default for SharedRef<T> {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl<T> Clone for SharedRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> SharedRef<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    // Poisoned locks are recovered
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let shared = SharedRef::new(vec![1]);
        let other = shared.clone();
        other.lock().push(2);
        assert_eq!(*shared.lock(), vec![1, 2]);
    }
}
