use parking_lot::Mutex;

use crate::access::Storage;
use crate::basic::BasicArray;
use crate::scalar::Scalar;

/// An array behind one coarse lock.
///
/// Only the compound operations here are atomic. Everything else is reached
/// through [`with`](Self::with), which holds the lock for the closure's
/// duration.
#[derive(Debug)]
pub struct SharedArray<T> {
    inner: Mutex<BasicArray<T>>,
}

impl<T: Scalar> SharedArray<T> {
    pub fn new(array: BasicArray<T>) -> Self {
        Self {
            inner: Mutex::new(array),
        }
    }

    /// Atomically replaces element `index` with `function(element)` and
    /// returns the new value.
    pub fn mix<F: FnOnce(T) -> T>(&self, index: u64, function: F) -> T {
        let mut array = self.inner.lock();
        let mixed = function(array.get(index));
        array.set(index, mixed);
        mixed
    }

    pub fn get(&self, index: u64) -> T {
        self.inner.lock().get(index)
    }

    pub fn set(&self, index: u64, value: T) {
        self.inner.lock().set(index, value);
    }

    pub fn count(&self) -> u64 {
        self.inner.lock().count()
    }

    pub fn with<R, F: FnOnce(&mut BasicArray<T>) -> R>(&self, function: F) -> R {
        let mut array = self.inner.lock();
        function(&mut *array)
    }

    pub fn into_inner(self) -> BasicArray<T> {
        self.inner.into_inner()
    }
}

impl<T: Scalar> From<BasicArray<T>> for SharedArray<T> {
    fn from(array: BasicArray<T>) -> Self {
        Self::new(array)
    }
}
