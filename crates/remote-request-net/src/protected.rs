//! Lock-guarded shared state.

use parking_lot::Mutex;

/// A value that is only ever accessed while holding a lock.
///
/// Both [`read`](Self::read) and [`write`](Self::write) hold the lock for the
/// whole duration of the closure, so no caller observes a half-updated value.
///
/// The lock is not reentrant. Calling `read` or `write` on the same instance
/// from inside one of its closures deadlocks.
///
/// # Example
///
/// ```
/// use remote_request_net::ProtectedState;
///
/// let counter = ProtectedState::new(0u32);
/// counter.write(|value| *value += 1);
/// assert_eq!(counter.read(|value| *value), 1);
/// ```
#[derive(Debug, Default)]
pub struct ProtectedState<V> {
    value: Mutex<V>,
}

impl<V> ProtectedState<V> {
    /// Wrap a value.
    pub fn new(value: V) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Run `f` with shared access to the value.
    pub fn read<U>(&self, f: impl FnOnce(&V) -> U) -> U {
        let guard = self.value.lock();
        f(&guard)
    }

    /// Run `f` with exclusive access to the value.
    pub fn write<U>(&self, f: impl FnOnce(&mut V) -> U) -> U {
        let mut guard = self.value.lock();
        f(&mut guard)
    }

    /// Replace the value.
    pub fn set(&self, value: V) {
        self.write(|current| *current = value);
    }

    /// Consume the wrapper and return the value.
    pub fn into_inner(self) -> V {
        self.value.into_inner()
    }
}

impl<V: Clone> ProtectedState<V> {
    /// Clone the current value out.
    pub fn get(&self) -> V {
        self.read(V::clone)
    }
}

impl<V: PartialEq> PartialEq for ProtectedState<V> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        // Lock in address order so `a == b` and `b == a` never wait on each other.
        if (self as *const Self as usize) < (other as *const Self as usize) {
            self.read(|left| other.read(|right| left == right))
        } else {
            other.read(|right| self.read(|left| left == right))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_read_and_write() {
        let state = ProtectedState::new(vec![1, 2]);
        state.write(|v| v.push(3));
        assert_eq!(state.read(|v| v.len()), 3);
        assert_eq!(state.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_set_replaces_value() {
        let state = ProtectedState::new(String::from("old"));
        state.set(String::from("new"));
        assert_eq!(state.into_inner(), "new");
    }

    #[test]
    fn test_concurrent_writes_are_serialized() {
        let state = Arc::new(ProtectedState::new(0u64));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        state.write(|v| *v += 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(state.get(), 8000);
    }

    #[test]
    fn test_equality_compares_values() {
        let a = ProtectedState::new(5);
        let b = ProtectedState::new(5);
        let c = ProtectedState::new(6);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, a);
    }

    #[test]
    fn test_opposite_comparisons_do_not_deadlock() {
        let a = Arc::new(ProtectedState::new(7u32));
        let b = Arc::new(ProtectedState::new(7u32));

        let forward = {
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            thread::spawn(move || (0..200_000).all(|_| *a == *b))
        };
        let backward = {
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            thread::spawn(move || (0..200_000).all(|_| *b == *a))
        };

        assert!(forward.join().unwrap());
        assert!(backward.join().unwrap());
    }
}
