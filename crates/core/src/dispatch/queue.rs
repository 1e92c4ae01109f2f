use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

/// A fixed batch of work shared by several consumers. Every item is handed
/// out at most once; nothing is added after construction.
pub struct JobQueue<T> {
    buf: Mutex<VecDeque<T>>,
}

impl<T> JobQueue<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            buf: Mutex::new(items.into_iter().collect()),
        }
    }

    pub fn pop(&self) -> Option<T> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn hands_out_in_fifo_order() {
        let queue = JobQueue::new([1, 2, 3]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn concurrent_consumers_never_share_an_item() {
        let queue = Arc::new(JobQueue::new(0..1000));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut taken = Vec::new();
                    while let Some(item) = queue.pop() {
                        taken.push(item);
                    }
                    taken
                })
            })
            .collect();

        let mut all: Vec<i32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();

        assert_eq!(all, (0..1000).collect::<Vec<_>>());
    }
}
