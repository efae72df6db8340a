//! Bounded worker pool with order-preserving collection
//!
//! Workers pull the next index from a shared counter and send `(index,
//! result)` to a single collector, which slots results back into input
//! order. Completion order never leaks into the output.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Default worker count: available parallelism, or 1 if unknown
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Apply `task` to every item on up to `workers` threads
///
/// Results are returned in item order. With one worker (or one item) the
/// items are processed on the calling thread.
pub fn run_ordered<T, R, F>(items: &[T], workers: usize, task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    if workers == 1 {
        return items
            .iter()
            .enumerate()
            .map(|(index, item)| task(index, item))
            .collect();
    }

    let next = AtomicUsize::new(0);
    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let task = &task;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(item) = items.get(index) else {
                    break;
                };
                if tx.send((index, task(index, item))).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (index, result) in rx {
            slots[index] = Some(result);
        }
    });

    slots.into_iter().flatten().collect()
}
