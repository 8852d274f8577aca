// collection/mod.rs - In-memory mutation of id-keyed record arrays
//
// Pure functions only; persisting the result is the repository's job.

pub mod repository;

use std::sync::atomic::{AtomicU64, Ordering};

pub use repository::CollectionRepository;

/// A record with a string identity
pub trait Identified {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

#[derive(Debug, PartialEq)]
pub enum Upsert<T> {
    Inserted,
    Replaced(T),
}

pub fn find_index_by_id<T: Identified>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

pub fn find_by_id<'a, T: Identified>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

pub fn find_by_id_mut<'a, T: Identified>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

/// Replace the record with the same id in place, or append it
pub fn upsert_by_id<T: Identified>(items: &mut Vec<T>, item: T) -> Upsert<T> {
    match find_index_by_id(items, item.id()) {
        Some(idx) => Upsert::Replaced(std::mem::replace(&mut items[idx], item)),
        None => {
            items.push(item);
            Upsert::Inserted
        }
    }
}

/// Splice out the record with `id`. Absent ids leave the collection untouched.
pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> Option<T> {
    find_index_by_id(items, id).map(|idx| items.remove(idx))
}

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Millisecond timestamp id, strictly increasing within this process
pub fn next_id() -> String {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_ID.load(Ordering::SeqCst);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}
