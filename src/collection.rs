//! Collection Editor
//!
//! Copy-on-write add / remove / duplicate over the ordered collections of a
//! session document. Item types declare their identifier field through
//! `CollectionItem`; identified items get `max(existing) + 1` (or 0) on add
//! and on duplicate. When the maximum is `i64::MAX` the smallest unused
//! non-negative id is taken instead.
//!
//! Out-of-range indices are absorbed: `remove` and `duplicate` return the
//! input unchanged.

use std::collections::BTreeSet;

use session_types::{
    AssociatedFile, AssociatedVideoFile, BehavioralEvent, Camera, ChannelMap, DataAcqDevice,
    ElectrodeGroup, OpticalFiber, OptoExcitationSource, Task, VirusInjection,
};

/// An element of an editable document collection.
///
/// Types with an identifier set `ID_FIELD` and implement `item_id` /
/// `assign_id`; the defaults describe an item without one.
pub trait CollectionItem: Clone {
    /// Wire name of the identifier field, if the type has one
    const ID_FIELD: Option<&'static str> = None;

    fn item_id(&self) -> Option<i64> {
        None
    }

    fn assign_id(&mut self, _id: i64) {}
}

macro_rules! identified_by_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CollectionItem for $ty {
                const ID_FIELD: Option<&'static str> = Some("id");

                fn item_id(&self) -> Option<i64> {
                    Some(self.id)
                }

                fn assign_id(&mut self, id: i64) {
                    self.id = id;
                }
            }
        )*
    };
}

macro_rules! unidentified {
    ($($ty:ty),* $(,)?) => {
        $( impl CollectionItem for $ty {} )*
    };
}

identified_by_id!(Camera, ElectrodeGroup);

// `ChannelMap.ntrode_id` is not an "id" field: it is renumbered document-wide
// by the electrode sync engine.
unidentified!(
    ChannelMap,
    Task,
    DataAcqDevice,
    AssociatedFile,
    AssociatedVideoFile,
    BehavioralEvent,
    OptoExcitationSource,
    OpticalFiber,
    VirusInjection,
    String,
);

/// Next identifier for a collection: `max + 1`, or 0 when nothing has an id
pub fn next_id<T: CollectionItem>(items: &[T]) -> i64 {
    let Some(max) = items.iter().filter_map(|item| item.item_id()).max() else {
        return 0;
    };
    match max.checked_add(1) {
        Some(next) => next,
        None => {
            tracing::debug!("identifier space exhausted at i64::MAX, reusing a gap");
            smallest_unused_id(items)
        }
    }
}

fn smallest_unused_id<T: CollectionItem>(items: &[T]) -> i64 {
    let used: BTreeSet<i64> = items
        .iter()
        .filter_map(|item| item.item_id())
        .filter(|id| *id >= 0)
        .collect();
    // at most items.len() ids are used, so a gap exists below that bound
    (0..=items.len() as i64)
        .find(|id| !used.contains(id))
        .unwrap_or(0)
}

/// Append `template`, assigning the next identifier if the type has one
pub fn add<T: CollectionItem>(items: &[T], mut template: T) -> Vec<T> {
    if T::ID_FIELD.is_some() {
        template.assign_id(next_id(items));
    }
    let mut out = Vec::with_capacity(items.len() + 1);
    out.extend_from_slice(items);
    out.push(template);
    out
}

/// Remove the item at `index`; out of range returns the input unchanged
pub fn remove<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    if index >= items.len() {
        tracing::debug!(index, len = items.len(), "remove ignored: index out of range");
        return items.to_vec();
    }
    let mut out = items.to_vec();
    out.remove(index);
    out
}

/// Clone the item at `index` and insert the copy at `index + 1`.
///
/// Identified copies receive the next identifier. Out of range returns the
/// input unchanged.
pub fn duplicate<T: CollectionItem>(items: &[T], index: usize) -> Vec<T> {
    let Some(source) = items.get(index) else {
        tracing::debug!(index, len = items.len(), "duplicate ignored: index out of range");
        return items.to_vec();
    };
    let mut copy = source.clone();
    if T::ID_FIELD.is_some() {
        copy.assign_id(next_id(items));
    }
    let mut out = items.to_vec();
    out.insert(index + 1, copy);
    out
}
