//! Ordered container with O(1) position lookup.

use std::cell::OnceCell;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::rc::Rc;

use crate::error::{IndexError, Result};
use crate::sorting::SortOrder;

/// Items carry a stable identity the index is keyed by.
pub trait IndexItem {
    type Id: Clone + Eq + Hash + Debug;

    fn item_id(&self) -> Self::Id;
}

/// Extracts a sort key from an item.
pub type KeyFn<T, K> = Rc<dyn Fn(&T) -> K>;

/// A list kept in the order of the last sort.
///
/// Positions are served from a hash index that is thrown away on every
/// structural change and rebuilt on the next lookup.
pub struct SortedIndex<T: IndexItem, K> {
    items: Vec<T>,
    positions: OnceCell<HashMap<T::Id, usize>>,
    sort_key: Option<(KeyFn<T, K>, SortOrder)>,
}

impl<T: IndexItem + Debug, K> Debug for SortedIndex<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedIndex")
            .field("items", &self.items)
            .field("sort_order", &self.sort_key.as_ref().map(|(_, order)| *order))
            .finish()
    }
}

impl<T: IndexItem, K: Ord> Default for SortedIndex<T, K> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: IndexItem, K: Ord> SortedIndex<T, K> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            positions: OnceCell::new(),
            sort_key: None,
        }
    }

    fn dirty(&mut self) {
        self.positions.take();
    }

    fn positions(&self) -> &HashMap<T::Id, usize> {
        self.positions.get_or_init(|| {
            self.items
                .iter()
                .enumerate()
                .map(|(index, item)| (item.item_id(), index))
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.positions().contains_key(id)
    }

    /// Current position of the item with `id`.
    pub fn index_of(&self, id: &T::Id) -> Result<usize> {
        self.positions()
            .get(id)
            .copied()
            .ok_or_else(|| IndexError::MissingItem(format!("{id:?}")))
    }

    pub fn get_by_id(&self, id: &T::Id) -> Option<&T> {
        let index = *self.positions().get(id)?;
        self.items.get(index)
    }

    /// Mutable access that keeps positions valid; the item id must not change.
    pub fn get_mut_by_id(&mut self, id: &T::Id) -> Option<&mut T> {
        let index = *self.positions().get(id)?;
        self.items.get_mut(index)
    }

    /// Add to the end without sorting.
    pub fn append_items(&mut self, new_items: impl IntoIterator<Item = T>) {
        let start = self.items.len();
        self.items.extend(new_items);
        if let Some(positions) = self.positions.get_mut() {
            for (offset, item) in self.items[start..].iter().enumerate() {
                positions.insert(item.item_id(), start + offset);
            }
        }
    }

    /// Append, then re-sort with the last key used.
    pub fn insert_items(&mut self, new_items: impl IntoIterator<Item = T>) {
        self.append_items(new_items);
        self.sort();
    }

    /// Remove every listed item, or nothing if any of them is missing.
    /// Repeated ids count once.
    pub fn remove_items(&mut self, ids: &[T::Id]) -> Result<Vec<T>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut doomed = Vec::with_capacity(ids.len());
        for id in ids {
            if seen.insert(id) {
                doomed.push(self.index_of(id)?);
            }
        }

        doomed.sort_unstable_by(|a, b| b.cmp(a));
        let mut removed: Vec<T> = doomed.into_iter().map(|index| self.items.remove(index)).collect();
        removed.reverse();

        self.dirty();
        Ok(removed)
    }

    /// Empty the index, handing back the items in their current order.
    pub fn take_items(&mut self) -> Vec<T> {
        self.dirty();
        std::mem::take(&mut self.items)
    }

    /// Stable sort; ties keep their previous relative order in both
    /// directions. The key is remembered for [`insert_items`](Self::insert_items).
    pub fn sort_by(&mut self, key_fn: KeyFn<T, K>, order: SortOrder) {
        self.sort_key = Some((key_fn, order));
        self.sort();
    }

    /// Re-sort with the last key used. No-op before the first `sort_by`.
    pub fn sort(&mut self) {
        let Some((key_fn, order)) = &self.sort_key else {
            return;
        };
        match order {
            SortOrder::Ascending => self.items.sort_by_cached_key(|item| key_fn(item)),
            SortOrder::Descending => {
                self.items.sort_by_cached_key(|item| Reverse(key_fn(item)))
            }
        }
        self.dirty();
    }
}

impl<'a, T: IndexItem, K> IntoIterator for &'a SortedIndex<T, K> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
