//! Handle-ordered tables. Lookup by a handle that is not present is a
//! programming error everywhere the solver uses `get`; callers that can
//! legitimately see a dangling handle use `try_get`.

use serde::{Deserialize, Serialize};

/// Anything stored in a [`Table`]: exposes its own 32-bit id.
pub trait Record {
    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Row<T> {
    item: T,
    tag: i32,
}

/// An ordered list addressable by handle, kept sorted so lookup is a binary
/// search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<T: Record> {
    rows: Vec<Row<T>>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: u32) -> Result<usize, usize> {
        self.rows.binary_search_by_key(&id, |r| r.item.id())
    }

    /// Insert an item under its own handle. Duplicate handles are a
    /// programming error.
    pub fn add(&mut self, item: T) {
        match self.position(item.id()) {
            Ok(_) => panic!("duplicate handle {} in table", item.id()),
            Err(at) => self.rows.insert(at, Row { item, tag: 0 }),
        }
    }

    /// Insert an item, assigning it the next unused handle, and return it.
    pub fn add_and_assign_id(&mut self, mut item: T) -> u32 {
        let id = self.rows.last().map_or(0, |r| r.item.id()) + 1;
        item.set_id(id);
        self.rows.push(Row { item, tag: 0 });
        id
    }

    /// Replace the item stored under `item.id()`, or insert it if absent.
    pub fn replace_or_add(&mut self, item: T) {
        match self.position(item.id()) {
            Ok(at) => self.rows[at].item = item,
            Err(at) => self.rows.insert(at, Row { item, tag: 0 }),
        }
    }

    pub fn get(&self, id: u32) -> &T {
        self.try_get(id)
            .unwrap_or_else(|| panic!("no item with handle {id}"))
    }

    pub fn get_mut(&mut self, id: u32) -> &mut T {
        match self.position(id) {
            Ok(at) => &mut self.rows[at].item,
            Err(_) => panic!("no item with handle {id}"),
        }
    }

    pub fn try_get(&self, id: u32) -> Option<&T> {
        self.position(id).ok().map(|at| &self.rows[at].item)
    }

    pub fn try_get_mut(&mut self, id: u32) -> Option<&mut T> {
        match self.position(id) {
            Ok(at) => Some(&mut self.rows[at].item),
            Err(_) => None,
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.position(id).is_ok()
    }

    pub fn tag(&mut self, id: u32, tag: i32) {
        if let Ok(at) = self.position(id) {
            self.rows[at].tag = tag;
        }
    }

    pub fn tag_all(&mut self, tag: i32) {
        for row in &mut self.rows {
            row.tag = tag;
        }
    }

    pub fn remove_tagged(&mut self) {
        self.rows.retain(|r| r.tag == 0);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|r| &r.item)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.iter_mut().map(|r| &mut r.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        h: u32,
        val: f64,
    }

    impl Record for Item {
        fn id(&self) -> u32 {
            self.h
        }
        fn set_id(&mut self, id: u32) {
            self.h = id;
        }
    }

    #[test]
    fn add_and_lookup() {
        let mut t = Table::new();
        t.add(Item { h: 5, val: 1.0 });
        t.add(Item { h: 2, val: 2.0 });
        t.add(Item { h: 9, val: 3.0 });
        assert_eq!(t.get(2).val, 2.0);
        assert_eq!(t.get(9).val, 3.0);
        assert!(t.try_get(3).is_none());
        assert_eq!(t.len(), 3);
    }

    #[test]
    #[should_panic(expected = "no item with handle")]
    fn dangling_lookup_panics() {
        let t: Table<Item> = Table::new();
        t.get(1);
    }

    #[test]
    #[should_panic(expected = "duplicate handle")]
    fn duplicate_add_panics() {
        let mut t = Table::new();
        t.add(Item { h: 1, val: 0.0 });
        t.add(Item { h: 1, val: 0.0 });
    }

    #[test]
    fn assign_id_is_monotonic() {
        let mut t = Table::new();
        assert_eq!(t.add_and_assign_id(Item { h: 0, val: 0.0 }), 1);
        assert_eq!(t.add_and_assign_id(Item { h: 0, val: 0.0 }), 2);
    }

    #[test]
    fn tag_and_remove() {
        let mut t = Table::new();
        for h in 1..=4 {
            t.add(Item { h, val: h as f64 });
        }
        t.tag(2, 1);
        t.tag(4, 1);
        t.remove_tagged();
        assert_eq!(t.len(), 2);
        assert!(t.contains(1) && t.contains(3));
    }
}
