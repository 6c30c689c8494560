use std::sync::atomic::{AtomicU32, Ordering};

use super::Constant;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a datalist node, assigned at construction.
///
/// Two lists are the same vlen instance only if their ids match; equal
/// contents do not make them the same node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatalistId(u32);

impl DatalistId {
    fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Ordered sequence of constants, possibly nested through sublists.
#[derive(Debug)]
pub struct Datalist {
    id: DatalistId,
    items: Vec<Constant>,
}

impl Datalist {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn id(&self) -> DatalistId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Constant> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constant> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Constant] {
        &self.items
    }

    pub fn push(&mut self, constant: Constant) {
        self.items.push(constant);
    }

    /// Source line of the first constant, 0 when empty.
    pub fn line(&self) -> u32 {
        self.items.first().map_or(0, |c| c.line)
    }
}

impl Default for Datalist {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone is a distinct node: it gets a fresh id.
impl Clone for Datalist {
    fn clone(&self) -> Self {
        Self::from(self.items.clone())
    }
}

impl PartialEq for Datalist {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl From<Vec<Constant>> for Datalist {
    fn from(items: Vec<Constant>) -> Self {
        Self {
            id: DatalistId::fresh(),
            items,
        }
    }
}

impl FromIterator<Constant> for Datalist {
    fn from_iter<T: IntoIterator<Item = Constant>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a Datalist {
    type Item = &'a Constant;
    type IntoIter = std::slice::Iter<'a, Constant>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
