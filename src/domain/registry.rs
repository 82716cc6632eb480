//! Label-keyed arenas with typed handles

use std::collections::HashMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};

/// Entities stored in a [`Registry`] carry a unique label
pub trait Labeled {
    fn label(&self) -> &str;
    fn set_label(&mut self, label: String);
}

/// Typed index into a registry
pub trait Handle: Copy + Eq + std::hash::Hash {
    const KIND: &'static str;
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(usize);

        impl Handle for $name {
            const KIND: &'static str = $kind;

            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}

handle!(
    /// Handle of a material
    MaterialId,
    "Material"
);
handle!(
    /// Handle of a cross-section
    CrossSectionId,
    "Cross-section"
);
handle!(
    /// Handle of a node
    NodeId,
    "Node"
);
handle!(
    /// Handle of an element
    ElementId,
    "Element"
);
handle!(
    /// Handle of a load case
    LoadCaseId,
    "Load case"
);
handle!(
    /// Handle of a nodal load within its load case
    NodalLoadId,
    "Nodal load"
);
handle!(
    /// Handle of an element load within its load case
    ElementLoadId,
    "Element load"
);
handle!(
    /// Handle of a prescribed displacement within its load case
    PrescribedId,
    "Prescribed displacement"
);

/// Insertion-ordered arena; removed slots stay vacant so handles never alias
#[derive(Debug, Clone)]
pub struct Registry<H, T> {
    slots: Vec<Option<T>>,
    labels: HashMap<String, usize>,
    _handle: PhantomData<H>,
}

impl<H, T> Default for Registry<H, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            labels: HashMap::new(),
            _handle: PhantomData,
        }
    }
}

impl<H: Handle, T: Labeled> Registry<H, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `item`, rejecting a duplicate label
    pub fn insert(&mut self, item: T) -> FEAResult<H> {
        if self.labels.contains_key(item.label()) {
            return Err(FEAError::DuplicateName(item.label().to_string()));
        }
        let index = self.slots.len();
        self.labels.insert(item.label().to_string(), index);
        self.slots.push(Some(item));
        Ok(H::from_index(index))
    }

    pub fn get(&self, id: H) -> FEAResult<&T> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(FEAError::InvalidHandle(H::KIND))
    }

    pub fn get_mut(&mut self, id: H) -> FEAResult<&mut T> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(FEAError::InvalidHandle(H::KIND))
    }

    pub fn contains(&self, id: H) -> bool {
        self.get(id).is_ok()
    }

    /// Handle registered under `label`
    pub fn find(&self, label: &str) -> FEAResult<H> {
        self.labels
            .get(label)
            .map(|&i| H::from_index(i))
            .ok_or_else(|| FEAError::not_found(H::KIND, label))
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Fail unless `label` is free or already belongs to `id`
    pub fn check_label(&self, id: H, label: &str) -> FEAResult<()> {
        match self.labels.get(label) {
            Some(&i) if i != id.index() => Err(FEAError::DuplicateName(label.to_string())),
            _ => Ok(()),
        }
    }

    /// Re-key `id` under a new label
    pub fn relabel(&mut self, id: H, label: &str) -> FEAResult<()> {
        self.check_label(id, label)?;
        let item = self.get_mut(id)?;
        let old = item.label().to_string();
        item.set_label(label.to_string());
        self.labels.remove(&old);
        self.labels.insert(label.to_string(), id.index());
        Ok(())
    }

    pub fn remove(&mut self, id: H) -> FEAResult<T> {
        let item = self
            .slots
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(FEAError::InvalidHandle(H::KIND))?;
        self.labels.remove(item.label());
        Ok(item)
    }

    /// Remove every entry, returning them in insertion order
    pub fn drain(&mut self) -> Vec<T> {
        self.labels.clear();
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    /// Live entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (H::from_index(i), item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|item| (H::from_index(i), item)))
    }

    pub fn ids(&self) -> Vec<H> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// One past the largest number leading any label's first digit run
    pub fn next_numeric_label(&self) -> String {
        let largest = self
            .labels
            .keys()
            .filter_map(|label| {
                let digits: String = label
                    .chars()
                    .skip_while(|c| !c.is_ascii_digit())
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<u64>().ok()
            })
            .max();
        largest.map_or(1, |n| n + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item(String);

    impl Labeled for Item {
        fn label(&self) -> &str {
            &self.0
        }
        fn set_label(&mut self, label: String) {
            self.0 = label;
        }
    }

    #[test]
    fn test_insert_and_find() {
        let mut reg: Registry<NodeId, Item> = Registry::new();
        let a = reg.insert(Item("a".into())).unwrap();
        assert!(matches!(reg.insert(Item("a".into())), Err(FEAError::DuplicateName(_))));
        assert_eq!(reg.find("a").unwrap(), a);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order_and_handles() {
        let mut reg: Registry<NodeId, Item> = Registry::new();
        let a = reg.insert(Item("a".into())).unwrap();
        let b = reg.insert(Item("b".into())).unwrap();
        let c = reg.insert(Item("c".into())).unwrap();
        reg.remove(b).unwrap();
        assert!(reg.get(b).is_err());
        assert_eq!(reg.ids(), vec![a, c]);
        let d = reg.insert(Item("b".into())).unwrap();
        assert_ne!(d, b);
    }

    #[test]
    fn test_relabel() {
        let mut reg: Registry<NodeId, Item> = Registry::new();
        let a = reg.insert(Item("a".into())).unwrap();
        reg.insert(Item("b".into())).unwrap();
        assert!(reg.relabel(a, "b").is_err());
        reg.relabel(a, "z").unwrap();
        assert_eq!(reg.find("z").unwrap(), a);
        assert!(reg.find("a").is_err());
        assert_eq!(reg.get(a).unwrap().label(), "z");
    }

    #[test]
    fn test_next_numeric_label() {
        let mut reg: Registry<NodeId, Item> = Registry::new();
        assert_eq!(reg.next_numeric_label(), "1");
        reg.insert(Item("n7".into())).unwrap();
        reg.insert(Item("3".into())).unwrap();
        reg.insert(Item("support".into())).unwrap();
        assert_eq!(reg.next_numeric_label(), "8");
    }
}
