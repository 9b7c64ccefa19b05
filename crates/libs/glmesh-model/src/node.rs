use std::collections::BTreeSet;

use glmesh_wire::Address;
use serde::{Deserialize, Serialize};

/// What the controller knows about one provisioned node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    /// Unicast address of the primary element.
    pub primary: Address,
    pub element_count: u8,
    /// Network key indexes the node has been given.
    #[serde(default)]
    pub net_keys: BTreeSet<u16>,
    /// Application key indexes the node has been given.
    #[serde(default)]
    pub app_keys: BTreeSet<u16>,
}

impl Node {
    pub fn new(name: impl Into<String>, primary: Address, element_count: u8) -> Self {
        Self {
            name: name.into(),
            primary,
            element_count: element_count.max(1),
            net_keys: BTreeSet::new(),
            app_keys: BTreeSet::new(),
        }
    }

    pub fn with_net_key(mut self, index: u16) -> Self {
        self.net_keys.insert(index);
        self
    }

    pub fn with_app_key(mut self, index: u16) -> Self {
        self.app_keys.insert(index);
        self
    }

    pub fn knows_net_key(&self, index: u16) -> bool {
        self.net_keys.contains(&index)
    }

    pub fn knows_app_key(&self, index: u16) -> bool {
        self.app_keys.contains(&index)
    }

    /// Address of element `offset`, if the node has that many elements.
    pub fn element(&self, offset: u8) -> Option<Address> {
        if offset >= self.element_count {
            return None;
        }
        self.primary.offset(offset)
    }

    pub fn element_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        (0..self.element_count).filter_map(move |offset| self.primary.offset(offset))
    }

    pub fn owns(&self, address: Address) -> bool {
        self.element_addresses().any(|element| element == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_follow_primary() {
        let node = Node::new("desk", Address::new(0x0010), 3);
        let elements: Vec<_> = node.element_addresses().collect();
        assert_eq!(elements, vec![Address::new(0x10), Address::new(0x11), Address::new(0x12)]);
        assert!(node.owns(Address::new(0x12)));
        assert!(!node.owns(Address::new(0x13)));
        assert_eq!(node.element(3), None);
    }

    #[test]
    fn zero_elements_means_one() {
        let node = Node::new("lamp", Address::new(0x0020), 0);
        assert_eq!(node.element_addresses().count(), 1);
    }

    #[test]
    fn key_knowledge() {
        let node = Node::new("lamp", Address::new(0x0020), 1).with_net_key(0).with_app_key(1);
        assert!(node.knows_net_key(0));
        assert!(node.knows_app_key(1));
        assert!(!node.knows_app_key(0));
    }
}
