use std::collections::BTreeMap;

use crate::artifact::Artifact;

/// Receives the latest artifact for a slot.
///
/// Implementations must replace whatever the slot held before; calling
/// `render` twice with the same artifact leaves the same state as once.
pub trait Renderer {
    fn render(&mut self, slot: &str, artifact: Artifact);
}

/// The current content of every render slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotStore {
    slots: BTreeMap<String, Artifact>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: &str) -> Option<&Artifact> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Artifact)> {
        self.slots.iter()
    }
}

#[cfg(test)]
impl SlotStore {
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

impl Renderer for SlotStore {
    fn render(&mut self, slot: &str, artifact: Artifact) {
        self.slots.insert(slot.to_string(), artifact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::TextNode;

    #[test]
    fn render_replaces_slot_content() {
        let mut store = SlotStore::new();
        store.render("out", Artifact::Text(TextNode::line("first")));
        store.render("out", Artifact::Text(TextNode::line("second")));
        store.render("out", Artifact::Text(TextNode::line("second")));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("out"),
            Some(&Artifact::Text(TextNode::line("second")))
        );
    }
}
