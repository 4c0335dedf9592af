use crate::dom::NodeId;

#[derive(Clone, Debug, Default)]
/// <https://html.spec.whatwg.org/multipage/parsing.html#stack-of-open-elements>
///
/// This is a wrapper struct around `Vec<NodeId>` because the terminology in the html
/// spec does not match the one used for `Vec<T>` (a html stack grows "downwards") which
/// can lead to subtle bugs.
pub struct StackOfOpenElements {
    open_elements: Vec<NodeId>,
}

impl StackOfOpenElements {
    pub fn push(&mut self, node: NodeId) {
        self.open_elements.push(node);
    }

    pub fn pop(&mut self) -> Option<NodeId> {
        self.open_elements.pop()
    }

    /// The topmost node, which is always the `<html>` element once it was inserted
    #[must_use]
    pub fn top_node(&self) -> Option<NodeId> {
        self.open_elements.first().copied()
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#current-node>
    #[must_use]
    pub fn bottommost_node(&self) -> Option<NodeId> {
        self.open_elements.last().copied()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.open_elements.get(index).copied()
    }

    #[must_use]
    pub fn find(&self, needle: NodeId) -> Option<usize> {
        self.open_elements.iter().position(|&node| node == needle)
    }

    #[must_use]
    pub fn contains(&self, needle: NodeId) -> bool {
        self.find(needle).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open_elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open_elements.is_empty()
    }

    /// The stack from the top (`<html>`) to the current node
    #[must_use]
    pub fn list(&self) -> &[NodeId] {
        &self.open_elements
    }

    pub fn remove(&mut self, to_remove: NodeId) {
        self.open_elements.retain(|&node| node != to_remove);
    }

    pub fn insert(&mut self, index: usize, node: NodeId) {
        self.open_elements.insert(index, node);
    }

    /// Puts `replacement` where `node` used to be
    pub fn replace(&mut self, node: NodeId, replacement: NodeId) {
        if let Some(index) = self.find(node) {
            self.open_elements[index] = replacement;
        }
    }

    pub fn clear(&mut self) {
        self.open_elements.clear();
    }
}
