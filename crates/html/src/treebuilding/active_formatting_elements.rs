use crate::dom::{Document, NodeId};

/// <https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements>
#[derive(Clone, Debug, Default)]
pub struct ActiveFormattingElements {
    elements: Vec<FormatEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatEntry {
    Marker,
    Element(NodeId),
}

impl FormatEntry {
    #[inline]
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Marker)
    }

    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            Self::Element(element) => Some(*element),
            Self::Marker => None,
        }
    }
}

impl ActiveFormattingElements {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements>
    pub fn push(&mut self, element: NodeId, document: &Document) {
        // 1. If there are already three elements in the list of active formatting elements after the last marker,
        //    if any, or anywhere in the list if there are no markers, that have the same tag name, namespace, and attributes as element,
        //    then remove the earliest such element from the list of active formatting elements.
        //    For these purposes, the attributes must be compared as they were when the elements were created by the parser;
        //    two elements have the same attributes if all their parsed attributes can be paired such that the two attributes
        //    in each pair have identical names, namespaces, and values (the order of the attributes does not matter).
        if let Some(data) = document.element(element) {
            let matches: Vec<usize> = self.elements[self.last_marker()..]
                .iter()
                .enumerate()
                .filter_map(|(i, entry)| Some((i, entry.as_element()?)))
                .filter(|&(_, candidate)| {
                    document
                        .element(candidate)
                        .is_some_and(|candidate| candidate.has_same_identity(data))
                })
                .map(|(i, _)| i)
                .collect();

            assert!(matches.len() <= 3);
            if matches.len() == 3 {
                self.elements.remove(self.last_marker() + matches[0]);
            }
        }

        // 2. Add element to the list of active formatting elements.
        self.elements.push(FormatEntry::Element(element));
    }

    #[inline]
    pub fn push_marker(&mut self) {
        self.elements.push(FormatEntry::Marker)
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&FormatEntry> {
        self.elements.last()
    }

    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[FormatEntry] {
        &self.elements
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Return the index right after the last marker or `0` if there are no markers
    #[inline]
    #[must_use]
    fn last_marker(&self) -> usize {
        self.elements
            .iter()
            .rposition(FormatEntry::is_marker)
            .map_or(0, |index| index + 1)
    }

    /// The last element between the end of the list and the last marker that is
    /// an html element with the given name
    #[must_use]
    pub fn find_since_last_marker(&self, name: &str, document: &Document) -> Option<NodeId> {
        self.elements[self.last_marker()..]
            .iter()
            .rev()
            .filter_map(FormatEntry::as_element)
            .find(|&element| {
                document
                    .element(element)
                    .is_some_and(|element| element.is_html(name))
            })
    }

    #[inline]
    pub fn remove(&mut self, to_remove: NodeId) {
        self.elements
            .retain(|entry| *entry != FormatEntry::Element(to_remove))
    }

    #[must_use]
    pub fn find(&self, needle: NodeId) -> Option<usize> {
        self.elements
            .iter()
            .position(|entry| *entry == FormatEntry::Element(needle))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, needle: NodeId) -> bool {
        self.find(needle).is_some()
    }

    pub fn insert(&mut self, index: usize, element: NodeId) {
        self.elements.insert(index, FormatEntry::Element(element));
    }

    /// Replaces the entry at `index` with another element
    pub fn set(&mut self, index: usize, element: NodeId) {
        self.elements[index] = FormatEntry::Element(element);
    }

    /// Puts `replacement` where `element` used to be
    pub fn replace(&mut self, element: NodeId, replacement: NodeId) {
        if let Some(index) = self.find(element) {
            self.set(index, replacement);
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker>
    pub fn clear_up_to_last_marker(&mut self) {
        while let Some(entry) = self.elements.pop() {
            if entry.is_marker() {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dom::{Attribute, ElementData},
        infra::Namespace,
    };

    fn bold(document: &mut Document, attributes: &[(&str, &str)]) -> NodeId {
        let attributes = attributes
            .iter()
            .map(|(name, value)| Attribute::new(*name, *value))
            .collect();
        document.create_element(ElementData::new("b", Namespace::HTML, attributes))
    }

    #[test]
    fn noahs_ark_evicts_the_earliest_match() {
        let mut document = Document::new();
        let mut list = ActiveFormattingElements::default();

        let first = bold(&mut document, &[("x", "1")]);
        let other = bold(&mut document, &[("x", "2")]);
        list.push(first, &document);
        list.push(other, &document);
        for _ in 0..3 {
            let element = bold(&mut document, &[("x", "1")]);
            list.push(element, &document);
        }

        assert_eq!(list.len(), 4);
        assert!(!list.contains(first));
        assert!(list.contains(other));
    }

    #[test]
    fn markers_limit_the_search() {
        let mut document = Document::new();
        let mut list = ActiveFormattingElements::default();

        let outer = bold(&mut document, &[]);
        list.push(outer, &document);
        list.push_marker();

        assert_eq!(list.find_since_last_marker("b", &document), None);

        let inner = bold(&mut document, &[]);
        list.push(inner, &document);
        assert_eq!(list.find_since_last_marker("b", &document), Some(inner));

        list.clear_up_to_last_marker();
        assert_eq!(list.elements(), &[FormatEntry::Element(outer)]);
    }
}
