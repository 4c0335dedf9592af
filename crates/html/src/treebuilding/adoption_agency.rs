//! <https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm>

use super::{
    parser::Parser,
    tree_builder::{is_special, Scope},
};
use crate::{
    error::ErrorCode,
    tokenization::{TagData, TokenSource},
};

const OUTER_LOOP_LIMIT: usize = 8;
const INNER_LOOP_LIMIT: usize = 3;

/// Parents that cause the common ancestor to foster parent its new child
const FOSTER_PARENTING_ANCESTORS: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

impl<S: TokenSource> Parser<S> {
    pub(super) fn run_adoption_agency_algorithm(&mut self, tag: &TagData) {
        // 1. Let subject be token's tag name.
        let subject = tag.name.as_str();

        // 2. Let outerLoopCounter be 0.
        // 3. While true:
        for _ in 0..OUTER_LOOP_LIMIT {
            // 1. If outerLoopCounter is greater than or equal to 8, then return.
            // 2. Increment outerLoopCounter by 1.

            // 3. Let formattingElement be the last element in the list of active formatting elements that:
            //    * is between the end of the list and the last marker in the list, if any, or the start of the list otherwise, and
            //    * has the tag name subject.
            //    If there is no such element, then return and instead act as described in the "any other end tag" entry above.
            let Some(formatting_element) = self
                .tree
                .active_formatting_elements
                .find_since_last_marker(subject, self.tree.document())
            else {
                self.any_other_end_tag_in_body(tag);
                return;
            };

            // 4. If formattingElement is not in the stack of open elements, then this is a parse error;
            //    remove the element from the list, and return.
            let Some(formatting_element_index) = self.tree.open_elements.find(formatting_element)
            else {
                self.parse_error_named(ErrorCode::AdoptionAgencyNotOnStack, subject);
                self.tree
                    .active_formatting_elements
                    .remove(formatting_element);
                return;
            };

            // 5. If formattingElement is in the stack of open elements, but the element is not in scope,
            //    act as described in the "any other end tag" entry. A scope boundary is always special,
            //    so this reports the error and ignores the token.
            if !self
                .tree
                .element_in_scope(formatting_element, Scope::Default)
            {
                self.any_other_end_tag_in_body(tag);
                return;
            }

            // 6. If formattingElement is not the current node, this is a parse error. (But do not return.)
            if formatting_element != self.tree.current_node() {
                self.parse_error_named(ErrorCode::AdoptionAgencyNotCurrentNode, subject);
            }

            // 7. Let furthestBlock be the topmost node in the stack of open elements that is lower in the stack
            //    than formattingElement, and is an element in the special category. There might not be one.
            let furthest_block = self.tree.open_elements.list()[formatting_element_index..]
                .iter()
                .copied()
                .find(|&node| is_special(self.tree.element(node)));

            // 8. If there is no furthestBlock, then the UA must first pop all the nodes from the bottom of the stack of open elements,
            //    from the current node up to and including formattingElement, then remove formattingElement from the list of
            //    active formatting elements, and finally return.
            let Some(furthest_block) = furthest_block else {
                self.tree.pop_until_node(formatting_element);
                self.tree
                    .active_formatting_elements
                    .remove(formatting_element);
                return;
            };

            // 9. Let commonAncestor be the element immediately above formattingElement in the stack of open elements.
            let common_ancestor = self
                .tree
                .open_elements
                .get(formatting_element_index - 1)
                .expect("formatting element cannot be the root element");

            // 10. Let a bookmark note the position of formattingElement in the list of active formatting elements
            //     relative to the elements on either side of it in the list.
            let mut bookmark = self
                .tree
                .active_formatting_elements
                .find(formatting_element)
                .expect("formatting element was found in the list above");

            // 11. Let node and lastNode be furthestBlock.
            let mut last_node = furthest_block;
            let mut index = self
                .tree
                .open_elements
                .find(furthest_block)
                .expect("furthest block is in the stack of open elements");

            // 12. Let innerLoopCounter be 0.
            // 13. While true:
            for _ in 0..INNER_LOOP_LIMIT {
                // 1. Increment innerLoopCounter by 1.
                // 2. Let node be the element immediately above node in the stack of open elements,
                //    or if node is no longer in the stack of open elements (e.g. because it got removed by this algorithm),
                //    the element that was immediately above node in the stack of open elements before node was removed.
                index -= 1;
                let node = self
                    .tree
                    .open_elements
                    .get(index)
                    .expect("formatting element is above the furthest block");

                // 4. If innerLoopCounter is greater than 3 and node is in the list of active formatting elements,
                //    then remove node from the list of active formatting elements.
                // 5. If node is not in the list of active formatting elements, then remove node from the stack of open elements and continue.
                if !self.tree.is_active_formatting_element(node) {
                    self.tree.open_elements.remove(node);
                    continue;
                }

                // 3. If node is formattingElement, then break.
                if node == formatting_element {
                    break;
                }

                // Bookmarks move to just after the node that is about to adopt the furthest block
                if last_node == furthest_block {
                    bookmark = self
                        .tree
                        .active_formatting_elements
                        .find(node)
                        .expect("node is in the list of active formatting elements")
                        + 1;
                }

                // 6. Create an element for the token for which the element node was created, in the HTML namespace,
                //    with commonAncestor as the intended parent; replace the entry for node in the list of active formatting
                //    elements with an entry for the new element, replace the entry for node in the stack of open elements
                //    with an entry for the new element, and let node be the new element.
                let clone = self.tree.document_mut().clone_node(node);
                self.tree.active_formatting_elements.replace(node, clone);
                self.tree.open_elements.replace(node, clone);

                // 8. Append lastNode to node.
                self.tree.document_mut().append_child(clone, last_node);

                // 9. Set lastNode to node.
                last_node = clone;
            }

            // 14. Insert whatever lastNode ended up being in the appropriate place for inserting a node,
            //     but using commonAncestor as the override target.
            self.tree.document_mut().detach(last_node);
            let ancestor_element = self.tree.element(common_ancestor);
            let needs_foster_parenting = FOSTER_PARENTING_ANCESTORS
                .iter()
                .any(|&name| ancestor_element.is_html(name));
            if needs_foster_parenting {
                let (parent, reference) = self.tree.table_misnested_node_position();
                match reference {
                    Some(reference) => self
                        .tree
                        .document_mut()
                        .insert_before(parent, last_node, reference),
                    None => self.tree.document_mut().append_child(parent, last_node),
                }
            } else {
                self.tree
                    .document_mut()
                    .append_child(common_ancestor, last_node);
            }

            // 15. Create an element for the token for which formattingElement was created,
            //     in the HTML namespace, with furthestBlock as the intended parent.
            let new_element = self.tree.document_mut().clone_node(formatting_element);

            // 16. Take all of the child nodes of furthestBlock and append them to the element created in the last step.
            self.tree
                .document_mut()
                .reparent_children(furthest_block, new_element);

            // 17. Append that new element to furthestBlock.
            self.tree
                .document_mut()
                .append_child(furthest_block, new_element);

            // 18. Remove formattingElement from the list of active formatting elements,
            //     and insert the new element into the list of active formatting elements at the position of the aforementioned bookmark.
            if let Some(old_index) = self
                .tree
                .active_formatting_elements
                .find(formatting_element)
            {
                if old_index < bookmark {
                    bookmark -= 1;
                }
            }
            self.tree
                .active_formatting_elements
                .remove(formatting_element);
            self.tree
                .active_formatting_elements
                .insert(bookmark, new_element);

            // 19. Remove formattingElement from the stack of open elements, and insert the new element into the stack of
            //     open elements immediately below the position of furthestBlock in that stack.
            self.tree.open_elements.remove(formatting_element);
            let furthest_block_index = self
                .tree
                .open_elements
                .find(furthest_block)
                .expect("furthest block is in the stack of open elements");
            self.tree
                .open_elements
                .insert(furthest_block_index + 1, new_element);

            // 20. Jump back to the step labeled outer loop.
        }
    }
}
