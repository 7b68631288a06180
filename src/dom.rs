//! Headless document model.
//!
//! A small arena of elements standing in for the page's visual tree. Every
//! controller in this crate reads and mutates a [`Document`]; a host mirrors
//! the resulting state into whatever renders it.

use std::collections::BTreeMap;
use std::fmt;

/// Handle to an element inside a [`Document`].
///
/// Slots of removed elements are recycled under a new generation, so a stale
/// id stops resolving instead of pointing at the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// How a scroll-into-view should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// A scroll-into-view request recorded by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: ElementId,
    pub behavior: ScrollBehavior,
}

/// A single node of the visual tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    content: String,
    value: String,
    disabled: bool,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    /// Creates a detached element with the given tag name (lowercased).
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Sets an attribute. `id` and `class` are routed like in HTML.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Adds every whitespace-separated class in `classes`.
    #[must_use]
    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    #[must_use]
    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if name == "class" {
            self.set_class_name(value);
        } else {
            self.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Space-joined class list, as `className` would report it.
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    /// Replaces the whole class list.
    pub fn set_class_name(&mut self, class_name: &str) {
        self.classes.clear();
        for class in class_name.split_whitespace() {
            self.add_class(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        self.styles.insert(property.to_string(), value.to_string());
    }

    pub fn remove_style(&mut self, property: &str) -> Option<String> {
        self.styles.remove(property)
    }

    /// `true` when the element is hidden with `display: none`.
    pub fn is_hidden(&self) -> bool {
        self.style("display") == Some("none")
    }

    /// The element's own label or text, excluding children.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
    }

    /// Current value of a form field.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Value of the `type` attribute, lowercased. Inputs default to `text`.
    pub fn input_type(&self) -> Option<String> {
        match self.attr("type") {
            Some(kind) => Some(kind.to_ascii_lowercase()),
            None if self.tag == "input" => Some("text".to_string()),
            None => None,
        }
    }

    /// `true` for `input`, `select` and `textarea`.
    pub fn is_form_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Arena-backed visual tree with a single `body` root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Slot>,
    free: Vec<usize>,
    body: ElementId,
    authenticated: bool,
    last_scroll: Option<ScrollRequest>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Slot {
                generation: 0,
                element: Some(Element::new("body")),
            }],
            free: Vec::new(),
            body: ElementId {
                index: 0,
                generation: 0,
            },
            authenticated: false,
            last_scroll: None,
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Whether the page was rendered for a signed-in user.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    /// Creates a detached element and returns its id.
    pub fn create(&mut self, element: Element) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index];
            slot.element = Some(element);
            return ElementId {
                index,
                generation: slot.generation,
            };
        }
        self.nodes.push(Slot {
            generation: 0,
            element: Some(element),
        });
        ElementId {
            index: self.nodes.len() - 1,
            generation: 0,
        }
    }

    /// Creates `element` as the last child of `parent`.
    ///
    /// Returns `None` when `parent` no longer exists.
    pub fn append(&mut self, parent: ElementId, element: Element) -> Option<ElementId> {
        if self.get(parent).is_none() {
            return None;
        }
        let id = self.create(element);
        self.append_child(parent, id);
        Some(id)
    }

    /// Creates `element` as the first child of `parent`.
    pub fn prepend(&mut self, parent: ElementId, element: Element) -> Option<ElementId> {
        let id = self.append(parent, element)?;
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|c| *c != id);
            node.children.insert(0, id);
        }
        Some(id)
    }

    /// Moves `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if parent == child
            || self.get(parent).is_none()
            || self.get(child).is_none()
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.get(id).and_then(|e| e.parent);
        if let Some(parent) = parent {
            if let Some(node) = self.get_mut(parent) {
                node.children.retain(|c| *c != id);
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Removes an element and its whole subtree.
    ///
    /// Returns `false` if the element was already gone. The body cannot be
    /// removed.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.body || self.get(id).is_none() {
            return false;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .nodes
                .get_mut(current.index)
                .filter(|s| s.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = slot.element.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                stack.extend(node.children);
            }
        }
        true
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.element.as_ref())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.element.as_mut())
    }

    /// `true` when the element exists and is reachable from the body.
    pub fn is_connected(&self, id: ElementId) -> bool {
        id == self.body || self.is_ancestor(self.body, id)
    }

    /// `true` when `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.get(id).and_then(|e| e.parent);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.get(node).and_then(|e| e.parent);
        }
        false
    }

    /// Pre-order descendants of `root`, excluding `root` itself.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.get(root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Connected elements matching `predicate`, in document order.
    pub fn select<F>(&self, predicate: F) -> Vec<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        self.select_within(self.body, predicate)
    }

    /// Descendants of `root` matching `predicate`, in document order.
    pub fn select_within<F>(&self, root: ElementId, predicate: F) -> Vec<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(&predicate))
            .collect()
    }

    pub fn select_class(&self, class: &str) -> Vec<ElementId> {
        self.select(|e| e.has_class(class))
    }

    pub fn select_tag(&self, tag: &str) -> Vec<ElementId> {
        self.select(|e| e.tag == tag)
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<ElementId> {
        if id.is_empty() {
            return None;
        }
        self.select(|e| e.id() == Some(id)).into_iter().next()
    }

    /// The element itself or its nearest ancestor matching `predicate`.
    pub fn closest<F>(&self, id: ElementId, predicate: F) -> Option<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if predicate(node) {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// The form a field belongs to: its `form` attribute, else the nearest
    /// enclosing `form`.
    pub fn form_owner(&self, id: ElementId) -> Option<ElementId> {
        let node = self.get(id)?;
        if let Some(form_id) = node.attr("form") {
            return self
                .element_by_id(form_id)
                .filter(|f| self.get(*f).is_some_and(|e| e.tag == "form"));
        }
        let parent = node.parent?;
        self.closest(parent, |e| e.tag == "form")
    }

    /// Own content of the element and all descendants, concatenated.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut text = self
            .get(id)
            .map(|e| e.content.clone())
            .unwrap_or_default();
        for child in self.descendants(id) {
            if let Some(node) = self.get(child) {
                text.push_str(&node.content);
            }
        }
        text
    }

    /// Records a scroll-into-view of `target`.
    pub fn scroll_into_view(&mut self, target: ElementId, behavior: ScrollBehavior) -> bool {
        if !self.is_connected(target) {
            return false;
        }
        self.last_scroll = Some(ScrollRequest { target, behavior });
        true
    }

    /// Most recent scroll request, if any.
    pub fn last_scroll(&self) -> Option<ScrollRequest> {
        self.last_scroll
    }
}
