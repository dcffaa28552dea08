//! Host documents the application can be mounted into.

/// Handle to an element of a [`Host`] document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// The environment an application is mounted into.
pub trait Host {
    /// Returns the first element matched by `selector`.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    /// Replaces everything under `element` with `html`.
    fn set_inner_html(&mut self, element: ElementId, html: String);

    fn inner_html(&self, element: ElementId) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub inner_html: String,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        if let Some(tag) = &selector.tag {
            if !self.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &selector.id {
            if self.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        selector
            .classes
            .iter()
            .all(|class| self.classes.iter().any(|c| c == class))
    }
}

/// A compound selector: optional tag, optional `#id`, any number of `.class`.
#[derive(Debug, Default, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if selector.is_empty() || selector.contains(char::is_whitespace) {
            return None;
        }

        let mut parsed = Selector::default();
        let mut rest = selector;
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            parsed.tag = Some(rest[..tag_end].to_string());
        }
        rest = &rest[tag_end..];

        while !rest.is_empty() {
            let marker = rest.chars().next()?;
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '#' if parsed.id.is_none() => parsed.id = Some(name.to_string()),
                '.' => parsed.classes.push(name.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }

        Some(parsed)
    }
}

/// An in-memory document: a flat list of elements searched in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }
}

impl Host for Document {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let selector = Selector::parse(selector)?;
        self.elements
            .iter()
            .position(|element| element.matches(&selector))
            .map(ElementId)
    }

    fn set_inner_html(&mut self, element: ElementId, html: String) {
        if let Some(element) = self.elements.get_mut(element.0) {
            element.inner_html = html;
        }
    }

    fn inner_html(&self, element: ElementId) -> Option<&str> {
        self.element(element).map(|e| e.inner_html.as_str())
    }
}
