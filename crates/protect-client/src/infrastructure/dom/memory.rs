//! In-memory [`HostDocument`] used by the preview binary and by tests.
//!
//! The document is a flat set of container ids, each holding the iframes that
//! were appended to it.  Element lookup by id follows `getElementById`: the
//! first element with a matching id, in container insertion order, wins.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DomError, HostDocument, IFrameElement};

#[derive(Debug, Default)]
struct Container {
    id: String,
    children: Vec<IFrameElement>,
}

/// A host document held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    containers: Mutex<Vec<Container>>,
}

impl MemoryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the document with an empty container `id` added.
    pub fn with_container(self, id: impl Into<String>) -> Self {
        self.add_container(id);
        self
    }

    /// Adds an empty container.  Adding an id twice is a no-op.
    pub fn add_container(&self, id: impl Into<String>) {
        let id = id.into();
        let mut containers = self.lock();
        if !containers.iter().any(|c| c.id == id) {
            containers.push(Container {
                id,
                children: Vec::new(),
            });
        }
    }

    /// Returns a snapshot of the iframes appended to `container_id`.
    ///
    /// Returns an empty list for unknown containers.
    pub fn children_of(&self, container_id: &str) -> Vec<IFrameElement> {
        self.lock()
            .iter()
            .find(|c| c.id == container_id)
            .map(|c| c.children.clone())
            .unwrap_or_default()
    }

    /// Returns a snapshot of the first iframe with `element_id`.
    pub fn element(&self, element_id: &str) -> Option<IFrameElement> {
        self.lock()
            .iter()
            .flat_map(|c| c.children.iter())
            .find(|e| e.id == element_id)
            .cloned()
    }

    /// Serializes the container and its children the way `outerHTML` would.
    pub fn outer_html(&self, container_id: &str) -> Option<String> {
        let containers = self.lock();
        let container = containers.iter().find(|c| c.id == container_id)?;
        let children: String = container.children.iter().map(IFrameElement::outer_html).collect();
        Some(format!("<div id=\"{}\">{children}</div>", container.id))
    }

    // A panic while holding the lock leaves the document itself consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<Container>> {
        self.containers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostDocument for MemoryDocument {
    fn contains_container(&self, id: &str) -> bool {
        self.lock().iter().any(|c| c.id == id)
    }

    fn append_iframe(&self, container_id: &str, iframe: IFrameElement) -> Result<(), DomError> {
        let mut containers = self.lock();
        let container = containers
            .iter_mut()
            .find(|c| c.id == container_id)
            .ok_or_else(|| DomError::ElementNotFound(container_id.to_string()))?;
        container.children.push(iframe);
        Ok(())
    }

    fn set_element_height(&self, element_id: &str, height: &str) -> Result<(), DomError> {
        let mut containers = self.lock();
        let element = containers
            .iter_mut()
            .flat_map(|c| c.children.iter_mut())
            .find(|e| e.id == element_id)
            .ok_or_else(|| DomError::ElementNotFound(element_id.to_string()))?;
        element.height = Some(height.to_string());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn iframe(id: &str) -> IFrameElement {
        IFrameElement::new(id, Vec::new(), Url::parse("https://example.com/").unwrap())
    }

    #[test]
    fn test_append_to_existing_container() {
        // Arrange
        let doc = MemoryDocument::new().with_container("app");

        // Act
        doc.append_iframe("app", iframe("f")).unwrap();

        // Assert
        assert_eq!(doc.children_of("app"), vec![iframe("f")]);
        assert!(doc.contains_container("app"));
    }

    #[test]
    fn test_iframe_id_is_not_a_container() {
        // Arrange
        let doc = MemoryDocument::new().with_container("app");
        doc.append_iframe("app", iframe("f")).unwrap();

        // Act / Assert: the iframe is findable, but nothing can be attached to it.
        assert!(doc.element("f").is_some());
        assert!(!doc.contains_container("f"));
        assert!(doc.append_iframe("f", iframe("g")).is_err());
    }

    #[test]
    fn test_append_to_missing_container_fails() {
        let doc = MemoryDocument::new();
        assert_eq!(
            doc.append_iframe("missing", iframe("f")),
            Err(DomError::ElementNotFound("missing".to_string()))
        );
        assert!(doc.children_of("missing").is_empty());
    }

    #[test]
    fn test_set_height_updates_first_matching_element() {
        // Arrange: two iframes share an id, like two renders into the same page.
        let doc = MemoryDocument::new().with_container("app");
        doc.append_iframe("app", iframe("f")).unwrap();
        doc.append_iframe("app", iframe("f")).unwrap();

        // Act
        doc.set_element_height("f", "700px").unwrap();

        // Assert
        let children = doc.children_of("app");
        assert_eq!(children[0].height.as_deref(), Some("700px"));
        assert_eq!(children[1].height, None);
    }

    #[test]
    fn test_set_height_on_missing_element_fails() {
        let doc = MemoryDocument::new().with_container("app");
        assert!(doc.set_element_height("nope", "1px").is_err());
    }

    #[test]
    fn test_adding_container_twice_keeps_children() {
        let doc = MemoryDocument::new().with_container("app");
        doc.append_iframe("app", iframe("f")).unwrap();
        doc.add_container("app");
        assert_eq!(doc.children_of("app").len(), 1);
    }

    #[test]
    fn test_outer_html_wraps_children() {
        let doc = MemoryDocument::new().with_container("app");
        doc.append_iframe("app", iframe("f")).unwrap();
        assert_eq!(
            doc.outer_html("app").unwrap(),
            "<div id=\"app\"><iframe id=\"f\" src=\"https://example.com/\"></iframe></div>"
        );
        assert_eq!(doc.outer_html("other"), None);
    }
}
