use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ElementError {
    #[error("Parent lookup failed: {0}")]
    ParentLookup(String),
}

/// Read access to the DOM state the recorder needs from an event target.
///
/// Implementations report state as of the moment of the call; nothing is cached.
pub trait DomElement {
    /// Tag name, lowercased.
    fn tag_name(&self) -> String;

    fn id(&self) -> Option<&str>;

    fn name(&self) -> Option<&str>;

    /// Raw `class` attribute.
    fn class_name(&self) -> Option<&str>;

    /// Zero-based position among the parent's element children.
    ///
    /// `Ok(None)` when the element has no parent or is not found among its
    /// parent's children.
    fn sibling_position(&self) -> Result<Option<usize>, ElementError>;

    /// Current form-field value, if the element has one.
    fn value(&self) -> Option<&str>;

    /// Rendered text content.
    fn inner_text(&self) -> Option<&str>;
}

/// A serializable capture of an element's state at event time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementSnapshot {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_child_index(mut self, index: usize) -> Self {
        self.child_index = Some(index);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl DomElement for ElementSnapshot {
    fn tag_name(&self) -> String {
        self.tag.to_lowercase()
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    fn sibling_position(&self) -> Result<Option<usize>, ElementError> {
        Ok(self.child_index)
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn inner_text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// An interaction signal observed on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomEvent {
    Click {
        target: ElementSnapshot,
    },
    Focus {
        target: ElementSnapshot,
    },
    Blur {
        target: ElementSnapshot,
    },
    Input {
        target: ElementSnapshot,
    },
    Submit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ElementSnapshot>,
    },
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Click { .. } => "click",
            DomEvent::Focus { .. } => "focus",
            DomEvent::Blur { .. } => "blur",
            DomEvent::Input { .. } => "input",
            DomEvent::Submit { .. } => "submit",
        }
    }

    pub fn target(&self) -> Option<&ElementSnapshot> {
        match self {
            DomEvent::Click { target }
            | DomEvent::Focus { target }
            | DomEvent::Blur { target }
            | DomEvent::Input { target } => Some(target),
            DomEvent::Submit { target } => target.as_ref(),
        }
    }
}
