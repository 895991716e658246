//! Selector Resolution
//!
//! Derives a stable, human-readable locator string for an event target. The
//! tiers are tried in order and the first that applies wins:
//!
//! 1. `#<id>`
//! 2. `<tag>[name="<name>"]`
//! 3. `<tag>.<class1>.<class2>...`
//! 4. `<tag>:nth-child(<n>)`
//! 5. `<tag>`
//!
//! Resolution never fails outward; a failed parent lookup falls through to the
//! bare tag name.

use tracing::warn;
use websteps_common::element::DomElement;

pub fn resolve<E: DomElement + ?Sized>(element: &E) -> String {
    if let Some(id) = non_empty(element.id()) {
        return format!("#{}", id);
    }

    let tag = element.tag_name();

    if let Some(name) = non_empty(element.name()) {
        return format!("{}[name=\"{}\"]", tag, name);
    }

    if let Some(class) = element.class_name().map(str::trim).filter(|c| !c.is_empty()) {
        let classes: Vec<&str> = class.split_whitespace().collect();
        return format!("{}.{}", tag, classes.join("."));
    }

    match element.sibling_position() {
        Ok(Some(index)) => return format!("{}:nth-child({})", tag, index + 1),
        Ok(None) => {}
        Err(e) => warn!("Error getting nth-child selector: {}", e),
    }

    tag
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use websteps_common::element::{ElementError, ElementSnapshot};

    struct Detached;

    impl DomElement for Detached {
        fn tag_name(&self) -> String {
            "span".into()
        }
        fn id(&self) -> Option<&str> {
            None
        }
        fn name(&self) -> Option<&str> {
            None
        }
        fn class_name(&self) -> Option<&str> {
            Some("   ")
        }
        fn sibling_position(&self) -> Result<Option<usize>, ElementError> {
            Err(ElementError::ParentLookup("node detached".into()))
        }
        fn value(&self) -> Option<&str> {
            None
        }
        fn inner_text(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_lookup_failure_falls_back_to_tag() {
        assert_eq!(resolve(&Detached), "span");
    }

    #[test]
    fn test_tag_is_lowercased() {
        let el = ElementSnapshot::new("BUTTON").with_class("Primary  Large");
        assert_eq!(resolve(&el), "button.Primary.Large");
    }

    #[test]
    fn test_empty_id_is_skipped() {
        let el = ElementSnapshot::new("input").with_id("").with_name("q");
        assert_eq!(resolve(&el), r#"input[name="q"]"#);
    }
}
