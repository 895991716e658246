//! Human-readable rendering of recorded actions.

use regex::Regex;
use std::sync::LazyLock;
use websteps_common::action::{Action, ActionKind};

pub const EMPTY_MESSAGE: &str = "No actions recorded yet.";
pub const MASK: &str = "********";

static UPPERCASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z])").unwrap());
static LETTER_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])(\d)").unwrap());
static NAME_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"name="([^"]+)""#).unwrap());

/// Renders actions as numbered steps, one per line.
pub fn actions_to_readable_text(actions: &[Action], sensitive_fields: &[String]) -> String {
    if actions.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    actions
        .iter()
        .enumerate()
        .map(|(i, action)| format!("{}. {}", i + 1, describe_action(action, sensitive_fields)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn describe_action(action: &Action, sensitive_fields: &[String]) -> String {
    match &action.kind {
        ActionKind::Click => describe_click(action),
        ActionKind::Input => {
            let value = action.value.as_deref().unwrap_or_default();
            let shown = mask_sensitive(value, &action.selector, sensitive_fields);
            format!(
                "Enter \"{}\" into the {} field",
                shown,
                readable_field_name(&action.selector)
            )
        }
        ActionKind::Other(kind) => format!("Perform {} on {}", kind, action.selector),
    }
}

fn describe_click(action: &Action) -> String {
    let selector = action.selector.as_str();
    let label = action
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(selector);

    match leading_tag(selector) {
        "button" => format!("Click the \"{}\" button", label),
        "a" => format!("Click the \"{}\" link", label),
        _ if selector.starts_with(r#"input[type="checkbox"]"#)
            || selector.starts_with(r#"input[type="radio"]"#) =>
        {
            format!("Select the \"{}\" checkbox", label)
        }
        _ if selector.contains("select") => format!("Click on the \"{}\" dropdown", label),
        _ => match action.text.as_deref().filter(|t| !t.is_empty()) {
            Some(text) => format!("Click on \"{}\"", text),
            None => format!("Click on {}", selector),
        },
    }
}

/// Tag portion of a selector: everything before the first `#`, `.`, `[` or `:`.
fn leading_tag(selector: &str) -> &str {
    let end = selector
        .find(['#', '.', '[', ':'])
        .unwrap_or(selector.len());
    &selector[..end]
}

/// Turns `#firstName` into `First Name` and `input[name="user_email"]` into
/// `User email`. Anything else is returned unchanged.
pub fn readable_field_name(selector: &str) -> String {
    if let Some(id) = selector.strip_prefix('#') {
        return humanize(id);
    }

    if selector.contains("name=")
        && let Some(name) = NAME_ATTR_RE.captures(selector).and_then(|c| c.get(1))
    {
        return humanize(name.as_str()).replace('_', " ");
    }

    selector.to_string()
}

/// Capitalization runs before the letter-digit split, so a single leading
/// letter stays attached to its digits (`a1` becomes `A1`).
fn humanize(raw: &str) -> String {
    let spaced = UPPERCASE_RE.replace_all(raw, " $1");
    let mut chars = spaced.trim_start().chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    LETTER_DIGIT_RE
        .replace_all(&capitalized, "$1 $2")
        .into_owned()
}

pub fn is_sensitive_selector(selector: &str, sensitive_fields: &[String]) -> bool {
    let selector = selector.to_lowercase();
    sensitive_fields
        .iter()
        .any(|f| !f.is_empty() && selector.contains(&f.to_lowercase()))
}

pub fn mask_sensitive(value: &str, selector: &str, sensitive_fields: &[String]) -> String {
    if is_sensitive_selector(selector, sensitive_fields) {
        MASK.to_string()
    } else {
        value.to_string()
    }
}
