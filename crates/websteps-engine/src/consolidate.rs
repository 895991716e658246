use websteps_common::action::Action;

/// Collapses runs of consecutive Input actions on the same selector, keeping
/// the last one of each run. Any non-Input action ends the run.
///
/// Returns a new sequence; the input slice is left untouched.
pub fn consolidate(actions: &[Action]) -> Vec<Action> {
    let mut cleaned: Vec<Action> = Vec::with_capacity(actions.len());
    let mut last_input_selector: Option<&str> = None;

    for action in actions {
        if action.is_input() {
            if last_input_selector == Some(action.selector.as_str()) {
                cleaned.pop();
            }
            last_input_selector = Some(action.selector.as_str());
        } else {
            last_input_selector = None;
        }
        cleaned.push(action.clone());
    }

    cleaned
}
