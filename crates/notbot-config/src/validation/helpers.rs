//! Shared validation helpers.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is empty or contains whitespace.
pub(crate) fn validate_token(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{name} must not be empty"));
    } else if value.contains(char::is_whitespace) {
        errors.push(format!("{name} = '{value}' must not contain whitespace"));
    }
}
