use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Flatten validator's nested error structure into one message per field for
/// inline display next to the form inputs.
pub fn field_errors(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .filter_map(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .next()
                .unwrap_or_else(|| "Invalid value".to_string());
            (field.to_string(), message)
        })
        .collect()
}
