/// Form validation plumbing.
///
/// Request structs derive `validator::Validate`; failures are flattened into
/// a field -> messages map so handlers can re-render the submitted form with
/// per-field errors and no partial write.
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::error::FieldErrors;

/// Flatten `validator` output into a field -> human-readable messages map.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();

    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(list) = kind {
            let messages = fields.entry(field.to_string()).or_default();
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for {}", field));
                messages.push(message);
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        text: String,
    }

    #[test]
    fn empty_text_produces_a_field_error() {
        let sample = Sample {
            text: String::new(),
        };
        let errors = sample.validate().unwrap_err();
        let fields = field_errors(&errors);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["text"], vec!["must not be empty".to_string()]);
    }

    #[test]
    fn valid_input_produces_no_errors() {
        let sample = Sample {
            text: "hello".to_string(),
        };
        assert!(sample.validate().is_ok());
    }
}
