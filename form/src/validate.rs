use cb_error::FieldError;
use cb_record::Record;
use cb_schema::{FieldInput, ValidatorSpec, DECIMAL_PATTERN};
use serde_json::Value;
use validator::{ValidateEmail, ValidateUrl};

/// Runs the derived validators against the committed record values. The
/// format checks only fire on non-empty strings; absence is the required
/// check's business.
pub(crate) fn run(inputs: &[FieldInput], record: &Record) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for input in inputs {
        let value = record.get(input.name());
        for validator in input.validators() {
            let failure = match validator {
                ValidatorSpec::Required => required(&value),
                ValidatorSpec::Email => {
                    text(&value).filter(|text| !text.validate_email()).map(|_| {
                        "Invalid email address".to_owned()
                    })
                }
                ValidatorSpec::Url => text(&value)
                    .filter(|text| !text.validate_url())
                    .map(|_| "Invalid URL".to_owned()),
                ValidatorSpec::Pattern(pattern) if pattern == DECIMAL_PATTERN => text(&value)
                    .filter(|text| text.parse::<f64>().is_err())
                    .map(|_| "Invalid decimal number".to_owned()),
                // Other patterns are enforced by the form widget.
                ValidatorSpec::Pattern(_) => None,
            };
            if let Some(description) = failure {
                errors.push(FieldError::new(input.name(), &description));
                break;
            }
        }
    }
    errors
}

fn required(value: &Option<Value>) -> Option<String> {
    let missing = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    };
    if missing {
        Some("Required".to_owned())
    } else {
        None
    }
}

fn text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.to_owned()),
        _ => None,
    }
}
