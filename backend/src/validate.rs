use crate::order::OrderSubmission;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Checks that every required field of the order is filled in.
pub fn check_required(order: &OrderSubmission) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = order
        .required_fields()
        .into_iter()
        .filter(|(_, value)| !value.is_some_and(|v| v.is_present()))
        .map(|(name, _)| name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
