use crate::domain::{DomainError, DomainResult};

/// Validate a garde-annotated value, mapping the report into the domain
/// error taxonomy.
pub fn validate<T>(value: &T) -> DomainResult<()>
where
    T: ::garde::Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::Validation(report.to_string()))
}
