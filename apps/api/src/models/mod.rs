pub mod candidate;
pub mod job;
pub mod resume;

use serde::Serialize;

use crate::errors::AppError;

/// Envelope for paginated list endpoints.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Validates skip/limit query parameters and applies defaults (skip 0, limit 20).
pub fn validate_pagination(skip: Option<i64>, limit: Option<i64>) -> Result<(i64, i64), AppError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(20);

    if skip < 0 {
        return Err(AppError::Validation("skip must be >= 0".to_string()));
    }
    if !(1..=100).contains(&limit) {
        return Err(AppError::Validation(
            "limit must be between 1 and 100".to_string(),
        ));
    }
    Ok((skip, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let (skip, limit) = validate_pagination(None, None).unwrap();
        assert_eq!(skip, 0);
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_pagination_rejects_negative_skip() {
        assert!(validate_pagination(Some(-1), None).is_err());
    }

    #[test]
    fn test_pagination_rejects_out_of_range_limit() {
        assert!(validate_pagination(None, Some(0)).is_err());
        assert!(validate_pagination(None, Some(101)).is_err());
        assert!(validate_pagination(None, Some(100)).is_ok());
    }
}
