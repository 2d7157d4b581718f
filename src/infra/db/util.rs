use crate::application::repos::StoreError;
use crate::domain::entities::PostId;

/// Translate a driver error into a `StoreError` carrying operation context.
pub fn map_sqlx_error(
    operation: &'static str,
    id: Option<&PostId>,
    err: sqlx::Error,
) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => match id {
            Some(id) => StoreError::not_found(id),
            None => StoreError::backend(operation, None, "row not found"),
        },
        sqlx::Error::PoolTimedOut => StoreError::Timeout { operation },
        sqlx::Error::Database(db) if db.message().contains("duplicate key") => match id {
            Some(id) => StoreError::Duplicate { id: id.clone() },
            None => StoreError::backend(operation, None, db.message()),
        },
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to statement timeout")
                || db
                    .message()
                    .contains("canceling statement due to user request") =>
        {
            StoreError::Timeout { operation }
        }
        other => StoreError::backend(operation, id, other),
    }
}

/// Parse an opaque id into the `BIGSERIAL` key type. Non-canonical spellings
/// (`"007"`, `"+7"`) are rejected.
pub(crate) fn parse_key(id: &PostId) -> Result<i64, StoreError> {
    let raw = id.as_str().trim();
    let key = raw
        .parse::<i64>()
        .map_err(|err| StoreError::invalid_id(id.as_str(), err))?;
    if key.to_string() != raw {
        return Err(StoreError::invalid_id(
            id.as_str(),
            "identifier is not in canonical decimal form",
        ));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::StoreErrorKind;

    #[test]
    fn row_not_found_becomes_not_found_for_keyed_operations() {
        let id = PostId::new("4");
        let err = map_sqlx_error("get_by_id", Some(&id), sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn pool_timeout_becomes_timeout() {
        let err = map_sqlx_error("get_all", None, sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Timeout { operation: "get_all" }));
    }

    #[test]
    fn other_driver_errors_are_wrapped() {
        let err = map_sqlx_error("add", None, sqlx::Error::PoolClosed);
        assert_eq!(err.kind(), StoreErrorKind::Store);
        assert!(err.to_string().starts_with("add failed"));
    }

    #[test]
    fn keys_must_be_integers() {
        assert_eq!(parse_key(&PostId::new("42")).expect("key"), 42);
        let err = parse_key(&PostId::new("not-a-number")).expect_err("invalid");
        assert_eq!(err.kind(), StoreErrorKind::Validation);
    }

    #[test]
    fn non_canonical_keys_are_rejected() {
        for raw in ["042", "+42", "00", "-0"] {
            let err = parse_key(&PostId::new(raw)).expect_err("non-canonical");
            assert!(matches!(err, StoreError::InvalidId { .. }), "raw = {raw}");
        }
        assert_eq!(parse_key(&PostId::new("-3")).expect("negative key"), -3);
    }
}
