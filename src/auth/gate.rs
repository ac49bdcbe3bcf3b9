//! Privilege gates: pure predicate checks over a resolved user.
//!
//! Gates compose by explicit chaining; an operation requiring superuser
//! access goes through `require_active` first, so an inactive superuser is
//! rejected before the privilege check runs.

use super::AuthError;
use crate::store::UserRecord;

/// # Errors
///
/// `InactiveUser` if the record is flagged inactive.
pub fn require_active(user: UserRecord) -> Result<UserRecord, AuthError> {
    if user.is_active {
        Ok(user)
    } else {
        Err(AuthError::InactiveUser)
    }
}

/// # Errors
///
/// `InsufficientPrivilege` if the record lacks the superuser flag.
pub fn require_superuser(user: UserRecord) -> Result<UserRecord, AuthError> {
    if user.is_superuser {
        Ok(user)
    } else {
        Err(AuthError::InsufficientPrivilege)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(is_active: bool, is_superuser: bool) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            hashed_password: "$argon2id$fake".to_string(),
            is_active,
            is_superuser,
            full_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_user_passes_active_gate() {
        assert!(require_active(user(true, false)).is_ok());
    }

    #[test]
    fn inactive_user_is_rejected() {
        assert!(matches!(
            require_active(user(false, false)),
            Err(AuthError::InactiveUser)
        ));
    }

    #[test]
    fn superuser_gate_accepts_active_superuser() {
        let result = require_active(user(true, true)).and_then(require_superuser);
        assert!(result.is_ok());
    }

    #[test]
    fn superuser_gate_rejects_plain_user() {
        let result = require_active(user(true, false)).and_then(require_superuser);
        assert!(matches!(result, Err(AuthError::InsufficientPrivilege)));
    }

    #[test]
    fn inactive_superuser_is_rejected_by_active_gate() {
        // Chained gates: activity is checked before privilege.
        let result = require_active(user(false, true)).and_then(require_superuser);
        assert!(matches!(result, Err(AuthError::InactiveUser)));
    }

    #[test]
    fn gates_do_not_mutate_the_record() {
        let input = user(true, true);
        let id = input.id;
        let output =
            require_active(input).and_then(require_superuser).expect("active superuser passes");
        assert_eq!(output.id, id);
        assert!(output.is_active);
        assert!(output.is_superuser);
    }
}
