use serde::{Deserialize, Serialize};

use crate::error::LeaveError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[derive(sqlx::Type, strum_macros::Display, strum_macros::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    /// Single capability check used by every privileged path.
    pub fn require(self, need: Role) -> Result<(), LeaveError> {
        if self == need {
            Ok(())
        } else {
            Err(LeaveError::Forbidden(format!("{} access required", need)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_fails_admin_check() {
        assert!(Role::Admin.require(Role::Admin).is_ok());
        assert!(matches!(
            Role::Employee.require(Role::Admin),
            Err(LeaveError::Forbidden(_))
        ));
    }
}
