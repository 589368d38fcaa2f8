//! Authorization gate for catalogue operations.
//!
//! Every catalogue read and mutation first passes the caller identity taken
//! from the session through [`AuthorizationGate::admit`]. Admission requires
//! a caller and a matching account in the user directory; a stale session
//! whose user has gone is treated as signed out. The only way to obtain an
//! [`AuthenticatedCaller`] is through the gate.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::UserRepository;
use crate::domain::{LendingError, UserId, UserView};

/// A caller the gate has admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    view: UserView,
}

impl AuthenticatedCaller {
    /// Identifier of the admitted caller.
    pub fn id(&self) -> &UserId {
        self.view.id()
    }

    /// Public view of the admitted caller.
    pub fn view(&self) -> &UserView {
        &self.view
    }
}

/// Admits or rejects callers against the user directory.
pub struct AuthorizationGate<U: ?Sized> {
    users: Arc<U>,
}

impl<U: ?Sized> Clone for AuthorizationGate<U> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
        }
    }
}

impl<U> AuthorizationGate<U>
where
    U: UserRepository + ?Sized,
{
    /// Build a gate backed by the given user directory.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Decide whether `caller` may proceed.
    ///
    /// Returns [`LendingError::Unauthenticated`] when no caller is present or
    /// the account no longer exists, and [`LendingError::StoreUnavailable`]
    /// when the directory cannot be reached.
    pub async fn admit(&self, caller: Option<&UserId>) -> Result<AuthenticatedCaller, LendingError> {
        let Some(user_id) = caller else {
            return Err(LendingError::Unauthenticated);
        };

        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Ok(AuthenticatedCaller { view: user.view() }),
            Ok(None) => {
                warn!(user_id = %user_id, "session refers to an unknown user");
                Err(LendingError::Unauthenticated)
            }
            Err(err) => Err(LendingError::StoreUnavailable(err.to_string())),
        }
    }
}
