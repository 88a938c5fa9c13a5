//! Session identity: roles, the per-request session context, and the
//! `login_logs` row shape.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::order::UnknownStatus;
use super::{SessionId, UserId};
use crate::error::MarketError;

/// Account role carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shops, carts, checks out, cancels own payments.
    Buyer,
    /// Lists items; no cart/order operations through this core.
    Seller,
    /// Moderates; confirms proof of payment.
    Admin,
}

impl Role {
    /// Returns the database string for this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Authenticated identity resolved once per request and passed explicitly
/// into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    /// Authenticated account.
    pub user_id: UserId,
    /// Role the account logged in under.
    pub role: Role,
    /// The active session this request arrived on.
    pub session_id: SessionId,
}

impl SessionContext {
    /// Requires the caller to be a buyer and returns their id.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] for any other role.
    pub fn require_buyer(&self) -> Result<UserId, MarketError> {
        if self.role == Role::Buyer {
            Ok(self.user_id)
        } else {
            Err(MarketError::Forbidden)
        }
    }

    /// Requires the caller to be an admin.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] for any other role.
    pub fn require_admin(&self) -> Result<(), MarketError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(MarketError::Forbidden)
        }
    }
}

/// One `login_logs` row.
///
/// At most one row per `(user_id, role)` has `is_active = true` at any
/// committed instant; a later login flips earlier rows inactive.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Account the session belongs to.
    pub user_id: UserId,
    /// Role the account logged in under.
    pub role: Role,
    /// Session identifier presented by the client on each request.
    pub session_id: SessionId,
    /// Client address recorded at login.
    pub ip_address: String,
    /// Client user agent recorded at login.
    pub user_agent: String,
    /// When the session was opened.
    pub login_time: DateTime<Utc>,
    /// Last authenticated request on this session.
    pub last_activity: DateTime<Utc>,
    /// When the session was closed, by logout or a superseding login.
    pub logout_time: Option<DateTime<Utc>>,
    /// Whether the session is still valid.
    pub is_active: bool,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> SessionContext {
        SessionContext {
            user_id: UserId::new(),
            role,
            session_id: SessionId::new(),
        }
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()).ok(), Some(role));
        }
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn buyer_context_passes_buyer_check() {
        let context = ctx(Role::Buyer);
        assert_eq!(context.require_buyer().ok(), Some(context.user_id));
    }

    #[test]
    fn seller_and_admin_fail_buyer_check() {
        assert!(matches!(
            ctx(Role::Seller).require_buyer(),
            Err(MarketError::Forbidden)
        ));
        assert!(matches!(
            ctx(Role::Admin).require_buyer(),
            Err(MarketError::Forbidden)
        ));
    }

    #[test]
    fn only_admin_passes_admin_check() {
        assert!(ctx(Role::Admin).require_admin().is_ok());
        assert!(ctx(Role::Buyer).require_admin().is_err());
    }
}
