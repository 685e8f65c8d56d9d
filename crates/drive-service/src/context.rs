//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drive_core::types::{TenantId, UserId};

/// Identity of the caller for one drive operation.
///
/// Supplied by whatever authenticated the request and passed into every
/// service method. The drive performs ownership checks against `user_id`
/// and never looks up an ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: UserId,
    /// The tenant that owns the acting user.
    pub tenant_id: TenantId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            tenant_id,
            request_time: Utc::now(),
        }
    }
}
