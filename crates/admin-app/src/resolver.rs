//! Store-backed user resolution for the route middleware.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use admin_auth::UserResolver;
use admin_users::User;

use crate::store::{AdminStore, StoreError};

/// Resolves the authenticated user by id from the admin store.
///
/// The caller supplies how to read the user id out of a request (session
/// lookup, verified token claims, ...). A request without an id, or whose
/// id no longer exists, is treated as unauthenticated. Storage failures are
/// returned as errors.
///
/// # Example
///
/// ```rust
/// use admin_app::{MemoryStore, StoreUserResolver};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// struct Request {
///     session_user_id: Option<Uuid>,
/// }
///
/// let resolver = StoreUserResolver::new(Arc::new(MemoryStore::new()), |req: &Request| {
///     req.session_user_id
/// });
/// ```
pub struct StoreUserResolver<F> {
    store: Arc<dyn AdminStore>,
    extract_user_id: F,
}

impl<F> StoreUserResolver<F> {
    pub fn new(store: Arc<dyn AdminStore>, extract_user_id: F) -> Self {
        Self {
            store,
            extract_user_id,
        }
    }
}

#[async_trait]
impl<Req, F> UserResolver<Req> for StoreUserResolver<F>
where
    Req: Send + Sync,
    F: Fn(&Req) -> Option<Uuid> + Send + Sync,
{
    type Error = StoreError;

    async fn resolve(&self, request: &Req) -> Result<Option<User>, StoreError> {
        let Some(user_id) = (self.extract_user_id)(request) else {
            return Ok(None);
        };
        match self.store.find_user(user_id).await {
            Ok(Some(user)) => Ok(Some(user)),
            Ok(None) | Err(StoreError::NotFound { .. }) => {
                debug!(user_id = %user_id, "Session refers to an unknown user");
                Ok(None)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load user for request");
                Err(e)
            }
        }
    }
}
