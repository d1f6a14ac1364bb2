//! # Route Authorization Middleware
//!
//! Wraps a request handler and runs the guards before invoking it.
//!
//! ## Evaluation order
//!
//! The first failure wins and skips the remaining checks:
//!
//! 1. resolve the authenticated user; absent → 401 "Authentication required"
//! 2. `permission`
//! 3. `any_permissions`
//! 4. `all_permissions`
//! 5. `role`, then `any_roles`, then `all_roles`
//! 6. `require_admin`
//! 7. `require_super_admin`
//! 8. `custom_check` (may be async; `false` or a failure is a denial)
//! 9. invoke the handler with the user attached
//!
//! Guard failures in steps 2–8 become a 403 [`Rejection`]. A resolver that
//! fails (as opposed to finding no user) and errors returned by the handler
//! itself are passed through as [`RouteError`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use admin_auth::middleware::{
//!     handler_fn, AuthorizationConfig, AuthorizedRequest, Outcome, RouteAuthorization,
//!     UserResolver,
//! };
//! use admin_users::User;
//! use async_trait::async_trait;
//!
//! struct Request {
//!     session_user: Option<User>,
//! }
//!
//! struct SessionResolver;
//!
//! #[async_trait]
//! impl UserResolver<Request> for SessionResolver {
//!     type Error = std::convert::Infallible;
//!
//!     async fn resolve(&self, request: &Request) -> Result<Option<User>, Self::Error> {
//!         Ok(request.session_user.clone())
//!     }
//! }
//!
//! # async fn run() {
//! let route = RouteAuthorization::new(
//!     AuthorizationConfig::for_permission("users:delete"),
//!     SessionResolver,
//!     handler_fn(|req: AuthorizedRequest<Request>| async move {
//!         Ok::<_, std::io::Error>(format!("deleted by {}", req.user.email()))
//!     }),
//! );
//!
//! match route.call(Request { session_user: None }).await.unwrap() {
//!     Outcome::Allowed(body) => println!("{body}"),
//!     Outcome::Denied(rejection) => assert_eq!(rejection.status, 401),
//! }
//! # }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use admin_users::User;

use crate::error::{AuthError, AuthResult};
use crate::guards;

/// Message used when a custom check fails and no `error_message` is set.
pub const DEFAULT_CUSTOM_CHECK_MESSAGE: &str = "Custom authorization check failed";

/// Error type a custom check may fail with.
pub type CheckError = Box<dyn std::error::Error + Send + Sync>;

/// A caller-supplied authorization predicate, evaluated last.
#[async_trait]
pub trait AuthorizationCheck: Send + Sync {
    /// Decide whether `user` may proceed.
    async fn check(&self, user: &User) -> Result<bool, CheckError>;
}

/// Adapts a synchronous closure into an [`AuthorizationCheck`].
pub struct FnCheck<F>(pub F);

#[async_trait]
impl<F> AuthorizationCheck for FnCheck<F>
where
    F: Fn(&User) -> bool + Send + Sync,
{
    async fn check(&self, user: &User) -> Result<bool, CheckError> {
        Ok((self.0)(user))
    }
}

/// Declared requirements of a route.
///
/// Every field is optional; unset fields are skipped.
///
/// # Example
///
/// ```
/// use admin_auth::AuthorizationConfig;
///
/// let config = AuthorizationConfig::new()
///     .any_permissions(["users:update", "users:delete"])
///     .role("ADMIN")
///     .custom_check_fn(|user| user.email().ends_with("@example.com"))
///     .error_message("Only staff accounts may do this");
/// assert!(config.has_custom_check());
/// ```
#[derive(Clone, Default)]
pub struct AuthorizationConfig {
    permission: Option<String>,
    any_permissions: Option<Vec<String>>,
    all_permissions: Option<Vec<String>>,
    role: Option<String>,
    any_roles: Option<Vec<String>>,
    all_roles: Option<Vec<String>>,
    require_admin: bool,
    require_super_admin: bool,
    custom_check: Option<Arc<dyn AuthorizationCheck>>,
    error_message: Option<String>,
}

impl AuthorizationConfig {
    /// Create an empty configuration: only authentication is required.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a route requiring one permission.
    pub fn for_permission(permission: impl Into<String>) -> Self {
        Self::new().permission(permission)
    }

    /// Shorthand for a route requiring ADMIN or SUPER_ADMIN.
    pub fn for_admin() -> Self {
        Self::new().admin()
    }

    /// Shorthand for a route requiring SUPER_ADMIN.
    pub fn for_super_admin() -> Self {
        Self::new().super_admin()
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn any_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any_permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn all_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all_permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn any_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn all_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all_roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn admin(mut self) -> Self {
        self.require_admin = true;
        self
    }

    pub fn super_admin(mut self) -> Self {
        self.require_super_admin = true;
        self
    }

    pub fn custom_check(mut self, check: impl AuthorizationCheck + 'static) -> Self {
        self.custom_check = Some(Arc::new(check));
        self
    }

    pub fn custom_check_fn<F>(self, check: F) -> Self
    where
        F: Fn(&User) -> bool + Send + Sync + 'static,
    {
        self.custom_check(FnCheck(check))
    }

    /// Message reported when the custom check fails.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn has_custom_check(&self) -> bool {
        self.custom_check.is_some()
    }

    /// Evaluate the configuration against a resolved user.
    ///
    /// This runs steps 1–8 of the evaluation order and returns the first
    /// denial.
    pub async fn authorize(&self, user: Option<&User>) -> AuthResult<()> {
        let user = user.ok_or(AuthError::AuthenticationRequired)?;
        let subject = Some(user);

        if let Some(permission) = &self.permission {
            guards::require_permission(subject, permission)?;
        }
        if let Some(permissions) = &self.any_permissions {
            guards::require_any_permission(subject, permissions.as_slice())?;
        }
        if let Some(permissions) = &self.all_permissions {
            guards::require_all_permissions(subject, permissions.as_slice())?;
        }
        if let Some(role) = &self.role {
            guards::require_role(subject, role)?;
        }
        if let Some(roles) = &self.any_roles {
            guards::require_any_role(subject, roles.as_slice())?;
        }
        if let Some(roles) = &self.all_roles {
            guards::require_all_roles(subject, roles.as_slice())?;
        }
        if self.require_admin {
            guards::require_admin(subject)?;
        }
        if self.require_super_admin {
            guards::require_super_admin(subject)?;
        }
        if let Some(check) = &self.custom_check {
            let allowed = match check.check(user).await {
                Ok(allowed) => allowed,
                Err(e) => {
                    warn!(user_id = %user.id(), error = %e, "Custom authorization check failed");
                    false
                }
            };
            if !allowed {
                return Err(AuthError::Custom(
                    self.error_message
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CUSTOM_CHECK_MESSAGE.to_string()),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AuthorizationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationConfig")
            .field("permission", &self.permission)
            .field("any_permissions", &self.any_permissions)
            .field("all_permissions", &self.all_permissions)
            .field("role", &self.role)
            .field("any_roles", &self.any_roles)
            .field("all_roles", &self.all_roles)
            .field("require_admin", &self.require_admin)
            .field("require_super_admin", &self.require_super_admin)
            .field("custom_check", &self.custom_check.is_some())
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// Resolves the authenticated user from an inbound request.
///
/// `Ok(None)` means the request is not authenticated. `Err` means the user
/// could not be looked up at all and is surfaced to the caller.
#[async_trait]
pub trait UserResolver<Req>: Send + Sync
where
    Req: Send + Sync,
{
    type Error: Send;

    async fn resolve(&self, request: &Req) -> Result<Option<User>, Self::Error>;
}

/// A request that passed authorization, with its user attached.
#[derive(Debug, Clone)]
pub struct AuthorizedRequest<Req> {
    pub request: Req,
    pub user: User,
}

/// The handler wrapped by [`RouteAuthorization`].
#[async_trait]
pub trait RequestHandler<Req>: Send + Sync
where
    Req: Send + 'static,
{
    type Output: Send;
    type Error: Send;

    async fn handle(&self, request: AuthorizedRequest<Req>) -> Result<Self::Output, Self::Error>;
}

/// Adapts an async closure into a [`RequestHandler`].
pub struct HandlerFn<F>(F);

/// Wrap an async closure as a [`RequestHandler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn(f)
}

#[async_trait]
impl<Req, F, Fut, O, E> RequestHandler<Req> for HandlerFn<F>
where
    Req: Send + 'static,
    F: Fn(AuthorizedRequest<Req>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, E>> + Send,
    O: Send,
    E: Send,
{
    type Output = O;
    type Error = E;

    async fn handle(&self, request: AuthorizedRequest<Req>) -> Result<O, E> {
        (self.0)(request).await
    }
}

/// Structured denial returned instead of calling the handler.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Rejection {
    /// 401 when unauthenticated, 403 otherwise.
    pub status: u16,
    /// Machine-readable code.
    pub code: &'static str,
    /// The guard's message.
    pub message: String,
}

impl From<AuthError> for Rejection {
    fn from(error: AuthError) -> Self {
        Self {
            status: error.status_code(),
            code: error.error_code(),
            message: error.to_string(),
        }
    }
}

/// Failure of a wrapped route call that is not an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError<R, H> {
    /// The user resolver failed.
    Resolve(R),
    /// The handler failed.
    Handler(H),
}

impl<R: fmt::Display, H: fmt::Display> fmt::Display for RouteError<R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Resolve(e) => write!(f, "User resolution failed: {}", e),
            RouteError::Handler(e) => write!(f, "{}", e),
        }
    }
}

impl<R, H> std::error::Error for RouteError<R, H>
where
    R: fmt::Debug + fmt::Display,
    H: fmt::Debug + fmt::Display,
{
}

/// Result of a wrapped route call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The handler ran and produced a response.
    Allowed(T),
    /// Authorization failed; the handler was not called.
    Denied(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allowed(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Denied(rejection) => Some(rejection),
            Outcome::Allowed(_) => None,
        }
    }

    pub fn allowed(self) -> Option<T> {
        match self {
            Outcome::Allowed(value) => Some(value),
            Outcome::Denied(_) => None,
        }
    }
}

/// A handler guarded by an [`AuthorizationConfig`].
pub struct RouteAuthorization<R, H> {
    config: AuthorizationConfig,
    resolver: R,
    handler: H,
}

impl<R, H> RouteAuthorization<R, H> {
    pub fn new(config: AuthorizationConfig, resolver: R, handler: H) -> Self {
        Self {
            config,
            resolver,
            handler,
        }
    }

    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    /// Authorize `request` and, when allowed, run the handler.
    ///
    /// Authorization failures are returned as [`Outcome::Denied`]; resolver
    /// and handler failures surface as `Err`.
    pub async fn call<Req>(
        &self,
        request: Req,
    ) -> Result<
        Outcome<<H as RequestHandler<Req>>::Output>,
        RouteError<<R as UserResolver<Req>>::Error, <H as RequestHandler<Req>>::Error>,
    >
    where
        Req: Send + Sync + 'static,
        R: UserResolver<Req>,
        H: RequestHandler<Req>,
    {
        let user = match self.resolver.resolve(&request).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("Rejected unauthenticated request");
                return Ok(Outcome::Denied(AuthError::AuthenticationRequired.into()));
            }
            Err(e) => return Err(RouteError::Resolve(e)),
        };

        if let Err(error) = self.config.authorize(Some(&user)).await {
            warn!(
                user_id = %user.id(),
                code = error.error_code(),
                reason = %error,
                "Route authorization denied"
            );
            return Ok(Outcome::Denied(error.into()));
        }

        debug!(user_id = %user.id(), "Route authorization granted");
        self.handler
            .handle(AuthorizedRequest { request, user })
            .await
            .map(Outcome::Allowed)
            .map_err(RouteError::Handler)
    }
}
