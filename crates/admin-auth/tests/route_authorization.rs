//! End-to-end tests for the route authorization middleware.
//!
//! A fake request carries an optional session user; the resolver reads it
//! back, standing in for session or token lookup.

use admin_auth::{
    handler_fn, AuthorizationCheck, AuthorizationConfig, AuthorizedRequest, CheckError, Outcome,
    RequestHandler, RouteAuthorization, RouteError, UserResolver,
};
use admin_rbac::{Permission, Role};
use admin_users::User;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::convert::Infallible;
use std::sync::Arc;

/// Inbound request used by every test.
#[derive(Debug, Clone)]
struct TestRequest {
    session_user: Option<User>,
    path: String,
}

impl TestRequest {
    fn anonymous() -> Self {
        Self {
            session_user: None,
            path: "/users/42".to_string(),
        }
    }

    fn as_user(user: User) -> Self {
        Self {
            session_user: Some(user),
            path: "/users/42".to_string(),
        }
    }
}

struct SessionResolver;

#[async_trait]
impl UserResolver<TestRequest> for SessionResolver {
    type Error = Infallible;

    async fn resolve(&self, request: &TestRequest) -> Result<Option<User>, Infallible> {
        Ok(request.session_user.clone())
    }
}

#[derive(Debug, PartialEq)]
struct SessionStoreDown;

/// Resolver whose backing session store is unreachable.
struct UnavailableResolver;

#[async_trait]
impl UserResolver<TestRequest> for UnavailableResolver {
    type Error = SessionStoreDown;

    async fn resolve(&self, _request: &TestRequest) -> Result<Option<User>, SessionStoreDown> {
        Err(SessionStoreDown)
    }
}

#[derive(Debug, PartialEq)]
struct HandlerFailure(String);

/// Handler that counts invocations and echoes the caller.
#[derive(Clone, Default)]
struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RequestHandler<TestRequest> for CountingHandler {
    type Output = String;
    type Error = HandlerFailure;

    async fn handle(
        &self,
        request: AuthorizedRequest<TestRequest>,
    ) -> Result<String, HandlerFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} {}", request.user.email(), request.request.path))
    }
}

fn user_with_permissions(perms: &[&str]) -> User {
    let perms = perms
        .iter()
        .map(|s| {
            let (resource, action) = s.split_once(':').unwrap();
            Permission::create(*s, None, resource, action).unwrap()
        })
        .collect();
    let mut user = User::new("alice@example.com", "Alice").unwrap();
    user.assign_role(Role::create("OPERATOR", None, false, perms).unwrap());
    user
}

fn user_with_role(name: &str) -> User {
    let mut user = User::new("bob@example.com", "Bob").unwrap();
    user.assign_role(Role::create(name, None, true, Vec::new()).unwrap());
    user
}

#[tokio::test]
async fn test_missing_user_is_401() {
    let handler = CountingHandler::default();
    let route = RouteAuthorization::new(
        AuthorizationConfig::for_permission("users:delete"),
        SessionResolver,
        handler.clone(),
    );

    let outcome = route.call(TestRequest::anonymous()).await.unwrap();
    let rejection = outcome.rejection().unwrap();
    assert_eq!(rejection.status, 401);
    assert_eq!(rejection.message, "Authentication required");
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_permission_is_403_naming_permission() {
    let handler = CountingHandler::default();
    let route = RouteAuthorization::new(
        AuthorizationConfig::for_permission("users:delete"),
        SessionResolver,
        handler.clone(),
    );

    let user = user_with_permissions(&["users:read"]);
    let outcome = route.call(TestRequest::as_user(user)).await.unwrap();
    let rejection = outcome.rejection().unwrap();
    assert_eq!(rejection.status, 403);
    assert!(rejection.message.contains("users:delete"));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_allowed_request_reaches_handler_with_user() {
    let handler = CountingHandler::default();
    let route = RouteAuthorization::new(
        AuthorizationConfig::for_permission("users:delete"),
        SessionResolver,
        handler.clone(),
    );

    let user = user_with_permissions(&["users:delete"]);
    let outcome = route.call(TestRequest::as_user(user)).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Allowed("alice@example.com /users/42".to_string())
    );
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_inactive_user_is_403_account_inactive() {
    let route = RouteAuthorization::new(
        AuthorizationConfig::for_admin(),
        SessionResolver,
        CountingHandler::default(),
    );

    let mut admin = user_with_role("ADMIN");
    admin.suspend();
    let outcome = route.call(TestRequest::as_user(admin)).await.unwrap();
    let rejection = outcome.rejection().unwrap();
    assert_eq!(rejection.status, 403);
    assert_eq!(rejection.code, "ACCOUNT_INACTIVE");
    assert_eq!(rejection.message, "Account is not active");
}

#[tokio::test]
async fn test_permission_checks_run_before_role_checks() {
    let route = RouteAuthorization::new(
        AuthorizationConfig::new()
            .all_permissions(["users:read", "users:update"])
            .role("ADMIN"),
        SessionResolver,
        CountingHandler::default(),
    );

    let outcome = route
        .call(TestRequest::as_user(user_with_role("EDITOR")))
        .await
        .unwrap();
    assert_eq!(outcome.rejection().unwrap().code, "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_super_admin_route() {
    let route = RouteAuthorization::new(
        AuthorizationConfig::for_super_admin(),
        SessionResolver,
        CountingHandler::default(),
    );

    let denied = route
        .call(TestRequest::as_user(user_with_role("ADMIN")))
        .await
        .unwrap();
    assert_eq!(
        denied.rejection().unwrap().message,
        "Super admin access required"
    );

    let allowed = route
        .call(TestRequest::as_user(user_with_role("SUPER_ADMIN")))
        .await
        .unwrap();
    assert!(allowed.is_allowed());
}

struct AsyncDomainCheck;

#[async_trait]
impl AuthorizationCheck for AsyncDomainCheck {
    async fn check(&self, user: &User) -> Result<bool, CheckError> {
        tokio::task::yield_now().await;
        Ok(user.email().ends_with("@example.com"))
    }
}

#[tokio::test]
async fn test_async_custom_check() {
    let route = RouteAuthorization::new(
        AuthorizationConfig::new()
            .custom_check(AsyncDomainCheck)
            .error_message("Staff only"),
        SessionResolver,
        CountingHandler::default(),
    );

    assert!(route
        .call(TestRequest::as_user(user_with_role("EDITOR")))
        .await
        .unwrap()
        .is_allowed());

    let mut outsider = user_with_role("EDITOR");
    outsider.update_profile("eve@elsewhere.org", "Eve").unwrap();
    let outcome = route.call(TestRequest::as_user(outsider)).await.unwrap();
    let rejection = outcome.rejection().unwrap();
    assert_eq!(rejection.status, 403);
    assert_eq!(rejection.message, "Staff only");
}

#[tokio::test]
async fn test_handler_errors_propagate_unchanged() {
    let route = RouteAuthorization::new(
        AuthorizationConfig::new(),
        SessionResolver,
        handler_fn(|_req: AuthorizedRequest<TestRequest>| async move {
            Err::<String, _>(HandlerFailure("database offline".to_string()))
        }),
    );

    let result = route
        .call(TestRequest::as_user(user_with_role("EDITOR")))
        .await;
    assert_eq!(
        result.unwrap_err(),
        RouteError::Handler(HandlerFailure("database offline".to_string()))
    );
}

#[tokio::test]
async fn test_resolver_failure_is_an_error_not_a_401() {
    let handler = CountingHandler::default();
    let route = RouteAuthorization::new(
        AuthorizationConfig::for_permission("users:delete"),
        UnavailableResolver,
        handler.clone(),
    );

    let result = route
        .call(TestRequest::as_user(user_with_permissions(&["users:delete"])))
        .await;
    assert_eq!(result.unwrap_err(), RouteError::Resolve(SessionStoreDown));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejection_serializes_as_json_body() {
    let route = RouteAuthorization::new(
        AuthorizationConfig::new().any_roles(["ADMIN", "SUPER_ADMIN"]),
        SessionResolver,
        CountingHandler::default(),
    );

    let outcome = route
        .call(TestRequest::as_user(user_with_role("EDITOR")))
        .await
        .unwrap();
    let body = serde_json::to_value(outcome.rejection().unwrap()).unwrap();
    assert_eq!(body["status"], 403);
    assert_eq!(body["code"], "ROLE_REQUIRED");
    assert_eq!(body["message"], "Role required: any of [ADMIN, SUPER_ADMIN]");
}
