//! Use cases end to end over the in-memory store.

use admin_app::{AppConfig, AppError, MemoryStore, RbacService, StoreUserResolver};
use admin_auth::{handler_fn, AuthorizationConfig, AuthorizedRequest, RouteAuthorization};
use admin_rbac::catalog::default_permissions;
use admin_rbac::{RbacError, ADMIN_ROLE, SUPER_ADMIN_ROLE, USER_ROLE};
use admin_users::UserStatus;
use std::sync::Arc;
use uuid::Uuid;

async fn seeded_service() -> RbacService {
    let service = RbacService::new(Arc::new(MemoryStore::new()));
    service.seed_system_roles().await.unwrap();
    service
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let service = RbacService::new(Arc::new(MemoryStore::new()));

    let first = service.seed_system_roles().await.unwrap();
    assert_eq!(first.permissions_created, default_permissions().len());
    assert_eq!(first.roles_created, 3);

    let second = service.seed_system_roles().await.unwrap();
    assert!(second.is_noop());
    assert_eq!(
        service.list_permissions().await.unwrap().len(),
        default_permissions().len()
    );
    assert_eq!(service.list_roles().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_seeded_system_roles_grants() {
    let service = seeded_service().await;
    let roles = service.list_roles().await.unwrap();
    let find = |name: &str| roles.iter().find(|r| r.name() == name).unwrap();

    let super_admin = find(SUPER_ADMIN_ROLE);
    assert!(super_admin.is_system());
    assert_eq!(super_admin.permissions().len(), default_permissions().len());

    let admin = find(ADMIN_ROLE);
    assert!(admin.has_all_permissions(&["users:create", "users:delete", "roles:update"]));
    assert!(admin.has_permission("permissions:read"));
    assert!(!admin.has_permission("permissions:create"));
    assert!(!admin.has_permission("settings:manage"));

    let user = find(USER_ROLE);
    assert_eq!(user.permission_strings(), vec!["dashboard:read".to_string()]);
}

#[tokio::test]
async fn test_system_roles_cannot_be_changed_or_deleted() {
    let service = seeded_service().await;
    let admin = service
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.name() == ADMIN_ROLE)
        .unwrap();
    let before = admin.permission_strings();

    let err = service.delete_role(admin.id()).await.unwrap_err();
    assert_eq!(
        err,
        AppError::Rbac(RbacError::InvalidOperation(
            "Cannot delete system role 'ADMIN'".into()
        ))
    );
    assert_eq!(err.status_code(), 409);

    let err = service
        .update_role(admin.id(), "ADMINS", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Rbac(RbacError::InvalidOperation(_))));

    let err = service
        .set_role_permissions(admin.id(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Rbac(RbacError::InvalidOperation(_))));

    let reloaded = service
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.id() == admin.id())
        .unwrap();
    assert_eq!(reloaded.permission_strings(), before);
}

#[tokio::test]
async fn test_custom_role_lifecycle() {
    let service = seeded_service().await;
    let update = service
        .create_permission("Update posts", None, "posts", "update")
        .await
        .unwrap();
    let read = service
        .create_permission("Read posts", None, "posts", "read")
        .await
        .unwrap();

    let editor = service
        .create_role("EDITOR", Some("Edits posts".into()), &[update.id()])
        .await
        .unwrap();
    assert_eq!(editor.permission_strings(), vec!["posts:update".to_string()]);

    // Adding an already held permission is a no-op.
    let editor = service
        .add_permissions_to_role(editor.id(), &[update.id(), read.id()])
        .await
        .unwrap();
    assert_eq!(editor.permissions().len(), 2);

    let editor = service
        .remove_permission_from_role(editor.id(), update.id())
        .await
        .unwrap();
    assert_eq!(editor.permission_strings(), vec!["posts:read".to_string()]);

    let editor = service
        .set_role_permissions(editor.id(), &[update.id(), update.id()])
        .await
        .unwrap();
    assert_eq!(editor.permission_strings(), vec!["posts:update".to_string()]);

    let renamed = service
        .update_role(editor.id(), "WRITER", None)
        .await
        .unwrap();
    assert_eq!(renamed.name(), "WRITER");
    assert!(renamed.description().is_none());

    service.delete_role(renamed.id()).await.unwrap();
    assert!(matches!(
        service.delete_role(renamed.id()).await,
        Err(AppError::NotFound { entity: "Role", .. })
    ));
}

#[tokio::test]
async fn test_duplicates_are_conflicts() {
    let service = seeded_service().await;

    let err = service
        .create_permission("Again", None, "users", "read")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = service.create_role(ADMIN_ROLE, None, &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    service
        .create_user("ada@example.com", "Ada", &[USER_ROLE])
        .await
        .unwrap();
    let err = service
        .create_user("ada@example.com", "Ada", &[USER_ROLE])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_validation_errors_propagate() {
    let service = seeded_service().await;

    let err = service
        .create_permission("Bad", None, "us er", "read")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Rbac(RbacError::Validation(_))));
    assert_eq!(err.status_code(), 400);

    let err = service
        .create_role(&"R".repeat(51), None, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Rbac(RbacError::Validation(_))));

    let err = service
        .create_user("not-an-email", "Bob", &[USER_ROLE])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Rbac(RbacError::Validation(_))));
}

#[tokio::test]
async fn test_user_roles_and_permissions_union() {
    let service = seeded_service().await;
    let update = service
        .create_permission("Update posts", None, "posts", "update")
        .await
        .unwrap();
    let read = service
        .create_permission("Read posts", None, "posts", "read")
        .await
        .unwrap();
    service
        .create_role("EDITOR", None, &[update.id()])
        .await
        .unwrap();
    let viewer = service
        .create_role("VIEWER", None, &[read.id()])
        .await
        .unwrap();

    let user = service
        .create_user("ed@example.com", "Ed", &["EDITOR"])
        .await
        .unwrap();
    let user = service
        .assign_roles_to_user(user.id(), &["VIEWER", "EDITOR"])
        .await
        .unwrap();
    assert_eq!(user.role_names(), vec!["EDITOR", "VIEWER"]);

    let loaded = service.load_user(user.id()).await.unwrap();
    let mut perms = loaded.all_permissions();
    perms.sort();
    assert_eq!(perms, vec!["posts:read", "posts:update"]);
    assert!(loaded.has_all_permissions(&["posts:update", "posts:read"]));
    assert!(!loaded.has_all_permissions(&["posts:update", "posts:delete"]));

    let user = service
        .remove_role_from_user(user.id(), viewer.id())
        .await
        .unwrap();
    assert!(!service
        .load_user(user.id())
        .await
        .unwrap()
        .has_permission("posts:read"));

    let user = service
        .set_user_roles(user.id(), &[viewer.id()])
        .await
        .unwrap();
    assert_eq!(user.role_names(), vec!["VIEWER"]);

    let err = service
        .assign_roles_to_user(user.id(), &["NOPE"])
        .await
        .unwrap_err();
    assert_eq!(err, AppError::not_found("Role", "NOPE"));
}

#[tokio::test]
async fn test_role_in_use_cannot_be_deleted() {
    let service = seeded_service().await;
    let role = service.create_role("EDITOR", None, &[]).await.unwrap();
    let user = service
        .create_user("ed@example.com", "Ed", &["EDITOR"])
        .await
        .unwrap();

    let err = service.delete_role(role.id()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    service.delete_user(user.id()).await.unwrap();
    service.delete_role(role.id()).await.unwrap();
}

#[tokio::test]
async fn test_deleted_permission_disappears_from_roles() {
    let service = seeded_service().await;
    let export = service
        .create_permission("Export reports", None, "reports", "export")
        .await
        .unwrap();
    let role = service
        .create_role("ANALYST", None, &[export.id()])
        .await
        .unwrap();

    service.delete_permission(export.id()).await.unwrap();

    let roles = service.list_roles().await.unwrap();
    let analyst = roles.iter().find(|r| r.id() == role.id()).unwrap();
    assert!(analyst.permissions().is_empty());
}

#[tokio::test]
async fn test_user_status_lifecycle() {
    let service = seeded_service().await;
    let user = service
        .create_user("ada@example.com", "Ada", &[ADMIN_ROLE])
        .await
        .unwrap();
    assert!(user.can_perform_admin_actions());

    let user = service
        .set_user_status(user.id(), UserStatus::Suspended)
        .await
        .unwrap();
    let loaded = service.load_user(user.id()).await.unwrap();
    assert_eq!(loaded.status(), UserStatus::Suspended);
    assert!(loaded.is_admin());
    assert!(!loaded.can_perform_admin_actions());

    let loaded = service.record_login(user.id()).await.unwrap();
    assert!(loaded.last_login_at().is_some());
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let service = seeded_service().await;
    let id = Uuid::now_v7();

    assert_eq!(
        service.load_user(id).await.unwrap_err().status_code(),
        404
    );
    assert!(matches!(
        service.update_permission_description(id, None).await,
        Err(AppError::NotFound { entity: "Permission", .. })
    ));
    assert!(matches!(
        service.create_role("EDITOR", None, &[id]).await,
        Err(AppError::NotFound { entity: "Permission", .. })
    ));
}

#[tokio::test]
async fn test_bootstrap_seeds_super_admin() {
    let config = AppConfig {
        seed_admin_email: Some("root@example.com".into()),
        ..AppConfig::default()
    };
    let service = RbacService::bootstrap(&config).await.unwrap();

    let users = service.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name(), "root");
    assert!(users[0].is_super_admin());
    assert!(users[0].has_permission("settings:manage"));

    // A second call keeps the same account.
    let again = service.ensure_super_admin("root@example.com").await.unwrap();
    assert_eq!(again.id(), users[0].id());
}

#[tokio::test]
async fn test_bootstrap_rejects_invalid_config() {
    let config = AppConfig {
        storage_backend: "cassandra".into(),
        ..AppConfig::default()
    };
    assert!(matches!(
        RbacService::bootstrap(&config).await,
        Err(AppError::Config(_))
    ));
}

struct Request {
    session_user_id: Option<Uuid>,
}

#[tokio::test]
async fn test_route_guarded_by_stored_roles() {
    let service = seeded_service().await;
    let admin = service
        .create_user("admin@example.com", "Admin", &[ADMIN_ROLE])
        .await
        .unwrap();
    let viewer = service
        .create_user("viewer@example.com", "Viewer", &[USER_ROLE])
        .await
        .unwrap();

    let route = RouteAuthorization::new(
        AuthorizationConfig::for_permission("users:delete"),
        StoreUserResolver::new(service.store().clone(), |req: &Request| {
            req.session_user_id
        }),
        handler_fn(|req: AuthorizedRequest<Request>| async move {
            Ok::<_, std::convert::Infallible>(req.user.email().to_string())
        }),
    );

    let outcome = route
        .call(Request {
            session_user_id: Some(admin.id()),
        })
        .await
        .unwrap();
    assert_eq!(outcome.allowed().as_deref(), Some("admin@example.com"));

    let outcome = route
        .call(Request {
            session_user_id: Some(viewer.id()),
        })
        .await
        .unwrap();
    assert_eq!(outcome.rejection().unwrap().status, 403);

    let outcome = route
        .call(Request {
            session_user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome.rejection().unwrap().status, 401);

    // Suspension takes effect on the next request.
    service
        .set_user_status(admin.id(), UserStatus::Suspended)
        .await
        .unwrap();
    let outcome = route
        .call(Request {
            session_user_id: Some(admin.id()),
        })
        .await
        .unwrap();
    assert_eq!(outcome.rejection().unwrap().code, "ACCOUNT_INACTIVE");
}
