//! Full site resolution scenarios
//!
//! Drives `PermissionResolver::resolve_site` end to end against the
//! in-memory fakes and asserts on the exact records produced.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use permiscan::core::types::PermissionRecord;
use permiscan::core::{KnownGroupCache, PermissionResolver};
use permiscan::utils::error::ScanError;

use crate::common::fixtures::{
    AssignmentFactory, FakeDirectory, FakeSiteGroups, dir_group, dir_user, site_security_group,
    site_user,
};

const SITE: &str = "https://tenant.sharepoint.com/sites/alpha";

fn resolver(site: Arc<FakeSiteGroups>, directory: Arc<FakeDirectory>) -> PermissionResolver {
    PermissionResolver::new(site, directory)
}

async fn resolve(
    resolver: &PermissionResolver,
    assignments: &[permiscan::RoleAssignment],
) -> Vec<PermissionRecord> {
    let cache = KnownGroupCache::new();
    resolver
        .resolve_site(SITE, assignments, &cache, &CancellationToken::new())
        .await
        .unwrap()
}

fn assert_record(
    record: &PermissionRecord,
    access_type: &str,
    account_type: &str,
    users: &str,
    levels: &str,
    remarks: &str,
) {
    assert_eq!(record.access_type, access_type);
    assert_eq!(record.account_type, account_type);
    assert_eq!(record.users, users);
    assert_eq!(record.permission_levels, levels);
    assert_eq!(record.remarks, remarks);
}

#[tokio::test]
async fn test_direct_user_assignment() {
    let resolver = resolver(
        Arc::new(FakeSiteGroups::new()),
        Arc::new(FakeDirectory::new()),
    );
    let assignments = vec![AssignmentFactory::user(SITE, "alice@x.com", &["Full Control"])];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 1);
    assert_record(
        &records[0],
        "Direct Permissions",
        "User",
        "alice@x.com",
        "Full Control",
        "",
    );
}

#[tokio::test]
async fn test_placeholder_levels_emit_nothing() {
    let site = Arc::new(FakeSiteGroups::new());
    let resolver = resolver(site.clone(), Arc::new(FakeDirectory::new()));
    let assignments = vec![AssignmentFactory::sharepoint_group(
        SITE,
        "Editors",
        &["Limited Access", "Web-Only Limited Access"],
    )];

    let records = resolve(&resolver, &assignments).await;

    assert!(records.is_empty());
    assert_eq!(site.call_count(SITE, "Editors"), 0);
}

#[tokio::test]
async fn test_levels_are_filtered_and_joined() {
    let resolver = resolver(
        Arc::new(FakeSiteGroups::new()),
        Arc::new(FakeDirectory::new()),
    );
    let assignments = vec![AssignmentFactory::user(
        SITE,
        "alice@x.com",
        &["Limited Access", "Edit", "Full Control"],
    )];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records[0].permission_levels, "Edit | Full Control");
}

#[tokio::test]
async fn test_system_principal_never_expanded() {
    let directory = Arc::new(FakeDirectory::new());
    let resolver = resolver(Arc::new(FakeSiteGroups::new()), directory.clone());
    let assignments = vec![AssignmentFactory::security_group(
        SITE,
        "Everyone except external users",
        "c:0-.f|rolemanager|spo-grid-all-users",
        &["Read"],
    )];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 1);
    assert_record(
        &records[0],
        "Direct Permissions",
        "Everyone except external users",
        "All Users",
        "Read",
        "",
    );
    assert_eq!(directory.call_count("spo-grid-all-users"), 0);
}

#[tokio::test]
async fn test_sharepoint_group_with_nested_security_group() {
    let site = FakeSiteGroups::new().with_group(
        SITE,
        "Editors",
        vec![
            site_user("alice@x.com"),
            site_security_group("grp1", "c:0t.c|tenant|grp1", None),
        ],
    );
    let directory =
        FakeDirectory::new().with_group("grp1", Vec::new(), vec![dir_user("bob@x.com")]);
    let resolver = resolver(Arc::new(site), Arc::new(directory));
    let assignments = vec![AssignmentFactory::sharepoint_group(SITE, "Editors", &["Edit"])];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 2);
    assert_record(
        &records[0],
        "SharePoint Group 'Editors'",
        "User",
        "alice@x.com",
        "Edit",
        "",
    );
    assert_record(
        &records[1],
        "SharePoint Group 'Editors'",
        "Security Group 'grp1' holds User",
        "bob@x.com",
        "Edit",
        "",
    );
}

#[tokio::test]
async fn test_group_users_are_space_joined() {
    let directory = FakeDirectory::new().with_group(
        "g-1",
        Vec::new(),
        vec![dir_user("bob@x.com"), dir_user("carol@x.com")],
    );
    let resolver = resolver(Arc::new(FakeSiteGroups::new()), Arc::new(directory));
    let assignments = vec![AssignmentFactory::security_group(
        SITE,
        "grp1",
        "g-1",
        &["Read"],
    )];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 1);
    assert_record(
        &records[0],
        "Direct Permissions",
        "Security Group 'grp1' holds User",
        "bob@x.com carol@x.com",
        "Read",
        "",
    );
}

#[tokio::test]
async fn test_breadcrumb_accumulates_across_nesting_levels() {
    let site = FakeSiteGroups::new().with_group(
        SITE,
        "Owners",
        vec![site_security_group("grpA", "g-a", Some("g-a"))],
    );
    let directory = FakeDirectory::new()
        .with_group(
            "g-a",
            Vec::new(),
            vec![dir_user("ann@x.com"), dir_group("grpB", "g-b")],
        )
        .with_group("g-b", Vec::new(), vec![dir_user("bea@x.com")]);
    let resolver = resolver(Arc::new(site), Arc::new(directory));
    let assignments = vec![AssignmentFactory::sharepoint_group(SITE, "Owners", &["Full Control"])];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 2);
    assert_record(
        &records[0],
        "SharePoint Group 'Owners'",
        "Security Group 'grpA' holds User",
        "ann@x.com",
        "Full Control",
        "",
    );
    assert_record(
        &records[1],
        "SharePoint Group 'Owners'",
        "Security Group 'grpA' holds Security Group 'grpB' holds User",
        "bea@x.com",
        "Full Control",
        "",
    );
}

#[tokio::test]
async fn test_circular_nesting_terminates_with_cycle_record() {
    let directory = Arc::new(
        FakeDirectory::new()
            .with_group(
                "g-a",
                Vec::new(),
                vec![dir_user("ann@x.com"), dir_group("grpB", "g-b")],
            )
            .with_group(
                "g-b",
                Vec::new(),
                vec![dir_user("bea@x.com"), dir_group("grpA", "g-a")],
            ),
    );
    let resolver = resolver(Arc::new(FakeSiteGroups::new()), directory.clone());
    let assignments = vec![AssignmentFactory::security_group(
        SITE,
        "grpA",
        "g-a",
        &["Read"],
    )];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 3);
    assert_record(
        &records[0],
        "Direct Permissions",
        "Security Group 'grpA' holds User",
        "ann@x.com",
        "Read",
        "",
    );
    assert_record(
        &records[1],
        "Direct Permissions",
        "Security Group 'grpA' holds Security Group 'grpB' holds User",
        "bea@x.com",
        "Read",
        "",
    );
    assert_record(
        &records[2],
        "Direct Permissions",
        "Security Group 'grpA' holds Security Group 'grpB' holds Security Group 'grpA' holds ",
        "",
        "Read",
        "Circular group nesting detected",
    );

    // each group expanded exactly once despite the cycle
    assert_eq!(directory.call_count("g-a"), 1);
    assert_eq!(directory.call_count("g-b"), 1);
}

#[tokio::test]
async fn test_failed_nested_group_is_isolated() {
    let site = FakeSiteGroups::new().with_group(
        SITE,
        "Editors",
        vec![
            site_user("alice@x.com"),
            site_security_group("broken", "g-bad", Some("g-bad")),
            site_security_group("grp2", "g-2", Some("g-2")),
        ],
    );
    let directory = FakeDirectory::new()
        .with_failing("g-bad")
        .with_group("g-2", Vec::new(), vec![dir_user("bob@x.com")]);
    let resolver = resolver(Arc::new(site), Arc::new(directory));
    let assignments = vec![AssignmentFactory::sharepoint_group(SITE, "Editors", &["Edit"])];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].users, "alice@x.com");

    let error_rows: Vec<_> = records.iter().filter(|r| !r.remarks.is_empty()).collect();
    assert_eq!(error_rows.len(), 1);
    assert_eq!(error_rows[0].account_type, "Security Group 'broken' holds ");
    assert_eq!(error_rows[0].users, "");
    assert!(error_rows[0].remarks.contains("g-bad"));

    assert_eq!(records[2].account_type, "Security Group 'grp2' holds User");
    assert_eq!(records[2].users, "bob@x.com");
}

#[tokio::test]
async fn test_sharepoint_group_failure_yields_single_error_row() {
    let site = FakeSiteGroups::new().with_failing(SITE, "Ghost");
    let resolver = resolver(Arc::new(site), Arc::new(FakeDirectory::new()));
    let assignments = vec![
        AssignmentFactory::sharepoint_group(SITE, "Ghost", &["Edit"]),
        AssignmentFactory::user(SITE, "alice@x.com", &["Read"]),
    ];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].access_type, "SharePoint Group 'Ghost'");
    assert_eq!(records[0].account_type, "");
    assert_eq!(records[0].users, "");
    assert!(records[0].remarks.contains("Ghost"));

    // the failure does not abort the remaining assignments
    assert_record(&records[1], "Direct Permissions", "User", "alice@x.com", "Read", "");
}

#[tokio::test]
async fn test_cancellation_aborts_resolution() {
    let resolver = resolver(
        Arc::new(FakeSiteGroups::new()),
        Arc::new(FakeDirectory::new()),
    );
    let assignments = vec![AssignmentFactory::user(SITE, "alice@x.com", &["Read"])];

    let cache = KnownGroupCache::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = resolver
        .resolve_site(SITE, &assignments, &cache, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[tokio::test]
async fn test_owners_marker_limits_fetch_to_owners() {
    let site = FakeSiteGroups::new().with_group(
        SITE,
        "Admins",
        vec![site_security_group(
            "grp1",
            "c:0o.c|federateddirectoryclaimprovider|g-1_o",
            None,
        )],
    );
    let directory = FakeDirectory::new().with_group(
        "g-1",
        vec![dir_user("owner@x.com")],
        vec![dir_user("member@x.com")],
    );
    let resolver = resolver(Arc::new(site), Arc::new(directory));
    let assignments = vec![AssignmentFactory::sharepoint_group(SITE, "Admins", &["Full Control"])];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].account_type, "Security Group 'grp1' holds User");
    assert_eq!(records[0].users, "owner@x.com");
}

#[tokio::test]
async fn test_bare_identifier_is_used_unchanged() {
    let directory = Arc::new(FakeDirectory::new().with_group(
        "abc123",
        Vec::new(),
        vec![dir_user("bob@x.com")],
    ));
    let resolver = resolver(Arc::new(FakeSiteGroups::new()), directory.clone());
    let assignments = vec![AssignmentFactory::security_group(
        SITE,
        "grp1",
        "abc123",
        &["Read"],
    )];

    let records = resolve(&resolver, &assignments).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].users, "bob@x.com");
    assert_eq!(directory.call_count("abc123"), 1);
}
