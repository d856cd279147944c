use presensi_core::{AppError, EmployeeId};
use presensi_domain::{ApprovalLevel, AssignmentId};

use url::Url;

use super::{next_page_url, parse_assignments};

const PPK_ROW: &str = r#"{
    "id": 12,
    "employee_id": 77,
    "position": {"id": 3, "name": "PPK", "approval_level": 2, "can_approve_org_wide": true},
    "is_primary": false,
    "is_active": true,
    "effective_from": "2025-01-01",
    "effective_until": null
}"#;

fn assignments_of(body: &[u8]) -> Vec<presensi_domain::PositionAssignment> {
    parse_assignments(body)
        .map(|page| page.assignments)
        .unwrap_or_default()
}

fn url(value: &str) -> Url {
    Url::parse(value).unwrap_or_else(|_| unreachable!())
}

#[test]
fn plain_list_maps_to_domain_assignments() {
    let body = format!("[{PPK_ROW}]");

    let assignments = assignments_of(body.as_bytes());

    assert_eq!(assignments.len(), 1);
    let assignment = &assignments[0];
    assert_eq!(assignment.id(), Some(AssignmentId::new(12)));
    assert_eq!(assignment.employee_id(), EmployeeId::new(77));
    assert_eq!(assignment.position().display_name().as_str(), "PPK");
    assert_eq!(
        assignment.position().approval_level(),
        ApprovalLevel::ORGANIZATION
    );
    assert!(assignment.position().can_approve_org_wide());
    assert!(assignment.is_active());
    assert!(!assignment.is_primary());
}

#[test]
fn paginated_payload_is_accepted() {
    let body = format!(r#"{{"count": 1, "next": null, "results": [{PPK_ROW}]}}"#);

    let page = parse_assignments(body.as_bytes());

    assert!(matches!(
        page,
        Ok(ref value) if value.assignments.len() == 1 && value.next.is_none()
    ));
}

#[test]
fn paginated_payload_exposes_next_link() {
    let body = format!(
        r#"{{"count": 2, "next": "/api/positions/assignments?employee_id=77&page=2", "results": [{PPK_ROW}]}}"#
    );

    let next = parse_assignments(body.as_bytes())
        .ok()
        .and_then(|page| page.next);

    assert_eq!(
        next.as_deref(),
        Some("/api/positions/assignments?employee_id=77&page=2")
    );
}

#[test]
fn next_link_resolves_against_current_page() {
    let base = url("https://presensi.example.test/api/");
    let current = url("https://presensi.example.test/api/positions/assignments?employee_id=77");

    let relative = next_page_url(&base, &current, "?employee_id=77&page=2");
    let absolute = next_page_url(
        &base,
        &current,
        "https://presensi.example.test/api/positions/assignments?page=3",
    );

    assert_eq!(
        relative.ok().map(String::from).as_deref(),
        Some("https://presensi.example.test/api/positions/assignments?employee_id=77&page=2")
    );
    assert!(absolute.is_ok());
}

#[test]
fn next_link_to_foreign_host_is_refused() {
    let base = url("https://presensi.example.test/api/");
    let current = url("https://presensi.example.test/api/positions/assignments");

    let result = next_page_url(&base, &current, "https://collector.example.org/steal?page=2");

    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
}

#[test]
fn missing_active_flag_is_treated_as_inactive() {
    let body = r#"[{
        "id": 5,
        "employee_id": 77,
        "position": {"id": 1, "name": "Staff"},
        "effective_from": "2025-01-01"
    }]"#;

    let assignments = assignments_of(body.as_bytes());

    assert_eq!(assignments.len(), 1);
    assert!(!assignments[0].is_active());
    assert_eq!(
        assignments[0].position().approval_level(),
        ApprovalLevel::NONE
    );
}

#[test]
fn invalid_rows_are_skipped() {
    let body = format!(
        r#"[
            {PPK_ROW},
            {{
                "id": 6,
                "employee_id": 77,
                "position": {{"id": 2, "name": "  ", "approval_level": 1}},
                "is_active": true,
                "effective_from": "2025-01-01"
            }},
            {{
                "id": 7,
                "employee_id": 77,
                "position": {{"id": 4, "name": "Kepala Divisi", "approval_level": 1}},
                "is_active": true,
                "effective_from": "2025-06-01",
                "effective_until": "2025-01-01"
            }}
        ]"#
    );

    let assignments = assignments_of(body.as_bytes());

    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].id(), Some(AssignmentId::new(12)));
}

#[test]
fn rows_with_unreadable_fields_are_skipped() {
    let body = format!(
        r#"[
            {{
                "id": 8,
                "employee_id": 77,
                "position": {{"id": 5, "name": "Staff", "approval_level": 1}},
                "is_active": true
            }},
            {PPK_ROW},
            {{
                "id": 9,
                "employee_id": 77,
                "position": {{"id": 6, "name": "Direktur", "approval_level": 300}},
                "is_active": true,
                "effective_from": "2025-01-01"
            }}
        ]"#
    );

    let assignments = assignments_of(body.as_bytes());

    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].id(), Some(AssignmentId::new(12)));
}

#[test]
fn malformed_payload_is_an_upstream_failure() {
    let result = parse_assignments(br#"{"detail": "maintenance"}"#);

    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
}
