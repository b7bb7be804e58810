use super::*;
use shared::domain::VisaCategory;

fn candidate(email: &str) -> NewLead {
    NewLead {
        first_name: Some("Ana".into()),
        last_name: Some("Lee".into()),
        email: Some(email.into()),
        linkedin: Some("https://li/ana".into()),
        message: Some("help".into()),
        ..NewLead::default()
    }
}

#[tokio::test]
async fn create_stores_pending_lead_with_submitted_values() {
    let store = LeadStore::new();
    let mut input = candidate("ana@x.com");
    input.country = Some("Brazil".into());
    input.visas = Some(vec![VisaCategory::O1, VisaCategory::Eb2Niw]);
    input.resume = Some("memory://resumes/cv.pdf".into());

    let lead = store.create(input).await.expect("create");
    assert_eq!(lead.status, LeadStatus::Pending);
    assert_eq!(lead.first_name, "Ana");
    assert_eq!(lead.last_name, "Lee");
    assert_eq!(lead.email, "ana@x.com");
    assert_eq!(lead.linkedin, "https://li/ana");
    assert_eq!(lead.message, "help");
    assert_eq!(lead.country.as_deref(), Some("Brazil"));
    assert_eq!(lead.visas, vec![VisaCategory::O1, VisaCategory::Eb2Niw]);
    assert_eq!(lead.resume.as_deref(), Some("memory://resumes/cv.pdf"));
    assert_eq!(store.list().await, vec![lead]);
}

#[tokio::test]
async fn create_rejects_each_missing_or_empty_required_field() {
    let store = LeadStore::new();
    let cases: [(&str, fn(&mut NewLead)); 5] = [
        ("firstName", |c| c.first_name = None),
        ("lastName", |c| c.last_name = Some(String::new())),
        ("email", |c| c.email = None),
        ("linkedin", |c| c.linkedin = Some("   ".into())),
        ("message", |c| c.message = None),
    ];

    for (field, strip) in cases {
        let mut input = candidate("ana@x.com");
        strip(&mut input);
        let err = store.create(input).await.expect_err("should fail");
        assert_eq!(err, StoreError::Validation { field });
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn create_allows_duplicate_emails() {
    let store = LeadStore::new();
    store.create(candidate("dup@x.com")).await.expect("first");
    store.create(candidate("dup@x.com")).await.expect("second");
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn list_preserves_insertion_order() {
    let store = LeadStore::new();
    let emails: Vec<String> = (0..5).map(|i| format!("lead{i}@x.com")).collect();
    for email in &emails {
        store.create(candidate(email)).await.expect("create");
    }

    let listed: Vec<String> = store.list().await.into_iter().map(|l| l.email).collect();
    assert_eq!(listed, emails);
}

#[tokio::test]
async fn update_status_changes_only_first_match() {
    let store = LeadStore::new();
    store.create(candidate("dup@x.com")).await.expect("first");
    store.create(candidate("other@x.com")).await.expect("other");
    store.create(candidate("dup@x.com")).await.expect("second");

    let updated = store
        .update_status("dup@x.com", LeadStatus::ReachedOut)
        .await
        .expect("update");
    assert_eq!(updated.status, LeadStatus::ReachedOut);

    let statuses: Vec<LeadStatus> = store.list().await.into_iter().map(|l| l.status).collect();
    assert_eq!(
        statuses,
        vec![LeadStatus::ReachedOut, LeadStatus::Pending, LeadStatus::Pending]
    );
}

#[tokio::test]
async fn update_status_for_unknown_email_is_not_found() {
    let store = LeadStore::new();
    store.create(candidate("ana@x.com")).await.expect("create");
    let before = store.list().await;

    let err = store
        .update_status("ghost@x.com", LeadStatus::ReachedOut)
        .await
        .expect_err("should fail");
    assert_eq!(
        err,
        StoreError::NotFound {
            email: "ghost@x.com".into()
        }
    );
    assert_eq!(store.list().await, before);
}

#[tokio::test]
async fn update_status_requires_email() {
    let store = LeadStore::new();
    let err = store
        .update_status("", LeadStatus::ReachedOut)
        .await
        .expect_err("should fail");
    assert_eq!(err, StoreError::Validation { field: "email" });
}

#[tokio::test]
async fn update_status_rejects_moving_back_to_pending() {
    let store = LeadStore::new();
    store.create(candidate("ana@x.com")).await.expect("create");
    store
        .update_status("ana@x.com", LeadStatus::ReachedOut)
        .await
        .expect("forward");

    let err = store
        .update_status("ana@x.com", LeadStatus::Pending)
        .await
        .expect_err("should fail");
    assert_eq!(
        err,
        StoreError::InvalidTransition {
            from: LeadStatus::ReachedOut,
            to: LeadStatus::Pending,
        }
    );

    let again = store
        .update_status("ana@x.com", LeadStatus::ReachedOut)
        .await
        .expect("idempotent");
    assert_eq!(again.status, LeadStatus::ReachedOut);
}

#[tokio::test]
async fn clones_share_the_same_sequence() {
    let store = LeadStore::new();
    let handle = store.clone();
    handle.create(candidate("ana@x.com")).await.expect("create");
    assert_eq!(store.len().await, 1);
}
