use shared::domain::{LeadStatus, NewLead};
use storage::LeadStore;

fn candidate(email: String) -> NewLead {
    NewLead {
        first_name: Some("Load".into()),
        last_name: Some("Test".into()),
        email: Some(email),
        linkedin: Some("https://li/load".into()),
        message: Some("hello".into()),
        ..NewLead::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_are_never_lost() {
    let store = LeadStore::new();
    let mut tasks = Vec::new();
    for i in 0..64 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .create(candidate(format!("lead{i}@x.com")))
                .await
                .expect("create")
        }));
    }
    for task in tasks {
        task.await.expect("join");
    }

    let leads = store.list().await;
    assert_eq!(leads.len(), 64);
    assert!(leads.iter().all(|lead| lead.status == LeadStatus::Pending));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_status_updates_settle_on_reached_out() {
    let store = LeadStore::new();
    for i in 0..16 {
        store
            .create(candidate(format!("lead{i}@x.com")))
            .await
            .expect("create");
    }

    let mut tasks = Vec::new();
    for _ in 0..4 {
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .update_status(&format!("lead{i}@x.com"), LeadStatus::ReachedOut)
                    .await
                    .expect("update")
            }));
        }
    }
    for task in tasks {
        task.await.expect("join");
    }

    assert!(store
        .list()
        .await
        .iter()
        .all(|lead| lead.status == LeadStatus::ReachedOut));
}
