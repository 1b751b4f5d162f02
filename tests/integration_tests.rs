use std::sync::Arc;

use rust_decimal_macros::dec;
use time::macros::date;

use mieldb::models::update::{OrganizationPatch, TransactionPatch};
use mieldb::models::{
    AiFeedback, FeedbackCategory, FeedbackPriority, FeedbackType, Organization, Transaction,
    TransactionCategory, TransactionType, User,
};
use mieldb::provider::{BackendKind, ProviderFactory};
use mieldb::services::{FeedbackService, OrganizationService, TransactionService, UserService};
use mieldb::session::{DatabaseState, ModePreference, SessionManager};
use mieldb::sqlite_storage::{SqliteConfig, SqliteProvider};
use mieldb::storage::{DatabaseProvider, MemoryProvider, StorageError};

/// Both backends behind the shared provider contract. The memory backend
/// comes up seeded with demo fixtures, the sqlite one empty.
async fn both_backends() -> Vec<(&'static str, Arc<dyn DatabaseProvider>)> {
    let memory: Arc<dyn DatabaseProvider> = Arc::new(MemoryProvider::new());
    memory.initialize().await.unwrap();
    let sqlite: Arc<dyn DatabaseProvider> = Arc::new(SqliteProvider::new(SqliteConfig::in_memory()));
    sqlite.initialize().await.unwrap();
    vec![("memory", memory), ("sqlite", sqlite)]
}

async fn clean_backend() -> Arc<dyn DatabaseProvider> {
    let provider: Arc<dyn DatabaseProvider> =
        Arc::new(SqliteProvider::new(SqliteConfig::in_memory()));
    provider.initialize().await.unwrap();
    provider
}

fn transaction(
    org: &str,
    kind: TransactionType,
    amount: rust_decimal::Decimal,
    category_id: &str,
) -> Transaction {
    Transaction::new(
        "user-1",
        org,
        kind,
        amount,
        category_id,
        None,
        date!(2024 - 03 - 15),
    )
}

#[tokio::test]
async fn test_round_trip_on_both_backends() {
    for (name, provider) in both_backends().await {
        let users = provider.users();
        let created = users.create(User::new("roundtrip@example.com")).await.unwrap();
        assert!(!created.id.is_empty(), "{name}: id assigned");
        assert_eq!(created.created_at, created.updated_at, "{name}");

        let found = users.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created), "{name}: stored record equals returned one");
    }
}

#[tokio::test]
async fn test_update_merges_and_preserves_identity() {
    for (name, provider) in both_backends().await {
        let orgs = provider.organizations();
        let created = orgs
            .create(Organization::new(
                "Books",
                "Household Books",
                Some("ledger".to_string()),
                "merge-books",
                Some("user-9".to_string()),
            ))
            .await
            .unwrap();

        let updated = orgs
            .update(
                &created.id,
                OrganizationPatch {
                    display_name: Some("Family Books".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id, "{name}");
        assert_eq!(updated.created_at, created.created_at, "{name}");
        assert_eq!(updated.display_name, "Family Books", "{name}");
        // Unspecified fields keep their prior values.
        assert_eq!(updated.name, created.name, "{name}");
        assert_eq!(updated.description, created.description, "{name}");
        assert_eq!(updated.slug, created.slug, "{name}");
        assert!(updated.updated_at >= created.updated_at, "{name}");
    }
}

#[tokio::test]
async fn test_delete_is_final_on_both_backends() {
    for (name, provider) in both_backends().await {
        let users = provider.users();
        let created = users.create(User::new("gone@example.com")).await.unwrap();

        users.delete(&created.id).await.unwrap();
        assert_eq!(users.find_by_id(&created.id).await.unwrap(), None, "{name}");

        let err = users.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }), "{name}");
    }
}

#[tokio::test]
async fn test_update_missing_id_fails_identically() {
    for (name, provider) in both_backends().await {
        let err = provider
            .organizations()
            .update("missing", OrganizationPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }), "{name}");
    }
}

#[tokio::test]
async fn test_slug_uniqueness_enforced_on_both_backends() {
    for (name, provider) in both_backends().await {
        let service = OrganizationService::new(&provider);
        service
            .create_organization(Organization::new(
                "First",
                "First",
                None,
                "dup-slug",
                None,
            ))
            .await
            .unwrap();

        let err = service
            .create_organization(Organization::new(
                "Second",
                "Second",
                None,
                "dup-slug",
                None,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)), "{name}");
    }
}

#[tokio::test]
async fn test_email_uniqueness_and_find_or_create() {
    for (name, provider) in both_backends().await {
        let service = UserService::new(&provider);
        let first = service.create_user("unique@example.com").await.unwrap();

        let err = service.create_user("unique@example.com").await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)), "{name}");

        let again = service.find_or_create_user("unique@example.com").await.unwrap();
        assert_eq!(again.id, first.id, "{name}");
        assert!(!service.is_email_available("unique@example.com").await.unwrap());
    }
}

/// The same operation sequence must leave both backends in observably
/// identical states, compared field-by-field minus generated identity.
#[tokio::test]
async fn test_backends_reach_equivalent_states() {
    let mut outcomes: Vec<Vec<(String, String, String)>> = Vec::new();
    for (_, provider) in both_backends().await {
        let orgs = provider.organizations();
        let a = orgs
            .create(Organization::new("A", "Org A", None, "eq-a", None))
            .await
            .unwrap();
        let b = orgs
            .create(Organization::new("B", "Org B", None, "eq-b", None))
            .await
            .unwrap();
        let c = orgs
            .create(Organization::new("C", "Org C", None, "eq-c", None))
            .await
            .unwrap();

        orgs.update(
            &b.id,
            OrganizationPatch {
                name: Some("B2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        orgs.delete(&c.id).await.unwrap();
        assert_eq!(orgs.find_by_id(&c.id).await.unwrap(), None);

        let mut survivors = Vec::new();
        for id in [&a.id, &b.id] {
            let org = orgs.find_by_id(id).await.unwrap().unwrap();
            survivors.push((org.name, org.display_name, org.slug));
        }
        survivors.sort();
        outcomes.push(survivors);
    }
    assert_eq!(outcomes[0], outcomes[1]);
}

#[tokio::test]
async fn test_summary_arithmetic() {
    let provider = clean_backend().await;
    let service = TransactionService::new(&provider);
    let category = service
        .create_category(TransactionCategory::new("給与", None, None))
        .await
        .unwrap();

    for draft in [
        transaction("org-1", TransactionType::Income, dec!(500000), &category.id),
        transaction("org-1", TransactionType::Expense, dec!(300000), &category.id),
        transaction("org-1", TransactionType::Expense, dec!(15000), &category.id),
    ] {
        service.create_transaction(draft).await.unwrap();
    }

    let summary = service
        .transaction_summary(Some("org-1"), None)
        .await
        .unwrap();
    assert_eq!(summary.total_income, dec!(500000));
    assert_eq!(summary.total_expense, dec!(315000));
    assert_eq!(summary.balance, dec!(185000));
    assert_eq!(summary.transaction_count, 3);
}

#[tokio::test]
async fn test_transaction_requires_existing_category() {
    let provider = clean_backend().await;
    let service = TransactionService::new(&provider);

    let err = service
        .create_transaction(transaction(
            "org-1",
            TransactionType::Expense,
            dec!(1000),
            "no-such-category",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn test_category_deletion_guard() {
    let provider = clean_backend().await;
    let service = TransactionService::new(&provider);
    let referenced = service
        .create_category(TransactionCategory::new("食費", None, None))
        .await
        .unwrap();
    let unreferenced = service
        .create_category(TransactionCategory::new("娯楽費", None, None))
        .await
        .unwrap();
    service
        .create_transaction(transaction(
            "org-1",
            TransactionType::Expense,
            dec!(1200),
            &referenced.id,
        ))
        .await
        .unwrap();

    let err = service.delete_category(&referenced.id).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    service.delete_category(&unreferenced.id).await.unwrap();
}

#[tokio::test]
async fn test_monthly_trends_cover_requested_window() {
    let provider = clean_backend().await;
    let service = TransactionService::new(&provider);
    let trends = service.monthly_trends(None, 12).await.unwrap();
    assert_eq!(trends.len(), 12);
    // Labels are YYYY-MM, oldest first, newest last.
    for label in trends.iter().map(|t| &t.month) {
        assert_eq!(label.len(), 7, "label {label}");
        assert_eq!(&label[4..5], "-");
    }
    let today = time::OffsetDateTime::now_utc().date();
    let expected_last = format!("{}-{:02}", today.year(), today.month() as u8);
    assert_eq!(trends.last().unwrap().month, expected_last);
}

/// Empties the feedback table so feed assertions see only what the test
/// creates; the memory backend comes pre-seeded with fixtures.
async fn clear_feedbacks(provider: &Arc<dyn DatabaseProvider>) {
    let repository = provider.feedbacks();
    for feedback in repository.find_all().await.unwrap() {
        repository.delete(&feedback.id).await.unwrap();
    }
}

#[tokio::test]
async fn test_dashboard_feedback_ordering() {
    for (name, provider) in both_backends().await {
        clear_feedbacks(&provider).await;
        let service = FeedbackService::new(&provider);

        for (title, priority) in [
            ("low-1", FeedbackPriority::Low),
            ("high-1", FeedbackPriority::High),
            ("medium-1", FeedbackPriority::Medium),
            ("high-2", FeedbackPriority::High),
        ] {
            let mut draft = AiFeedback::new(
                FeedbackType::Insight,
                title,
                "body",
                priority,
                FeedbackCategory::Budget,
            );
            draft.actionable = Some(true);
            service.create_feedback(draft).await.unwrap();
        }

        let feed = service.dashboard_feedbacks().await.unwrap();
        let titles: Vec<&str> = feed.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["high-1", "high-2", "medium-1", "low-1"], "{name}");

        // De-duplicated: each entry appears once even though the
        // high-priority, actionable and recent source lists all overlap.
        assert_eq!(feed.len(), 4, "{name}");
    }
}

/// Equal-priority entries must come back in creation order even where the
/// backend scans in hash-map order.
#[tokio::test]
async fn test_dashboard_ties_keep_creation_order() {
    let provider: Arc<dyn DatabaseProvider> = Arc::new(MemoryProvider::new());
    provider.initialize().await.unwrap();
    clear_feedbacks(&provider).await;
    let service = FeedbackService::new(&provider);

    let titles: Vec<String> = (0..6).map(|i| format!("high-{i}")).collect();
    for title in &titles {
        service
            .create_feedback(AiFeedback::new(
                FeedbackType::Warning,
                title,
                "body",
                FeedbackPriority::High,
                FeedbackCategory::Spending,
            ))
            .await
            .unwrap();
    }

    let feed = service.dashboard_feedbacks().await.unwrap();
    let ordered: Vec<&str> = feed.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(ordered, titles);
}

#[tokio::test]
async fn test_mark_feedback_as_read() {
    let provider = clean_backend().await;
    let service = FeedbackService::new(&provider);
    let mut draft = AiFeedback::new(
        FeedbackType::Suggestion,
        "見直し",
        "body",
        FeedbackPriority::Low,
        FeedbackCategory::Budget,
    );
    draft.actionable = Some(true);
    let created = service.create_feedback(draft).await.unwrap();

    let read = service.mark_as_read(&created.id).await.unwrap();
    assert_eq!(read.actionable, Some(false));
    assert!(service.actionable_feedbacks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_factory_get_is_idempotent_per_kind() {
    let factory = ProviderFactory::new(SqliteConfig::in_memory());

    let first = factory.get(Some(BackendKind::Memory)).await.unwrap();
    let second = factory.get(None).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.current_kind().await, Some(BackendKind::Memory));

    // Requesting a different kind swaps the cached instance.
    let sqlite = factory.get(Some(BackendKind::Sqlite)).await.unwrap();
    assert!(!Arc::ptr_eq(&second, &sqlite));
    assert_eq!(factory.current_kind().await, Some(BackendKind::Sqlite));

    factory.close().await.unwrap();
    assert_eq!(factory.current_kind().await, None);
}

#[tokio::test]
async fn test_factory_switch_resets_mock_data() {
    let factory = ProviderFactory::new(SqliteConfig::in_memory());

    let provider = factory.switch(BackendKind::Memory).await.unwrap();
    let original = provider
        .transactions()
        .find_by_id("txn-1")
        .await
        .unwrap()
        .unwrap();
    provider
        .transactions()
        .update(
            "txn-1",
            TransactionPatch {
                amount: Some(dec!(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Leave demo mode and come back; the mutation must be gone.
    factory.switch(BackendKind::Sqlite).await.unwrap();
    let provider = factory.switch(BackendKind::Memory).await.unwrap();
    let reloaded = provider
        .transactions()
        .find_by_id("txn-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.amount, original.amount);
}

#[tokio::test]
async fn test_factory_remote_backend_unsupported() {
    let factory = ProviderFactory::new(SqliteConfig::in_memory());
    let err = factory.get(Some(BackendKind::Remote)).await.unwrap_err();
    assert!(matches!(err, StorageError::Unsupported(_)));
}

#[tokio::test]
async fn test_session_live_mode_seeds_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let factory = Arc::new(ProviderFactory::new(SqliteConfig::at(
        dir.path().join("miel.db"),
    )));
    let manager = SessionManager::new(factory.clone(), ModePreference::volatile());

    assert_eq!(manager.state(), DatabaseState::Initializing);
    assert_eq!(manager.apply_mode(false).await, DatabaseState::Ready);
    assert_eq!(manager.state(), DatabaseState::Ready);

    let provider = factory.get(None).await.unwrap();
    assert_eq!(
        provider.transaction_categories().find_all().await.unwrap().len(),
        10
    );
    assert_eq!(provider.feedbacks().find_all().await.unwrap().len(), 4);
    assert_eq!(provider.financial_accounts().find_all().await.unwrap().len(), 2);

    // Re-applying live mode reopens the same file without reseeding.
    assert_eq!(manager.apply_mode(false).await, DatabaseState::Ready);
    let provider = factory.get(None).await.unwrap();
    assert_eq!(
        provider.transaction_categories().find_all().await.unwrap().len(),
        10
    );
}

#[tokio::test]
async fn test_session_demo_mode_uses_fixture_backend() {
    let factory = Arc::new(ProviderFactory::new(SqliteConfig::in_memory()));
    let manager = SessionManager::new(factory.clone(), ModePreference::volatile());

    assert_eq!(manager.apply_mode(true).await, DatabaseState::Ready);
    assert_eq!(factory.current_kind().await, Some(BackendKind::Memory));

    let provider = factory.get(None).await.unwrap();
    let users = provider.users().find_all().await.unwrap();
    assert_eq!(users.len(), 4);
}

#[tokio::test]
async fn test_session_reports_error_state() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the parent directory should be makes open fail.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let factory = Arc::new(ProviderFactory::new(SqliteConfig::at(
        blocker.join("miel.db"),
    )));
    let manager = SessionManager::new(factory, ModePreference::volatile());

    match manager.apply_mode(false).await {
        DatabaseState::Error(msg) => assert!(!msg.is_empty()),
        other => panic!("expected error state, got {other:?}"),
    }
    assert!(matches!(manager.state(), DatabaseState::Error(_)));
}

#[tokio::test]
async fn test_find_by_date_matches_instant() {
    for (name, provider) in both_backends().await {
        let service = TransactionService::new(&provider);
        let category = service
            .create_category(TransactionCategory::new("date-probe", None, None))
            .await
            .unwrap();
        service
            .create_transaction(Transaction::new(
                "user-7",
                "org-7",
                TransactionType::Expense,
                dec!(980),
                &category.id,
                None,
                date!(2024 - 04 - 01),
            ))
            .await
            .unwrap();

        let matched = provider
            .transactions()
            .find_by(mieldb::models::query::TransactionFilter {
                organization_id: Some("org-7".to_string()),
                date: Some(date!(2024 - 04 - 01)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(matched.len(), 1, "{name}");

        let missed = provider
            .transactions()
            .find_by(mieldb::models::query::TransactionFilter {
                organization_id: Some("org-7".to_string()),
                date: Some(date!(2024 - 04 - 02)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(missed.is_empty(), "{name}");
    }
}
