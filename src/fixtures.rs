//! Static demo fixture data.
//!
//! The memory backend loads these records verbatim (ids included) on every
//! initialization; the live path re-creates the feedback and account
//! fixtures through `create`, which re-stamps identity.

use rust_decimal::Decimal;
use time::{macros::date, macros::datetime, OffsetDateTime};

use crate::models::{
    AccountKind, AiFeedback, CsvColumns, CsvImportConfig, FeedbackCategory, FeedbackPriority,
    FeedbackType, FinancialAccount, Organization, Transaction, TransactionCategory,
    TransactionType, User,
};
use crate::storage::Entity;

fn stamped<T: Entity>(mut record: T, id: &str, at: OffsetDateTime) -> T {
    record.assign(id.to_string(), at);
    record
}

pub fn demo_users() -> Vec<User> {
    vec![
        stamped(
            User::new("john.doe@example.com"),
            "user-1",
            datetime!(2024-01-01 10:00 UTC),
        ),
        stamped(
            User::new("jane.smith@example.com"),
            "user-2",
            datetime!(2024-01-02 9:15 UTC),
        ),
        stamped(
            User::new("mike.johnson@example.com"),
            "user-3",
            datetime!(2024-01-03 11:30 UTC),
        ),
        stamped(
            User::new("sarah.wilson@example.com"),
            "user-4",
            datetime!(2024-01-05 8:45 UTC),
        ),
    ]
}

pub fn demo_organizations() -> Vec<Organization> {
    vec![
        stamped(
            Organization::new(
                "個人用家計簿",
                "田中太郎の家計簿",
                Some("個人の収支管理用".to_string()),
                "tanaka-personal",
                Some("user-1".to_string()),
            ),
            "org-1",
            datetime!(2024-01-01 10:00 UTC),
        ),
        stamped(
            Organization::new(
                "ABC商事株式会社",
                "ABC商事 経理部",
                Some("会社の経費管理".to_string()),
                "abc-trading",
                Some("user-2".to_string()),
            ),
            "org-2",
            datetime!(2024-01-02 9:15 UTC),
        ),
        stamped(
            Organization::new(
                "スタートアップXYZ",
                "XYZ Inc.",
                Some("スタートアップの資金管理".to_string()),
                "startup-xyz",
                Some("user-3".to_string()),
            ),
            "org-3",
            datetime!(2024-01-03 11:30 UTC),
        ),
    ]
}

pub fn demo_transaction_categories() -> Vec<TransactionCategory> {
    let at = datetime!(2024-01-01 0:00 UTC);
    let catalogue: [(&str, &str, &str, &str); 14] = [
        ("cat-1", "食費", "🍽️", "#ff6b6b"),
        ("cat-2", "交通費", "🚗", "#4ecdc4"),
        ("cat-3", "家賃", "🏠", "#45b7d1"),
        ("cat-4", "光熱費", "⚡", "#96ceb4"),
        ("cat-5", "通信費", "📱", "#feca57"),
        ("cat-6", "医療費", "🏥", "#ff9ff3"),
        ("cat-7", "娯楽費", "🎮", "#54a0ff"),
        ("cat-8", "日用品", "🧽", "#5f27cd"),
        ("cat-9", "衣服", "👔", "#00d2d3"),
        ("cat-10", "教育費", "📚", "#ff6348"),
        ("cat-11", "給与", "💰", "#2ed573"),
        ("cat-12", "副業", "💻", "#3742fa"),
        ("cat-13", "投資", "📈", "#ff4757"),
        ("cat-14", "その他収入", "💸", "#ffa502"),
    ];
    catalogue
        .into_iter()
        .map(|(id, name, icon, color)| {
            stamped(
                TransactionCategory::new(name, Some(icon.to_string()), Some(color.to_string())),
                id,
                at,
            )
        })
        .collect()
}

pub fn demo_transactions() -> Vec<Transaction> {
    vec![
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Income,
                Decimal::from(350_000),
                "cat-11",
                Some("給与（1月分）".to_string()),
                date!(2024 - 01 - 25),
            ),
            "txn-1",
            datetime!(2024-01-25 9:00 UTC),
        ),
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Expense,
                Decimal::from(120_000),
                "cat-3",
                Some("家賃（1月分）".to_string()),
                date!(2024 - 01 - 01),
            ),
            "txn-2",
            datetime!(2024-01-01 9:05 UTC),
        ),
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Expense,
                Decimal::from(1_200),
                "cat-1",
                Some("昼食（カフェ）".to_string()),
                date!(2024 - 01 - 15),
            ),
            "txn-3",
            datetime!(2024-01-15 12:35 UTC),
        ),
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Expense,
                Decimal::from(8_500),
                "cat-4",
                Some("電気代".to_string()),
                date!(2024 - 01 - 20),
            ),
            "txn-4",
            datetime!(2024-01-20 18:00 UTC),
        ),
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Expense,
                Decimal::from(4_980),
                "cat-5",
                Some("携帯料金".to_string()),
                date!(2024 - 01 - 22),
            ),
            "txn-5",
            datetime!(2024-01-22 10:00 UTC),
        ),
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Income,
                Decimal::from(45_000),
                "cat-12",
                Some("副業（ライティング）".to_string()),
                date!(2024 - 02 - 05),
            ),
            "txn-6",
            datetime!(2024-02-05 20:00 UTC),
        ),
        stamped(
            Transaction::new(
                "user-1",
                "org-1",
                TransactionType::Expense,
                Decimal::from(6_300),
                "cat-7",
                Some("映画と夕食".to_string()),
                date!(2024 - 02 - 10),
            ),
            "txn-7",
            datetime!(2024-02-10 21:30 UTC),
        ),
        stamped(
            Transaction::new(
                "user-2",
                "org-2",
                TransactionType::Expense,
                Decimal::from(52_000),
                "cat-2",
                Some("出張交通費".to_string()),
                date!(2024 - 01 - 18),
            ),
            "txn-8",
            datetime!(2024-01-18 8:00 UTC),
        ),
        stamped(
            Transaction::new(
                "user-2",
                "org-2",
                TransactionType::Income,
                Decimal::from(980_000),
                "cat-14",
                Some("売上入金".to_string()),
                date!(2024 - 01 - 31),
            ),
            "txn-9",
            datetime!(2024-01-31 15:00 UTC),
        ),
    ]
}

pub fn demo_feedbacks() -> Vec<AiFeedback> {
    let mut warning = AiFeedback::new(
        FeedbackType::Warning,
        "食費の支出が増加傾向",
        "今月の食費が**前月比で15%増加**しています。外食を週3回以下に抑えることで月¥20,000の節約が可能です。",
        FeedbackPriority::High,
        FeedbackCategory::Spending,
    );
    warning.actionable = Some(true);

    let achievement = AiFeedback::new(
        FeedbackType::Achievement,
        "貯蓄目標を達成",
        "🎉 **おめでとうございます！** 今月の貯蓄目標¥50,000を達成しました。",
        FeedbackPriority::Medium,
        FeedbackCategory::Saving,
    );

    let mut suggestion = AiFeedback::new(
        FeedbackType::Suggestion,
        "固定費の見直し",
        "通信費が同世帯平均より¥2,000高くなっています。プランの見直しを検討してください。",
        FeedbackPriority::Low,
        FeedbackCategory::Budget,
    );
    suggestion.actionable = Some(true);

    let insight = AiFeedback::new(
        FeedbackType::Insight,
        "副収入が安定して増加",
        "直近3ヶ月の副業収入は平均¥42,000で、収入全体の11%を占めるまで成長しています。",
        FeedbackPriority::High,
        FeedbackCategory::Income,
    );

    vec![
        stamped(warning, "fb-1", datetime!(2024-10-06 0:00 UTC)),
        stamped(achievement, "fb-2", datetime!(2024-10-05 0:00 UTC)),
        stamped(suggestion, "fb-3", datetime!(2024-10-04 0:00 UTC)),
        stamped(insight, "fb-4", datetime!(2024-10-03 0:00 UTC)),
    ]
}

pub fn demo_financial_accounts() -> Vec<FinancialAccount> {
    let card_columns = CsvColumns {
        date: "利用日".to_string(),
        description: "ご利用店名及び商品名".to_string(),
        description_detail: "支払区分名称".to_string(),
        debit: "利用金額".to_string(),
        credit: String::new(),
    };
    vec![
        stamped(
            FinancialAccount::new(
                "org-1",
                "USJ 銀行",
                AccountKind::Checking,
                CsvImportConfig {
                    start_row: 0,
                    columns: CsvColumns {
                        date: "引き落とし日".to_string(),
                        description: "摘要".to_string(),
                        description_detail: "摘要内容".to_string(),
                        debit: "お支払金額".to_string(),
                        credit: "お預り金額".to_string(),
                    },
                },
            ),
            "fa-1",
            datetime!(2024-01-01 0:00 UTC),
        ),
        stamped(
            FinancialAccount::new(
                "org-1",
                "Amex Gold",
                AccountKind::CreditCard,
                CsvImportConfig {
                    start_row: 0,
                    columns: card_columns,
                },
            ),
            "fa-2",
            datetime!(2024-01-01 0:00 UTC),
        ),
    ]
}
