//! End-to-end round trips against SQLite in memory, through `sqlx::Any`.

use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Once;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::any::AnyPoolOptions;

use stela::entity::{decode_identified, decode_wrapped, encode_identified, encode_wrapped};
use stela::{
    Criteria, DataError, Dialect, Entity, FieldDef, FieldError, FieldKind, FieldValue, HardDelete,
    Identified, Pageable, RepoConfig, SqlRepository,
};
use stela_sqlx::SqlxExecutor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Status {
    #[default]
    Active,
    Disabled,
}

impl Identified for Status {
    fn ident(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Disabled => "disabled",
        }
    }

    fn from_ident(id: &str) -> Option<Self> {
        match id {
            "active" => Some(Status::Active),
            "disabled" => Some(Status::Disabled),
            _ => None,
        }
    }
}

/// Typed identifier stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Handle(String);

impl FromStr for Handle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(Handle(s.to_string()))
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Member {
    id: i64,
    name: String,
    active: bool,
    score: i64,
    rating: Option<f64>,
    status: Status,
    handle: Option<Handle>,
    created: Option<DateTime<Utc>>,
    birthday: Option<NaiveDate>,
}

static MEMBER_FIELDS: [FieldDef<Member>; 9] = [
    FieldDef {
        column: "id",
        kind: FieldKind::Int,
        get: |m: &Member| FieldValue::Int(m.id),
        set: |m: &mut Member, v: FieldValue| {
            m.id = v.into_int()?.ok_or(FieldError::Null)?;
            Ok(())
        },
    },
    FieldDef {
        column: "name",
        kind: FieldKind::Text,
        get: |m: &Member| FieldValue::from(m.name.clone()),
        set: |m: &mut Member, v: FieldValue| {
            m.name = v.into_text()?.ok_or(FieldError::Null)?;
            Ok(())
        },
    },
    FieldDef {
        column: "active",
        kind: FieldKind::Bool,
        get: |m: &Member| FieldValue::Bool(m.active),
        set: |m: &mut Member, v: FieldValue| {
            m.active = v.into_bool()?.ok_or(FieldError::Null)?;
            Ok(())
        },
    },
    FieldDef {
        column: "score",
        kind: FieldKind::Int,
        get: |m: &Member| FieldValue::Int(m.score),
        set: |m: &mut Member, v: FieldValue| {
            m.score = v.into_int()?.ok_or(FieldError::Null)?;
            Ok(())
        },
    },
    FieldDef {
        column: "rating",
        kind: FieldKind::Float,
        get: |m: &Member| FieldValue::from(m.rating),
        set: |m: &mut Member, v: FieldValue| {
            m.rating = v.into_float()?;
            Ok(())
        },
    },
    FieldDef {
        column: "status",
        kind: FieldKind::Identified,
        get: |m: &Member| encode_identified(Some(&m.status)),
        set: |m: &mut Member, v: FieldValue| {
            m.status = decode_identified(v)?.ok_or(FieldError::Null)?;
            Ok(())
        },
    },
    FieldDef {
        column: "handle",
        kind: FieldKind::Wrapped,
        get: |m: &Member| encode_wrapped(m.handle.as_ref()),
        set: |m: &mut Member, v: FieldValue| {
            m.handle = decode_wrapped(v)?;
            Ok(())
        },
    },
    FieldDef {
        column: "created",
        kind: FieldKind::EpochDate,
        get: |m: &Member| FieldValue::from(m.created),
        set: |m: &mut Member, v: FieldValue| {
            m.created = v.into_datetime()?;
            Ok(())
        },
    },
    FieldDef {
        column: "birthday",
        kind: FieldKind::CalendarDate,
        get: |m: &Member| FieldValue::from(m.birthday),
        set: |m: &mut Member, v: FieldValue| {
            m.birthday = v.into_date()?;
            Ok(())
        },
    },
];

impl Entity for Member {
    type Id = i64;

    fn table_name() -> &'static str {
        "member"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn fields() -> &'static [FieldDef<Self>] {
        &MEMBER_FIELDS
    }

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl HardDelete for Member {}

const DDL: &str = "CREATE TABLE member (
    id BIGINT PRIMARY KEY,
    name TEXT NOT NULL,
    active INTEGER NOT NULL,
    score BIGINT NOT NULL,
    rating DOUBLE,
    status TEXT NOT NULL,
    handle TEXT,
    created BIGINT,
    birthday TEXT
)";

static DRIVERS: Once = Once::new();

async fn repo() -> SqlRepository<Member, SqlxExecutor> {
    DRIVERS.call_once(sqlx::any::install_default_drivers);
    // One connection: each SQLite in-memory connection is its own database.
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    sqlx::query(DDL).execute(&pool).await.expect("create table");
    SqlRepository::with_config(
        SqlxExecutor::new(pool),
        RepoConfig {
            dialect: Dialect::Sqlite,
            ..Default::default()
        },
    )
}

fn sample(id: i64) -> Member {
    Member {
        id,
        name: format!("member-{id}"),
        active: id % 2 == 0,
        score: id * 10,
        rating: Some(4.5),
        status: Status::Active,
        handle: Some(Handle(format!("h{id}"))),
        created: DateTime::from_timestamp_millis(1_700_000_000_000 + id),
        birthday: NaiveDate::from_ymd_opt(1990, 7, 4),
    }
}

#[tokio::test]
async fn round_trip_all_coercion_categories() {
    let repo = repo().await;
    let member = sample(1);
    let result = repo.insert(&member).await.unwrap();
    assert_eq!(result.rows_affected, 1);

    let loaded = repo.find_by_id(&1).await.unwrap().unwrap();
    assert_eq!(loaded, member);
}

#[tokio::test]
async fn round_trip_null_fields() {
    let repo = repo().await;
    let member = Member {
        id: 2,
        name: "bare".into(),
        active: false,
        score: 0,
        rating: None,
        status: Status::Disabled,
        handle: None,
        created: None,
        birthday: None,
    };
    repo.insert(&member).await.unwrap();
    let loaded = repo.find_by_id(&2).await.unwrap().unwrap();
    assert_eq!(loaded, member);
}

#[tokio::test]
async fn load_of_a_missing_id_is_none() {
    let repo = repo().await;
    assert!(repo.find_by_id(&404).await.unwrap().is_none());
}

#[tokio::test]
async fn like_with_caller_wildcards() {
    let repo = repo().await;
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "alfred")] {
        let mut m = sample(id);
        m.name = name.to_string();
        repo.insert(&m).await.unwrap();
    }
    let found = repo
        .find_by(&Criteria::new().like("name", "al*").order_by("id", true))
        .await
        .unwrap();
    let names: Vec<_> = found.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "alfred"]);
}

#[tokio::test]
async fn or_group_filters() {
    let repo = repo().await;
    for id in 1..=3 {
        repo.insert(&sample(id)).await.unwrap();
    }
    let found = repo
        .find_by(
            &Criteria::new()
                .any(Criteria::new().eq("id", 1).eq("id", 3))
                .order_by("id", true),
        )
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn pagination_skips_and_takes() {
    let repo = repo().await;
    for id in 1..=25 {
        repo.insert(&sample(id)).await.unwrap();
    }
    let pageable = Pageable::new(2, 10).sorted_by("id");
    let page = repo.find_page(Criteria::new(), &pageable).await.unwrap();
    assert_eq!(page.total_elements, 25);
    assert_eq!(page.total_pages, 3);
    let ids: Vec<_> = page.content.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![21, 22, 23, 24, 25]);
}

#[tokio::test]
async fn find_one_contract_and_success() {
    let repo = repo().await;
    repo.insert(&sample(1)).await.unwrap();

    let err = repo
        .find_one(Criteria::new().rows(2))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Contract(_)));

    let found = repo
        .find_one(Criteria::new().eq("id", 1))
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, 1);
}

#[tokio::test]
async fn update_rewrites_mapped_columns() {
    let repo = repo().await;
    let mut member = sample(3);
    repo.insert(&member).await.unwrap();

    member.name = "renamed".into();
    member.status = Status::Disabled;
    member.rating = None;
    member.birthday = NaiveDate::from_ymd_opt(2000, 1, 31);
    let result = repo.update(&member).await.unwrap();
    assert_eq!(result.rows_affected, 1);

    let loaded = repo.find_by_id(&3).await.unwrap().unwrap();
    assert_eq!(loaded, member);
}

#[tokio::test]
async fn update_of_a_missing_identifier_affects_nothing() {
    let repo = repo().await;
    let result = repo.update(&sample(9999)).await.unwrap();
    assert_eq!(result.rows_affected, 0);
}

#[tokio::test]
async fn increment_then_decrement_is_net_zero() {
    let repo = repo().await;
    let member = sample(5);
    repo.insert(&member).await.unwrap();
    let before = repo.find_by_id(&5).await.unwrap().unwrap().score;

    repo.increment(&member, "score", 7).await.unwrap();
    repo.decrement(&member, "score", 7).await.unwrap();

    let after = repo.find_by_id(&5).await.unwrap().unwrap().score;
    assert_eq!(after, before);
}

#[tokio::test]
async fn aggregates_over_criteria() {
    let repo = repo().await;
    for id in 1..=4 {
        repo.insert(&sample(id)).await.unwrap();
    }
    let all = Criteria::new();
    assert_eq!(repo.count(&all).await.unwrap(), 4);
    assert_eq!(repo.sum("score", &all).await.unwrap(), 100);
    assert_eq!(repo.min("score", &all).await.unwrap(), 10);
    assert_eq!(repo.max("score", &all).await.unwrap(), 40);

    let none = Criteria::new().eq("id", 9999);
    assert_eq!(repo.count(&none).await.unwrap(), 0);
    assert_eq!(repo.sum("score", &none).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_by_id_removes_the_row() {
    let repo = repo().await;
    repo.insert(&sample(6)).await.unwrap();
    let result = repo.delete_by_id(&6).await.unwrap();
    assert_eq!(result.rows_affected, 1);
    assert!(repo.find_by_id(&6).await.unwrap().is_none());

    let repeat = repo.delete_by_id(&6).await.unwrap();
    assert_eq!(repeat.rows_affected, 0);
}

#[tokio::test]
async fn in_condition_binds_every_value() {
    let repo = repo().await;
    for id in 1..=5 {
        repo.insert(&sample(id)).await.unwrap();
    }
    let found = repo
        .find_by(&Criteria::new().in_("id", [2i64, 4]).order_by("id", true))
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![2, 4]);
}
