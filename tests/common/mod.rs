#![allow(dead_code)]

use bb::config::AppConfig;
use bb::models::{CategoryModel, TopicModel, UserModel};
use bb::services::category::CategoryService;
use bb::services::message::MessageService;
use bb::services::topic::TopicService;
use bb::services::user::UserService;
use bb::templates::TemplateStore;
use reqwest::{redirect::Policy, Client};
use sea_orm::{prelude::DateTime, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();
static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Name no other test (or earlier run) has used.
pub fn unique(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}-{}-{}", prefix, std::process::id(), nanos, n)
}

pub fn uid_cookie(user: &UserModel) -> String {
    format!("uid={}", user.user_id)
}

/// Start the app on a random port against `TEST_DATABASE_URL`.
///
/// Returns `None` (and the calling test passes vacuously) when no test
/// database is configured. Tests never truncate tables; they isolate their
/// rows through unique names and categories instead.
pub async fn spawn_app() -> Option<TestApp> {
    dotenv::dotenv().ok();

    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    let conn = &db;
    MIGRATED
        .get_or_init(|| async move {
            bb::migration::Migrator::up(conn, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    let template_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"));
    let templates = Arc::new(TemplateStore::load(&template_dir).expect("Failed to load templates"));
    let config = AppConfig {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: None,
        template_dir,
        dev_mode: false,
    };

    let app = bb::routes::create_app(db.clone(), templates, config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    Some(TestApp {
        addr: format!("http://{}", addr),
        db,
        client,
    })
}

pub async fn create_user(db: &DatabaseConnection) -> UserModel {
    UserService::new(db)
        .create(&unique("user"))
        .await
        .expect("Failed to create user")
}

pub async fn create_category(db: &DatabaseConnection) -> CategoryModel {
    CategoryService::new(db)
        .create(&unique("category"), "Test category", 0x336699)
        .await
        .expect("Failed to create category")
}

/// Topic with its opening message, stamped with `at` instead of the clock.
pub async fn create_topic_at(
    db: &DatabaseConnection,
    title: &str,
    author: &UserModel,
    category: &CategoryModel,
    at: DateTime,
) -> TopicModel {
    let topic = TopicService::new(db)
        .create(title, author.user_id, Some(category.category_id), at)
        .await
        .expect("Failed to create topic");
    MessageService::new(db)
        .create(topic.topic_id, author.user_id, "Opening message", at)
        .await
        .expect("Failed to create message");
    topic
}

/// Whole-second timestamp `secs` after the Unix epoch.
pub fn at(secs: i64) -> DateTime {
    chrono::DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
}
