use crate::db::{DbError, SlotStore};
use crate::file::FileSlotStore;

#[tokio::test]
async fn test_file_store_crud() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = FileSlotStore::open(dir.path().join("slots.json")).await?;

    // Missing file reads as empty
    assert_eq!(store.get("currentUser").await?, None);
    assert!(!store.contains("currentUser").await?);

    store.set("currentUser", "alice").await?;
    assert_eq!(store.get("currentUser").await?, Some("alice".to_string()));

    // Overwrite
    store.set("currentUser", "bob").await?;
    assert_eq!(store.get("currentUser").await?, Some("bob".to_string()));

    // Remove, then remove again
    store.remove("currentUser").await?;
    assert_eq!(store.get("currentUser").await?, None);
    store.remove("currentUser").await?;

    Ok(())
}

#[tokio::test]
async fn test_file_store_persists_across_instances() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("slots.json");

    {
        let store = FileSlotStore::open(&path).await?;
        store.set("last_login", "alice").await?;
        store.set("rememberMe", "true").await?;
    }

    let reopened = FileSlotStore::open(&path).await?;
    assert_eq!(reopened.get("last_login").await?, Some("alice".to_string()));
    assert_eq!(reopened.get("rememberMe").await?, Some("true".to_string()));
    assert!(!dir.path().join("nested").join("slots.tmp").exists());

    Ok(())
}

#[tokio::test]
async fn test_file_store_rejects_non_object_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("slots.json");
    std::fs::write(&path, "[1, 2, 3]")?;

    let store = FileSlotStore::open(&path).await?;
    let result = store.get("registration_users").await;
    assert!(matches!(result, Err(DbError::SerdeError(_))));

    Ok(())
}

#[tokio::test]
async fn test_file_store_empty_file_is_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("slots.json");
    std::fs::write(&path, "")?;

    let store = FileSlotStore::open(&path).await?;
    assert_eq!(store.get("authToken").await?, None);

    Ok(())
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
async fn test_postgres_store_crud() -> anyhow::Result<()> {
    use crate::postgres::PostgresSlotStore;

    dotenvy::dotenv().ok();
    let db_url = std::env::var("DATABASE_URL")?;
    // Each test uses a fresh table to avoid conflicts
    let table = format!(
        "slots_test_{}",
        uuid::Uuid::new_v4().to_string().replace('-', "")
    );

    let store = PostgresSlotStore::connect(&db_url, &table).await?;

    store.set("savedLogin", "alice").await?;
    assert_eq!(store.get("savedLogin").await?, Some("alice".to_string()));

    store.set("savedLogin", "bob").await?;
    assert_eq!(store.get("savedLogin").await?, Some("bob".to_string()));

    store.remove("savedLogin").await?;
    assert!(store.get("savedLogin").await?.is_none());

    Ok(())
}
