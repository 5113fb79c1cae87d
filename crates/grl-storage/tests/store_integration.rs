use grl_core::{IdEncoding, ShortCode, UrlRecord};
use grl_storage::{
    CollectionPolicy, ReadRepository, Repository, StorageError, Store, StoreRepository,
};
use tempfile::TempDir;

const URLS: &str = "Urls";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("grl.db")
    }

    fn open(&self) -> StoreRepository {
        let store = Store::open(self.path()).expect("open store");
        store
            .ensure_collection(URLS, CollectionPolicy::CreateIfMissing)
            .expect("ensure collection");
        StoreRepository::new(store, URLS)
    }
}

fn close(repo: StoreRepository) {
    repo.into_store().close().expect("close store");
}

#[tokio::test]
async fn mapping_survives_reopen() {
    let fixture = Fixture::new();

    let repo = fixture.open();
    let code = repo
        .mint(IdEncoding::Hex, UrlRecord::new("http://example.com/durable"))
        .await
        .unwrap();
    close(repo);

    let repo = fixture.open();
    let record = repo.get(&code).await.unwrap().unwrap();
    assert_eq!(record.original_url, "http://example.com/durable");
    close(repo);
}

#[tokio::test]
async fn sequence_continues_after_reopen() {
    let fixture = Fixture::new();

    let repo = fixture.open();
    for _ in 0..3 {
        repo.mint(IdEncoding::Decimal, UrlRecord::new("http://a.example"))
            .await
            .unwrap();
    }
    close(repo);

    let repo = fixture.open();
    let code = repo
        .mint(IdEncoding::Decimal, UrlRecord::new("http://b.example"))
        .await
        .unwrap();
    assert_eq!(code.as_str(), "4");

    // earlier entries are untouched
    let first = repo.get(&ShortCode::new_unchecked("1")).await.unwrap();
    assert_eq!(first, Some(UrlRecord::new("http://a.example")));
    close(repo);
}

#[tokio::test]
async fn strict_collection_policy_fails_on_restart() {
    let fixture = Fixture::new();

    let store = Store::open(fixture.path()).unwrap();
    store
        .ensure_collection(URLS, CollectionPolicy::MustNotExist)
        .unwrap();
    store.close().unwrap();

    let store = Store::open(fixture.path()).unwrap();
    let err = store
        .ensure_collection(URLS, CollectionPolicy::MustNotExist)
        .unwrap_err();
    assert!(matches!(err, StorageError::CollectionExists(_)));
    store.close().unwrap();
}

#[tokio::test]
async fn not_found_is_stable_across_mints() {
    let fixture = Fixture::new();
    let repo = fixture.open();
    let unknown = ShortCode::new_unchecked("999999");

    assert!(repo.get(&unknown).await.unwrap().is_none());

    for i in 0..5 {
        repo.mint(
            IdEncoding::Decimal,
            UrlRecord::new(format!("http://example{i}.com")),
        )
        .await
        .unwrap();
    }

    assert!(repo.get(&unknown).await.unwrap().is_none());
    close(repo);
}

#[test]
fn open_fails_on_garbage_file() {
    let fixture = Fixture::new();
    std::fs::write(fixture.path(), b"definitely not a database file, just some bytes").unwrap();

    let err = Store::open(fixture.path()).unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
}

#[test]
fn open_fails_while_file_is_held() {
    let fixture = Fixture::new();

    let first = Store::open(fixture.path()).unwrap();
    let second = Store::open(fixture.path());
    assert!(matches!(second, Err(StorageError::Unavailable(_))));

    first.close().unwrap();
    Store::open(fixture.path()).unwrap().close().unwrap();
}
