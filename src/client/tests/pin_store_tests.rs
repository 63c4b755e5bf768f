//! PIN storage backends.

use camino::Utf8PathBuf;
use rstest::rstest;

use crate::client::{FilePinStore, MemoryPinStore, PinStore};
use crate::request::domain::RequestId;

async fn exercise(store: &dyn PinStore) -> eyre::Result<()> {
    let kept = RequestId::new();
    let dropped = RequestId::new();
    store.save(kept, "1234").await?;
    store.save(dropped, "9876").await?;
    store.save(kept, "4321").await?;

    store.forget(dropped).await?;
    store.forget(RequestId::new()).await?;

    assert_eq!(store.load(kept).await?.as_deref(), Some("4321"));
    assert_eq!(store.load(dropped).await?, None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_store_replaces_and_forgets() -> eyre::Result<()> {
    exercise(&MemoryPinStore::new()).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_store_replaces_and_forgets() -> eyre::Result<()> {
    let temp = tempfile::tempdir()?;
    let path = Utf8PathBuf::from_path_buf(temp.path().join("pins"))
        .map_err(|raw| eyre::eyre!("non UTF-8 temp path: {}", raw.display()))?;
    let store = FilePinStore::open(&path)?;

    exercise(&store).await
}

#[tokio::test(flavor = "multi_thread")]
async fn file_store_survives_reopening() -> eyre::Result<()> {
    let temp = tempfile::tempdir()?;
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .map_err(|raw| eyre::eyre!("non UTF-8 temp path: {}", raw.display()))?;
    let request_id = RequestId::new();
    FilePinStore::open(&path)?.save(request_id, "0451").await?;

    let reopened = FilePinStore::open(&path)?;

    assert_eq!(reopened.load(request_id).await?.as_deref(), Some("0451"));
    Ok(())
}
