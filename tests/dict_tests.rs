use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use storekit::features::{Dict, JsonOptions};
use storekit::storage::MemoryBackend;
use storekit::{Location, Storage, StorageError};

async fn memory_storage() -> (Storage, Arc<MemoryBackend>) {
    let memory = Arc::new(MemoryBackend::new());
    memory.create_bucket("bucket").await;
    (Storage::new(memory.clone()), memory)
}

fn sample() -> Dict {
    let value = json!({
        "learning_rate": 0.001,
        "epochs": 12,
        "tags": ["baseline", "v2"],
        "nested": {"dropout": null, "enabled": true}
    });
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_local_round_trip() {
    let (storage, _) = memory_storage().await;
    let dir = tempfile::tempdir().unwrap();
    let location = Location::local(dir.path().join("args.json"));

    storage
        .save_dict(&sample(), &location, &JsonOptions::default())
        .await
        .unwrap();
    let loaded: Dict = storage.load_dict(&location).await.unwrap();
    assert_eq!(loaded, sample());
}

#[tokio::test]
async fn test_remote_round_trip() {
    let (storage, memory) = memory_storage().await;
    let location = Location::parse("s3://bucket/config/args.json").unwrap();

    storage
        .save_dict(&sample(), &location, &JsonOptions::default().indent(4))
        .await
        .unwrap();
    let loaded: Dict = storage.load_dict(&location).await.unwrap();
    assert_eq!(loaded, sample());

    let stored = memory.object("bucket", "config/args.json").await.unwrap();
    assert_eq!(stored.content_type.as_deref(), Some("application/json"));
    assert!(String::from_utf8(stored.body).unwrap().contains("\n    \""));
}

#[tokio::test]
async fn test_typed_round_trip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        seed: u64,
        features: Vec<String>,
    }

    let (storage, _) = memory_storage().await;
    let location = Location::remote("bucket", "params.json");
    let params = Params {
        seed: 420,
        features: vec!["age".into(), "income".into()],
    };

    storage
        .save_dict(&params, &location, &JsonOptions::default())
        .await
        .unwrap();
    let loaded: Params = storage.load_dict(&location).await.unwrap();
    assert_eq!(loaded, params);
}

#[tokio::test]
async fn test_missing_files_are_not_found() {
    let (storage, _) = memory_storage().await;
    let dir = tempfile::tempdir().unwrap();

    let local = Location::local(dir.path().join("absent.json"));
    let err = storage.load_dict::<Dict>(&local).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    let remote = Location::remote("bucket", "absent.json");
    let err = storage.load_dict::<Dict>(&remote).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let (storage, _) = memory_storage().await;
    let location = Location::remote("bucket", "broken.json");
    storage
        .write_bytes(&location, b"{\"a\": 1,".to_vec(), None)
        .await
        .unwrap();

    match storage.load_dict::<Dict>(&location).await {
        Err(StorageError::MalformedContent(msg)) => {
            assert!(msg.contains("s3://bucket/broken.json"));
        }
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_bucket_propagates_backend_error() {
    let (storage, _) = memory_storage().await;
    let location = Location::remote("other-bucket", "args.json");
    let err = storage
        .save_dict(&sample(), &location, &JsonOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Backend(_)));
}
