use super::*;

fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("swatchforge-assets-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn uploads_are_content_addressed() {
    let dir = temp_dir();
    let store = DirAssetStore::new(&dir, "https://cdn.example.com/thumbs/");

    let a = store.upload(b"png-bytes".to_vec(), "image/png").await.unwrap();
    let b = store.upload(b"png-bytes".to_vec(), "image/png").await.unwrap();
    let c = store.upload(b"other".to_vec(), "image/png").await.unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    let name = format!("{}.png", digest_hex(b"png-bytes"));
    assert_eq!(a, format!("https://cdn.example.com/thumbs/{name}"));
    assert_eq!(std::fs::read(dir.join(&name)).unwrap(), b"png-bytes");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn unknown_content_types_get_a_generic_extension() {
    let dir = temp_dir();
    let store = DirAssetStore::new(&dir, "http://localhost");
    let url = store.upload(vec![1, 2, 3], "application/x-thing").await.unwrap();
    assert!(url.starts_with("http://localhost/"));
    assert!(url.ends_with(".bin"));
    let _ = std::fs::remove_dir_all(&dir);
}
