use super::*;

fn source() -> HttpImageSource {
    HttpImageSource::new(Duration::from_secs(2)).unwrap()
}

fn image_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("swatchforge-img-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("faces")).unwrap();
    std::fs::write(dir.join("faces").join("face.png"), b"bytes").unwrap();
    dir
}

#[tokio::test]
async fn rooted_sources_read_relative_paths() {
    let dir = image_dir();
    let src = source().with_root(&dir);
    assert_eq!(src.fetch("faces/face.png").await.unwrap(), b"bytes");
    assert_eq!(src.fetch("./faces//face.png").await.unwrap(), b"bytes");
    assert_eq!(src.fetch("file://faces/face.png").await.unwrap(), b"bytes");
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn network_only_sources_refuse_local_files() {
    let dir = image_dir();
    let path = dir.join("faces").join("face.png");
    let src = source();
    let urls = [
        path.display().to_string(),
        format!("file://{}", path.display()),
        "faces/face.png".to_string(),
    ];
    for url in urls {
        let err = src.fetch(&url).await.unwrap_err();
        assert!(matches!(err, SwatchError::Validation(_)), "{url}: {err}");
        assert!(err.to_string().contains("not an http(s) URL"), "{err}");
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn rooted_sources_stay_inside_the_root() {
    let dir = image_dir();
    let src = source().with_root(dir.join("faces"));
    let absolute = dir.join("faces").join("face.png").display().to_string();
    for url in [absolute.as_str(), "../faces/face.png", "a/../../face.png", "file:///etc/passwd"] {
        let err = src.fetch(url).await.unwrap_err();
        assert!(matches!(err, SwatchError::Validation(_)), "{url}: {err}");
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn relative_paths_are_normalized() {
    assert_eq!(normalize_rel_path("a/./b//c.png").unwrap(), "a/b/c.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("C:/x.png").is_err());
    assert!(normalize_rel_path("x/../y.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[tokio::test]
async fn missing_files_are_remote_call_errors() {
    let err = source()
        .with_root(std::env::temp_dir())
        .fetch("definitely/not/here/face.png")
        .await
        .unwrap_err();
    assert!(matches!(err, SwatchError::RemoteCall(_)), "{err}");
    assert!(err.is_item_recoverable());
}
