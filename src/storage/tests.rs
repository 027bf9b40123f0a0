//! Storage Module Tests
//!
//! Validates the upload directory layout and the path component checks.

#[cfg(test)]
mod tests {
    use crate::error::StorageError;
    use crate::storage::uploads::UploadStore;

    #[tokio::test]
    async fn test_save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let path = store.save("u1", "job-1", "a.png", b"pixels").await.unwrap();

        assert_eq!(path, dir.path().join("u1").join("job-1").join("a.png"));
        assert_eq!(store.read("u1", "job-1", "a.png").await.unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        store.save("u1", "job-1", "a.png", b"mine").await.unwrap();

        assert!(matches!(
            store.read("u2", "job-1", "a.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_same_filename_in_two_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        store.save("u1", "job-1", "a.png", b"first").await.unwrap();
        store.save("u1", "job-2", "a.png", b"second").await.unwrap();

        assert_eq!(store.read("u1", "job-1", "a.png").await.unwrap(), b"first");
        assert_eq!(store.read("u1", "job-2", "a.png").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        for (owner, job, name) in [
            ("..", "job-1", "a.png"),
            ("u1", "../job", "a.png"),
            ("u1", "job-1", "../../etc/passwd"),
            ("u1", "job-1", ""),
            ("u1", "job-1", "dir\\a.png"),
        ] {
            assert!(
                matches!(
                    store.save(owner, job, name, b"x").await,
                    Err(StorageError::InvalidName(_))
                ),
                "{}/{}/{} should be rejected",
                owner,
                job,
                name
            );
        }
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        assert!(matches!(
            store.read("u1", "job-1", "nope.png").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
