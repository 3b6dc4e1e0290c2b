//! Discovery over real directory trees

mod support;

use logicmapper::pipeline::{discover, DiscoveryError, PipelineError};
use std::time::Duration;
use support::write_repo;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_discover_filters_and_orders_files() {
    let repo = TempDir::new().unwrap();
    write_repo(
        repo.path(),
        &[
            ("src/orders.java", "class Orders {}"),
            ("src/pricing.py", "RATE = 1"),
            ("web/cart.ts", "export const x = 1;"),
            ("README.md", "# docs"),
            ("build/app.exe", "binary"),
            (".git/hooks/pre-commit.py", "print('hook')"),
        ],
    );

    let scan = discover(&repo.path().to_string_lossy(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(
        scan.files,
        vec!["src/orders.java", "src/pricing.py", "web/cart.ts"]
    );
    assert_eq!(scan.language_histogram.get(".py"), Some(&1));
    assert_eq!(scan.language_histogram.get(".java"), Some(&1));
    assert_eq!(scan.summary, "Scanned 3 files. Languages: .java, .py, .ts");
}

#[tokio::test]
async fn test_discover_ignores_gitignore() {
    let repo = TempDir::new().unwrap();
    write_repo(
        repo.path(),
        &[(".gitignore", "generated/\n"), ("generated/model.py", "X = 1")],
    );

    let scan = discover(&repo.path().to_string_lossy(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(scan.files, vec!["generated/model.py"]);
}

#[tokio::test]
async fn test_discover_empty_directory() {
    let repo = TempDir::new().unwrap();

    let scan = discover(&repo.path().to_string_lossy(), TIMEOUT)
        .await
        .unwrap();

    assert!(scan.is_empty());
    assert!(scan.language_histogram.is_empty());
}

#[tokio::test]
async fn test_discover_missing_path() {
    let repo = TempDir::new().unwrap();
    let missing = repo.path().join("nope");

    let err = discover(&missing.to_string_lossy(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(err, DiscoveryError::NotFound(_)));
    let wrapped: PipelineError = err.into();
    assert!(wrapped.to_string().contains("nope"));
}
