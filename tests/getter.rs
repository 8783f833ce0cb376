mod common;

use common::{
    FakeIndex, as_refs, init_logging, module_entries, settings, sha256_hex, wheel_bytes,
    write_wheel,
};
use kodegen_bundler_wheels::{
    Error, ErrorCategory, WheelGetter,
    settings::CacheRoot,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn glob_in(dir: &Path, pattern: &str) -> String {
    format!("{}/{}", dir.display(), pattern)
}

fn collected(getter: &WheelGetter<FakeIndex>) -> Vec<(String, PathBuf)> {
    getter
        .distributions()
        .map(|(name, path)| (name.to_string(), path.to_path_buf()))
        .collect()
}

#[tokio::test]
async fn collects_requirements_then_globs() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("wheels");
    let local_wheel = write_wheel(
        &local,
        "cachetools-4.1.0-py3-none-any.whl",
        &as_refs(&module_entries("cachetools", "cachetools-4.1.0.dist-info")),
    );

    let bytes = wheel_bytes(&as_refs(&module_entries("astsearch", "astsearch-0.1.3.dist-info")));
    let mut index = FakeIndex::new();
    index.add_file(
        "astsearch",
        "0.1.3",
        "astsearch-0.1.3-py3-none-any.whl",
        bytes.clone(),
        Some(sha256_hex(&bytes)),
    );

    let settings = settings(tmp.path(), "3.8")
        .requirements(vec!["astsearch==0.1.3".into()])
        .wheel_globs(vec![glob_in(&local, "*.whl")])
        .build()
        .unwrap();
    let mut getter = WheelGetter::new(settings, index).unwrap();
    getter.get_all().await.unwrap();

    let pkgs = tmp.path().join("pkgs");
    assert!(pkgs.join("astsearch.py").is_file());
    assert!(pkgs.join("cachetools.py").is_file());

    let cached = CacheRoot::new(tmp.path().join("cache"))
        .release_dir("astsearch", "0.1.3")
        .join("astsearch-0.1.3-py3-none-any.whl");
    assert_eq!(
        collected(&getter),
        vec![
            ("astsearch".to_string(), cached),
            ("cachetools".to_string(), local_wheel),
        ]
    );
}

#[tokio::test]
async fn requirement_and_glob_for_same_distribution_conflict() {
    let tmp = TempDir::new().unwrap();
    let entries = module_entries("astsearch", "astsearch-0.1.3.dist-info");
    let cached = write_wheel(
        &CacheRoot::new(tmp.path().join("cache")).release_dir("astsearch", "0.1.3"),
        "astsearch-0.1.3-py3-none-any.whl",
        &as_refs(&entries),
    );
    let local = tmp.path().join("wheels");
    let local_wheel = write_wheel(&local, "astsearch-0.1.2-py3-none-any.whl", &as_refs(&entries));

    let settings = settings(tmp.path(), "3.8")
        .requirements(vec!["astsearch==0.1.3".into()])
        .wheel_globs(vec![glob_in(&local, "astsearch-*.whl")])
        .build()
        .unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    let err = getter.get_all().await.unwrap_err();

    match &err {
        Error::DuplicateDistribution {
            distribution,
            previous,
            current,
        } => {
            assert_eq!(distribution, "astsearch");
            assert_eq!(previous, &cached);
            assert_eq!(current, &local_wheel);
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains(&cached.display().to_string()), "{message}");
    assert!(message.contains(&local_wheel.display().to_string()), "{message}");
    assert_eq!(err.category(), ErrorCategory::Consistency);
}

#[tokio::test]
async fn duplicate_detection_normalizes_names() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("wheels");
    let entries = module_entries("win32ctypes", "pywin32_ctypes-0.2.0.dist-info");
    write_wheel(&local, "pywin32_ctypes-0.2.0-py2.py3-none-any.whl", &as_refs(&entries));
    let extra = tmp.path().join("extra");
    write_wheel(&extra, "pywin32_ctypes-0.2.0-py2.py3-none-any.whl", &as_refs(&entries));

    let settings = settings(tmp.path(), "3.8")
        .requirements(vec!["pywin32-ctypes==0.2.0".into()])
        .extra_sources(vec![extra])
        .wheel_globs(vec![glob_in(&local, "*.whl")])
        .build()
        .unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    let err = getter.get_all().await.unwrap_err();

    assert!(matches!(err, Error::DuplicateDistribution { .. }), "{err}");
}

#[tokio::test]
async fn glob_without_matches_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let pattern = glob_in(tmp.path(), "nonexistent-*.whl");
    let settings = settings(tmp.path(), "3.8")
        .wheel_globs(vec![pattern.clone()])
        .build()
        .unwrap();

    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    let err = getter.get_globs().await.unwrap_err();

    assert!(matches!(&err, Error::GlobNoMatch { pattern: p } if *p == pattern));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[tokio::test]
async fn invalid_glob_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path(), "3.8")
        .wheel_globs(vec![glob_in(tmp.path(), "[.whl")])
        .build()
        .unwrap();

    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    let err = getter.get_globs().await.unwrap_err();

    assert!(matches!(err, Error::InvalidGlob { .. }), "{err}");
}

#[test]
fn validate_wheel_rejects_unparseable_filenames() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path(), "3.8").build().unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();

    let err = getter
        .validate_wheel(&tmp.path().join("notawheel.txt"))
        .unwrap_err();
    assert!(matches!(&err, Error::InvalidWheelFilename { filename } if filename == "notawheel.txt"));
    assert_eq!(getter.distributions().count(), 0);
}

#[test]
fn validate_wheel_rejects_incompatible_wheels() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path(), "3.8").build().unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();

    for name in [
        "foo-1.0-cp38-cp38-manylinux1_x86_64.whl",
        "foo-1.0-py26-none-any.whl",
        "foo-1.0-cp38-cp38-win32.whl",
    ] {
        let err = getter.validate_wheel(&tmp.path().join(name)).unwrap_err();
        assert!(
            matches!(&err, Error::IncompatibleWheel { wheel, .. } if wheel == name),
            "{name}: {err}"
        );
        let message = err.to_string();
        assert!(message.contains("Python 3.8"), "{message}");
        assert!(message.contains("win_amd64"), "{message}");
    }
}

#[test]
fn validate_wheel_accepts_and_records_compatible_wheels() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path(), "3.8").build().unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();

    let first = tmp.path().join("foo-1.0-py2.py3-none-any.whl");
    let second = tmp.path().join("bar-2.0-cp38-abi3-win_amd64.whl");
    getter.validate_wheel(&first).unwrap();
    getter.validate_wheel(&second).unwrap();

    assert_eq!(
        collected(&getter),
        vec![("foo".to_string(), first.clone()), ("bar".to_string(), second)]
    );

    let err = getter
        .validate_wheel(&tmp.path().join("foo-1.1-py3-none-any.whl"))
        .unwrap_err();
    assert!(matches!(&err, Error::DuplicateDistribution { previous, .. } if *previous == first));
}

#[tokio::test]
async fn getter_applies_exclusions() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("wheels");
    write_wheel(
        &local,
        "foo-1.0-py3-none-any.whl",
        &[
            ("foo/__init__.py", ""),
            ("foo/bar/baz.py", ""),
            ("foo/bar.txt", ""),
        ],
    );

    let settings = settings(tmp.path(), "3.8")
        .wheel_globs(vec![glob_in(&local, "*.whl")])
        .exclude(vec!["pkgs/foo/bar".into()])
        .build()
        .unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    getter.get_all().await.unwrap();

    let pkgs = tmp.path().join("pkgs");
    assert!(pkgs.join("foo/__init__.py").is_file());
    assert!(pkgs.join("foo/bar.txt").is_file());
    assert!(!pkgs.join("foo/bar").exists());
}

#[tokio::test]
async fn malformed_requirement_stops_the_run() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(tmp.path(), "3.8")
        .requirements(vec!["astsearch".into()])
        .build()
        .unwrap();

    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    let err = getter.get_all().await.unwrap_err();

    assert!(matches!(err, Error::MalformedRequirement { .. }), "{err}");
}

#[tokio::test]
async fn cancelled_run_does_no_work() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("wheels");
    write_wheel(
        &local,
        "foo-1.0-py3-none-any.whl",
        &[("foo/__init__.py", "")],
    );
    let mut index = FakeIndex::new();
    index.add_file(
        "astsearch",
        "0.1.3",
        "astsearch-0.1.3-py3-none-any.whl",
        wheel_bytes(&[("astsearch.py", "")]),
        None,
    );

    let settings = settings(tmp.path(), "3.8")
        .requirements(vec!["astsearch==0.1.3".into()])
        .wheel_globs(vec![glob_in(&local, "*.whl")])
        .build()
        .unwrap();
    let mut getter = WheelGetter::new(settings, index).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let err = getter.get_all_with_cancel(&token).await.unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(err.category(), ErrorCategory::Cancelled);
    assert!(!tmp.path().join("pkgs").exists());
    assert_eq!(getter.distributions().count(), 0);
}

#[tokio::test]
async fn extraction_failures_name_the_wheel() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("wheels");
    let wheel = write_wheel(
        &local,
        "dataonly-1.0-py3-none-any.whl",
        &[("dataonly-1.0.data/scripts/run.py", "")],
    );

    let settings = settings(tmp.path(), "3.8")
        .wheel_globs(vec![glob_in(&local, "*.whl")])
        .build()
        .unwrap();
    let mut getter = WheelGetter::new(settings, FakeIndex::new()).unwrap();
    let err = getter.get_all().await.unwrap_err();

    assert!(matches!(&err, Error::Context(_, inner) if matches!(**inner, Error::EmptyWheel { .. })));
    assert!(err.to_string().contains(&wheel.display().to_string()));
    assert_eq!(err.category(), ErrorCategory::Structural);
}
