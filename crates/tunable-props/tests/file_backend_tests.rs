use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;
use tunable_core::prelude::*;
use tunable_core::InterceptError;
use tunable_props::{properties, PropertyFile, PropertyFormat, PropertyMap};
use tunable_test_utils::{export_settings, layout_settings, LAYOUT_KEYS};

#[test]
fn store_writes_file_once_with_descriptions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layout.properties");
    let interceptor = Interceptor::new();
    let layout = layout_settings();
    interceptor.register(&layout).unwrap();

    let mut file = PropertyFile::open(&path).unwrap();
    let report = interceptor.store(&mut file, [&layout]).unwrap();
    assert!(report.is_clean());

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("# Number of iterations\nlayout.iterations=100\n"));
    assert!(text.contains("layout.algorithm=force-directed\n"));
    assert!(!text.contains("edgeColor"));
}

#[test]
fn load_from_each_format() {
    let dir = TempDir::new().unwrap();
    let fixtures = [
        ("a.properties", "layout.iterations: 7\nlayout.randomize = on\n"),
        ("a.json", r#"{"layout.iterations": 7, "layout.randomize": true}"#),
        ("a.yaml", "layout.iterations: 7\nlayout.randomize: true\n"),
    ];

    for (name, content) in fixtures {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();

        let interceptor = Interceptor::new();
        let layout = layout_settings();
        interceptor.register(&layout).unwrap();

        let file = PropertyFile::open(&path).unwrap();
        let report = interceptor.load(&file, [&layout]).unwrap();

        assert!(report.is_clean(), "{name}");
        assert_eq!(report.applied.len(), 2, "{name}");
        assert_eq!(layout.read().iterations, 7, "{name}");
        assert!(layout.read().randomize, "{name}");
    }
}

#[test]
fn file_round_trip_across_objects() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.yml");
    let interceptor = Interceptor::new();

    let layout = layout_settings();
    let export = export_settings();
    {
        let mut guard = layout.write();
        guard.label = "title: with # and = signs".to_string();
        guard.algorithm.set_selected("circular").unwrap();
    }
    export.write().dpi = 96;
    interceptor.register(&layout).unwrap();
    interceptor.register(&export).unwrap();

    let mut file = PropertyFile::create(&path);
    interceptor.store_all(&mut file).unwrap();

    let restored_layout = layout_settings();
    let restored_export = export_settings();
    let fresh = Interceptor::new();
    fresh.register(&restored_layout).unwrap();
    fresh.register(&restored_export).unwrap();

    let report = fresh.load_all(&PropertyFile::open(&path).unwrap());
    assert!(report.is_clean());
    assert_eq!(restored_layout.read().label, "title: with # and = signs");
    assert_eq!(restored_layout.read().algorithm.selected(), Some("circular"));
    assert_eq!(restored_export.read().dpi, 96);
}

#[test]
fn commit_failure_is_a_backend_error() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes the write fail
    let path = dir.path().join("blocked.properties");
    fs::create_dir(&path).unwrap();

    let interceptor = Interceptor::new();
    let layout = layout_settings();
    interceptor.register(&layout).unwrap();

    let mut file = PropertyFile::create(&path);
    let err = interceptor.store(&mut file, [&layout]).unwrap_err();
    assert!(matches!(err, InterceptError::Backend(_)));
}

#[test]
fn property_map_is_a_source_and_sink() {
    let interceptor = Interceptor::new();
    let layout = layout_settings();
    interceptor.register(&layout).unwrap();

    let mut map = PropertyMap::new();
    interceptor.store(&mut map, [&layout]).unwrap();
    let keys: Vec<_> = map.iter().map(|(k, _)| k.as_str()).collect();
    let mut expected = LAYOUT_KEYS.to_vec();
    expected.sort_unstable();
    assert_eq!(keys, expected);

    map.insert("layout.iterations", "3");
    interceptor.load(&map, [&layout]).unwrap();
    assert_eq!(layout.read().iterations, 3);
}

proptest! {
    #[test]
    fn prop_escaping_round_trips(
        entries in prop::collection::btree_map(any::<String>(), any::<String>(), 0..8),
    ) {
        let text = properties::render(&entries, &BTreeMap::new());
        prop_assert_eq!(properties::parse(&text).unwrap(), entries);
    }

    #[test]
    fn prop_every_format_round_trips(
        entries in prop::collection::btree_map("[a-z][a-z.]{0,12}", "[ -~]{0,16}", 0..8),
    ) {
        for format in PropertyFormat::ALL {
            let text = format.render(&entries, &BTreeMap::new()).unwrap();
            prop_assert_eq!(&format.parse(&text).unwrap(), &entries);
        }
    }
}
