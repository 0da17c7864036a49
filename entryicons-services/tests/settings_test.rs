use entryicons_services::icon::IconCacheConfig;
use entryicons_services::SettingsRegistry;
use std::fs;

#[tokio::test]
async fn test_settings_defaults() {
    let registry = SettingsRegistry::with_defaults();
    let config = registry.get();
    assert_eq!(config.application_density(), 0);
    assert!(!config.compact_mode());
    assert_eq!(IconCacheConfig::from_settings(config), IconCacheConfig::default());
}

#[tokio::test]
async fn test_settings_load_from_paths_precedence() {
    let test_dir = std::env::temp_dir().join("entryicons_settings_test");
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).unwrap();
    }
    fs::create_dir_all(&test_dir).unwrap();

    let system = test_dir.join("system.toml");
    let user = test_dir.join("user.toml");
    fs::write(
        &system,
        "[gui]\napplication_density = 1\n\n[icons]\ncache_limit_kb = 4096\n",
    )
    .unwrap();
    fs::write(&user, "[icons]\ndevice_pixel_ratio = 1.5\n").unwrap();

    let mut registry = SettingsRegistry::with_defaults();
    let results = registry
        .load_from_paths_async(vec![system.clone(), user.clone()])
        .await;
    assert!(results.iter().all(|r| r.is_ok()));

    let config = IconCacheConfig::from_settings(registry.get());
    assert!(config.compact_mode);
    assert_eq!(config.cache_limit_kb, 4096);
    assert_eq!(config.device_pixel_ratio, 1.5);

    // A later file can turn compact mode back off.
    let override_path = test_dir.join("override.toml");
    fs::write(&override_path, "[gui]\napplication_density = 0\n").unwrap();
    registry.load_from_paths_async(vec![override_path]).await;
    assert!(!registry.get().compact_mode());
    assert_eq!(registry.get().icons.cache_limit_kb, Some(4096));

    fs::remove_dir_all(&test_dir).unwrap();
}

#[tokio::test]
async fn test_settings_bad_files_reported() {
    let test_dir = std::env::temp_dir().join("entryicons_settings_bad_test");
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).unwrap();
    }
    fs::create_dir_all(&test_dir).unwrap();

    let broken = test_dir.join("broken.toml");
    fs::write(&broken, "[gui\napplication_density = ").unwrap();
    let missing = test_dir.join("missing.toml");

    let mut registry = SettingsRegistry::with_defaults();
    let results = registry.load_from_paths_async(vec![broken, missing]).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_err()));
    assert!(!registry.get().compact_mode());

    fs::remove_dir_all(&test_dir).unwrap();
}
