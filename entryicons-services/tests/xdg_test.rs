use entryicons_services::icon::{DirectoryResources, ResourceNamespace, ResourceProvider};
use entryicons_services::SettingsRegistry;
use std::fs;

// Environment variables are process-wide, so everything touching XDG lives in
// this single test.
#[tokio::test]
async fn test_xdg_discovery_and_reload() {
    let root = std::env::temp_dir().join("entryicons_xdg_services_test");
    if root.exists() {
        fs::remove_dir_all(&root).unwrap();
    }
    let data_home = root.join("data");
    let config_home = root.join("config");
    let empty = root.join("empty");
    fs::create_dir_all(&empty).unwrap();
    std::env::set_var("XDG_DATA_HOME", &data_home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);
    std::env::set_var("XDG_DATA_DIRS", &empty);
    std::env::set_var("XDG_CONFIG_DIRS", &empty);

    // Nothing installed yet.
    assert!(DirectoryResources::discover("entryicons-xdg-app").is_none());

    let icons_root = data_home.join("entryicons-xdg-app").join("icons");
    fs::create_dir_all(icons_root.join("database")).unwrap();
    fs::write(icons_root.join("database").join("00_Key.png"), b"bytes").unwrap();

    let resources = DirectoryResources::discover("entryicons-xdg-app").unwrap();
    assert_eq!(resources.root(), icons_root.as_path());
    assert_eq!(
        resources.list(ResourceNamespace::Icons).unwrap(),
        vec!["00_Key.png"]
    );

    // User config is picked up by a full load and by reloads.
    let config_dir = config_home.join("entryicons");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[gui]\napplication_density = 1\n").unwrap();

    let mut registry = SettingsRegistry::new().await.unwrap();
    assert!(registry.get().compact_mode());

    fs::write(
        config_dir.join("config.toml"),
        "[gui]\napplication_density = 0\n[icons]\ncache_limit_kb = 256\n",
    )
    .unwrap();
    registry.reload_async().await.unwrap();
    assert!(!registry.get().compact_mode());
    assert_eq!(registry.get().icons.cache_limit_kb, Some(256));

    fs::remove_file(config_dir.join("config.toml")).unwrap();
    registry.reload_async().await.unwrap();
    assert_eq!(registry.get().icons.cache_limit_kb, None);

    fs::remove_dir_all(&root).unwrap();
}
