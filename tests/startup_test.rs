use entryicons::load_database_icons;
use entryicons::prelude::*;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;

fn png(size: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(size, size, Rgba(color));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

// Environment variables are process-wide, so the whole startup path is
// checked in one test.
#[tokio::test]
async fn test_load_database_icons_from_xdg() {
    let root = std::env::temp_dir().join("entryicons_startup_test");
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

    // No resources and no config: empty service with defaults.
    let icons = load_database_icons("entryicons-startup-app").await;
    assert_eq!(icons.count(), 0);
    assert!(!icons.is_compact());

    let icons_root = data_home.join("entryicons-startup-app").join("icons");
    fs::create_dir_all(icons_root.join("database")).unwrap();
    fs::create_dir_all(icons_root.join("badges")).unwrap();
    fs::write(icons_root.join("database").join("00_Key.png"), png(32, [10, 20, 30, 255])).unwrap();
    fs::write(icons_root.join("database").join("01_World.png"), png(32, [90, 20, 30, 255])).unwrap();
    fs::write(icons_root.join("badges").join("0_ShareActive.png"), png(16, [255; 4])).unwrap();

    let config_dir = config_home.join("entryicons");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[gui]\napplication_density = 1\n").unwrap();

    let icons = load_database_icons("entryicons-startup-app").await;
    assert!(icons.is_compact());
    assert_eq!(icons.count(), 2);
    assert_eq!(icons.badge_count(), 1);
    assert_eq!(icons.icon_size(SizeTier::Default), 16);

    let base = icons.icon(0, SizeTier::Default);
    assert_eq!(base.width(), 16);
    let badged = icons.apply_badge(&base, Badge::ShareActive.index());
    assert!(!badged.same_pixels(&base));

    fs::remove_dir_all(&root).unwrap();
}
