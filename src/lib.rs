#![warn(missing_docs)]

//! Entry icons and status badges for password database views.

pub use entryicons_services as services;

/// A "prelude" for users of entryicons.
///
/// Importing this module brings into scope the types needed to build the
/// icon service from settings and bundled resources.
///
/// ```rust
/// use entryicons::prelude::*;
/// ```
pub mod prelude {
    pub use crate::services::icon::{
        Badge, DatabaseIcons, DirectoryResources, IconCacheConfig, IconError, MemoryResources,
        Pixmap, PixmapCache, ResourceNamespace, ResourceProvider, SizeTier, EXPIRED_ICON_INDEX,
    };
    pub use crate::services::settings::{Config, SettingsRegistry};
}

use crate::prelude::*;

/// Build the icon service the way an application's startup code does.
///
/// Loads settings from the XDG locations, then looks for bundled resources
/// under the XDG data directories of `app_name`. Falls back to default
/// settings when loading fails and to an empty resource set when no
/// resource directory is installed.
pub async fn load_database_icons(app_name: &str) -> DatabaseIcons {
    let settings = match SettingsRegistry::new().await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Failed to load settings, using defaults: {}", e);
            SettingsRegistry::with_defaults()
        },
    };
    let config = IconCacheConfig::from_settings(settings.get());

    match DirectoryResources::discover(app_name) {
        Some(resources) => DatabaseIcons::new(resources, config),
        None => {
            log::warn!("No icon resources installed for {}", app_name);
            DatabaseIcons::new(MemoryResources::new(), config)
        },
    }
}
