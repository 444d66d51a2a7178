//! Colors and appearance mapping for the window

use crate::types::AppearanceMode;
use eframe::egui::{Color32, ThemePreference};

pub const ACCENT: Color32 = Color32::from_rgb(0x3B, 0x8E, 0xD0);
pub const DOWNLOAD_COLOR: Color32 = Color32::from_rgb(0x1F, 0x77, 0xB4);
pub const UPLOAD_COLOR: Color32 = Color32::from_rgb(0xFF, 0x7F, 0x0E);
pub const ERROR_COLOR: Color32 = Color32::from_rgb(0xE0, 0x4F, 0x4F);

pub const CARD_VALUE_SIZE: f32 = 24.0;
pub const CARD_TITLE_SIZE: f32 = 14.0;
pub const CARD_WIDTH: f32 = 140.0;

pub fn theme_preference(mode: AppearanceMode) -> ThemePreference {
    match mode {
        AppearanceMode::System => ThemePreference::System,
        AppearanceMode::Light => ThemePreference::Light,
        AppearanceMode::Dark => ThemePreference::Dark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_maps() {
        assert_eq!(theme_preference(AppearanceMode::System), ThemePreference::System);
        assert_eq!(theme_preference(AppearanceMode::Light), ThemePreference::Light);
        assert_eq!(theme_preference(AppearanceMode::Dark), ThemePreference::Dark);
    }
}
