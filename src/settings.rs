//! Модель настроек оверлея: единственная сохраняемая и разделяемая запись.
//!
//! Все числовые поля проходят через [`OverlaySettings::clamped`] после каждого
//! изменения, поэтому значение вне диапазона никогда не сохраняется и не
//! отправляется рендереру.

use serde::{Deserialize, Serialize};

pub const OPACITY_MIN: f64 = 0.05;
pub const OPACITY_MAX: f64 = 1.0;
pub const OPACITY_STEP: f64 = 0.05;

pub const LINE_HEIGHT_MIN: i32 = 20;
pub const LINE_HEIGHT_MAX: i32 = 300;
pub const LINE_HEIGHT_STEP: i32 = 5;

/// Настройки отображения оверлея.
///
/// `#[serde(default)]` даёт слияние "умолчания ⊕ сохранённое": отсутствующие
/// ключи берутся из [`Default`], лишние ключи игнорируются.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlaySettings {
    pub opacity: f64,
    pub is_black: bool,
    pub line_height: i32,
    pub show_footer: bool,
    pub show_dashed_lines: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            is_black: true,
            line_height: 60,
            show_footer: false,
            show_dashed_lines: true,
        }
    }
}

/// Частичное обновление настроек от рендерера (`update-settings`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_black: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_footer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_dashed_lines: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Округление до двух знаков после запятой
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl OverlaySettings {
    /// Привести числовые поля к допустимым диапазонам
    pub fn clamped(mut self) -> Self {
        self.opacity = if self.opacity.is_finite() {
            round2(self.opacity.clamp(OPACITY_MIN, OPACITY_MAX))
        } else {
            Self::default().opacity
        };
        self.line_height = self.line_height.clamp(LINE_HEIGHT_MIN, LINE_HEIGHT_MAX);
        self
    }

    /// Наложить частичное обновление; результат уже приведён к диапазонам
    pub fn merged(&self, patch: &SettingsPatch) -> Self {
        let mut next = *self;
        if let Some(opacity) = patch.opacity {
            next.opacity = opacity;
        }
        if let Some(is_black) = patch.is_black {
            next.is_black = is_black;
        }
        if let Some(line_height) = patch.line_height {
            next.line_height = line_height;
        }
        if let Some(show_footer) = patch.show_footer {
            next.show_footer = show_footer;
        }
        if let Some(show_dashed_lines) = patch.show_dashed_lines {
            next.show_dashed_lines = show_dashed_lines;
        }
        next.clamped()
    }

    pub fn increase_opacity(&self) -> Self {
        Self {
            opacity: OPACITY_MAX.min(round2(self.opacity + OPACITY_STEP)),
            ..*self
        }
        .clamped()
    }

    pub fn decrease_opacity(&self) -> Self {
        Self {
            opacity: OPACITY_MIN.max(round2(self.opacity - OPACITY_STEP)),
            ..*self
        }
        .clamped()
    }

    pub fn increase_line_height(&self) -> Self {
        Self {
            line_height: LINE_HEIGHT_MAX.min(self.line_height.saturating_add(LINE_HEIGHT_STEP)),
            ..*self
        }
        .clamped()
    }

    pub fn decrease_line_height(&self) -> Self {
        Self {
            line_height: LINE_HEIGHT_MIN.max(self.line_height.saturating_sub(LINE_HEIGHT_STEP)),
            ..*self
        }
        .clamped()
    }

    pub fn toggle_color(&self) -> Self {
        Self { is_black: !self.is_black, ..*self }
    }

    pub fn toggle_dashed_lines(&self) -> Self {
        Self { show_dashed_lines: !self.show_dashed_lines, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_range(settings: &OverlaySettings) {
        assert!(settings.opacity >= OPACITY_MIN && settings.opacity <= OPACITY_MAX);
        assert_eq!(settings.opacity, round2(settings.opacity));
        assert!(settings.line_height >= LINE_HEIGHT_MIN && settings.line_height <= LINE_HEIGHT_MAX);
    }

    #[test]
    fn test_defaults() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.opacity, 0.5);
        assert!(settings.is_black);
        assert_eq!(settings.line_height, 60);
        assert!(!settings.show_footer);
        assert!(settings.show_dashed_lines);
    }

    #[test]
    fn test_opacity_steps_are_rounded() {
        let mut settings = OverlaySettings::default();
        for _ in 0..3 {
            settings = settings.increase_opacity();
        }
        assert_eq!(settings.opacity, 0.65);

        settings = settings.decrease_opacity();
        assert_eq!(settings.opacity, 0.6);
    }

    #[test]
    fn test_opacity_ceiling() {
        let settings = OverlaySettings { opacity: 0.98, ..Default::default() };
        assert_eq!(settings.increase_opacity().opacity, 1.0);
    }

    #[test]
    fn test_line_height_floor() {
        let settings = OverlaySettings { line_height: 20, ..Default::default() };
        assert_eq!(settings.decrease_line_height().line_height, 20);
        let settings = OverlaySettings { line_height: 298, ..Default::default() };
        assert_eq!(settings.increase_line_height().line_height, 300);
    }

    #[test]
    fn test_clamping_holds_for_long_sequences() {
        let mut settings = OverlaySettings::default();
        // Детерминированная псевдослучайная последовательность шагов
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            settings = match seed % 4 {
                0 => settings.increase_opacity(),
                1 => settings.decrease_opacity(),
                2 => settings.increase_line_height(),
                _ => settings.decrease_line_height(),
            };
            assert_in_range(&settings);
        }

        for _ in 0..60 {
            settings = settings.decrease_opacity().decrease_line_height();
        }
        assert_eq!(settings.opacity, OPACITY_MIN);
        assert_eq!(settings.line_height, LINE_HEIGHT_MIN);
    }

    #[test]
    fn test_toggles_flip_one_field() {
        let settings = OverlaySettings::default();
        let toggled = settings.toggle_color();
        assert!(!toggled.is_black);
        assert_eq!(toggled.line_height, settings.line_height);

        let toggled = settings.toggle_dashed_lines();
        assert!(!toggled.show_dashed_lines);
        assert_eq!(toggled.is_black, settings.is_black);
    }

    #[test]
    fn test_merge_patch_is_clamped() {
        let settings = OverlaySettings::default();
        let patch = SettingsPatch {
            opacity: Some(7.0),
            line_height: Some(-40),
            show_footer: Some(true),
            ..Default::default()
        };
        let merged = settings.merged(&patch);
        assert_eq!(merged.opacity, 1.0);
        assert_eq!(merged.line_height, 20);
        assert!(merged.show_footer);
        assert_eq!(merged.is_black, settings.is_black);
    }

    #[test]
    fn test_non_finite_opacity_resets_to_default() {
        let settings = OverlaySettings { opacity: f64::NAN, ..Default::default() };
        assert_eq!(settings.clamped().opacity, 0.5);
    }

    #[test]
    fn test_deserialize_merges_with_defaults() {
        let json = r#"{"opacity": 0.8, "isBlack": false, "lineHeight": 120, "showDashedLines": false, "extra": 1}"#;
        let settings: OverlaySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.opacity, 0.8);
        assert!(!settings.is_black);
        assert_eq!(settings.line_height, 120);
        assert!(!settings.show_footer);
        assert!(!settings.show_dashed_lines);
    }

    #[test]
    fn test_patch_deserialize_partial() {
        let patch: SettingsPatch = serde_json::from_str(r#"{"showFooter": true}"#).unwrap();
        assert_eq!(patch.show_footer, Some(true));
        assert!(patch.opacity.is_none());
        assert!(!patch.is_empty());
        assert!(SettingsPatch::default().is_empty());
    }
}
