use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{QrloomError, QrloomResult};
use crate::layout::LayoutMode;

/// Largest finder halo bleed accepted, in pixels.
pub const MAX_FINDER_BLEED_PX: u32 = 8;

/// Paint parameters for the QR overlay.
///
/// `Default` is the plain "classic" look: opaque black modules, light modules left unpainted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Fill for dark data modules.
    pub dark_color: Rgba8,
    /// Fill for light data modules. `None` leaves them unpainted so the background shows.
    pub light_color: Option<Rgba8>,
    /// Fill for dark finder-pattern modules.
    pub finder_dark_color: Rgba8,
    /// Fill for light finder modules and the finder halo. The halo falls back to white.
    pub finder_light_color: Option<Rgba8>,
    /// Fraction of the module side trimmed from each edge of a data dot, in `[0, 0.5)`.
    pub data_padding_ratio: f32,
    /// Extra alpha applied to dark data modules, `0..=255`.
    pub opacity: u32,
    /// How far the halo behind each dark finder module extends, in pixels.
    pub finder_bleed_px: u32,
    /// Optional 1px ring drawn around each dark data dot.
    pub data_outline: Option<Rgba8>,
    /// Fill of the base canvas behind centred frames.
    pub base_fill: Rgba8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            dark_color: Rgba8::BLACK,
            light_color: None,
            finder_dark_color: Rgba8::BLACK,
            finder_light_color: None,
            data_padding_ratio: 0.0,
            opacity: 255,
            finder_bleed_px: 0,
            data_outline: None,
            base_fill: Rgba8::WHITE,
        }
    }
}

impl StyleConfig {
    /// Reject out-of-range parameters. Nothing is clamped.
    pub fn validate(&self) -> QrloomResult<()> {
        let pad = self.data_padding_ratio;
        if !pad.is_finite() || !(0.0..0.5).contains(&pad) {
            return Err(QrloomError::config(format!(
                "data_padding_ratio must be in [0, 0.5), got {pad}"
            )));
        }
        if self.opacity > 255 {
            return Err(QrloomError::config(format!(
                "opacity must be in [0, 255], got {}",
                self.opacity
            )));
        }
        if self.finder_bleed_px > MAX_FINDER_BLEED_PX {
            return Err(QrloomError::config(format!(
                "finder_bleed_px must be in [0, {MAX_FINDER_BLEED_PX}], got {}",
                self.finder_bleed_px
            )));
        }
        Ok(())
    }

    /// Dark data colour with `opacity` folded into its alpha.
    pub(crate) fn effective_dark(&self) -> Rgba8 {
        self.dark_color.with_opacity(self.opacity.min(255) as u8)
    }

    /// Padding in pixels for a module of side `module_size`, truncated.
    pub(crate) fn padding_px(&self, module_size: u32) -> u32 {
        (module_size as f32 * self.data_padding_ratio) as u32
    }
}

/// Named looks, each a style plus the layout it was designed for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Square black modules straight on the artwork.
    #[default]
    Classic,
    /// Classic with half-transparent dark modules.
    Translucent,
    /// 300px card: translucent white base, haloed finders, padded dots with a white outline.
    Framed,
    /// 300px card on opaque white with smaller dots.
    Dots,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Self::Classic, Self::Translucent, Self::Framed, Self::Dots];

    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Translucent => "translucent",
            Self::Framed => "framed",
            Self::Dots => "dots",
        }
    }

    pub fn style(self) -> StyleConfig {
        match self {
            Self::Classic => StyleConfig::default(),
            Self::Translucent => StyleConfig {
                opacity: 128,
                ..StyleConfig::default()
            },
            Self::Framed => StyleConfig {
                finder_light_color: Some(Rgba8::WHITE),
                data_padding_ratio: 0.35,
                finder_bleed_px: 3,
                data_outline: Some(Rgba8::WHITE),
                base_fill: Rgba8::rgba(255, 255, 255, 220),
                ..StyleConfig::default()
            },
            Self::Dots => StyleConfig {
                finder_light_color: Some(Rgba8::WHITE),
                data_padding_ratio: 0.3,
                finder_bleed_px: 2,
                data_outline: Some(Rgba8::WHITE),
                ..StyleConfig::default()
            },
        }
    }

    pub fn layout(self) -> LayoutMode {
        match self {
            Self::Classic | Self::Translucent => LayoutMode::scale(10),
            Self::Framed | Self::Dots => LayoutMode::FitCanvas {
                canvas_size: 300,
                border: 10,
                quiet_zone: 2,
            },
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset \"{s}\" (expected one of {})", names.join(", "))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/config.rs"]
mod tests;
