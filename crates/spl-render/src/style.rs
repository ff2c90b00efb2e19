//! Page style variants.
//!
//! One composer serves every variant; a [`Style`] only resolves to the
//! numbers and switches in a [`StyleConfig`].

use serde::{Deserialize, Serialize};

use crate::geometry::Color;

/// How much line work the guilloche variant lays down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Sparse,
    #[default]
    Normal,
    Dense,
}

/// Tagged style selection as it appears in configuration files:
///
/// ```yaml
/// style:
///   kind: guilloche
///   density: dense
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Style {
    /// Closest to the plain booklet: one cover rosette, light line work.
    #[default]
    Classic,
    /// Heavier security-print look.
    Guilloche {
        #[serde(default)]
        density: Density,
    },
}

/// Colors shared by every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub cover_background: Color,
    pub accent: Color,
    pub data_background: Color,
    pub header_band: Color,
    pub filler_background: Color,
    pub ink: Color,
    pub line_work: Color,
    pub band_from: Color,
    pub band_to: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            cover_background: Color::rgb(0.12, 0.18, 0.22),
            accent: Color::rgb(0.90, 0.80, 0.52),
            data_background: Color::rgb(0.98, 0.985, 0.99),
            header_band: Color::rgb(0.06, 0.25, 0.36),
            filler_background: Color::rgb(0.985, 0.99, 0.995),
            ink: Color::BLACK,
            line_work: Color::rgb(0.20, 0.45, 0.55),
            band_from: Color::rgb(0.98, 0.985, 0.99),
            band_to: Color::rgb(0.82, 0.90, 0.93),
        }
    }
}

/// Which optional motifs are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotifSet {
    pub waves: bool,
    pub microtext: bool,
    pub gradient: bool,
    pub perforation: bool,
}

/// Resolved numbers for one style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleConfig {
    pub palette: Palette,
    pub motifs: MotifSet,
    /// 1 or 2.
    pub cover_rosettes: usize,
    pub rosette_samples: usize,
    pub stamp_rosette_samples: usize,
    pub wave_count: usize,
    pub wave_samples: usize,
    pub microtext_lines: usize,
    pub gradient_steps: usize,
}

impl Style {
    pub fn resolve(&self) -> StyleConfig {
        match *self {
            Style::Classic => StyleConfig {
                palette: Palette::default(),
                motifs: MotifSet {
                    waves: true,
                    microtext: true,
                    gradient: true,
                    perforation: false,
                },
                cover_rosettes: 1,
                rosette_samples: 720,
                stamp_rosette_samples: 240,
                wave_count: 2,
                wave_samples: 240,
                microtext_lines: 2,
                gradient_steps: 24,
            },
            Style::Guilloche { density } => {
                let scale = match density {
                    Density::Sparse => 1,
                    Density::Normal => 2,
                    Density::Dense => 3,
                };
                StyleConfig {
                    palette: Palette::default(),
                    motifs: MotifSet {
                        waves: true,
                        microtext: true,
                        gradient: true,
                        perforation: true,
                    },
                    cover_rosettes: 2,
                    rosette_samples: 480 * scale,
                    stamp_rosette_samples: 160 * scale,
                    wave_count: 2 + 2 * scale,
                    wave_samples: 200 * scale,
                    microtext_lines: 2 + scale,
                    gradient_steps: 40 * scale,
                }
            }
        }
    }
}
