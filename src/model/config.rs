use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::foundation::core::{Rgba8, Rgba8Premul};
use crate::foundation::error::{TourError, TourResult};
use crate::model::step::{Motion, Step};

#[derive(Clone, Debug, Serialize, Deserialize)]
/// In-memory tour configuration.
///
/// Built programmatically or parsed from JSON via [`TourConfig::from_reader`] /
/// [`TourConfig::from_path`]. A configuration is immutable once a tour starts.
pub struct TourConfig {
    /// Ordered tour steps.
    pub steps: Vec<Step>,
    /// Mask tint.
    #[serde(default = "default_color")]
    pub color: MaskColor,
    /// Mask opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Advance the tour when the dimmed backdrop is tapped.
    #[serde(default)]
    pub should_continue_on_backdrop_press: bool,
    /// Bounded retry for targets that are not registered yet.
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Animation timing handed to the host with each spot move.
    #[serde(default)]
    pub timing: MotionTiming,
}

fn default_color() -> MaskColor {
    MaskColor(Rgba8::BLACK)
}

fn default_opacity() -> f64 {
    0.45
}

impl TourConfig {
    /// Configuration with default mask and timing for `steps`.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            color: default_color(),
            opacity: default_opacity(),
            should_continue_on_backdrop_press: false,
            retry: RetryPolicy::default(),
            timing: MotionTiming::default(),
        }
    }

    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TourResult<Self> {
        serde_json::from_reader(r).map_err(|e| TourError::serde(format!("parse tour JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> TourResult<Self> {
        serde_json::from_str(s).map_err(|e| TourError::serde(format!("parse tour JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TourResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TourError::validation(format!("open tour JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Mask style derived from `color` and `opacity`.
    pub fn mask(&self) -> MaskStyle {
        MaskStyle {
            color: self.color.0,
            opacity: self.opacity,
        }
    }

    /// Check structural invariants before a tour runs.
    pub fn validate(&self) -> TourResult<()> {
        if self.steps.is_empty() {
            return Err(TourError::validation("tour must have at least one step"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(TourError::validation(format!(
                "opacity must be in [0, 1], got {}",
                self.opacity
            )));
        }
        for (idx, step) in self.steps.iter().enumerate() {
            step.validate()
                .map_err(|e| TourError::validation(format!("step {idx}: {e}")))?;
        }
        self.retry.validate()?;
        self.timing.validate()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
/// Mask tint, accepted as `"#RRGGBB"`, `"#RRGGBBAA"` or `{r, g, b, a}` (0-255).
pub struct MaskColor(pub Rgba8);

impl<'de> Deserialize<'de> for MaskColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbaObj {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "opaque")]
                a: u8,
            },
        }

        fn opaque() -> u8 {
            255
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map(Self).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self(Rgba8 { r, g, b, a })),
        }
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    match s.len() {
        6 | 8 => {
            let a = if s.len() == 8 { hex_byte(&s[6..8])? } else { 255 };
            Ok(Rgba8 {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a,
            })
        }
        _ => Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Resolved overlay appearance.
pub struct MaskStyle {
    /// Straight tint.
    pub color: Rgba8,
    /// Overall opacity in `[0, 1]`.
    pub opacity: f64,
}

impl MaskStyle {
    /// Premultiplied fill for the dimmed overlay.
    pub fn fill(&self) -> Rgba8Premul {
        self.color.premultiplied(self.opacity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Bounded retry schedule for measuring targets that have not mounted yet.
pub struct RetryPolicy {
    /// Total measurement attempts before giving up, including the first one.
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds.
    pub interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval_ms: 100,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self) -> TourResult<()> {
        if self.max_attempts == 0 {
            return Err(TourError::validation("retry.max_attempts must be > 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
/// Duration and curve of one animation.
pub struct Timing {
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Timing curve.
    pub ease: Ease,
}

impl Timing {
    /// Duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
/// Animation timing per motion kind.
pub struct MotionTiming {
    /// Spot travel for [`Motion::Sliding`].
    pub sliding: Timing,
    /// Each half (out, then in) of a [`Motion::Fading`] cross-fade.
    pub fading: Timing,
    /// Tooltip fade in/out.
    pub tip_fade: Timing,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            sliding: Timing {
                duration_ms: 400,
                ease: Ease::OutCubic,
            },
            fading: Timing {
                duration_ms: 200,
                ease: Ease::InOutQuad,
            },
            tip_fade: Timing {
                duration_ms: 150,
                ease: Ease::Linear,
            },
        }
    }
}

impl MotionTiming {
    /// Timing of a spot move for `motion`.
    pub fn for_motion(&self, motion: Motion) -> Timing {
        match motion {
            Motion::Sliding => self.sliding,
            Motion::Fading => self.fading,
        }
    }

    fn validate(&self) -> TourResult<()> {
        if self.sliding.duration_ms == 0 || self.fading.duration_ms == 0 {
            return Err(TourError::validation("spot animation durations must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/config.rs"]
mod tests;
