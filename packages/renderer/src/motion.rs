//! # Motion Presets
//!
//! Maps a named scroll-in animation onto a declarative transition: the
//! hidden keyframe a block starts from, the visible keyframe it settles
//! on, and timing composed from the page's motion settings.
//!
//! Precedence, strongest first:
//!
//! 1. `block.motion.disabled` - no transition at all
//! 2. `block.motion.preset` - replaces the page preset, even when page
//!    motion is switched off
//! 3. `motionSettings.enabled = false` - no transition
//! 4. the page preset

use pagecraft_blocks::{Block, BlockMotion, MotionSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    FadeUp,
    FadeDown,
    FadeIn,
    SlideLeft,
    SlideRight,
    ZoomIn,
    BlurIn,
    None,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::FadeUp,
        Preset::FadeDown,
        Preset::FadeIn,
        Preset::SlideLeft,
        Preset::SlideRight,
        Preset::ZoomIn,
        Preset::BlurIn,
        Preset::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::FadeUp => "fade-up",
            Preset::FadeDown => "fade-down",
            Preset::FadeIn => "fade-in",
            Preset::SlideLeft => "slide-left",
            Preset::SlideRight => "slide-right",
            Preset::ZoomIn => "zoom-in",
            Preset::BlurIn => "blur-in",
            Preset::None => "none",
        }
    }

    /// Look up a preset by name; unknown names fall back to `fade-up`
    pub fn lookup(name: &str) -> Preset {
        name.parse().unwrap_or_else(|_| {
            warn!(preset = name, "Unknown motion preset, using fade-up");
            Preset::FadeUp
        })
    }

    /// Keyframe the block starts from, `None` for the `none` preset
    pub fn hidden(self) -> Option<Keyframe> {
        let base = Keyframe {
            opacity: 0.0,
            ..Keyframe::VISIBLE
        };
        match self {
            Preset::FadeUp => Some(Keyframe { y: 30.0, ..base }),
            Preset::FadeDown => Some(Keyframe { y: -30.0, ..base }),
            Preset::FadeIn => Some(base),
            Preset::SlideLeft => Some(Keyframe { x: -50.0, ..base }),
            Preset::SlideRight => Some(Keyframe { x: 50.0, ..base }),
            Preset::ZoomIn => Some(Keyframe { scale: 0.8, ..base }),
            Preset::BlurIn => Some(Keyframe { blur: 10.0, ..base }),
            Preset::None => None,
        }
    }
}

impl FromStr for Preset {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RenderError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Animated properties. Translations are in px, blur in px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub opacity: f64,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub blur: f64,
}

impl Keyframe {
    pub const VISIBLE: Keyframe = Keyframe {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        blur: 0.0,
    };

    /// Inline CSS equivalent
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "opacity: {}; transform: translate({}px, {}px) scale({});",
            self.opacity, self.x, self.y, self.scale
        );
        if self.blur > 0.0 {
            css.push_str(&format!(" filter: blur({}px);", self.blur));
        }
        css
    }
}

const NAMED_EASINGS: &[(&str, [f64; 4])] = &[
    ("linear", [0.0, 0.0, 1.0, 1.0]),
    ("easeIn", [0.42, 0.0, 1.0, 1.0]),
    ("easeOut", [0.0, 0.0, 0.58, 1.0]),
    ("easeInOut", [0.42, 0.0, 0.58, 1.0]),
    ("circIn", [0.55, 0.0, 1.0, 0.45]),
    ("circOut", [0.0, 0.55, 0.45, 1.0]),
    ("backOut", [0.34, 1.56, 0.64, 1.0]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Easing {
    Named(String),
    CubicBezier([f64; 4]),
}

impl Easing {
    /// Parse `easeOut`, `cubic-bezier(0.2, 0.8, 0.2, 1)` or `[0.2, 0.8, 0.2, 1]`
    pub fn parse(raw: &str) -> Result<Easing, RenderError> {
        let raw = raw.trim();
        if NAMED_EASINGS.iter().any(|(name, _)| *name == raw) {
            return Ok(Easing::Named(raw.to_string()));
        }

        let inner = raw
            .strip_prefix("cubic-bezier(")
            .and_then(|s| s.strip_suffix(')'))
            .or_else(|| raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
            .ok_or_else(|| RenderError::InvalidEasing(raw.to_string()))?;

        let points: Vec<f64> = inner
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| RenderError::InvalidEasing(raw.to_string()))?;

        match points.as_slice() {
            [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
                Ok(Easing::CubicBezier([*x1, *y1, *x2, *y2]))
            }
            _ => Err(RenderError::InvalidEasing(raw.to_string())),
        }
    }

    /// CSS `transition-timing-function` value
    pub fn to_css(&self) -> String {
        let points = match self {
            Easing::Named(name) => NAMED_EASINGS
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, p)| *p)
                .unwrap_or([0.0, 0.0, 0.58, 1.0]),
            Easing::CubicBezier(points) => *points,
        };
        format!(
            "cubic-bezier({}, {}, {}, {})",
            points[0], points[1], points[2], points[3]
        )
    }
}

/// What a block does when scrolled into view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDescriptor {
    pub preset: Preset,
    pub hidden: Keyframe,
    pub visible: Keyframe,
    /// Seconds
    pub duration: f64,
    /// Seconds, including the per-index stagger
    pub delay: f64,
    pub easing: Easing,
    pub viewport_once: bool,
}

impl TransitionDescriptor {
    /// `data-motion-*` attributes consumed by the page's animation script
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        vec![
            ("data-motion".to_string(), self.preset.to_string()),
            ("data-motion-duration".to_string(), format_secs(self.duration)),
            ("data-motion-delay".to_string(), format_secs(self.delay)),
            ("data-motion-easing".to_string(), self.easing.to_css()),
            ("data-motion-once".to_string(), self.viewport_once.to_string()),
            ("data-motion-from".to_string(), self.hidden.to_css()),
        ]
    }
}

fn format_secs(secs: f64) -> String {
    format!("{}s", (secs * 1000.0).round() / 1000.0)
}

/// Resolve the transition for the block at `index` in the page's root order
pub fn resolve_transition(
    preset: &str,
    settings: &MotionSettings,
    block_motion: Option<&BlockMotion>,
    index: usize,
) -> Option<TransitionDescriptor> {
    if block_motion.is_some_and(|m| m.disabled) {
        return None;
    }

    let block_preset = block_motion
        .and_then(|m| m.preset.as_deref())
        .filter(|p| !p.is_empty());

    let name = match block_preset {
        Some(name) => name,
        None if !settings.enabled => return None,
        None => preset,
    };

    let preset = Preset::lookup(name);
    let hidden = preset.hidden()?;

    let easing = Easing::parse(&settings.easing_curve).unwrap_or_else(|err| {
        warn!(error = %err, "Falling back to easeOut");
        Easing::Named("easeOut".to_string())
    });

    Some(TransitionDescriptor {
        preset,
        hidden,
        visible: Keyframe::VISIBLE,
        duration: settings.duration.max(0.0),
        delay: settings.delay.max(0.0) + settings.stagger.max(0.0) * index as f64,
        easing,
        viewport_once: settings.viewport_once,
    })
}

/// Transition for a block using the page's own preset
pub fn transition_for_block(settings: &MotionSettings, block: &Block, index: usize) -> Option<TransitionDescriptor> {
    resolve_transition(&settings.preset, settings, block.motion.as_ref(), index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(preset: Option<&str>, disabled: bool) -> BlockMotion {
        BlockMotion {
            preset: preset.map(str::to_string),
            disabled,
        }
    }

    #[test]
    fn test_fade_up_defaults() {
        let settings = MotionSettings::default();
        let t = resolve_transition("fade-up", &settings, None, 0).unwrap();
        assert_eq!(t.hidden.opacity, 0.0);
        assert_eq!(t.hidden.y, 30.0);
        assert_eq!(t.visible, Keyframe::VISIBLE);
        assert_eq!(t.duration, 0.6);
        assert_eq!(t.easing, Easing::Named("easeOut".into()));
    }

    #[test]
    fn test_stagger_by_index() {
        let settings = MotionSettings {
            delay: 0.2,
            stagger: 0.1,
            ..Default::default()
        };
        let t = resolve_transition("fade-in", &settings, None, 3).unwrap();
        assert!((t.delay - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_block_disabled_always_wins() {
        let settings = MotionSettings::default();
        let m = motion(Some("zoom-in"), true);
        assert!(resolve_transition("fade-up", &settings, Some(&m), 0).is_none());
    }

    #[test]
    fn test_block_preset_overrides_page() {
        let settings = MotionSettings {
            enabled: false,
            ..Default::default()
        };
        assert!(resolve_transition("fade-up", &settings, None, 0).is_none());

        let m = motion(Some("zoom-in"), false);
        let t = resolve_transition("fade-up", &settings, Some(&m), 0).unwrap();
        assert_eq!(t.preset, Preset::ZoomIn);
        assert_eq!(t.hidden.scale, 0.8);
    }

    #[test]
    fn test_none_and_unknown_presets() {
        let settings = MotionSettings::default();
        assert!(resolve_transition("none", &settings, None, 0).is_none());
        let t = resolve_transition("spin-wildly", &settings, None, 0).unwrap();
        assert_eq!(t.preset, Preset::FadeUp);
    }

    #[test]
    fn test_easing_parsing() {
        assert_eq!(
            Easing::parse("cubic-bezier(0.2, 0.8, 0.2, 1)").unwrap(),
            Easing::CubicBezier([0.2, 0.8, 0.2, 1.0])
        );
        assert_eq!(
            Easing::parse("[0.4, 0, 0.2, 1]").unwrap(),
            Easing::CubicBezier([0.4, 0.0, 0.2, 1.0])
        );
        assert!(Easing::parse("cubic-bezier(2, 0, 0, 1)").is_err());
        assert!(Easing::parse("bouncy").is_err());

        let settings = MotionSettings {
            easing_curve: "bouncy".into(),
            ..Default::default()
        };
        let t = resolve_transition("fade-in", &settings, None, 0).unwrap();
        assert_eq!(t.easing.to_css(), "cubic-bezier(0, 0, 0.58, 1)");
    }
}
