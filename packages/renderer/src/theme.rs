//! Page theme as seen by the preview renderer

use pagecraft_blocks::{FontColors, PageContent};

use crate::media::MediaArbiter;

/// Named background themes. Anything else is used as raw CSS.
const NAMED_THEMES: &[(&str, &str, bool)] = &[
    ("default", "#ffffff", false),
    ("light", "#f9fafb", false),
    ("dark", "#111827", true),
    ("midnight", "linear-gradient(135deg, #0f172a 0%, #1e1b4b 100%)", true),
    ("sunset", "linear-gradient(135deg, #f97316 0%, #db2777 100%)", true),
    ("ocean", "linear-gradient(135deg, #0ea5e9 0%, #1d4ed8 100%)", true),
    ("forest", "linear-gradient(135deg, #16a34a 0%, #14532d 100%)", true),
    ("lavender", "linear-gradient(135deg, #ede9fe 0%, #c4b5fd 100%)", false),
    ("peach", "linear-gradient(135deg, #fed7aa 0%, #fecdd3 100%)", false),
];

/// Everything preview rendering needs besides the block itself
#[derive(Debug, Clone, Default)]
pub struct ThemeContext {
    /// CSS `background` value
    pub background: String,
    /// Base text colour derived from the background
    pub text_color: String,
    pub font_name: Option<String>,
    pub font_file_url: Option<String>,
    pub font_colors: FontColors,
    /// Shared "one player at a time" arbiter for audio/video blocks
    pub media: MediaArbiter,
}

impl ThemeContext {
    pub fn from_content(content: &PageContent, media: MediaArbiter) -> Self {
        let (background, dark) = resolve_background(content.background_theme.as_deref());
        Self {
            background,
            text_color: if dark { "#ffffff" } else { "#111827" }.to_string(),
            font_name: content.font_name.clone(),
            font_file_url: content.font_file_url.clone(),
            font_colors: content.font_colors.clone(),
            media,
        }
    }

    /// Colour for a heading level (`h1`..`h3`) or `p`
    pub fn color_for(&self, level: &str) -> &str {
        let custom = match level {
            "h1" => self.font_colors.h1.as_deref(),
            "h2" => self.font_colors.h2.as_deref(),
            "h3" => self.font_colors.h3.as_deref(),
            _ => self.font_colors.p.as_deref(),
        };
        custom.filter(|c| !c.is_empty()).unwrap_or(&self.text_color)
    }

    /// CSS `font-family` value
    pub fn font_family(&self) -> String {
        match self.font_name.as_deref() {
            Some(name) if !name.is_empty() => format!("'{}', sans-serif", name.replace('\'', "")),
            _ => "system-ui, sans-serif".to_string(),
        }
    }
}

/// CSS background and whether it is dark
pub fn resolve_background(theme: Option<&str>) -> (String, bool) {
    let theme = theme.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("default");
    match NAMED_THEMES.iter().find(|(name, _, _)| *name == theme) {
        Some((_, css, dark)) => (css.to_string(), *dark),
        None => (theme.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_raw_backgrounds() {
        assert_eq!(resolve_background(None), ("#ffffff".to_string(), false));
        assert!(resolve_background(Some("sunset")).1);
        assert_eq!(resolve_background(Some("#abcdef")), ("#abcdef".to_string(), false));
    }

    #[test]
    fn test_font_colors_override_base() {
        let content = PageContent {
            background_theme: Some("dark".into()),
            font_colors: FontColors {
                h1: Some("#ff0000".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let theme = ThemeContext::from_content(&content, MediaArbiter::new());
        assert_eq!(theme.color_for("h1"), "#ff0000");
        assert_eq!(theme.color_for("h2"), "#ffffff");
        assert_eq!(theme.font_family(), "system-ui, sans-serif");
    }
}
