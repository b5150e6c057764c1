//! Platform theming.
//!
//! Maps the metadata service's platform key (the extractor name) to accent
//! colors. The mapping is a pure lookup; applying the tokens to the page is
//! the presentation layer's job.

use serde::Serialize;

/// Accent colors and gradients for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeTokens {
    /// Primary accent color.
    pub accent_primary: &'static str,
    /// Secondary accent color.
    pub accent_secondary: &'static str,
    /// Accent gradient used on primary buttons.
    pub gradient: &'static str,
    /// Color of the first decorative background orb.
    pub orb_color_1: &'static str,
    /// Color of the second decorative background orb.
    pub orb_color_2: &'static str,
}

/// Theme used when the platform is unknown or absent.
pub const DEFAULT_THEME: ThemeTokens = ThemeTokens {
    accent_primary: "#6c63ff",
    accent_secondary: "#00d4ff",
    gradient: "linear-gradient(135deg,#6c63ff 0%,#00d4ff 100%)",
    orb_color_1: "#6c63ff",
    orb_color_2: "#00d4ff",
};

const PLATFORM_THEMES: &[(&str, ThemeTokens)] = &[
    (
        "Youtube",
        ThemeTokens {
            accent_primary: "#ff0000",
            accent_secondary: "#ff6b6b",
            gradient: "linear-gradient(135deg,#ff0000 0%,#cc0000 100%)",
            orb_color_1: "#ff0000",
            orb_color_2: "#ff4444",
        },
    ),
    (
        "Instagram",
        ThemeTokens {
            accent_primary: "#e1306c",
            accent_secondary: "#f77737",
            gradient: "linear-gradient(135deg,#833ab4 0%,#e1306c 50%,#f77737 100%)",
            orb_color_1: "#833ab4",
            orb_color_2: "#f77737",
        },
    ),
    (
        "Facebook",
        ThemeTokens {
            accent_primary: "#1877f2",
            accent_secondary: "#42a5f5",
            gradient: "linear-gradient(135deg,#1877f2 0%,#42a5f5 100%)",
            orb_color_1: "#1877f2",
            orb_color_2: "#0d47a1",
        },
    ),
    (
        "TikTok",
        ThemeTokens {
            accent_primary: "#69c9d0",
            accent_secondary: "#ee1d52",
            gradient: "linear-gradient(135deg,#010101 0%,#ee1d52 50%,#69c9d0 100%)",
            orb_color_1: "#ee1d52",
            orb_color_2: "#69c9d0",
        },
    ),
    (
        "Twitter",
        ThemeTokens {
            accent_primary: "#1da1f2",
            accent_secondary: "#0d8ddb",
            gradient: "linear-gradient(135deg,#1da1f2 0%,#0d8ddb 100%)",
            orb_color_1: "#1da1f2",
            orb_color_2: "#075e99",
        },
    ),
    (
        "Twitch",
        ThemeTokens {
            accent_primary: "#9147ff",
            accent_secondary: "#bf94ff",
            gradient: "linear-gradient(135deg,#9147ff 0%,#bf94ff 100%)",
            orb_color_1: "#9147ff",
            orb_color_2: "#6441a5",
        },
    ),
];

/// Look up the theme for a platform key.
///
/// Keys are matched exactly as the service reports them; anything else,
/// including the empty string, yields [`DEFAULT_THEME`].
#[must_use]
pub fn map_theme(platform_key: &str) -> ThemeTokens {
    PLATFORM_THEMES
        .iter()
        .find(|(key, _)| *key == platform_key)
        .map_or(DEFAULT_THEME, |(_, tokens)| *tokens)
}

impl Default for ThemeTokens {
    fn default() -> Self {
        DEFAULT_THEME
    }
}

impl ThemeTokens {
    /// Document-wide CSS custom properties as `(name, value)` pairs.
    #[must_use]
    pub const fn css_variables(&self) -> [(&'static str, &'static str); 3] {
        [
            ("--accent", self.accent_primary),
            ("--accent-2", self.accent_secondary),
            ("--accent-grad", self.gradient),
        ]
    }

    /// Background for the first decorative orb.
    #[must_use]
    pub fn orb_1_background(&self) -> String {
        radial(self.orb_color_1)
    }

    /// Background for the second decorative orb.
    #[must_use]
    pub fn orb_2_background(&self) -> String {
        radial(self.orb_color_2)
    }

    /// Translucent border tint for the preview panel.
    #[must_use]
    pub fn preview_border_color(&self) -> String {
        format!("{}55", self.accent_primary)
    }
}

fn radial(color: &str) -> String {
    format!("radial-gradient(circle,{color},transparent 70%)")
}
