//! UI theme selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Colour theme chosen in the UI.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Follow the stylesheet defaults.
    #[default]
    Default,
    /// Light palette.
    Light,
    /// Dark palette.
    Dark,
}

impl Theme {
    /// All themes in menu order.
    pub const ALL: [Self; 3] = [Self::Default, Self::Light, Self::Dark];

    /// Stable identifier stored in the key-value store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Label shown in the theme menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "기본",
            Self::Light => "라이트",
            Self::Dark => "다크",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "default" => Ok(Self::Default),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_ids_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>(), Ok(theme));
        }
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        assert_eq!("sepia".parse::<Theme>(), Err("sepia".to_string()));
    }
}
