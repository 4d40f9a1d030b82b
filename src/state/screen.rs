//! Top-level screen and dashboard section selection

use std::fmt;

use clap::ValueEnum;

/// What the app shows at top level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Not signed in
    Landing,
    /// Signed in, profile not configured yet
    Setup,
    Dashboard,
}

impl Screen {
    /// Only authentication and configuration gate the dashboard
    pub fn resolve(is_authenticated: bool, is_configured: bool) -> Self {
        match (is_authenticated, is_configured) {
            (false, _) => Self::Landing,
            (true, false) => Self::Setup,
            (true, true) => Self::Dashboard,
        }
    }
}

/// Dashboard sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Section {
    #[default]
    Overview,
    Months,
    Categories,
    Settings,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Overview => "overview",
            Self::Months => "months",
            Self::Categories => "categories",
            Self::Settings => "settings",
        };
        write!(f, "{}", name)
    }
}
