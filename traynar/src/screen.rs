use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

/// Every screen the app can navigate to, addressed by route path.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Screen {
    Onboarding,
    Login,
    Signup,
    /// Shown after an account was created
    Congrat,
    Home,
    NewRecording,
    Transcription,
    EvaluationResult,
    History,
    Learn,
    Notifications,
    Profile,
}

pub const ALL_SCREENS: [Screen; 12] = [
    Screen::Onboarding,
    Screen::Login,
    Screen::Signup,
    Screen::Congrat,
    Screen::Home,
    Screen::NewRecording,
    Screen::Transcription,
    Screen::EvaluationResult,
    Screen::History,
    Screen::Learn,
    Screen::Notifications,
    Screen::Profile,
];

impl Screen {
    pub fn path(&self) -> &'static str {
        match self {
            Screen::Onboarding => "/",
            Screen::Login => "/login",
            Screen::Signup => "/signup",
            Screen::Congrat => "/congrat",
            Screen::Home => "/home",
            Screen::NewRecording => "/new-recording",
            Screen::Transcription => "/transcription",
            Screen::EvaluationResult => "/evaluation-result",
            Screen::History => "/history",
            Screen::Learn => "/lms",
            Screen::Notifications => "/notifications",
            Screen::Profile => "/profile",
        }
    }

    /// Label on the bottom tab bar, for screens that have a tab
    pub fn tab_title(&self) -> Option<&'static str> {
        match self {
            Screen::Home => Some("Home"),
            Screen::NewRecording => Some("Record"),
            Screen::Learn => Some("Learn"),
            Screen::EvaluationResult => Some("Insights"),
            _ => None,
        }
    }
}

impl FromStr for Screen {
    type Err = anyhow::Error;

    /// Accepts route paths with or without the leading slash, and the `(auth)`/`(tabs)` group
    /// prefixes used in file-based routes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let path = trimmed
            .trim_start_matches('/')
            .trim_start_matches("(auth)/")
            .trim_start_matches("(tabs)/")
            .trim_start_matches("(main)/");
        if path.is_empty() || path == "index" {
            return Ok(Screen::Onboarding);
        }
        ALL_SCREENS
            .iter()
            .find(|screen| &screen.path()[1..] == path)
            .copied()
            .ok_or(anyhow!("unknown screen route: {}", s))
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Moves the user to another screen.
pub trait Navigator {
    fn navigate(&self, screen: Screen);
}

#[test]
fn test_screen_routes() {
    assert_eq!(Screen::from_str("/home").unwrap(), Screen::Home);
    assert_eq!(Screen::from_str("(auth)/congrat").unwrap(), Screen::Congrat);
    assert_eq!(Screen::from_str("/(auth)/signup").unwrap(), Screen::Signup);
    assert_eq!(Screen::from_str("lms").unwrap(), Screen::Learn);
    assert_eq!(Screen::from_str("/").unwrap(), Screen::Onboarding);
    assert!(Screen::from_str("/settings").is_err());

    for screen in ALL_SCREENS {
        assert_eq!(Screen::from_str(&screen.to_string()).unwrap(), screen);
    }
    assert_eq!(Screen::NewRecording.tab_title(), Some("Record"));
    assert_eq!(Screen::Login.tab_title(), None);
}
