use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
pub use traynar::*;

use traynar::services::Notifier;
use traynar::theme::{hex_rgb, Palette};

pub mod pretty;

/// Terminal colour for a "#RRGGBB" palette entry
pub fn term_color(hex: &str) -> Option<Color> {
    hex_rgb(hex).map(|(r, g, b)| Color::Rgb(r, g, b))
}

/// Prints alerts to stderr, titled and coloured by whether they report success.
pub struct TerminalAlerter {
    choice: ColorChoice,
    palette: Palette,
}

impl TerminalAlerter {
    pub fn new(choice: ColorChoice, palette: Palette) -> Self {
        TerminalAlerter { choice, palette }
    }

    fn write_alert(&self, alert: &Alert) -> std::io::Result<()> {
        let mut stderr = StandardStream::stderr(self.choice);
        let color = if alert.title == "Success" {
            term_color(self.palette.teal)
        } else {
            Some(Color::Red)
        };
        stderr.set_color(ColorSpec::new().set_fg(color).set_bold(true))?;
        write!(&mut stderr, "{}", alert.title)?;
        stderr.reset()?;
        writeln!(&mut stderr)?;
        for line in alert.message.lines() {
            writeln!(&mut stderr, "  {line}")?;
        }
        Ok(())
    }
}

impl Alerter for TerminalAlerter {
    fn alert(&self, alert: &Alert) {
        if let Err(e) = self.write_alert(alert) {
            log::warn!("could not write alert: {}", e);
        }
    }
}

/// Remembers where the app would navigate next; a terminal has nowhere to go.
#[derive(Default)]
pub struct TerminalNavigator {
    current: Mutex<Option<Screen>>,
}

impl TerminalNavigator {
    pub fn current(&self) -> Option<Screen> {
        self.current.lock().ok().and_then(|c| *c)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, screen: Screen) {
        log::info!("navigate to {}", screen);
        if let Ok(mut current) = self.current.lock() {
            *current = Some(screen);
        }
    }
}

pub struct TerminalNotifier {
    choice: ColorChoice,
}

impl TerminalNotifier {
    pub fn new(choice: ColorChoice) -> Self {
        TerminalNotifier { choice }
    }

    fn write_notification(&self, title: &str, body: &str) -> std::io::Result<()> {
        let mut stderr = StandardStream::stderr(self.choice);
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(&mut stderr, "[notification] {title}")?;
        stderr.reset()?;
        writeln!(&mut stderr, " {body}")?;
        Ok(())
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, body: &str) {
        if let Err(e) = self.write_notification(title, body) {
            log::warn!("could not write notification: {}", e);
        }
    }
}

/// Phone number as typed on the command line: "9876543210", or with a country code prefix
/// separated by a space or dash ("+44 7700900123", "+1-5555550100").
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PhoneArg {
    pub country_code: Option<String>,
    pub number: String,
}

impl FromStr for PhoneArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref PHONE_ARG_RE: Regex =
                Regex::new(r"^(?:(\+[0-9]{1,4})[ -])?([^ ]+)$").unwrap();
        }
        if let Some(captures) = PHONE_ARG_RE.captures(s.trim()) {
            Ok(PhoneArg {
                country_code: captures.get(1).map(|m| m.as_str().to_string()),
                number: captures[2].to_string(),
            })
        } else {
            Err(anyhow!("could not parse as a phone number: {}", s))
        }
    }
}

/// Colour choice for a stream: automatic on a terminal, plain otherwise
pub fn color_choice(is_tty: bool) -> ColorChoice {
    if is_tty {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

#[test]
fn test_term_color() {
    assert_eq!(term_color("#0D9488"), Some(Color::Rgb(13, 148, 136)));
    assert_eq!(term_color("teal"), None);
}

#[test]
fn test_phone_arg() {
    assert_eq!(
        PhoneArg::from_str("9876543210").unwrap(),
        PhoneArg {
            country_code: None,
            number: "9876543210".to_string()
        }
    );
    assert_eq!(
        PhoneArg::from_str(" +44 7700900123").unwrap(),
        PhoneArg {
            country_code: Some("+44".to_string()),
            number: "7700900123".to_string()
        }
    );
    assert_eq!(
        PhoneArg::from_str("+1-5555550100").unwrap().country_code,
        Some("+1".to_string())
    );
    // the number itself is checked by signup validation, not here
    assert_eq!(PhoneArg::from_str("12ab").unwrap().number, "12ab");
    assert!(PhoneArg::from_str("").is_err());
    assert!(PhoneArg::from_str("98765 43210").is_err());
}

#[test]
fn test_terminal_navigator() {
    let nav = TerminalNavigator::default();
    assert_eq!(nav.current(), None);
    nav.navigate(Screen::Home);
    nav.navigate(Screen::Congrat);
    assert_eq!(nav.current(), Some(Screen::Congrat));
}
