use crate::term_color;
use anyhow::Result;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use traynar::catalog::{
    date_label, Dashboard, HistoryEntry, LearningFramework, NotificationSection, Profile,
    RecordingStatus, ScoreBand, SCORE_LABELS,
};
use traynar::forms::FieldErrors;
use traynar::services::{CoachingReport, Transcript};
use traynar::theme::Palette;

/// Renders screens to stdout in the active palette.
pub struct Printer {
    choice: ColorChoice,
    palette: Palette,
}

impl Printer {
    pub fn new(choice: ColorChoice, palette: Palette) -> Self {
        Printer { choice, palette }
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.choice)
    }

    fn heading(&self, out: &mut StandardStream, text: &str) -> Result<()> {
        out.set_color(
            ColorSpec::new()
                .set_fg(term_color(self.palette.accent))
                .set_bold(true),
        )?;
        writeln!(out, "{text}")?;
        out.reset()?;
        Ok(())
    }

    fn muted(&self, out: &mut StandardStream, text: &str) -> Result<()> {
        out.set_color(
            ColorSpec::new()
                .set_fg(term_color(self.palette.muted_text))
                .set_dimmed(true),
        )?;
        write!(out, "{text}")?;
        out.reset()?;
        Ok(())
    }

    fn score(&self, out: &mut StandardStream, score: u8) -> Result<()> {
        out.set_color(
            ColorSpec::new()
                .set_fg(term_color(ScoreBand::of(score).color()))
                .set_bold(true),
        )?;
        write!(out, "{score:>3}%")?;
        out.reset()?;
        Ok(())
    }

    pub fn pp_field_errors(&self, errors: &FieldErrors) -> Result<()> {
        let mut out = StandardStream::stderr(self.choice);
        for (field, msg) in errors.iter() {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(&mut out, "{:<14}", field.label())?;
            out.reset()?;
            writeln!(&mut out, "{msg}")?;
        }
        Ok(())
    }

    pub fn pp_transcript(&self, transcript: &Transcript) -> Result<()> {
        let mut out = self.stdout();
        self.heading(&mut out, transcript.conversation_type.label())?;
        self.muted(&mut out, &format!("duration {}\n\n", transcript.duration_label()))?;
        for seg in transcript.segments.iter() {
            out.set_color(
                ColorSpec::new()
                    .set_fg(term_color(self.palette.teal))
                    .set_bold(true),
            )?;
            writeln!(&mut out, "{}", seg.speaker)?;
            out.reset()?;
            writeln!(&mut out, "  {}\n", seg.text)?;
        }
        Ok(())
    }

    pub fn pp_report(&self, report: &CoachingReport) -> Result<()> {
        let mut out = self.stdout();
        self.heading(&mut out, "AI Coaching")?;
        write!(&mut out, "Overall ")?;
        self.score(&mut out, report.overall_score)?;
        writeln!(&mut out, " of {}\n", report.max_score)?;
        writeln!(&mut out, "{}\n", report.summary)?;
        self.heading(&mut out, "RAISE Analysis")?;
        for item in report.items.iter() {
            out.set_color(
                ColorSpec::new()
                    .set_fg(term_color(item.category.color()))
                    .set_bold(true),
            )?;
            write!(&mut out, "{:<10}", item.category.label())?;
            out.reset()?;
            self.score(&mut out, item.score)?;
            writeln!(&mut out)?;
            writeln!(&mut out, "  {:<70.70}", item.feedback)?;
        }
        Ok(())
    }

    pub fn pp_history(&self, entries: &[&HistoryEntry], today: time::Date) -> Result<()> {
        let mut out = self.stdout();
        if entries.is_empty() {
            self.muted(&mut out, "No recordings match.\n")?;
            return Ok(());
        }
        for entry in entries {
            out.set_color(ColorSpec::new().set_bold(true))?;
            write!(&mut out, "{:<42.42}", entry.title)?;
            out.reset()?;
            match entry.status {
                RecordingStatus::Completed => self.score(&mut out, entry.coaching_score)?,
                RecordingStatus::Processing => {
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
                    write!(&mut out, "processing")?;
                    out.reset()?;
                }
                RecordingStatus::Failed => {
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                    write!(&mut out, "failed")?;
                    out.reset()?;
                }
            }
            writeln!(&mut out)?;
            self.muted(
                &mut out,
                &format!(
                    "  {} | {} | {}\n",
                    entry.conversation_type,
                    date_label(entry.date, today),
                    entry.duration
                ),
            )?;
        }
        Ok(())
    }

    pub fn pp_framework(&self, framework: &LearningFramework, expanded: bool) -> Result<()> {
        let mut out = self.stdout();
        out.set_color(
            ColorSpec::new()
                .set_fg(term_color(self.palette.teal))
                .set_bold(true),
        )?;
        write!(&mut out, "{:<12}", framework.title)?;
        out.reset()?;
        writeln!(&mut out, "{}", framework.subtitle)?;
        self.muted(&mut out, &format!("  {}\n", framework.description))?;
        if expanded {
            for (i, lesson) in framework.lessons.iter().enumerate() {
                writeln!(&mut out, "  {}. {}", i + 1, lesson)?;
            }
            self.muted(
                &mut out,
                &format!("  {} minutes\n", framework.duration_minutes),
            )?;
        }
        Ok(())
    }

    pub fn pp_notifications(&self, sections: &[NotificationSection]) -> Result<()> {
        let mut out = self.stdout();
        for section in sections {
            self.muted(&mut out, &format!("{}\n", section.section))?;
            for item in section.items.iter() {
                out.set_color(
                    ColorSpec::new()
                        .set_fg(term_color(item.kind.color()))
                        .set_bold(true),
                )?;
                write!(&mut out, "{:<30}", item.title)?;
                out.reset()?;
                self.muted(&mut out, &format!("{}\n", item.time))?;
                writeln!(&mut out, "  {}", item.description)?;
            }
            writeln!(&mut out)?;
        }
        Ok(())
    }

    pub fn pp_dashboard(&self, dash: &Dashboard) -> Result<()> {
        let mut out = self.stdout();
        self.heading(&mut out, dash.greeting)?;
        self.muted(&mut out, "Let's improve your skills\n\n")?;
        self.heading(&mut out, "Performance Trends")?;
        let trend: Vec<String> = dash.trend.iter().map(|s| s.to_string()).collect();
        writeln!(
            &mut out,
            "  {} ({})\n",
            trend.join(" -> "),
            dash.trend_months.join(", ")
        )?;
        self.heading(&mut out, "Your Latest Evaluations")?;
        for session in dash.sessions.iter() {
            write!(&mut out, "Session with {:<10}", session.name)?;
            self.muted(&mut out, &format!("{:<16}", session.date))?;
            self.score(&mut out, session.average())?;
            writeln!(&mut out)?;
            for (label, score) in SCORE_LABELS.iter().zip(session.scores.iter()) {
                write!(&mut out, "  {label:<8}")?;
                self.score(&mut out, *score)?;
                writeln!(&mut out)?;
            }
        }
        Ok(())
    }

    pub fn pp_profile(&self, profile: &Profile) -> Result<()> {
        let mut out = self.stdout();
        self.heading(&mut out, &format!("{} ({})", profile.display_name, profile.initials))?;
        self.muted(&mut out, &format!("{}\n\n", profile.practice))?;

        self.muted(&mut out, "ACCOUNT SETTINGS\n")?;
        for label in profile.account_settings.iter() {
            if *label == "Notification Preferences" {
                let state = if profile.notifications_enabled {
                    "on"
                } else {
                    "off"
                };
                writeln!(&mut out, "  {label} [{state}]")?;
            } else {
                writeln!(&mut out, "  {label}")?;
            }
        }
        self.muted(&mut out, "SUBSCRIPTION\n")?;
        write!(&mut out, "  Current Plan: ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        writeln!(&mut out, "{}", profile.plan)?;
        out.reset()?;
        for label in profile.subscription.iter() {
            writeln!(&mut out, "  {label}")?;
        }
        self.muted(&mut out, "GENERAL\n")?;
        for label in profile.general.iter() {
            writeln!(&mut out, "  {label}")?;
        }
        Ok(())
    }
}
