//! Fixed content shown by the dashboard, history, learning, notification and profile screens,
//! and the small helpers that decide how it is presented.

use crate::recording::ConversationType;
use anyhow::Result;
use time::{Date, Month};

/// Colour band a 0-100 score falls in.
#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::High,
            60..=79 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ScoreBand::High => "#10B981",
            ScoreBand::Medium => "#F59E0B",
            ScoreBand::Low => "#DC2626",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            ScoreBand::High => "#D1FAE5",
            ScoreBand::Medium => "#FEF3C7",
            ScoreBand::Low => "#FEE2E2",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Completed,
    Processing,
    Failed,
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub conversation_type: ConversationType,
    pub date: Date,
    /// "MM:SS"
    pub duration: String,
    pub audio_uri: String,
    /// Opening lines of the transcript
    pub transcription: String,
    /// Only meaningful once `status` is `Completed`
    pub coaching_score: u8,
    pub status: RecordingStatus,
}

impl HistoryEntry {
    pub fn score_band(&self) -> Option<ScoreBand> {
        match self.status {
            RecordingStatus::Completed => Some(ScoreBand::of(self.coaching_score)),
            _ => None,
        }
    }
}

/// Search box plus type chip of the history screen.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct HistoryFilter {
    pub query: String,
    /// `None` is the "All" chip
    pub conversation_type: Option<ConversationType>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_search = query.is_empty()
            || entry.title.to_lowercase().contains(&query)
            || entry
                .conversation_type
                .label()
                .to_lowercase()
                .contains(&query);
        let matches_type = match self.conversation_type {
            None => true,
            Some(t) => entry.conversation_type == t,
        };
        matches_search && matches_type
    }

    pub fn apply<'a>(&self, entries: &'a [HistoryEntry]) -> Vec<&'a HistoryEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// "Today", "Yesterday", or a short date like "Nov 20, 2024"
pub fn date_label(date: Date, today: Date) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.previous_day() == Some(date) {
        return "Yesterday".to_string();
    }
    format!("{} {}, {}", short_month(date.month()), date.day(), date.year())
}

fn short_month(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

pub fn history_entries() -> Result<Vec<HistoryEntry>> {
    let entry = |id: &str,
                 title: &str,
                 conversation_type: ConversationType,
                 day: u8,
                 duration: &str,
                 transcription: &str,
                 coaching_score: u8,
                 status: RecordingStatus|
     -> Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: id.to_string(),
            title: title.to_string(),
            conversation_type,
            date: Date::from_calendar_date(2024, Month::November, day)?,
            duration: duration.to_string(),
            audio_uri: format!("dummy://audio-{id}"),
            transcription: transcription.to_string(),
            coaching_score,
            status,
        })
    };
    use ConversationType::*;
    use RecordingStatus::*;
    Ok(vec![
        entry(
            "1",
            "Morning Huddle with Team",
            MorningHuddle,
            20,
            "08:45",
            "Good morning everyone! Let's get started with today's huddle. We have 22 patients scheduled today with a production goal of $8,500...",
            73,
            Completed,
        )?,
        entry(
            "2",
            "Insurance Discussion - Patient Miller",
            InsuranceDiscussion,
            19,
            "12:30",
            "Hi Mrs. Miller, I wanted to review your insurance benefits with you. Your plan covers 80% of the procedure...",
            85,
            Completed,
        )?,
        entry(
            "3",
            "Performance Review - Sarah Johnson",
            PerformanceReview,
            18,
            "15:20",
            "Sarah, thank you for taking the time to meet today. I wanted to discuss your performance over the last quarter...",
            92,
            Completed,
        )?,
        entry(
            "4",
            "Job Interview - New Hygienist",
            JobInterview,
            17,
            "18:15",
            "Welcome! Thank you for coming in today. Let me start by telling you a bit about our practice...",
            68,
            Completed,
        )?,
        entry(
            "5",
            "Morning Huddle - Team Alignment",
            MorningHuddle,
            16,
            "07:30",
            "Team, let's review our schedule. We have a busy day ahead with several complex cases...",
            0,
            Processing,
        )?,
    ])
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct LearningFramework {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub conversation_type: ConversationType,
    pub lessons: [&'static str; 3],
    pub duration_minutes: u32,
}

pub fn learning_frameworks() -> Vec<LearningFramework> {
    vec![
        LearningFramework {
            id: "align",
            title: "ALIGN",
            subtitle: "Morning Huddle Framework",
            description: "Start your day with purpose and alignment across the team",
            conversation_type: ConversationType::MorningHuddle,
            lessons: [
                "How to structure efficient morning huddles",
                "Setting clear daily targets and identifying risks",
                "Assigning ownership and closing with next steps",
            ],
            duration_minutes: 8,
        },
        LearningFramework {
            id: "clear",
            title: "CLEAR",
            subtitle: "Insurance Discussion Framework",
            description: "Navigate insurance conversations with confidence and clarity",
            conversation_type: ConversationType::InsuranceDiscussion,
            lessons: [
                "How to explain insurance benefits clearly",
                "Providing accurate estimates with proper disclaimers",
                "Offering payment options to improve case acceptance",
            ],
            duration_minutes: 8,
        },
        LearningFramework {
            id: "hires",
            title: "HIRES",
            subtitle: "Job Interview Framework",
            description: "Build winning teams through structured, effective interviews",
            conversation_type: ConversationType::JobInterview,
            lessons: [
                "Creating a high-trust interview environment",
                "Using STAR questions to assess competency",
                "Evaluating values fit and setting clear next steps",
            ],
            duration_minutes: 8,
        },
        LearningFramework {
            id: "performance",
            title: "PERFORMANCE",
            subtitle: "Performance Review Framework",
            description: "Build winning teams through structured, effective interviews",
            conversation_type: ConversationType::PerformanceReview,
            lessons: [
                "Giving specific recognition tied to results",
                "Setting SMART goals with clear accountability",
                "Linking performance to career advancement",
            ],
            duration_minutes: 8,
        },
    ]
}

/// Looks a framework up by id ("align") or title ("ALIGN")
pub fn find_framework(name: &str) -> Option<LearningFramework> {
    let name = name.trim();
    learning_frameworks()
        .into_iter()
        .find(|f| f.id.eq_ignore_ascii_case(name) || f.title.eq_ignore_ascii_case(name))
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Feedback,
    Evaluation,
    Milestone,
    Report,
}

impl NotificationKind {
    pub fn color(&self) -> &'static str {
        match self {
            NotificationKind::Feedback => "#3B82F6",
            NotificationKind::Evaluation => "#10B981",
            NotificationKind::Milestone => "#8B5CF6",
            NotificationKind::Report => "#F97316",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct NotificationItem {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub description: &'static str,
    pub time: &'static str,
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct NotificationSection {
    pub section: &'static str,
    pub items: Vec<NotificationItem>,
}

pub fn notifications() -> Vec<NotificationSection> {
    vec![
        NotificationSection {
            section: "TODAY",
            items: vec![
                NotificationItem {
                    kind: NotificationKind::Feedback,
                    title: "New Feedback Available",
                    description: "For your conversation with Jane D.",
                    time: "2h ago",
                },
                NotificationItem {
                    kind: NotificationKind::Evaluation,
                    title: "Evaluation Complete",
                    description: "Your latest session score is now available.",
                    time: "5h ago",
                },
            ],
        },
        NotificationSection {
            section: "THIS WEEK",
            items: vec![
                NotificationItem {
                    kind: NotificationKind::Milestone,
                    title: "New Milestone Unlocked!",
                    description: "Improved patient education score by 15%.",
                    time: "2 days ago",
                },
                NotificationItem {
                    kind: NotificationKind::Report,
                    title: "Your Weekly Report is Ready",
                    description: "View your communication trends.",
                    time: "Last week",
                },
            ],
        },
    ]
}

/// One of the "latest evaluations" cards on the dashboard.
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub name: &'static str,
    pub date: &'static str,
    /// Empathy, clarity, tone
    pub scores: [u8; 3],
}

pub const SCORE_LABELS: [&str; 3] = ["Empathy", "Clarity", "Tone"];

impl SessionSummary {
    /// Rounded mean of the three scores
    pub fn average(&self) -> u8 {
        let sum: u32 = self.scores.iter().map(|s| *s as u32).sum();
        ((sum + 1) / 3) as u8
    }
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct Dashboard {
    pub greeting: &'static str,
    pub initials: &'static str,
    pub trend_months: [&'static str; 4],
    /// Weekly overall scores, oldest first
    pub trend: [u8; 7],
    pub sessions: Vec<SessionSummary>,
}

pub fn dashboard() -> Dashboard {
    Dashboard {
        greeting: "Hi, Dr. Evans",
        initials: "DE",
        trend_months: ["Jan", "Feb", "Mar", "Apr"],
        trend: [75, 78, 80, 85, 88, 90, 92],
        sessions: vec![
            SessionSummary {
                name: "J. Doe",
                date: "April 15, 2026",
                scores: [92, 88, 95],
            },
            SessionSummary {
                name: "A. Smith",
                date: "April 12, 2026",
                scores: [85, 91, 89],
            },
        ],
    }
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct Profile {
    pub display_name: &'static str,
    pub practice: &'static str,
    pub initials: &'static str,
    pub plan: &'static str,
    pub notifications_enabled: bool,
    pub account_settings: [&'static str; 3],
    pub subscription: [&'static str; 1],
    pub general: [&'static str; 3],
}

impl Profile {
    /// Flips the notification preference; returns the new value
    pub fn toggle_notifications(&mut self) -> bool {
        self.notifications_enabled = !self.notifications_enabled;
        self.notifications_enabled
    }
}

pub fn profile() -> Profile {
    Profile {
        display_name: "Dr. Evelyn Reed",
        practice: "Bright Smiles Dental Clinic",
        initials: "ER",
        plan: "Pro Plan",
        notifications_enabled: true,
        account_settings: ["Edit Profile", "Change Password", "Notification Preferences"],
        subscription: ["Billing History"],
        general: ["Privacy Policy", "Terms of Service", "Help & Support"],
    }
}

#[test]
fn test_score_band() {
    assert_eq!(ScoreBand::of(100), ScoreBand::High);
    assert_eq!(ScoreBand::of(80), ScoreBand::High);
    assert_eq!(ScoreBand::of(79), ScoreBand::Medium);
    assert_eq!(ScoreBand::of(60), ScoreBand::Medium);
    assert_eq!(ScoreBand::of(59), ScoreBand::Low);
    assert_eq!(ScoreBand::of(0).color(), "#DC2626");
}

#[test]
fn test_history_filter() {
    let entries = history_entries().unwrap();
    assert_eq!(entries.len(), 5);

    let all = HistoryFilter::default();
    assert_eq!(all.apply(&entries).len(), 5);

    let huddles = HistoryFilter {
        query: String::new(),
        conversation_type: Some(ConversationType::MorningHuddle),
    };
    assert_eq!(huddles.apply(&entries).len(), 2);

    let search = HistoryFilter {
        query: "MILLER".to_string(),
        conversation_type: None,
    };
    let found = search.apply(&entries);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "2");

    // query matches conversation type labels too
    let by_type_text = HistoryFilter {
        query: "interview".to_string(),
        conversation_type: None,
    };
    assert_eq!(by_type_text.apply(&entries).len(), 1);

    let none = HistoryFilter {
        query: "miller".to_string(),
        conversation_type: Some(ConversationType::JobInterview),
    };
    assert!(none.apply(&entries).is_empty());

    assert_eq!(entries[4].score_band(), None);
    assert_eq!(entries[0].score_band(), Some(ScoreBand::Medium));
}

#[test]
fn test_date_label() {
    let today = Date::from_calendar_date(2024, Month::November, 20).unwrap();
    let yesterday = Date::from_calendar_date(2024, Month::November, 19).unwrap();
    let older = Date::from_calendar_date(2024, Month::November, 2).unwrap();
    assert_eq!(date_label(today, today), "Today");
    assert_eq!(date_label(yesterday, today), "Yesterday");
    assert_eq!(date_label(older, today), "Nov 2, 2024");
}

#[test]
fn test_catalog_content() {
    let frameworks = learning_frameworks();
    assert_eq!(frameworks.len(), 4);
    assert_eq!(find_framework("clear").unwrap().title, "CLEAR");
    assert_eq!(find_framework("HIRES").unwrap().id, "hires");
    assert!(find_framework("raise").is_none());

    let sections = notifications();
    assert_eq!(sections[0].section, "TODAY");
    assert_eq!(sections.iter().map(|s| s.items.len()).sum::<usize>(), 4);

    let dash = dashboard();
    assert_eq!(dash.sessions[0].average(), 92);
    assert_eq!(dash.sessions[1].average(), 88);

    let mut me = profile();
    assert!(!me.toggle_notifications());
    assert!(me.toggle_notifications());
}
