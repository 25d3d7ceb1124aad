use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

/// Kind of conversation being recorded; each has a coaching framework.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub enum ConversationType {
    MorningHuddle,
    InsuranceDiscussion,
    PerformanceReview,
    JobInterview,
}

pub const ALL_CONVERSATION_TYPES: [ConversationType; 4] = [
    ConversationType::MorningHuddle,
    ConversationType::InsuranceDiscussion,
    ConversationType::PerformanceReview,
    ConversationType::JobInterview,
];

impl ConversationType {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationType::MorningHuddle => "Morning Huddle",
            ConversationType::InsuranceDiscussion => "Insurance Discussion",
            ConversationType::PerformanceReview => "Performance Review",
            ConversationType::JobInterview => "Job Interview",
        }
    }
}

impl FromStr for ConversationType {
    type Err = anyhow::Error;

    /// Accepts the display label ("Morning Huddle") or a kebab/snake variant ("morning-huddle")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        ALL_CONVERSATION_TYPES
            .iter()
            .find(|t| t.label().to_ascii_lowercase() == wanted)
            .copied()
            .ok_or(anyhow!("unknown conversation type: {}", s))
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a finished recording can be found, and what it is about.
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct AudioSource {
    pub uri: String,
    pub conversation_type: ConversationType,
}

/// State behind the record screen: a start/stop toggle and a seconds counter.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RecordingSession {
    recording: bool,
    elapsed_secs: u64,
}

impl RecordingSession {
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Starts or stops; returns whether it is now recording
    pub fn toggle(&mut self) -> bool {
        self.recording = !self.recording;
        self.recording
    }

    /// Called once per second by the UI timer; only counts while recording.
    pub fn tick(&mut self) {
        if self.recording {
            self.elapsed_secs += 1;
        }
    }

    pub fn clock(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    pub fn status_label(&self) -> &'static str {
        if self.recording {
            "Recording..."
        } else {
            "Ready to Record"
        }
    }

    /// Stops recording and hands back the finished audio for processing.
    pub fn finish(&mut self, uri: &str, conversation_type: ConversationType) -> AudioSource {
        self.recording = false;
        AudioSource {
            uri: uri.to_string(),
            conversation_type,
        }
    }
}

/// "MM:SS", as on the record screen; minutes keep growing past 99
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// "M:SS", as on transcript headers
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[test]
fn test_recording_session() {
    let mut session = RecordingSession::default();
    assert_eq!(session.status_label(), "Ready to Record");
    session.tick();
    assert_eq!(session.elapsed_secs(), 0);

    assert!(session.toggle());
    assert_eq!(session.status_label(), "Recording...");
    for _ in 0..65 {
        session.tick();
    }
    assert_eq!(session.clock(), "01:05");

    assert!(!session.toggle());
    session.tick();
    assert_eq!(session.elapsed_secs(), 65);

    session.toggle();
    let audio = session.finish("recording://test", ConversationType::JobInterview);
    assert!(!session.is_recording());
    assert_eq!(audio.conversation_type, ConversationType::JobInterview);
}

#[test]
fn test_time_formats() {
    assert_eq!(format_clock(0), "00:00");
    assert_eq!(format_clock(525), "08:45");
    assert_eq!(format_clock(6000), "100:00");
    assert_eq!(format_duration(180), "3:00");
    assert_eq!(format_duration(59), "0:59");
}

#[test]
fn test_conversation_type_parsing() {
    assert_eq!(
        ConversationType::from_str("Morning Huddle").unwrap(),
        ConversationType::MorningHuddle
    );
    assert_eq!(
        ConversationType::from_str("insurance-discussion").unwrap(),
        ConversationType::InsuranceDiscussion
    );
    assert_eq!(
        ConversationType::from_str("job_interview").unwrap(),
        ConversationType::JobInterview
    );
    assert!(ConversationType::from_str("All").is_err());
}
