//! Processing services behind the recording, transcript, coaching and history screens.
//!
//! Screens only see the traits. The `Mock*` types answer with fixed content after a configured
//! delay, and a real backend client can replace them without touching callers.

use crate::catalog::{self, HistoryEntry, ScoreBand};
use crate::config::MockDelays;
use crate::recording::{format_duration, AudioSource, ConversationType};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct Segment {
    pub speaker: String,
    pub text: String,
    /// Seconds from the start of the recording, when the service reports it
    pub timestamp: Option<u32>,
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct Transcript {
    pub conversation_type: ConversationType,
    pub segments: Vec<Segment>,
    pub duration_secs: u64,
}

impl Transcript {
    pub fn duration_label(&self) -> String {
        format_duration(self.duration_secs)
    }

    /// Distinct speakers, in order of first appearance
    pub fn speakers(&self) -> Vec<&str> {
        let mut speakers: Vec<&str> = Vec::new();
        for seg in self.segments.iter() {
            if !speakers.contains(&seg.speaker.as_str()) {
                speakers.push(&seg.speaker);
            }
        }
        speakers
    }
}

/// The five coaching dimensions, in report order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize)]
pub enum RaiseCategory {
    Recognize,
    Assess,
    Improve,
    Suggest,
    Encourage,
}

impl RaiseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RaiseCategory::Recognize => "Recognize",
            RaiseCategory::Assess => "Assess",
            RaiseCategory::Improve => "Improve",
            RaiseCategory::Suggest => "Suggest",
            RaiseCategory::Encourage => "Encourage",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RaiseCategory::Recognize => "#10B981",
            RaiseCategory::Assess => "#3B82F6",
            RaiseCategory::Improve => "#F59E0B",
            RaiseCategory::Suggest => "#8B5CF6",
            RaiseCategory::Encourage => "#06B6D4",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct FeedbackItem {
    pub category: RaiseCategory,
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct CoachingReport {
    pub overall_score: u8,
    pub max_score: u8,
    pub summary: String,
    pub items: Vec<FeedbackItem>,
}

impl CoachingReport {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.overall_score)
    }

    /// Share of the score ring that is filled, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        f64::from(self.overall_score.min(self.max_score)) / f64::from(self.max_score)
    }

    /// The lowest scoring category, which the coaching text focuses on
    pub fn weakest(&self) -> Option<&FeedbackItem> {
        self.items.iter().min_by_key(|i| i.score)
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &AudioSource) -> Result<Transcript>;
}

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, transcript: &Transcript) -> Result<CoachingReport>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn recordings(&self) -> Result<Vec<HistoryEntry>>;
}

/// Local "your results are ready" notifications.
pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

async fn mock_wait(what: &str, delay: Duration) {
    if !delay.is_zero() {
        debug!("mock {what}: waiting {delay:?}");
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone)]
pub struct MockTranscriber {
    delay: Duration,
}

impl MockTranscriber {
    pub fn new(delays: &MockDelays) -> Self {
        MockTranscriber {
            delay: delays.transcription,
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio: &AudioSource) -> Result<Transcript> {
        if audio.uri.trim().is_empty() {
            return Err(anyhow!("no audio to transcribe"));
        }
        mock_wait("transcription", self.delay).await;
        let segment = |speaker: &str, text: &str| Segment {
            speaker: speaker.to_string(),
            text: text.to_string(),
            timestamp: None,
        };
        Ok(Transcript {
            conversation_type: audio.conversation_type,
            segments: vec![
                segment("Speaker 1", "Good morning everyone! Let's get started with today's huddle. We have about 15 minutes to cover everything."),
                segment("Speaker 1", "We have 22 patients scheduled today with a production goal of $8,500. We'll see a peak between 10am and noon, so let's be ready for that rush."),
                segment("Speaker 1", "I want to call out a few risks - we have three unconfirmed patients: two at 9am and one at 2pm."),
                segment("Speaker 2", "Got it. I'll follow up with those patients right away to confirm their appointments."),
                segment("Speaker 1", "Perfect. Also, reminder that Dr. Smith will be out next Friday, so we need to reschedule those appointments."),
            ],
            duration_secs: 180,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockEvaluator {
    delay: Duration,
}

impl MockEvaluator {
    pub fn new(delays: &MockDelays) -> Self {
        MockEvaluator {
            delay: delays.evaluation,
        }
    }
}

#[async_trait]
impl Evaluator for MockEvaluator {
    async fn evaluate(&self, transcript: &Transcript) -> Result<CoachingReport> {
        if transcript.segments.is_empty() {
            return Err(anyhow!("transcript has no segments to evaluate"));
        }
        mock_wait("evaluation", self.delay).await;
        let item = |category: RaiseCategory, score: u8, feedback: &str| FeedbackItem {
            category,
            score,
            feedback: feedback.to_string(),
        };
        Ok(CoachingReport {
            overall_score: 88,
            max_score: 100,
            summary: "You showed strong empathy and excellent clarity when addressing the patient's concerns. Consider a softer tone when discussing costs to enhance patient comfort before discussing payment options.".to_string(),
            items: vec![
                item(RaiseCategory::Recognize, 92, "You did a great job acknowledging the patient's concerns and validating their emotions. Good job!"),
                item(RaiseCategory::Assess, 95, "Successfully assessed the patient's primary needs and addressed them accordingly."),
                item(RaiseCategory::Improve, 78, "Your tone could be softened when discussing financial aspects to avoid causing patient stress."),
                item(RaiseCategory::Suggest, 85, "Try offering more upward payment options to make the treatment more affordable for them."),
                item(RaiseCategory::Encourage, 90, "Ending the conversation with 'We're here to support you through the process' can build trust."),
            ],
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockHistory {
    delay: Duration,
}

impl MockHistory {
    pub fn new(delays: &MockDelays) -> Self {
        MockHistory {
            delay: delays.history,
        }
    }
}

#[async_trait]
impl HistoryStore for MockHistory {
    async fn recordings(&self) -> Result<Vec<HistoryEntry>> {
        mock_wait("history", self.delay).await;
        catalog::history_entries()
    }
}

/// Everything the transcript and coaching screens show for one recording.
#[derive(Debug, PartialEq, Eq, Clone, serde::Serialize)]
pub struct ProcessedConversation {
    pub audio: AudioSource,
    pub transcript: Transcript,
    pub report: CoachingReport,
}

/// Transcribes, tells the user the transcript is ready, then evaluates.
pub async fn process_recording<T, E, N>(
    transcriber: &T,
    evaluator: &E,
    notifier: &N,
    audio: AudioSource,
) -> Result<ProcessedConversation>
where
    T: Transcriber + ?Sized,
    E: Evaluator + ?Sized,
    N: Notifier + ?Sized,
{
    info!(
        "processing {} recording {}",
        audio.conversation_type, audio.uri
    );
    let transcript = transcriber.transcribe(&audio).await?;
    notifier.notify(
        "Transcription Ready!",
        &format!(
            "Your {} conversation has been transcribed and analyzed.",
            audio.conversation_type
        ),
    );
    let report = evaluator.evaluate(&transcript).await?;
    info!(
        "recording {} scored {}/{}",
        audio.uri, report.overall_score, report.max_score
    );
    Ok(ProcessedConversation {
        audio,
        transcript,
        report,
    })
}

#[cfg(test)]
mod test_support {
    use super::Notifier;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, title: &str, body: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }
    }
}

#[tokio::test]
async fn test_process_recording() {
    let delays = MockDelays::uniform(Duration::ZERO);
    let notifier = test_support::RecordingNotifier::default();
    let audio = AudioSource {
        uri: "recording://one".to_string(),
        conversation_type: ConversationType::InsuranceDiscussion,
    };
    let done = process_recording(
        &MockTranscriber::new(&delays),
        &MockEvaluator::new(&delays),
        &notifier,
        audio,
    )
    .await
    .unwrap();

    assert_eq!(done.transcript.segments.len(), 5);
    assert_eq!(done.transcript.duration_label(), "3:00");
    assert_eq!(done.transcript.speakers(), vec!["Speaker 1", "Speaker 2"]);
    assert_eq!(
        done.transcript.conversation_type,
        ConversationType::InsuranceDiscussion
    );
    assert_eq!(done.report.overall_score, 88);
    assert_eq!(done.report.band(), ScoreBand::High);
    assert_eq!(
        done.report.weakest().unwrap().category,
        RaiseCategory::Improve
    );
    let categories: Vec<RaiseCategory> = done.report.items.iter().map(|i| i.category).collect();
    assert_eq!(
        categories,
        vec![
            RaiseCategory::Recognize,
            RaiseCategory::Assess,
            RaiseCategory::Improve,
            RaiseCategory::Suggest,
            RaiseCategory::Encourage
        ]
    );

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Transcription Ready!");
    assert_eq!(
        sent[0].1,
        "Your Insurance Discussion conversation has been transcribed and analyzed."
    );
}

#[tokio::test]
async fn test_mock_services_reject_empty_input() {
    let delays = MockDelays::uniform(Duration::ZERO);
    let notifier = test_support::RecordingNotifier::default();
    let audio = AudioSource {
        uri: " ".to_string(),
        conversation_type: ConversationType::MorningHuddle,
    };
    let res = process_recording(
        &MockTranscriber::new(&delays),
        &MockEvaluator::new(&delays),
        &notifier,
        audio,
    )
    .await;
    assert!(res.is_err());
    // nothing is announced when transcription fails
    assert!(notifier.sent.lock().unwrap().is_empty());

    let empty = Transcript {
        conversation_type: ConversationType::MorningHuddle,
        segments: vec![],
        duration_secs: 0,
    };
    assert!(MockEvaluator::new(&delays).evaluate(&empty).await.is_err());
}

#[tokio::test]
async fn test_mock_history() {
    let history = MockHistory::new(&MockDelays::uniform(Duration::ZERO));
    let entries = history.recordings().await.unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].title, "Morning Huddle with Team");
}

#[test]
fn test_report_progress() {
    let report = CoachingReport {
        overall_score: 88,
        max_score: 100,
        summary: String::new(),
        items: vec![],
    };
    assert!((report.progress() - 0.88).abs() < 1e-9);
    assert!(report.weakest().is_none());
}
