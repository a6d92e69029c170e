//! Chat agent — intent resolution and response composition.
//!
//! `resolve` runs a priority-ordered classifier over the normalized message:
//! document trigger scan, scheduler scan, knowledge-base search, greeting
//! check, then a history-informed fallback. Each call is stateless given the
//! interaction log. `welcome` produces the proactive first message for a
//! session and never surfaces a failure to the boundary.

use tracing::{info, warn};

use crate::core::error::AppError;
use crate::subsystems::documents::RateSheetGenerator;
use crate::subsystems::knowledge::KnowledgeBase;
use crate::subsystems::memory::{Interaction, InteractionLog};

/// Substrings that force document generation, highest priority.
const DOCUMENT_TRIGGERS: &[&str] = &["pdf", "report", "download", "sheet"];

/// Substrings that route to the call scheduler.
const SCHEDULER_TRIGGERS: &[&str] = &["book", "call", "schedule"];

/// Greeting vocabulary, checked only after triggers and knowledge miss.
const GREETINGS: &[&str] = &["hi", "hello", "hey", "start", "greetings"];

/// How many recent interactions the fallback inspects.
const HISTORY_WINDOW: usize = 3;

/// The outcome of one resolved message.
///
/// Transient — the boundary layer serializes it; the fields also feed the
/// persisted interaction row.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    pub response: String,
    pub recommendations: Vec<String>,
    pub intent: String,
    /// Bare filename of a generated rate sheet, present only for
    /// `download_pdf`.
    pub file_download: Option<String>,
}

impl ResolutionResult {
    fn new(
        response: &str,
        recommendations: &[&str],
        intent: &str,
        file_download: Option<String>,
    ) -> Self {
        Self {
            response: response.to_string(),
            recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
            intent: intent.to_string(),
            file_download,
        }
    }
}

/// The assistant's decision engine. Owns the knowledge base, the interaction
/// log, and the rate-sheet generator.
pub struct ChatService {
    kb: KnowledgeBase,
    log: InteractionLog,
    documents: RateSheetGenerator,
}

impl ChatService {
    pub fn new(kb: KnowledgeBase, log: InteractionLog, documents: RateSheetGenerator) -> Self {
        Self { kb, log, documents }
    }

    /// Resolve one user message.
    ///
    /// Never fails: any internal error is replaced by the recovery payload
    /// with intent `error_recovery`.
    pub fn resolve(&self, user_message: &str, session_id: &str) -> ResolutionResult {
        match self.resolve_inner(user_message, session_id) {
            Ok(result) => result,
            Err(e) => {
                warn!(%session_id, "resolution failed, serving recovery response: {e}");
                ResolutionResult::new(
                    "I'm having a slight technical moment, but my team is online! Can I have \
                     a human Loan Officer reach out to you?",
                    &["Contact Support", "Call 1-800-HRY"],
                    "error_recovery",
                    None,
                )
            }
        }
    }

    fn resolve_inner(
        &self,
        user_message: &str,
        session_id: &str,
    ) -> Result<ResolutionResult, AppError> {
        let msg = user_message.trim().to_lowercase();

        // Trigger scans run before everything else: a message containing both
        // a greeting and a PDF word resolves to the PDF intent.
        let result = if contains_any(&msg, DOCUMENT_TRIGGERS) {
            let filename = self.documents.generate(session_id)?;
            info!(%session_id, %filename, "rate sheet generated");
            ResolutionResult::new(
                "I've generated your custom Rate Sheet PDF. You can download it below.",
                &["Speak to an LO", "Calculator"],
                "download_pdf",
                Some(filename),
            )
        } else if contains_any(&msg, SCHEDULER_TRIGGERS) {
            ResolutionResult::new(
                "I can definitely help with that. Please select a time slot from the calendar \
                 below to speak with a Senior Loan Officer.",
                &["Morning", "Afternoon"],
                "scheduler",
                None,
            )
        } else if let Some(hit) = self.kb.search(&msg) {
            ResolutionResult {
                response: hit.content,
                recommendations: hit.recommendations,
                intent: hit.intent,
                file_download: None,
            }
        } else if contains_any(&msg, GREETINGS) {
            ResolutionResult::new(
                "Hello! I'm here to simplify your mortgage. Would you like to see today's rates?",
                &["View Rates", "Monthly Calc"],
                "greeting",
                None,
            )
        } else {
            self.history_fallback(session_id)
        };

        // A lost log row is better than a failed response.
        match self.log.append(session_id, user_message, &result.response, &result.intent) {
            Ok(id) => info!(%session_id, intent = %result.intent, interaction_id = id, "interaction logged"),
            Err(e) => warn!(%session_id, "interaction append failed: {e}"),
        }

        Ok(result)
    }

    /// Fallback when nothing matched: nudge toward a PDF if the user was just
    /// asking about rates, otherwise list capabilities.
    fn history_fallback(&self, session_id: &str) -> ResolutionResult {
        let history = self
            .log
            .recent_by_session(session_id, HISTORY_WINDOW)
            .unwrap_or_else(|e| {
                warn!(%session_id, "history read failed, using generic fallback: {e}");
                Vec::new()
            });

        let was_asking_about_rates = history
            .first()
            .map(|i| i.user_message.to_lowercase().contains("rate"))
            .unwrap_or(false);

        if was_asking_about_rates {
            ResolutionResult::new(
                "I see you were asking about rates earlier. Would you like a PDF summary instead?",
                &["Yes, PDF Report", "No, thanks"],
                "fallback",
                None,
            )
        } else {
            ResolutionResult::new(
                "I can help with Rates, PDF Reports, or Booking calls. Try asking for a \
                 'Rate Sheet PDF'.",
                &["Get PDF Report", "Book Appointment"],
                "fallback",
                None,
            )
        }
    }

    /// Proactive first message for a session.
    ///
    /// Never surfaces a failure — if the log cannot be read, the default
    /// welcome payload is returned without logging.
    pub fn welcome(&self, session_id: &str) -> ResolutionResult {
        let default_welcome = ResolutionResult::new(
            "Hi! I'm Sarah, your digital mortgage assistant. I can help you track live rates, \
             calculate payments, or get you pre-approved in minutes.",
            &["Current Rates", "Payment Calculator", "Start Pre-Approval"],
            "proactive_welcome",
            None,
        );

        match self.log.has_session(session_id) {
            Ok(true) => {
                let result = ResolutionResult::new(
                    "Welcome back! Ready to continue your mortgage journey or need a fresh \
                     rate update?",
                    &["Update Rate Sheet", "Speak to Sarah", "Check Status"],
                    "returning_user",
                    None,
                );
                self.log_welcome(session_id, "[User Returned to Site]", &result);
                result
            }
            Ok(false) => {
                self.log_welcome(session_id, "[Started New Session]", &default_welcome);
                default_welcome
            }
            Err(e) => {
                warn!(%session_id, "welcome lookup failed, serving default: {e}");
                default_welcome
            }
        }
    }

    fn log_welcome(&self, session_id: &str, marker: &str, result: &ResolutionResult) {
        match self.log.append(session_id, marker, &result.response, &result.intent) {
            Ok(id) => info!(%session_id, intent = %result.intent, interaction_id = id, "welcome logged"),
            Err(e) => warn!(%session_id, "welcome append failed: {e}"),
        }
    }

    /// Recent interactions across all sessions for the admin dashboard.
    /// A failed read degrades to an empty list.
    pub fn analytics(&self, limit: usize) -> Vec<Interaction> {
        self.log.recent_global(limit).unwrap_or_else(|e| {
            warn!("analytics read failed: {e}");
            Vec::new()
        })
    }
}

fn contains_any(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| message.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::documents::RateSheetGenerator;
    use crate::subsystems::knowledge::KnowledgeBase;
    use crate::subsystems::memory::InteractionLog;
    use tempfile::TempDir;

    fn service() -> (TempDir, ChatService) {
        let tmp = TempDir::new().unwrap();
        let log = InteractionLog::open(tmp.path().join("chat.db")).unwrap();
        let documents = RateSheetGenerator::new(tmp.path().join("downloads"));
        documents.ensure_dir().unwrap();
        let service = ChatService::new(KnowledgeBase::default(), log, documents);
        (tmp, service)
    }

    #[test]
    fn document_trigger_generates_a_file() {
        let (_tmp, service) = service();

        let result = service.resolve("please send me the rate sheet", "sess-1");
        assert_eq!(result.intent, "download_pdf");
        let filename = result.file_download.expect("filename expected");
        assert!(filename.ends_with(".pdf"));
    }

    #[test]
    fn trigger_beats_knowledge_keywords() {
        let (_tmp, service) = service();

        let result = service.resolve("can I get a pdf about fha vs conventional", "sess-1");
        assert_eq!(result.intent, "download_pdf");
        assert!(result.file_download.is_some());
    }

    #[test]
    fn trigger_beats_greeting() {
        let (_tmp, service) = service();

        let result = service.resolve("hello, I want a pdf", "sess-1");
        assert_eq!(result.intent, "download_pdf");
    }

    #[test]
    fn scheduler_trigger_routes_to_scheduler() {
        let (_tmp, service) = service();

        let result = service.resolve("I want to book a time", "sess-1");
        assert_eq!(result.intent, "scheduler");
        assert_eq!(result.recommendations, vec!["Morning", "Afternoon"]);
        assert!(result.file_download.is_none());
    }

    #[test]
    fn knowledge_hit_is_used_verbatim() {
        let (_tmp, service) = service();

        let result = service.resolve("fha versus conventional?", "sess-1");
        assert_eq!(result.intent, "loan_comparison");
        assert!(result.response.contains("government-backed"));
        assert_eq!(result.recommendations, vec!["Compare Rates", "FHA Requirements"]);
    }

    #[test]
    fn greeting_when_knowledge_misses() {
        let (_tmp, service) = service();

        let result = service.resolve("hey there", "sess-1");
        assert_eq!(result.intent, "greeting");
    }

    #[test]
    fn generic_fallback_without_history() {
        let (_tmp, service) = service();

        let result = service.resolve("xyzzy plugh", "sess-1");
        assert_eq!(result.intent, "fallback");
        assert!(result.response.contains("Rate Sheet PDF"));
    }

    #[test]
    fn rate_aware_fallback_after_rate_question() {
        let (_tmp, service) = service();

        // First message mentions rates but matches nothing.
        let first = service.resolve("what are your current mortgage rates", "sess-1");
        assert_eq!(first.intent, "fallback");

        // Second unmatched message sees the rate question in history.
        let second = service.resolve("hmm okay", "sess-1");
        assert_eq!(second.intent, "fallback");
        assert!(second.response.contains("asking about rates earlier"));
    }

    #[test]
    fn resolve_logs_the_interaction() {
        let (_tmp, service) = service();

        service.resolve("hello", "sess-1");
        let rows = service.analytics(10);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_message, "hello");
        assert_eq!(rows[0].intent, "greeting");
    }

    #[test]
    fn document_failure_serves_recovery_payload() {
        let tmp = TempDir::new().unwrap();
        let log = InteractionLog::open(tmp.path().join("chat.db")).unwrap();
        // Point the generator at a directory that does not exist.
        let documents = RateSheetGenerator::new("/nonexistent-dir/downloads");
        let service = ChatService::new(KnowledgeBase::default(), log, documents);

        let result = service.resolve("pdf please", "sess-1");
        assert_eq!(result.intent, "error_recovery");
        assert!(result.file_download.is_none());
        assert!(result.recommendations.contains(&"Contact Support".to_string()));
    }

    #[test]
    fn welcome_distinguishes_new_and_returning_sessions() {
        let (_tmp, service) = service();

        let first = service.welcome("sess-1");
        assert_eq!(first.intent, "proactive_welcome");

        let second = service.welcome("sess-1");
        assert_eq!(second.intent, "returning_user");

        // A different session starts fresh.
        let other = service.welcome("sess-2");
        assert_eq!(other.intent, "proactive_welcome");
    }

    #[test]
    fn welcome_logs_synthetic_markers() {
        let (_tmp, service) = service();

        service.welcome("sess-1");
        service.welcome("sess-1");

        let rows = service.analytics(10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_message, "[User Returned to Site]");
        assert_eq!(rows[1].user_message, "[Started New Session]");
    }

    #[test]
    fn analytics_respects_limit_newest_first() {
        let (_tmp, service) = service();

        for i in 0..5 {
            service.resolve(&format!("unmatched message {i}"), "sess-1");
        }

        let rows = service.analytics(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_message, "unmatched message 4");
        assert_eq!(rows[1].user_message, "unmatched message 3");
    }
}
