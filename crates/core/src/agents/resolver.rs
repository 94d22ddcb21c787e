//! Resolution agent.
//!
//! Decides whether a ticket can be auto-resolved. Routine tickets resolve
//! from a local table of canned steps and never touch the knowledge lookup.
//! Other tickets may consult the lookup under a hard time bound; every lookup
//! failure degrades to the no-knowledge path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::knowledge::{KnowledgeArticle, KnowledgeLookup};
use crate::metrics;

use super::risk::LOW_CONFIDENCE_THRESHOLD;
use super::types::{
    ClassificationResult, KnowledgeLookupOutcome, ResolutionReason, ResolutionResult, TicketText,
};

/// Upper bound on a knowledge lookup, in milliseconds.
pub const MAX_LOOKUP_TIMEOUT_MS: u64 = 3000;

/// Classification confidence a routine ticket needs for local resolution.
pub const ROUTINE_RESOLVE_THRESHOLD: f64 = 0.75;

/// Confidence of the generic routine resolution.
pub const GENERIC_FALLBACK_CONFIDENCE: f64 = 0.8;
/// Confidence of a resolution taken from a knowledge article.
pub const KNOWLEDGE_CONFIDENCE: f64 = 0.85;
/// Confidence when the classification is too uncertain to resolve.
pub const LOW_CONFIDENCE_RESOLUTION: f64 = 0.4;
/// Confidence of the default unresolved outcome.
pub const UNRESOLVED_CONFIDENCE: f64 = 0.5;

const PASSWORD_STEPS: &str = "1. Click \"Forgot Password\" on the login page\n2. Enter your email address\n3. Check your email for reset link\n4. Click the link and create a new password";
const LOGIN_STEPS: &str = "1. Clear browser cache and cookies\n2. Try using a different browser\n3. Ensure caps lock is off\n4. If still unable to login, use \"Forgot Password\" to reset";
const PROFILE_STEPS: &str = "1. Go to Settings > Profile\n2. Click \"Edit Profile\"\n3. Make your changes\n4. Click \"Save Changes\"";
const EMAIL_STEPS: &str = "1. Go to Settings > Account\n2. Click \"Change Email\"\n3. Enter new email and verify\n4. Confirm the change";

const GENERIC_ROUTINE_STEPS: &str = "This appears to be a routine account issue. Please check our help documentation or contact support if you need further assistance.";

/// A canned resolution for a known routine phrase.
#[derive(Debug)]
pub struct FallbackResolution {
    pub phrase: &'static str,
    pub steps: &'static str,
    pub confidence: f64,
}

/// Routine phrases in match order.
pub const FALLBACK_RESOLUTIONS: &[FallbackResolution] = &[
    FallbackResolution {
        phrase: "forgot password",
        steps: PASSWORD_STEPS,
        confidence: 0.9,
    },
    FallbackResolution {
        phrase: "reset password",
        steps: PASSWORD_STEPS,
        confidence: 0.9,
    },
    FallbackResolution {
        phrase: "password reset",
        steps: PASSWORD_STEPS,
        confidence: 0.9,
    },
    FallbackResolution {
        phrase: "login help",
        steps: LOGIN_STEPS,
        confidence: 0.85,
    },
    FallbackResolution {
        phrase: "can't login",
        steps: LOGIN_STEPS,
        confidence: 0.85,
    },
    FallbackResolution {
        phrase: "unable to login",
        steps: LOGIN_STEPS,
        confidence: 0.85,
    },
    FallbackResolution {
        phrase: "update profile",
        steps: PROFILE_STEPS,
        confidence: 0.8,
    },
    FallbackResolution {
        phrase: "change email",
        steps: EMAIL_STEPS,
        confidence: 0.8,
    },
];

/// The resolution agent.
///
/// Holds the optional knowledge lookup and its time bound. Cheap to share
/// behind an `Arc`; it keeps no per-ticket state.
#[derive(Clone)]
pub struct Resolver {
    knowledge: Option<Arc<dyn KnowledgeLookup>>,
    lookup_timeout: Duration,
}

impl Resolver {
    /// Create a resolver. The timeout is clamped to [`MAX_LOOKUP_TIMEOUT_MS`].
    pub fn new(knowledge: Option<Arc<dyn KnowledgeLookup>>, lookup_timeout: Duration) -> Self {
        Self {
            knowledge,
            lookup_timeout: lookup_timeout.min(Duration::from_millis(MAX_LOOKUP_TIMEOUT_MS)),
        }
    }

    /// A resolver with no knowledge lookup.
    pub fn without_knowledge() -> Self {
        Self::new(None, Duration::from_millis(MAX_LOOKUP_TIMEOUT_MS))
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Name of the configured knowledge lookup, if any.
    pub fn knowledge_backend(&self) -> Option<&str> {
        self.knowledge.as_ref().map(|k| k.name())
    }

    /// Decide whether the ticket can be auto-resolved. Never fails.
    pub async fn resolve(
        &self,
        ticket: &TicketText,
        classification: &ClassificationResult,
    ) -> ResolutionResult {
        if classification.is_routine_issue && classification.confidence >= ROUTINE_RESOLVE_THRESHOLD
        {
            return resolve_routine(&ticket.combined_text(), classification.confidence);
        }

        let (article, lookup) = self.lookup(ticket).await;
        if let Some(article) = article {
            let content = if article.content.is_empty() {
                "See article for details."
            } else {
                article.content.as_str()
            };
            return ResolutionResult {
                can_resolve: true,
                confidence: KNOWLEDGE_CONFIDENCE,
                resolution_steps: format!(
                    "Refer to knowledge base article: {}\n\n{}",
                    article.title, content
                ),
                used_fallback: false,
                reasoning: format!("Found relevant knowledge base article: \"{}\".", article.title),
                reason_code: ResolutionReason::KnowledgeArticle,
                knowledge_lookup: lookup,
            };
        }

        if !classification.is_routine_issue && classification.confidence < LOW_CONFIDENCE_THRESHOLD {
            return ResolutionResult {
                can_resolve: false,
                confidence: LOW_CONFIDENCE_RESOLUTION,
                resolution_steps: String::new(),
                used_fallback: false,
                reasoning: format!(
                    "Non-routine issue with low classification confidence ({}). Cannot safely auto-resolve without more information.",
                    classification.confidence
                ),
                reason_code: ResolutionReason::LowConfidence,
                knowledge_lookup: lookup,
            };
        }

        ResolutionResult {
            can_resolve: false,
            confidence: UNRESOLVED_CONFIDENCE,
            resolution_steps: String::new(),
            used_fallback: false,
            reasoning: "Issue does not match known routine patterns and no knowledge base article found. Requires human review.".to_string(),
            reason_code: ResolutionReason::NoMatch,
            knowledge_lookup: lookup,
        }
    }

    /// Query the knowledge lookup under the time bound. Returns the top article, if any.
    async fn lookup(
        &self,
        ticket: &TicketText,
    ) -> (Option<KnowledgeArticle>, KnowledgeLookupOutcome) {
        let Some(knowledge) = &self.knowledge else {
            return (None, KnowledgeLookupOutcome::NotConfigured);
        };

        let backend = knowledge.name().to_string();
        let query = ticket.raw_text();
        let start = Instant::now();

        let result = tokio::time::timeout(self.lookup_timeout, knowledge.search(&query)).await;

        metrics::KNOWLEDGE_LOOKUP_DURATION
            .with_label_values(&[&backend])
            .observe(start.elapsed().as_secs_f64());

        let (article, outcome) = match result {
            Ok(Ok(articles)) => match articles.into_iter().next() {
                Some(article) => (Some(article), KnowledgeLookupOutcome::Found),
                None => {
                    debug!(backend = %backend, "Knowledge lookup returned no articles");
                    (None, KnowledgeLookupOutcome::NoResults)
                }
            },
            Ok(Err(e)) => {
                warn!(backend = %backend, error = %e, "Knowledge lookup unavailable, using fallback logic");
                (None, KnowledgeLookupOutcome::Unavailable)
            }
            Err(_) => {
                warn!(
                    backend = %backend,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Knowledge lookup timed out, using fallback logic"
                );
                (None, KnowledgeLookupOutcome::TimedOut)
            }
        };

        metrics::KNOWLEDGE_LOOKUPS
            .with_label_values(&[&backend, outcome.as_str()])
            .inc();

        (article, outcome)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("knowledge", &self.knowledge.as_ref().map(|k| k.name().to_string()))
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

fn resolve_routine(text: &str, classification_confidence: f64) -> ResolutionResult {
    if let Some(fallback) = FALLBACK_RESOLUTIONS.iter().find(|f| text.contains(f.phrase)) {
        return ResolutionResult {
            can_resolve: true,
            confidence: fallback.confidence,
            resolution_steps: fallback.steps.to_string(),
            used_fallback: true,
            reasoning: format!(
                "Routine issue detected with high confidence ({}). Using fallback resolution steps for \"{}\". This is a safe, common request that can be auto-resolved.",
                classification_confidence, fallback.phrase
            ),
            reason_code: ResolutionReason::RoutineFallback,
            knowledge_lookup: KnowledgeLookupOutcome::NotAttempted,
        };
    }

    ResolutionResult {
        can_resolve: true,
        confidence: GENERIC_FALLBACK_CONFIDENCE,
        resolution_steps: GENERIC_ROUTINE_STEPS.to_string(),
        used_fallback: true,
        reasoning: format!(
            "Routine issue detected (confidence: {}). Using generic fallback resolution.",
            classification_confidence
        ),
        reason_code: ResolutionReason::RoutineGenericFallback,
        knowledge_lookup: KnowledgeLookupOutcome::NotAttempted,
    }
}
