//! Testing utilities and mock implementations.
//!
//! Mocks for the external collaborators of the triage pipeline, so the
//! agents, the pipeline and the orchestrator can be exercised without a
//! running knowledge service.

mod mock_knowledge;

pub use mock_knowledge::{MockKnowledgeLookup, RecordedLookup};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::agents::TicketText;
    use crate::knowledge::KnowledgeArticle;

    /// A routine password ticket that resolves locally.
    pub fn password_ticket() -> TicketText {
        TicketText::new("Forgot my password", "can't remember password")
    }

    /// A high-risk security ticket.
    pub fn hacked_ticket() -> TicketText {
        TicketText::new("Account hacked", "someone made unauthorized charges")
    }

    /// A ticket that matches no keyword.
    pub fn unclassifiable_ticket() -> TicketText {
        TicketText::new("xyz", "abc")
    }

    /// A technical ticket that can be resolved from a knowledge article.
    pub fn export_bug_ticket() -> TicketText {
        TicketText::new("Export error", "the CSV export is not working")
    }

    /// A knowledge article with tags.
    pub fn article(title: &str, content: &str, tags: &[&str]) -> KnowledgeArticle {
        KnowledgeArticle::new(title, content).with_tags(tags.iter().map(|t| t.to_string()).collect())
    }
}
