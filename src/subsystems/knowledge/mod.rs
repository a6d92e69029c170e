//! Knowledge base — static topic entries with a ranked keyword search.
//!
//! Entries are fixed at compile time. `search` tokenizes the query and ranks
//! entries by keyword density; a miss is `None`, never an error.

/// One topic the assistant can answer from canned content.
///
/// All fields are `'static` — the knowledge base is compile-time data and is
/// never mutated after construction.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeEntry {
    pub id: &'static str,
    pub keywords: &'static [&'static str],
    pub content: &'static str,
    pub recommendations: &'static [&'static str],
    pub intent: &'static str,
}

/// A successful search: the winning entry's payload plus its score.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeHit {
    pub content: String,
    pub recommendations: Vec<String>,
    pub intent: String,
    pub confidence: f32,
}

/// Scores below this are treated as a miss.
const CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Bonus applied per matched keyword on top of the density score.
const MATCH_BONUS: f32 = 0.75;

const BUILTIN_ENTRIES: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        id: "fha_vs_conv",
        keywords: &["fha", "conventional", "compare", "difference", "versus"],
        content: "FHA loans are government-backed and ideal for credit scores as low as 580 \
                  with 3.5% down. Conventional loans typically require a 620 score and 3% down \
                  for first-time buyers, offering lower insurance costs for those with stronger \
                  credit.",
        recommendations: &["Compare Rates", "FHA Requirements"],
        intent: "loan_comparison",
    },
    KnowledgeEntry {
        id: "down_payment",
        keywords: &["down payment", "minimum", "cash", "3.5%", "3%", "upfront"],
        content: "Gone are the days of needing 20% down! You can secure a home with as little \
                  as 3% on Conventional or 3.5% on FHA. Veterans may even qualify for 0% down \
                  through VA programs.",
        recommendations: &["VA Eligibility", "Down Payment Guide"],
        intent: "financial_requirement",
    },
    KnowledgeEntry {
        id: "closing_costs",
        keywords: &["closing costs", "fees", "how much to close", "out of pocket", "settlement"],
        content: "Typically, closing costs range from 2% to 5% of the home's purchase price. \
                  This covers lender fees, title insurance, and appraisals. I can generate a \
                  sample cost sheet for you if you'd like!",
        recommendations: &["Generate Sample Sheet", "Fee Breakdown"],
        intent: "closing_costs",
    },
];

pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::with_entries(BUILTIN_ENTRIES.to_vec())
    }
}

impl KnowledgeBase {
    /// Build a knowledge base over a custom entry set. Entry order matters:
    /// ties on score keep the earliest entry.
    pub fn with_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Ranked keyword search over the entry set.
    ///
    /// A keyword counts as matched when it appears as a substring of any
    /// query token ("fha" matches "fhas"). Score per entry:
    /// `match_count / total_keywords + match_count * 0.75`; the strictly
    /// highest score wins, and anything under the confidence threshold is a
    /// miss.
    pub fn search(&self, query: &str) -> Option<KnowledgeHit> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return None;
        }

        let mut best: Option<&KnowledgeEntry> = None;
        let mut highest: f32 = 0.0;

        for entry in &self.entries {
            let match_count = entry
                .keywords
                .iter()
                .filter(|keyword| tokens.iter().any(|token| token.contains(*keyword)))
                .count();

            if match_count > 0 {
                let density = match_count as f32 / entry.keywords.len() as f32;
                let score = density + match_count as f32 * MATCH_BONUS;

                // Strict `>` keeps the earliest entry on equal scores.
                if score > highest {
                    highest = score;
                    best = Some(entry);
                }
            }
        }

        if highest < CONFIDENCE_THRESHOLD {
            return None;
        }

        best.map(|entry| KnowledgeHit {
            content: entry.content.to_string(),
            recommendations: entry.recommendations.iter().map(|r| r.to_string()).collect(),
            intent: entry.intent.to_string(),
            confidence: highest,
        })
    }
}

/// Lowercase the query, strip everything except word characters, whitespace,
/// and `%`, and split on whitespace.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '%' || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
