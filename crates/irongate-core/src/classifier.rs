//! Document classifier: rule-based structural scoring that
//! assigns a document-type label and a scoring multiplier.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    CasualQuestion,
    EmailDraft,
    ContractClause,
    MeetingNotes,
    CodeSnippet,
    FinancialData,
    LitigationDoc,
    ClientMemo,
    Personal,
}

impl DocumentType {
    /// Scoring multiplier applied after the entity score is computed.
    pub fn multiplier(self) -> f64 {
        match self {
            DocumentType::CasualQuestion => 0.5,
            DocumentType::EmailDraft => 1.2,
            DocumentType::ContractClause => 2.0,
            DocumentType::MeetingNotes => 1.3,
            DocumentType::CodeSnippet => 0.8,
            DocumentType::FinancialData => 1.8,
            DocumentType::LitigationDoc => 2.0,
            DocumentType::ClientMemo => 1.5,
            DocumentType::Personal => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub document_type: DocumentType,
    pub confidence: f64,
}

/// Per-bucket point accumulator, in a fixed tie-break order
/// (`casual_question` wins ties, so it is both first and the fallback).
struct Buckets {
    casual_question: i32,
    email_draft: i32,
    contract_clause: i32,
    meeting_notes: i32,
    code_snippet: i32,
    financial_data: i32,
    litigation_doc: i32,
    client_memo: i32,
    personal: i32,
}

impl Buckets {
    fn new() -> Self {
        Self {
            casual_question: 0,
            email_draft: 0,
            contract_clause: 0,
            meeting_notes: 0,
            code_snippet: 0,
            financial_data: 0,
            litigation_doc: 0,
            client_memo: 0,
            personal: 0,
        }
    }

    /// Winner, ties broken toward `casual_question` by scanning in the
    /// order the buckets are listed above.
    fn winner(&self) -> (DocumentType, i32) {
        let scored = [
            (DocumentType::CasualQuestion, self.casual_question),
            (DocumentType::EmailDraft, self.email_draft),
            (DocumentType::ContractClause, self.contract_clause),
            (DocumentType::MeetingNotes, self.meeting_notes),
            (DocumentType::CodeSnippet, self.code_snippet),
            (DocumentType::FinancialData, self.financial_data),
            (DocumentType::LitigationDoc, self.litigation_doc),
            (DocumentType::ClientMemo, self.client_memo),
            (DocumentType::Personal, self.personal),
        ];
        let mut best = scored[0];
        for entry in &scored[1..] {
            if entry.1 > best.1 {
                best = *entry;
            }
        }
        best
    }
}

pub struct DocumentClassifier;

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();
        let len = text.chars().count();
        let mut b = Buckets::new();

        if len < 200 && text.trim_end().ends_with('?') {
            b.casual_question += 3;
        }
        if starts_with_interrogative(&lower) {
            b.casual_question += 2;
        }
        if contains_any(&lower, &["hi ", "hey ", "hello "]) || lower.starts_with("hi") {
            b.email_draft += 3;
        }
        if contains_any(&lower, &["regards", "sincerely", "best,", "thanks,"]) {
            b.email_draft += 2;
        }

        if contains_any(
            &lower,
            &["whereas", "hereby", "hereinafter", "henceforth", "notwithstanding"],
        ) {
            b.contract_clause += 4;
        }
        if contains_section_reference(&lower) {
            b.contract_clause += 3;
        }
        if contains_any(&lower, &["indemnify", "warrant", "covenant"]) {
            b.contract_clause += 3;
        }

        if contains_any(&lower, &["agenda", "action item", "action items", "attendees"]) {
            b.meeting_notes += 4;
        }
        if bullet_point_lines(text) > 0 {
            b.meeting_notes += 1;
        }

        if contains_code_keyword(&lower) {
            b.code_snippet += 2;
        }
        if contains_code_syntax(text) {
            b.code_snippet += 2;
        }
        if text.contains("```") {
            b.code_snippet += 3;
        }

        if contains_dollar_amount(text) {
            b.financial_data += 4;
        }
        if contains_any(&lower, &["revenue", "ebitda", "valuation", "balance sheet", "quarterly"]) {
            b.financial_data += 3;
        }

        if contains_any(&lower, &["plaintiff", "defendant", "court"]) {
            b.litigation_doc += 4;
        }
        if contains_case_citation(text) {
            b.litigation_doc += 2;
        }

        if has_memo_header(text) && len > 300 {
            b.client_memo += 3;
        }
        if contains_any(&lower, &["re:", "cc:", "privileged and confidential"]) {
            b.client_memo += 2;
        }

        if contains_any(
            &lower,
            &["my wife", "my husband", "my kids", "my family", "personal matter"],
        ) {
            b.personal += 4;
        }

        let (document_type, best_score) = b.winner();
        let confidence = (best_score as f64 / 8.0).min(1.0);

        Classification {
            document_type,
            confidence,
        }
    }
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn starts_with_interrogative(lower: &str) -> bool {
    const WORDS: &[&str] = &["what", "why", "how", "when", "where", "who", "can", "could", "would", "should"];
    let first_word = lower.trim_start().split_whitespace().next().unwrap_or("");
    WORDS.contains(&first_word)
}

fn contains_section_reference(lower: &str) -> bool {
    contains_any(lower, &["section ", "article ", "clause ", "§"])
}

fn bullet_point_lines(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("• ")
        })
        .count()
}

fn contains_code_keyword(lower: &str) -> bool {
    contains_any(
        lower,
        &["fn ", "function ", "def ", "class ", "import ", "const ", "let ", "return "],
    )
}

fn contains_code_syntax(text: &str) -> bool {
    text.contains("==")
        || text.contains("!=")
        || text.contains("=>")
        || text.contains("->")
        || text.contains("::")
}

fn contains_dollar_amount(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &c)| {
        c == b'$' && bytes.get(i + 1).map(|n| n.is_ascii_digit()).unwrap_or(false)
    })
}

fn contains_case_citation(text: &str) -> bool {
    // X v. Y, where X and Y are capitalized words, per the "case citation".
    let words: Vec<&str> = text.split_whitespace().collect();
    for w in windows3(&words) {
        let [a, v, b] = w;
        let is_v = v == "v." || v == "v" || v == "vs.";
        if is_v && starts_capital(a) && starts_capital(b) {
            return true;
        }
    }
    false
}

fn windows3<'a>(words: &'a [&'a str]) -> impl Iterator<Item = [&'a str; 3]> {
    (0..words.len().saturating_sub(2)).map(move |i| [words[i], words[i + 1], words[i + 2]])
}

fn starts_capital(word: &str) -> bool {
    word.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn has_memo_header(text: &str) -> bool {
    let lower = text.to_lowercase();
    contains_any(&lower, &["to:", "from:", "date:", "re:"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_question_is_casual() {
        let classifier = DocumentClassifier::new();
        let result = classifier.classify("What time is it?");
        assert_eq!(result.document_type, DocumentType::CasualQuestion);
    }

    #[test]
    fn contract_language_wins() {
        let classifier = DocumentClassifier::new();
        let text = "WHEREAS the parties hereby agree, and hereinafter the Company shall indemnify and warrant under Section 4.2 of this agreement.";
        let result = classifier.classify(text);
        assert_eq!(result.document_type, DocumentType::ContractClause);
    }

    #[test]
    fn litigation_terms_win() {
        let classifier = DocumentClassifier::new();
        let text = "The plaintiff and defendant appeared before the court. See Smith v. Jones for precedent.";
        let result = classifier.classify(text);
        assert_eq!(result.document_type, DocumentType::LitigationDoc);
    }

    #[test]
    fn confidence_is_bounded() {
        let classifier = DocumentClassifier::new();
        let result = classifier.classify("hello world");
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn ties_break_toward_casual_question() {
        let classifier = DocumentClassifier::new();
        let result = classifier.classify("plain text with nothing distinctive at all");
        assert_eq!(result.document_type, DocumentType::CasualQuestion);
    }
}
