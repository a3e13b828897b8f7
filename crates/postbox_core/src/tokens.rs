//! Identifier extraction from postbox subject lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    static ref ISIN_PATTERN: Regex = Regex::new(r"\b[A-Z]{2}[A-Z0-9]{10}\b").unwrap();

    static ref IBAN_PATTERN: Regex = Regex::new(r"\bDE\d{20}\b").unwrap();

    static ref ORDER_NUMBER_PATTERN: Regex =
        Regex::new(r"\bOrdernummer\s*[:#]?\s*([A-Z0-9\-/]+)\b").unwrap();

    static ref ACCOUNT_NUMBER_PATTERN: Regex = Regex::new(r"\bExtra-Konto\s+(\d{10})\b").unwrap();
}

/// Separators stripped from both ends of the cleaned subject.
const EDGE_SEPARATORS: &[char] = &['/', '|', '-'];

/// Identifiers found in a subject line. Missing tokens are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokens {
    pub isin: String,
    pub iban: String,
    pub ordernumber: String,
    pub account_number: String,
}

/// Collapses whitespace runs to a single space and trims the ends.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Runs the four identifier searches independently over `subject`.
pub fn extract_tokens(subject: &str) -> Tokens {
    let isin = ISIN_PATTERN
        .find(subject)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let iban = IBAN_PATTERN
        .find(subject)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let ordernumber = first_group(&ORDER_NUMBER_PATTERN, subject);
    let account_number = first_group(&ACCOUNT_NUMBER_PATTERN, subject);

    Tokens {
        isin,
        iban,
        ordernumber,
        account_number,
    }
}

fn first_group(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Returns `subject` with every extracted token removed.
///
/// Order and account numbers are removed together with their labels. Only the
/// first occurrence of each token is removed.
pub fn build_subject_text(subject: &str, tokens: &Tokens) -> String {
    let mut text = subject.to_string();

    if !tokens.ordernumber.is_empty() {
        text = ORDER_NUMBER_PATTERN.replace(&text, "").into_owned();
    }
    if !tokens.account_number.is_empty() {
        text = ACCOUNT_NUMBER_PATTERN.replace(&text, "").into_owned();
    }
    if !tokens.iban.is_empty() {
        text = text.replacen(tokens.iban.as_str(), "", 1);
    }
    if !tokens.isin.is_empty() {
        text = text.replacen(tokens.isin.as_str(), "", 1);
    }

    let collapsed = normalize_text(&text);
    let trimmed = collapsed.trim_matches(|c: char| c.is_whitespace() || EDGE_SEPARATORS.contains(&c));
    normalize_text(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isin_inside_iban_is_not_matched() {
        let tokens = extract_tokens("Kontoauszug DE12345678901234567890");
        assert_eq!(tokens.iban, "DE12345678901234567890");
        assert_eq!(tokens.isin, "");
    }

    #[test]
    fn order_number_backtracks_to_word_boundary() {
        let tokens = extract_tokens("Kauf Ordernummer #AB-99/ rest");
        assert_eq!(tokens.ordernumber, "AB-99");
    }

    #[test]
    fn edge_separators_are_trimmed() {
        let tokens = extract_tokens("- Depot | US0378331005 /");
        assert_eq!(tokens.isin, "US0378331005");
        assert_eq!(build_subject_text("- Depot | US0378331005 /", &tokens), "Depot");
    }
}
