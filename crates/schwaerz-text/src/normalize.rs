// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text normalization shared by the classifier and the redaction matcher.

/// Word characters: letters, digits and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Strip every non-word character and lowercase the rest.
///
/// Lowercasing happens first and the filter runs on its output, so case
/// mappings that expand into combining marks cannot leave non-word
/// characters behind. This keeps `normalize` idempotent.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().chars().filter(|c| is_word_char(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_whitespace() {
        assert_eq!(normalize("+91 98765-43210"), "919876543210");
        assert_eq!(normalize("Jane.Doe@Mail.com"), "janedoemailcom");
        assert_eq!(normalize("  "), "");
    }

    #[test]
    fn keeps_underscore_and_unicode_letters() {
        assert_eq!(normalize("Müller_GmbH!"), "müller_gmbh");
    }

    #[test]
    fn expanding_case_mapping_stays_word_only() {
        // U+0130 lowercases to 'i' followed by a combining dot.
        let once = normalize("İstanbul");
        assert!(once.chars().all(is_word_char));
        assert_eq!(normalize(&once), once);
    }
}
