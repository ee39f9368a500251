//! Keyword retrieval over the fragment index.

use super::FileIndex;
use crate::Result;
use std::path::Path;

/// Questions longer than this many characters get the larger cap.
pub const LONG_QUESTION_CHARS: usize = 50;
/// Fragment cap for short questions.
pub const SHORT_QUESTION_LIMIT: usize = 5;
/// Fragment cap for long questions.
pub const LONG_QUESTION_LIMIT: usize = 7;

const TOKEN_SEPARATORS: [char; 5] = [' ', ',', '.', '?', '!'];

/// Result of a retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Relevant fragment texts, in index order
    Fragments(Vec<String>),
    /// Nothing has been indexed yet
    NoIndex,
    /// The index exists but holds no fragments
    EmptyIndex,
    /// No fragment contains any question token
    NoMatches,
}

impl Retrieval {
    /// User-facing explanation when there is nothing to answer from.
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Fragments(_) => None,
            Self::NoIndex => Some("There are no indexed files."),
            Self::EmptyIndex => Some("No fragments were found in the index."),
            Self::NoMatches => Some("No relevant fragments were found for the question."),
        }
    }
}

/// Lower-cased, non-empty tokens of a question.
pub fn tokenize(question: &str) -> Vec<String> {
    question
        .split(TOKEN_SEPARATORS)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Maximum number of fragments returned for a question.
pub fn fragment_limit(question: &str) -> usize {
    if question.chars().count() > LONG_QUESTION_CHARS {
        LONG_QUESTION_LIMIT
    } else {
        SHORT_QUESTION_LIMIT
    }
}

/// Finds fragments sharing any token with the question.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentRetriever;

impl FragmentRetriever {
    /// Creates the retriever.
    pub const fn new() -> Self {
        Self
    }

    /// Selects fragments from an in-memory index.
    pub fn retrieve(&self, question: &str, index: &FileIndex) -> Retrieval {
        if index.is_empty() {
            return Retrieval::EmptyIndex;
        }

        let tokens = tokenize(question);
        let matches: Vec<String> = index
            .fragments
            .iter()
            .filter(|fragment| {
                let text = fragment.text.to_lowercase();
                tokens.iter().any(|token| text.contains(token.as_str()))
            })
            .take(fragment_limit(question))
            .map(|fragment| fragment.text.clone())
            .collect();

        tracing::debug!(
            "Retrieved {} fragments for {} tokens",
            matches.len(),
            tokens.len()
        );

        if matches.is_empty() {
            Retrieval::NoMatches
        } else {
            Retrieval::Fragments(matches)
        }
    }

    /// Selects fragments from the index persisted at `index_path`.
    ///
    /// # Errors
    /// `IndexCorruption` or `Io` if the persisted index cannot be loaded
    pub async fn retrieve_persisted(&self, question: &str, index_path: &Path) -> Result<Retrieval> {
        match FileIndex::load(index_path).await? {
            Some(index) => Ok(self.retrieve(question, &index)),
            None => Ok(Retrieval::NoIndex),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::FileFragment;

    fn index_of(texts: &[&str]) -> FileIndex {
        FileIndex::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| FileFragment {
                    source_file_name: "doc.txt".to_string(),
                    fragment_index: i,
                    text: (*text).to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("What is the Ficus, exactly?!"),
            vec!["what", "is", "the", "ficus", "exactly"]
        );
        assert!(tokenize(" ,.?! ").is_empty());
    }

    #[test]
    fn test_fragment_limit_boundary() {
        assert_eq!(fragment_limit(&"x".repeat(50)), 5);
        assert_eq!(fragment_limit(&"x".repeat(51)), 7);
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let index = index_of(&["El FICUS necesita luz", "Aloe vera", "ficuses"]);
        let retrieval = FragmentRetriever::new().retrieve("ficus?", &index);
        assert_eq!(
            retrieval,
            Retrieval::Fragments(vec![
                "El FICUS necesita luz".to_string(),
                "ficuses".to_string()
            ])
        );
    }

    #[test]
    fn test_short_question_capped_at_five_in_index_order() {
        let texts: Vec<String> = (0..10).map(|i| format!("planta {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let index = index_of(&refs);

        match FragmentRetriever::new().retrieve("planta", &index) {
            Retrieval::Fragments(found) => {
                assert_eq!(found.len(), 5);
                assert_eq!(found[0], "planta 0");
                assert_eq!(found[4], "planta 4");
            }
            other => panic!("expected fragments, got {other:?}"),
        }
    }

    #[test]
    fn test_no_matches_and_empty_index() {
        let retriever = FragmentRetriever::new();
        assert_eq!(
            retriever.retrieve("cactus", &index_of(&["Aloe vera"])),
            Retrieval::NoMatches
        );
        assert_eq!(
            retriever.retrieve("cactus", &FileIndex::default()),
            Retrieval::EmptyIndex
        );
        assert_eq!(
            retriever.retrieve("?!", &index_of(&["Aloe vera"])),
            Retrieval::NoMatches
        );
    }

    #[tokio::test]
    async fn test_missing_persisted_index_is_no_index() {
        let dir = tempfile::tempdir().unwrap();
        let retrieval = FragmentRetriever::new()
            .retrieve_persisted("cactus", &dir.path().join("file_index.json"))
            .await
            .unwrap();
        assert_eq!(retrieval, Retrieval::NoIndex);
        assert!(retrieval.message().is_some());
    }
}
