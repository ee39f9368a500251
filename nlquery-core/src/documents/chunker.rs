//! Fixed-width text splitting.

/// Splits `text` into fragments of at most `chunk_size` characters.
///
/// Greedy, no overlap; only the last fragment may be shorter. Empty text
/// yields no fragments. A zero `chunk_size` is rejected by
/// [`IndexConfig::validate`](super::IndexConfig::validate) and yields no
/// fragments here.
pub fn split(text: &str, chunk_size: usize) -> Vec<String> {
    if chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
