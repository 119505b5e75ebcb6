//! Text heuristics used by the skills. Single pass, no I/O.
//!
//! Word/sentence/syllable counting, Flesch reading ease, keyword statistics,
//! slugs and excerpts, and the string-similarity measures behind recommendations.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+(?:'[A-Za-z0-9]+)*").expect("word regex"));
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence regex"));
static MD_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(```|~~~).*$").expect("fence regex"));
static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("image regex"));
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("link regex"));
static MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s*").expect("heading regex"));
static MD_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*>\s?").expect("quote regex"));
static MD_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("bullet regex"));
static MD_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_~`]+").expect("emphasis regex"));

/// Max slug length in bytes (slugs are ASCII).
pub const MAX_SLUG_LEN: usize = 80;

/// Average adult reading speed used for reading-time estimates.
const WORDS_PER_MINUTE: usize = 200;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its",
    "itself", "just", "like", "more", "most", "much", "must", "myself", "nor", "not", "now",
    "off", "once", "only", "other", "our", "ours", "ourselves", "out", "over", "own", "same",
    "she", "should", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "too", "under",
    "until", "very", "was", "way", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Word tokens, markdown punctuation ignored.
pub fn words(text: &str) -> Vec<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn word_count(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// Sentences are runs of text ending in `.`, `!` or `?` that contain a word.
/// Any text with at least one word has at least one sentence.
pub fn sentence_count(text: &str) -> usize {
    let count = SENTENCE_END
        .split(text)
        .filter(|segment| WORD.is_match(segment))
        .count();
    if count == 0 && WORD.is_match(text) {
        1
    } else {
        count
    }
}

/// Vowel-group syllable estimate. Silent trailing `e` is dropped; minimum 1.
pub fn syllable_count(word: &str) -> usize {
    let lower: Vec<char> = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if lower.is_empty() {
        return 1;
    }
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut groups = 0usize;
    let mut prev_vowel = false;
    for &c in &lower {
        let v = is_vowel(c);
        if v && !prev_vowel {
            groups += 1;
        }
        prev_vowel = v;
    }

    let n = lower.len();
    if groups > 1 && lower[n - 1] == 'e' && !(n >= 2 && lower[n - 2] == 'l') {
        groups -= 1;
    }
    groups.max(1)
}

/// Flesch reading ease, clamped to 0..=100. Empty text scores 0.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let tokens = words(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let w = tokens.len() as f64;
    let s = sentence_count(text).max(1) as f64;
    let syl: usize = tokens.iter().map(|t| syllable_count(t)).sum();
    let score = 206.835 - 1.015 * (w / s) - 84.6 * (syl as f64 / w);
    score.clamp(0.0, 100.0)
}

pub fn readability_label(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "very easy",
        s if s >= 80.0 => "easy",
        s if s >= 70.0 => "fairly easy",
        s if s >= 60.0 => "standard",
        s if s >= 50.0 => "fairly difficult",
        s if s >= 30.0 => "difficult",
        _ => "very difficult",
    }
}

/// Average words per sentence; 0 for empty text.
pub fn avg_sentence_length(text: &str) -> f64 {
    let w = word_count(text);
    if w == 0 {
        return 0.0;
    }
    w as f64 / sentence_count(text).max(1) as f64
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Most frequent content words: lowercase, length >= 3, not a stop word, not numeric.
/// Sorted by count descending, then alphabetically.
pub fn top_keywords(text: &str, n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for w in words(text) {
        let w = w.to_lowercase();
        if w.len() < 3 || is_stop_word(&w) || w.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        *counts.entry(w).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Percentage of words covered by occurrences of `keyword` (a word or phrase).
pub fn keyword_density(text: &str, keyword: &str) -> f64 {
    let haystack: Vec<String> = words(text).iter().map(|w| w.to_lowercase()).collect();
    let needle: Vec<String> = words(keyword).iter().map(|w| w.to_lowercase()).collect();
    if haystack.is_empty() || needle.is_empty() || needle.len() > haystack.len() {
        return 0.0;
    }
    let hits = haystack
        .windows(needle.len())
        .filter(|window| *window == needle.as_slice())
        .count();
    (hits * needle.len()) as f64 / haystack.len() as f64 * 100.0
}

/// True if `keyword` appears in `text` as a whole word/phrase (case-insensitive).
pub fn contains_phrase(text: &str, keyword: &str) -> bool {
    keyword_density(text, keyword) > 0.0
}

/// Lowercase ASCII slug. Non-alphanumeric runs collapse into one `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let mut slug = slug.trim_matches('-').to_string();

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        if let Some(cut) = slug.rfind('-') {
            if cut > 0 {
                slug.truncate(cut);
            }
        }
        slug = slug.trim_matches('-').to_string();
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Remove markdown syntax, keeping the readable text.
pub fn strip_markdown(text: &str) -> String {
    let s = MD_FENCE.replace_all(text, "");
    let s = MD_IMAGE.replace_all(&s, "$1");
    let s = MD_LINK.replace_all(&s, "$1");
    let s = MD_HEADING.replace_all(&s, "");
    let s = MD_QUOTE.replace_all(&s, "");
    let s = MD_BULLET.replace_all(&s, "");
    MD_EMPHASIS.replace_all(&s, "").into_owned()
}

/// Plain-text excerpt of at most `max_chars` characters (plus `...` when cut),
/// cut on a word boundary.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let plain = strip_markdown(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if plain.chars().count() <= max_chars {
        return plain;
    }
    let cut: String = plain.chars().take(max_chars).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!(
        "{}...",
        cut.trim_end_matches(|c: char| c.is_ascii_punctuation())
    )
}

/// Text up to the end of the `n`-th word, as counted by `word_count`.
pub fn truncate_words(text: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    match WORD.find_iter(text).nth(n - 1) {
        Some(m) => text[..m.end()].trim().to_string(),
        None => text.trim().to_string(),
    }
}

pub fn reading_time_minutes(text: &str) -> u32 {
    word_count(text).div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Sørensen-Dice coefficient over lowercase character bigrams, in 0.0..=1.0.
pub fn dice_similarity(a: &str, b: &str) -> f64 {
    let na: String = a.split_whitespace().collect::<String>().to_lowercase();
    let nb: String = b.split_whitespace().collect::<String>().to_lowercase();
    if !na.is_empty() && na == nb {
        return 1.0;
    }
    let ba = bigrams(&na);
    let bb = bigrams(&nb);
    if ba.is_empty() || bb.is_empty() {
        return 0.0;
    }

    let mut pool: HashMap<(char, char), usize> = HashMap::new();
    for g in &bb {
        *pool.entry(*g).or_insert(0) += 1;
    }
    let mut shared = 0usize;
    for g in &ba {
        if let Some(n) = pool.get_mut(g) {
            if *n > 0 {
                *n -= 1;
                shared += 1;
            }
        }
    }
    (2 * shared) as f64 / (ba.len() + bb.len()) as f64
}

/// Jaccard index of two string sets, in 0.0..=1.0. Both empty -> 0.0.
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let sa: HashSet<&str> = a.iter().map(|s| s.as_ref()).collect();
    let sb: HashSet<&str> = b.iter().map(|s| s.as_ref()).collect();
    let union = sa.union(&sb).count();
    if union == 0 {
        return 0.0;
    }
    sa.intersection(&sb).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn test_word_and_sentence_count() {
        let text = "# Hello\n\nRust is fast. It's also safe! Isn't it?";
        assert_eq!(word_count(text), 9);
        assert_eq!(sentence_count(text), 3);
        assert_eq!(sentence_count("no terminal punctuation"), 1);
        assert_eq!(sentence_count(""), 0);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(syllable_count("cat"), 1);
        assert_eq!(syllable_count("make"), 1);
        assert_eq!(syllable_count("table"), 2);
        assert_eq!(syllable_count("reading"), 2);
        assert_eq!(syllable_count("beautiful"), 3);
        assert_eq!(syllable_count("123"), 1);
    }

    #[test]
    fn test_flesch_bounds() {
        assert_eq!(flesch_reading_ease(""), 0.0);
        let easy = "The cat sat. The dog ran. We had fun.";
        let hard = "Interdisciplinary institutionalization necessitates comprehensive \
                    organizational transformation, notwithstanding considerable \
                    administrative complexity.";
        let e = flesch_reading_ease(easy);
        let h = flesch_reading_ease(hard);
        assert!((0.0..=100.0).contains(&e));
        assert!((0.0..=100.0).contains(&h));
        assert!(e > h);
        assert_eq!(readability_label(e), "very easy");
        assert_eq!(readability_label(h), "very difficult");
    }

    #[test]
    fn test_top_keywords() {
        let text = "Rust rust RUST ownership ownership borrow the the the and 2024";
        let top = top_keywords(text, 2);
        assert_eq!(
            top,
            vec![("rust".to_string(), 3), ("ownership".to_string(), 2)]
        );
    }

    #[test]
    fn test_keyword_density() {
        let text = "static sites are fast and static sites are cheap";
        let d = keyword_density(text, "Static Sites");
        assert!((d - 4.0 / 9.0 * 100.0).abs() < 1e-9);
        assert_eq!(keyword_density(text, "dynamic"), 0.0);
        assert_eq!(keyword_density("", "x"), 0.0);
        assert!(contains_phrase(text, "cheap"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & WebAssembly: 2024  "), "rust-webassembly-2024");
        assert_eq!(slugify("¿¡!!"), "untitled");
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("word-word"));
    }

    #[test]
    fn test_strip_markdown_and_excerpt() {
        let md = "## Intro\n\nSee **the** [docs](https://x.dev) and `code`.\n\n- item one";
        let plain = strip_markdown(md);
        assert!(plain.contains("Intro"));
        assert!(plain.contains("See the docs and code."));
        assert!(!plain.contains("https"));
        assert!(plain.contains("item one"));

        let ex = excerpt("one two three four five six", 12);
        assert_eq!(ex, "one two...");
        assert_eq!(excerpt("short", 100), "short");
    }

    #[test]
    fn test_truncate_and_reading_time() {
        assert_eq!(truncate_words("a b c d", 2), "a b");
        assert_eq!(truncate_words("state-of-the-art tooling", 2), "state-of");
        assert_eq!(word_count(&truncate_words(&"e.g. ".repeat(10), 5)), 5);
        assert_eq!(truncate_words(" a b ", 5), "a b");
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(401)), 3);
    }

    #[test]
    fn test_dice_similarity() {
        assert_eq!(dice_similarity("Night", "night"), 1.0);
        assert_eq!(dice_similarity("a", "b"), 0.0);
        assert_eq!(dice_similarity("", ""), 0.0);
        let s = dice_similarity("night", "nacht");
        assert!((s - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard() {
        let a = ["rust", "web"];
        let b = ["rust", "cli"];
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        let empty: [&str; 0] = [];
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }
}
