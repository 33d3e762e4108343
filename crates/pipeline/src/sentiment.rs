use chatter_core::post::entity::CleanedPost;
use chatter_core::sentiment::entity::Sentiment;
use chatter_core::sentiment::port::SentimentScorer;
use std::collections::HashMap;
use tracing::debug;

// 否定词之后的一个情感词极性反转并减半
const NEGATION_FACTOR: f64 = -0.5;

const NEGATIONS: [&str; 8] = ["not", "no", "never", "nothing", "dont", "cant", "wont", "isnt"];

// (词, 极性, 主观度)
const DEFAULT_LEXICON: [(&str, f64, f64); 26] = [
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("best", 1.0, 0.3),
    ("love", 0.5, 0.6),
    ("win", 0.8, 0.4),
    ("bullish", 0.7, 0.8),
    ("moon", 0.6, 0.5),
    ("rocket", 0.6, 0.5),
    ("gains", 0.6, 0.5),
    ("tendies", 0.6, 0.6),
    ("squeeze", 0.4, 0.5),
    ("hold", 0.2, 0.3),
    ("buy", 0.3, 0.4),
    ("strong", 0.43, 0.73),
    ("bad", -0.7, 0.67),
    ("worst", -1.0, 1.0),
    ("hate", -0.8, 0.9),
    ("bearish", -0.7, 0.8),
    ("crash", -0.6, 0.6),
    ("dump", -0.6, 0.6),
    ("loss", -0.5, 0.4),
    ("losses", -0.5, 0.4),
    ("sell", -0.3, 0.4),
    ("scam", -0.8, 0.8),
    ("fear", -0.6, 0.7),
    ("weak", -0.38, 0.63),
];

/// # Summary
/// 基于词表的情感打分器，作为外部打分服务的本地替身。
///
/// # Invariants
/// - 极性、主观度取命中词的平均值，没有命中时返回 (0, 0)。
/// - 结果总是夹在合法区间内。
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    entries: HashMap<String, (f64, f64)>,
}

impl LexiconScorer {
    /// 使用内置词表创建打分器。
    pub fn new() -> Self {
        Self {
            entries: DEFAULT_LEXICON
                .iter()
                .map(|(word, polarity, subjectivity)| (word.to_string(), (*polarity, *subjectivity)))
                .collect(),
        }
    }

    /// 追加或覆盖一个词条。
    pub fn with_entry(mut self, word: &str, polarity: f64, subjectivity: f64) -> Self {
        self.entries
            .insert(word.to_lowercase(), (polarity, subjectivity));
        self
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    /// # Summary
    /// 对文本打分。
    ///
    /// # Logic
    /// 1. 转小写、去掉撇号后按非字母数字字符切词。
    /// 2. 命中词表的词累加极性与主观度；紧跟否定词的命中词极性乘以 -0.5。
    /// 3. 取平均值并夹到合法区间。
    fn score(&self, text: &str) -> Sentiment {
        let normalized = text.to_lowercase().replace('\'', "");
        let mut polarity = 0.0;
        let mut subjectivity = 0.0;
        let mut hits = 0.0;
        let mut negate = false;

        for word in normalized.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            if NEGATIONS.contains(&word) {
                negate = true;
                continue;
            }
            if let Some((p, s)) = self.entries.get(word) {
                polarity += if negate { p * NEGATION_FACTOR } else { *p };
                subjectivity += s;
                hits += 1.0;
            }
            negate = false;
        }

        if hits == 0.0 {
            return Sentiment::clamped(0.0, 0.0);
        }
        Sentiment::clamped(polarity / hits, subjectivity / hits)
    }
}

/// # Summary
/// 为帖子标注情感，返回新的序列。
///
/// # Logic
/// 1. 以标题为打分文本；标题缺失或为空白时保持未打分，不视为错误。
/// 2. 不修改输入，逐条映射出新记录。
///
/// # Arguments
/// * `posts`: 去重后的帖子。
/// * `scorer`: 打分器。
///
/// # Returns
/// 与输入等长、顺序一致的新序列。
pub fn annotate_sentiment(posts: &[CleanedPost], scorer: &dyn SentimentScorer) -> Vec<CleanedPost> {
    let annotated: Vec<CleanedPost> = posts
        .iter()
        .map(|post| {
            let sentiment = post
                .post
                .raw
                .title
                .as_deref()
                .filter(|title| !title.trim().is_empty())
                .map(|title| scorer.score(title));
            CleanedPost {
                sentiment: sentiment.or(post.sentiment),
                ..post.clone()
            }
        })
        .collect();

    debug!(
        posts = annotated.len(),
        scored = annotated.iter().filter(|p| p.sentiment.is_some()).count(),
        "Annotated sentiment"
    );
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_scores_known_words() {
        let scorer = LexiconScorer::new();
        let s = scorer.score("GME to the moon, diamond hands, great gains!");
        assert!(s.polarity > 0.0);
        assert!(s.subjectivity > 0.0);

        let s = scorer.score("This is the worst crash ever");
        assert!(s.polarity < 0.0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        let plain = scorer.score("good");
        let negated = scorer.score("not good");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert_eq!(negated.subjectivity, plain.subjectivity);
    }

    #[test]
    fn test_unknown_text_is_neutral() {
        let scorer = LexiconScorer::new().with_entry("yolo", 0.9, 0.9);
        assert_eq!(scorer.score("what is this").polarity, 0.0);
        assert_eq!(scorer.score("YOLO").polarity, 0.9);
    }
}
