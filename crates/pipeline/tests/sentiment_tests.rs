use chatter_core::post::entity::{CleanedPost, RawPost};
use chatter_core::sentiment::entity::Sentiment;
use chatter_core::sentiment::port::SentimentScorer;
use chatter_core::testing::post;
use chatter_pipeline::normalizer::normalize;
use chatter_pipeline::sentiment::{LexiconScorer, annotate_sentiment};

struct FixedScorer;

impl SentimentScorer for FixedScorer {
    fn score(&self, text: &str) -> Sentiment {
        if text.contains("moon") {
            Sentiment::clamped(0.8, 0.6)
        } else {
            Sentiment::clamped(-0.2, 0.1)
        }
    }
}

fn cleaned(raw: RawPost) -> CleanedPost {
    CleanedPost::singleton(normalize(raw).unwrap())
}

#[test]
fn test_annotate_is_a_pure_map() {
    let mut untitled = post("c", "", "carol", 3_000, 1, 1);
    untitled.title = None;
    let input = vec![
        cleaned(post("a", "to the moon", "alice", 1_000, 1, 1)),
        cleaned(post("b", "   ", "bob", 2_000, 1, 1)),
        cleaned(untitled),
        cleaned(post("d", "meh", "dave", 4_000, 1, 1)),
    ];

    let annotated = annotate_sentiment(&input, &FixedScorer);

    assert_eq!(annotated.len(), input.len());
    assert!(input.iter().all(|p| p.sentiment.is_none()));
    assert_eq!(annotated[0].sentiment, Some(Sentiment::clamped(0.8, 0.6)));
    assert_eq!(annotated[1].sentiment, None);
    assert_eq!(annotated[2].sentiment, None);
    assert_eq!(annotated[3].sentiment, Some(Sentiment::clamped(-0.2, 0.1)));
    assert_eq!(annotated[0].post, input[0].post);
}

#[test]
fn test_lexicon_scores_stay_in_range() {
    let scorer = LexiconScorer::new();
    for text in ["best best best", "worst worst", "not worst", "", "buy hold sell"] {
        let s = scorer.score(text);
        assert!((-1.0..=1.0).contains(&s.polarity));
        assert!((0.0..=1.0).contains(&s.subjectivity));
    }
}
