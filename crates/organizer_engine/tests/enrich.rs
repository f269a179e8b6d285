use std::collections::VecDeque;
use std::sync::Mutex;

use organizer_core::{FeedMetadata, FeedReference, FetchFailure, PodcastRecord, TagCoverage};
use organizer_engine::{enrich_records, EnrichOptions, Oracle, OracleError};
use pretty_assertions::assert_eq;

/// Answers prompts from a queue, in call order.
struct ScriptedOracle {
    answers: Mutex<VecDeque<Result<String, OracleError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn new(answers: Vec<Result<&str, OracleError>>) -> Self {
        Self {
            answers: Mutex::new(
                answers
                    .into_iter()
                    .map(|answer| answer.map(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(OracleError::EmptyResponse))
    }
}

fn fetched(title: &str) -> PodcastRecord {
    PodcastRecord::fetched(
        &FeedReference::new(title, format!("https://feeds.test/{title}")),
        FeedMetadata {
            title: title.to_string(),
            description: Some(format!("About {title}")),
            ..FeedMetadata::default()
        },
    )
}

fn failed(title: &str) -> PodcastRecord {
    PodcastRecord::failed(
        &FeedReference::new(title, format!("https://feeds.test/{title}")),
        FetchFailure::HttpStatus(404),
    )
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn collection() -> Vec<PodcastRecord> {
    vec![
        fetched("Hard Fork"),
        failed("Gone One"),
        fetched("Lex Fridman"),
        fetched("Radiolab"),
        failed("Gone Two"),
        fetched("Planet Money"),
        fetched("Daily News"),
        fetched("Acquired"),
    ]
}

const CATEGORIES: &str = r#"```json
{"categories": {"Technology & AI": [0, 1, 5], "Science": [2], "Business": [3, 42]}}
```"#;

#[tokio::test]
async fn failed_tag_batch_falls_back_without_aborting_the_rest() {
    organizer_logging::initialize_for_tests();
    let oracle = ScriptedOracle::new(vec![
        Ok(CATEGORIES),
        Ok(r#"{"tags": {"0": ["Tech", "AI ", "tech"], "1": []}}"#),
        Err(OracleError::Transport("connection reset".into())),
        Ok(r#"{"tags": {"5": ["startups", "history"]},
               "descriptions": {"5": "  The stories of great companies. "}}"#),
    ]);

    let enrichment = enrich_records(collection(), &oracle, &EnrichOptions { tag_batch_size: 2 })
        .await
        .expect("enriched");
    let records = &enrichment.records;

    let order: Vec<_> = records.iter().map(|r| r.original_title.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "Hard Fork",
            "Lex Fridman",
            "Radiolab",
            "Planet Money",
            "Daily News",
            "Acquired",
            "Gone One",
            "Gone Two"
        ]
    );

    // Oracle tags, normalized and deduplicated.
    assert_eq!(records[0].tags, strings(&["tech", "ai"]));
    // Empty oracle list falls back.
    assert_eq!(records[1].tags, strings(&["technology", "ai", "lex", "fridman"]));
    // The whole failed batch falls back.
    assert_eq!(records[2].tags, strings(&["science", "radiolab"]));
    assert_eq!(records[3].tags, strings(&["business", "planet", "money"]));
    // Uncategorized and untagged by the oracle: nothing to synthesize from.
    assert_eq!(records[4].category, None);
    assert!(records[4].tags.is_empty());
    assert_eq!(records[5].tags, strings(&["startups", "history"]));
    assert_eq!(
        records[5].final_description(),
        Some("The stories of great companies.")
    );
    assert_eq!(records[0].final_description(), Some("About Hard Fork"));

    for unresolved in &records[6..] {
        assert_eq!(unresolved.category, None);
        assert!(unresolved.tags.is_empty());
    }

    let report = &enrichment.report;
    assert_eq!(report.provider, "scripted");
    assert_eq!(report.categorized, 5);
    assert_eq!(report.uncategorized, 1);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(
        report.tags,
        TagCoverage {
            oracle: 2,
            fallback: 3,
            untagged: 1,
            enhanced_descriptions: 1,
        }
    );
    assert_eq!(report.categories["Business"], vec![3, 42]);

    let prompts = oracle.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[2].contains("\"id\": 2") && prompts[2].contains("\"id\": 3"));
    assert!(prompts[3].contains("\"category\": \"Uncategorized\""));
}

#[tokio::test]
async fn categorize_failure_is_returned_and_tagging_skipped() {
    let oracle = ScriptedOracle::new(vec![Err(OracleError::Api {
        status: 401,
        body: "invalid x-api-key".into(),
    })]);

    let result = enrich_records(collection(), &oracle, &EnrichOptions::default()).await;

    assert!(matches!(result, Err(OracleError::Api { status: 401, .. })));
    assert_eq!(oracle.prompts().len(), 1);
}

#[tokio::test]
async fn unparseable_categories_are_an_error() {
    let oracle = ScriptedOracle::new(vec![Ok("Here are your categories: tech, news.")]);

    let result = enrich_records(collection(), &oracle, &EnrichOptions::default()).await;

    assert!(matches!(result, Err(OracleError::MalformedResponse(_))));
}

#[tokio::test]
async fn all_failed_input_skips_the_oracle() {
    let oracle = ScriptedOracle::new(Vec::new());
    let input = vec![failed("a"), failed("b")];

    let enrichment = enrich_records(input.clone(), &oracle, &EnrichOptions::default())
        .await
        .expect("nothing to do");

    assert_eq!(enrichment.records, input);
    assert!(oracle.prompts().is_empty());
    assert_eq!(enrichment.report.categorized, 0);
}

#[tokio::test]
async fn every_categorized_record_gets_tags_even_when_all_batches_fail() {
    let oracle = ScriptedOracle::new(vec![
        Ok(r#"{"categories": {"Comedy": [0, 1], "History": [2]}}"#),
        Ok("not json"),
    ]);
    let input = vec![fetched("Smartless"), fetched("Conan"), fetched("Hardcore History")];

    let enrichment = enrich_records(input, &oracle, &EnrichOptions::default())
        .await
        .expect("enriched");

    assert_eq!(enrichment.report.failed_batches, 1);
    for record in &enrichment.records {
        assert!(record.category.is_some());
        assert!(!record.tags.is_empty(), "{} has no tags", record.original_title);
    }
    assert_eq!(
        enrichment.records[2].tags,
        strings(&["history", "hardcore"])
    );
}
