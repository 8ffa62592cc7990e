//! Content generation operations with uniform mock fallback

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::extract::extract_json;
use super::gemini::{GeminiError, TextGenerator};
use super::types::{
    at_least, validate_bio_set, Bio, Blueprint, ContentIdea, Generated, IdeaAnalysis,
    PlatformBlueprints, Validate, MIN_SET_LEN,
};
use super::{mocks, prompts};

pub const DEFAULT_HASHTAG_COUNT: usize = 15;
pub const MAX_HASHTAG_COUNT: usize = 30;
pub const DEFAULT_LIST_COUNT: usize = 5;
pub const MAX_LIST_COUNT: usize = 10;
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Generation service shared by all handlers
#[derive(Clone)]
pub struct ContentService {
    generator: Arc<dyn TextGenerator>,
}

impl ContentService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn is_live(&self) -> bool {
        self.generator.is_configured()
    }

    pub async fn analyze_idea(&self, idea: &str, niche: &str) -> Generated<IdeaAnalysis> {
        self.generate_or_mock("analyze_idea", prompts::analyze_idea(idea, niche), || {
            mocks::idea_analysis(idea, niche)
        })
        .await
    }

    pub async fn generate_vision_bios(
        &self,
        niche: &str,
        vision: &str,
        tone: &str,
    ) -> Generated<Vec<Bio>> {
        self.generate_checked(
            "generate_vision_bios",
            prompts::vision_bios(niche, vision, tone),
            |bios: &Vec<Bio>| validate_bio_set(bios),
            || mocks::vision_bios(niche, vision),
        )
        .await
    }

    pub async fn generate_blueprint(
        &self,
        topic: &str,
        niche: &str,
        duration_secs: Option<u32>,
    ) -> Generated<Blueprint> {
        let duration = duration_secs.unwrap_or(DEFAULT_DURATION_SECS).clamp(15, 180);
        self.generate_or_mock(
            "generate_blueprint",
            prompts::blueprint(topic, niche, duration),
            || mocks::blueprint(topic, niche),
        )
        .await
    }

    pub async fn generate_platform_blueprints(
        &self,
        topic: &str,
        niche: &str,
    ) -> Generated<PlatformBlueprints> {
        self.generate_or_mock(
            "generate_platform_blueprints",
            prompts::platform_blueprints(topic, niche),
            || mocks::platform_blueprints(topic, niche),
        )
        .await
    }

    pub async fn generate_captions(
        &self,
        topic: &str,
        platform: &str,
        tone: &str,
    ) -> Generated<Vec<String>> {
        self.generate_checked(
            "generate_captions",
            prompts::captions(topic, platform, tone),
            |captions: &Vec<String>| at_least(captions, MIN_SET_LEN),
            || mocks::captions(topic),
        )
        .await
    }

    pub async fn generate_hashtags(
        &self,
        topic: &str,
        niche: &str,
        count: Option<usize>,
    ) -> Generated<Vec<String>> {
        let count = clamp_count(count, DEFAULT_HASHTAG_COUNT, MAX_HASHTAG_COUNT);
        let live = self
            .fetch_json::<Vec<String>>(&prompts::hashtags(topic, niche, count))
            .await
            .map(|tags| normalize_hashtags(tags, count))
            .and_then(|tags| {
                tags.validate().map_err(GeminiError::InvalidShape)?;
                Ok(tags)
            });

        self.settle("generate_hashtags", live, || mocks::hashtags(topic, niche, count))
    }

    pub async fn generate_hook_variations(
        &self,
        topic: &str,
        count: Option<usize>,
    ) -> Generated<Vec<String>> {
        let count = clamp_count(count, DEFAULT_LIST_COUNT, MAX_LIST_COUNT);
        let mut out = self
            .generate_or_mock(
                "generate_hook_variations",
                prompts::hook_variations(topic, count),
                || mocks::hook_variations(topic, count),
            )
            .await;
        out.data.truncate(count);
        out
    }

    pub async fn generate_content_ideas(
        &self,
        niche: &str,
        count: Option<usize>,
    ) -> Generated<Vec<ContentIdea>> {
        let count = clamp_count(count, DEFAULT_LIST_COUNT, MAX_LIST_COUNT);
        let mut out = self
            .generate_or_mock(
                "generate_content_ideas",
                prompts::content_ideas(niche, count),
                || mocks::content_ideas(niche, count),
            )
            .await;
        out.data.truncate(count);
        out
    }

    /// prompt -> text -> JSON -> shape check, or the mock on any failure
    async fn generate_or_mock<T, M>(
        &self,
        operation: &'static str,
        prompt: String,
        mock: M,
    ) -> Generated<T>
    where
        T: DeserializeOwned + Validate,
        M: FnOnce() -> T,
    {
        self.generate_checked(operation, prompt, T::validate, mock).await
    }

    /// Like `generate_or_mock` with a caller-supplied shape check
    async fn generate_checked<T, C, M>(
        &self,
        operation: &'static str,
        prompt: String,
        check: C,
        mock: M,
    ) -> Generated<T>
    where
        T: DeserializeOwned,
        C: FnOnce(&T) -> Result<(), String>,
        M: FnOnce() -> T,
    {
        let live = self.fetch_json::<T>(&prompt).await.and_then(|data| {
            check(&data).map_err(GeminiError::InvalidShape)?;
            Ok(data)
        });
        self.settle(operation, live, mock)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, GeminiError> {
        let text = self.generator.generate_text(prompt).await?;
        extract_json(&text)
    }

    fn settle<T, M>(
        &self,
        operation: &'static str,
        live: Result<T, GeminiError>,
        mock: M,
    ) -> Generated<T>
    where
        M: FnOnce() -> T,
    {
        match live {
            Ok(data) => {
                info!(operation, "Generated live content");
                Generated::live(data)
            }
            Err(GeminiError::MissingApiKey) => {
                debug!(operation, "No Gemini key configured, serving mock content");
                Generated::mock(mock())
            }
            Err(e) => {
                warn!(operation, error = %e, "Generation failed, serving mock content");
                Generated::mock(mock())
            }
        }
    }
}

fn clamp_count(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max)
}

/// `#`-prefixed, whitespace-free, case-insensitively unique, at most `count`
pub fn normalize_hashtags(tags: Vec<String>, count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|tag| {
            let body: String = tag
                .trim()
                .trim_start_matches('#')
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if body.is_empty() {
                None
            } else {
                Some(format!("#{}", body))
            }
        })
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio_test::assert_ok;

    use super::*;
    use crate::content::types::Source;

    /// Returns a canned response and counts calls
    struct Canned {
        reply: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(text.to_string()), calls: AtomicUsize::new(0) })
        }

        fn status(code: u16) -> Arc<Self> {
            Arc::new(Self { reply: Err(code), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate_text(&self, _prompt: &str) -> Result<String, GeminiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(GeminiError::Api { status: *status, body: "boom".into() }),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    struct NoKey;

    #[async_trait]
    impl TextGenerator for NoKey {
        async fn generate_text(&self, _prompt: &str) -> Result<String, GeminiError> {
            Err(GeminiError::MissingApiKey)
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn no_key_returns_documented_mock_shapes() {
        let service = ContentService::new(Arc::new(NoKey));
        assert!(!service.is_live());

        let analysis = service.analyze_idea("3 habits for better sleep", "wellness").await;
        assert_eq!(analysis.source, Source::Mock);
        assert_ok!(analysis.data.validate());

        let bios = service.generate_vision_bios("fitness", "strength for everyone", "bold").await;
        assert!(bios.is_mock());
        assert_eq!(bios.data.len(), 3);

        let blueprint = service.generate_blueprint("cold plunges", "wellness", None).await;
        assert!(blueprint.is_mock());
        assert_ok!(blueprint.data.validate());

        let split = service.generate_platform_blueprints("cold plunges", "wellness").await;
        assert!(split.is_mock());

        let captions = service.generate_captions("budgeting", "instagram", "warm").await;
        assert_eq!(captions.data.len(), 3);

        let tags = service.generate_hashtags("budgeting", "finance", None).await;
        assert_eq!(tags.data.len(), DEFAULT_HASHTAG_COUNT);
        assert!(tags.data.iter().all(|t| t.starts_with('#')));

        let hooks = service.generate_hook_variations("budgeting", Some(50)).await;
        assert_eq!(hooks.data.len(), MAX_LIST_COUNT);

        let ideas = service.generate_content_ideas("finance", Some(0)).await;
        assert_eq!(ideas.data.len(), 1);
    }

    #[tokio::test]
    async fn live_json_is_used_when_valid() {
        let generator = Canned::ok(
            "```json\n{\"hook\":\"Wait.\",\"meat\":\"Do this.\",\"cta\":\"Follow.\",\"setup_tip\":\"Light.\"}\n```",
        );
        let service = ContentService::new(generator.clone());

        let out = service.generate_blueprint("sleep", "wellness", Some(30)).await;
        assert_eq!(out.source, Source::Live);
        assert_eq!(out.data.hook, "Wait.");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unparsable_text_falls_back() {
        let service = ContentService::new(Canned::ok("I'd rather not."));
        let out = service.generate_captions("sleep", "tiktok", "calm").await;
        assert!(out.is_mock());
        assert_eq!(out.data, mocks::captions("sleep"));
    }

    #[tokio::test]
    async fn http_error_falls_back() {
        let service = ContentService::new(Canned::status(503));
        let out = service.analyze_idea("idea", "niche").await;
        assert!(out.is_mock());
    }

    #[tokio::test]
    async fn wrong_shape_falls_back() {
        let service = ContentService::new(Canned::ok(r#"{"score": 100, "verdict": "   "}"#));
        let out = service.analyze_idea("idea", "niche").await;
        assert!(out.is_mock());

        let service = ContentService::new(Canned::ok("[]"));
        let out = service.generate_hook_variations("topic", None).await;
        assert!(out.is_mock());
        assert_eq!(out.data.len(), DEFAULT_LIST_COUNT);
    }

    #[tokio::test]
    async fn short_bio_and_caption_sets_fall_back() {
        let service = ContentService::new(Canned::ok(r#"["only one caption"]"#));
        let out = service.generate_captions("sleep", "tiktok", "calm").await;
        assert!(out.is_mock());
        assert_eq!(out.data, mocks::captions("sleep"));

        let service = ContentService::new(Canned::ok(r#"[{"platform":"tiktok","text":"hi"}]"#));
        let out = service.generate_vision_bios("fitness", "strength", "bold").await;
        assert!(out.is_mock());
        assert_eq!(out.data.len(), 3);
    }

    #[tokio::test]
    async fn bios_repeating_a_platform_fall_back() {
        let service = ContentService::new(Canned::ok(
            r#"[{"platform":"tiktok","text":"a"},{"platform":"tiktok","text":"b"},{"platform":"tiktok","text":"c"}]"#,
        ));
        let out = service.generate_vision_bios("fitness", "strength", "bold").await;
        assert!(out.is_mock());
    }

    #[tokio::test]
    async fn full_live_sets_are_kept() {
        let service = ContentService::new(Canned::ok(
            r#"[{"platform":"tiktok","text":"a"},{"platform":"instagram","text":"b"},{"platform":"youtube","text":"c"}]"#,
        ));
        let out = service.generate_vision_bios("fitness", "strength", "bold").await;
        assert_eq!(out.source, Source::Live);
        assert_eq!(out.data[1].platform, "instagram");

        let service = ContentService::new(Canned::ok(r#"["one", "two", "three"]"#));
        let out = service.generate_captions("sleep", "tiktok", "calm").await;
        assert_eq!(out.source, Source::Live);
    }

    #[tokio::test]
    async fn live_hashtags_are_normalized() {
        let service = ContentService::new(Canned::ok(
            r##"["fitness", "#Fitness", "# gym life", "", "#", "#HIIT"]"##,
        ));
        let out = service.generate_hashtags("workouts", "fitness", Some(10)).await;
        assert_eq!(out.source, Source::Live);
        assert_eq!(out.data, vec!["#fitness", "#gymlife", "#HIIT"]);
    }

    #[tokio::test]
    async fn hashtags_that_normalize_to_nothing_fall_back() {
        let service = ContentService::new(Canned::ok(r##"["#", "  "]"##));
        let out = service.generate_hashtags("workouts", "fitness", Some(4)).await;
        assert!(out.is_mock());
        assert_eq!(out.data.len(), 4);
    }

    #[tokio::test]
    async fn long_live_lists_are_truncated() {
        let service = ContentService::new(Canned::ok(r#"["a","b","c","d","e","f","g"]"#));
        let out = service.generate_hook_variations("topic", Some(2)).await;
        assert_eq!(out.source, Source::Live);
        assert_eq!(out.data, vec!["a", "b"]);
    }
}
