//! Story generation with key rotation and deterministic fallback.

use super::client::{CompletionProvider, GroqClient};
use super::fallback::{fallback_story, FallbackStyle};
use super::{parser, Story, StoryError, StoryRequest};
use crate::credentials::SharedRotator;
use crate::http::ProviderError;
use serde::{Deserialize, Serialize};

/// Generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub fallback: FallbackStyle,
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.8,
            fallback: FallbackStyle::RouteAware,
        }
    }
}

/// Generates one story per walk. Never fails.
pub struct StoryGenerator<C = GroqClient> {
    client: Option<C>,
    rotator: SharedRotator,
    settings: StorySettings,
}

impl StoryGenerator {
    /// Generator with no LLM client; every story comes from the fallback.
    pub fn new(rotator: SharedRotator, settings: StorySettings) -> Self {
        Self {
            client: None,
            rotator,
            settings,
        }
    }
}

impl<C: CompletionProvider> StoryGenerator<C> {
    pub fn with_client<C2: CompletionProvider>(self, client: C2) -> StoryGenerator<C2> {
        StoryGenerator {
            client: Some(client),
            rotator: self.rotator,
            settings: self.settings,
        }
    }

    pub fn settings(&self) -> &StorySettings {
        &self.settings
    }

    /// The LLM client, if one is configured.
    pub fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    /// Generate a story bound to the request's checkpoints.
    ///
    /// Missing keys, exhausted keys, provider failures and unparseable
    /// responses all degrade to the deterministic fallback story.
    pub async fn generate(&self, request: &StoryRequest) -> Story {
        match self.try_generate(request).await {
            Ok(story) => {
                tracing::info!(
                    "Generated story '{}' with {} segment(s)",
                    story.title,
                    story.len()
                );
                story
            }
            Err(e) => {
                tracing::warn!("Story generation failed, using fallback story: {}", e);
                self.fallback(request)
            }
        }
    }

    /// The deterministic story for a request.
    pub fn fallback(&self, request: &StoryRequest) -> Story {
        fallback_story(self.settings.fallback, request)
    }

    /// Generate via the LLM only, surfacing the failure.
    pub async fn try_generate(&self, request: &StoryRequest) -> Result<Story, StoryError> {
        let client = self.client.as_ref().ok_or_else(|| {
            StoryError::Provider(ProviderError::InvalidRequest(
                "no story provider configured".to_string(),
            ))
        })?;
        let kind = client.provider();

        self.rotator.lock().await.reset(kind);
        let prompt = build_prompt(request);

        loop {
            let key = self
                .rotator
                .lock()
                .await
                .current_key(kind)
                .map(str::to_string)
                .map_err(ProviderError::from)?;

            match client
                .complete(
                    &key,
                    &prompt,
                    self.settings.max_tokens,
                    self.settings.temperature,
                )
                .await
            {
                Ok(text) => {
                    self.rotator.lock().await.record_request(kind);
                    let story = parser::parse_story(&text, request.genre)?;
                    return Ok(story.bind_checkpoints(&request.checkpoint_ids()));
                }
                Err(e) => {
                    let stats = self.rotator.lock().await.stats(kind);
                    tracing::warn!(
                        "{} key {}/{} failed: {}",
                        kind,
                        stats.current,
                        stats.total,
                        e
                    );
                    if !self.rotator.lock().await.advance(kind) {
                        return Err(e.into());
                    }
                }
            }
        }
    }
}

/// Prompt asking for a JSON story with one chapter per checkpoint.
pub fn build_prompt(request: &StoryRequest) -> String {
    let chapters = request.checkpoints.len().max(1);
    let minutes_per_chapter = (request.estimated_minutes as usize / chapters).max(1);
    let words_per_chapter = minutes_per_chapter * 150;
    let stops = request
        .checkpoints
        .iter()
        .enumerate()
        .map(|(i, c)| format!("  {}. {} ({})", i + 1, c.title, c.coordinate))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Hãy tạo {genre_desc} bằng tiếng Việt cho một chuyến đi bộ.\n\n\
THÔNG TIN TUYẾN ĐƯỜNG:\n\
- Thể loại: {genre}\n\
- Khoảng cách: {km:.1}km\n\
- Thời gian ước tính: {minutes} phút\n\
- Số điểm đến: {chapters} điểm\n\
{stops}\n\n\
YÊU CẦU:\n\
1. Chia câu chuyện thành {chapters} chương tương ứng với các điểm trên tuyến đường\n\
2. Mỗi chương dài khoảng {minutes_per_chapter} phút kể (khoảng {words_per_chapter} từ)\n\
3. Tại mỗi điểm trừ điểm cuối, đưa ra 2 lựa chọn hướng đi khác nhau\n\
4. Câu chuyện phải liên kết chặt chẽ giữa các chương\n\n\
ĐỊNH DẠNG TRẢ LỜI (chỉ JSON, không có text nào khác):\n\
{{\n\
  \"title\": \"Tên câu chuyện\",\n\
  \"description\": \"Mô tả ngắn\",\n\
  \"chapters\": [\n\
    {{\n\
      \"title\": \"Tên chương\",\n\
      \"content\": \"Nội dung chương\",\n\
      \"estimatedDuration\": {seconds},\n\
      \"choices\": [{{ \"id\": \"choice_1\", \"text\": \"Lựa chọn\", \"consequence\": \"Hệ quả\" }}]\n\
    }}\n\
  ]\n\
}}",
        genre_desc = request.genre.prompt_description(),
        genre = request.genre,
        km = request.distance_m / 1000.0,
        minutes = request.estimated_minutes,
        chapters = chapters,
        stops = stops,
        minutes_per_chapter = minutes_per_chapter,
        words_per_chapter = words_per_chapter,
        seconds = minutes_per_chapter * 60,
    )
}
