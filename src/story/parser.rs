//! Tolerant parsing of LLM story responses.
//!
//! Models wrap their JSON in prose or markdown fences, name the segment list
//! `chapters` or `segments`, and sometimes emit JSON that does not parse at
//! all. The strict pass handles the first two; a regex pass recovers title and
//! content pairs from the rest.

use super::{Genre, Story, StoryChoice, StoryError, StorySegment};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Narration speed used to estimate segment length (words per second).
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Minimum segment duration when the model reports none (seconds).
pub const DEFAULT_SEGMENT_SECONDS: u32 = 60;

/// Ceiling for a model-reported segment duration (one hour).
pub const MAX_SEGMENT_SECONDS: u32 = 3600;

/// Parse a model response into a story.
pub fn parse_story(response: &str, genre: Genre) -> Result<Story, StoryError> {
    match parse_strict(response, genre) {
        Ok(story) => Ok(story),
        Err(strict_err) => {
            tracing::debug!("Strict story parse failed ({}), trying recovery", strict_err);
            parse_recovered(response, genre).ok_or(strict_err)
        }
    }
}

/// Cut the JSON object out of surrounding prose and code fences.
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

fn parse_strict(response: &str, genre: Genre) -> Result<Story, StoryError> {
    let unfenced = strip_fences(response);
    let json = extract_json(&unfenced)
        .ok_or_else(|| StoryError::ParseFailure("no JSON object in response".to_string()))?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| StoryError::ParseFailure(e.to_string()))?;

    let entries = value
        .get("segments")
        .or_else(|| value.get("chapters"))
        .and_then(Value::as_array)
        .ok_or_else(|| StoryError::ParseFailure("missing segments/chapters array".to_string()))?;

    if entries.is_empty() {
        return Err(StoryError::ParseFailure("story has no segments".to_string()));
    }

    let last = entries.len() - 1;
    let segments = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| segment_from_value(i, entry, i < last))
        .collect();

    Ok(Story::new(
        str_field(&value, "title").unwrap_or_else(|| default_title(genre)),
        str_field(&value, "description").unwrap_or_default(),
        genre,
        segments,
    ))
}

fn segment_from_value(index: usize, entry: &Value, allow_choices: bool) -> StorySegment {
    let content = str_field(entry, "content").unwrap_or_else(|| format!("Chương {}", index + 1));
    let reported = ["duration", "estimatedDuration"]
        .iter()
        .find_map(|k| entry.get(*k).and_then(Value::as_f64))
        .filter(|d| *d > 0.0)
        .map(|d| d.round().min(MAX_SEGMENT_SECONDS as f64) as u32);

    let choices = if allow_choices {
        entry
            .get("choices")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .enumerate()
                    .filter_map(|(k, c)| choice_from_value(index, k, c))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    StorySegment {
        id: format!("segment_{}", index + 1),
        title: str_field(entry, "title"),
        duration_s: segment_duration(reported, &content),
        content,
        checkpoint_id: None,
        choices,
    }
}

fn choice_from_value(segment: usize, k: usize, value: &Value) -> Option<StoryChoice> {
    let text = str_field(value, "text")?;
    Some(StoryChoice {
        id: str_field(value, "id").unwrap_or_else(|| format!("choice_{}_{}", segment + 1, k + 1)),
        text,
        consequence: str_field(value, "consequence").unwrap_or_default(),
    })
}

/// `max(reported or 60, words / 2.5)`
pub fn segment_duration(reported: Option<u32>, content: &str) -> u32 {
    let words = content.split_whitespace().count() as f64;
    let spoken = (words / WORDS_PER_SECOND).floor() as u32;
    reported.unwrap_or(DEFAULT_SEGMENT_SECONDS).max(spoken)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn default_title(genre: Genre) -> String {
    format!("Câu chuyện {}", genre)
}

fn strip_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn title_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#""title"\s*:\s*"([^"]+)""#).ok())
        .as_ref()
}

fn chapter_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r#""title"\s*:\s*"([^"]+)"[^}]*?"content"\s*:\s*"([^"]+)""#).ok()
        })
        .as_ref()
}

fn description_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#""description"\s*:\s*"([^"]+)""#).ok())
        .as_ref()
}

/// Regex recovery for responses that are not valid JSON.
fn parse_recovered(response: &str, genre: Genre) -> Option<Story> {
    let title = title_pattern()?.captures(response)?.get(1)?.as_str().to_string();
    let description = description_pattern()
        .and_then(|re| re.captures(response))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let segments: Vec<StorySegment> = chapter_pattern()?
        .captures_iter(response)
        .enumerate()
        .filter_map(|(i, caps)| {
            let content = caps.get(2)?.as_str().trim().to_string();
            Some(StorySegment {
                id: format!("segment_{}", i + 1),
                title: None,
                duration_s: segment_duration(None, &content),
                content,
                checkpoint_id: None,
                choices: Vec::new(),
            })
        })
        .collect();

    if segments.is_empty() {
        return None;
    }

    tracing::info!("Recovered {} segment(s) from malformed story JSON", segments.len());
    Some(Story::new(title, description, genre, segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTERS: &str = r#"{
        "title": "Bí ẩn phố cổ",
        "description": "Một đêm kỳ lạ",
        "chapters": [
            { "title": "Khởi đầu", "content": "Một hai ba bốn năm", "estimatedDuration": 90 },
            { "title": "Kết thúc", "content": "Sáu bảy" }
        ]
    }"#;

    #[test]
    fn test_parse_chapters_shape() {
        let story = parse_story(CHAPTERS, Genre::Mystery).unwrap();
        assert_eq!(story.title, "Bí ẩn phố cổ");
        assert_eq!(story.description, "Một đêm kỳ lạ");
        assert_eq!(story.segments.len(), 2);
        assert_eq!(story.segments[0].title.as_deref(), Some("Khởi đầu"));
        assert_eq!(story.segments[0].duration_s, 90);
        assert_eq!(story.segments[1].duration_s, 60);
        assert_eq!(story.genre, Genre::Mystery);
    }

    #[test]
    fn test_parse_fenced_and_prose_wrapped() {
        let wrapped = format!(
            "Đây là câu chuyện của bạn:\n```json\n{}\n```\nChúc vui vẻ!",
            CHAPTERS
        );
        let story = parse_story(&wrapped, Genre::Mystery).unwrap();
        assert_eq!(story.segments.len(), 2);
    }

    #[test]
    fn test_segments_shape_with_choices() {
        let response = r#"{
            "title": "Rừng thiêng",
            "segments": [
                { "content": "Mở đầu", "duration": 120, "choices": [
                    { "id": "choice_1", "text": "Rẽ trái", "consequence": "Rừng" },
                    { "text": "Rẽ phải" }
                ]},
                { "content": "Kết", "choices": [ { "id": "x", "text": "ignored" } ] }
            ]
        }"#;
        let story = parse_story(response, Genre::Fantasy).unwrap();

        let first = &story.segments[0];
        assert_eq!(first.choices.len(), 2);
        assert_eq!(first.choices[0].id, "choice_1");
        assert_eq!(first.choices[1].id, "choice_1_2");
        assert!(story.segments[1].choices.is_empty());
    }

    #[test]
    fn test_duration_grows_with_long_content() {
        let content = vec!["từ"; 500].join(" ");
        assert_eq!(segment_duration(Some(60), &content), 200);
        assert_eq!(segment_duration(None, "ngắn"), 60);
    }

    #[test]
    fn test_recovery_from_malformed_json() {
        // Trailing comma and unescaped newline break strict parsing
        let response = "{\"title\": \"Phố đêm\", \"chapters\": [{\"title\": \"Một\", \"content\": \"Đoạn một\"}, {\"title\": \"Hai\", \"content\": \"Đoạn\nhai\"},]}";
        let story = parse_story(response, Genre::Horror).unwrap();
        assert_eq!(story.title, "Phố đêm");
        assert_eq!(story.segments.len(), 2);
        assert_eq!(story.segments[0].content, "Đoạn một");
    }

    #[test]
    fn test_unparseable_responses_fail() {
        assert!(matches!(
            parse_story("Xin lỗi, tôi không thể giúp.", Genre::Adventure),
            Err(StoryError::ParseFailure(_))
        ));
        assert!(matches!(
            parse_story(r#"{"title": "Rỗng", "chapters": []}"#, Genre::Adventure),
            Err(StoryError::ParseFailure(_))
        ));
    }
}
