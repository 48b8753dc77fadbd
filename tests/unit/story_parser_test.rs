//! Unit tests for tolerant story parsing.

use wanderer::story::parser::{extract_json, parse_story, MAX_SEGMENT_SECONDS};
use wanderer::story::{Genre, StoryError};

const LLM_REPLY: &str = r#"Đây là câu chuyện của bạn:

```json
{
  "title": "Bóng ma phố cổ",
  "description": "Một đêm trên phố Đồng Khởi",
  "chapters": [
    {
      "title": "Khởi đầu",
      "content": "Đêm xuống trên con phố cũ.",
      "estimatedDuration": 180,
      "choices": [
        { "id": "choice_1", "text": "Theo tiếng bước chân", "consequence": "Bạn đi vào hẻm" },
        { "text": "Quay lại quảng trường" }
      ]
    },
    {
      "title": "Kết thúc",
      "content": "Bình minh lên.",
      "choices": [{ "id": "choice_9", "text": "Không nên có" }]
    }
  ]
}
```

Chúc bạn vui!"#;

#[test]
fn test_parses_fenced_reply() {
    let story = parse_story(LLM_REPLY, Genre::Horror).unwrap();

    assert_eq!(story.title, "Bóng ma phố cổ");
    assert_eq!(story.description, "Một đêm trên phố Đồng Khởi");
    assert_eq!(story.genre, Genre::Horror);
    assert_eq!(story.len(), 2);

    let first = &story.segments[0];
    assert_eq!(first.title.as_deref(), Some("Khởi đầu"));
    assert_eq!(first.duration_s, 180);
    assert_eq!(first.choices.len(), 2);
    assert_eq!(first.choices[1].id, "choice_1_2");

    // Terminal segment never branches
    assert!(story.segments[1].choices.is_empty());
    assert_eq!(story.segments[1].duration_s, 60);
    assert_eq!(story.total_duration_s, 240);
}

#[test]
fn test_long_content_extends_duration() {
    let words = vec!["chữ"; 500].join(" ");
    let reply = format!(r#"{{"title": "Dài", "segments": [{{"content": "{}", "duration": 30}}]}}"#, words);

    let story = parse_story(&reply, Genre::Adventure).unwrap();
    assert_eq!(story.segments[0].duration_s, 200);
}

#[test]
fn test_recovers_from_broken_json() {
    let reply = r#"{"title": "Chuyện dang dở", "chapters": [
        {"title": "Một", "content": "Nội dung một"},
        {"title": "Hai", "content": "Nội dung hai",
    "#;

    let story = parse_story(reply, Genre::Mystery).unwrap();
    assert_eq!(story.title, "Chuyện dang dở");
    assert_eq!(story.len(), 2);
    assert_eq!(story.segments[1].content, "Nội dung hai");
}

#[test]
fn test_refusal_is_parse_failure() {
    let err = parse_story("Xin lỗi, tôi không thể giúp.", Genre::Comedy).unwrap_err();
    assert!(matches!(err, StoryError::ParseFailure(_)));
}

#[test]
fn test_extract_json_span() {
    assert_eq!(extract_json("abc {\"a\": {\"b\": 1}} xyz"), Some("{\"a\": {\"b\": 1}}"));
    assert_eq!(extract_json("} nothing {"), None);
}

#[test]
fn test_oversized_durations_are_capped() {
    let reply = r#"{"title":"T","chapters":[{"content":"a","duration":4294967295},{"content":"b","duration":1e12}]}"#;
    let story = parse_story(reply, Genre::Adventure).unwrap();

    assert_eq!(story.segments[0].duration_s, MAX_SEGMENT_SECONDS);
    assert_eq!(story.segments[1].duration_s, MAX_SEGMENT_SECONDS);
    assert_eq!(story.total_duration_s, 2 * MAX_SEGMENT_SECONDS);
}
