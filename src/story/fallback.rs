//! Deterministic stories for when the LLM is unavailable.

use super::{Genre, Story, StoryChoice, StoryRequest, StorySegment};
use serde::{Deserialize, Serialize};

/// Which fallback generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStyle {
    /// Exactly one segment per checkpoint
    #[default]
    RouteAware,
    /// Between three and five long segments regardless of checkpoints
    Simplified,
}

/// Segment count bounds for the simplified generator.
const SIMPLIFIED_MIN_SEGMENTS: usize = 3;
const SIMPLIFIED_MAX_SEGMENTS: usize = 5;

/// Build the fallback story for a request.
pub fn fallback_story(style: FallbackStyle, request: &StoryRequest) -> Story {
    match style {
        FallbackStyle::RouteAware => route_aware_story(request),
        FallbackStyle::Simplified => simplified_story(request),
    }
}

/// One segment per checkpoint, each non-terminal segment offering the
/// "continue ahead" / "explore surroundings" pair.
pub fn route_aware_story(request: &StoryRequest) -> Story {
    let count = request.checkpoints.len();
    let lines = segment_lines(request.genre);
    let duration_s = per_segment_seconds(request.estimated_minutes, count);

    let segments = (0..count)
        .map(|i| StorySegment {
            id: format!("segment_{}", i + 1),
            title: Some(request.checkpoints[i].title.clone()),
            content: lines[i.min(lines.len() - 1)].to_string(),
            duration_s,
            checkpoint_id: None,
            choices: if i + 1 < count {
                default_choices(i)
            } else {
                Vec::new()
            },
        })
        .collect();

    Story::new(route_aware_title(request.genre), "", request.genre, segments)
        .bind_checkpoints(&request.checkpoint_ids())
}

/// Three to five long, genre-templated segments.
pub fn simplified_story(request: &StoryRequest) -> Story {
    let count = request
        .checkpoints
        .len()
        .clamp(SIMPLIFIED_MIN_SEGMENTS, SIMPLIFIED_MAX_SEGMENTS);
    let template = simplified_template(request.genre);
    let duration_s = per_segment_seconds(request.estimated_minutes, count);

    let segments = (0..count)
        .map(|i| StorySegment {
            id: format!("segment_{}", i + 1),
            title: None,
            content: format!("{}\n\n{}", template.intro, filler(i)),
            duration_s,
            checkpoint_id: None,
            choices: if i + 1 < count {
                default_choices(i)
            } else {
                Vec::new()
            },
        })
        .collect();

    Story::new(template.title, template.description, request.genre, segments)
        .bind_checkpoints(&request.checkpoint_ids())
}

fn per_segment_seconds(estimated_minutes: u32, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    estimated_minutes * 60 / count as u32
}

fn default_choices(segment: usize) -> Vec<StoryChoice> {
    vec![
        StoryChoice {
            id: format!("choice_{}", segment * 2 + 1),
            text: "Đi theo con đường phía trước".to_string(),
            consequence: "Bạn tiếp tục cuộc hành trình một cách bình thường".to_string(),
        },
        StoryChoice {
            id: format!("choice_{}", segment * 2 + 2),
            text: "Khám phá khu vực xung quanh".to_string(),
            consequence: "Bạn khám phá thêm những điều thú vị ở khu vực này".to_string(),
        },
    ]
}

fn route_aware_title(genre: Genre) -> &'static str {
    match genre {
        Genre::Adventure => "Cuộc phiêu lưu thú vị",
        Genre::Mystery => "Bí ẩn cần giải mã",
        Genre::Fantasy => "Thế giới phép thuật",
        Genre::Historical => "Hành trình xuyên thời gian",
        Genre::Comedy => "Chuyến đi vui nhộn",
        Genre::Romance => "Câu chuyện tình yêu trên phố",
        Genre::SciFi => "Tương lai trong tầm tay",
        Genre::Horror => "Những bóng ma trong đêm",
    }
}

/// Opening, middle and closing lines per genre.
fn segment_lines(genre: Genre) -> [&'static str; 3] {
    match genre {
        Genre::Adventure => [
            "Bạn đang bước vào một cuộc phiêu lưu đầy thú vị. Trước mặt bạn là một con đường dẫn đến những điều bất ngờ. Từng bước chân của bạn đều mang theo sự háo hức và mong đợi về những điều kỳ diệu sắp xảy ra.",
            "Cuộc hành trình tiếp tục với những cảnh quan tuyệt đẹp xung quanh. Bạn cảm nhận được sự thay đổi trong không khí, báo hiệu rằng điều gì đó đặc biệt đang chờ đợi phía trước.",
            "Khi bạn tiến gần đến đích, tâm trạng trở nên phấn khích hơn bao giờ hết. Cuộc phiêu lưu này đã mang lại cho bạn những trải nghiệm không thể quên.",
        ],
        Genre::Mystery => [
            "Một bí ẩn đang chờ đợi bạn giải mã. Những manh mối nhỏ bắt đầu xuất hiện xung quanh con đường bạn đi, từng chi tiết đều có thể là chìa khóa cho câu đố lớn.",
            "Bí ẩn ngày càng sâu sắc khi bạn tiến xa hơn. Những dấu hiệu kỳ lạ xuất hiện thường xuyên hơn, khiến bạn phải suy nghĩ và phân tích mọi thứ cẩn thận.",
            "Cuối cùng, mảnh ghép cuối cùng của bí ẩn đã được tìm thấy. Sự thật được hé lộ một cách bất ngờ và thú vị.",
        ],
        Genre::Fantasy => [
            "Bạn bước vào một thế giới kỳ diệu nơi phép thuật và những sinh vật huyền bí tồn tại. Không khí tràn ngập năng lượng ma thuật, từng bước đi đều có thể dẫn đến những cuộc gặp gỡ phi thường.",
            "Thế giới phép thuật ngày càng mở ra trước mắt bạn. Những sinh vật thân thiện xuất hiện để chỉ đường, và bạn học được những phép thuật nhỏ để hỗ trợ cuộc hành trình.",
            "Cuộc phiêu lưu trong thế giới kỳ diệu kết thúc với một điều ước được thực hiện. Bạn mang theo những kỷ niệm đẹp và sức mạnh mới.",
        ],
        Genre::Historical => [
            "Bạn đang du hành ngược thời gian, khám phá những câu chuyện lịch sử thú vị. Mỗi bước chân đều đưa bạn đến gần hơn với những sự kiện quan trọng đã định hình nên lịch sử.",
            "Hành trình lịch sử tiếp tục với những khám phá mới về quá khứ. Bạn như được chứng kiến những khoảnh khắc lịch sử quan trọng diễn ra trước mắt.",
            "Cuộc du hành thời gian kết thúc với những hiểu biết sâu sắc về lịch sử và những bài học quý giá cho hiện tại.",
        ],
        Genre::Comedy => [
            "Một cuộc phiêu lưu vui nhộn đang chờ đợi bạn! Những tình huống hài hước bắt đầu xảy ra ngay từ những bước đầu tiên, khiến bạn không thể nhịn được cười.",
            "Cuộc hành trình trở nên thú vị hơn với những nhân vật hài hước và những tình huống dở khóc dở cười. Tiếng cười vang vọng khắp con đường.",
            "Cuối cùng, cuộc phiêu lưu hài hước kết thúc với một màn biểu diễn tuyệt vời, khiến tất cả mọi người đều bật cười không ngừng.",
        ],
        Genre::Romance => [
            "Khi bước chân trên con đường này, bạn như được quay về những kỷ niệm đẹp về tình yêu. Một ánh mắt thoáng qua bên góc phố khiến tim bạn khẽ rung động.",
            "Những con phố quen thuộc bỗng trở nên dịu dàng hơn. Bạn nhận ra mỗi góc đường đều giữ lại một câu chuyện của những người từng yêu nhau.",
            "Hành trình khép lại trong ánh chiều ấm áp. Bạn mang theo một cảm giác bình yên và những kỷ niệm ngọt ngào.",
        ],
        Genre::SciFi => [
            "Công nghệ tương lai đang chờ đợi bạn khám phá. Những tín hiệu lạ phát ra từ các tòa nhà quanh bạn, như thể thành phố đang cố gửi một thông điệp.",
            "Càng đi xa, bạn càng thấy rõ những dấu vết của một phát minh kỳ diệu. Các cỗ máy lặng lẽ vận hành, dẫn lối bạn đến điểm tiếp theo.",
            "Cuối hành trình, thông điệp đã được giải mã. Bạn hiểu rằng tương lai nằm ngay trong những bước chân hôm nay.",
        ],
        Genre::Horror => [
            "Khi màn đêm buông xuống, những bí ẩn đáng sợ bắt đầu hiện ra. Tiếng bước chân của bạn vang vọng trên con phố vắng, và hình như có ai đó đang đi theo.",
            "Những bóng đen lướt qua bên khóe mắt. Bạn bước nhanh hơn, cố gắng không ngoái đầu nhìn lại.",
            "Ánh đèn phía trước hiện ra, xua tan bóng tối. Bạn thở phào, nhưng vẫn mang theo cảm giác rờn rợn của đêm nay.",
        ],
    }
}

struct SimplifiedTemplate {
    title: &'static str,
    description: &'static str,
    intro: &'static str,
}

fn simplified_template(genre: Genre) -> SimplifiedTemplate {
    let (title, description, intro) = match genre {
        Genre::Adventure => (
            "Cuộc phiêu lưu đô thị",
            "Một cuộc phiêu lưu thú vị giữa lòng thành phố",
            "Bạn đang bắt đầu một cuộc phiêu lưu thú vị. Mỗi bước chân đều mang đến những khám phá mới...",
        ),
        Genre::Romance => (
            "Câu chuyện tình yêu trên phố",
            "Một câu chuyện tình yêu ngọt ngào diễn ra trong hành trình của bạn",
            "Khi bước chân trên con đường này, bạn như được quay về những kỷ niệm đẹp về tình yêu...",
        ),
        Genre::Mystery => (
            "Bí ẩn trong thành phố",
            "Một câu chuyện bí ẩn chờ đợi được khám phá",
            "Có điều gì đó kỳ lạ đang xảy ra ở khu vực này. Những manh mối bí ẩn xuất hiện từng bước...",
        ),
        Genre::Comedy => (
            "Những điều vui nhộn trên đường",
            "Một cuộc phiêu lưu đầy tiếng cười",
            "Hành trình này sẽ mang đến cho bạn những khoảnh khắc vui nhộn và bất ngờ...",
        ),
        Genre::Horror => (
            "Những bóng ma trong đêm",
            "Một câu chuyện đáng sợ trong bóng tối",
            "Khi màn đêm buông xuống, những bí ẩn đáng sợ bắt đầu hiện ra...",
        ),
        Genre::Fantasy => (
            "Vương quốc phép thuật",
            "Một cuộc phiêu lưu đầy ma thuật",
            "Phép thuật cổ xưa đang thức dậy xung quanh bạn. Những sinh vật kỳ bí xuất hiện...",
        ),
        Genre::SciFi => (
            "Tương lai trong tầm tay",
            "Một cuộc phiêu lưu khoa học viễn tưởng",
            "Công nghệ tương lai đang chờ đợi bạn khám phá. Những phát minh kỳ diệu xuất hiện...",
        ),
        Genre::Historical => (
            "Dấu chân lịch sử",
            "Một hành trình ngược dòng thời gian",
            "Những con phố này đã chứng kiến bao thăng trầm của lịch sử. Mỗi bước chân đưa bạn về quá khứ...",
        ),
    };

    SimplifiedTemplate {
        title,
        description,
        intro,
    }
}

fn filler(index: usize) -> String {
    format!(
        "Đây là phần {} của hành trình đầy thú vị này. Khi bạn bước đi trên con đường này, hãy để tâm hồn mình thả lỏng và cảm nhận từng khoảnh khắc. Những ngôi nhà xung quanh như đang thì thầm kể những câu chuyện cũ, những con phố quen thuộc bỗng trở nên bí ẩn dưới ánh sáng mới.\n\n\
Gió nhẹ thổi qua, mang theo hương thơm của những bông hoa nở rộ ven đường. Tiếng chân bước của bạn tạo nên nhịp điệu đều đặn, như một bản nhạc du dương hòa quyện với âm thanh của thành phố.\n\n\
Hãy tiếp tục bước đi để khám phá những điều kỳ diệu đang chờ đợi phía trước. Câu chuyện còn dài, và mỗi điểm đến sẽ mang đến cho bạn những trải nghiệm đáng nhớ khác nhau.",
        index + 1
    )
}
