//! Locally built template used when the service cannot be reached.
//!
//! Pure functions only: the title is picked by keyword from the request text
//! and everything else comes from a fixed cafe-order layout.

use crate::studio::core::ids::TemplateId;
use crate::studio::core::template::{
    Classification, Template, TemplateButton, TemplateVariable,
};

/// Title used for cafe requests.
pub const CAFE_TITLE: &str = "카페 주문 완료 알림";
/// Title used for reservation requests.
pub const RESERVATION_TITLE: &str = "예약 확인 알림";
/// Title used for delivery requests.
pub const DELIVERY_TITLE: &str = "배송 완료 알림";
/// Title used when no keyword matches.
pub const GENERIC_TITLE: &str = "알림톡 템플릿";

/// Keyword table, checked in order; the first hit wins.
const TITLE_RULES: &[(&[&str], &str)] = &[
    (&["카페", "cafe"], CAFE_TITLE),
    (&["예약", "reservation"], RESERVATION_TITLE),
    (&["배송", "delivery"], DELIVERY_TITLE),
];

const FALLBACK_BODY: &str = "안녕하세요, #{고객명}님.\n\n주문이 완료되었습니다.\n\n주문 내용: #{주문내용}\n픽업 예정 시간: #{픽업시간}\n\n카페 #{카페이름}을 이용해주셔서 감사합니다.\n\n문의사항은 #{카페전화번호}로 연락 주세요.";

const FALLBACK_VARIABLES: [&str; 5] = ["픽업시간", "카페이름", "카페전화번호", "고객명", "주문내용"];

/// Pick the fallback title for `request_content`.
#[must_use]
pub fn fallback_title(request_content: &str) -> &'static str {
    let lowered = request_content.to_lowercase();
    TITLE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map_or(GENERIC_TITLE, |(_, title)| *title)
}

/// Build the fallback template for a request, with a fresh id.
#[must_use]
pub fn fallback_template(request_content: &str, user_id: i64) -> Template {
    let variables = FALLBACK_VARIABLES
        .iter()
        .zip(1_i64..)
        .map(|(key, id)| {
            let mut variable = TemplateVariable {
                id,
                key: (*key).to_string(),
                placeholder: String::new(),
                input_type: Some("TEXT".to_string()),
            };
            variable.placeholder = variable.token();
            variable
        })
        .collect();

    Template {
        id: TemplateId::new(),
        user_id: Some(user_id),
        category_id: Some("999999".to_string()),
        title: fallback_title(request_content).to_string(),
        content: FALLBACK_BODY.to_string(),
        image_url: None,
        message_type: Some("MESSAGE".to_string()),
        buttons: vec![TemplateButton {
            id: 1,
            label: "자세히 보기".to_string(),
            ordering: Some(1),
            url: Some("https://example.com".to_string()),
            link_and: None,
            link_ios: None,
        }],
        variables,
        industry: vec![Classification {
            id: 1,
            name: "기타".to_string(),
        }],
        purpose: vec![
            Classification {
                id: 1,
                name: "공지/안내".to_string(),
            },
            Classification {
                id: 2,
                name: "예약알림/리마인드".to_string(),
            },
        ],
    }
}
