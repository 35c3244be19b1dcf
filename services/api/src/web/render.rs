//! services/api/src/web/render.rs
//!
//! Renders flashcards as a static page of CSS flip cards: the question on the
//! front, the answer revealed on hover.

use html_escape::encode_safe;
use study_assistant_core::Flashcard;

const FLIP_CARD_STYLE: &str = r#"<style>
.container { display: flex; flex-wrap: wrap; gap: 15px; }
.card { width: 220px; height: 140px; perspective: 1000px; }
.inner {
    position: relative; width: 100%; height: 100%;
    transition: transform 0.6s; transform-style: preserve-3d; cursor: pointer;
}
.card:hover .inner { transform: rotateY(180deg); }
.front, .back {
    position: absolute; width: 100%; height: 100%;
    backface-visibility: hidden; border-radius: 10px;
    display: flex; align-items: center; justify-content: center;
    padding: 10px; font-size: 15px; text-align: center;
    box-shadow: 0 4px 8px rgba(0,0,0,0.2);
}
.front { background: #4CAF50; color: white; }
.back { background: #ffffff; color: black; transform: rotateY(180deg); border: 1px solid #ccc; }
</style>"#;

/// Builds a complete HTML document for the given cards.
pub fn flashcards_page(cards: &[Flashcard]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Flashcards</title>\n",
    );
    html.push_str(FLIP_CARD_STYLE);
    html.push_str("\n</head>\n<body>\n<div class=\"container\">\n");

    for card in cards {
        html.push_str(&format!(
            "<div class=\"card\"><div class=\"inner\"><div class=\"front\">{}</div><div class=\"back\">{}</div></div></div>\n",
            encode_safe(&card.question),
            encode_safe(&card.answer)
        ));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}
