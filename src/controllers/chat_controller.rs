//! Stateless FAQ chatbot: keyword scoring over the knowledge base.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ApiError,
    locale::{Locale, pick},
    static_data::ChatKnowledge,
    store::JsonStore,
    utils::normalize_text,
};

const KNOWLEDGE_DOCUMENT: &str = "chatbot";
const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

fn parse_locale(raw: Option<&str>) -> Result<Locale, ApiError> {
    match raw.map(str::trim).filter(|l| !l.is_empty()) {
        None => Ok(Locale::Id),
        Some(l) => l
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Locale {l} tidak didukung"))),
    }
}

/// The edited knowledge base from the data directory, or the built-in one
/// when none has been saved.
async fn knowledge(store: &JsonStore) -> Result<ChatKnowledge, ApiError> {
    let saved: ChatKnowledge = store.load_document(KNOWLEDGE_DOCUMENT).await?;
    if saved.entries.is_empty() {
        return Ok(ChatKnowledge::builtin());
    }

    let builtin = ChatKnowledge::builtin();
    Ok(ChatKnowledge {
        suggestions: if saved.suggestions.is_empty() { builtin.suggestions } else { saved.suggestions },
        fallback: if saved.fallback.trim().is_empty() { builtin.fallback } else { saved.fallback },
        fallback_en: saved.fallback_en.or(builtin.fallback_en),
        entries: saved.entries,
    })
}

/// Number of keywords of an entry found as whole words in `message`.
fn score(message: &str, keywords: &[String]) -> usize {
    let padded = format!(" {message} ");
    keywords
        .iter()
        .map(|k| normalize_text(k))
        .filter(|k| !k.is_empty() && padded.contains(&format!(" {k} ")))
        .count()
}

/// Answer of the best-scoring entry, the fallback when nothing matches.
/// Ties go to the entry listed first.
pub fn answer(kb: &ChatKnowledge, message: &str, locale: Locale) -> String {
    let message = normalize_text(message);

    let best = kb
        .entries
        .iter()
        .map(|entry| (score(&message, &entry.keywords), entry))
        .filter(|(hits, _)| *hits > 0)
        .fold(None, |best: Option<(usize, _)>, (hits, entry)| match best {
            Some((top, _)) if top >= hits => best,
            _ => Some((hits, entry)),
        });

    match best {
        Some((_, entry)) => pick(locale, &entry.answer, entry.answer_en.as_deref()).to_string(),
        None => pick(locale, &kb.fallback, kb.fallback_en.as_deref()).to_string(),
    }
}

#[post("/api/chat")]
pub async fn chat(
    body: web::Json<ChatRequest>,
    store: web::Data<JsonStore>,
) -> Result<HttpResponse, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("Pesan tidak boleh kosong"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::bad_request("Pesan terlalu panjang"));
    }
    let locale = parse_locale(body.locale.as_deref())?;

    let kb = knowledge(&store).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "answer": answer(&kb, message, locale),
    })))
}

#[get("/api/chat/suggestions")]
pub async fn suggestions(
    query: web::Query<LocaleQuery>,
    store: web::Data<JsonStore>,
) -> Result<HttpResponse, ApiError> {
    let locale = parse_locale(query.locale.as_deref())?;
    let kb = knowledge(&store).await?;

    let texts: Vec<&str> = kb
        .suggestions
        .iter()
        .map(|s| pick(locale, &s.text, s.text_en.as_deref()))
        .collect();
    Ok(HttpResponse::Ok().json(texts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_data::FaqEntry;

    fn kb() -> ChatKnowledge {
        ChatKnowledge {
            entries: vec![
                FaqEntry {
                    keywords: vec!["biaya".into(), "kuliah".into()],
                    answer: "Lihat halaman biaya.".into(),
                    answer_en: Some("See the tuition page.".into()),
                },
                FaqEntry {
                    keywords: vec!["beasiswa".into(), "biaya kuliah gratis".into()],
                    answer: "Ada beasiswa.".into(),
                    answer_en: None,
                },
            ],
            fallback: "Maaf.".into(),
            fallback_en: Some("Sorry.".into()),
            ..Default::default()
        }
    }

    #[test]
    fn best_scoring_entry_wins() {
        assert_eq!(answer(&kb(), "Berapa BIAYA kuliah?", Locale::Id), "Lihat halaman biaya.");
        assert_eq!(answer(&kb(), "Info beasiswa dong", Locale::Id), "Ada beasiswa.");
    }

    #[test]
    fn english_answer_falls_back_to_indonesian() {
        assert_eq!(answer(&kb(), "biaya", Locale::En), "See the tuition page.");
        assert_eq!(answer(&kb(), "beasiswa", Locale::En), "Ada beasiswa.");
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "biayanya" must not count as "biaya"
        assert_eq!(answer(&kb(), "biayanya", Locale::En), "Sorry.");
    }

    #[test]
    fn builtin_knowledge_answers_admission_questions() {
        let kb = ChatKnowledge::builtin();
        let reply = answer(&kb, "Bagaimana cara pendaftaran?", Locale::Id);
        assert!(reply.contains("PMB"));
    }

    #[test]
    fn locale_parsing() {
        assert_eq!(parse_locale(None).unwrap(), Locale::Id);
        assert_eq!(parse_locale(Some("EN")).unwrap(), Locale::En);
        assert!(parse_locale(Some("fr")).is_err());
    }
}
