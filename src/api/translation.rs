use crate::{
    error::ApiError,
    i18n::{self, Language},
};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct TranslationBundle {
    pub language: Language,
    #[schema(value_type = Object)]
    pub strings: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize, ToSchema)]
pub struct Translation {
    pub language: Language,
    #[schema(example = "markAttendance")]
    pub key: String,
    #[schema(example = "Mark Attendance")]
    pub text: String,
}

fn language(code: &str) -> Result<Language, ApiError> {
    Language::parse(code)
        .ok_or_else(|| ApiError::bad_request(format!("Unsupported language: {code}")))
}

/// All UI strings for a language
#[utoipa::path(
    get,
    path = "/api/i18n/{lang}",
    params(
        ("lang", Path, description = "Language code, en or si")
    ),
    responses(
        (status = 200, description = "Strings keyed by UI key", body = TranslationBundle),
        (status = 400, description = "Unsupported language")
    ),
    tag = "I18n"
)]
pub async fn strings(path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let lang = language(&path)?;
    Ok(HttpResponse::Ok().json(TranslationBundle {
        language: lang,
        strings: i18n::bundle(lang),
    }))
}

/// Single UI string
#[utoipa::path(
    get,
    path = "/api/i18n/{lang}/{key}",
    params(
        ("lang", Path, description = "Language code, en or si"),
        ("key", Path, description = "UI key; unknown keys echo back")
    ),
    responses(
        (status = 200, description = "Translated text", body = Translation),
        (status = 400, description = "Unsupported language")
    ),
    tag = "I18n"
)]
pub async fn string(path: web::Path<(String, String)>) -> Result<HttpResponse, ApiError> {
    let (code, key) = path.into_inner();
    let lang = language(&code)?;
    let text = i18n::translate(lang, &key).to_string();
    Ok(HttpResponse::Ok().json(Translation {
        language: lang,
        key,
        text,
    }))
}
