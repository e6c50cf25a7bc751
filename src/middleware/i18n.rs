// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Idioma da requisição, usado para traduzir as mensagens de erro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl Locale {
    fn from_header(value: &str) -> Option<Self> {
        accept_language::parse(value)
            .first()
            // "tr-TR" -> "tr"
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .filter(|lang| !lang.is_empty())
            .map(Locale)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use rstest::rstest;

    async fn extract(header: Option<&str>) -> Locale {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(header::ACCEPT_LANGUAGE, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Locale::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[rstest]
    #[case(Some("tr-TR,tr;q=0.9,en;q=0.8"), "tr")]
    #[case(Some("en-US"), "en")]
    #[case(Some("pt-BR;q=0.5, tr;q=0.9"), "tr")]
    #[case(None, "en")]
    #[tokio::test]
    async fn picks_the_preferred_primary_language(#[case] header: Option<&str>, #[case] expected: &str) {
        assert_eq!(extract(header).await, Locale(expected.to_string()));
    }
}
