// src/middleware/extract.rs

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Versões de Json/Query/Path cujas rejeições saem como `{ "error" }`
// traduzido, no lugar do texto puro do axum.

#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

#[derive(Debug, Clone)]
pub struct AppQuery<T>(pub T);

#[derive(Debug, Clone)]
pub struct AppPath<T>(pub T);

async fn reject<S>(parts: &mut Parts, state: &S, err: AppError) -> ApiError
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    let app_state = AppState::from_ref(state);
    let Ok(locale) = Locale::from_request_parts(parts, state).await;
    err.to_api_error(&locale, &app_state.i18n_store)
}

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Ok(locale) = Locale::from_request_parts(&mut parts, state).await;

        match Json::<T>::from_request(Request::from_parts(parts, body), state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let app_state = AppState::from_ref(state);
                Err(AppError::from(rejection).to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => Err(reject(parts, state, rejection.into()).await),
        }
    }
}

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(AppPath(value)),
            Err(rejection) => Err(reject(parts, state, rejection.into()).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
        routing::{get, post, put},
        Router,
    };
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        config::AppState,
        handlers,
        middleware::auth::AuthenticatedUser,
        models::auth::{Profile, UserRole},
        test_support::{temp_storage, test_config},
    };

    // Rotas reais sobre um pool que nunca conecta: as rejeições
    // acontecem antes de qualquer consulta.
    #[fixture]
    async fn app() -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        let storage = temp_storage(&config).await;

        Router::new()
            .route("/api/workers", post(handlers::workers::create_worker).get(handlers::workers::list_workers))
            .route("/api/companies/{id}", put(handlers::companies::update_company))
            .route("/api/reports", get(handlers::reports::get_report))
            .with_state(AppState::assemble(&config, pool, storage))
    }

    fn as_admin(mut request: Request<Body>) -> Request<Body> {
        request.extensions_mut().insert(AuthenticatedUser(Profile {
            id: Uuid::new_v4(),
            full_name: "Admin".into(),
            email: "admin@servis.com".into(),
            role: UserRole::Admin,
            created_at: Utc::now(),
        }));
        request
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_json(response: &Response) {
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, "application/json");
    }

    #[rstest]
    #[case(r#"{"email":"a@b.com","full_name":"Ali"}"#, "application/json")]
    #[case(r#"{"email":"#, "application/json")]
    #[case(r#"{"email":"a@b.com","password":"secret1","full_name":"Ali"}"#, "text/plain")]
    #[tokio::test]
    async fn bad_json_bodies_answer_with_the_error_envelope(
        #[future] app: Router,
        #[case] body: &'static str,
        #[case] content_type: &str,
    ) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/workers")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();

        let response = app.await.oneshot(as_admin(request)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json(&response);
        let body = json_body(response).await;
        assert_eq!(body["error"], "The submitted form could not be read.");
        assert!(body["details"].is_string());
    }

    #[rstest]
    #[tokio::test]
    async fn bad_query_strings_are_translated(#[future] app: Router) {
        let request = Request::builder()
            .uri("/api/workers?role=boss")
            .header(header::ACCEPT_LANGUAGE, "tr-TR")
            .body(Body::empty())
            .unwrap();

        let response = app.await.oneshot(as_admin(request)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json(&response);
        assert_eq!(json_body(response).await["error"], "Gönderilen form okunamadı.");
    }

    #[rstest]
    #[tokio::test]
    async fn bad_path_ids_answer_with_the_error_envelope(#[future] app: Router) {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/companies/not-a-uuid")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"ACME"}"#))
            .unwrap();

        let response = app.await.oneshot(as_admin(request)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json(&response);
        assert!(json_body(response).await["error"].is_string());
    }

    #[rstest]
    #[tokio::test]
    async fn report_month_typos_are_rejected_as_json(#[future] app: Router) {
        let request = Request::builder()
            .uri("/api/reports?month=2026-13")
            .body(Body::empty())
            .unwrap();

        let response = app.await.oneshot(as_admin(request)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json(&response);
    }
}
