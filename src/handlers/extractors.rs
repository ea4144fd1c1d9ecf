// src/handlers/extractors.rs
// DOCUMENTATION: Request extractors shared by handlers
// PURPOSE: Token authentication and pagination helpers

use actix_web::{dev::Payload, web, FromRequest, HttpRequest, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;

use crate::db::UserRepository;
use crate::errors::FoodgramError;
use crate::models::{Page, PageQuery, User};

const TOKEN_SCHEME: &str = "Token";

/// Read `Authorization: Token <key>`
/// DOCUMENTATION: No header or another scheme means anonymous; a malformed
/// Token header is rejected
pub fn parse_token_header(req: &HttpRequest) -> Result<Option<String>, FoodgramError> {
    let header = match req.headers().get(actix_web::http::header::AUTHORIZATION) {
        Some(h) => h.to_str().map_err(|_| FoodgramError::Unauthorized)?,
        None => return Ok(None),
    };

    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {}
        _ => return Ok(None),
    }
    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key.to_string())),
        _ => {
            log::debug!("Malformed token header");
            Err(FoodgramError::Unauthorized)
        }
    }
}

/// Current user when a valid token is present, None for anonymous visitors
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }
}

impl FromRequest for MaybeUser {
    type Error = FoodgramError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = parse_token_header(req);
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            let key = match token? {
                Some(key) => key,
                None => return Ok(MaybeUser(None)),
            };
            let pool = pool.ok_or_else(|| {
                log::error!("Database pool is not registered as app data");
                FoodgramError::InternalError
            })?;

            match UserRepository::find_by_token(pool.get_ref(), &key).await? {
                Some(user) => Ok(MaybeUser(Some(user))),
                None => {
                    log::debug!("Rejected unknown token");
                    Err(FoodgramError::Unauthorized)
                }
            }
        })
    }
}

/// Authenticated user; anonymous requests get 401
pub struct AuthUser(pub User);

impl FromRequest for AuthUser {
    type Error = FoodgramError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let maybe = MaybeUser::from_request(req, payload);
        Box::pin(async move {
            match maybe.await? {
                MaybeUser(Some(user)) => Ok(AuthUser(user)),
                MaybeUser(None) => Err(FoodgramError::Unauthorized),
            }
        })
    }
}

/// scheme://host/path of the current request
pub fn request_base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), req.path())
}

/// 200 response with a paginated body, 404 past the last page
pub fn paginated<T: Serialize>(
    req: &HttpRequest,
    results: Vec<T>,
    total: i64,
    page: PageQuery,
) -> Result<HttpResponse, FoodgramError> {
    page.ensure_in_range(total)?;
    let body = Page::new(results, total, page, &request_base_url(req), req.query_string());
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_no_header_is_anonymous() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(parse_token_header(&req).unwrap(), None);
    }

    #[test]
    fn test_token_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Token 0123456789abcdef"))
            .to_http_request();
        assert_eq!(
            parse_token_header(&req).unwrap().as_deref(),
            Some("0123456789abcdef")
        );
    }

    #[test]
    fn test_other_scheme_is_anonymous() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .to_http_request();
        assert_eq!(parse_token_header(&req).unwrap(), None);
    }

    #[test]
    fn test_malformed_token_header() {
        for value in ["Token", "Token a b"] {
            let req = TestRequest::default()
                .insert_header(("Authorization", value))
                .to_http_request();
            assert!(parse_token_header(&req).is_err(), "{} should be rejected", value);
        }
    }

    #[test]
    fn test_request_base_url() {
        let req = TestRequest::get()
            .uri("/api/recipes/?page=2")
            .insert_header(("Host", "foodgram.example.com"))
            .to_http_request();
        assert_eq!(request_base_url(&req), "http://foodgram.example.com/api/recipes/");
    }
}
