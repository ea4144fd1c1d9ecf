// src/handlers/middleware.rs
// DOCUMENTATION: Host header validation
// PURPOSE: Answer only to hosts listed in ALLOWED_HOSTS

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, ResponseError,
};

use crate::config::Config;
use crate::errors::FoodgramError;

/// Match a Host header value against ALLOWED_HOSTS entries
/// DOCUMENTATION: Ports are ignored; `*` allows anything and `.example.com`
/// allows the domain and all its subdomains
pub fn host_allowed(host: &str, allowed: &[String]) -> bool {
    let host = host.trim().to_ascii_lowercase();
    let host = match host.strip_prefix('[') {
        // IPv6 literal: [::1]:8000
        Some(rest) => rest.split(']').next().unwrap_or_default().to_string(),
        None => host.rsplit_once(':').map_or(host.clone(), |(h, _)| h.to_string()),
    };
    if host.is_empty() {
        return false;
    }

    allowed.iter().any(|pattern| {
        if pattern == "*" {
            return true;
        }
        match pattern.strip_prefix('.') {
            Some(domain) => host == domain || host.ends_with(pattern.as_str()),
            None => host == *pattern,
        }
    })
}

pub async fn allowed_hosts<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    if let Some(config) = req.app_data::<web::Data<Config>>() {
        let host = req.connection_info().host().to_string();
        if !host_allowed(&host, &config.allowed_hosts) {
            log::warn!("Rejected request for disallowed host {}", host);
            let response = FoodgramError::DisallowedHost(host).error_response();
            return Ok(req.into_response(response).map_into_right_body());
        }
    }
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{call_service, init_service, TestRequest};
    use actix_web::{http::StatusCode, middleware::from_fn, App, HttpResponse};

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_exact_and_port() {
        let allowed = hosts(&["foodgram.example.com", "127.0.0.1"]);
        assert!(host_allowed("foodgram.example.com", &allowed));
        assert!(host_allowed("Foodgram.Example.com:8080", &allowed));
        assert!(host_allowed("127.0.0.1:8000", &allowed));
        assert!(!host_allowed("evil.com", &allowed));
        assert!(!host_allowed("", &allowed));
    }

    #[test]
    fn test_wildcards() {
        assert!(host_allowed("anything.test", &hosts(&["*"])));

        let allowed = hosts(&[".example.com"]);
        assert!(host_allowed("example.com", &allowed));
        assert!(host_allowed("api.example.com", &allowed));
        assert!(!host_allowed("badexample.com", &allowed));
    }

    #[test]
    fn test_ipv6_literal() {
        assert!(host_allowed("[::1]:8000", &hosts(&["::1"])));
    }

    #[actix_web::test]
    async fn test_middleware_rejects_unknown_host() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .wrap(from_fn(allowed_hosts))
                .route("/health", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let ok = TestRequest::get()
            .uri("/health")
            .insert_header(("Host", "localhost:8000"))
            .to_request();
        assert_eq!(call_service(&app, ok).await.status(), StatusCode::OK);

        let bad = TestRequest::get()
            .uri("/health")
            .insert_header(("Host", "evil.com"))
            .to_request();
        let resp = call_service(&app, bad).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
