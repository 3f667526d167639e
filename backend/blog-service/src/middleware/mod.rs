/// HTTP middleware for blog-service
///
/// Session handling: a signed HS256 token carried in the `Authorization`
/// header (Bearer scheme) or the `session` cookie identifies the viewer.
/// Token issuance (login) belongs to the accounts system; this service only
/// validates. The middleware never rejects a request by itself, since public
/// pages are readable anonymously. Handlers that require an identity use the
/// [`Viewer`] extractor, which turns a missing identity into the login
/// redirect carrying the originally requested path.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::AppError;

/// Session token claims. `sub` is the user id.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Authenticated viewer identity stored in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Uuid);

/// Optional viewer identity for routes readable anonymously.
#[derive(Debug, Clone, Copy)]
pub struct MaybeViewer(pub Option<Uuid>);

/// Actix middleware that resolves the viewer from the session token, if any.
pub struct SessionAuth {
    key: Rc<DecodingKey>,
}

impl SessionAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            key: Rc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
            key: self.key.clone(),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
    key: Rc<DecodingKey>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let key = self.key.clone();

        Box::pin(async move {
            if let Some(token) = extract_token(&req) {
                match decode::<Claims>(&token, &key, &Validation::new(Algorithm::HS256)) {
                    Ok(data) => {
                        if let Ok(user_id) = Uuid::parse_str(&data.claims.sub) {
                            req.extensions_mut().insert(Viewer(user_id));
                        } else {
                            tracing::debug!("session token carried a non-uuid subject");
                        }
                    }
                    Err(e) => {
                        tracing::debug!("rejected session token: {}", e);
                    }
                }
            }

            service.call(req).await
        })
    }
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    req.request().cookie("session").map(|c| c.value().to_string())
}

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let viewer = req.extensions().get::<Viewer>().copied();
        ready(viewer.ok_or_else(|| AppError::AuthRequired {
            next: req.path().to_string(),
        }))
    }
}

impl FromRequest for MaybeViewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let viewer = req.extensions().get::<Viewer>().map(|v| v.0);
        ready(Ok(MaybeViewer(viewer)))
    }
}
