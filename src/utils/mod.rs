use crate::models::{Claims, ServiceError};
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::env;

pub mod join_code;
pub mod store;

// Authenticated caller identity, established by the external identity
// provider and carried in the bearer token
#[derive(Clone, Debug)]
pub struct UserContext {
    pub user_id: String,
    pub display_name: String,
}

impl UserContext {
    // Display name resolution order: explicit name claim, then the local
    // part of the email, then the placeholder used for anonymous joiners
    pub fn from_claims(claims: &Claims) -> Self {
        let display_name = match &claims.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => claims
                .email
                .split('@')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("Unnamed")
                .to_string(),
        };

        UserContext {
            user_id: claims.sub.clone(),
            display_name,
        }
    }
}

// Extract the authenticated user context placed in request extensions by
// the Auth middleware
pub fn get_user_context(req: &HttpRequest) -> Result<UserContext, ServiceError> {
    req.extensions()
        .get::<UserContext>()
        .cloned()
        .ok_or(ServiceError::Unauthorized)
}

// JWT utility functions
pub mod jwt {
    use super::*;

    // Get JWT secret from environment or use default
    fn get_jwt_secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| "scoreboard_super_secret_key".to_string())
    }

    // Issue a token for a user. Token issuance normally lives with the
    // identity provider; this helper exists for tests and local tooling
    // that share the secret.
    pub fn issue_token(
        user_id: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<String, ServiceError> {
        let secret = get_jwt_secret();
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(7))
            .expect("Valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.map(|n| n.to_string()),
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|e| ServiceError::BackendUnavailable(format!("Token encoding failed: {}", e)))
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str) -> Result<Claims, ServiceError> {
        let secret = get_jwt_secret();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthorized);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// Middleware for JWT authentication
pub mod auth_middleware {
    use super::*;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, Transform};
    use actix_web::{error::ErrorUnauthorized, Error};
    use futures::future::{ok, Ready};
    use std::future::Future;
    use std::pin::Pin;

    pub struct Auth;

    impl<S, B> Transform<S, ServiceRequest> for Auth
    where
        S: Service<ServiceRequest, Response = actix_web::dev::ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = actix_web::dev::ServiceResponse<B>;
        type Error = Error;
        type Transform = AuthMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthMiddleware { service })
        }
    }

    pub struct AuthMiddleware<S> {
        service: S,
    }

    impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
    where
        S: Service<ServiceRequest, Response = actix_web::dev::ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = actix_web::dev::ServiceResponse<B>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            // Get Authorization header
            let auth_header = req.headers().get(header::AUTHORIZATION);

            if let Some(auth_header) = auth_header {
                if let Ok(auth_str) = auth_header.to_str() {
                    if let Ok(token) = jwt::extract_token_from_header(auth_str) {
                        if let Ok(claims) = jwt::decode_token(&token) {
                            // Make the caller identity available to handlers
                            let context = UserContext::from_claims(&claims);
                            req.extensions_mut().insert(context);
                            let fut = self.service.call(req);
                            return Box::pin(async move { fut.await });
                        }
                    }
                }
            }

            Box::pin(async move { Err(ErrorUnauthorized("Unauthorized")) })
        }
    }
}

pub use auth_middleware::Auth;

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(email: &str, name: Option<&str>) -> Claims {
        Claims {
            sub: "u-1".to_string(),
            email: email.to_string(),
            name: name.map(|n| n.to_string()),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn display_name_falls_back_to_email_then_placeholder() {
        let ctx = UserContext::from_claims(&claims("uma@example.com", None));
        assert_eq!(ctx.display_name, "uma");

        let ctx = UserContext::from_claims(&claims("uma@example.com", Some("Uma Chan")));
        assert_eq!(ctx.display_name, "Uma Chan");

        let ctx = UserContext::from_claims(&claims("", Some("   ")));
        assert_eq!(ctx.display_name, "Unnamed");
    }
}
