use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use actix_web::error::InternalError;
use actix_web::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use log::{debug, error};
use serde_json::json;

use crate::models::AppState;
use crate::utils::base64::base64_decode_text;

/// Splits an `Authorization: Basic ...` value into user name and password.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = base64_decode_text(encoded.trim())?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn unauthorized(message: &str) -> actix_web::Error {
    let response = HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, "Basic realm=\"subprofile\""))
        .json(json!({ "error": message }));
    InternalError::from_response(message.to_string(), response).into()
}

/// A request whose Basic credentials matched a stored account.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let credentials = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_auth);
        let accounts = req
            .app_data::<web::Data<Arc<AppState>>>()
            .map(|state| state.accounts.clone());

        Box::pin(async move {
            let Some((username, password)) = credentials else {
                return Err(unauthorized("Authentication required"));
            };
            let Some(accounts) = accounts else {
                error!("Application state missing, rejecting request");
                return Err(unauthorized("Authentication unavailable"));
            };

            let user = username.clone();
            match web::block(move || accounts.verify_user(&user, &password)).await {
                Ok(Ok(true)) => Ok(AuthenticatedUser { username }),
                Ok(Ok(false)) => {
                    debug!("Rejected credentials for '{}'", username);
                    Err(unauthorized("Invalid username or password"))
                }
                Ok(Err(err)) => {
                    error!("Failed to verify user '{}': {}", username, err);
                    Err(unauthorized("Authentication unavailable"))
                }
                Err(err) => {
                    error!("Blocking task failed: {}", err);
                    Err(unauthorized("Authentication unavailable"))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;

    #[test]
    fn test_parse_basic_auth() {
        let header = format!("Basic {}", base64_encode("admin:pa:ss"));
        assert_eq!(
            parse_basic_auth(&header),
            Some(("admin".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(parse_basic_auth("Bearer abc"), None);
        assert_eq!(parse_basic_auth("Basic !!!"), None);
    }
}
