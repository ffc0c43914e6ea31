//! Authentication extractors.
//!
//! The only authorization gate in the system: a handler that takes
//! `Identity` requires a valid bearer token bound to an active account,
//! and one that takes `AdminIdentity` additionally requires the admin
//! role. Handlers never re-check roles themselves.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use forno_core::domain::User;
use forno_core::ports::AuthError;
use forno_shared::ErrorBody;

use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
}

/// Identity that additionally requires the admin role.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub user: User,
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match &self.0 {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let body = match &self.0 {
            AuthError::TokenExpired => {
                ErrorBody::new("Token expired. Please login again.")
            }
            AuthError::InvalidToken(_) => ErrorBody::new("Invalid token"),
            AuthError::MissingAuth => ErrorBody::new(
                "Authentication required. Please provide a valid Bearer token.",
            ),
            AuthError::InvalidCredentials => ErrorBody::new("Authentication failed"),
            AuthError::InsufficientPermissions => {
                ErrorBody::new("Access denied. Admin privileges required.")
            }
            AuthError::HashingError(_) => ErrorBody::new("Internal server error"),
        };

        actix_web::HttpResponse::build(self.status_code()).json(body)
    }
}

/// Resolve the bearer token of `req` to an active user record.
async fn authenticate(req: &HttpRequest) -> Result<User, AuthenticationError> {
    let state = match req.app_data::<web::Data<AppState>>() {
        Some(state) => state,
        None => {
            tracing::error!("AppState not found in app data");
            return Err(AuthenticationError(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            )));
        }
    };

    // Extract Bearer token from Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthenticationError(AuthError::MissingAuth))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        AuthenticationError(AuthError::InvalidToken(
            "Invalid authorization header".to_string(),
        ))
    })?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AuthenticationError(AuthError::InvalidToken(
            "Expected Bearer token".to_string(),
        ))
    })?;

    let claims = state
        .tokens
        .validate_token(token)
        .map_err(AuthenticationError)?;

    // The token only binds the user id; role and active state come from
    // the store, so revocation takes effect before the token expires.
    let user = state
        .users
        .find_by_id(claims.user_id)
        .await
        .map_err(|e| {
            tracing::error!("User lookup failed during authentication: {}", e);
            AuthenticationError(AuthError::InvalidCredentials)
        })?
        .ok_or(AuthenticationError(AuthError::InvalidCredentials))?;

    if !user.is_active {
        return Err(AuthenticationError(AuthError::InvalidCredentials));
    }

    Ok(user)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = authenticate(&req).await?;
            Ok(Identity { user })
        })
    }
}

impl FromRequest for AdminIdentity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let user = authenticate(&req).await?;
            if !user.is_admin() {
                return Err(AuthenticationError(AuthError::InsufficientPermissions));
            }
            Ok(AdminIdentity { user })
        })
    }
}
