//! Authentication handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use forno_core::domain::{Role, User};
use forno_shared::dto::{
    AuthData, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest, UserDto,
};
use forno_shared::response::ApiResponse;

use crate::middleware::auth::{AdminIdentity, Identity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn validate_credentials(username: &str, email: &str, password: &str) -> AppResult<()> {
    if username.chars().count() < 3 {
        return Err(AppError::BadRequest(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    validate_credentials(&req.username, &req.email, &req.password)?;

    // Check if user already exists
    if state
        .users
        .find_by_email_or_username(&req.email, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "User with this email or username already exists".to_string(),
        ));
    }

    // Hash password
    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create user
    let user = User::new(req.username, req.email, password_hash, Role::User);
    let saved = state.users.insert(user).await?;

    // Generate token
    let token = state
        .tokens
        .generate_token(saved.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        AuthData {
            user: saved.into(),
            token,
        },
        "User registered successfully",
    )))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let mut user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".to_string()));
    }

    // Verify password
    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // Update last login
    state.users.touch_last_login(user.id).await?;
    user.last_login = Some(Utc::now());

    // Generate token
    let token = state
        .tokens
        .generate_token(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        AuthData {
            user: user.into(),
            token,
        },
        "Login successful",
    )))
}

/// GET /api/auth/profile - Protected route
pub async fn profile(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserDto::from(identity.user))))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = identity.user;

    if let Some(username) = req.username {
        if username.chars().count() < 3 {
            return Err(AppError::BadRequest(
                "Username must be at least 3 characters".to_string(),
            ));
        }
        user.username = username;
    }
    if let Some(email) = req.email {
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        user.email = email;
    }
    user.updated_at = Utc::now();

    let saved = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        UserDto::from(saved),
        "Profile updated successfully",
    )))
}

/// PUT /api/auth/change-password
pub async fn change_password(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Verify current password
    let valid = state
        .passwords
        .verify(&req.current_password, &identity.user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    if req.new_password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = state
        .passwords
        .hash(&req.new_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    state.users.set_password(identity.user.id, password_hash).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only("Password changed successfully")))
}

/// POST /api/auth/setup-admin - one-time bootstrap of the admin account.
pub async fn setup_admin(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    // Friendly pre-check; the store-level constraint closes the race.
    if state.users.admin_exists().await? {
        return Err(AppError::BadRequest("Admin user already exists".to_string()));
    }

    let req = body.into_inner();
    validate_credentials(&req.username, &req.email, &req.password)?;

    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let admin = User::new(req.username, req.email, password_hash, Role::Admin);
    let saved = state.users.insert(admin).await?;

    let token = state
        .tokens
        .generate_token(saved.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        AuthData {
            user: saved.into(),
            token,
        },
        "Admin user created successfully",
    )))
}

/// GET /api/auth/users - Admin only
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let users: Vec<UserDto> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(users)))
}
