use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Mobile API payloads.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserResponse {
    pub name: String,
    pub email: String,
    pub restaurant_name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatsResponse {
    pub total_posts: i64,
    pub total_engagement: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CaptionRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CaptionResponse {
    pub caption: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PublishPostRequest {
    pub content: String,
    #[serde(default)]
    pub platforms: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PublishPhotoRequest {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub photo_base64: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

// Axum integration (optional - requires axum dependency)
#[cfg(feature = "mobile-api")]
pub mod server {
    use super::*;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use chrono::Utc;
    use std::sync::Arc;

    use crate::generator::CaptionGenerator;
    use crate::models::{MobileSession, Platform, Post, PostStatus, RestaurantContext, User};
    use crate::services::Database;

    pub struct AppState {
        pub db: Arc<Database>,
        pub generator: Arc<CaptionGenerator>,
    }

    type ApiError = (StatusCode, Json<ErrorResponse>);

    fn api_error(status: StatusCode, message: &str) -> ApiError {
        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
    }

    fn internal_error(e: anyhow::Error) -> ApiError {
        log::error!("❌ Request failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn create_mobile_router(db: Arc<Database>, generator: Arc<CaptionGenerator>) -> Router {
        let state = Arc::new(AppState { db, generator });

        Router::new()
            .route("/health", get(health_check))
            .route("/api/mobile/register", post(register))
            .route("/api/mobile/login", post(login))
            .route("/api/mobile/user", get(get_user))
            .route("/api/mobile/stats", get(get_stats))
            .route("/api/mobile/generate-photo-caption", post(generate_photo_caption))
            .route("/api/mobile/generate-content", post(generate_content))
            .route("/api/mobile/publish-post", post(publish_post))
            .route("/api/mobile/publish-photo", post(publish_photo))
            .with_state(state)
    }

    /// Resolve the bearer token to a user and refresh the session's
    /// last-active stamp.
    async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let user = state
            .db
            .get_session_user(token)
            .await
            .map_err(internal_error)?
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let _ = state.db.touch_session(token).await;

        Ok(user)
    }

    async fn open_session(state: &AppState, user_id: i64) -> Result<String, ApiError> {
        let token = generate_session_token();
        let session = MobileSession {
            id: None,
            user_id,
            token: token.clone(),
            device_id: None,
            push_token: None,
            last_active: Utc::now(),
        };
        state
            .db
            .create_session(&session)
            .await
            .map_err(internal_error)?;

        Ok(token)
    }

    /// Context for the generator, from the caller's restaurant row if one
    /// exists.
    async fn restaurant_context(
        state: &AppState,
        user_id: i64,
    ) -> Result<RestaurantContext, ApiError> {
        let restaurant = state
            .db
            .get_restaurant_for_user(user_id)
            .await
            .map_err(internal_error)?;

        Ok(restaurant
            .map(|r| r.to_context())
            .unwrap_or_default())
    }

    async fn health_check() -> &'static str {
        "OK"
    }

    async fn register(
        State(state): State<Arc<AppState>>,
        Json(req): Json<RegisterRequest>,
    ) -> Result<Json<AuthResponse>, ApiError> {
        if req.name.is_empty()
            || req.email.is_empty()
            || req.password.is_empty()
            || req.restaurant_name.is_empty()
        {
            return Err(api_error(StatusCode::BAD_REQUEST, "All fields required"));
        }

        let user_id = state
            .db
            .register_user(
                &req.name,
                &req.email,
                &hash_password(&req.password),
                &req.restaurant_name,
            )
            .await
            .map_err(internal_error)?
            .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Email already registered"))?;

        log::info!("🆕 Registered user {} ({})", user_id, req.email);

        let token = open_session(&state, user_id).await?;
        Ok(Json(AuthResponse {
            success: true,
            token,
        }))
    }

    async fn login(
        State(state): State<Arc<AppState>>,
        Json(req): Json<LoginRequest>,
    ) -> Result<Json<AuthResponse>, ApiError> {
        if req.email.is_empty() || req.password.is_empty() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Email and password required",
            ));
        }

        let user = state
            .db
            .get_user_by_email(&req.email)
            .await
            .map_err(internal_error)?
            .filter(|u| u.password_hash == hash_password(&req.password))
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

        let user_id = user
            .id
            .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"))?;

        let token = open_session(&state, user_id).await?;
        Ok(Json(AuthResponse {
            success: true,
            token,
        }))
    }

    async fn get_user(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Json<UserResponse>, ApiError> {
        let user = authenticate(&state, &headers).await?;
        let user_id = user.id.unwrap_or_default();

        let restaurant = state
            .db
            .get_restaurant_for_user(user_id)
            .await
            .map_err(internal_error)?;

        Ok(Json(UserResponse {
            name: user.name,
            email: user.email,
            restaurant_name: restaurant
                .map(|r| r.name)
                .unwrap_or_else(|| "My Restaurant".to_string()),
        }))
    }

    async fn get_stats(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Json<StatsResponse>, ApiError> {
        let user = authenticate(&state, &headers).await?;

        let restaurant = state
            .db
            .get_restaurant_for_user(user.id.unwrap_or_default())
            .await
            .map_err(internal_error)?;

        let restaurant_id = match restaurant.and_then(|r| r.id) {
            Some(id) => id,
            None => {
                return Ok(Json(StatsResponse {
                    total_posts: 0,
                    total_engagement: 0,
                }))
            }
        };

        let total_posts = state
            .db
            .count_posts(restaurant_id)
            .await
            .map_err(internal_error)?;

        // No analytics integration yet; engagement is a flat per-post estimate
        Ok(Json(StatsResponse {
            total_posts,
            total_engagement: total_posts * 25,
        }))
    }

    async fn generate_photo_caption(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Json(req): Json<CaptionRequest>,
    ) -> Result<Json<CaptionResponse>, ApiError> {
        let user = authenticate(&state, &headers).await?;
        let context = restaurant_context(&state, user.id.unwrap_or_default()).await?;

        let style = req.style.as_deref().unwrap_or("engaging");
        let caption = match req.image_base64.as_deref().filter(|s| !s.is_empty()) {
            Some(image) => {
                state
                    .generator
                    .generate_caption_from_image(Some(image), &context, style)
                    .await
            }
            None => state.generator.fallback_caption(&context),
        };

        Ok(Json(CaptionResponse { caption }))
    }

    async fn generate_content(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Json<ContentResponse>, ApiError> {
        let user = authenticate(&state, &headers).await?;
        let context = restaurant_context(&state, user.id.unwrap_or_default()).await?;

        let content = state.generator.generate_ai_content(&context).await;

        Ok(Json(ContentResponse { content }))
    }

    async fn publish_post(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Json(req): Json<PublishPostRequest>,
    ) -> Result<Json<PublishResponse>, ApiError> {
        let user = authenticate(&state, &headers).await?;

        if req.content.is_empty() {
            return Err(api_error(StatusCode::BAD_REQUEST, "Content is required"));
        }

        let restaurant_id = require_restaurant(&state, &user).await?;

        let post = Post {
            id: None,
            restaurant_id,
            content: req.content,
            media_urls: Vec::new(),
            platforms: parse_platforms(&req.platforms),
            scheduled_time: None,
            status: PostStatus::Published,
            engagement_data: None,
            created_at: Utc::now(),
        };
        state.db.create_post(&post).await.map_err(internal_error)?;

        Ok(Json(PublishResponse {
            success: true,
            message: "Post published successfully".to_string(),
        }))
    }

    async fn publish_photo(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Json(req): Json<PublishPhotoRequest>,
    ) -> Result<Json<PublishResponse>, ApiError> {
        let user = authenticate(&state, &headers).await?;

        if req.photo_base64.as_deref().map_or(true, str::is_empty) {
            return Err(api_error(StatusCode::BAD_REQUEST, "Photo is required"));
        }

        let restaurant_id = require_restaurant(&state, &user).await?;

        // Photos are not stored anywhere yet; the row carries a placeholder
        // reference.
        let photo_url = format!("photo_{}.jpg", Utc::now().timestamp());

        let post = Post {
            id: None,
            restaurant_id,
            content: req.caption,
            media_urls: vec![photo_url],
            platforms: parse_platforms(&req.platforms),
            scheduled_time: None,
            status: PostStatus::Published,
            engagement_data: None,
            created_at: Utc::now(),
        };
        state.db.create_post(&post).await.map_err(internal_error)?;

        Ok(Json(PublishResponse {
            success: true,
            message: "Photo published successfully".to_string(),
        }))
    }

    async fn require_restaurant(state: &AppState, user: &User) -> Result<i64, ApiError> {
        state
            .db
            .get_restaurant_for_user(user.id.unwrap_or_default())
            .await
            .map_err(internal_error)?
            .and_then(|r| r.id)
            .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Restaurant not found"))
    }

    fn parse_platforms(names: &[String]) -> Vec<Platform> {
        names
            .iter()
            .filter_map(|name| Platform::from_string(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{
            "name": "Tony",
            "email": "tony@example.com",
            "password": "secret",
            "restaurant_name": "Tony's Bistro"
        }"#;

        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "Tony");
        assert_eq!(req.restaurant_name, "Tony's Bistro");
    }

    #[test]
    fn test_caption_request_fields_are_optional() {
        let req: CaptionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.image_base64.is_none());
        assert!(req.style.is_none());

        let req: CaptionRequest =
            serde_json::from_str(r#"{"image_base64": "AAAA", "style": "casual"}"#).unwrap();
        assert_eq!(req.image_base64.as_deref(), Some("AAAA"));
        assert_eq!(req.style.as_deref(), Some("casual"));
    }

    #[test]
    fn test_hash_password() {
        // SHA-256("password")
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert_ne!(hash_password("password"), hash_password("Password"));
    }

    #[test]
    fn test_session_token_shape() {
        let token = generate_session_token();
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_session_token());
    }
}
