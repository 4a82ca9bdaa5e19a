use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// The signed-in officer, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub emp_no: String,
    pub name: String,
    pub role: Role,
    pub rank: String,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by the auth middleware on protected routes.
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match bearer_token(req) {
            Some(t) => t,
            None => return ready(Err(ApiError::unauthorized("Authorization token is missing"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                tracing::error!("Config missing from app data");
                return ready(Err(ApiError::Internal));
            }
        };

        ready(
            verify_token(token, &config.jwt_secret)
                .map(AuthUser::from)
                .map_err(|_| ApiError::unauthorized("Invalid token")),
        )
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

impl From<crate::models::Claims> for AuthUser {
    fn from(claims: crate::models::Claims) -> Self {
        AuthUser {
            emp_no: claims.sub,
            name: claims.name,
            role: claims.role,
            rank: claims.rank,
        }
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin only"))
        }
    }

    /// Admin or acting admin.
    pub fn require_marker(&self) -> Result<(), ApiError> {
        if self.role.can_mark_attendance() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only Admin or Acting Admin can mark attendance"))
        }
    }

    /// Markers see every employee; plain users only see themselves.
    pub fn can_view(&self, emp_no: &str) -> bool {
        self.role.can_mark_attendance() || self.emp_no == emp_no
    }
}
