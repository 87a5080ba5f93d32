//! Authentication and authorization for SHELF: roles, bcrypt passwords,
//! JWT session cookies, and policy extractors for handlers.

pub mod password;
pub mod policy;
pub mod role;
pub mod session;

pub use policy::{authorize, ensure_owner, AdminOnly, Authenticated, Authorized, Policy};
pub use role::Role;
pub use session::{issue_token, session_cookie, verify_token, Claims, Session};

use async_trait::async_trait;
use shelf_kernel::{settings::Environment, InitCtx, Module};

/// bcrypt accepts work factors in this range.
const BCRYPT_COSTS: std::ops::RangeInclusive<u32> = 4..=31;

/// Core module that refuses to boot with unsafe auth settings.
pub struct AuthzModule;

impl AuthzModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for AuthzModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for AuthzModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let auth = &ctx.settings.auth;

        if !BCRYPT_COSTS.contains(&auth.bcrypt_cost) {
            anyhow::bail!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                BCRYPT_COSTS.start(),
                BCRYPT_COSTS.end(),
                auth.bcrypt_cost
            );
        }
        if auth.token_ttl_hours <= 0 {
            anyhow::bail!("auth.token_ttl_hours must be positive");
        }

        if ctx.settings.uses_default_secret() {
            if ctx.settings.environment == Environment::Production {
                anyhow::bail!("auth.jwt_secret must be set in production");
            }
            tracing::warn!(module = self.name(), "using the development JWT secret");
        }

        tracing::info!(
            module = self.name(),
            cookie = %auth.cookie_name,
            ttl_hours = auth.token_ttl_hours,
            "session settings validated"
        );
        Ok(())
    }
}
