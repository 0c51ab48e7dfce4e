use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Value of the `role` claim that grants access to the NIP endpoints.
    pub admin_role: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nipforge".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nipforge-admin".into()),
        };
        let admin_role = std::env::var("ADMIN_ROLE").unwrap_or_else(|_| "admin".into());
        Ok(Self {
            database_url,
            jwt,
            admin_role,
        })
    }
}
