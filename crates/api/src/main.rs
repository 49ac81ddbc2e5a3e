use std::sync::Arc;

use sentra_api::{build_app, AuthState, Config};
use sentra_auth::{CredentialHasher, TokenCodec};
use sentra_infra::{seed_defaults, AccountService, InMemoryCredentialStore, TracingAuditSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sentra_observability::init();

    // Missing JWT_SECRET aborts startup here.
    let config = Config::from_env()?;

    let codec = Arc::new(TokenCodec::new(
        &config.jwt_secret,
        &config.issuer,
        &config.audience,
        config.access_ttl,
        config.refresh_ttl,
    )?);
    let hasher = Arc::new(CredentialHasher::new(config.hash_cost)?);

    let store = Arc::new(InMemoryCredentialStore::new());
    seed_defaults(store.as_ref()).await?;

    let accounts = AccountService::new(
        store.clone(),
        codec.clone(),
        hasher,
        Arc::new(TracingAuditSink),
    );

    let app = build_app(AuthState {
        codec,
        store,
        accounts,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
