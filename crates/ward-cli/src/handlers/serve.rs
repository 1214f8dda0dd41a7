use anyhow::{Context, Result};
use ward_server::AppState;
use ward_store::Store;

pub fn handle(store: Store, addr: &str, api_key: Option<String>) -> Result<()> {
    let state = AppState::new(store, api_key).context("failed to seed application state")?;
    let router = ward_server::build_router(state);

    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(%addr, "ward server listening");
        axum::serve(listener, router.into_make_service())
            .await
            .context("server error")
    })
}
