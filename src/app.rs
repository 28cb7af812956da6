use std::net::SocketAddr;

use axum::Router;

use crate::{handlers, middleware, state::AppState};

/// Routes plus the request pipeline. Layers added last run first, so the
/// request id is assigned before the access log opens its span.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::public_routes())
        .nest("/private", handlers::private_routes(state.clone()))
        .with_state(state)
        .layer(middleware::cors())
        .layer(middleware::log_request())
        .layer(axum::middleware::from_fn(middleware::set_request_id))
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
