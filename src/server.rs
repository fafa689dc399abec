use crate::{
    config::{Config, ServerConfig},
    inference_service::InferenceService,
    model_service::ModelService,
    ort_service::OrtModelService,
    routes::api_routes,
};
use axum::{extract::DefaultBodyLimit, Router};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub struct SharedState<M: ModelService> {
    pub inference_service: InferenceService<M>,
}

impl<M: ModelService> Clone for SharedState<M> {
    fn clone(&self) -> Self {
        Self {
            inference_service: self.inference_service.clone(),
        }
    }
}

/// Builds the full application: routes, shared state and middleware.
pub fn build_router<M: ModelService>(model_service: M, server_config: &ServerConfig) -> Router {
    let app_state = SharedState {
        inference_service: InferenceService::new(model_service),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes())
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(server_config.body_limit_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new(model_service: impl ModelService, config: &ServerConfig) -> anyhow::Result<Self> {
        let router = build_router(model_service, config);
        let listener = TcpListener::bind(config.get_address()).await?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("Starting app on {}", self.listener.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, starting graceful shutdown");
            })
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let ort_model_service = OrtModelService::new(&config.model).inspect_err(|e| {
        tracing::error!("Failed to load model {:?}: {}", config.model.get_path(), e)
    })?;

    let server = HttpServer::new(ort_model_service, &config.server).await?;
    server.run().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
