use crate::config::LogLevel;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset. ONNX Runtime is chatty at info.
pub fn default_filter(log_level: LogLevel) -> String {
    format!("{},ort=warn", log_level.as_str())
}

/// Installs the global JSON subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_subscriber(log_level: LogLevel) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json().with_level(true))
        .init();
}
