use cat_dog_classifier::{config, start_server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging depends on the loaded settings, so configuration errors
    // surface through main's return value instead.
    let config = config::get_configuration()?;
    telemetry::init_subscriber(config.log_level);

    tracing::info!(
        "Loaded configuration, model at {:?}",
        config.model.get_path()
    );
    start_server(config).await
}
