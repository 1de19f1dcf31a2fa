use stillwater::{App, Config, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_from_config(&config);

    App::with_config(config).await?.run().await
}
