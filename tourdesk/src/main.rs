//! tourdesk service binary

use tourdesk::config::Config;
use tourdesk::observability::init_tracing;
use tourdesk::routes;
use tourdesk::server::Server;
use tourdesk::state::AppState;
use tourdesk::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config);

    let store = Store::new();
    if let Some(seed_dir) = &config.store.seed {
        let inserted = tourdesk::seed::load(&store, seed_dir).await?;
        tracing::info!("Loaded {} seed documents from {}", inserted, seed_dir.display());
    }

    let state = AppState::new(config.clone(), store);
    let app = routes::router(state);

    Server::new(config).serve(app).await?;

    Ok(())
}
