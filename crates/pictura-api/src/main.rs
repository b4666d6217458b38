use pictura_api::setup;
use pictura_core::Config;

// mimalloc keeps fragmentation low under bursts of large decode buffers
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router, state.shutdown.clone()).await?;

    Ok(())
}
