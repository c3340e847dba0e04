use anyhow::Context;
use number_generator::run;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting weekly number post");
    // GH_TOKEN is passed through as-is; a missing token surfaces as a 401.
    let token = std::env::var("GH_TOKEN").unwrap_or_default();
    run(&token).await.context("could not post issue")?;
    Ok(())
}
