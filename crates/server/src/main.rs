#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finbot_server::start().await
}
