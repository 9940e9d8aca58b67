mod client;
mod host;
mod notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
