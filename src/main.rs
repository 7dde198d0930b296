#[tokio::main]
async fn main() {
    if let Err(e) = strokecare::run().await {
        tracing::error!("Startup failed: {e}");
        eprintln!("strokecare: {e}");
        std::process::exit(1);
    }
}
