#[tokio::main]
async fn main() {
    harvest_core::start_server().await;
}
