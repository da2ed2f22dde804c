#[tokio::main]
async fn main() {
    safari_connect::run().await;
}
