use arena_server::frameworks::server;

#[tokio::main]
async fn main() {
    if server::run_with_config().await.is_err() {
        std::process::exit(1);
    }
}
