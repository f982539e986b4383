use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    pretty_env_logger::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key =
        std::env::var("MOCK_PLACES_API_KEY").unwrap_or_else(|_| mock_server::DEFAULT_API_KEY.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    log::info!("mock places API listening on {addr}");
    mock_server::run_with(listener, mock_server::MockState::with_fixture(api_key)).await
}
