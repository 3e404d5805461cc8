use warp::Filter;

/// Serves the built site plus the data directory (attribution.json and the
/// schedule tiles). There is no server-side logic: everything interactive
/// happens in the browser, and the tile service is external.
#[tokio::main]
async fn main() {
    env_logger::init();

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8085".to_owned())
        .parse()
        .unwrap();
    let site_dir = std::env::var("SITE_DIR").unwrap_or_else(|_| "seed-frontend".to_owned());
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_owned());

    // the schedule tiles are also fetched by other origins during testing
    let cors = warp::cors().allow_any_origin();
    let data = warp::path("data").and(warp::fs::dir(data_dir)).with(cors);

    log::info!("Starting web server on port {}", port);
    warp::serve(
        warp::fs::dir(site_dir)
            .or(data)
            .with(warp::log("transit_map::webserver")),
    )
    .run(([127, 0, 0, 1], port))
    .await;
}
