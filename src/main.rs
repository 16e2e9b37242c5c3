use clap::Parser;
use surveyor::{db::Db, router, AppState};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Database URL, e.g. `sqlite:surveyor.db`.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:surveyor.db")]
    database_url: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:8000")]
    address: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,tower_http=debug,surveyor=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;
    let app = router(AppState { db });

    let address = args.address.parse::<std::net::SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on {address}");
    axum::serve(listener, app).await?;

    Ok(())
}
