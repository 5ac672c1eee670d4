use clap::Parser;
use miette::{IntoDiagnostic, Result};
use shopcart::application::engine::CartEngine;
use shopcart::domain::ports::KeyValueStore;
use shopcart::infrastructure::in_memory::InMemoryKvStore;
#[cfg(feature = "storage-rocksdb")]
use shopcart::infrastructure::rocksdb::RocksDbKvStore;
use shopcart::interfaces::csv::action_reader::{ActionReader, CartAction};
use shopcart::interfaces::csv::snapshot_writer::SnapshotWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input cart-action script (CSV: op,id,title,price,image,quantity,code)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopcart=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store: Arc<dyn KeyValueStore> = match cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Arc::new(RocksDbKvStore::open(db_path).into_diagnostic()?),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            return Err(miette::miette!(
                "--db-path requires a build with the storage-rocksdb feature"
            ));
        }
        None => Arc::new(InMemoryKvStore::new()),
    };

    let engine = CartEngine::load(store).await;

    // Replay the script
    let file = File::open(cli.input).into_diagnostic()?;
    for action in ActionReader::new(file).actions() {
        match action {
            Ok(CartAction::Add { product, quantity }) => {
                engine.add_to_cart(&product, quantity).await;
            }
            Ok(CartAction::Update { id, quantity }) => engine.update_quantity(id, quantity).await,
            Ok(CartAction::Remove { id }) => engine.remove_from_cart(id).await,
            Ok(CartAction::Clear) => engine.clear_cart().await,
            Ok(CartAction::SetCoupon { code }) => engine.set_coupon_code(code).await,
            Ok(CartAction::ApplyCoupon) => engine.apply_coupon().await,
            Ok(CartAction::RemoveCoupon) => engine.remove_coupon().await,
            Err(error) => tracing::warn!(%error, "skipping malformed action"),
        }
    }

    // Output final state
    let snapshot = engine.snapshot().await;
    let stdout = io::stdout();
    let mut writer = SnapshotWriter::new(stdout.lock());
    writer.write_snapshot(&snapshot).into_diagnostic()?;

    Ok(())
}
