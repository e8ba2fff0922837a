pub mod coinbase;
pub mod ingest;
pub mod poller;
pub mod snapshot;

pub use coinbase::CoinbaseClient;
pub use ingest::Ingestor;
pub use poller::Poller;
pub use snapshot::SnapshotWriter;
