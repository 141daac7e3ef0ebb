//! # Example: read the first tag in range
//!
//! Simulates a UHF reader wired over a serial port: each inventory round is a
//! blocking call that usually sees nothing. The supervisor polls it every
//! 100ms and gives up after 3 seconds.
//!
//! ```text
//! RUST_LOG=pollvisor=debug cargo run --example scan_first
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use pollvisor::{
    AcquireSpec, BlockingSource, Config, Detection, LogWriter, Outcome, SourceError, SourceRef,
    Subscribe, Supervisor,
};

/// Blocking inventory round; a tag shows up on the fifth round.
fn inventory(round: u32) -> Result<Vec<Detection>, SourceError> {
    std::thread::sleep(Duration::from_millis(20));
    if round < 5 {
        return Ok(Vec::new());
    }
    Ok(vec![
        Detection::new([0xE2, 0x80, 0x11, 0x60, 0x60, 0x00, 0x02, 0x09]),
        Detection::new([0xE2, 0x80, 0x11, 0x60, 0x60, 0x00, 0x02, 0x0A]),
    ])
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pollvisor=info".into()),
        )
        .init();

    let rounds = Arc::new(AtomicU32::new(0));
    let reader: SourceRef = BlockingSource::arc("uhf-reader", move || {
        inventory(rounds.fetch_add(1, Ordering::SeqCst) + 1)
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::builder(Config::default())
        .with_source(reader)
        .with_subscribers(subs)
        .build();
    let _signals = sup.shutdown_on_signal();

    let spec = AcquireSpec::new(Duration::from_millis(100), Duration::from_secs(3));
    match sup.acquire(spec).await {
        Outcome::Success(tag) => println!("tag: {tag}"),
        other => {
            let err = other.into_result(spec.timeout()).err();
            println!("no tag: {}", err.map_or("UNKNOWN", |e| e.code()));
        }
    }

    sup.shutdown().await?;
    Ok(())
}
