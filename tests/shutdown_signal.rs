#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use eventsBot::tasks::shutdown_signal::ShutdownSignal;

#[tokio::test]
async fn sigterm_is_caught_instead_of_killing_the_process() {
    let mut shutdown = ShutdownSignal::install().unwrap();

    let status = Command::new("kill")
        .arg("-TERM")
        .arg(std::process::id().to_string())
        .status()
        .unwrap();
    assert!(status.success());

    let signal = tokio::time::timeout(Duration::from_secs(5), shutdown.recv())
        .await
        .expect("SIGTERM should resolve the shutdown signal");
    assert_eq!(signal, "SIGTERM");
}
