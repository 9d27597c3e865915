use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::service::dispatcher::Dispatcher;

pub async fn run_maintenance_loop(dispatcher: Arc<Dispatcher>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        debug!("running maintenance tick");
        dispatcher.maintain(SystemTime::now()).await;
    }
}
