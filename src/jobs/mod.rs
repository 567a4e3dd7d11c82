//! Periodic jobs. Each loop awaits its cycle to completion before the next
//! tick, so the same job never overlaps itself; the loops run concurrently
//! with each other and share nothing but the store handle.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use crate::config::Config;
use crate::db::Db;
use crate::notify::Notifier;

pub mod check_reminders;
pub mod check_subscriptions;
pub mod digest;
pub mod marketing;

use check_reminders::check_reminders;
use check_subscriptions::check_subscriptions;
use digest::send_morning_digest;
use marketing::send_marketing_mail;

/// Drives all periodic loops. Never returns; the caller spawns it and decides
/// when the process shuts down.
pub async fn job_handler<N: Notifier>(db: Db, notifier: N, config: Config) {
    tokio::join!(
        reminder_loop(&db, &notifier, config.poll_interval),
        subscription_loop(&db, &notifier, config.subscription_interval),
        marketing_loop(&db, &notifier, config.marketing_interval, &config.admin_ids),
        digest_loop(&db, &notifier, config.digest_hour),
    );
}

/// Runs `cycle` once per `every`. Ticks missed while a cycle overruns are
/// skipped, never queued, so a slow cycle is followed by the next scheduled
/// firing instead of a burst of catch-up runs. `delay_first` pushes the first
/// firing one full interval out.
async fn run_every<F, Fut>(every: Duration, delay_first: bool, mut cycle: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let start = if delay_first { Instant::now() + every } else { Instant::now() };
    let mut ticker = interval_at(start, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        cycle().await;
    }
}

async fn reminder_loop<N: Notifier>(db: &Db, notifier: &N, every: Duration) {
    // an immediate first poll is fine: due reminders should go out on startup
    run_every(every, false, || check_reminders(db, notifier)).await;
}

async fn subscription_loop<N: Notifier>(db: &Db, notifier: &N, every: Duration) {
    // first firing waits a full interval: the threshold notices are not
    // deduplicated, so an instant run on every restart would re-send them
    run_every(every, true, || check_subscriptions(db, notifier)).await;
}

async fn marketing_loop<N: Notifier>(db: &Db, notifier: &N, every: Duration, admin_ids: &[i64]) {
    run_every(every, true, || send_marketing_mail(db, notifier, admin_ids, false)).await;
}

async fn digest_loop<N: Notifier>(db: &Db, notifier: &N, hour: u32) {
    loop {
        sleep(until_next_hour(Utc::now(), hour)).await;
        send_morning_digest(db, notifier).await;
    }
}

/// Time to sleep until the next occurrence of `hour:00` UTC, strictly in the
/// future.
fn until_next_hour(now: DateTime<Utc>, hour: u32) -> Duration {
    let today = now.date_naive().and_hms_opt(hour % 24, 0, 0).unwrap().and_utc();
    let target = if today > now { today } else { today + chrono::Duration::days(1) };
    (target - now).to_std().unwrap_or(Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn next_hour_later_the_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 7, 30, 0).unwrap();
        assert_eq!(until_next_hour(now, 9), Duration::from_secs(90 * 60));
    }

    #[test]
    fn next_hour_rolls_over_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(until_next_hour(now, 9), Duration::from_secs(24 * 3600));

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 15, 0).unwrap();
        assert_eq!(until_next_hour(now, 9), Duration::from_secs(22 * 3600 + 45 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_cycle_skips_missed_ticks_instead_of_queueing() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let task = tokio::spawn(run_every(Duration::from_secs(60), false, move || {
            let counter = counter.clone();
            async move {
                // the first cycle overruns the interval by more than two ticks
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    sleep(Duration::from_secs(125)).await;
                }
            }
        }));

        // t=0 first run, busy until t=125; ticks at 60 and 120 are missed and
        // must be dropped, so the second run happens at t=180 and no sooner
        sleep(Duration::from_secs(186)).await;
        task.abort();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_start_waits_one_full_interval() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let task = tokio::spawn(run_every(Duration::from_secs(60), true, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        sleep(Duration::from_secs(59)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        sleep(Duration::from_secs(2)).await;
        task.abort();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_start_fires_right_away() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = runs.clone();
        let task = tokio::spawn(run_every(Duration::from_secs(60), false, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        sleep(Duration::from_secs(1)).await;
        task.abort();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
