//! Scroll scheduling on a Tokio runtime

#![cfg(feature = "async")]

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use formwatch::prelude::*;
use formwatch::schedule::{Scheduler, ScrollTarget, TokioScheduler};
use formwatch::testing::RecordingScroll;

#[tokio::test(start_paused = true)]
async fn test_scroll_runs_after_delay() {
    let target = Arc::new(RecordingScroll::new());
    let handle = TokioScheduler.schedule(Duration::from_millis(200), {
        let target = Arc::clone(&target);
        Box::new(move || target.scroll_into_view())
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(target.count(), 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(target.count(), 1);

    handle.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_dropped_agent_never_scrolls() {
    let target = Arc::new(RecordingScroll::new());
    let mut session = FormSession::new().with_scheduler(Rc::new(TokioScheduler));
    let id = session.mount_scrollable(
        AgentOptions::named("email"),
        "required",
        "",
        Arc::clone(&target) as Arc<dyn ScrollTarget>,
    );

    assert!(session.submit().is_some_and(|result| result.is_failure()));
    session.unmount(id);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(target.count(), 0);
}
