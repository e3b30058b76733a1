//! Diagnostics emitted through `tracing`

#![cfg(feature = "tracing")]

use std::io;
use std::sync::{Arc, Mutex};

use formwatch::prelude::*;
use formwatch::rule::engine::evaluate;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_duplicate_report_is_logged() {
    let form = FormCoordinator::new();
    let ticket = form.register();
    let _other = form.register();
    let epoch = form.start_pass();

    form.report_result(ticket, epoch, None);
    form.report_result(ticket, epoch, None);

    assert!(logs_contain("ignoring report"));
    assert!(logs_contain("duplicate report"));
}

#[traced_test]
#[test]
fn test_unknown_rule_is_logged() {
    let rules = PipeResolver.parse("required|sometimes");

    assert_eq!(rules.len(), 1);
    assert!(logs_contain("sometimes"));
}

#[traced_test]
#[test]
fn test_missing_bound_is_logged() {
    let result = evaluate(RuleKind::Max, &FieldValue::from("long"), None, &FormValues::new());

    assert!(result.is_success());
    assert!(logs_contain("rule has no bound"));
}

#[traced_test]
#[test]
fn test_pass_lifecycle_is_logged() {
    let form = FormCoordinator::new();
    form.start_pass();

    assert!(logs_contain("validation pass started"));
    assert!(logs_contain("validation pass complete"));
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_fmt_subscriber_renders_protocol_warnings() {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(LevelFilter::WARN)
        .finish();
    let _guard = subscriber.set_default();

    let form = FormCoordinator::new();
    let ticket = form.register();
    assert!(form.deregister(ticket).is_ok());
    assert!(form.deregister(ticket).is_err());
    form.start_pass();

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("WARN"));
    assert!(output.contains("ignoring deregistration"));
    assert!(!output.contains("validation pass started"));
}
