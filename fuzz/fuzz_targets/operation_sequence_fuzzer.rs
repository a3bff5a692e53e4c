//! Fuzz target for arbitrary operation sequences against the full app
//!
//! # Strategy
//!
//! - Arbitrary interleavings of world changes, layouts, selections, setting
//!   toggles and reconnects over a small id space
//! - Every operation is applied to the simulated world and the app
//!
//! # Invariants
//!
//! - Every standard invariant holds after every step
//! - Room badges equal a from-scratch computation
//! - NEVER panic inside the stores

#![no_main]

use badgeframe_app::{App, AppEvent};
use badgeframe_core::Settings;
use badgeframe_harness::{InvariantRegistry, Operation, SimClient, SystemSnapshot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (bool, Vec<Operation>)| {
    let (feature_threads, ops) = input;
    let client = SimClient::new();
    let settings = Settings { feature_threads, ..Settings::default() };
    let mut app = App::new(client.clone(), settings);
    app.handle(AppEvent::Ready { last_space: None });

    let invariants = InvariantRegistry::standard();
    for (step, op) in ops.iter().take(256).enumerate() {
        for event in op.apply(&client, &app) {
            app.handle(event);
        }
        invariants.assert_all(&SystemSnapshot::from_app(&app), &format!("step {step}: {op:?}"));
    }
});
