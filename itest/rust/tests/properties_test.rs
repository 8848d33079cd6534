/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Randomized scope workloads against the mock engine: every engine value is freed exactly once.

use gdbind::lifetime::live_handles;
use gdbind::obj::ownership::{transferred_to_engine, transferred_to_rust};
use gdbind::prelude::*;
use proptest::prelude::*;

use itest::classes::{Label, LabelApi};
use itest::framework::mock::FreeTracker;
use itest::framework;

#[derive(Clone, Debug)]
enum Step {
    /// Opens a nested scope.
    Enter,
    /// Ends the innermost scope opened by the test, if any.
    Leave,
    Text(String),
    Label,
    /// Releases the n-th value that is still alive, modulo their count.
    Release(usize),
    /// Moves the n-th live text into the current scope.
    Reregister(usize),
}

prop_compose! {
    fn arbitrary_step()(variant in 0..7usize, text in "[a-z]{0,8}", pick in any::<usize>()) -> Step {
        match variant {
            0 => Step::Enter,
            1 => Step::Leave,
            2 | 3 => Step::Text(text),
            4 => Step::Label,
            5 => Step::Reregister(pick),
            _ => Step::Release(pick),
        }
    }
}

enum Value {
    Text(GString),
    Label(Gd<Label>),
}

impl Value {
    fn is_alive(&self) -> bool {
        match self {
            Value::Text(text) => text.is_alive(),
            Value::Label(label) => label.is_instance_valid(),
        }
    }

    fn release(self) {
        match self {
            Value::Text(text) => text.release(),
            Value::Label(label) => label.release(),
        }
    }
}

fn run(steps: Vec<Step>) -> Result<(), TestCaseError> {
    framework::init();
    let handles_before = live_handles();
    let tracker = FreeTracker::start();

    let outer = Scope::begin_labeled("workload");
    let mut scopes = vec![outer];
    let mut values: Vec<Value> = Vec::new();
    let mut created = 0;

    for step in steps {
        let current = *scopes.last().expect("outer scope stays open");

        match step {
            Step::Enter => scopes.push(Scope::begin()),
            Step::Leave => {
                if scopes.len() > 1 {
                    let scope = scopes.pop().expect("checked length");
                    scope.end();
                }
            }
            Step::Text(text) => {
                values.push(Value::Text(GString::from_str_in(current, &text)));
                created += 1;
            }
            Step::Label => {
                values.push(Value::Label(Gd::new_in(current)));
                created += 1;
            }
            Step::Release(pick) => {
                values.retain(Value::is_alive);
                if !values.is_empty() {
                    let index = pick % values.len();
                    values.swap_remove(index).release();
                }
            }
            Step::Reregister(pick) => {
                values.retain(Value::is_alive);
                let texts: Vec<usize> = (0..values.len())
                    .filter(|&i| matches!(values[i], Value::Text(_)))
                    .collect();

                if !texts.is_empty() {
                    let index = texts[pick % texts.len()];
                    if let Value::Text(text) = values.swap_remove(index) {
                        let moved: GString = transferred_to_rust(transferred_to_engine(text), current);
                        values.push(Value::Text(moved));
                    }
                }
            }
        }
    }

    for scope in scopes.into_iter().rev() {
        scope.end();
    }

    prop_assert!(values.iter().all(|v| !v.is_alive()));
    prop_assert_eq!(tracker.count(), created);
    prop_assert_eq!(tracker.bad_frees(), 0);
    prop_assert_eq!(live_handles(), handles_before);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_value_freed_exactly_once(steps in prop::collection::vec(arbitrary_step(), 0..48)) {
        run(steps)?;
    }

    #[test]
    fn text_survives_the_engine(text in "\\PC{0,32}") {
        framework::init();

        let stored = with_scope(|_| {
            let label = Gd::<Label>::new();
            label.set_text(&text);
            label.get_text()
        });

        prop_assert_eq!(stored, text);
    }
}
