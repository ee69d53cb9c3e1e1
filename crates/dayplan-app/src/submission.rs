// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::selection::SelectionSet;
use crate::services::{Navigator, SelectionSink};

pub const DEFAULT_NEXT_ROUTE: &str = "/pre-swipes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Skipped,
    Delivered { count: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionCoordinator {
    next_route: String,
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_NEXT_ROUTE)
    }
}

impl SubmissionCoordinator {
    pub fn new(next_route: impl Into<String>) -> Self {
        Self {
            next_route: next_route.into(),
        }
    }

    pub fn next_route(&self) -> &str {
        &self.next_route
    }

    pub fn advance<S, N>(
        &self,
        selection: &SelectionSet,
        sink: &S,
        navigator: &mut N,
    ) -> SubmissionOutcome
    where
        S: SelectionSink + ?Sized,
        N: Navigator + ?Sized,
    {
        let outcome = if selection.is_empty() {
            SubmissionOutcome::Skipped
        } else {
            match sink.submit_essential_activities(selection.ids()) {
                Ok(()) => {
                    debug!(count = selection.len(), "essential activities submitted");
                    SubmissionOutcome::Delivered {
                        count: selection.len(),
                    }
                }
                Err(error) => {
                    let error = format!("{error:#}");
                    warn!(
                        %error,
                        count = selection.len(),
                        "essential activity submission failed; continuing"
                    );
                    SubmissionOutcome::Failed { error }
                }
            }
        };

        navigator.go_forward(&self.next_route);
        outcome
    }

    pub fn back<N>(&self, navigator: &mut N)
    where
        N: Navigator + ?Sized,
    {
        navigator.go_back();
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_NEXT_ROUTE, SubmissionCoordinator, SubmissionOutcome};
    use crate::ids::ActivityId;
    use crate::selection::SelectionSet;
    use crate::services::{Navigator, SelectionSink};
    use anyhow::{Result, bail};
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Sink {
        calls: RefCell<Vec<Vec<i64>>>,
        fail: bool,
    }

    impl SelectionSink for Sink {
        fn submit_essential_activities(&self, ids: &[ActivityId]) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(ids.iter().map(|id| id.get()).collect());
            if self.fail {
                bail!("503 service unavailable");
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Nav {
        log: Vec<String>,
    }

    impl Navigator for Nav {
        fn go_forward(&mut self, route: &str) {
            self.log.push(format!("forward {route}"));
        }

        fn go_back(&mut self) {
            self.log.push("back".to_owned());
        }
    }

    fn selection(values: &[i64]) -> SelectionSet {
        let mut set = SelectionSet::new();
        for value in values {
            set.toggle(ActivityId::new(*value));
        }
        set
    }

    #[test]
    fn empty_selection_skips_submission_but_navigates() {
        let sink = Sink::default();
        let mut nav = Nav::default();
        let outcome = SubmissionCoordinator::default().advance(&selection(&[]), &sink, &mut nav);
        assert_eq!(outcome, SubmissionOutcome::Skipped);
        assert!(sink.calls.borrow().is_empty());
        assert_eq!(nav.log, vec![format!("forward {DEFAULT_NEXT_ROUTE}")]);
    }

    #[test]
    fn submits_exact_order_then_navigates() {
        let sink = Sink::default();
        let mut nav = Nav::default();
        let outcome =
            SubmissionCoordinator::new("/next").advance(&selection(&[3, 1, 4]), &sink, &mut nav);
        assert_eq!(outcome, SubmissionOutcome::Delivered { count: 3 });
        assert_eq!(*sink.calls.borrow(), vec![vec![3, 1, 4]]);
        assert_eq!(nav.log, vec!["forward /next".to_owned()]);
    }

    #[test]
    fn failure_still_navigates_and_reports() {
        let sink = Sink {
            fail: true,
            ..Sink::default()
        };
        let mut nav = Nav::default();
        let outcome = SubmissionCoordinator::default().advance(&selection(&[2]), &sink, &mut nav);
        match outcome {
            SubmissionOutcome::Failed { error } => assert!(error.contains("503")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(nav.log.len(), 1);
    }

    #[test]
    fn back_only_navigates() {
        let sink = Sink::default();
        let mut nav = Nav::default();
        SubmissionCoordinator::default().back(&mut nav);
        assert_eq!(nav.log, vec!["back".to_owned()]);
        assert!(sink.calls.borrow().is_empty());
    }
}
