//! RouteSignalsHandler - route, filter and rank signals without synthesis.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::routing::{ProcessedSignal, ProfileRouter, SignalFilter};
use crate::domain::signal::{ProfileType, RawSignal, SignalCategory};
use crate::ports::Clock;

/// Default number of signals returned.
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone)]
pub struct RouteSignalsCommand {
    pub profile_type: ProfileType,
    pub signals: Vec<RawSignal>,
    pub filter: SignalFilter,
    /// Overrides the handler's default when set.
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSignalsResult {
    pub profile_type: ProfileType,
    pub received: usize,
    /// Signals left after filtering, before the top-N cut.
    pub matched: usize,
    pub fallback_count: usize,
    pub category_counts: BTreeMap<SignalCategory, usize>,
    pub signals: Vec<ProcessedSignal>,
}

pub struct RouteSignalsHandler {
    router: Arc<ProfileRouter>,
    clock: Arc<dyn Clock>,
    top_n: usize,
}

impl RouteSignalsHandler {
    pub fn new(router: Arc<ProfileRouter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            router,
            clock,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn handle(&self, cmd: RouteSignalsCommand) -> RouteSignalsResult {
        let received = cmd.signals.len();
        let routed = self.router.route_at(cmd.profile_type, &cmd.signals, self.clock.now());
        let filtered = self.router.filter(cmd.profile_type, routed, &cmd.filter);
        let matched = filtered.len();

        let mut category_counts = BTreeMap::new();
        for signal in &filtered {
            *category_counts.entry(signal.category).or_insert(0) += 1;
        }
        let fallback_count = filtered.iter().filter(|s| s.is_fallback()).count();
        let signals = self.router.top_n(filtered, cmd.top_n.unwrap_or(self.top_n));

        debug!(
            profile = %cmd.profile_type,
            received,
            matched,
            returned = signals.len(),
            "Routed signals"
        );

        RouteSignalsResult {
            profile_type: cmd.profile_type,
            received,
            matched,
            fallback_count,
            category_counts,
            signals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::domain::foundation::{SignalId, Timestamp};
    use crate::domain::profile::{CompiledPatterns, ProfileCatalog};
    use crate::domain::signal::ConfidenceLevel;

    fn handler() -> (RouteSignalsHandler, Timestamp) {
        let now = Timestamp::now();
        let router = ProfileRouter::new(Arc::new(ProfileCatalog::builtin()), CompiledPatterns::builtin().unwrap());
        (
            RouteSignalsHandler::new(Arc::new(router), Arc::new(ManualClock::new(now))).with_top_n(2),
            now,
        )
    }

    fn signal(id: &str, content: &str, at: Timestamp) -> RawSignal {
        RawSignal::new(SignalId::new(id).unwrap(), "reddit", content, Some(at))
    }

    #[test]
    fn ranks_and_truncates() {
        let (handler, now) = handler();
        let result = handler.handle(RouteSignalsCommand {
            profile_type: ProfileType::RegionalAgency,
            signals: vec![
                signal("a", "Looking to switch from our current agency", now),
                signal("b", "Budget approved for a new marketing partner", now),
                signal("c", "Nice weather today", now.minus_days(200)),
            ],
            filter: SignalFilter::default(),
            top_n: None,
        });

        assert_eq!(result.received, 3);
        assert_eq!(result.matched, 3);
        assert_eq!(result.signals.len(), 2);
        assert!(result.signals[0].composite_score >= result.signals[1].composite_score);
        assert_eq!(result.category_counts.values().sum::<usize>(), 3);
        assert!(result.fallback_count >= 1);
    }

    #[test]
    fn command_top_n_overrides_default() {
        let (handler, now) = handler();
        let result = handler.handle(RouteSignalsCommand {
            profile_type: ProfileType::RegionalAgency,
            signals: vec![signal("a", "switching agencies", now), signal("b", "budget approved", now)],
            filter: SignalFilter::default().with_min_confidence(ConfidenceLevel::Low),
            top_n: Some(1),
        });
        assert_eq!(result.signals.len(), 1);
    }
}
