// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for hook ordering over arbitrary plugin layouts.

use proptest::prelude::*;

use plexus_container::AppContainer;
use plexus_core::{HookPhase, PluginTier};
use plexus_test_utils::TestCatalog;

fn tier_strategy() -> impl Strategy<Value = PluginTier> {
    prop_oneof![Just(PluginTier::Core), Just(PluginTier::AppComponent)]
}

fn tier_of(name: &str, layout: &[PluginTier]) -> PluginTier {
    if name == "HostModule" {
        return PluginTier::AppHost;
    }
    let index: usize = name
        .trim_start_matches('P')
        .trim_end_matches("Module")
        .parse()
        .unwrap();
    layout[index]
}

proptest! {
    #[test]
    fn start_is_tier_sorted_and_stop_is_its_reverse(
        layout in prop::collection::vec(tier_strategy(), 0..8),
        host_first in any::<bool>(),
    ) {
        let mut builder = TestCatalog::builder();
        if host_first {
            builder = builder.host("Host");
        }
        for (i, tier) in layout.iter().enumerate() {
            builder = builder.plugin(&format!("P{i}"), *tier);
        }
        if !host_first {
            builder = builder.host("Host");
        }
        let fixture = builder.build();
        let recorder = fixture.recorder();

        let mut container = AppContainer::new(fixture.resolver());
        container.build().unwrap();
        container.start().unwrap();
        container.stop().unwrap();

        let started = recorder.modules_in(HookPhase::Start);
        prop_assert_eq!(started.len(), layout.len() + 1);
        let tiers: Vec<PluginTier> = started.iter().map(|m| tier_of(m, &layout)).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        prop_assert_eq!(&tiers, &sorted);

        let mut stopped = recorder.modules_in(HookPhase::Stop);
        stopped.reverse();
        prop_assert_eq!(stopped, started);
    }
}
