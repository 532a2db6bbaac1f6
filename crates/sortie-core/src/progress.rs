//! Progress tracking: counters snapshot → missing points.
//!
//! Pure and side-effect free. Mobile mode reads only `mobileSearch[0]`;
//! desktop mode sums `pcSearch[0]` and `pcSearch[1]`. A mode never reads the
//! other mode's channels, so a mobile session on an account without a mobile
//! channel sees a deficit of zero.

use crate::counters::CountersSnapshot;
use crate::mode::SearchMode;

/// Points still to earn for `mode`. Zero means the mode has converged.
pub fn missing_points(counters: &CountersSnapshot, mode: SearchMode) -> u32 {
    mode.channels()
        .iter()
        .filter_map(|channel| counters.channel(*channel))
        .map(|progress| progress.remaining())
        .fold(0u32, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::{Channel, PointProgress};
    use proptest::prelude::*;

    fn full_snapshot() -> CountersSnapshot {
        CountersSnapshot::default()
            .with_channel(Channel::Desktop, PointProgress::new(30, 90))
            .with_channel(Channel::DesktopSecondary, PointProgress::new(4, 12))
            .with_channel(Channel::Mobile, PointProgress::new(20, 60))
    }

    #[test]
    fn desktop_sums_both_pc_channels() {
        assert_eq!(missing_points(&full_snapshot(), SearchMode::Desktop), 60 + 8);
    }

    #[test]
    fn mobile_reads_only_mobile_channel() {
        assert_eq!(missing_points(&full_snapshot(), SearchMode::Mobile), 40);
    }

    #[test]
    fn mobile_ignores_pc_only_snapshot() {
        let snapshot =
            CountersSnapshot::default().with_channel(Channel::Desktop, PointProgress::new(0, 90));
        assert_eq!(missing_points(&snapshot, SearchMode::Mobile), 0);
    }

    #[test]
    fn desktop_ignores_mobile_only_snapshot() {
        let snapshot =
            CountersSnapshot::default().with_channel(Channel::Mobile, PointProgress::new(0, 60));
        assert_eq!(missing_points(&snapshot, SearchMode::Desktop), 0);
    }

    #[test]
    fn empty_snapshot_is_converged() {
        let snapshot = CountersSnapshot::default();
        assert_eq!(missing_points(&snapshot, SearchMode::Desktop), 0);
        assert_eq!(missing_points(&snapshot, SearchMode::Mobile), 0);
    }

    #[test]
    fn secondary_channel_alone_counts_for_desktop() {
        let snapshot = CountersSnapshot {
            pc_search: vec![PointProgress::new(90, 90), PointProgress::new(0, 12)],
            mobile_search: vec![],
        };
        assert_eq!(missing_points(&snapshot, SearchMode::Desktop), 12);
    }

    fn progress() -> impl Strategy<Value = PointProgress> {
        (0u32..500, 0u32..500).prop_map(|(a, b)| PointProgress::new(a.min(b), a.max(b)))
    }

    fn snapshot() -> impl Strategy<Value = CountersSnapshot> {
        (
            prop::collection::vec(progress(), 0..3),
            prop::collection::vec(progress(), 0..2),
        )
            .prop_map(|(pc_search, mobile_search)| CountersSnapshot {
                pc_search,
                mobile_search,
            })
    }

    proptest! {
        #[test]
        fn idempotent_for_same_snapshot(s in snapshot()) {
            for mode in [SearchMode::Mobile, SearchMode::Desktop] {
                prop_assert_eq!(missing_points(&s, mode), missing_points(&s, mode));
            }
        }

        #[test]
        fn bounded_by_channel_maxima(s in snapshot()) {
            let max: u32 = s.pc_search.iter().take(2).map(|p| p.point_progress_max).sum();
            prop_assert!(missing_points(&s, SearchMode::Desktop) <= max);
        }

        #[test]
        fn non_increasing_as_progress_grows(s in snapshot(), bump in 0u32..50) {
            let mut advanced = s.clone();
            for entry in advanced.pc_search.iter_mut().chain(advanced.mobile_search.iter_mut()) {
                entry.point_progress = (entry.point_progress + bump).min(entry.point_progress_max);
            }
            for mode in [SearchMode::Mobile, SearchMode::Desktop] {
                prop_assert!(missing_points(&advanced, mode) <= missing_points(&s, mode));
            }
        }
    }
}
