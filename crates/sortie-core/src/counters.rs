//! Point-progress counters as reported by the rewards dashboard.
//!
//! The sensor returns a snapshot with zero or more entries per search
//! channel. Field names follow the dashboard JSON (`pcSearch`,
//! `mobileSearch`, `pointProgress`, `pointProgressMax`).

use serde::{Deserialize, Serialize};

/// Progress of a single counter channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointProgress {
    /// Points earned so far today.
    pub point_progress: u32,
    /// Points available today.
    pub point_progress_max: u32,
}

impl PointProgress {
    /// Create a progress entry.
    pub fn new(point_progress: u32, point_progress_max: u32) -> Self {
        Self {
            point_progress,
            point_progress_max,
        }
    }

    /// Points still missing on this channel. Never negative, even if the
    /// dashboard over-reports progress.
    pub fn remaining(&self) -> u32 {
        self.point_progress_max.saturating_sub(self.point_progress)
    }
}

/// A named counter channel inside a [`CountersSnapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `mobileSearch[0]`.
    Mobile,
    /// `pcSearch[0]`, the generic desktop channel.
    Desktop,
    /// `pcSearch[1]`, the secondary desktop surface (Edge bonus).
    DesktopSecondary,
}

impl Channel {
    /// Dashboard path of this channel, for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobileSearch[0]",
            Self::Desktop => "pcSearch[0]",
            Self::DesktopSecondary => "pcSearch[1]",
        }
    }
}

/// Immutable counters read from the sensor.
///
/// Channels may be absent (new or ineligible accounts); absent channels
/// contribute nothing to the deficit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountersSnapshot {
    /// Desktop search channels: generic first, secondary surface second.
    pub pc_search: Vec<PointProgress>,
    /// Mobile search channels.
    pub mobile_search: Vec<PointProgress>,
}

impl CountersSnapshot {
    /// Look up a channel entry.
    pub fn channel(&self, channel: Channel) -> Option<&PointProgress> {
        match channel {
            Channel::Mobile => self.mobile_search.first(),
            Channel::Desktop => self.pc_search.first(),
            Channel::DesktopSecondary => self.pc_search.get(1),
        }
    }

    /// Builder: set a channel entry, padding earlier desktop slots with empty
    /// progress when needed.
    #[must_use]
    pub fn with_channel(mut self, channel: Channel, progress: PointProgress) -> Self {
        match channel {
            Channel::Mobile => {
                if self.mobile_search.is_empty() {
                    self.mobile_search.push(progress);
                } else {
                    self.mobile_search[0] = progress;
                }
            }
            Channel::Desktop | Channel::DesktopSecondary => {
                let index = usize::from(channel == Channel::DesktopSecondary);
                while self.pc_search.len() <= index {
                    self.pc_search.push(PointProgress::default());
                }
                self.pc_search[index] = progress;
            }
        }
        self
    }
}
