//! Activity statistics: append-only time-stamped counters, one set per user
//! and one for the workspace, bumped synchronously under the store lock by
//! every relevant state transition.

use streams_types::models::{
    ChannelsExistPoint, ChannelsJoinedPoint, DmsExistPoint, DmsJoinedPoint, MessagesExistPoint,
    MessagesSentPoint, UserStats, WorkspaceStats,
};

use crate::now_ts;
use crate::store::Store;

/// An append-only series of {value, timestamp} points. Values move by ±1
/// per event; the first point is always {0, creation time}.
#[derive(Debug, Clone)]
pub struct Series {
    points: Vec<(i64, i64)>,
}

impl Series {
    pub fn new(now: i64) -> Self {
        Self {
            points: vec![(0, now)],
        }
    }

    pub fn last(&self) -> i64 {
        self.points.last().map(|&(v, _)| v).unwrap_or(0)
    }

    pub fn bump(&mut self, delta: i64) {
        self.points.push((self.last() + delta, now_ts()));
    }

    pub fn points(&self) -> &[(i64, i64)] {
        &self.points
    }
}

/// Per-user series, seeded at registration time.
#[derive(Debug, Clone)]
pub struct UserSeries {
    pub channels_joined: Series,
    pub dms_joined: Series,
    pub messages_sent: Series,
}

impl UserSeries {
    pub fn new(now: i64) -> Self {
        Self {
            channels_joined: Series::new(now),
            dms_joined: Series::new(now),
            messages_sent: Series::new(now),
        }
    }
}

/// Workspace-wide series, seeded at store init (and again on clear).
#[derive(Debug, Clone)]
pub struct WorkspaceSeries {
    pub channels_exist: Series,
    pub dms_exist: Series,
    pub messages_exist: Series,
}

impl WorkspaceSeries {
    pub fn new(now: i64) -> Self {
        Self {
            channels_exist: Series::new(now),
            dms_exist: Series::new(now),
            messages_exist: Series::new(now),
        }
    }
}

// -- Event helpers --

pub fn bump_channels_joined(store: &mut Store, u_id: i64, delta: i64) {
    if let Some(s) = store.user_stats.get_mut(&u_id) {
        s.channels_joined.bump(delta);
    }
}

pub fn bump_dms_joined(store: &mut Store, u_id: i64, delta: i64) {
    if let Some(s) = store.user_stats.get_mut(&u_id) {
        s.dms_joined.bump(delta);
    }
}

pub fn bump_channels_exist(store: &mut Store, delta: i64) {
    store.workspace_stats.channels_exist.bump(delta);
}

pub fn bump_dms_exist(store: &mut Store, delta: i64) {
    store.workspace_stats.dms_exist.bump(delta);
}

/// One send event: user `messages_sent` and workspace `messages_exist` both
/// move +1. Removing a message later does not move either back down.
pub fn record_message_sent(store: &mut Store, u_id: i64) {
    if let Some(s) = store.user_stats.get_mut(&u_id) {
        s.messages_sent.bump(1);
    }
    store.workspace_stats.messages_exist.bump(1);
}

// -- Read-time computation --

pub fn user_stats(store: &Store, u_id: i64) -> UserStats {
    let now = now_ts();
    let series = store
        .user_stats
        .get(&u_id)
        .cloned()
        .unwrap_or_else(|| UserSeries::new(now));

    let numerator =
        series.channels_joined.last() + series.dms_joined.last() + series.messages_sent.last();
    let ws = &store.workspace_stats;
    let denominator = ws.channels_exist.last() + ws.dms_exist.last() + ws.messages_exist.last();
    // Not clamped: a user who sent messages since removed from the count can
    // exceed 1.0.
    let involvement_rate = if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    };

    UserStats {
        channels_joined: series
            .channels_joined
            .points()
            .iter()
            .map(|&(v, t)| ChannelsJoinedPoint {
                num_channels_joined: v,
                time_stamp: t,
            })
            .collect(),
        dms_joined: series
            .dms_joined
            .points()
            .iter()
            .map(|&(v, t)| DmsJoinedPoint {
                num_dms_joined: v,
                time_stamp: t,
            })
            .collect(),
        messages_sent: series
            .messages_sent
            .points()
            .iter()
            .map(|&(v, t)| MessagesSentPoint {
                num_messages_sent: v,
                time_stamp: t,
            })
            .collect(),
        involvement_rate,
    }
}

pub fn workspace_stats(store: &Store) -> WorkspaceStats {
    let total = store.users.len();
    let engaged = store
        .users
        .iter()
        .filter(|u| {
            store
                .channels
                .iter()
                .any(|c| c.all_members.contains(&u.u_id))
                || store.dms.iter().any(|d| d.members.contains(&u.u_id))
        })
        .count();
    let utilization_rate = if total == 0 {
        0.0
    } else {
        engaged as f64 / total as f64
    };

    let ws = &store.workspace_stats;
    WorkspaceStats {
        channels_exist: ws
            .channels_exist
            .points()
            .iter()
            .map(|&(v, t)| ChannelsExistPoint {
                num_channels_exist: v,
                time_stamp: t,
            })
            .collect(),
        dms_exist: ws
            .dms_exist
            .points()
            .iter()
            .map(|&(v, t)| DmsExistPoint {
                num_dms_exist: v,
                time_stamp: t,
            })
            .collect(),
        messages_exist: ws
            .messages_exist
            .points()
            .iter()
            .map(|&(v, t)| MessagesExistPoint {
                num_messages_exist: v,
                time_stamp: t,
            })
            .collect(),
        utilization_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_starts_at_zero_and_moves_by_one() {
        let mut s = Series::new(100);
        assert_eq!(s.points(), &[(0, 100)]);
        s.bump(1);
        s.bump(1);
        s.bump(-1);
        let values: Vec<i64> = s.points().iter().map(|&(v, _)| v).collect();
        assert_eq!(values, vec![0, 1, 2, 1]);
        for pair in s.points().windows(2) {
            assert_eq!((pair[1].0 - pair[0].0).abs(), 1);
            assert!(pair[1].1 >= pair[0].1);
        }
    }

    #[test]
    fn involvement_zero_denominator_is_zero() {
        let store = Store::new();
        let stats = user_stats(&store, 0);
        assert_eq!(stats.involvement_rate, 0.0);
    }

    #[test]
    fn utilization_zero_users_is_zero() {
        let store = Store::new();
        assert_eq!(workspace_stats(&store).utilization_rate, 0.0);
    }
}
