//! Standups: a time-bounded aggregation buffer on a channel. Lines sent
//! during the window accumulate, and on expiry the buffer lands as a single
//! message authored by the starter.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::messaging;
use crate::model::{REMOVED_USER_TEXT, Standup};
use crate::scheduler;
use crate::store::{GroupId, Store};
use crate::{Streams, now_ts};

/// Start a standup of `length` seconds and schedule its flush. Returns the
/// absolute finish time.
pub fn standup_start(
    streams: &Arc<Streams>,
    u_id: i64,
    channel_id: i64,
    length: i64,
) -> Result<i64> {
    let time_finish;
    let standup_id;
    let epoch;
    {
        let mut store = streams.lock();
        let channel = store.get_channel(channel_id)?;
        if !channel.all_members.contains(&u_id) {
            return Err(CoreError::forbidden("user is not a member of the channel"));
        }
        if length < 0 {
            return Err(CoreError::invalid("standup length cannot be negative"));
        }
        if channel.standup.is_some() {
            return Err(CoreError::invalid(
                "an active standup is already running in the channel",
            ));
        }
        time_finish = now_ts() + length;
        standup_id = store.next_standup_id();
        epoch = store.epoch();
        store.get_channel_mut(channel_id)?.standup = Some(Standup {
            id: standup_id,
            starter: u_id,
            time_finish,
            buffer: String::new(),
        });
    }

    let streams = Arc::clone(streams);
    scheduler::schedule(length, move || {
        let mut store = streams.lock();
        if store.epoch() != epoch {
            return;
        }
        flush(&mut store, channel_id, standup_id);
    });
    Ok(time_finish)
}

pub fn standup_active(store: &Store, u_id: i64, channel_id: i64) -> Result<(bool, Option<i64>)> {
    let channel = store.get_channel(channel_id)?;
    if !channel.all_members.contains(&u_id) {
        return Err(CoreError::forbidden("user is not a member of the channel"));
    }
    Ok(match &channel.standup {
        Some(s) => (s.time_finish > now_ts(), Some(s.time_finish)),
        None => (false, None),
    })
}

/// Append `"{handle}: {text}\n"` to the running buffer.
pub fn standup_send(store: &mut Store, u_id: i64, channel_id: i64, text: &str) -> Result<()> {
    let channel = store.get_channel(channel_id)?;
    if !channel.all_members.contains(&u_id) {
        return Err(CoreError::forbidden("user is not a member of the channel"));
    }
    if text.chars().count() > messaging::MAX_MESSAGE_LEN {
        return Err(CoreError::invalid("message must be at most 1000 characters"));
    }
    if channel.standup.is_none() {
        return Err(CoreError::invalid("no active standup in the channel"));
    }
    let handle = store.get_user(u_id)?.handle.clone();
    if let Some(standup) = &mut store.get_channel_mut(channel_id)?.standup {
        standup.buffer.push_str(&format!("{handle}: {text}\n"));
    }
    Ok(())
}

/// Timer callback. No-ops if the channel vanished (a clear) or the record
/// was superseded; an empty buffer posts nothing. The injected message is a
/// system post and emits no notifications.
pub(crate) fn flush(store: &mut Store, channel_id: i64, standup_id: u64) {
    let Ok(channel) = store.get_channel_mut(channel_id) else {
        return;
    };
    match &channel.standup {
        Some(s) if s.id == standup_id => {}
        _ => return,
    }
    let Some(record) = channel.standup.take() else {
        return;
    };
    if record.buffer.is_empty() {
        return;
    }
    let text = if store.is_removed(record.starter) {
        REMOVED_USER_TEXT.to_string()
    } else {
        record.buffer
    };
    let message_id = store.next_message_id();
    messaging::deliver(
        store,
        record.starter,
        GroupId::Channel(channel_id),
        text,
        now_ts(),
        message_id,
        false,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels;
    use crate::users;

    fn setup() -> (Store, i64, i64, i64) {
        let mut store = Store::new();
        let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
        let b = users::create_user(&mut store, "b@mail.com", "hash", "Bob", "Bc").unwrap();
        let cid = channels::channels_create(&mut store, a, "pub", true).unwrap();
        channels::channel_join(&mut store, b, cid).unwrap();
        (store, a, b, cid)
    }

    // Drives the state machine directly; the scheduled path is covered by
    // the timer tests in the integration suite.
    fn start_inline(store: &mut Store, u_id: i64, channel_id: i64, length: i64) -> u64 {
        let standup_id = store.next_standup_id();
        let time_finish = now_ts() + length;
        store.get_channel_mut(channel_id).unwrap().standup = Some(Standup {
            id: standup_id,
            starter: u_id,
            time_finish,
            buffer: String::new(),
        });
        standup_id
    }

    #[test]
    fn buffer_aggregates_and_flushes_as_starter() {
        let (mut store, a, b, cid) = setup();
        let standup_id = start_inline(&mut store, a, cid, 60);

        standup_send(&mut store, a, cid, "x").unwrap();
        standup_send(&mut store, b, cid, "y").unwrap();
        flush(&mut store, cid, standup_id);

        let channel = store.get_channel(cid).unwrap();
        assert!(channel.standup.is_none());
        assert_eq!(channel.messages.len(), 1);
        assert_eq!(channel.messages[0].message, "annab: x\nbobbc: y\n");
        assert_eq!(channel.messages[0].u_id, a);

        // The flush counts as a send.
        assert_eq!(store.workspace_stats.messages_exist.last(), 1);
        assert_eq!(store.user_stats[&a].messages_sent.last(), 1);
        // System post: nobody was notified.
        assert!(crate::notifications::notifications_get(&store, a).is_empty());
    }

    #[test]
    fn empty_buffer_posts_nothing() {
        let (mut store, a, _b, cid) = setup();
        let standup_id = start_inline(&mut store, a, cid, 60);
        flush(&mut store, cid, standup_id);

        assert!(store.get_channel(cid).unwrap().messages.is_empty());
        assert_eq!(store.workspace_stats.messages_exist.last(), 0);
    }

    #[test]
    fn stale_flush_is_a_no_op() {
        let (mut store, a, _b, cid) = setup();
        let old_id = start_inline(&mut store, a, cid, 60);
        standup_send(&mut store, a, cid, "kept").unwrap();

        // A different record replaces the scheduled one.
        store.get_channel_mut(cid).unwrap().standup = None;
        let new_id = start_inline(&mut store, a, cid, 60);
        assert_ne!(old_id, new_id);

        flush(&mut store, cid, old_id);
        assert!(store.get_channel(cid).unwrap().standup.is_some());
        assert!(store.get_channel(cid).unwrap().messages.is_empty());

        flush(&mut store, 99, new_id);
        assert!(store.get_channel(cid).unwrap().standup.is_some());
    }

    #[test]
    fn send_preconditions() {
        let (mut store, a, _b, cid) = setup();
        assert!(matches!(
            standup_send(&mut store, a, cid, "x"),
            Err(CoreError::InvalidInput(_))
        ));

        start_inline(&mut store, a, cid, 60);
        assert!(standup_send(&mut store, a, cid, &"x".repeat(1001)).is_err());

        let c = users::create_user(&mut store, "c@mail.com", "hash", "Cam", "Cd").unwrap();
        assert!(matches!(
            standup_send(&mut store, c, cid, "x"),
            Err(CoreError::Forbidden(_))
        ));
        // Membership is checked before the line length.
        assert!(matches!(
            standup_send(&mut store, c, cid, &"x".repeat(1001)),
            Err(CoreError::Forbidden(_))
        ));
        assert!(standup_send(&mut store, a, 99, "x").is_err());
    }

    // The error paths return before anything is scheduled, so no runtime is
    // needed here.
    #[test]
    fn start_rejects_outsiders_before_validating_length() {
        let streams = Arc::new(Streams::new());
        let c;
        let cid;
        {
            let mut store = streams.lock();
            let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
            c = users::create_user(&mut store, "c@mail.com", "hash", "Cam", "Cd").unwrap();
            cid = channels::channels_create(&mut store, a, "pub", true).unwrap();
        }
        assert!(matches!(
            standup_start(&streams, c, cid, -5),
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            standup_start(&streams, c, 99, -5),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn active_reports_window() {
        let (mut store, a, _b, cid) = setup();
        assert_eq!(standup_active(&store, a, cid).unwrap(), (false, None));

        start_inline(&mut store, a, cid, 60);
        let (is_active, finish) = standup_active(&store, a, cid).unwrap();
        assert!(is_active);
        assert!(finish.unwrap() >= now_ts());

        let c = users::create_user(&mut store, "c@mail.com", "hash", "Cam", "Cd").unwrap();
        assert!(matches!(
            standup_active(&store, c, cid),
            Err(CoreError::Forbidden(_))
        ));
    }
}
