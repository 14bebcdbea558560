//! Per-user notification rings and the three event shapes that feed them:
//! tags, reacts, and group adds.

use std::collections::VecDeque;

use streams_types::models::NotificationOutput;

use crate::model::Notification;
use crate::store::{GroupId, Store};

/// Each user keeps only their most recent notifications; the oldest is
/// evicted on overflow.
pub const QUEUE_CAP: usize = 20;

fn push(store: &mut Store, u_id: i64, group: GroupId, message: String) {
    let (channel_id, dm_id) = group.notification_ids();
    let queue = store.notifications.entry(u_id).or_default();
    queue.push_back(Notification {
        channel_id,
        dm_id,
        message,
    });
    if queue.len() > QUEUE_CAP {
        queue.pop_front();
    }
}

/// Resolve `@handle` tags in a message body. The scan takes the substring
/// from the first `@` to the end, splits it on whitespace, then splits each
/// token on `@` and tries every piece as a handle. An `@` counts only if a
/// piece names a currently-existing handle; each uid is reported once.
pub fn tagged_uids(store: &Store, text: &str) -> Vec<i64> {
    let Some(at) = text.find('@') else {
        return Vec::new();
    };
    let mut uids = Vec::new();
    for token in text[at..].split_whitespace() {
        for piece in token.split('@') {
            if piece.is_empty() {
                continue;
            }
            if let Some(user) = store.user_by_handle(piece) {
                if !uids.contains(&user.u_id) {
                    uids.push(user.u_id);
                }
            }
        }
    }
    uids
}

/// Emit one tag notification per distinct tagged uid in `text`.
pub fn notify_tagged(store: &mut Store, sender: i64, group: GroupId, text: &str) {
    let Ok(name) = store.group_name(group) else {
        return;
    };
    let Ok(handle) = store.get_user(sender).map(|u| u.handle.clone()) else {
        return;
    };
    let preview: String = text.chars().take(20).collect();
    let message = format!("{handle} tagged you in {name}: {preview}");
    for u_id in tagged_uids(store, text) {
        push(store, u_id, group, message.clone());
    }
}

pub fn notify_reacted(store: &mut Store, reactor: i64, group: GroupId, author: i64) {
    let Ok(name) = store.group_name(group) else {
        return;
    };
    let Ok(handle) = store.get_user(reactor).map(|u| u.handle.clone()) else {
        return;
    };
    let message = format!("{handle} reacted to your message in {name}");
    push(store, author, group, message);
}

pub fn notify_added(store: &mut Store, adder: i64, group: GroupId, target: i64) {
    let Ok(name) = store.group_name(group) else {
        return;
    };
    let Ok(handle) = store.get_user(adder).map(|u| u.handle.clone()) else {
        return;
    };
    let message = format!("{handle} added you to {name}");
    push(store, target, group, message);
}

/// The user's ring, newest first.
pub fn notifications_get(store: &Store, u_id: i64) -> Vec<NotificationOutput> {
    store
        .notifications
        .get(&u_id)
        .unwrap_or(&VecDeque::new())
        .iter()
        .rev()
        .map(|n| NotificationOutput {
            channel_id: n.channel_id,
            dm_id: n.dm_id,
            notification_message: n.message.clone(),
        })
        .collect()
}
