//! The message state machine: create, edit, remove, share, react, pin,
//! deferred delivery, and search. Every mutation here also feeds the
//! notification and statistics subsystems before the store lock is released.

use std::sync::Arc;

use streams_types::api::MessagesResponse;
use streams_types::models::{MessageOutput, ReactOutput};

use crate::error::{CoreError, Result};
use crate::model::{Message, REMOVED_USER_TEXT};
use crate::notifications;
use crate::scheduler;
use crate::stats;
use crate::store::{GroupId, Store};
use crate::{Streams, now_ts};

/// The only react kind the service understands.
pub const REACT_THUMBS_UP: i64 = 1;

pub const MAX_MESSAGE_LEN: usize = 1000;

fn validate_text(text: &str) -> Result<()> {
    let len = text.chars().count();
    if len == 0 || len > MAX_MESSAGE_LEN {
        return Err(CoreError::invalid(
            "message must be between 1 and 1000 characters",
        ));
    }
    Ok(())
}

pub fn to_output(message: &Message, viewer: i64) -> MessageOutput {
    MessageOutput {
        message_id: message.message_id,
        u_id: message.u_id,
        message: message.message.clone(),
        time_created: message.time_created,
        reacts: vec![ReactOutput {
            react_id: REACT_THUMBS_UP,
            u_ids: message.reacts.clone(),
            is_this_user_reacted: message.reacts.contains(&viewer),
        }],
        is_pinned: message.is_pinned,
    }
}

/// Insert a finished message at the head of its group and emit the send
/// side effects. The group must exist and `message_id` must already be
/// reserved.
pub(crate) fn deliver(
    store: &mut Store,
    u_id: i64,
    group: GroupId,
    text: String,
    time_created: i64,
    message_id: i64,
    scan_tags: bool,
) {
    let message = Message::new(message_id, u_id, text.clone(), time_created);
    if let Ok(messages) = store.messages_mut(group) {
        messages.push_front(message);
    }
    stats::record_message_sent(store, u_id);
    if scan_tags {
        notifications::notify_tagged(store, u_id, group, &text);
    }
}

pub fn message_send(store: &mut Store, u_id: i64, channel_id: i64, text: &str) -> Result<i64> {
    store.get_channel(channel_id)?;
    let group = GroupId::Channel(channel_id);
    if !store.is_member(u_id, group) {
        return Err(CoreError::forbidden("user is not a member of the channel"));
    }
    validate_text(text)?;
    let message_id = store.next_message_id();
    deliver(store, u_id, group, text.to_string(), now_ts(), message_id, true);
    Ok(message_id)
}

pub fn message_senddm(store: &mut Store, u_id: i64, dm_id: i64, text: &str) -> Result<i64> {
    store.get_dm(dm_id)?;
    let group = GroupId::Dm(dm_id);
    if !store.is_member(u_id, group) {
        return Err(CoreError::forbidden("user is not a member of the DM"));
    }
    validate_text(text)?;
    let message_id = store.next_message_id();
    deliver(store, u_id, group, text.to_string(), now_ts(), message_id, true);
    Ok(message_id)
}

/// Edit rights: the author, or anyone with owner perms in the group. Either
/// way the caller must still be in the group; a stale token for a user who
/// was removed from it gets Forbidden.
fn check_edit_rights(store: &Store, u_id: i64, group: GroupId, author: i64) -> Result<()> {
    if !store.is_member(u_id, group) {
        return Err(CoreError::forbidden("user is not a member of the group"));
    }
    if u_id != author && !store.has_owner_perms(u_id, group) {
        return Err(CoreError::forbidden(
            "user is neither the author nor an owner",
        ));
    }
    Ok(())
}

pub fn message_edit(store: &mut Store, u_id: i64, message_id: i64, text: &str) -> Result<()> {
    let (group, index) = store.find_message(message_id)?;
    let author = store.messages(group)?[index].u_id;
    check_edit_rights(store, u_id, group, author)?;
    if text.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::invalid("message must be at most 1000 characters"));
    }

    if text.is_empty() {
        store.messages_mut(group)?.remove(index);
    } else {
        store.messages_mut(group)?[index].message = text.to_string();
    }
    Ok(())
}

/// Removal never walks `messages_exist` back down: the series counts send
/// events, not live messages.
pub fn message_remove(store: &mut Store, u_id: i64, message_id: i64) -> Result<()> {
    let (group, index) = store.find_message(message_id)?;
    let author = store.messages(group)?[index].u_id;
    check_edit_rights(store, u_id, group, author)?;
    store.messages_mut(group)?.remove(index);
    Ok(())
}

/// Membership failures here are InvalidInput, not Forbidden: an outsider's
/// react targets a message that is not valid from where they stand.
pub fn message_react(store: &mut Store, u_id: i64, message_id: i64, react_id: i64) -> Result<()> {
    if react_id != REACT_THUMBS_UP {
        return Err(CoreError::invalid("react_id is not a valid react"));
    }
    let (group, index) = store.find_message(message_id)?;
    if !store.is_member(u_id, group) {
        return Err(CoreError::invalid(
            "message is not in a group the user has joined",
        ));
    }
    let author = store.messages(group)?[index].u_id;
    if store.messages(group)?[index].reacts.contains(&u_id) {
        return Err(CoreError::invalid("user has already reacted"));
    }
    store.messages_mut(group)?[index].reacts.push(u_id);
    notifications::notify_reacted(store, u_id, group, author);
    Ok(())
}

pub fn message_unreact(store: &mut Store, u_id: i64, message_id: i64, react_id: i64) -> Result<()> {
    if react_id != REACT_THUMBS_UP {
        return Err(CoreError::invalid("react_id is not a valid react"));
    }
    let (group, index) = store.find_message(message_id)?;
    if !store.is_member(u_id, group) {
        return Err(CoreError::invalid(
            "message is not in a group the user has joined",
        ));
    }
    let messages = store.messages_mut(group)?;
    let Some(at) = messages[index].reacts.iter().position(|&r| r == u_id) else {
        return Err(CoreError::invalid("user has not reacted to this message"));
    };
    messages[index].reacts.remove(at);
    Ok(())
}

pub fn message_pin(store: &mut Store, u_id: i64, message_id: i64) -> Result<()> {
    let (group, index) = store.find_message(message_id)?;
    if !store.has_owner_perms(u_id, group) {
        return Err(CoreError::forbidden(
            "user does not have owner permissions in the group",
        ));
    }
    let message = &mut store.messages_mut(group)?[index];
    if message.is_pinned {
        return Err(CoreError::invalid("message is already pinned"));
    }
    message.is_pinned = true;
    Ok(())
}

pub fn message_unpin(store: &mut Store, u_id: i64, message_id: i64) -> Result<()> {
    let (group, index) = store.find_message(message_id)?;
    if !store.has_owner_perms(u_id, group) {
        return Err(CoreError::forbidden(
            "user does not have owner permissions in the group",
        ));
    }
    let message = &mut store.messages_mut(group)?[index];
    if !message.is_pinned {
        return Err(CoreError::invalid("message is not pinned"));
    }
    message.is_pinned = false;
    Ok(())
}

/// Share copies the source text into a brand-new message in the target
/// group; the original keeps its identity and the copy gets its own id.
pub fn message_share(
    store: &mut Store,
    u_id: i64,
    og_message_id: i64,
    extra: &str,
    channel_id: i64,
    dm_id: i64,
) -> Result<i64> {
    let target = match (channel_id, dm_id) {
        (c, -1) if c != -1 => GroupId::Channel(c),
        (-1, d) if d != -1 => GroupId::Dm(d),
        _ => {
            return Err(CoreError::invalid(
                "exactly one of channel_id and dm_id must be -1",
            ));
        }
    };
    if !store.group_exists(target) {
        return Err(CoreError::invalid("target group does not exist"));
    }
    let (source, index) = store.find_message(og_message_id)?;
    if !store.is_member(u_id, source) {
        return Err(CoreError::invalid(
            "message is not in a group the user has joined",
        ));
    }
    if !store.is_member(u_id, target) {
        return Err(CoreError::forbidden(
            "user is not a member of the target group",
        ));
    }
    if extra.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::invalid("message must be at most 1000 characters"));
    }

    let source_text = store.messages(source)?[index].message.clone();
    let text = if extra.is_empty() {
        source_text
    } else {
        format!("{source_text}, {extra}")
    };
    let message_id = store.next_message_id();
    deliver(store, u_id, target, text, now_ts(), message_id, true);
    Ok(message_id)
}

// -- Deferred delivery --

/// Timer-side completion of a scheduled send. Re-validates under a fresh
/// lock: a vanished group makes this a no-op, and a removed author has their
/// text rewritten before insertion.
pub(crate) fn fire_deferred(
    store: &mut Store,
    u_id: i64,
    group: GroupId,
    text: String,
    message_id: i64,
    time_sent: i64,
) {
    if !store.group_exists(group) {
        return;
    }
    let text = if store.is_removed(u_id) {
        REMOVED_USER_TEXT.to_string()
    } else {
        text
    };
    deliver(store, u_id, group, text, time_sent, message_id, true);
}

fn send_later_common(
    streams: &Arc<Streams>,
    u_id: i64,
    group: GroupId,
    text: String,
    time_sent: i64,
) -> Result<i64> {
    let message_id;
    let epoch;
    {
        let mut store = streams.lock();
        match group {
            GroupId::Channel(id) => {
                store.get_channel(id)?;
            }
            GroupId::Dm(id) => {
                store.get_dm(id)?;
            }
        }
        if !store.is_member(u_id, group) {
            return Err(CoreError::forbidden("user is not a member of the group"));
        }
        validate_text(&text)?;
        if time_sent < now_ts() {
            return Err(CoreError::invalid("time_sent is in the past"));
        }
        // Reserve the id now so callers observe ids in request order even
        // though delivery happens later.
        message_id = store.next_message_id();
        epoch = store.epoch();
    }

    let streams = Arc::clone(streams);
    scheduler::schedule(time_sent - now_ts(), move || {
        let mut store = streams.lock();
        if store.epoch() != epoch {
            return;
        }
        fire_deferred(&mut store, u_id, group, text, message_id, time_sent);
    });
    Ok(message_id)
}

pub fn message_send_later(
    streams: &Arc<Streams>,
    u_id: i64,
    channel_id: i64,
    text: String,
    time_sent: i64,
) -> Result<i64> {
    send_later_common(streams, u_id, GroupId::Channel(channel_id), text, time_sent)
}

pub fn message_send_later_dm(
    streams: &Arc<Streams>,
    u_id: i64,
    dm_id: i64,
    text: String,
    time_sent: i64,
) -> Result<i64> {
    send_later_common(streams, u_id, GroupId::Dm(dm_id), text, time_sent)
}

// -- Pagination and search --

/// Page a group's most-recent-first sequence. `end` points at the next page,
/// or -1 when this page reaches the oldest message.
pub fn paginate(store: &Store, viewer: i64, group: GroupId, start: i64) -> Result<MessagesResponse> {
    let messages = store.messages(group)?;
    if start < 0 || start as usize > messages.len() {
        return Err(CoreError::invalid(
            "start is greater than the total number of messages",
        ));
    }
    let from = start as usize;
    let page: Vec<MessageOutput> = messages
        .iter()
        .skip(from)
        .take(50)
        .map(|m| to_output(m, viewer))
        .collect();
    let end = if from + 50 < messages.len() {
        start + 50
    } else {
        -1
    };
    Ok(MessagesResponse {
        messages: page,
        start,
        end,
    })
}

/// Case-insensitive substring scan over every message in every group the
/// caller belongs to.
pub fn search(store: &Store, u_id: i64, query: &str) -> Result<Vec<MessageOutput>> {
    let len = query.chars().count();
    if len == 0 || len > MAX_MESSAGE_LEN {
        return Err(CoreError::invalid(
            "query must be between 1 and 1000 characters",
        ));
    }
    let needle = query.to_lowercase();
    let mut results = Vec::new();
    for channel in &store.channels {
        if !channel.all_members.contains(&u_id) {
            continue;
        }
        for message in &channel.messages {
            if message.message.to_lowercase().contains(&needle) {
                results.push(to_output(message, u_id));
            }
        }
    }
    for dm in &store.dms {
        if !dm.members.contains(&u_id) {
            continue;
        }
        for message in &dm.messages {
            if message.message.to_lowercase().contains(&needle) {
                results.push(to_output(message, u_id));
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels;
    use crate::dms;
    use crate::users;

    fn setup() -> (Store, i64, i64, i64) {
        let mut store = Store::new();
        let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
        let b = users::create_user(&mut store, "b@mail.com", "hash", "Bob", "Bc").unwrap();
        let cid = channels::channels_create(&mut store, a, "pub", true).unwrap();
        (store, a, b, cid)
    }

    #[test]
    fn send_orders_most_recent_first() {
        let (mut store, a, b, cid) = setup();
        channels::channel_join(&mut store, b, cid).unwrap();
        let first = message_send(&mut store, a, cid, "hi").unwrap();
        let second = message_send(&mut store, b, cid, "@annab hello").unwrap();

        let page = paginate(&store, a, GroupId::Channel(cid), 0).unwrap();
        assert_eq!(page.messages.len(), 2);
        assert_eq!(page.messages[0].message_id, second);
        assert_eq!(page.messages[1].message_id, first);
        assert_eq!(page.end, -1);

        // B's send tagged A.
        let notes = notifications::notifications_get(&store, a);
        assert_eq!(
            notes[0].notification_message,
            "bobbc tagged you in pub: @annab hello"
        );
    }

    #[test]
    fn send_validation_order() {
        let (mut store, _a, b, cid) = setup();
        assert_eq!(
            message_send(&mut store, b, 99, "hi"),
            Err(CoreError::invalid("channel_id does not refer to a valid channel"))
        );
        assert!(matches!(
            message_send(&mut store, b, cid, "hi"),
            Err(CoreError::Forbidden(_))
        ));
        channels::channel_join(&mut store, b, cid).unwrap();
        assert!(matches!(
            message_send(&mut store, b, cid, ""),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            message_send(&mut store, b, cid, &"x".repeat(1001)),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(message_send(&mut store, b, cid, &"x".repeat(1000)).is_ok());
    }

    #[test]
    fn edit_keeps_id_and_empty_edit_removes() {
        let (mut store, a, _b, cid) = setup();
        let mid = message_send(&mut store, a, cid, "draft").unwrap();

        message_edit(&mut store, a, mid, "final").unwrap();
        let page = paginate(&store, a, GroupId::Channel(cid), 0).unwrap();
        assert_eq!(page.messages[0].message_id, mid);
        assert_eq!(page.messages[0].message, "final");

        message_edit(&mut store, a, mid, "").unwrap();
        let page = paginate(&store, a, GroupId::Channel(cid), 0).unwrap();
        assert!(page.messages.is_empty());
        assert!(store.find_message(mid).is_err());

        // Send events are not walked back by removal.
        assert_eq!(store.workspace_stats.messages_exist.last(), 1);
    }

    #[test]
    fn edit_rights() {
        let (mut store, a, b, cid) = setup();
        channels::channel_join(&mut store, b, cid).unwrap();
        let mid = message_send(&mut store, b, cid, "mine").unwrap();

        // A has owner perms; B is the author; both may edit.
        message_edit(&mut store, a, mid, "owner edit").unwrap();
        message_edit(&mut store, b, mid, "author edit").unwrap();

        let c = users::create_user(&mut store, "c@mail.com", "hash", "Cam", "Cd").unwrap();
        channels::channel_join(&mut store, c, cid).unwrap();
        assert!(matches!(
            message_edit(&mut store, c, mid, "nope"),
            Err(CoreError::Forbidden(_))
        ));

        channels::channel_leave(&mut store, b, cid).unwrap();
        assert!(matches!(
            message_edit(&mut store, b, mid, "stale"),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn authorization_outranks_length_validation() {
        let (mut store, a, b, cid) = setup();
        let mid = message_send(&mut store, a, cid, "kept").unwrap();

        // A non-member's oversized edit fails on membership, not length.
        assert!(matches!(
            message_edit(&mut store, b, mid, &"x".repeat(1001)),
            Err(CoreError::Forbidden(_))
        ));

        // Same for a share into a channel the caller never joined.
        let did = dms::dm_create(&mut store, a, &[b]).unwrap();
        let og = message_senddm(&mut store, b, did, "src").unwrap();
        assert!(matches!(
            message_share(&mut store, b, og, &"x".repeat(1001), cid, -1),
            Err(CoreError::Forbidden(_))
        ));
    }

    // Error paths return before anything is scheduled, so no runtime needed.
    #[test]
    fn send_later_checks_membership_before_text() {
        let streams = Arc::new(Streams::new());
        let b;
        let cid;
        {
            let mut store = streams.lock();
            let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
            b = users::create_user(&mut store, "b@mail.com", "hash", "Bob", "Bc").unwrap();
            cid = channels::channels_create(&mut store, a, "pub", true).unwrap();
        }
        let when = now_ts() + 60;
        assert!(matches!(
            message_send_later(&streams, b, cid, "x".repeat(1001), when),
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            message_send_later(&streams, b, 99, "hi".into(), when),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn react_contract_uses_invalid_input() {
        let (mut store, a, b, cid) = setup();
        let mid = message_send(&mut store, a, cid, "react to me").unwrap();

        assert!(matches!(
            message_react(&mut store, a, mid, 2),
            Err(CoreError::InvalidInput(_))
        ));
        // Non-member: InvalidInput, not Forbidden.
        assert!(matches!(
            message_react(&mut store, b, mid, 1),
            Err(CoreError::InvalidInput(_))
        ));

        message_react(&mut store, a, mid, 1).unwrap();
        assert!(matches!(
            message_react(&mut store, a, mid, 1),
            Err(CoreError::InvalidInput(_))
        ));

        let notes = notifications::notifications_get(&store, a);
        assert_eq!(
            notes[0].notification_message,
            "annab reacted to your message in pub"
        );

        message_unreact(&mut store, a, mid, 1).unwrap();
        assert!(matches!(
            message_unreact(&mut store, a, mid, 1),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn pin_requires_owner_perms_and_rejects_double_pin() {
        let (mut store, a, b, cid) = setup();
        channels::channel_join(&mut store, b, cid).unwrap();
        let mid = message_send(&mut store, b, cid, "pin me").unwrap();

        // B authored it but has no owner perms.
        assert!(matches!(
            message_pin(&mut store, b, mid),
            Err(CoreError::Forbidden(_))
        ));
        message_pin(&mut store, a, mid).unwrap();
        assert!(matches!(
            message_pin(&mut store, a, mid),
            Err(CoreError::InvalidInput(_))
        ));
        message_unpin(&mut store, a, mid).unwrap();
        assert!(matches!(
            message_unpin(&mut store, a, mid),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn share_joins_with_comma_space_and_mints_new_id() {
        let (mut store, a, b, _cid) = setup();
        let src_channel = channels::channels_create(&mut store, a, "src", true).unwrap();
        let did = dms::dm_create(&mut store, a, &[b]).unwrap();
        let og = message_send(&mut store, a, src_channel, "original").unwrap();

        let shared = message_share(&mut store, a, og, "extra", -1, did).unwrap();
        assert_ne!(shared, og);
        let page = paginate(&store, a, GroupId::Dm(did), 0).unwrap();
        assert_eq!(page.messages[0].message, "original, extra");

        let plain = message_share(&mut store, a, og, "", -1, did).unwrap();
        let page = paginate(&store, a, GroupId::Dm(did), 0).unwrap();
        assert_eq!(page.messages[0].message_id, plain);
        assert_eq!(page.messages[0].message, "original");

        // Both targets, or neither, is malformed.
        assert!(matches!(
            message_share(&mut store, a, og, "", -1, -1),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            message_share(&mut store, a, og, "", src_channel, did),
            Err(CoreError::InvalidInput(_))
        ));

        // B is in the DM but not in the source channel.
        assert!(matches!(
            message_share(&mut store, b, og, "", -1, did),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn pagination_window() {
        let (mut store, a, _b, cid) = setup();
        for i in 0..60 {
            message_send(&mut store, a, cid, &format!("m{i}")).unwrap();
        }
        let page = paginate(&store, a, GroupId::Channel(cid), 0).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, 50);
        assert_eq!(page.messages[0].message, "m59");

        let page = paginate(&store, a, GroupId::Channel(cid), 50).unwrap();
        assert_eq!(page.messages.len(), 10);
        assert_eq!(page.end, -1);

        // start == len is valid and empty; start beyond is not.
        assert_eq!(
            paginate(&store, a, GroupId::Channel(cid), 60).unwrap().end,
            -1
        );
        assert!(paginate(&store, a, GroupId::Channel(cid), 61).is_err());
    }

    #[test]
    fn search_scans_only_joined_groups() {
        let (mut store, a, b, cid) = setup();
        let other = channels::channels_create(&mut store, b, "other", true).unwrap();
        message_send(&mut store, a, cid, "needle in pub").unwrap();
        message_send(&mut store, b, other, "needle in other").unwrap();

        let hits = search(&store, a, "NEEDLE").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message, "needle in pub");

        assert!(search(&store, a, "").is_err());
        assert!(search(&store, a, &"q".repeat(1001)).is_err());
    }
}
