//! Channel lifecycle and membership. Channels are never deleted; a channel
//! with no members keeps its name and history.

use streams_types::api::{ChannelDetailsResponse, MessagesResponse};
use streams_types::models::ChannelSummary;

use crate::error::{CoreError, Result};
use crate::messaging;
use crate::model::Channel;
use crate::notifications;
use crate::stats;
use crate::store::{GroupId, Store};
use crate::users;

pub const MAX_CHANNEL_NAME_LEN: usize = 20;

pub fn channels_create(store: &mut Store, u_id: i64, name: &str, is_public: bool) -> Result<i64> {
    let len = name.chars().count();
    if len == 0 || len > MAX_CHANNEL_NAME_LEN {
        return Err(CoreError::invalid(
            "channel name must be between 1 and 20 characters",
        ));
    }
    let channel_id = store.next_channel_id();
    store.channels.push(Channel {
        channel_id,
        name: name.to_string(),
        is_public,
        owner_members: vec![u_id],
        all_members: vec![u_id],
        messages: Default::default(),
        standup: None,
    });
    stats::bump_channels_joined(store, u_id, 1);
    stats::bump_channels_exist(store, 1);
    Ok(channel_id)
}

pub fn channels_list(store: &Store, u_id: i64) -> Vec<ChannelSummary> {
    store
        .channels
        .iter()
        .filter(|c| c.all_members.contains(&u_id))
        .map(|c| ChannelSummary {
            channel_id: c.channel_id,
            name: c.name.clone(),
        })
        .collect()
}

pub fn channels_listall(store: &Store) -> Vec<ChannelSummary> {
    store
        .channels
        .iter()
        .map(|c| ChannelSummary {
            channel_id: c.channel_id,
            name: c.name.clone(),
        })
        .collect()
}

pub fn channel_join(store: &mut Store, u_id: i64, channel_id: i64) -> Result<()> {
    let is_global_owner = store.is_global_owner(u_id);
    let channel = store.get_channel_mut(channel_id)?;
    if channel.all_members.contains(&u_id) {
        return Err(CoreError::invalid("user is already a member"));
    }
    if !channel.is_public && !is_global_owner {
        return Err(CoreError::forbidden("channel is private"));
    }
    channel.all_members.push(u_id);
    stats::bump_channels_joined(store, u_id, 1);
    Ok(())
}

pub fn channel_invite(store: &mut Store, u_id: i64, channel_id: i64, target: i64) -> Result<()> {
    store.get_channel(channel_id)?;
    store.get_active_user(target)?;
    let channel = store.get_channel(channel_id)?;
    if channel.all_members.contains(&target) {
        return Err(CoreError::invalid("user is already a member"));
    }
    if !channel.all_members.contains(&u_id) {
        return Err(CoreError::forbidden("inviter is not a member of the channel"));
    }
    store.get_channel_mut(channel_id)?.all_members.push(target);
    stats::bump_channels_joined(store, target, 1);
    notifications::notify_added(store, u_id, GroupId::Channel(channel_id), target);
    Ok(())
}

/// The starter of an active standup cannot leave: their buffered flush
/// still has to land in the channel.
pub fn channel_leave(store: &mut Store, u_id: i64, channel_id: i64) -> Result<()> {
    let channel = store.get_channel(channel_id)?;
    if !channel.all_members.contains(&u_id) {
        return Err(CoreError::forbidden("user is not a member of the channel"));
    }
    if channel
        .standup
        .as_ref()
        .is_some_and(|s| s.starter == u_id)
    {
        return Err(CoreError::invalid(
            "user is the starter of an active standup",
        ));
    }
    let channel = store.get_channel_mut(channel_id)?;
    channel.all_members.retain(|&m| m != u_id);
    channel.owner_members.retain(|&m| m != u_id);
    stats::bump_channels_joined(store, u_id, -1);
    Ok(())
}

pub fn channel_addowner(store: &mut Store, u_id: i64, channel_id: i64, target: i64) -> Result<()> {
    store.get_channel(channel_id)?;
    store.get_active_user(target)?;
    let channel = store.get_channel(channel_id)?;
    if !channel.all_members.contains(&target) {
        return Err(CoreError::invalid("user is not a member of the channel"));
    }
    if channel.owner_members.contains(&target) {
        return Err(CoreError::invalid("user is already an owner"));
    }
    if !store.has_owner_perms(u_id, GroupId::Channel(channel_id)) {
        return Err(CoreError::forbidden(
            "user does not have owner permissions in the channel",
        ));
    }
    store.get_channel_mut(channel_id)?.owner_members.push(target);
    Ok(())
}

pub fn channel_removeowner(
    store: &mut Store,
    u_id: i64,
    channel_id: i64,
    target: i64,
) -> Result<()> {
    store.get_channel(channel_id)?;
    store.get_active_user(target)?;
    let channel = store.get_channel(channel_id)?;
    if !channel.owner_members.contains(&target) {
        return Err(CoreError::invalid("user is not an owner of the channel"));
    }
    if channel.owner_members.len() == 1 {
        return Err(CoreError::invalid("user is the only owner of the channel"));
    }
    if !store.has_owner_perms(u_id, GroupId::Channel(channel_id)) {
        return Err(CoreError::forbidden(
            "user does not have owner permissions in the channel",
        ));
    }
    store
        .get_channel_mut(channel_id)?
        .owner_members
        .retain(|&m| m != target);
    Ok(())
}

pub fn channel_details(
    store: &Store,
    u_id: i64,
    channel_id: i64,
) -> Result<ChannelDetailsResponse> {
    let channel = store.get_channel(channel_id)?;
    if !channel.all_members.contains(&u_id) {
        return Err(CoreError::forbidden("user is not a member of the channel"));
    }
    Ok(ChannelDetailsResponse {
        name: channel.name.clone(),
        is_public: channel.is_public,
        owner_members: users::profiles(store, &channel.owner_members)?,
        all_members: users::profiles(store, &channel.all_members)?,
    })
}

pub fn channel_messages(
    store: &Store,
    u_id: i64,
    channel_id: i64,
    start: i64,
) -> Result<MessagesResponse> {
    store.get_channel(channel_id)?;
    let group = GroupId::Channel(channel_id);
    if !store.is_member(u_id, group) {
        return Err(CoreError::forbidden("user is not a member of the channel"));
    }
    messaging::paginate(store, u_id, group, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users;

    fn setup() -> (Store, i64, i64) {
        let mut store = Store::new();
        let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
        let b = users::create_user(&mut store, "b@mail.com", "hash", "Bob", "Bc").unwrap();
        (store, a, b)
    }

    #[test]
    fn create_assigns_ids_and_sole_ownership() {
        let (mut store, a, _b) = setup();
        let c0 = channels_create(&mut store, a, "pub", true).unwrap();
        let c1 = channels_create(&mut store, a, "second", false).unwrap();
        assert_eq!((c0, c1), (0, 1));

        let details = channel_details(&store, a, c0).unwrap();
        assert_eq!(details.owner_members.len(), 1);
        assert_eq!(details.all_members.len(), 1);
        assert!(details.is_public);

        assert!(channels_create(&mut store, a, "", true).is_err());
        assert!(channels_create(&mut store, a, &"n".repeat(21), true).is_err());
    }

    #[test]
    fn join_respects_privacy_except_for_global_owners() {
        let (mut store, a, b) = setup();
        // B (not a global owner) creates a private channel; A is the first
        // registered user and so a global owner.
        let private = channels_create(&mut store, b, "private", false).unwrap();
        let c = users::create_user(&mut store, "c@mail.com", "hash", "Cam", "Cd").unwrap();

        assert!(matches!(
            channel_join(&mut store, c, private),
            Err(CoreError::Forbidden(_))
        ));
        channel_join(&mut store, a, private).unwrap();
        assert!(matches!(
            channel_join(&mut store, a, private),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(channel_join(&mut store, c, 42).is_err());
    }

    #[test]
    fn invite_adds_and_notifies() {
        let (mut store, a, b) = setup();
        let cid = channels_create(&mut store, a, "pub", true).unwrap();
        channel_invite(&mut store, a, cid, b).unwrap();

        assert!(store.is_member(b, GroupId::Channel(cid)));
        let notes = crate::notifications::notifications_get(&store, b);
        assert_eq!(notes[0].notification_message, "annab added you to pub");

        assert!(matches!(
            channel_invite(&mut store, a, cid, b),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn listing_filters_by_membership() {
        let (mut store, a, b) = setup();
        let mine = channels_create(&mut store, a, "mine", true).unwrap();
        let theirs = channels_create(&mut store, b, "theirs", true).unwrap();

        let listed = channels_list(&store, a);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].channel_id, mine);

        let all = channels_listall(&store);
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|c| c.channel_id == theirs));
    }

    #[test]
    fn owner_set_stays_subset_of_members() {
        let (mut store, a, b) = setup();
        let cid = channels_create(&mut store, a, "pub", true).unwrap();
        channel_join(&mut store, b, cid).unwrap();

        channel_addowner(&mut store, a, cid, b).unwrap();
        assert!(matches!(
            channel_addowner(&mut store, a, cid, b),
            Err(CoreError::InvalidInput(_))
        ));

        channel_removeowner(&mut store, b, cid, a).unwrap();
        assert!(matches!(
            channel_removeowner(&mut store, b, cid, b),
            Err(CoreError::InvalidInput(_))
        ));

        channel_leave(&mut store, b, cid).unwrap();
        let channel = store.get_channel(cid).unwrap();
        assert!(channel.owner_members.is_empty());
        assert_eq!(channel.all_members, vec![a]);
        for owner in &channel.owner_members {
            assert!(channel.all_members.contains(owner));
        }
    }

    #[test]
    fn stats_track_joins_and_leaves() {
        let (mut store, a, b) = setup();
        let cid = channels_create(&mut store, a, "pub", true).unwrap();
        channel_join(&mut store, b, cid).unwrap();
        channel_leave(&mut store, b, cid).unwrap();

        let joined = &store.user_stats[&b].channels_joined;
        let values: Vec<i64> = joined.points().iter().map(|&(v, _)| v).collect();
        assert_eq!(values, vec![0, 1, 0]);
        assert_eq!(store.workspace_stats.channels_exist.last(), 1);
    }
}
