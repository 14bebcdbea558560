//! The process-wide in-memory state and the authorization queries evaluated
//! against it. Everything lives in owned collections; there is no
//! persistence, and `clear` resets the whole shape.

use std::collections::{HashMap, VecDeque};

use crate::error::{CoreError, Result};
use crate::model::{Channel, Dm, Message, Notification, User};
use crate::now_ts;
use crate::stats::{UserSeries, WorkspaceSeries};

/// A channel or a DM: the two containers a message can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupId {
    Channel(i64),
    Dm(i64),
}

impl GroupId {
    /// The (channel_id, dm_id) pair as it appears in notifications, with -1
    /// standing in for the absent side.
    pub fn notification_ids(self) -> (i64, i64) {
        match self {
            GroupId::Channel(id) => (id, -1),
            GroupId::Dm(id) => (-1, id),
        }
    }
}

pub struct Store {
    pub(crate) users: Vec<User>,
    pub(crate) removed_users: Vec<User>,
    pub(crate) channels: Vec<Channel>,
    pub(crate) dms: Vec<Dm>,
    pub(crate) notifications: HashMap<i64, VecDeque<Notification>>,
    pub(crate) user_stats: HashMap<i64, UserSeries>,
    pub(crate) workspace_stats: WorkspaceSeries,
    sessions: HashMap<String, i64>,
    epoch: u64,
    next_message_id: i64,
    next_dm_id: i64,
    next_standup_id: u64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            removed_users: Vec::new(),
            channels: Vec::new(),
            dms: Vec::new(),
            notifications: HashMap::new(),
            user_stats: HashMap::new(),
            workspace_stats: WorkspaceSeries::new(now_ts()),
            sessions: HashMap::new(),
            epoch: 0,
            next_message_id: 0,
            next_dm_id: 0,
            next_standup_id: 0,
        }
    }

    /// Reset to the initial shape: no users, no groups, fresh workspace
    /// series, all sessions revoked. The epoch advances so timer jobs armed
    /// before the clear no-op instead of landing in the reset store, where
    /// reused channel and message ids would otherwise collide.
    pub fn clear(&mut self) {
        let epoch = self.epoch + 1;
        *self = Store::new();
        self.epoch = epoch;
    }

    /// Identifies the current store generation. Timer jobs capture this when
    /// armed and refuse to run against a later generation.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -- Users --

    /// Resolve a uid, including removed users: their messages remain on
    /// record and must stay attributable.
    pub fn get_user(&self, u_id: i64) -> Result<&User> {
        self.users
            .iter()
            .chain(self.removed_users.iter())
            .find(|u| u.u_id == u_id)
            .ok_or_else(|| CoreError::invalid("u_id does not refer to a valid user"))
    }

    pub fn get_active_user(&self, u_id: i64) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.u_id == u_id)
            .ok_or_else(|| CoreError::invalid("u_id does not refer to a valid user"))
    }

    pub(crate) fn get_active_user_mut(&mut self, u_id: i64) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.u_id == u_id)
            .ok_or_else(|| CoreError::invalid("u_id does not refer to a valid user"))
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_handle(&self, handle: &str) -> Option<&User> {
        self.users.iter().find(|u| u.handle == handle)
    }

    pub fn is_removed(&self, u_id: i64) -> bool {
        self.removed_users.iter().any(|u| u.u_id == u_id)
    }

    pub(crate) fn next_user_id(&self) -> i64 {
        self.users
            .iter()
            .chain(self.removed_users.iter())
            .map(|u| u.u_id)
            .max()
            .map_or(0, |m| m + 1)
    }

    // -- Channels and DMs --

    pub fn get_channel(&self, channel_id: i64) -> Result<&Channel> {
        self.channels
            .iter()
            .find(|c| c.channel_id == channel_id)
            .ok_or_else(|| CoreError::invalid("channel_id does not refer to a valid channel"))
    }

    pub(crate) fn get_channel_mut(&mut self, channel_id: i64) -> Result<&mut Channel> {
        self.channels
            .iter_mut()
            .find(|c| c.channel_id == channel_id)
            .ok_or_else(|| CoreError::invalid("channel_id does not refer to a valid channel"))
    }

    pub fn get_dm(&self, dm_id: i64) -> Result<&Dm> {
        self.dms
            .iter()
            .find(|d| d.dm_id == dm_id)
            .ok_or_else(|| CoreError::invalid("dm_id does not refer to a valid DM"))
    }

    pub(crate) fn get_dm_mut(&mut self, dm_id: i64) -> Result<&mut Dm> {
        self.dms
            .iter_mut()
            .find(|d| d.dm_id == dm_id)
            .ok_or_else(|| CoreError::invalid("dm_id does not refer to a valid DM"))
    }

    pub(crate) fn next_channel_id(&self) -> i64 {
        self.channels
            .iter()
            .map(|c| c.channel_id)
            .max()
            .map_or(0, |m| m + 1)
    }

    // -- Group queries --

    pub fn group_exists(&self, group: GroupId) -> bool {
        match group {
            GroupId::Channel(id) => self.get_channel(id).is_ok(),
            GroupId::Dm(id) => self.get_dm(id).is_ok(),
        }
    }

    pub fn group_name(&self, group: GroupId) -> Result<String> {
        match group {
            GroupId::Channel(id) => Ok(self.get_channel(id)?.name.clone()),
            GroupId::Dm(id) => Ok(self.get_dm(id)?.name.clone()),
        }
    }

    pub fn is_member(&self, u_id: i64, group: GroupId) -> bool {
        match group {
            GroupId::Channel(id) => self
                .get_channel(id)
                .map(|c| c.all_members.contains(&u_id))
                .unwrap_or(false),
            GroupId::Dm(id) => self
                .get_dm(id)
                .map(|d| d.members.contains(&u_id))
                .unwrap_or(false),
        }
    }

    /// Owner permissions: channel owners, plus global owners in channels
    /// they are a member of; for a DM, only the owner.
    pub fn has_owner_perms(&self, u_id: i64, group: GroupId) -> bool {
        match group {
            GroupId::Channel(id) => {
                let Ok(channel) = self.get_channel(id) else {
                    return false;
                };
                if channel.owner_members.contains(&u_id) {
                    return true;
                }
                self.is_global_owner(u_id) && channel.all_members.contains(&u_id)
            }
            GroupId::Dm(id) => self.get_dm(id).map(|d| d.owner == u_id).unwrap_or(false),
        }
    }

    pub fn is_global_owner(&self, u_id: i64) -> bool {
        self.users
            .iter()
            .any(|u| u.u_id == u_id && u.global_owner)
    }

    pub fn messages(&self, group: GroupId) -> Result<&VecDeque<Message>> {
        match group {
            GroupId::Channel(id) => Ok(&self.get_channel(id)?.messages),
            GroupId::Dm(id) => Ok(&self.get_dm(id)?.messages),
        }
    }

    pub(crate) fn messages_mut(&mut self, group: GroupId) -> Result<&mut VecDeque<Message>> {
        match group {
            GroupId::Channel(id) => Ok(&mut self.get_channel_mut(id)?.messages),
            GroupId::Dm(id) => Ok(&mut self.get_dm_mut(id)?.messages),
        }
    }

    // -- Messages --

    /// Locate a message anywhere in the store. Linear over every group,
    /// which is fine at the target scale.
    pub fn find_message(&self, message_id: i64) -> Result<(GroupId, usize)> {
        for channel in &self.channels {
            if let Some(i) = channel
                .messages
                .iter()
                .position(|m| m.message_id == message_id)
            {
                return Ok((GroupId::Channel(channel.channel_id), i));
            }
        }
        for dm in &self.dms {
            if let Some(i) = dm.messages.iter().position(|m| m.message_id == message_id) {
                return Ok((GroupId::Dm(dm.dm_id), i));
            }
        }
        Err(CoreError::invalid(
            "message_id does not refer to a valid message",
        ))
    }

    // -- Id allocation --

    pub fn next_message_id(&mut self) -> i64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    pub fn next_dm_id(&mut self) -> i64 {
        let id = self.next_dm_id;
        self.next_dm_id += 1;
        id
    }

    pub(crate) fn next_standup_id(&mut self) -> u64 {
        let id = self.next_standup_id;
        self.next_standup_id += 1;
        id
    }

    // -- Sessions --

    pub fn add_session(&mut self, session_id: String, u_id: i64) {
        self.sessions.insert(session_id, u_id);
    }

    /// Returns the uid the session belongs to, if it is still live.
    pub fn session_user(&self, session_id: &str) -> Option<i64> {
        self.sessions.get(session_id).copied()
    }

    pub fn remove_session(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub(crate) fn revoke_sessions_for(&mut self, u_id: i64) {
        self.sessions.retain(|_, uid| *uid != u_id);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels;
    use crate::dms;
    use crate::messaging;
    use crate::users;

    fn register(store: &mut Store, email: &str, first: &str, last: &str) -> i64 {
        users::create_user(store, email, "hash", first, last).unwrap()
    }

    #[test]
    fn user_ids_are_monotonic() {
        let mut store = Store::new();
        let a = register(&mut store, "a@mail.com", "Ann", "Ab");
        let b = register(&mut store, "b@mail.com", "Bob", "Bc");
        assert_eq!((a, b), (0, 1));
    }

    #[test]
    fn removed_user_still_resolvable() {
        let mut store = Store::new();
        let a = register(&mut store, "a@mail.com", "Ann", "Ab");
        let b = register(&mut store, "b@mail.com", "Bob", "Bc");
        users::admin_remove(&mut store, a, b).unwrap();
        assert!(store.get_active_user(b).is_err());
        assert_eq!(store.get_user(b).unwrap().name_first, "Removed");
        assert!(store.is_removed(b));
    }

    #[test]
    fn global_owner_gets_channel_owner_perms_only_as_member() {
        let mut store = Store::new();
        let owner = register(&mut store, "a@mail.com", "Ann", "Ab");
        let b = register(&mut store, "b@mail.com", "Bob", "Bc");
        let cid = channels::channels_create(&mut store, b, "general", true).unwrap();
        let gid = GroupId::Channel(cid);

        // First registered user is a global owner, but is not in the channel.
        assert!(!store.has_owner_perms(owner, gid));
        channels::channel_join(&mut store, owner, cid).unwrap();
        assert!(store.has_owner_perms(owner, gid));
        assert!(store.has_owner_perms(b, gid));
    }

    #[test]
    fn find_message_scans_channels_and_dms() {
        let mut store = Store::new();
        let a = register(&mut store, "a@mail.com", "Ann", "Ab");
        let cid = channels::channels_create(&mut store, a, "general", true).unwrap();
        let did = dms::dm_create(&mut store, a, &[]).unwrap();
        let m1 = messaging::message_send(&mut store, a, cid, "in channel").unwrap();
        let m2 = messaging::message_senddm(&mut store, a, did, "in dm").unwrap();

        assert_eq!(store.find_message(m1).unwrap().0, GroupId::Channel(cid));
        assert_eq!(store.find_message(m2).unwrap().0, GroupId::Dm(did));
        assert!(store.find_message(999).is_err());
        assert_ne!(m1, m2);
    }

    #[test]
    fn clear_advances_the_epoch() {
        let mut store = Store::new();
        let a = register(&mut store, "a@mail.com", "Ann", "Ab");
        let before = store.epoch();
        store.clear();
        assert_eq!(store.epoch(), before + 1);
        assert!(store.get_active_user(a).is_err());
        // A second clear keeps moving forward.
        store.clear();
        assert_eq!(store.epoch(), before + 2);
    }

    #[test]
    fn sessions_revocable_per_user() {
        let mut store = Store::new();
        let a = register(&mut store, "a@mail.com", "Ann", "Ab");
        store.add_session("s1".into(), a);
        store.add_session("s2".into(), a);
        assert_eq!(store.session_user("s1"), Some(a));
        store.revoke_sessions_for(a);
        assert_eq!(store.session_user("s1"), None);
        assert_eq!(store.session_user("s2"), None);
    }
}
