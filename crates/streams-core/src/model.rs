use std::collections::VecDeque;

/// Replacement text for the name parts and message bodies of removed users,
/// and for any deferred message whose author was removed before it fired.
pub const REMOVED_USER_TEXT: &str = "Removed user";

#[derive(Debug, Clone)]
pub struct User {
    pub u_id: i64,
    pub email: String,
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    pub global_owner: bool,
}

/// A message embedded in exactly one group. `reacts` is the uid set for the
/// single supported react kind (react_id 1).
#[derive(Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub u_id: i64,
    pub message: String,
    pub time_created: i64,
    pub reacts: Vec<i64>,
    pub is_pinned: bool,
}

impl Message {
    pub fn new(message_id: i64, u_id: i64, message: String, time_created: i64) -> Self {
        Self {
            message_id,
            u_id,
            message,
            time_created,
            reacts: Vec::new(),
            is_pinned: false,
        }
    }
}

/// Messages are held most-recent-first: index 0 is the newest.
#[derive(Debug, Clone)]
pub struct Channel {
    pub channel_id: i64,
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<i64>,
    pub all_members: Vec<i64>,
    pub messages: VecDeque<Message>,
    pub standup: Option<Standup>,
}

/// `owner` becomes -1 if the creator leaves; the DM then has no owner.
#[derive(Debug, Clone)]
pub struct Dm {
    pub dm_id: i64,
    pub name: String,
    pub owner: i64,
    pub members: Vec<i64>,
    pub messages: VecDeque<Message>,
}

/// An active standup. `id` is a store-wide generation counter so a flush
/// callback can tell whether the record it scheduled is still the live one.
#[derive(Debug, Clone)]
pub struct Standup {
    pub id: u64,
    pub starter: i64,
    pub time_finish: i64,
    pub buffer: String,
}

/// Exactly one of `channel_id` / `dm_id` is a real id; the other is -1.
#[derive(Debug, Clone)]
pub struct Notification {
    pub channel_id: i64,
    pub dm_id: i64,
    pub message: String,
}
