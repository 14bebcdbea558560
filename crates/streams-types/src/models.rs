use serde::{Deserialize, Serialize};

/// Public view of a user. Password hashes and session data never leave the
/// store; this is the only user shape that goes on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub u_id: i64,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmSummary {
    pub dm_id: i64,
    pub name: String,
}

/// The single react kind (react_id 1) on a message, rendered for a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactOutput {
    pub react_id: i64,
    pub u_ids: Vec<i64>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOutput {
    pub message_id: i64,
    pub u_id: i64,
    pub message: String,
    pub time_created: i64,
    pub reacts: Vec<ReactOutput>,
    pub is_pinned: bool,
}

/// One notification. Exactly one of `channel_id` / `dm_id` is a real id;
/// the other is -1. Ids may dangle if the group was since deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationOutput {
    pub channel_id: i64,
    pub dm_id: i64,
    pub notification_message: String,
}

// -- Statistics --
//
// Each series keeps its own datum field name on the wire, so every point
// shape gets its own struct rather than a generic {value, time_stamp}.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsJoinedPoint {
    pub num_channels_joined: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmsJoinedPoint {
    pub num_dms_joined: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesSentPoint {
    pub num_messages_sent: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub channels_joined: Vec<ChannelsJoinedPoint>,
    pub dms_joined: Vec<DmsJoinedPoint>,
    pub messages_sent: Vec<MessagesSentPoint>,
    pub involvement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsExistPoint {
    pub num_channels_exist: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmsExistPoint {
    pub num_dms_exist: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesExistPoint {
    pub num_messages_exist: i64,
    pub time_stamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub channels_exist: Vec<ChannelsExistPoint>,
    pub dms_exist: Vec<DmsExistPoint>,
    pub messages_exist: Vec<MessagesExistPoint>,
    pub utilization_rate: f64,
}
