use serde::{Deserialize, Serialize};

use crate::models::{
    ChannelSummary, DmSummary, MessageOutput, NotificationOutput, UserProfile, UserStats,
    WorkspaceStats,
};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub auth_user_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoutRequest {
    pub token: String,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelsCreateRequest {
    pub token: String,
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelsCreateResponse {
    pub channel_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ChannelsListResponse {
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelJoinRequest {
    pub token: String,
    pub channel_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelLeaveRequest {
    pub token: String,
    pub channel_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelInviteRequest {
    pub token: String,
    pub channel_id: i64,
    pub u_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelOwnerRequest {
    pub token: String,
    pub channel_id: i64,
    pub u_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ChannelDetailsResponse {
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserProfile>,
    pub all_members: Vec<UserProfile>,
}

// -- DMs --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmCreateRequest {
    pub token: String,
    pub u_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct DmCreateResponse {
    pub dm_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DmListResponse {
    pub dms: Vec<DmSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmLeaveRequest {
    pub token: String,
    pub dm_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DmDetailsResponse {
    pub name: String,
    pub members: Vec<UserProfile>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageSendRequest {
    pub token: String,
    pub channel_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageSendDmRequest {
    pub token: String,
    pub dm_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageIdResponse {
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SharedMessageIdResponse {
    pub shared_message_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageEditRequest {
    pub token: String,
    pub message_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageReactRequest {
    pub token: String,
    pub message_id: i64,
    pub react_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagePinRequest {
    pub token: String,
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageShareRequest {
    pub token: String,
    pub og_message_id: i64,
    pub message: String,
    pub channel_id: i64,
    pub dm_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageSendLaterRequest {
    pub token: String,
    pub channel_id: i64,
    pub message: String,
    pub time_sent: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageSendLaterDmRequest {
    pub token: String,
    pub dm_id: i64,
    pub message: String,
    pub time_sent: i64,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageOutput>,
    pub start: i64,
    pub end: i64,
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupStartRequest {
    pub token: String,
    pub channel_id: i64,
    pub length: i64,
}

#[derive(Debug, Serialize)]
pub struct StandupStartResponse {
    pub time_finish: i64,
}

#[derive(Debug, Serialize)]
pub struct StandupActiveResponse {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupSendRequest {
    pub token: String,
    pub channel_id: i64,
    pub message: String,
}

// -- Notifications / search / stats --

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationOutput>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub messages: Vec<MessageOutput>,
}

#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub user_stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceStatsResponse {
    pub workspace_stats: WorkspaceStats,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionChangeRequest {
    pub token: String,
    pub u_id: i64,
    pub permission_id: i64,
}
