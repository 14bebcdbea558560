//! Direct-message groups. A DM's name is fixed at creation from the sorted
//! handles of everyone in it; the creator is its only owner and a DM that
//! empties out is deleted.

use streams_types::api::{DmDetailsResponse, MessagesResponse};
use streams_types::models::DmSummary;

use crate::error::{CoreError, Result};
use crate::messaging;
use crate::model::Dm;
use crate::notifications;
use crate::stats;
use crate::store::{GroupId, Store};
use crate::users;

pub fn dm_create(store: &mut Store, u_id: i64, invitees: &[i64]) -> Result<i64> {
    for &target in invitees {
        store.get_active_user(target)?;
        if target == u_id {
            return Err(CoreError::invalid("creator cannot be invited to their own DM"));
        }
    }
    let mut seen = Vec::new();
    for &target in invitees {
        if seen.contains(&target) {
            return Err(CoreError::invalid("duplicate u_id in invite list"));
        }
        seen.push(target);
    }

    let mut members = vec![u_id];
    members.extend_from_slice(invitees);

    let mut handles: Vec<String> = members
        .iter()
        .map(|&m| store.get_active_user(m).map(|u| u.handle.clone()))
        .collect::<Result<_>>()?;
    handles.sort();
    let name = handles.join(", ");

    let dm_id = store.next_dm_id();
    store.dms.push(Dm {
        dm_id,
        name,
        owner: u_id,
        members: members.clone(),
        messages: Default::default(),
    });

    stats::bump_dms_exist(store, 1);
    for &member in &members {
        stats::bump_dms_joined(store, member, 1);
        // The creator gets an "added" notification too.
        notifications::notify_added(store, u_id, GroupId::Dm(dm_id), member);
    }
    Ok(dm_id)
}

pub fn dm_list(store: &Store, u_id: i64) -> Vec<DmSummary> {
    store
        .dms
        .iter()
        .filter(|d| d.members.contains(&u_id))
        .map(|d| DmSummary {
            dm_id: d.dm_id,
            name: d.name.clone(),
        })
        .collect()
}

/// Only the original creator, while still inside the DM, may remove it.
pub fn dm_remove(store: &mut Store, u_id: i64, dm_id: i64) -> Result<()> {
    let dm = store.get_dm(dm_id)?;
    if dm.owner != u_id {
        return Err(CoreError::forbidden("user is not the owner of the DM"));
    }
    let members = dm.members.clone();
    store.dms.retain(|d| d.dm_id != dm_id);
    for member in members {
        stats::bump_dms_joined(store, member, -1);
    }
    stats::bump_dms_exist(store, -1);
    Ok(())
}

pub fn dm_details(store: &Store, u_id: i64, dm_id: i64) -> Result<DmDetailsResponse> {
    let dm = store.get_dm(dm_id)?;
    if !dm.members.contains(&u_id) {
        return Err(CoreError::forbidden("user is not a member of the DM"));
    }
    Ok(DmDetailsResponse {
        name: dm.name.clone(),
        members: users::profiles(store, &dm.members)?,
    })
}

pub fn dm_leave(store: &mut Store, u_id: i64, dm_id: i64) -> Result<()> {
    let dm = store.get_dm_mut(dm_id)?;
    if !dm.members.contains(&u_id) {
        return Err(CoreError::forbidden("user is not a member of the DM"));
    }
    dm.members.retain(|&m| m != u_id);
    if dm.owner == u_id {
        dm.owner = -1;
    }
    let emptied = dm.members.is_empty();
    if emptied {
        store.dms.retain(|d| d.dm_id != dm_id);
    }
    stats::bump_dms_joined(store, u_id, -1);
    if emptied {
        stats::bump_dms_exist(store, -1);
    }
    Ok(())
}

pub fn dm_messages(store: &Store, u_id: i64, dm_id: i64, start: i64) -> Result<MessagesResponse> {
    store.get_dm(dm_id)?;
    let group = GroupId::Dm(dm_id);
    if !store.is_member(u_id, group) {
        return Err(CoreError::forbidden("user is not a member of the DM"));
    }
    messaging::paginate(store, u_id, group, start)
}
