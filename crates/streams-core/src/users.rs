//! User records: registration-side creation, profile projection, and the
//! admin operations (removal, workspace permission changes).

use streams_types::models::UserProfile;

use crate::error::{CoreError, Result};
use crate::model::{REMOVED_USER_TEXT, User};
use crate::now_ts;
use crate::stats::UserSeries;
use crate::store::Store;

pub const GLOBAL_OWNER: i64 = 1;
pub const GLOBAL_MEMBER: i64 = 2;

const MAX_NAME_LEN: usize = 50;

/// Structural email check: dotted alphanumeric local part, dotted
/// alphanumeric host, alphabetic TLD of at least two characters.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let dotted_alnum = |s: &str| {
        !s.is_empty()
            && !s.starts_with('.')
            && !s.ends_with('.')
            && !s.contains("..")
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
    };
    if !dotted_alnum(local) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    dotted_alnum(host) && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Lowercase alphanumeric concatenation of the name parts, capped at 20
/// chars; collisions get the smallest free integer suffix (which may push
/// past the cap).
fn generate_handle(store: &Store, name_first: &str, name_last: &str) -> String {
    let base: String = format!("{name_first}{name_last}")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(20)
        .collect();
    if !base.is_empty() && store.user_by_handle(&base).is_none() {
        return base;
    }
    let mut suffix = 0;
    loop {
        let candidate = format!("{base}{suffix}");
        if store.user_by_handle(&candidate).is_none() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Create a user record. The caller has already hashed the password. The
/// first user ever registered becomes a global owner.
pub fn create_user(
    store: &mut Store,
    email: &str,
    password_hash: &str,
    name_first: &str,
    name_last: &str,
) -> Result<i64> {
    if !validate_email(email) {
        return Err(CoreError::invalid("email is not valid"));
    }
    if store.user_by_email(email).is_some() {
        return Err(CoreError::invalid("email is already registered"));
    }
    for name in [name_first, name_last] {
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(CoreError::invalid(
                "names must be between 1 and 50 characters",
            ));
        }
    }

    let u_id = store.next_user_id();
    let handle = generate_handle(store, name_first, name_last);
    store.users.push(User {
        u_id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        name_first: name_first.to_string(),
        name_last: name_last.to_string(),
        handle,
        global_owner: u_id == 0,
    });
    store.user_stats.insert(u_id, UserSeries::new(now_ts()));
    Ok(u_id)
}

pub fn profile(store: &Store, u_id: i64) -> Result<UserProfile> {
    let user = store.get_user(u_id)?;
    Ok(UserProfile {
        u_id: user.u_id,
        email: user.email.clone(),
        name_first: user.name_first.clone(),
        name_last: user.name_last.clone(),
        handle_str: user.handle.clone(),
    })
}

pub fn profiles(store: &Store, u_ids: &[i64]) -> Result<Vec<UserProfile>> {
    u_ids.iter().map(|&u| profile(store, u)).collect()
}

/// Remove a user from the workspace. Their messages stay on record with the
/// text rewritten, their memberships end, their sessions die, and the record
/// moves to the removed set where it is still resolvable by uid. Statistics
/// are left alone except for DMs that empty out.
pub fn admin_remove(store: &mut Store, caller: i64, target: i64) -> Result<()> {
    if !store.is_global_owner(caller) {
        return Err(CoreError::forbidden("caller is not a global owner"));
    }
    let user = store.get_active_user(target)?;
    let sole_owner =
        user.global_owner && store.users.iter().filter(|u| u.global_owner).count() == 1;
    if sole_owner {
        return Err(CoreError::invalid("cannot remove the only global owner"));
    }

    for channel in &mut store.channels {
        channel.all_members.retain(|&m| m != target);
        channel.owner_members.retain(|&m| m != target);
        for message in &mut channel.messages {
            if message.u_id == target {
                message.message = REMOVED_USER_TEXT.to_string();
            }
        }
    }

    let mut emptied_dms = 0;
    for dm in &mut store.dms {
        dm.members.retain(|&m| m != target);
        if dm.owner == target {
            dm.owner = -1;
        }
        for message in &mut dm.messages {
            if message.u_id == target {
                message.message = REMOVED_USER_TEXT.to_string();
            }
        }
        if dm.members.is_empty() {
            emptied_dms += 1;
        }
    }
    store.dms.retain(|d| !d.members.is_empty());
    for _ in 0..emptied_dms {
        crate::stats::bump_dms_exist(store, -1);
    }

    store.revoke_sessions_for(target);
    if let Some(at) = store.users.iter().position(|u| u.u_id == target) {
        let mut user = store.users.remove(at);
        user.name_first = "Removed".to_string();
        user.name_last = "user".to_string();
        store.removed_users.push(user);
    }
    Ok(())
}

pub fn change_permission(
    store: &mut Store,
    caller: i64,
    target: i64,
    permission_id: i64,
) -> Result<()> {
    if !store.is_global_owner(caller) {
        return Err(CoreError::forbidden("caller is not a global owner"));
    }
    if permission_id != GLOBAL_OWNER && permission_id != GLOBAL_MEMBER {
        return Err(CoreError::invalid("permission_id is not valid"));
    }
    let user = store.get_active_user(target)?;
    let demoting_sole_owner = permission_id == GLOBAL_MEMBER
        && user.global_owner
        && store.users.iter().filter(|u| u.global_owner).count() == 1;
    if demoting_sole_owner {
        return Err(CoreError::invalid("cannot demote the only global owner"));
    }
    store.get_active_user_mut(target)?.global_owner = permission_id == GLOBAL_OWNER;
    Ok(())
}
