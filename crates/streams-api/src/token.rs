//! Session tokens: JWTs whose embedded session id must still be live in the
//! store. Logout, clear, and admin removal all revoke by dropping the
//! session, so a structurally valid token can still be rejected here.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use streams_core::{CoreError, Store};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub session_id: String,
    pub exp: usize,
}

/// Mint a token and the session id it carries. The caller registers the
/// session in the store.
pub fn issue(secret: &str, u_id: i64) -> anyhow::Result<(String, String)> {
    let session_id = Uuid::new_v4().to_string();
    let claims = Claims {
        sub: u_id,
        session_id: session_id.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, session_id))
}

pub fn claims(secret: &str, token: &str) -> Result<Claims, CoreError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| CoreError::forbidden("invalid token"))
}

/// Token → uid, or Forbidden. The session must still be live and must
/// belong to an active (not removed) user.
pub fn resolve(store: &Store, secret: &str, token: &str) -> Result<i64, CoreError> {
    let claims = claims(secret, token)?;
    match store.session_user(&claims.session_id) {
        Some(u_id) if u_id == claims.sub && store.get_active_user(u_id).is_ok() => Ok(u_id),
        _ => Err(CoreError::forbidden("invalid token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streams_core::users;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_then_resolve_round_trip() {
        let mut store = Store::new();
        let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
        let (token, session_id) = issue(SECRET, a).unwrap();
        store.add_session(session_id, a);

        assert_eq!(resolve(&store, SECRET, &token).unwrap(), a);
    }

    #[test]
    fn revoked_session_is_forbidden() {
        let mut store = Store::new();
        let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
        let (token, session_id) = issue(SECRET, a).unwrap();
        store.add_session(session_id.clone(), a);
        store.remove_session(&session_id);

        assert!(matches!(
            resolve(&store, SECRET, &token),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn garbage_and_wrong_secret_are_forbidden() {
        let mut store = Store::new();
        let a = users::create_user(&mut store, "a@mail.com", "hash", "Ann", "Ab").unwrap();
        let (token, session_id) = issue("other-secret", a).unwrap();
        store.add_session(session_id, a);

        assert!(resolve(&store, SECRET, &token).is_err());
        assert!(resolve(&store, SECRET, "not-a-jwt").is_err());
    }
}
