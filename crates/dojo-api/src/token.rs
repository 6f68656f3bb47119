//! Session tokens: HS256 JWTs carrying the principal.
//!
//! Tokens are stateless. Validity is the signature plus `exp`; there is no
//! revocation list, and logging out is the client discarding its token.

use chrono::{DateTime, Duration, Utc};
use dojo_core::principal::{Principal, PrincipalKind, Role};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AuthConfig, error::Error};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// Principal id.
  pub sub:  Uuid,
  pub name: String,
  pub role: Role,
  pub kind: PrincipalKind,
  pub iat:  i64,
  pub exp:  i64,
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens with one shared secret.
pub struct TokenIssuer {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl TokenIssuer {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      ttl,
    }
  }

  pub fn from_config(config: &AuthConfig) -> Self {
    let ttl = i64::try_from(config.token_ttl_secs)
      .ok()
      .and_then(Duration::try_seconds)
      .unwrap_or_else(|| Duration::days(36_500));
    Self::new(config.jwt_secret.as_bytes(), ttl)
  }

  pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, Error> {
    let now = Utc::now();
    let expires_at = now
      .checked_add_signed(self.ttl)
      .ok_or_else(|| Error::Internal("token lifetime out of range".into()))?;
    let claims = Claims {
      sub:  principal.id,
      name: principal.name.clone(),
      role: principal.role,
      kind: principal.kind,
      iat:  now.timestamp(),
      exp:  expires_at.timestamp(),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| Error::Internal(format!("failed to sign token: {e}")))?;

    Ok(IssuedToken { token, expires_at })
  }

  /// Verify a token and rebuild the principal from its claims.
  pub fn verify(&self, token: &str) -> Result<Principal, Error> {
    let data = decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        Error::Unauthenticated("invalid or expired token")
      })?;

    let claims = data.claims;
    let principal = Principal {
      id:   claims.sub,
      name: claims.name,
      role: claims.role,
      kind: claims.kind,
    };
    if !principal.is_consistent() {
      return Err(Error::Unauthenticated("invalid or expired token"));
    }
    Ok(principal)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn teacher() -> Principal {
    Principal {
      id:   Uuid::new_v4(),
      name: "Sensei".into(),
      role: Role::Teacher,
      kind: PrincipalKind::Staff,
    }
  }

  #[test]
  fn issued_token_verifies() {
    let issuer = TokenIssuer::new(b"secret", Duration::hours(1));
    let principal = teacher();
    let issued = issuer.issue(&principal).unwrap();
    assert!(issued.expires_at > Utc::now());
    assert_eq!(issuer.verify(&issued.token).unwrap(), principal);
  }

  #[test]
  fn expired_token_is_rejected() {
    let issuer = TokenIssuer::new(b"secret", Duration::seconds(-120));
    let issued = issuer.issue(&teacher()).unwrap();
    assert!(matches!(issuer.verify(&issued.token), Err(Error::Unauthenticated(_))));
  }

  #[test]
  fn foreign_signature_is_rejected() {
    let ours = TokenIssuer::new(b"secret", Duration::hours(1));
    let theirs = TokenIssuer::new(b"other", Duration::hours(1));
    let issued = theirs.issue(&teacher()).unwrap();
    assert!(matches!(ours.verify(&issued.token), Err(Error::Unauthenticated(_))));
  }

  #[test]
  fn garbage_is_rejected() {
    let issuer = TokenIssuer::new(b"secret", Duration::hours(1));
    assert!(issuer.verify("not.a.jwt").is_err());
  }

  #[test]
  fn staff_kind_with_student_role_is_rejected() {
    let issuer = TokenIssuer::new(b"secret", Duration::hours(1));
    let forged = Principal {
      role: Role::Student,
      ..teacher()
    };
    let issued = issuer.issue(&forged).unwrap();
    assert!(issuer.verify(&issued.token).is_err());
  }
}
