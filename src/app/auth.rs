//! Admin password check for the HTTP admin surface.
//!
//! Every admin POST carries the password as the `adminpw` field of an
//! `application/x-www-form-urlencoded` body.  The field is percent-decoded
//! into a fixed buffer and compared in constant time against the
//! configured password, identically on ESP-IDF and host targets.

use core::fmt;

use heapless::Vec;
use log::warn;

/// Form field carrying the password.
pub const PASSWORD_FIELD: &str = "adminpw";

/// Longest decoded password accepted from a form; longer input is rejected
/// without comparing.
const MAX_SUBMITTED_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The body has no `adminpw` field.
    Missing,
    /// The submitted password does not match.
    Incorrect,
}

impl AuthError {
    /// HTTP status the admin surface answers with.
    pub const fn status(self) -> u16 {
        match self {
            Self::Missing => 400,
            Self::Incorrect => 403,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no adminpw submitted"),
            Self::Incorrect => write!(f, "admin password incorrect"),
        }
    }
}

/// Check the `adminpw` field of `form` against `expected`.
///
/// An empty `expected` never matches, so a station without a configured
/// password keeps its admin actions locked.
pub fn check_admin_password(form: &[u8], expected: &str) -> Result<(), AuthError> {
    let form = core::str::from_utf8(form).map_err(|_| AuthError::Missing)?;
    let raw = form
        .split('&')
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == PASSWORD_FIELD).then_some(value)
        })
        .ok_or(AuthError::Missing)?;

    let mut given: Vec<u8, MAX_SUBMITTED_LEN> = Vec::new();
    if decode_form_value(raw, &mut given).is_none() {
        warn!("auth: malformed or oversized adminpw field");
        return Err(AuthError::Incorrect);
    }

    if expected.is_empty() || !constant_time_eq(&given, expected.as_bytes()) {
        warn!("auth: admin password rejected");
        return Err(AuthError::Incorrect);
    }
    Ok(())
}

/// Percent-decode one form value (`+` is a space).  `None` on a bad escape
/// or when `out` is full.
fn decode_form_value<const N: usize>(raw: &str, out: &mut Vec<u8, N>) -> Option<()> {
    let mut bytes = raw.bytes();
    while let Some(b) = bytes.next() {
        let decoded = match b {
            b'+' => b' ',
            b'%' => {
                let hi = hex_digit(bytes.next()?)?;
                let lo = hex_digit(bytes.next()?)?;
                (hi << 4) | lo
            }
            other => other,
        };
        out.push(decoded).ok()?;
    }
    Some(())
}

fn hex_digit(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}

/// Length is not secret; content is compared without early exit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_is_accepted() {
        assert_eq!(check_admin_password(b"adminpw=admin", "admin"), Ok(()));
        assert_eq!(
            check_admin_password(b"action=reboot&adminpw=s3cret", "s3cret"),
            Ok(())
        );
    }

    #[test]
    fn wrong_or_missing_password_is_refused() {
        assert_eq!(
            check_admin_password(b"adminpw=admim", "admin"),
            Err(AuthError::Incorrect)
        );
        assert_eq!(
            check_admin_password(b"adminpw=admin2", "admin"),
            Err(AuthError::Incorrect)
        );
        assert_eq!(check_admin_password(b"", "admin"), Err(AuthError::Missing));
        assert_eq!(
            check_admin_password(b"adminpwd=admin", "admin"),
            Err(AuthError::Missing)
        );
        assert_eq!(AuthError::Missing.status(), 400);
        assert_eq!(AuthError::Incorrect.status(), 403);
    }

    #[test]
    fn form_escapes_are_decoded() {
        assert_eq!(
            check_admin_password(b"adminpw=p%40ss+w%C3%B6rd", "p@ss w\u{f6}rd"),
            Ok(())
        );
        assert_eq!(
            check_admin_password(b"adminpw=bad%2", "bad%2"),
            Err(AuthError::Incorrect)
        );
    }

    #[test]
    fn empty_configured_password_locks_admin() {
        assert_eq!(
            check_admin_password(b"adminpw=", ""),
            Err(AuthError::Incorrect)
        );
    }

    #[test]
    fn oversized_submission_is_refused() {
        let mut form = std::string::String::from("adminpw=");
        form.push_str(&"a".repeat(MAX_SUBMITTED_LEN + 1));
        assert_eq!(
            check_admin_password(form.as_bytes(), "admin"),
            Err(AuthError::Incorrect)
        );
    }
}
