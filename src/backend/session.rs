//! Ownership of the authentication session.

use crate::api::Session;

/// Holds the current session and a generation counter.
///
/// The generation changes whenever the session is replaced or cleared, so
/// results of requests made under an older session can be recognised.
#[derive(Debug, Default)]
pub struct SessionHolder {
    session: Option<Session>,
    generation: u64,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.session.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Store a session from a fresh login.
    pub fn replace(&mut self, session: Session) {
        self.session = Some(session);
        self.generation += 1;
    }

    /// Swap in a refreshed copy of the same login. Generation is kept.
    pub fn refresh(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn clear(&mut self) -> Option<Session> {
        self.generation += 1;
        self.session.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_clear_bump_generation() {
        let mut holder = SessionHolder::new();
        assert!(!holder.is_present());
        let start = holder.generation();

        holder.replace(Session::from_cookies([("sessionid", "a")]));
        assert!(holder.is_present());
        assert_eq!(holder.generation(), start + 1);

        holder.refresh(Session::from_cookies([("sessionid", "b")]));
        assert_eq!(holder.generation(), start + 1);
        assert_eq!(holder.current().and_then(|s| s.cookie("sessionid")), Some("b"));

        let old = holder.clear();
        assert_eq!(old.and_then(|s| s.cookie("sessionid").map(str::to_string)), Some("b".into()));
        assert!(!holder.is_present());
        assert_eq!(holder.generation(), start + 2);
    }
}
