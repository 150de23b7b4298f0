//! Request outcome classification

/// Classified result of one API call.
///
/// `NotFound` is split out so callers can reconcile local entity tracking;
/// transport failures (timeout, connection refused, anything without a
/// status line) collapse into `NoResponse`.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Success { status: u16, body: Option<T> },
    NotFound,
    Failed { status: u16 },
    NoResponse,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound)
    }

    /// Status code, when a response was received at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Success { status, .. } => Some(*status),
            Outcome::NotFound => Some(404),
            Outcome::Failed { status } => Some(*status),
            Outcome::NoResponse => None,
        }
    }

    /// Consume the outcome, yielding the parsed body of a success
    pub fn into_body(self) -> Option<T> {
        match self {
            Outcome::Success { body, .. } => body,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let ok: Outcome<()> = Outcome::Success {
            status: 200,
            body: None,
        };
        assert_eq!(ok.status(), Some(200));
        assert!(ok.is_success());

        let missing: Outcome<()> = Outcome::NotFound;
        assert_eq!(missing.status(), Some(404));
        assert!(!missing.is_success());

        let dead: Outcome<()> = Outcome::NoResponse;
        assert_eq!(dead.status(), None);
    }
}
