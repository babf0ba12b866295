use std::cell::RefCell;
use std::rc::Rc;

use projector_core::{Environment, Severity};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

/// Shared view of the notifications an environment received.
#[derive(Clone, Debug, Default)]
pub struct Notices(Rc<RefCell<Vec<Notice>>>);

impl Notices {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn all(&self) -> Vec<Notice> {
        self.0.borrow().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.0.borrow().iter().filter(|n| n.severity == severity).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Environment that keeps every notification for later inspection.
#[derive(Default)]
pub struct RecordingEnvironment {
    notices: Notices,
}

impl RecordingEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Notices {
        self.notices.clone()
    }
}

impl Environment for RecordingEnvironment {
    fn notify(&mut self, message: &str, severity: Severity) {
        log::debug!("notice ({severity:?}): {message}");
        self.notices.0.borrow_mut().push(Notice {
            message: message.to_string(),
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_are_shared() {
        let mut env = RecordingEnvironment::new();
        let notices = env.notices();
        env.notify("careful", Severity::Warning);
        env.notify("broken", Severity::Error);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices.count(Severity::Error), 1);
        assert_eq!(
            serde_json::to_string(&notices.all()[0]).unwrap(),
            r#"{"message":"careful","severity":"warning"}"#
        );
    }
}
