/// Result of a reconcile step: whether anything changed, the id of the
/// resource it left behind (if any), and a human-readable message
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub changed: bool,
    pub id: Option<String>,
    pub msg: String,
}

impl Outcome {
    pub fn new(changed: bool, id: Option<String>, msg: impl Into<String>) -> Self {
        Self {
            changed,
            id,
            msg: msg.into(),
        }
    }

    pub fn changed(id: Option<String>, msg: impl Into<String>) -> Self {
        Self::new(true, id, msg)
    }

    pub fn unchanged(id: Option<String>, msg: impl Into<String>) -> Self {
        Self::new(false, id, msg)
    }
}
