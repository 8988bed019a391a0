//! Broker channel naming conventions.

/// Kind of broker channel, derived from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Public,
    /// `private-*`: subscription needs a signed token.
    Private,
    /// `presence-*`: signed token plus member data, which this service does not issue.
    Presence,
}

impl ChannelKind {
    pub fn classify(name: &str) -> Self {
        if name.starts_with("presence-") {
            ChannelKind::Presence
        } else if name.starts_with("private-") {
            ChannelKind::Private
        } else {
            ChannelKind::Public
        }
    }
}
