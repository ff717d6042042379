//! Subsystem Capacities
//!
//! Every table in the kernel services is bounded. The bounds are supplied
//! at subsystem initialization through [`Limits`] rather than fixed at
//! compile time.

/// Maximum length of a record or attribute name, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Maximum length of a configuration entry description, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 256;

/// Maximum length of a contact name, in bytes.
pub const MAX_CONTACT_NAME_LEN: usize = 64;

/// Maximum length of a contact phone number, in bytes.
pub const MAX_PHONE_LEN: usize = 32;

/// Maximum length of a contact email address, in bytes.
pub const MAX_EMAIL_LEN: usize = 128;

/// Maximum length of a stored user message, in bytes.
pub const MAX_CONTENT_LEN: usize = 1024;

/// Maximum length of a preference value, in bytes.
pub const MAX_PREF_VALUE_LEN: usize = 256;

/// Capacities for every registry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Configuration entries.
    pub max_configs: usize,
    /// Attributes held by one configuration entry or device node.
    pub max_attributes: usize,
    /// Registered drivers.
    pub max_drivers: usize,
    /// Device nodes.
    pub max_devices: usize,
    /// User accounts.
    pub max_users: usize,
    /// Groups, including the three default groups.
    pub max_groups: usize,
    /// Concurrent sessions.
    pub max_sessions: usize,
    /// Resource permission entries.
    pub max_permissions: usize,
    /// IPC channels.
    pub max_channels: usize,
    /// Messages one channel can hold before it reports full.
    pub channel_capacity: usize,
    /// Largest message payload, in bytes.
    pub max_payload: usize,
    /// Address book contacts.
    pub max_contacts: usize,
    /// Stored user messages, across all contacts.
    pub max_user_messages: usize,
    /// Applications holding preferences.
    pub max_preference_apps: usize,
}

impl Limits {
    /// Production defaults.
    pub const DEFAULT: Self = Self {
        max_configs: 1024,
        max_attributes: 32,
        max_drivers: 256,
        max_devices: 1024,
        max_users: 1024,
        max_groups: 32,
        max_sessions: 1024,
        max_permissions: 1024,
        max_channels: 1024,
        channel_capacity: 1024,
        max_payload: 4096,
        max_contacts: 1024,
        max_user_messages: 4096,
        max_preference_apps: 256,
    };

    /// Small tables, convenient for tests and constrained boards.
    pub const fn small() -> Self {
        Self {
            max_configs: 8,
            max_attributes: 4,
            max_drivers: 4,
            max_devices: 8,
            max_users: 8,
            max_groups: 6,
            max_sessions: 8,
            max_permissions: 8,
            max_channels: 4,
            channel_capacity: 4,
            max_payload: 64,
            max_contacts: 8,
            max_user_messages: 16,
            max_preference_apps: 4,
        }
    }

    /// Override the per-channel message capacity.
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Override the per-record attribute capacity.
    pub const fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes = max;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_const() {
        assert_eq!(Limits::default(), Limits::DEFAULT);
        assert_eq!(Limits::DEFAULT.max_attributes, 32);
    }

    #[test]
    fn test_builders() {
        let limits = Limits::small().with_channel_capacity(2).with_max_attributes(1);
        assert_eq!(limits.channel_capacity, 2);
        assert_eq!(limits.max_attributes, 1);
        assert_eq!(limits.max_users, Limits::small().max_users);
    }
}
