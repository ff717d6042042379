//! User Data
//!
//! Per-user address book, stored messages, and per-application preferences.
//!
//! # Records
//! - Contacts: name, phone, email, and a favorite flag
//! - Messages: text bound to one contact, stamped from the kernel clock
//! - Preferences: text values keyed by application and key
//!
//! Removing a contact removes its messages. Setting a preference that
//! already exists replaces its value.
//!
//! # Locking
//! Contacts are always locked before messages. Preferences live in their
//! own attributed store.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use log::debug;
use spin::Mutex;

use crate::attr::{AttributeStats, AttributeStore, Value};
use crate::error::{check_name, Error, Result};
use crate::limits::{
    Limits, MAX_CONTACT_NAME_LEN, MAX_CONTENT_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
    MAX_PREF_VALUE_LEN,
};
use crate::registry::{Id, Registry, RegistryStats};
use crate::time::Clock;

/// An address book entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub favorite: bool,
}

pub type ContactId = Id<Contact>;

/// A stored message exchanged with one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub contact: ContactId,
    pub content: String,
    /// Milliseconds since boot when the message was stored.
    pub timestamp: u64,
    pub read: bool,
}

pub type UserMessageId = Id<UserMessage>;

/// Metadata of one application's preference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPrefs {
    pub app: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserDataStats {
    pub contacts: RegistryStats,
    pub messages: RegistryStats,
    pub preferences: AttributeStats,
}

fn check_field(field: &str, max: usize) -> Result<()> {
    if field.len() > max {
        return Err(Error::NameTooLong { max });
    }
    Ok(())
}

/// The user data service.
pub struct UserData {
    contacts: Mutex<Registry<Contact>>,
    messages: Mutex<Registry<UserMessage>>,
    prefs: AttributeStore<AppPrefs>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserData").finish_non_exhaustive()
    }
}

impl UserData {
    /// Messages are stamped from `clock`.
    pub fn new(limits: &Limits, clock: Arc<dyn Clock>) -> Self {
        Self {
            contacts: Mutex::new(Registry::with_capacity(limits.max_contacts)),
            messages: Mutex::new(Registry::with_capacity(limits.max_user_messages)),
            prefs: AttributeStore::new(limits.max_preference_apps, limits.max_attributes),
            clock,
        }
    }

    // --- contacts ---------------------------------------------------------

    /// Add a contact. Phone and email may be empty.
    pub fn add_contact(&self, name: &str, phone: &str, email: &str) -> Result<ContactId> {
        check_name(name, MAX_CONTACT_NAME_LEN)?;
        check_field(phone, MAX_PHONE_LEN)?;
        check_field(email, MAX_EMAIL_LEN)?;
        let id = self.contacts.lock().create(Contact {
            name: String::from(name),
            phone: String::from(phone),
            email: String::from(email),
            favorite: false,
        })?;
        debug!("userdata: contact {} '{}' added", id, name);
        Ok(id)
    }

    /// Remove a contact along with every message stored for it.
    pub fn remove_contact(&self, id: ContactId) -> Result<()> {
        let mut contacts = self.contacts.lock();
        contacts.destroy(id)?;
        let mut messages = self.messages.lock();
        let owned: Vec<UserMessageId> = messages
            .iter()
            .filter(|(_, m)| m.contact == id)
            .map(|(mid, _)| mid)
            .collect();
        for mid in &owned {
            messages.destroy(*mid).ok();
        }
        drop(messages);
        drop(contacts);
        debug!("userdata: contact {} removed with {} messages", id, owned.len());
        Ok(())
    }

    /// Copy of a contact.
    pub fn contact(&self, id: ContactId) -> Result<Contact> {
        self.contacts.lock().get(id).cloned().ok_or(Error::NotFound)
    }

    /// First contact with exactly `name`.
    pub fn find_contact(&self, name: &str) -> Option<ContactId> {
        self.contacts
            .lock()
            .find(|c| c.name == name)
            .map(|(id, _)| id)
    }

    /// Mark or unmark a contact as a favorite.
    pub fn set_favorite(&self, id: ContactId, favorite: bool) -> Result<()> {
        let mut contacts = self.contacts.lock();
        let contact = contacts.get_mut(id).ok_or(Error::NotFound)?;
        contact.favorite = favorite;
        Ok(())
    }

    /// Write contact identities into `out`, in slot order.
    pub fn list_contacts(&self, out: &mut [ContactId]) -> usize {
        self.contacts.lock().list(out)
    }

    /// Number of contacts.
    pub fn contact_count(&self) -> usize {
        self.contacts.lock().count()
    }

    // --- messages ---------------------------------------------------------

    /// Store an unread message for `contact`, stamped with the current time.
    pub fn add_message(&self, contact: ContactId, content: &str) -> Result<UserMessageId> {
        if content.len() > MAX_CONTENT_LEN {
            return Err(Error::PayloadTooLarge {
                max: MAX_CONTENT_LEN,
            });
        }
        let contacts = self.contacts.lock();
        if !contacts.contains(contact) {
            return Err(Error::NotFound);
        }
        let id = self.messages.lock().create(UserMessage {
            contact,
            content: String::from(content),
            timestamp: self.clock.now_ms(),
            read: false,
        })?;
        drop(contacts);
        debug!("userdata: message {} stored for contact {}", id, contact);
        Ok(id)
    }

    /// Copy of a message.
    pub fn message(&self, id: UserMessageId) -> Result<UserMessage> {
        self.messages.lock().get(id).cloned().ok_or(Error::NotFound)
    }

    /// Mark a message read.
    pub fn mark_read(&self, id: UserMessageId) -> Result<()> {
        let mut messages = self.messages.lock();
        let message = messages.get_mut(id).ok_or(Error::NotFound)?;
        message.read = true;
        Ok(())
    }

    /// Delete one message.
    pub fn remove_message(&self, id: UserMessageId) -> Result<()> {
        self.messages.lock().destroy(id)?;
        debug!("userdata: message {} removed", id);
        Ok(())
    }

    /// Write identities of `contact`'s messages into `out`, oldest slot first.
    pub fn list_messages(&self, contact: ContactId, out: &mut [UserMessageId]) -> usize {
        let messages = self.messages.lock();
        let owned = messages
            .iter()
            .filter(|(_, m)| m.contact == contact)
            .map(|(id, _)| id);
        let mut written = 0;
        for (dst, id) in out.iter_mut().zip(owned) {
            *dst = id;
            written += 1;
        }
        written
    }

    /// Number of unread messages for `contact`.
    pub fn unread_count(&self, contact: ContactId) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|(_, m)| m.contact == contact && !m.read)
            .count()
    }

    // --- preferences ------------------------------------------------------

    /// Set `app`'s preference `key`, replacing any existing value.
    pub fn set_pref(&self, app: &str, key: &str, value: &str) -> Result<()> {
        check_name(app, MAX_NAME_LEN)?;
        check_name(key, MAX_NAME_LEN)?;
        check_field(value, MAX_PREF_VALUE_LEN)?;
        let owner = self.prefs.find_or_create(
            |meta| meta.app == app,
            || AppPrefs {
                app: String::from(app),
            },
        )?;
        self.prefs.add_attribute(owner, key, Value::from(value))?;
        debug!("userdata: pref {}.{} set", app, key);
        Ok(())
    }

    /// Value of `app`'s preference `key`.
    pub fn pref(&self, app: &str, key: &str) -> Result<String> {
        let owner = self.prefs.find(|meta| meta.app == app).ok_or(Error::NotFound)?;
        match self.prefs.value(owner, key)? {
            Value::Text(text) => Ok(text),
            _ => Err(Error::KindMismatch),
        }
    }

    /// Keys `app` has set, in insertion order. Empty for an unknown app.
    pub fn pref_keys(&self, app: &str) -> Vec<String> {
        self.prefs
            .find(|meta| meta.app == app)
            .and_then(|owner| self.prefs.attribute_names(owner).ok())
            .unwrap_or_default()
    }

    /// Remove `app`'s preference `key`.
    pub fn remove_pref(&self, app: &str, key: &str) -> Result<()> {
        let owner = self.prefs.find(|meta| meta.app == app).ok_or(Error::NotFound)?;
        self.prefs.remove_attribute(owner, key).map(|_| ())
    }

    /// Contact, message and preference counts.
    pub fn stats(&self) -> UserDataStats {
        UserDataStats {
            contacts: self.contacts.lock().stats(),
            messages: self.messages.lock().stats(),
            preferences: self.prefs.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TickClock;

    fn userdata() -> (UserData, Arc<TickClock>) {
        let clock = Arc::new(TickClock::new());
        (UserData::new(&Limits::small(), clock.clone()), clock)
    }

    #[test]
    fn test_contact_lifecycle() {
        let (data, _) = userdata();
        let ada = data.add_contact("Ada", "555-0100", "ada@example.org").unwrap();
        let bob = data.add_contact("Bob", "", "").unwrap();
        assert_eq!(data.find_contact("Bob"), Some(bob));
        assert_eq!(data.contact_count(), 2);

        data.set_favorite(ada, true).unwrap();
        assert!(data.contact(ada).unwrap().favorite);
        assert!(!data.contact(bob).unwrap().favorite);

        let mut out = [ada; 4];
        assert_eq!(data.list_contacts(&mut out), 2);
        assert_eq!(&out[..2], &[ada, bob]);

        data.remove_contact(ada).unwrap();
        assert_eq!(data.contact(ada), Err(Error::NotFound));
        assert_eq!(data.set_favorite(ada, false), Err(Error::NotFound));
        assert_eq!(data.remove_contact(ada), Err(Error::NotFound));
    }

    #[test]
    fn test_contact_field_limits() {
        let (data, _) = userdata();
        assert_eq!(data.add_contact("", "", ""), Err(Error::InvalidEntry));
        let long = "x".repeat(MAX_CONTACT_NAME_LEN + 1);
        assert_eq!(
            data.add_contact(&long, "", ""),
            Err(Error::NameTooLong {
                max: MAX_CONTACT_NAME_LEN
            })
        );
        let phone = "1".repeat(MAX_PHONE_LEN + 1);
        assert_eq!(
            data.add_contact("Ada", &phone, ""),
            Err(Error::NameTooLong { max: MAX_PHONE_LEN })
        );
        let email = "e".repeat(MAX_EMAIL_LEN + 1);
        assert_eq!(
            data.add_contact("Ada", "", &email),
            Err(Error::NameTooLong { max: MAX_EMAIL_LEN })
        );
        assert_eq!(data.contact_count(), 0);
    }

    #[test]
    fn test_messages_are_stamped_and_tracked() {
        let (data, clock) = userdata();
        let ada = data.add_contact("Ada", "", "").unwrap();
        let bob = data.add_contact("Bob", "", "").unwrap();

        clock.set(40);
        let first = data.add_message(ada, "hello").unwrap();
        clock.tick(2);
        let second = data.add_message(ada, "again").unwrap();
        data.add_message(bob, "hi bob").unwrap();

        let stored = data.message(second).unwrap();
        assert_eq!(stored.timestamp, 42);
        assert_eq!(stored.content, "again");
        assert!(!stored.read);

        assert_eq!(data.unread_count(ada), 2);
        data.mark_read(first).unwrap();
        assert_eq!(data.unread_count(ada), 1);

        let mut out = [first; 4];
        assert_eq!(data.list_messages(ada, &mut out), 2);
        assert_eq!(&out[..2], &[first, second]);

        data.remove_message(first).unwrap();
        assert_eq!(data.mark_read(first), Err(Error::NotFound));
        assert_eq!(data.list_messages(ada, &mut out), 1);
    }

    #[test]
    fn test_message_needs_live_contact() {
        let (data, _) = userdata();
        let ada = data.add_contact("Ada", "", "").unwrap();
        let long = "m".repeat(MAX_CONTENT_LEN + 1);
        assert_eq!(
            data.add_message(ada, &long),
            Err(Error::PayloadTooLarge {
                max: MAX_CONTENT_LEN
            })
        );

        data.add_message(ada, "one").unwrap();
        data.add_message(ada, "two").unwrap();
        data.remove_contact(ada).unwrap();
        assert_eq!(data.stats().messages.active, 0);
        assert_eq!(data.add_message(ada, "three"), Err(Error::NotFound));
    }

    #[test]
    fn test_preferences_upsert() {
        let (data, _) = userdata();
        data.set_pref("shell", "theme", "dark").unwrap();
        data.set_pref("shell", "prompt", "$").unwrap();
        data.set_pref("shell", "theme", "light").unwrap();

        assert_eq!(data.pref("shell", "theme").as_deref(), Ok("light"));
        assert_eq!(data.pref_keys("shell"), vec!["theme", "prompt"]);
        assert_eq!(data.stats().preferences.active_records, 1);
        assert!(data.pref_keys("clock").is_empty());
        assert_eq!(data.pref("clock", "tz"), Err(Error::NotFound));
        assert_eq!(data.pref("shell", "font"), Err(Error::NotFound));

        data.remove_pref("shell", "prompt").unwrap();
        assert_eq!(data.pref_keys("shell"), vec!["theme"]);
        assert_eq!(data.remove_pref("shell", "prompt"), Err(Error::NotFound));
    }

    #[test]
    fn test_preference_limits() {
        let (data, _) = userdata();
        let value = "v".repeat(MAX_PREF_VALUE_LEN + 1);
        assert_eq!(
            data.set_pref("shell", "theme", &value),
            Err(Error::NameTooLong {
                max: MAX_PREF_VALUE_LEN
            })
        );
        assert_eq!(data.set_pref("", "theme", "dark"), Err(Error::InvalidEntry));
        assert_eq!(data.stats().preferences.active_records, 0);

        for app in ["a", "b", "c", "d"] {
            data.set_pref(app, "k", "v").unwrap();
        }
        assert_eq!(data.set_pref("e", "k", "v"), Err(Error::RegistryFull));
        data.set_pref("a", "k", "w").unwrap();
        assert_eq!(data.pref("a", "k").as_deref(), Ok("w"));
    }

    #[test]
    fn test_capacity_reported() {
        let (data, _) = userdata();
        let limit = Limits::small().max_contacts;
        for i in 0..limit {
            data.add_contact(&format!("c{}", i), "", "").unwrap();
        }
        assert_eq!(data.add_contact("extra", "", ""), Err(Error::RegistryFull));
        assert_eq!(data.stats().contacts.active, limit);
    }
}
