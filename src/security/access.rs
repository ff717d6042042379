//! Access Control Layer
//!
//! Users, groups, sessions, and per-resource permission entries, each held
//! in its own locked [`Registry`].
//!
//! # Permission Resolution
//! ```text
//! check_permission(session, resource, requested)
//!   session ──▶ user ──▶ group
//!   1. entry for (resource, user)   ─┐
//!   2. entry for (resource, group)  ─┼─ first hit decides
//!   3. group's blanket permissions  ─┘
//! ```
//! Anything that fails to resolve denies.
//!
//! # Locking
//! Each table has its own spinlock. An operation that needs several tables
//! at once takes them in the order users, groups, sessions, permissions.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use log::{debug, info, warn};
use spin::Mutex;

use super::credential::CredentialHash;
use super::permissions::Permissions;
use crate::error::{check_name, Error, Result};
use crate::limits::{Limits, MAX_NAME_LEN};
use crate::registry::{Id, Registry, RegistryStats};
use crate::time::Clock;

/// A user account. The credential is held only as a digest.
pub struct User {
    username: String,
    credential: CredentialHash,
    group: GroupId,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// A group and its blanket permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub permissions: Permissions,
}

/// An authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user: UserId,
    /// Milliseconds since boot.
    pub created_at: u64,
    /// Milliseconds since boot of the last permission check or touch.
    pub last_access: u64,
}

/// A rule granting `permissions` on `resource` to a user or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePermission {
    pub resource: u64,
    pub user: Option<UserId>,
    pub group: Option<GroupId>,
    pub permissions: Permissions,
}

pub type UserId = Id<User>;
pub type GroupId = Id<Group>;
pub type SessionId = Id<Session>;
pub type PermissionId = Id<ResourcePermission>;

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    pub group: GroupId,
}

/// The groups created at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultGroups {
    /// Every permission bit.
    pub root: GroupId,
    /// Read and write.
    pub users: GroupId,
    /// Read only.
    pub guests: GroupId,
}

/// Read-only aggregate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityStats {
    pub users: RegistryStats,
    pub groups: RegistryStats,
    pub sessions: RegistryStats,
    pub permissions: RegistryStats,
}

/// The access control service.
pub struct AccessControl {
    users: Mutex<Registry<User>>,
    groups: Mutex<Registry<Group>>,
    sessions: Mutex<Registry<Session>>,
    permissions: Mutex<Registry<ResourcePermission>>,
    clock: Arc<dyn Clock>,
    defaults: DefaultGroups,
}

impl fmt::Debug for AccessControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControl")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl AccessControl {
    /// Initialize the tables and create the `root`, `users` and `guests`
    /// groups.
    pub fn new(limits: &Limits, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut groups = Registry::with_capacity(limits.max_groups);
        let mut bootstrap = |name: &str, permissions| {
            groups.create(Group {
                name: String::from(name),
                permissions,
            })
        };
        let defaults = DefaultGroups {
            root: bootstrap("root", Permissions::ALL)?,
            users: bootstrap("users", Permissions::READ_WRITE)?,
            guests: bootstrap("guests", Permissions::READ)?,
        };
        info!(
            "security: default groups root={} users={} guests={}",
            defaults.root, defaults.users, defaults.guests
        );

        Ok(Self {
            users: Mutex::new(Registry::with_capacity(limits.max_users)),
            groups: Mutex::new(groups),
            sessions: Mutex::new(Registry::with_capacity(limits.max_sessions)),
            permissions: Mutex::new(Registry::with_capacity(limits.max_permissions)),
            clock,
            defaults,
        })
    }

    /// The groups created at initialization.
    #[inline]
    pub fn default_groups(&self) -> DefaultGroups {
        self.defaults
    }

    // --- groups -----------------------------------------------------------

    /// Create a group with blanket `permissions`. Names are unique.
    pub fn create_group(&self, name: &str, permissions: Permissions) -> Result<GroupId> {
        check_name(name, MAX_NAME_LEN)?;
        let mut groups = self.groups.lock();
        if groups.find(|g| g.name == name).is_some() {
            return Err(Error::NameTaken);
        }
        let id = groups.create(Group {
            name: String::from(name),
            permissions,
        })?;
        debug!("security: group {} '{}' created", id, name);
        Ok(id)
    }

    /// Destroy a group. Fails with `InUse` while any user belongs to it.
    pub fn destroy_group(&self, id: GroupId) -> Result<()> {
        let users = self.users.lock();
        let mut groups = self.groups.lock();
        if !groups.contains(id) {
            return Err(Error::NotFound);
        }
        if users.find(|u| u.group == id).is_some() {
            return Err(Error::InUse);
        }
        groups.destroy(id)?;
        debug!("security: group {} destroyed", id);
        Ok(())
    }

    /// Copy of an active group.
    pub fn group(&self, id: GroupId) -> Result<Group> {
        self.groups.lock().get(id).cloned().ok_or(Error::NotFound)
    }

    /// Look up a group by name.
    pub fn find_group(&self, name: &str) -> Option<GroupId> {
        self.groups.lock().find(|g| g.name == name).map(|(id, _)| id)
    }

    /// Write active group identities into `out`, in slot order.
    pub fn list_groups(&self, out: &mut [GroupId]) -> usize {
        self.groups.lock().list(out)
    }

    /// Number of active groups.
    pub fn group_count(&self) -> usize {
        self.groups.lock().count()
    }

    // --- users ------------------------------------------------------------

    /// Create a user in `group`. Only a digest of `credential` is kept.
    pub fn create_user(
        &self,
        username: &str,
        credential: &[u8],
        group: GroupId,
    ) -> Result<UserId> {
        check_name(username, MAX_NAME_LEN)?;
        let mut users = self.users.lock();
        if users.find(|u| u.username == username).is_some() {
            return Err(Error::NameTaken);
        }
        if !self.groups.lock().contains(group) {
            return Err(Error::NotFound);
        }
        if users.is_full() {
            return Err(Error::RegistryFull);
        }
        let id = users.create(User {
            username: String::from(username),
            credential: CredentialHash::derive(username, credential),
            group,
        })?;
        debug!("security: user {} '{}' created in group {}", id, username, group);
        Ok(id)
    }

    /// Destroy a user, ending its sessions and dropping its own entries.
    pub fn destroy_user(&self, id: UserId) -> Result<()> {
        let mut users = self.users.lock();
        users.destroy(id)?;

        let ended = {
            let mut sessions = self.sessions.lock();
            let stale: Vec<SessionId> = sessions
                .iter()
                .filter(|(_, s)| s.user == id)
                .map(|(sid, _)| sid)
                .collect();
            for sid in &stale {
                sessions.destroy(*sid).ok();
            }
            stale.len()
        };

        let mut permissions = self.permissions.lock();
        let owned: Vec<PermissionId> = permissions
            .iter()
            .filter(|(_, p)| p.user == Some(id))
            .map(|(pid, _)| pid)
            .collect();
        for pid in owned {
            permissions.destroy(pid).ok();
        }
        drop(users);

        debug!("security: user {} destroyed, {} sessions ended", id, ended);
        Ok(())
    }

    /// Public view of an active user.
    pub fn user(&self, id: UserId) -> Result<UserInfo> {
        self.users
            .lock()
            .get(id)
            .map(|u| UserInfo {
                id,
                username: u.username.clone(),
                group: u.group,
            })
            .ok_or(Error::NotFound)
    }

    /// Look up a user by name.
    pub fn find_user(&self, username: &str) -> Option<UserId> {
        self.users
            .lock()
            .find(|u| u.username == username)
            .map(|(id, _)| id)
    }

    /// Write active user identities into `out`, in slot order.
    pub fn list_users(&self, out: &mut [UserId]) -> usize {
        self.users.lock().list(out)
    }

    /// Number of active users.
    pub fn user_count(&self) -> usize {
        self.users.lock().count()
    }

    /// Check a credential against the named user's stored digest.
    pub fn authenticate(&self, username: &str, credential: &[u8]) -> bool {
        self.verify(username, credential).is_some()
    }

    fn verify(&self, username: &str, credential: &[u8]) -> Option<UserId> {
        let users = self.users.lock();
        let verified = users
            .find(|u| u.username == username)
            .filter(|(_, u)| u.credential.verify(username, credential))
            .map(|(id, _)| id);
        if verified.is_none() {
            warn!("security: authentication failed for '{}'", username);
        }
        verified
    }

    // --- sessions ---------------------------------------------------------

    /// Open a session for an active user.
    pub fn create_session(&self, user: UserId) -> Result<SessionId> {
        let users = self.users.lock();
        if !users.contains(user) {
            return Err(Error::NotFound);
        }
        let now = self.clock.now_ms();
        let id = self.sessions.lock().create(Session {
            user,
            created_at: now,
            last_access: now,
        })?;
        debug!("security: session {} opened for user {}", id, user);
        Ok(id)
    }

    /// Authenticate and open a session in one step.
    pub fn login(&self, username: &str, credential: &[u8]) -> Result<SessionId> {
        let user = self
            .verify(username, credential)
            .ok_or(Error::PermissionDenied)?;
        self.create_session(user)
    }

    /// Refresh a session's `last_access`.
    pub fn touch_session(&self, id: SessionId) -> Result<()> {
        let now = self.clock.now_ms();
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(id).ok_or(Error::NotFound)?;
        session.last_access = now;
        Ok(())
    }

    /// End a session.
    pub fn end_session(&self, id: SessionId) -> Result<()> {
        self.sessions.lock().destroy(id)?;
        debug!("security: session {} ended", id);
        Ok(())
    }

    /// Copy of an active session.
    pub fn session(&self, id: SessionId) -> Result<Session> {
        self.sessions.lock().get(id).copied().ok_or(Error::NotFound)
    }

    /// Write active session identities into `out`, in slot order.
    pub fn list_sessions(&self, out: &mut [SessionId]) -> usize {
        self.sessions.lock().list(out)
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().count()
    }

    // --- resource permissions ---------------------------------------------

    /// Grant `permissions` on `resource` to a user, a group, or both.
    ///
    /// An entry naming neither is rejected with `InvalidEntry`.
    pub fn add_resource_permission(
        &self,
        resource: u64,
        user: Option<UserId>,
        group: Option<GroupId>,
        permissions: Permissions,
    ) -> Result<PermissionId> {
        if user.is_none() && group.is_none() {
            return Err(Error::InvalidEntry);
        }
        let users = self.users.lock();
        let groups = self.groups.lock();
        if user.is_some_and(|u| !users.contains(u)) || group.is_some_and(|g| !groups.contains(g)) {
            return Err(Error::NotFound);
        }
        let id = self.permissions.lock().create(ResourcePermission {
            resource,
            user,
            group,
            permissions,
        })?;
        drop(groups);
        drop(users);
        debug!(
            "security: entry {} grants {:?} on resource {}",
            id, permissions, resource
        );
        Ok(id)
    }

    /// Remove a permission entry.
    pub fn revoke(&self, id: PermissionId) -> Result<()> {
        self.permissions.lock().destroy(id).map(|_| ())
    }

    /// Copy of an active permission entry.
    pub fn resource_permission(&self, id: PermissionId) -> Result<ResourcePermission> {
        self.permissions.lock().get(id).copied().ok_or(Error::NotFound)
    }

    /// Write active entry identities into `out`, in slot order.
    pub fn list_permissions(&self, out: &mut [PermissionId]) -> usize {
        self.permissions.lock().list(out)
    }

    /// Decide whether `session` holds every bit of `requested` on
    /// `resource`.
    ///
    /// A user-specific entry decides before any group entry, and a group
    /// entry before the group's blanket permissions. Unknown sessions,
    /// users, or groups deny. A resolved session has its `last_access`
    /// refreshed.
    pub fn check_permission(
        &self,
        session: SessionId,
        resource: u64,
        requested: Permissions,
    ) -> bool {
        let now = self.clock.now_ms();
        let user = {
            let mut sessions = self.sessions.lock();
            match sessions.get_mut(session) {
                Some(s) => {
                    s.last_access = now;
                    s.user
                }
                None => return false,
            }
        };

        let group = match self.users.lock().get(user) {
            Some(u) => u.group,
            None => return false,
        };

        let granted = match self.resource_grant(resource, user, group) {
            Some(granted) => granted,
            None => match self.groups.lock().get(group) {
                Some(g) => g.permissions,
                None => return false,
            },
        };

        let allowed = granted.grants(requested);
        if !allowed {
            debug!(
                "security: session {} denied {:?} on resource {}",
                session, requested, resource
            );
        }
        allowed
    }

    fn resource_grant(&self, resource: u64, user: UserId, group: GroupId) -> Option<Permissions> {
        let entries = self.permissions.lock();
        let for_resource = || entries.iter().filter(move |(_, e)| e.resource == resource);

        let granted = for_resource()
            .find(|(_, e)| e.user == Some(user))
            .or_else(|| for_resource().find(|(_, e)| e.group == Some(group)))
            .map(|(_, e)| e.permissions);
        granted
    }

    /// Per-table counts.
    pub fn stats(&self) -> SecurityStats {
        SecurityStats {
            users: self.users.lock().stats(),
            groups: self.groups.lock().stats(),
            sessions: self.sessions.lock().stats(),
            permissions: self.permissions.lock().stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TickClock;

    fn setup() -> (AccessControl, Arc<TickClock>) {
        let clock = Arc::new(TickClock::new());
        let acl = AccessControl::new(&Limits::small(), clock.clone()).unwrap();
        (acl, clock)
    }

    #[test]
    fn test_default_groups() {
        let (acl, _) = setup();
        let defaults = acl.default_groups();
        assert_eq!(acl.group(defaults.root).unwrap().permissions, Permissions::ALL);
        assert_eq!(
            acl.group(defaults.users).unwrap().permissions,
            Permissions::READ_WRITE
        );
        assert_eq!(acl.group(defaults.guests).unwrap().name, "guests");
        assert_eq!(acl.find_group("root"), Some(defaults.root));
        assert_eq!(acl.group_count(), 3);
    }

    #[test]
    fn test_too_few_group_slots() {
        let limits = Limits {
            max_groups: 2,
            ..Limits::small()
        };
        let result = AccessControl::new(&limits, Arc::new(TickClock::new()));
        assert!(matches!(result, Err(Error::RegistryFull)));
    }

    #[test]
    fn test_authenticate() {
        let (acl, _) = setup();
        let users = acl.default_groups().users;
        acl.create_user("alice", b"s3cret", users).unwrap();
        assert!(acl.authenticate("alice", b"s3cret"));
        assert!(!acl.authenticate("alice", b"wrong"));
        assert!(!acl.authenticate("mallory", b"s3cret"));
    }

    #[test]
    fn test_create_user_validation() {
        let (acl, _) = setup();
        let users = acl.default_groups().users;
        acl.create_user("alice", b"pw", users).unwrap();
        assert_eq!(acl.create_user("alice", b"pw", users), Err(Error::NameTaken));

        let gone = acl.create_group("temp", Permissions::READ).unwrap();
        acl.destroy_group(gone).unwrap();
        assert_eq!(acl.create_user("bob", b"pw", gone), Err(Error::NotFound));
        assert_eq!(acl.stats().users.active, 1);
    }

    #[test]
    fn test_group_blanket_permissions() {
        let (acl, _) = setup();
        let guests = acl.default_groups().guests;
        let user = acl.create_user("guest", b"pw", guests).unwrap();
        let session = acl.create_session(user).unwrap();
        assert!(acl.check_permission(session, 9, Permissions::READ));
        assert!(!acl.check_permission(session, 9, Permissions::WRITE));
    }

    #[test]
    fn test_user_entry_wins_over_group_entry() {
        let (acl, _) = setup();
        let users = acl.default_groups().users;
        let user = acl.create_user("alice", b"pw", users).unwrap();
        let session = acl.create_session(user).unwrap();

        // The group entry is older, so it sits first in the table.
        acl.add_resource_permission(42, None, Some(users), Permissions::READ_WRITE)
            .unwrap();
        acl.add_resource_permission(42, Some(user), None, Permissions::READ)
            .unwrap();

        assert!(acl.check_permission(session, 42, Permissions::READ));
        assert!(!acl.check_permission(session, 42, Permissions::WRITE));
    }

    #[test]
    fn test_group_entry_overrides_blanket() {
        let (acl, _) = setup();
        let root = acl.default_groups().root;
        let user = acl.create_user("admin", b"pw", root).unwrap();
        let session = acl.create_session(user).unwrap();
        acl.add_resource_permission(7, None, Some(root), Permissions::READ)
            .unwrap();

        assert!(!acl.check_permission(session, 7, Permissions::WRITE));
        // Other resources still use the blanket grant.
        assert!(acl.check_permission(session, 8, Permissions::WRITE | Permissions::DELETE));
    }

    #[test]
    fn test_entry_for_other_user_is_ignored() {
        let (acl, _) = setup();
        let guests = acl.default_groups().guests;
        let alice = acl.create_user("alice", b"pw", guests).unwrap();
        let bob = acl.create_user("bob", b"pw", guests).unwrap();
        acl.add_resource_permission(1, Some(bob), None, Permissions::ALL)
            .unwrap();
        let session = acl.create_session(alice).unwrap();
        assert!(!acl.check_permission(session, 1, Permissions::WRITE));
    }

    #[test]
    fn test_inactive_session_or_user_denies() {
        let (acl, _) = setup();
        let root = acl.default_groups().root;
        let user = acl.create_user("admin", b"pw", root).unwrap();
        let session = acl.create_session(user).unwrap();
        assert!(acl.check_permission(session, 1, Permissions::READ));

        acl.end_session(session).unwrap();
        assert!(!acl.check_permission(session, 1, Permissions::READ));
        assert_eq!(acl.session_count(), 0);

        let session = acl.create_session(user).unwrap();
        acl.destroy_user(user).unwrap();
        assert!(!acl.check_permission(session, 1, Permissions::READ));
        assert_eq!(acl.session(session), Err(Error::NotFound));
        assert_eq!(acl.create_session(user), Err(Error::NotFound));
    }

    #[test]
    fn test_entry_needs_a_subject() {
        let (acl, _) = setup();
        assert_eq!(
            acl.add_resource_permission(1, None, None, Permissions::READ),
            Err(Error::InvalidEntry)
        );
        assert_eq!(acl.stats().permissions.active, 0);
    }

    #[test]
    fn test_entry_subjects_must_be_active() {
        let (acl, _) = setup();
        let guests = acl.default_groups().guests;
        let user = acl.create_user("frank", b"pw", guests).unwrap();
        acl.add_resource_permission(5, Some(user), None, Permissions::ALL)
            .unwrap();
        acl.destroy_user(user).unwrap();

        assert_eq!(acl.stats().permissions.active, 0);
        assert_eq!(
            acl.add_resource_permission(5, Some(user), Some(guests), Permissions::READ),
            Err(Error::NotFound)
        );
        assert_eq!(acl.stats().permissions.active, 0);
    }

    #[test]
    fn test_revoke_restores_blanket() {
        let (acl, _) = setup();
        let guests = acl.default_groups().guests;
        let user = acl.create_user("guest", b"pw", guests).unwrap();
        let session = acl.create_session(user).unwrap();
        let entry = acl
            .add_resource_permission(3, Some(user), None, Permissions::WRITE)
            .unwrap();
        assert!(acl.check_permission(session, 3, Permissions::WRITE));
        acl.revoke(entry).unwrap();
        assert!(!acl.check_permission(session, 3, Permissions::WRITE));
        assert_eq!(acl.resource_permission(entry), Err(Error::NotFound));
    }

    #[test]
    fn test_destroy_group_in_use() {
        let (acl, _) = setup();
        let staff = acl.create_group("staff", Permissions::READ).unwrap();
        let user = acl.create_user("carol", b"pw", staff).unwrap();
        assert_eq!(acl.destroy_group(staff), Err(Error::InUse));
        acl.destroy_user(user).unwrap();
        assert_eq!(acl.destroy_group(staff), Ok(()));
        assert_eq!(acl.create_group("staff", Permissions::READ).map(|_| ()), Ok(()));
    }

    #[test]
    fn test_session_timestamps() {
        let (acl, clock) = setup();
        let guests = acl.default_groups().guests;
        let user = acl.create_user("guest", b"pw", guests).unwrap();
        clock.set(100);
        let session = acl.create_session(user).unwrap();
        clock.tick(50);
        acl.check_permission(session, 1, Permissions::READ);
        let info = acl.session(session).unwrap();
        assert_eq!(info.created_at, 100);
        assert_eq!(info.last_access, 150);

        clock.tick(25);
        acl.touch_session(session).unwrap();
        assert_eq!(acl.session(session).unwrap().last_access, 175);
    }

    #[test]
    fn test_login() {
        let (acl, _) = setup();
        let users = acl.default_groups().users;
        let user = acl.create_user("dave", b"pw", users).unwrap();
        let session = acl.login("dave", b"pw").unwrap();
        assert_eq!(acl.session(session).unwrap().user, user);
        assert_eq!(acl.login("dave", b"nope"), Err(Error::PermissionDenied));
    }

    #[test]
    fn test_user_capacity() {
        let (acl, _) = setup();
        let guests = acl.default_groups().guests;
        let max = Limits::small().max_users;
        for i in 0..max {
            let name = alloc::format!("user{}", i);
            acl.create_user(&name, b"pw", guests).unwrap();
        }
        assert_eq!(
            acl.create_user("overflow", b"pw", guests),
            Err(Error::RegistryFull)
        );
        assert_eq!(acl.user_count(), max);

        let mut ids = [acl.default_groups().root; 2];
        assert_eq!(acl.list_groups(&mut ids), 2);
    }

    #[test]
    fn test_user_info_hides_credential() {
        let (acl, _) = setup();
        let users = acl.default_groups().users;
        let id = acl.create_user("erin", b"topsecret", users).unwrap();
        let info = acl.user(id).unwrap();
        assert_eq!(info.username, "erin");
        assert_eq!(info.group, users);
        let debug = alloc::format!("{:?}", acl.users.lock().get(id).unwrap());
        assert!(!debug.contains("credential"));
    }
}
