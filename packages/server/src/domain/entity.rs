//! Core domain models for the relay.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, SessionId};

/// Membership bookkeeping for every live connection.
///
/// Holds the forward map (connection -> session) and the reverse map
/// (session -> members). Both maps change together inside each method, and a
/// session key only exists while it has at least one member.
#[derive(Debug, Default, Clone)]
pub struct SessionRegistry {
    memberships: HashMap<ConnectionId, SessionId>,
    sessions: HashMap<SessionId, HashSet<ConnectionId>>,
}

/// Result of removing a connection from a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDeparture {
    /// Session the connection was removed from
    pub session_id: SessionId,
    /// Members still in the session after the removal, sorted
    pub remaining: Vec<ConnectionId>,
}

impl SessionDeparture {
    /// The session entry was deleted because nobody is left.
    pub fn emptied(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Result of joining a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTransition {
    /// Session the connection is now a member of
    pub session_id: SessionId,
    /// Other members of that session at the moment of joining, sorted
    pub peers: Vec<ConnectionId>,
    /// Departure from a different previous session, if any
    pub departed: Option<SessionDeparture>,
}

/// Read-only view of one non-empty session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub members: Vec<ConnectionId>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `connection_id` into `session_id`, leaving any other session first.
    ///
    /// Re-joining the current session keeps membership unchanged.
    pub fn join(&mut self, connection_id: ConnectionId, session_id: SessionId) -> JoinTransition {
        let departed = match self.memberships.get(&connection_id) {
            Some(current) if current == &session_id => None,
            Some(_) => self.leave(&connection_id),
            None => None,
        };

        self.sessions
            .entry(session_id.clone())
            .or_default()
            .insert(connection_id.clone());
        self.memberships
            .insert(connection_id.clone(), session_id.clone());

        let peers = self
            .sorted_members(&session_id)
            .into_iter()
            .filter(|member| member != &connection_id)
            .collect();

        JoinTransition {
            session_id,
            peers,
            departed,
        }
    }

    /// Remove `connection_id` from its session, pruning the session if it empties.
    ///
    /// Returns `None` when the connection had no session.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<SessionDeparture> {
        let session_id = self.memberships.remove(connection_id)?;

        let emptied = match self.sessions.get_mut(&session_id) {
            Some(members) => {
                members.remove(connection_id);
                members.is_empty()
            }
            None => false,
        };
        if emptied {
            self.sessions.remove(&session_id);
        }

        let remaining = self.sorted_members(&session_id);
        Some(SessionDeparture {
            session_id,
            remaining,
        })
    }

    /// Members of `session_id`, sorted. Empty when the session does not exist.
    pub fn members_of(&self, session_id: &SessionId) -> Vec<ConnectionId> {
        self.sorted_members(session_id)
    }

    /// Session the connection currently belongs to.
    pub fn current_session(&self, connection_id: &ConnectionId) -> Option<&SessionId> {
        self.memberships.get(connection_id)
    }

    /// Number of distinct non-empty sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// All sessions, sorted by id.
    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        let mut snapshots: Vec<SessionSnapshot> = self
            .sessions
            .keys()
            .map(|id| SessionSnapshot {
                id: id.clone(),
                members: self.sorted_members(id),
            })
            .collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    fn sorted_members(&self, session_id: &SessionId) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self
            .sessions
            .get(session_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// Both maps describe the same membership and no session is empty.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let forward_ok = self.memberships.iter().all(|(conn, session)| {
            self.sessions
                .get(session)
                .is_some_and(|members| members.contains(conn))
        });
        let reverse_ok = self.sessions.iter().all(|(session, members)| {
            !members.is_empty()
                && members
                    .iter()
                    .all(|conn| self.memberships.get(conn) == Some(session))
        });
        forward_ok && reverse_ok
    }
}
