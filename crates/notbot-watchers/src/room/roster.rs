use std::collections::HashMap;

use super::stanza::Presence;

/// Outcome of applying one presence stanza to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterChange {
    Joined { jid: String, nick: String },
    Left { jid: String, nick: String },
    Renamed { jid: String, from: String, to: String },
}

/// Participants currently in the room, keyed by jid.
#[derive(Debug, Default)]
pub struct Roster {
    members: HashMap<String, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn nick(&self, jid: &str) -> Option<&str> {
        self.members.get(jid).map(String::as_str)
    }

    /// Apply a stanza. Departures are checked first, so an `unavailable`
    /// stanza that still carries a nick never registers a join or a rename.
    /// Checking the nick first would report such a stanza from an unknown
    /// jid as a join, and one from a known jid as a rename.
    pub fn apply(&mut self, presence: &Presence) -> Option<RosterChange> {
        let jid = presence.jid.as_ref()?;

        if presence.is_unavailable() {
            let nick = self.members.remove(jid)?;
            return Some(RosterChange::Left {
                jid: jid.clone(),
                nick,
            });
        }

        let nick = presence.nick.as_ref()?;
        match self.members.get_mut(jid) {
            Some(known) if known == nick => None,
            Some(known) => {
                let from = std::mem::replace(known, nick.clone());
                Some(RosterChange::Renamed {
                    jid: jid.clone(),
                    from,
                    to: nick.clone(),
                })
            }
            None => {
                self.members.insert(jid.clone(), nick.clone());
                Some(RosterChange::Joined {
                    jid: jid.clone(),
                    nick: nick.clone(),
                })
            }
        }
    }
}
