use std::collections::HashSet;

use crate::{
    domain::{GuildId, PermissionSet, RoleId, UserId},
    errors::Error,
    interaction::types::{InteractionData, MemberData},
    Result,
};

/// A role the invoking member holds, scoped to the interaction's guild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoleRef {
    pub guild_id: GuildId,
    pub role_id: RoleId,
}

/// Read-only member facet over the interaction snapshot.
///
/// Every accessor is fallible: interactions invoked outside a guild carry no
/// member record, and the permission field is a decimal string that may be
/// absent or malformed. Failures propagate; nothing is masked here.
pub struct InteractionMember<'a> {
    data: &'a InteractionData,
}

impl<'a> InteractionMember<'a> {
    pub(crate) fn new(data: &'a InteractionData) -> Self {
        InteractionMember { data }
    }

    fn member(&self) -> Result<&'a MemberData> {
        self.data
            .member
            .as_ref()
            .ok_or(Error::MissingData("interaction has no member context"))
    }

    pub fn user_id(&self) -> Result<UserId> {
        self.member()?
            .user
            .as_ref()
            .map(|user| user.id)
            .ok_or(Error::MissingData("member record has no user"))
    }

    /// The member's roles as a set (duplicate ids collapse).
    pub fn roles(&self) -> Result<HashSet<RoleRef>> {
        let guild_id = self.data.guild_id;
        Ok(self
            .member()?
            .roles
            .iter()
            .map(|&role_id| RoleRef { guild_id, role_id })
            .collect())
    }

    pub fn permissions(&self) -> Result<PermissionSet> {
        let member = self.member()?;
        member
            .permissions
            .as_deref()
            .ok_or(Error::MissingData("member record has no permissions field"))?
            .parse()
    }
}
