//! Caller identity, capabilities and web-service tokens.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// A named permission, e.g. `moodle/site:config`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    /// Permission to change the site configuration. Both report functions
    /// require it.
    pub const SITE_CONFIG: &'static str = "moodle/site:config";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn site_config() -> Self {
        Self::new(Self::SITE_CONFIG)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is calling, and what they were granted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallerContext {
    pub user: String,
    pub capabilities: BTreeSet<Capability>,
    /// Site administrators hold every capability.
    pub site_admin: bool,
}

impl CallerContext {
    /// A caller with no identity and no capabilities.
    pub fn anonymous() -> Self {
        Self {
            user: "guest".to_string(),
            capabilities: BTreeSet::new(),
            site_admin: false,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            user: name.into(),
            ..Self::anonymous()
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            site_admin: true,
            ..Self::user(name)
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(Capability::new(capability));
        self
    }
}

/// Decides whether a caller holds a capability.
pub trait AuthorizationPolicy: Send + Sync {
    fn has_capability(&self, caller: &CallerContext, capability: &Capability) -> bool;
}

impl<F> AuthorizationPolicy for F
where
    F: Fn(&CallerContext, &Capability) -> bool + Send + Sync,
{
    fn has_capability(&self, caller: &CallerContext, capability: &Capability) -> bool {
        self(caller, capability)
    }
}

/// Default policy: the capability must be granted to the caller, unless the
/// caller is a site administrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedCapabilities;

impl AuthorizationPolicy for GrantedCapabilities {
    fn has_capability(&self, caller: &CallerContext, capability: &Capability) -> bool {
        caller.site_admin || caller.capabilities.contains(capability)
    }
}

/// Fail with [`Error::MissingCapability`] unless `policy` allows `caller`
/// to use `capability`.
pub fn require_capability(
    policy: &dyn AuthorizationPolicy,
    caller: &CallerContext,
    capability: &Capability,
) -> Result<()> {
    if policy.has_capability(caller, capability) {
        return Ok(());
    }
    warn!(user = %caller.user, capability = %capability, "Capability check failed");
    Err(Error::MissingCapability {
        capability: capability.to_string(),
        user: caller.user.clone(),
    })
}

/// A web-service token and what it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub user: String,
    /// Short name of the only service this token may call.
    pub service: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub site_admin: bool,
}

impl TokenGrant {
    /// The caller this token authenticates.
    pub fn caller(&self) -> CallerContext {
        CallerContext {
            user: self.user.clone(),
            capabilities: self.capabilities.iter().cloned().map(Capability).collect(),
            site_admin: self.site_admin,
        }
    }
}

/// Lookup table of web-service tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    grants: HashMap<String, TokenGrant>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Add a token. An existing grant for the same token is replaced.
    pub fn insert(&mut self, grant: TokenGrant) {
        self.grants.insert(grant.token.clone(), grant);
    }

    pub fn get(&self, token: &str) -> Option<&TokenGrant> {
        self.grants.get(token)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl FromIterator<TokenGrant> for TokenTable {
    fn from_iter<I: IntoIterator<Item = TokenGrant>>(iter: I) -> Self {
        let mut table = Self::new();
        for grant in iter {
            table.insert(grant);
        }
        table
    }
}
