//! The non-fungible credential ledger.
//!
//! A [`CredentialRegistry`] issues sequentially numbered tokens. Minting is
//! an administrative action: only the current owner may mint, and
//! ownership is handed to the game once at deployment so that the game is
//! the only issuer from then on.

use std::collections::BTreeMap;

use tracing::{debug, info};

use investor_types::{Address, TokenId};

use crate::{LedgerError, Revertible};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A non-fungible issuance store with an administrative owner.
pub trait CredentialLedger {
    /// The current administrative owner.
    fn owner(&self) -> Address;

    /// Hand administrative control to `new_owner`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotOwner`] unless `caller` is the owner.
    fn transfer_ownership(&mut self, caller: Address, new_owner: Address)
    -> Result<(), LedgerError>;

    /// Mint a new token to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotOwner`] unless `caller` is the owner, or
    /// [`LedgerError::Overflow`] if token ids are exhausted.
    fn mint(&mut self, caller: Address, to: Address) -> Result<TokenId, LedgerError>;

    /// Number of tokens held by `holder`.
    fn balance_of(&self, holder: Address) -> u64;

    /// Holder of `token`, if it exists.
    fn owner_of(&self, token: TokenId) -> Option<Address>;

    /// Metadata URI of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownToken`] if the token does not exist.
    fn token_uri(&self, token: TokenId) -> Result<String, LedgerError>;

    /// Number of tokens minted so far.
    fn total_minted(&self) -> u64;
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Descriptive credential collection metadata.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CredentialMetadata {
    /// Collection name.
    pub name: String,
    /// Collection symbol.
    pub symbol: String,
    /// Prefix joined with the token id to form a token URI.
    pub base_uri: String,
}

impl CredentialMetadata {
    /// Build metadata from borrowed strings.
    pub fn new(name: &str, symbol: &str, base_uri: &str) -> Self {
        Self {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            base_uri: base_uri.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The next token id at the moment a checkpoint was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintCheckpoint(pub u64);

/// In-memory credential registry.
#[derive(Debug, Clone)]
pub struct CredentialRegistry {
    metadata: CredentialMetadata,
    owner: Address,
    holders: BTreeMap<TokenId, Address>,
    balances: BTreeMap<Address, u64>,
    next_token: u64,
}

impl CredentialRegistry {
    /// Create an empty registry administered by `owner`.
    pub const fn new(metadata: CredentialMetadata, owner: Address) -> Self {
        Self {
            metadata,
            owner,
            holders: BTreeMap::new(),
            balances: BTreeMap::new(),
            next_token: 0,
        }
    }

    /// Collection metadata.
    pub const fn metadata(&self) -> &CredentialMetadata {
        &self.metadata
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(LedgerError::NotOwner {
                caller,
                owner: self.owner,
            })
        }
    }

    fn burn(&mut self, token: TokenId) -> Result<(), LedgerError> {
        let holder = self
            .holders
            .remove(&token)
            .ok_or(LedgerError::UnknownToken(token))?;
        let count = self
            .balances
            .get(&holder)
            .copied()
            .and_then(|c| c.checked_sub(1))
            .ok_or(LedgerError::InternalError("burned token missing from balances"))?;
        if count == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, count);
        }
        Ok(())
    }
}

impl CredentialLedger for CredentialRegistry {
    fn owner(&self) -> Address {
        self.owner
    }

    fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        info!(
            collection = self.metadata.symbol,
            previous = %self.owner,
            new_owner = %new_owner,
            "credential ownership transferred"
        );
        self.owner = new_owner;
        Ok(())
    }

    fn mint(&mut self, caller: Address, to: Address) -> Result<TokenId, LedgerError> {
        self.ensure_owner(caller)?;

        let token = TokenId(self.next_token);
        let next = self.next_token.checked_add(1).ok_or(LedgerError::Overflow {
            context: "credential token id",
        })?;
        let held = self.balance_of(to).checked_add(1).ok_or(LedgerError::Overflow {
            context: "credential balance",
        })?;

        self.next_token = next;
        self.holders.insert(token, to);
        self.balances.insert(to, held);

        debug!(token = %token, holder = %to, "credential minted");
        Ok(token)
    }

    fn balance_of(&self, holder: Address) -> u64 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    fn owner_of(&self, token: TokenId) -> Option<Address> {
        self.holders.get(&token).copied()
    }

    fn token_uri(&self, token: TokenId) -> Result<String, LedgerError> {
        if self.holders.contains_key(&token) {
            Ok(format!("{}{token}", self.metadata.base_uri))
        } else {
            Err(LedgerError::UnknownToken(token))
        }
    }

    fn total_minted(&self) -> u64 {
        self.next_token
    }
}

impl Revertible for CredentialRegistry {
    type Checkpoint = MintCheckpoint;

    fn checkpoint(&self) -> MintCheckpoint {
        MintCheckpoint(self.next_token)
    }

    fn revert_to(&mut self, checkpoint: MintCheckpoint) -> Result<(), LedgerError> {
        if checkpoint.0 > self.next_token {
            return Err(LedgerError::UnknownCheckpoint {
                checkpoint: checkpoint.0,
                current: self.next_token,
            });
        }

        for id in checkpoint.0..self.next_token {
            self.burn(TokenId(id))?;
        }
        self.next_token = checkpoint.0;

        debug!(next_token = checkpoint.0, "credential mints reverted");
        Ok(())
    }
}
