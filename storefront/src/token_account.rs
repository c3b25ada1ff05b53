use solana_sdk::{
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction,
};
use spl_token::state::Account as TokenAccount;
use storefront_client::rpc::RpcConnection;
use storefront_sdk::{
    address::{find_vault_owner_address, DerivedAddress},
    PROGRAM_ID_SPL_TOKEN,
};
use tracing::info;

use crate::{deadline::Deadline, errors::StorefrontError};

/// Authority of a provisioned token account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAccountOwner {
    /// The fee payer owns the account.
    Payer,
    Authority(Pubkey),
}

impl TokenAccountOwner {
    pub fn resolve(&self, payer: &Pubkey) -> Pubkey {
        match self {
            TokenAccountOwner::Payer => *payer,
            TokenAccountOwner::Authority(authority) => *authority,
        }
    }
}

/// Allocates `account` with room for token account state, funded for rent
/// exemption, and initializes it for `mint` under `owner`. Both steps go in
/// one transaction signed by `payer` and `account`.
pub async fn provision<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    account: &Keypair,
    mint: &Pubkey,
    owner: TokenAccountOwner,
    deadline: &Deadline,
) -> Result<Signature, StorefrontError> {
    let owner = owner.resolve(&payer.pubkey());
    let rent = deadline
        .run(
            "rent exemption query",
            rpc.get_minimum_balance_for_rent_exemption(TokenAccount::LEN),
        )
        .await?;
    let instructions = [
        system_instruction::create_account(
            &payer.pubkey(),
            &account.pubkey(),
            rent,
            TokenAccount::LEN as u64,
            &PROGRAM_ID_SPL_TOKEN,
        ),
        spl_token::instruction::initialize_account(
            &PROGRAM_ID_SPL_TOKEN,
            &account.pubkey(),
            mint,
            &owner,
        )?,
    ];
    let signature = deadline
        .run(
            "token account provisioning",
            rpc.create_and_send_transaction(&instructions, &payer.pubkey(), &[payer, account]),
        )
        .await?;
    info!(
        "Provisioned token account {} for mint {} owned by {}: {}",
        account.pubkey(),
        mint,
        owner,
        signature
    );
    Ok(signature)
}

/// A vault token account whose creation has been confirmed on the ledger.
/// Only [`provision_vault`] produces one, which is what lets the listing step
/// demand it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedVault {
    address: Pubkey,
    mint: Pubkey,
    store: Pubkey,
    owner: DerivedAddress,
    signature: Signature,
}

impl ProvisionedVault {
    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn mint(&self) -> Pubkey {
        self.mint
    }

    pub fn store(&self) -> Pubkey {
        self.store
    }

    /// The vault owner PDA with its bump.
    pub fn owner(&self) -> DerivedAddress {
        self.owner
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }
}

/// Provisions a fresh vault for `mint` owned by the vault owner PDA of
/// (`mint`, `store`). The store does not need to exist yet.
pub async fn provision_vault<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    mint: &Pubkey,
    store: &Pubkey,
    deadline: &Deadline,
) -> Result<ProvisionedVault, StorefrontError> {
    let owner = find_vault_owner_address(mint, store)?;
    let vault = Keypair::new();
    let signature = provision(
        rpc,
        payer,
        &vault,
        mint,
        TokenAccountOwner::Authority(owner.address),
        deadline,
    )
    .await?;
    Ok(ProvisionedVault {
        address: vault.pubkey(),
        mint: *mint,
        store: *store,
        owner,
        signature,
    })
}
