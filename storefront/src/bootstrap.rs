use std::fmt;

use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use storefront_client::rpc::RpcConnection;
use storefront_sdk::{
    address::find_master_edition_address,
    instruction::fixed_price_sale::{
        create_store_instruction, init_selling_resource_instruction, CreateStoreAccounts,
        CreateStoreArgs, InitSellingResourceAccounts, InitSellingResourceArgs,
    },
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::{BootstrapConfig, SalePick, SubmissionStrategy},
    deadline::Deadline,
    errors::{SelectionError, StorefrontError},
    metadata::AssetMetadata,
    minting::{mint_assets, prepare_mint_requests, AssetMinter, MintedAsset},
    token_account::{provision_vault, ProvisionedVault},
};

/// Progress of a bootstrap run. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Initial,
    Funded,
    Minted,
    StoreCreated,
    VaultProvisioned,
    Listed,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            BootstrapStage::Initial => "initial",
            BootstrapStage::Funded => "funded",
            BootstrapStage::Minted => "minted",
            BootstrapStage::StoreCreated => "store created",
            BootstrapStage::VaultProvisioned => "vault provisioned",
            BootstrapStage::Listed => "listed",
        };
        write!(f, "{}", stage)
    }
}

impl SalePick {
    /// Checks that the pick resolves against the descriptors about to be
    /// minted, in the order they will be minted.
    pub fn validate(&self, metadata: &[AssetMetadata]) -> Result<(), SelectionError> {
        if metadata.is_empty() {
            return Err(SelectionError::NoAssets);
        }
        match self {
            SalePick::First => Ok(()),
            SalePick::Index(index) if *index < metadata.len() => Ok(()),
            SalePick::Index(index) => Err(SelectionError::IndexOutOfRange {
                index: *index,
                len: metadata.len(),
            }),
            SalePick::Name(name) if metadata.iter().any(|descriptor| &descriptor.name == name) => {
                Ok(())
            }
            SalePick::Name(name) => Err(SelectionError::NameNotFound { name: name.clone() }),
        }
    }

    pub fn select<'a>(&self, assets: &'a [MintedAsset]) -> Result<&'a MintedAsset, SelectionError> {
        if assets.is_empty() {
            return Err(SelectionError::NoAssets);
        }
        match self {
            SalePick::First => Ok(&assets[0]),
            SalePick::Index(index) => assets.get(*index).ok_or(SelectionError::IndexOutOfRange {
                index: *index,
                len: assets.len(),
            }),
            SalePick::Name(name) => assets
                .iter()
                .find(|asset| &asset.name == name)
                .ok_or_else(|| SelectionError::NameNotFound { name: name.clone() }),
        }
    }
}

/// Everything a finished run put on the ledger.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub payer: Pubkey,
    pub funding_signature: Signature,
    pub assets: Vec<MintedAsset>,
    pub selling_asset: MintedAsset,
    pub store: Pubkey,
    pub store_signature: Signature,
    pub vault: ProvisionedVault,
    pub selling_resource: Pubkey,
    pub listing_signature: Signature,
}

/// Drives one run from a fresh identity to a listed asset. Every step
/// checks the stage it needs before it submits anything.
pub struct StoreBootstrap<R: RpcConnection, M: AssetMinter<R>> {
    rpc: R,
    minter: M,
    config: BootstrapConfig,
    deadline: Deadline,
    payer: Keypair,
    stage: BootstrapStage,
    funding_signature: Option<Signature>,
    assets: Vec<MintedAsset>,
    selling_asset: Option<MintedAsset>,
    store: Keypair,
    store_signature: Option<Signature>,
    vault: Option<ProvisionedVault>,
    selling_resource: Option<Pubkey>,
    listing_signature: Option<Signature>,
}

impl<R: RpcConnection, M: AssetMinter<R>> fmt::Debug for StoreBootstrap<R, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBootstrap")
            .field("rpc", &self.rpc)
            .field("payer", &self.payer.pubkey())
            .field("stage", &self.stage)
            .field("store", &self.store.pubkey())
            .finish()
    }
}

impl<R: RpcConnection, M: AssetMinter<R>> StoreBootstrap<R, M> {
    /// Generates the run identity. It lives only as long as this value.
    pub fn new(
        rpc: R,
        minter: M,
        config: BootstrapConfig,
        cancellation_token: CancellationToken,
    ) -> Self {
        let deadline = Deadline::new(config.stage_timeout, cancellation_token);
        let payer = Keypair::new();
        info!("Generated payer identity {}", payer.pubkey());
        Self {
            rpc,
            minter,
            config,
            deadline,
            payer,
            stage: BootstrapStage::Initial,
            funding_signature: None,
            assets: Vec::new(),
            selling_asset: None,
            store: Keypair::new(),
            store_signature: None,
            vault: None,
            selling_resource: None,
            listing_signature: None,
        }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn rpc_mut(&mut self) -> &mut R {
        &mut self.rpc
    }

    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    pub fn stage(&self) -> BootstrapStage {
        self.stage
    }

    pub fn store(&self) -> Pubkey {
        self.store.pubkey()
    }

    pub fn assets(&self) -> &[MintedAsset] {
        &self.assets
    }

    pub fn selling_asset(&self) -> Option<&MintedAsset> {
        self.selling_asset.as_ref()
    }

    pub fn vault(&self) -> Option<&ProvisionedVault> {
        self.vault.as_ref()
    }

    fn require(&self, step: &'static str, required: BootstrapStage) -> Result<(), StorefrontError> {
        if self.stage != required {
            return Err(StorefrontError::OutOfOrder {
                step,
                required,
                current: self.stage,
            });
        }
        Ok(())
    }

    fn advance(&mut self, stage: BootstrapStage) {
        debug!("Bootstrap stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Requests the airdrop and waits until it reaches the funding
    /// commitment.
    pub async fn fund(&mut self) -> Result<Signature, StorefrontError> {
        self.require("fund the payer", BootstrapStage::Initial)?;
        let payer = self.payer.pubkey();
        info!(
            "Requesting {} lamports for {}",
            self.config.airdrop_lamports, payer
        );
        let signature = self
            .deadline
            .run(
                "airdrop request",
                self.rpc.request_airdrop(&payer, self.config.airdrop_lamports),
            )
            .await?;
        self.deadline
            .wait_for_confirmation(
                "airdrop confirmation",
                &self.rpc,
                &signature,
                self.config.funding_commitment,
                self.config.confirmation_poll_interval,
            )
            .await
            .map_err(|error| match error {
                StorefrontError::DeadlineExceeded { .. } => StorefrontError::FundingNotConfirmed {
                    wallet: payer,
                    signature,
                },
                error => error,
            })?;
        info!("Funded {}: {}", payer, signature);
        self.funding_signature = Some(signature);
        self.advance(BootstrapStage::Funded);
        Ok(signature)
    }

    /// Mints every descriptor and picks the one to sell.
    pub async fn mint(&mut self, metadata: &[AssetMetadata]) -> Result<&MintedAsset, StorefrontError> {
        self.require("mint assets", BootstrapStage::Funded)?;
        info!("Minting {} assets", metadata.len());
        let assets = mint_assets(
            &mut self.rpc,
            &self.minter,
            &self.payer,
            metadata,
            self.config.seller_fee_basis_points,
            &self.deadline,
        )
        .await?;
        let selling_asset = self.config.sale_pick.select(&assets)?.clone();
        info!(
            "Selected {} ({}) for sale with {}",
            selling_asset.name, selling_asset.mint, self.config.sale_pick
        );
        self.assets = assets;
        self.advance(BootstrapStage::Minted);
        Ok(&*self.selling_asset.insert(selling_asset))
    }

    fn create_store_instruction(&self) -> Result<Instruction, StorefrontError> {
        Ok(create_store_instruction(
            &CreateStoreAccounts {
                admin: self.payer.pubkey(),
                store: self.store.pubkey(),
            },
            &CreateStoreArgs {
                name: self.config.store_name.clone(),
                description: self.config.store_description.clone(),
            },
        )?)
    }

    /// Creates the store on its own. Only part of the sequential layout.
    pub async fn create_store(&mut self) -> Result<Signature, StorefrontError> {
        self.require("create the store", BootstrapStage::Minted)?;
        let instruction = self.create_store_instruction()?;
        let signature = self
            .deadline
            .run(
                "store creation",
                self.rpc.create_and_send_transaction(
                    &[instruction],
                    &self.payer.pubkey(),
                    &[&self.payer, &self.store],
                ),
            )
            .await?;
        info!(
            "Created store {} ({}): {}",
            self.store.pubkey(),
            self.config.store_name,
            signature
        );
        self.store_signature = Some(signature);
        self.advance(BootstrapStage::StoreCreated);
        Ok(signature)
    }

    /// Provisions the vault of the selling asset under the vault owner of
    /// (asset mint, store).
    pub async fn provision_vault(&mut self) -> Result<&ProvisionedVault, StorefrontError> {
        let required = match self.config.strategy {
            SubmissionStrategy::Sequential => BootstrapStage::StoreCreated,
            SubmissionStrategy::Atomic => BootstrapStage::Minted,
        };
        self.require("provision the vault", required)?;
        let mint = self
            .selling_asset
            .as_ref()
            .map(|asset| asset.mint)
            .ok_or(SelectionError::NoAssets)?;
        let vault = provision_vault(
            &mut self.rpc,
            &self.payer,
            &mint,
            &self.store.pubkey(),
            &self.deadline,
        )
        .await?;
        info!(
            "Vault {} owned by {} (bump {})",
            vault.address(),
            vault.owner().address,
            vault.owner().bump
        );
        self.advance(BootstrapStage::VaultProvisioned);
        Ok(&*self.vault.insert(vault))
    }

    /// Initializes the selling resource against the provisioned vault. With
    /// the atomic layout the store is created in the same transaction.
    pub async fn list(&mut self) -> Result<Signature, StorefrontError> {
        self.require("list the asset", BootstrapStage::VaultProvisioned)?;
        let (asset, vault) = match (&self.selling_asset, &self.vault) {
            (Some(asset), Some(vault)) => (asset, vault),
            _ => {
                return Err(StorefrontError::OutOfOrder {
                    step: "list the asset",
                    required: BootstrapStage::VaultProvisioned,
                    current: self.stage,
                })
            }
        };
        let master_edition = find_master_edition_address(&asset.mint)?;
        let selling_resource = Keypair::new();

        let mut instructions = Vec::with_capacity(2);
        if self.store_signature.is_none() {
            instructions.push(self.create_store_instruction()?);
        }
        instructions.push(init_selling_resource_instruction(
            &InitSellingResourceAccounts {
                store: self.store.pubkey(),
                admin: self.payer.pubkey(),
                selling_resource: selling_resource.pubkey(),
                selling_resource_owner: self.payer.pubkey(),
                resource_mint: asset.mint,
                master_edition: master_edition.address,
                metadata: asset.metadata,
                vault: vault.address(),
                owner: vault.owner().address,
                resource_token: asset.token,
            },
            &InitSellingResourceArgs {
                master_edition_bump: master_edition.bump,
                vault_owner_bump: vault.owner().bump,
                max_supply: self.config.max_supply,
            },
        )?);

        let mut signers = vec![&self.payer, &selling_resource];
        let creates_store = self.store_signature.is_none();
        if creates_store {
            signers.push(&self.store);
        }
        let signature = self
            .deadline
            .run(
                "selling resource initialization",
                self.rpc.create_and_send_transaction(
                    &instructions,
                    &self.payer.pubkey(),
                    &signers,
                ),
            )
            .await?;
        if creates_store {
            info!(
                "Created store {} ({}): {}",
                self.store.pubkey(),
                self.config.store_name,
                signature
            );
            self.store_signature = Some(signature);
        }
        info!(
            "Listed {} as selling resource {}: {}",
            asset.mint,
            selling_resource.pubkey(),
            signature
        );
        self.selling_resource = Some(selling_resource.pubkey());
        self.listing_signature = Some(signature);
        self.advance(BootstrapStage::Listed);
        Ok(signature)
    }

    /// Runs every stage in order. Configuration, descriptors and the sale
    /// pick are checked before the payer is funded.
    pub async fn run(&mut self, metadata: &[AssetMetadata]) -> Result<BootstrapReport, StorefrontError> {
        self.config.validate()?;
        prepare_mint_requests(metadata)?;
        self.config.sale_pick.validate(metadata)?;

        self.fund().await?;
        self.mint(metadata).await?;
        if self.config.strategy == SubmissionStrategy::Sequential {
            self.create_store().await?;
        }
        self.provision_vault().await?;
        self.list().await?;
        self.report()
    }

    /// The run summary, available once the asset is listed.
    pub fn report(&self) -> Result<BootstrapReport, StorefrontError> {
        self.require("report", BootstrapStage::Listed)?;
        match (
            self.funding_signature,
            &self.selling_asset,
            self.store_signature,
            &self.vault,
            self.selling_resource,
            self.listing_signature,
        ) {
            (
                Some(funding_signature),
                Some(selling_asset),
                Some(store_signature),
                Some(vault),
                Some(selling_resource),
                Some(listing_signature),
            ) => Ok(BootstrapReport {
                payer: self.payer.pubkey(),
                funding_signature,
                assets: self.assets.clone(),
                selling_asset: selling_asset.clone(),
                store: self.store.pubkey(),
                store_signature,
                vault: vault.clone(),
                selling_resource,
                listing_signature,
            }),
            _ => Err(anyhow::anyhow!("bootstrap reached {} with missing records", self.stage).into()),
        }
    }
}
