use async_trait::async_trait;
use solana_sdk::{
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction,
};
use spl_token::state::Mint;
use storefront_client::rpc::RpcConnection;
use storefront_sdk::{
    address::{find_associated_token_address, find_master_edition_address, find_metadata_address},
    instruction::{
        associated_token::create_associated_token_account,
        token_metadata::{
            create_master_edition_v3, create_metadata_account_v3, CreateMasterEditionArgs,
            CreateMasterEditionV3Accounts, CreateMetadataAccountArgsV3,
            CreateMetadataAccountV3Accounts, Creator, DataV2,
        },
    },
    NFT_DECIMALS, PROGRAM_ID_SPL_TOKEN,
};
use tracing::info;

use crate::{
    deadline::Deadline,
    errors::{MetadataError, StorefrontError},
    metadata::AssetMetadata,
};

/// What the minting collaborator needs from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub name: String,
    pub uri: String,
}

impl MintRequest {
    pub fn from_metadata(index: usize, metadata: &AssetMetadata) -> Result<Self, MetadataError> {
        let uri = metadata
            .content_uri()
            .ok_or_else(|| MetadataError::MissingFileReference {
                index,
                name: metadata.name.clone(),
            })?;
        if uri.trim().is_empty() {
            return Err(MetadataError::EmptyUri {
                index,
                name: metadata.name.clone(),
            });
        }
        Ok(Self {
            name: metadata.name.clone(),
            uri: uri.to_string(),
        })
    }
}

/// Validates every descriptor up front so a bad one is caught before
/// anything is minted.
pub fn prepare_mint_requests(metadata: &[AssetMetadata]) -> Result<Vec<MintRequest>, MetadataError> {
    metadata
        .iter()
        .enumerate()
        .map(|(index, metadata)| MintRequest::from_metadata(index, metadata))
        .collect()
}

/// A confirmed non-fungible asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedAsset {
    pub name: String,
    pub mint: Pubkey,
    pub metadata: Pubkey,
    pub master_edition: Pubkey,
    /// Token account holding the single unit, owned by the payer.
    pub token: Pubkey,
    pub signature: Signature,
}

#[async_trait]
pub trait AssetMinter<R: RpcConnection>: Send + Sync {
    async fn create(
        &self,
        rpc: &mut R,
        payer: &Keypair,
        uri: &str,
        name: &str,
        seller_fee_basis_points: u16,
        deadline: &Deadline,
    ) -> Result<MintedAsset, StorefrontError>;
}

/// Mints with the SPL Token and Token Metadata programs: a zero decimal mint,
/// the payer's associated token account holding one unit, a metadata record
/// and a master edition that takes over the mint authority.
#[derive(Debug, Clone, Default)]
pub struct TokenMetadataMinter {
    pub symbol: String,
    /// Prints the master edition allows, `None` for unlimited.
    pub master_edition_max_supply: Option<u64>,
}

impl TokenMetadataMinter {
    pub fn instructions(
        &self,
        payer: &Pubkey,
        mint: &Pubkey,
        mint_rent: u64,
        uri: &str,
        name: &str,
        seller_fee_basis_points: u16,
    ) -> Result<Vec<Instruction>, StorefrontError> {
        let token = find_associated_token_address(payer, mint)?;
        let metadata = find_metadata_address(mint)?;
        let master_edition = find_master_edition_address(mint)?;

        Ok(vec![
            system_instruction::create_account(
                payer,
                mint,
                mint_rent,
                Mint::LEN as u64,
                &PROGRAM_ID_SPL_TOKEN,
            ),
            spl_token::instruction::initialize_mint2(
                &PROGRAM_ID_SPL_TOKEN,
                mint,
                payer,
                Some(payer),
                NFT_DECIMALS,
            )?,
            create_associated_token_account(payer, payer, mint)?,
            spl_token::instruction::mint_to(
                &PROGRAM_ID_SPL_TOKEN,
                mint,
                &token.address,
                payer,
                &[],
                1,
            )?,
            create_metadata_account_v3(
                &CreateMetadataAccountV3Accounts {
                    metadata: metadata.address,
                    mint: *mint,
                    mint_authority: *payer,
                    payer: *payer,
                    update_authority: *payer,
                },
                &CreateMetadataAccountArgsV3 {
                    data: DataV2 {
                        name: name.to_string(),
                        symbol: self.symbol.clone(),
                        uri: uri.to_string(),
                        seller_fee_basis_points,
                        creators: Some(vec![Creator {
                            address: *payer,
                            verified: true,
                            share: 100,
                        }]),
                        collection: None,
                        uses: None,
                    },
                    is_mutable: true,
                    collection_details: None,
                },
            )?,
            create_master_edition_v3(
                &CreateMasterEditionV3Accounts {
                    edition: master_edition.address,
                    mint: *mint,
                    update_authority: *payer,
                    mint_authority: *payer,
                    payer: *payer,
                    metadata: metadata.address,
                },
                &CreateMasterEditionArgs {
                    max_supply: self.master_edition_max_supply,
                },
            )?,
        ])
    }
}

#[async_trait]
impl<R: RpcConnection> AssetMinter<R> for TokenMetadataMinter {
    async fn create(
        &self,
        rpc: &mut R,
        payer: &Keypair,
        uri: &str,
        name: &str,
        seller_fee_basis_points: u16,
        deadline: &Deadline,
    ) -> Result<MintedAsset, StorefrontError> {
        let mint = Keypair::new();
        let mint_rent = deadline
            .run(
                "rent exemption query",
                rpc.get_minimum_balance_for_rent_exemption(Mint::LEN),
            )
            .await?;
        let instructions = self.instructions(
            &payer.pubkey(),
            &mint.pubkey(),
            mint_rent,
            uri,
            name,
            seller_fee_basis_points,
        )?;
        let signature = deadline
            .run(
                "asset mint",
                rpc.create_and_send_transaction(&instructions, &payer.pubkey(), &[payer, &mint]),
            )
            .await?;

        Ok(MintedAsset {
            name: name.to_string(),
            mint: mint.pubkey(),
            metadata: find_metadata_address(&mint.pubkey())?.address,
            master_edition: find_master_edition_address(&mint.pubkey())?.address,
            token: find_associated_token_address(&payer.pubkey(), &mint.pubkey())?.address,
            signature,
        })
    }
}

/// Mints one asset per descriptor, in order. The first failure aborts the
/// whole step and nothing minted so far is returned.
pub async fn mint_assets<R, M>(
    rpc: &mut R,
    minter: &M,
    payer: &Keypair,
    metadata: &[AssetMetadata],
    seller_fee_basis_points: u16,
    deadline: &Deadline,
) -> Result<Vec<MintedAsset>, StorefrontError>
where
    R: RpcConnection,
    M: AssetMinter<R>,
{
    let requests = prepare_mint_requests(metadata)?;
    let mut minted = Vec::with_capacity(requests.len());
    for request in requests.iter() {
        let asset = minter
            .create(
                rpc,
                payer,
                &request.uri,
                &request.name,
                seller_fee_basis_points,
                deadline,
            )
            .await?;
        info!(
            "{} minted as {} with signature {}",
            asset.name, asset.mint, asset.signature
        );
        minted.push(asset);
    }
    Ok(minted)
}
