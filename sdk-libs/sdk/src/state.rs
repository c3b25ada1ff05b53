//! Account layouts of the records created by the storefront bootstrap:
//! fixed-price-sale accounts (Anchor encoded) and the token-metadata records
//! they point at.
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::{
    discriminator::account_discriminator,
    error::{Result, StorefrontSdkError},
    instruction::token_metadata::{Collection, CollectionDetails, Creator, Uses},
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN,
};

/// Anchor account: 8 byte discriminator followed by the borsh body.
pub trait AnchorAccount: BorshSerialize + BorshDeserialize + Sized {
    const NAME: &'static str;
    const LEN: usize;

    fn discriminator() -> [u8; 8] {
        account_discriminator(Self::NAME)
    }

    /// Serializes into a zero padded buffer of `Self::LEN` bytes.
    fn pack(&self) -> Result<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)
            .map_err(|_| StorefrontSdkError::SerializationError)?;
        if data.len() > Self::LEN {
            return Err(StorefrontSdkError::SerializationError);
        }
        data.resize(Self::LEN, 0);
        Ok(data)
    }

    fn unpack(data: &[u8]) -> Result<Self> {
        let expected = Self::discriminator();
        if data.len() < 8 || data[..8] != expected {
            return Err(StorefrontSdkError::InvalidDiscriminator { expected });
        }
        Self::deserialize(&mut &data[8..]).map_err(|_| StorefrontSdkError::DeserializationError)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub admin: Pubkey,
    pub name: String,
    pub description: String,
}

impl AnchorAccount for Store {
    const NAME: &'static str = "Store";
    const LEN: usize = 8 + 32 + 4 + NAME_MAX_LEN + 4 + DESCRIPTION_MAX_LEN;
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellingResourceState {
    Uninitialized,
    Created,
    InUse,
    Exhausted,
    Stopped,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SellingResource {
    pub store: Pubkey,
    pub owner: Pubkey,
    pub resource: Pubkey,
    pub vault: Pubkey,
    pub vault_owner: Pubkey,
    pub supply: u64,
    pub max_supply: Option<u64>,
    pub state: SellingResourceState,
}

impl AnchorAccount for SellingResource {
    const NAME: &'static str = "SellingResource";
    const LEN: usize = 8 + 32 * 5 + 8 + 9 + 1;
}

/// Leading byte of token-metadata records.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    Uninitialized,
    EditionV1,
    MasterEditionV1,
    ReservationListV1,
    MetadataV1,
    ReservationListV2,
    MasterEditionV2,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub key: MetadataKey,
    pub update_authority: Pubkey,
    pub mint: Pubkey,
    pub data: MetadataData,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<u8>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub collection_details: Option<CollectionDetails>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterEdition {
    pub key: MetadataKey,
    pub supply: u64,
    /// `None` allows unlimited prints.
    pub max_supply: Option<u64>,
}

/// Token-metadata records are allocated at a fixed size and read with
/// trailing zero padding, without a discriminator.
pub trait MetadataRecord: BorshSerialize + BorshDeserialize + Sized {
    const KEY: MetadataKey;
    const LEN: usize;

    fn key(&self) -> MetadataKey;

    fn pack(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(Self::LEN);
        self.serialize(&mut data)
            .map_err(|_| StorefrontSdkError::SerializationError)?;
        if data.len() > Self::LEN {
            return Err(StorefrontSdkError::SerializationError);
        }
        data.resize(Self::LEN, 0);
        Ok(data)
    }

    fn unpack(data: &[u8]) -> Result<Self> {
        let record =
            Self::deserialize(&mut &data[..]).map_err(|_| StorefrontSdkError::DeserializationError)?;
        if record.key() != Self::KEY {
            return Err(StorefrontSdkError::DeserializationError);
        }
        Ok(record)
    }
}

impl MetadataRecord for Metadata {
    const KEY: MetadataKey = MetadataKey::MetadataV1;
    const LEN: usize = 679;

    fn key(&self) -> MetadataKey {
        self.key
    }
}

impl MetadataRecord for MasterEdition {
    const KEY: MetadataKey = MetadataKey::MasterEditionV2;
    const LEN: usize = 282;

    fn key(&self) -> MetadataKey {
        self.key
    }
}
