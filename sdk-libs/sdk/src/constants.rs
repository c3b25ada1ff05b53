use solana_program::pubkey::Pubkey;

/// ID of the fixed-price-sale program.
pub const PROGRAM_ID_FIXED_PRICE_SALE: Pubkey =
    solana_program::pubkey!("SaLeTjyUa5wXHnGuewUSyJ5JWZaHwz3TxqUntCE9czo");
/// ID of the token-metadata program.
pub const PROGRAM_ID_TOKEN_METADATA: Pubkey =
    solana_program::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");
/// ID of the associated-token-account program.
pub const PROGRAM_ID_ASSOCIATED_TOKEN: Pubkey =
    solana_program::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
/// ID of the spl token program. Declared here so the sdk does not depend on
/// spl-token for a single constant.
pub const PROGRAM_ID_SPL_TOKEN: Pubkey =
    solana_program::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Seed of the vault owner PDA, followed by the resource mint and the store.
pub const VAULT_OWNER_SEED: &[u8] = b"mt_vault";
pub const METADATA_SEED: &[u8] = b"metadata";
pub const EDITION_SEED: &[u8] = b"edition";

/// Max byte length of a store name.
pub const NAME_MAX_LEN: usize = 40;
/// Max byte length of a store description.
pub const DESCRIPTION_MAX_LEN: usize = 60;

pub const DEFAULT_SELLER_FEE_BASIS_POINTS: u16 = 500;
pub const NFT_DECIMALS: u8 = 0;
