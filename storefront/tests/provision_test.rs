use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use solana_sdk::{
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::TransactionError,
};
use storefront::{
    errors::MetadataError,
    minting::{mint_assets, AssetMinter, MintedAsset, TokenMetadataMinter},
    token_account::{provision, provision_vault, TokenAccountOwner},
    Deadline, StorefrontError,
};
use storefront_client::rpc::{RpcConnection, RpcError};
use storefront_program_test::LedgerSimulator;
use storefront_sdk::address::find_vault_owner_address;

use test_utils::*;

async fn minted_asset(rpc: &mut LedgerSimulator, payer: &Keypair) -> MintedAsset {
    TokenMetadataMinter::default()
        .create(
            rpc,
            payer,
            "https://arweave.net/dog0",
            "Dog #0",
            500,
            &deadline(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_provision_owner_variants() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let asset = minted_asset(&mut rpc, &payer).await;

    let authority = Pubkey::new_unique();
    for owner in [TokenAccountOwner::Payer, TokenAccountOwner::Authority(authority)] {
        let accounts_before = rpc.account_count();
        let account = Keypair::new();
        provision(&mut rpc, &payer, &account, &asset.mint, owner, &deadline())
            .await
            .unwrap();

        assert_eq!(rpc.account_count(), accounts_before + 1);
        let token_account = rpc.token_account(&account.pubkey()).unwrap();
        assert_eq!(token_account.owner, owner.resolve(&payer.pubkey()));
        assert_eq!(token_account.mint, asset.mint);
        assert_eq!(token_account.amount, 0);
        let lamports = rpc.account(&account.pubkey()).unwrap().lamports;
        assert_eq!(
            lamports,
            rpc.get_minimum_balance_for_rent_exemption(spl_token::state::Account::LEN)
                .await
                .unwrap()
        );
    }
}

#[tokio::test]
async fn test_provision_randomized_owners() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let asset = minted_asset(&mut rpc, &payer).await;

    for _ in 0..5 {
        let owner = Pubkey::new_from_array(rand::random::<[u8; 32]>());
        let account = Keypair::new();
        provision(
            &mut rpc,
            &payer,
            &account,
            &asset.mint,
            TokenAccountOwner::Authority(owner),
            &deadline(),
        )
        .await
        .unwrap();
        assert_eq!(rpc.token_account(&account.pubkey()).unwrap().owner, owner);
    }
}

#[tokio::test]
async fn test_provision_vault_owner_is_derived() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let asset = minted_asset(&mut rpc, &payer).await;
    let store = Pubkey::new_unique();

    let vault = provision_vault(&mut rpc, &payer, &asset.mint, &store, &deadline())
        .await
        .unwrap();
    let expected = find_vault_owner_address(&asset.mint, &store).unwrap();
    assert_eq!(vault.owner(), expected);
    assert_eq!(vault.store(), store);
    assert_eq!(
        rpc.token_account(&vault.address()).unwrap().owner,
        expected.address
    );
}

#[tokio::test]
async fn test_provision_existing_account_fails() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let asset = minted_asset(&mut rpc, &payer).await;
    let account = Keypair::new();
    provision(
        &mut rpc,
        &payer,
        &account,
        &asset.mint,
        TokenAccountOwner::Payer,
        &deadline(),
    )
    .await
    .unwrap();

    let accounts_before = rpc.account_count();
    let result = provision(
        &mut rpc,
        &payer,
        &account,
        &asset.mint,
        TokenAccountOwner::Payer,
        &deadline(),
    )
    .await;
    assert!(matches!(
        result.unwrap_err().transaction_error(),
        Some(TransactionError::InstructionError(0, _))
    ));
    assert_eq!(rpc.account_count(), accounts_before);
}

#[tokio::test]
async fn test_provision_with_unfunded_payer_fails() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let asset = minted_asset(&mut rpc, &payer).await;

    let broke = Keypair::new();
    let result = provision(
        &mut rpc,
        &broke,
        &Keypair::new(),
        &asset.mint,
        TokenAccountOwner::Payer,
        &deadline(),
    )
    .await;
    assert_eq!(
        result.unwrap_err().transaction_error(),
        Some(&TransactionError::AccountNotFound)
    );
}

#[tokio::test]
async fn test_mint_assets_in_order() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let metadata = sample_metadata();

    let assets = mint_assets(
        &mut rpc,
        &TokenMetadataMinter::default(),
        &payer,
        &metadata,
        500,
        &deadline(),
    )
    .await
    .unwrap();
    assert_eq!(assets.len(), metadata.len());
    for (asset, descriptor) in assets.iter().zip(metadata.iter()) {
        assert_eq!(asset.name, descriptor.name);
        let mint = rpc.mint(&asset.mint).unwrap();
        assert_eq!(mint.supply, 1);
        assert_eq!(mint.decimals, 0);
        assert_eq!(mint.mint_authority.unwrap(), asset.master_edition);
        assert_eq!(rpc.token_account(&asset.token).unwrap().amount, 1);
        assert!(rpc.account(&asset.metadata).is_some());
    }
}

#[tokio::test]
async fn test_mint_assets_invalid_descriptor_mints_nothing() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let metadata = vec![
        descriptor("Dog #0", Some("https://arweave.net/dog0")),
        descriptor("Dog #1", Some("https://arweave.net/dog1")),
        descriptor("Dog #2", None),
    ];

    let result = mint_assets(
        &mut rpc,
        &TokenMetadataMinter::default(),
        &payer,
        &metadata,
        500,
        &deadline(),
    )
    .await;
    assert!(matches!(
        result,
        Err(StorefrontError::Metadata(
            MetadataError::MissingFileReference { index: 2, .. }
        ))
    ));
    assert_eq!(rpc.transaction_count(), 0);
}

/// Mints until `fail_at`, then reports a rejected submission.
struct FlakyMinter {
    inner: TokenMetadataMinter,
    calls: AtomicUsize,
    fail_at: usize,
}

#[async_trait]
impl AssetMinter<LedgerSimulator> for FlakyMinter {
    async fn create(
        &self,
        rpc: &mut LedgerSimulator,
        payer: &Keypair,
        uri: &str,
        name: &str,
        seller_fee_basis_points: u16,
        deadline: &Deadline,
    ) -> Result<MintedAsset, StorefrontError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err(RpcError::from(TransactionError::BlockhashNotFound).into());
        }
        self.inner
            .create(rpc, payer, uri, name, seller_fee_basis_points, deadline)
            .await
    }
}

#[tokio::test]
async fn test_mint_assets_failure_aborts_step() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let minter = FlakyMinter {
        inner: TokenMetadataMinter::default(),
        calls: AtomicUsize::new(0),
        fail_at: 1,
    };

    let result = mint_assets(&mut rpc, &minter, &payer, &sample_metadata(), 500, &deadline()).await;
    assert_eq!(
        result.unwrap_err().transaction_error(),
        Some(&TransactionError::BlockhashNotFound)
    );
    // The third descriptor is never attempted.
    assert_eq!(minter.calls.load(Ordering::SeqCst), 2);
}
