use std::time::Duration;

use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    signature::{Keypair, Signer},
    transaction::TransactionError,
};
use storefront::{
    errors::{MetadataError, SelectionError},
    minting::{AssetMinter, TokenMetadataMinter},
    BootstrapConfig, BootstrapStage, SalePick, StorefrontError, SubmissionStrategy,
};
use storefront_client::rpc::{assert_rpc_error, RpcConnection};
use storefront_sdk::{
    address::{find_master_edition_address, find_vault_owner_address},
    instruction::fixed_price_sale::{
        create_store_instruction, init_selling_resource_instruction, CreateStoreAccounts,
        CreateStoreArgs, InitSellingResourceAccounts, InitSellingResourceArgs,
    },
    state::{AnchorAccount, SellingResource, SellingResourceState, Store},
    PROGRAM_ID_FIXED_PRICE_SALE,
};
use storefront_program_test::LedgerSimulator;

use test_utils::*;

/// Error code of an Anchor account constraint on an account that does not
/// exist yet.
const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

#[tokio::test]
async fn test_bootstrap_sequential() {
    init();
    let metadata = sample_metadata();
    let mut bootstrap = bootstrap(test_config());

    let report = bootstrap.run(&metadata).await.unwrap();
    assert_eq!(bootstrap.stage(), BootstrapStage::Listed);

    assert_eq!(report.assets.len(), 3);
    for (asset, descriptor) in report.assets.iter().zip(metadata.iter()) {
        assert_eq!(asset.name, descriptor.name);
    }
    assert_eq!(report.selling_asset, report.assets[0]);
    assert_ne!(report.store_signature, report.listing_signature);

    let rpc = bootstrap.rpc();
    let store = rpc.account(&report.store).unwrap();
    assert_eq!(store.owner, PROGRAM_ID_FIXED_PRICE_SALE);
    let store = Store::unpack(&store.data).unwrap();
    assert_eq!(store.name, "Bau Jee di bhatti");
    assert_eq!(store.admin, report.payer);

    let vault_owner =
        find_vault_owner_address(&report.selling_asset.mint, &report.store).unwrap();
    assert_eq!(report.vault.owner(), vault_owner);
    let vault = rpc.token_account(&report.vault.address()).unwrap();
    assert_eq!(vault.owner, vault_owner.address);
    assert_eq!(vault.mint, report.selling_asset.mint);
    assert_eq!(vault.amount, 1);
    let seller_token = rpc.token_account(&report.selling_asset.token).unwrap();
    assert_eq!(seller_token.amount, 0);

    let selling_resource = rpc.account(&report.selling_resource).unwrap();
    let selling_resource = SellingResource::unpack(&selling_resource.data).unwrap();
    assert_eq!(selling_resource.store, report.store);
    assert_eq!(selling_resource.resource, report.selling_asset.mint);
    assert_eq!(selling_resource.vault, report.vault.address());
    assert_eq!(selling_resource.vault_owner, vault_owner.address);
    assert_eq!(selling_resource.max_supply, Some(1));
    assert_eq!(selling_resource.state, SellingResourceState::Created);

    // three mints, store, vault and listing; the airdrop pays no fee
    assert_eq!(rpc.transaction_count(), 6);
    let balance = rpc.get_balance(&report.payer).await.unwrap();
    assert!(balance < 2 * LAMPORTS_PER_SOL);
}

#[tokio::test]
async fn test_bootstrap_atomic() {
    init();
    let metadata = sample_metadata();
    let mut bootstrap = bootstrap(BootstrapConfig {
        strategy: SubmissionStrategy::Atomic,
        ..test_config()
    });

    bootstrap.fund().await.unwrap();
    bootstrap.mint(&metadata).await.unwrap();
    let vault = bootstrap.provision_vault().await.unwrap().clone();
    // The vault owner derives from a store that does not exist yet.
    assert!(bootstrap.rpc().account(&bootstrap.store()).is_none());
    assert_eq!(
        bootstrap.rpc().token_account(&vault.address()).unwrap().owner,
        vault.owner().address
    );

    bootstrap.list().await.unwrap();
    let report = bootstrap.report().unwrap();
    assert_eq!(report.store_signature, report.listing_signature);
    assert!(bootstrap.rpc().account(&report.store).is_some());
    assert!(bootstrap.rpc().account(&report.selling_resource).is_some());
    assert_eq!(bootstrap.rpc().transaction_count(), 5);
}

#[tokio::test]
async fn test_bootstrap_sells_picked_asset() {
    init();
    let metadata = sample_metadata();
    let mut bootstrap = bootstrap(BootstrapConfig {
        sale_pick: SalePick::Name(metadata[2].name.clone()),
        ..test_config()
    });
    let report = bootstrap.run(&metadata).await.unwrap();
    assert_eq!(report.selling_asset, report.assets[2]);
    assert_eq!(report.vault.mint(), report.assets[2].mint);
    let vault = bootstrap.rpc().token_account(&report.vault.address()).unwrap();
    assert_eq!(vault.amount, 1);

    let mut bootstrap = bootstrap_with_pick(SalePick::Index(1));
    let report = bootstrap.run(&metadata).await.unwrap();
    assert_eq!(report.selling_asset, report.assets[1]);
}

fn bootstrap_with_pick(
    sale_pick: SalePick,
) -> storefront::StoreBootstrap<LedgerSimulator, TokenMetadataMinter> {
    bootstrap(BootstrapConfig {
        sale_pick,
        ..test_config()
    })
}

#[tokio::test]
async fn test_bootstrap_unknown_pick_aborts_before_funding() {
    init();
    let metadata = sample_metadata();
    let picks = [
        (
            SalePick::Index(7),
            SelectionError::IndexOutOfRange { index: 7, len: 3 },
        ),
        (
            SalePick::Name("Dhaba Cat".to_string()),
            SelectionError::NameNotFound {
                name: "Dhaba Cat".to_string(),
            },
        ),
    ];
    for (pick, expected) in picks {
        let mut bootstrap = bootstrap_with_pick(pick);
        match bootstrap.run(&metadata).await {
            Err(StorefrontError::Selection(error)) => assert_eq!(error, expected),
            other => panic!("expected a selection error, got {:?}", other),
        }
        assert_eq!(bootstrap.stage(), BootstrapStage::Initial);
        assert_eq!(bootstrap.rpc().transaction_count(), 0);
        let payer = bootstrap.payer();
        assert_eq!(bootstrap.rpc().get_balance(&payer).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_bootstrap_without_descriptors_aborts_before_funding() {
    init();
    let mut bootstrap = bootstrap(test_config());
    assert!(matches!(
        bootstrap.run(&[]).await,
        Err(StorefrontError::Selection(SelectionError::NoAssets))
    ));
    assert_eq!(bootstrap.stage(), BootstrapStage::Initial);
    assert_eq!(bootstrap.rpc().transaction_count(), 0);
}

#[tokio::test]
async fn test_missing_file_reference_aborts_before_funding() {
    init();
    let mut metadata = sample_metadata();
    metadata[1].properties = None;
    let mut bootstrap = bootstrap(test_config());

    let result = bootstrap.run(&metadata).await;
    assert!(matches!(
        result,
        Err(StorefrontError::Metadata(
            MetadataError::MissingFileReference { index: 1, .. }
        ))
    ));
    assert_eq!(bootstrap.stage(), BootstrapStage::Initial);
    assert_eq!(bootstrap.rpc().transaction_count(), 0);
    let payer = bootstrap.payer();
    assert_eq!(bootstrap.rpc().get_balance(&payer).await.unwrap(), 0);
}

#[tokio::test]
async fn test_oversized_store_name_aborts_before_funding() {
    init();
    let metadata = sample_metadata();
    let mut bootstrap = bootstrap(BootstrapConfig {
        store_name: "s".repeat(41),
        ..test_config()
    });
    let result = bootstrap.run(&metadata).await;
    assert!(matches!(result, Err(StorefrontError::Configuration(_))));
    assert_eq!(bootstrap.stage(), BootstrapStage::Initial);
}

#[tokio::test]
async fn test_unconfirmed_funding() {
    init();
    let mut bootstrap = bootstrap(BootstrapConfig {
        stage_timeout: Duration::from_millis(100),
        ..test_config()
    });
    bootstrap.rpc_mut().set_airdrops_land(false);

    let payer = bootstrap.payer();
    match bootstrap.fund().await {
        Err(StorefrontError::FundingNotConfirmed { wallet, .. }) => assert_eq!(wallet, payer),
        other => panic!("expected FundingNotConfirmed, got {:?}", other),
    }
    assert_eq!(bootstrap.stage(), BootstrapStage::Initial);
}

#[tokio::test]
async fn test_steps_out_of_order_submit_nothing() {
    init();
    let metadata = sample_metadata();
    let mut bootstrap = bootstrap(test_config());

    assert!(matches!(
        bootstrap.mint(&metadata).await,
        Err(StorefrontError::OutOfOrder {
            required: BootstrapStage::Funded,
            current: BootstrapStage::Initial,
            ..
        })
    ));

    bootstrap.fund().await.unwrap();
    bootstrap.mint(&metadata).await.unwrap();
    let submitted = bootstrap.rpc().transaction_count();

    // Listing before the vault exists.
    assert!(matches!(
        bootstrap.list().await,
        Err(StorefrontError::OutOfOrder {
            required: BootstrapStage::VaultProvisioned,
            current: BootstrapStage::Minted,
            ..
        })
    ));
    // Sequential layout provisions the vault only after the store exists.
    assert!(matches!(
        bootstrap.provision_vault().await,
        Err(StorefrontError::OutOfOrder {
            required: BootstrapStage::StoreCreated,
            ..
        })
    ));
    assert!(bootstrap.report().is_err());
    assert_eq!(bootstrap.rpc().transaction_count(), submitted);

    bootstrap.create_store().await.unwrap();
    assert!(matches!(
        bootstrap.create_store().await,
        Err(StorefrontError::OutOfOrder { .. })
    ));
}

#[tokio::test]
async fn test_ledger_rejects_listing_without_vault() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = funded_payer(&mut rpc, 2).await;
    let asset = TokenMetadataMinter::default()
        .create(
            &mut rpc,
            &payer,
            "https://arweave.net/dog0",
            "Dog #0",
            500,
            &deadline(),
        )
        .await
        .unwrap();

    let store = Keypair::new();
    let create_store = create_store_instruction(
        &CreateStoreAccounts {
            admin: payer.pubkey(),
            store: store.pubkey(),
        },
        &CreateStoreArgs {
            name: "Bau Jee di bhatti".to_string(),
            description: String::new(),
        },
    )
    .unwrap();
    rpc.create_and_send_transaction(&[create_store], &payer.pubkey(), &[&payer, &store])
        .await
        .unwrap();

    // Vault address that was never provisioned.
    let vault = Keypair::new();
    let vault_owner = find_vault_owner_address(&asset.mint, &store.pubkey()).unwrap();
    let master_edition = find_master_edition_address(&asset.mint).unwrap();
    let selling_resource = Keypair::new();
    let instruction = init_selling_resource_instruction(
        &InitSellingResourceAccounts {
            store: store.pubkey(),
            admin: payer.pubkey(),
            selling_resource: selling_resource.pubkey(),
            selling_resource_owner: payer.pubkey(),
            resource_mint: asset.mint,
            master_edition: master_edition.address,
            metadata: asset.metadata,
            vault: vault.pubkey(),
            owner: vault_owner.address,
            resource_token: asset.token,
        },
        &InitSellingResourceArgs {
            master_edition_bump: master_edition.bump,
            vault_owner_bump: vault_owner.bump,
            max_supply: Some(1),
        },
    )
    .unwrap();
    let result = rpc
        .create_and_send_transaction(
            &[instruction],
            &payer.pubkey(),
            &[&payer, &selling_resource],
        )
        .await;
    assert_rpc_error(result, 0, ACCOUNT_NOT_INITIALIZED).unwrap();

    assert!(rpc.account(&selling_resource.pubkey()).is_none());
    assert_eq!(rpc.token_account(&asset.token).unwrap().amount, 1);
}

#[tokio::test]
async fn test_ledger_rejects_unfunded_payer() {
    init();
    let mut rpc = LedgerSimulator::default();
    let payer = Keypair::new();
    let result = TokenMetadataMinter::default()
        .create(
            &mut rpc,
            &payer,
            "https://arweave.net/dog0",
            "Dog #0",
            500,
            &deadline(),
        )
        .await;
    assert_eq!(
        result.unwrap_err().transaction_error(),
        Some(&TransactionError::AccountNotFound)
    );
    assert_eq!(rpc.account_count(), 0);
}
