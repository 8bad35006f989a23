//! # Event Delivery
//!
//! Async listeners subscribed to the ledger's bus observe exactly the
//! committed mutations, in commit order, on the configured event name.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use asset_transfer::prelude::*;
    use tokio::time::timeout;

    fn admin() -> Principal {
        Principal::admin("Admin@org2.example.com")
    }

    #[tokio::test]
    async fn test_listener_receives_mutations_in_commit_order() {
        let ledger = InMemoryLedger::new();
        let service = AssetTransferService::default();
        let mut subscription = ledger.bus().subscribe(Some(EVENT_NAME));

        let listener = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Ok(Some(event)) = timeout(Duration::from_millis(200), subscription.recv()).await {
                let payload = event.asset_payload().unwrap();
                seen.push(payload);
            }
            seen
        });

        let mut tx = ledger.begin();
        service
            .create_asset(&mut tx, &admin(), AssetDraft::new("a1", "blue", 5, "Tom", 300))
            .unwrap();
        tx.commit().unwrap();

        let mut tx = ledger.begin();
        service.transfer_asset(&mut tx, &admin(), "a1", "Max").unwrap();
        tx.commit().unwrap();

        // Denied: nothing published.
        let mut tx = ledger.begin();
        let denied = Principal::new("appUser", Role::Unprivileged);
        assert!(service.delete_asset(&mut tx, &denied, "a1").is_err());
        tx.commit().unwrap();

        let mut tx = ledger.begin();
        service.delete_asset(&mut tx, &admin(), "a1").unwrap();
        tx.commit().unwrap();

        let seen = listener.await.unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].asset_id(), "a1");
        match &seen[1] {
            AssetEventPayload::Asset(asset) => assert_eq!(asset.owner, "Max"),
            other => panic!("unexpected payload: {other:?}"),
        }
        assert_eq!(seen[2], AssetEventPayload::Deleted { id: "a1".to_string() });
    }

    #[tokio::test]
    async fn test_custom_event_name_and_filtering() {
        let ledger = InMemoryLedger::new();
        let config = AssetConfig {
            event_name: "assetEvent".to_string(),
            ..AssetConfig::default()
        };
        let service = AssetTransferService::new(config).unwrap();
        let mut default_name = ledger.bus().subscribe(Some(EVENT_NAME));
        let mut custom_name = ledger.bus().subscribe(Some("assetEvent"));

        let mut tx = ledger.begin();
        service
            .create_asset(&mut tx, &admin(), AssetDraft::new("a1", "blue", 5, "Tom", 300))
            .unwrap();
        let receipt = tx.commit().unwrap();

        let event = timeout(Duration::from_millis(100), custom_name.recv())
            .await
            .expect("event within timeout")
            .expect("bus open");
        assert_eq!(event.tx_id, receipt.tx_id);
        assert!(default_name.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_and_reads_publish_nothing() {
        let ledger = InMemoryLedger::new();
        let service = AssetTransferService::default();
        let mut subscription = ledger.bus().subscribe(None);

        let mut tx = ledger.begin();
        service.seed_initial_assets(&mut tx).unwrap();
        tx.commit().unwrap();

        let tx = ledger.begin();
        service.read_asset(&tx, "asset1").unwrap().into_asset().unwrap();
        service.get_all_assets(&tx).unwrap();
        service.get_asset_history(&tx, "asset1").unwrap();
        drop(tx);

        assert!(subscription.try_recv().unwrap().is_none());
        assert_eq!(ledger.bus().events_published(), 0);
    }

    #[tokio::test]
    async fn test_every_listener_gets_a_copy() {
        let ledger = InMemoryLedger::new();
        let service = AssetTransferService::default();
        let mut listeners: Vec<_> = (0..3).map(|_| ledger.bus().subscribe(None)).collect();

        let mut tx = ledger.begin();
        service
            .create_asset(&mut tx, &admin(), AssetDraft::new("a1", "blue", 5, "Tom", 300))
            .unwrap();
        tx.commit().unwrap();

        for listener in &mut listeners {
            let event = timeout(Duration::from_millis(100), listener.recv())
                .await
                .expect("event within timeout")
                .expect("bus open");
            assert_eq!(event.asset_payload().unwrap().asset_id(), "a1");
        }
    }
}
