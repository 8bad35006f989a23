//! # Lifecycle Flows
//!
//! Multi-caller sessions through the dispatcher, configuration variants,
//! and concurrent readers against a shared ledger.

#[cfg(test)]
mod tests {
    use asset_transfer::prelude::*;
    use serde_json::Value;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Session {
        ledger: InMemoryLedger,
        dispatcher: ContractDispatcher,
    }

    impl Session {
        fn new(config: AssetConfig) -> Self {
            Self {
                ledger: InMemoryLedger::new(),
                dispatcher: ContractDispatcher::new(AssetTransferService::new(config).unwrap()),
            }
        }

        fn call_at(
            &self,
            seconds: i64,
            caller: &X509Credential,
            function: &str,
            args: &[&str],
        ) -> Result<String, AssetError> {
            let args: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
            let mut tx = self.ledger.begin_at(LedgerTimestamp::from_seconds(seconds));
            let output = self.dispatcher.invoke(&mut tx, caller, function, &args)?;
            tx.commit()?;
            Ok(output)
        }

        fn call(&self, caller: &X509Credential, function: &str, args: &[&str]) -> Result<String, AssetError> {
            self.call_at(1_700_000_000, caller, function, args)
        }

        fn json(&self, caller: &X509Credential, function: &str, args: &[&str]) -> Value {
            serde_json::from_str(&self.call(caller, function, args).unwrap()).unwrap()
        }
    }

    fn org1_admin() -> X509Credential {
        X509Credential::from_common_name("Admin@org1.example.com")
    }

    fn client(role: &str) -> X509Credential {
        X509Credential::from_common_name("appUser").with_attribute("usertype", role)
    }

    // =============================================================================
    // SESSIONS
    // =============================================================================

    #[test]
    fn test_admin_and_client_session() {
        let session = Session::new(AssetConfig::default());
        let admin = org1_admin();
        let reader = client("client");

        session.call(&reader, "InitLedger", &[]).unwrap();
        let all = session.json(&reader, "GetAllAssets", &[]);
        assert_eq!(all.as_array().unwrap().len(), 6);
        assert_eq!(all[2]["Key"], "asset3");
        assert_eq!(all[2]["Record"]["Owner"], "Jin Soo");
        assert_eq!(all[2]["Record"]["docType"], "asset");

        assert!(session
            .call(&reader, "CreateAsset", &["asset7", "orange", "20", "Ana", "900"])
            .unwrap_err()
            .is_unauthorized());

        let created = session.json(&admin, "CreateAsset", &["asset7", "orange", "20", "Ana", "900"]);
        assert_eq!(created["AppraisedValue"], 900);
        assert!(created.get("docType").is_none());

        assert_eq!(session.call(&admin, "UpdateAsset", &["asset7", "purple", "21", "Ana", "950"]).unwrap(), "true");
        assert_eq!(session.call(&admin, "DeleteAsset", &["asset1"]).unwrap(), "true");
        assert_eq!(session.call(&reader, "AssetExists", &["asset1"]).unwrap(), "false");

        let keys: Vec<_> = session
            .json(&reader, "GetAllAssets", &[])
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Key"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, ["asset2", "asset3", "asset4", "asset5", "asset6", "asset7"]);
    }

    #[test]
    fn test_admin_attribute_grants_access() {
        let session = Session::new(AssetConfig::default());
        let attribute_admin = client("admin");

        assert!(session
            .call(&attribute_admin, "CreateAsset", &["a1", "blue", "1", "Tom", "1"])
            .is_ok());
    }

    #[test]
    fn test_malformed_identity_fails_closed() {
        let session = Session::new(AssetConfig::default());
        let broken = X509Credential::new("x509::/C=US/O=Hyperledger/OU=admin");

        let err = session
            .call(&broken, "CreateAsset", &["a1", "blue", "1", "Tom", "1"])
            .unwrap_err();
        assert!(matches!(err, AssetError::MalformedIdentity { .. }));
        assert_eq!(session.ledger.committed_transactions().unwrap(), 0);
    }

    #[test]
    fn test_history_through_dispatcher() {
        let session = Session::new(AssetConfig::default());
        let admin = org1_admin();

        session.call_at(1_700_000_000, &admin, "CreateAsset", &["a1", "blue", "5", "Tom", "300"]).unwrap();
        session.call_at(1_700_003_600, &admin, "TransferAsset", &["a1", "Max"]).unwrap();
        session.call_at(1_700_007_200, &admin, "DeleteAsset", &["a1"]).unwrap();

        let history = session.json(&admin, "GetAssetHistory", &["a1"]);
        let entries = history.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["Timestamp"], "11/15/2023, 5:13:20 AM");
        assert_eq!(entries[1]["Timestamp"], "11/15/2023, 6:13:20 AM");
        assert_eq!(entries[1]["Value"]["Owner"], "Max");
        assert_eq!(entries[2]["IsDelete"], true);
        assert_eq!(entries[2]["Value"], "");
        assert_eq!(session.ledger.open_cursors(), 0);
    }

    // =============================================================================
    // CONFIGURATION VARIANTS
    // =============================================================================

    #[test]
    fn test_utc_offset_and_admin_list() {
        let config = AssetConfig {
            admin_principals: vec!["Registrar".to_string()],
            utc_offset_seconds: 0,
            ..AssetConfig::default()
        };
        let session = Session::new(config);

        assert!(session
            .call(&org1_admin(), "CreateAsset", &["a1", "blue", "5", "Tom", "300"])
            .unwrap_err()
            .is_unauthorized());

        let registrar = X509Credential::from_common_name("Registrar");
        session.call(&registrar, "CreateAsset", &["a1", "blue", "5", "Tom", "300"]).unwrap();

        let history = session.json(&registrar, "GetAssetHistory", &["a1"]);
        assert_eq!(history[0]["Timestamp"], "11/14/2023, 10:13:20 PM");
    }

    #[test]
    fn test_custom_role_attribute() {
        let config = AssetConfig {
            usertype_attribute: "role".to_string(),
            ..AssetConfig::default()
        };
        let session = Session::new(config);

        assert!(session
            .call(&client("admin"), "CreateAsset", &["a1", "blue", "1", "Tom", "1"])
            .unwrap_err()
            .is_unauthorized());

        let by_role = X509Credential::from_common_name("appUser").with_attribute("role", "admin");
        session.call(&by_role, "CreateAsset", &["a1", "blue", "1", "Tom", "1"]).unwrap();
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_see_committed_state() {
        let ledger = InMemoryLedger::new();
        let service = AssetTransferService::default();
        {
            let mut tx = ledger.begin();
            service.seed_initial_assets(&mut tx).unwrap();
            tx.commit().unwrap();
        }

        let mut readers = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let service = service.clone();
            readers.push(tokio::task::spawn_blocking(move || {
                let tx = ledger.begin();
                let owner = service.read_asset(&tx, "asset5").unwrap().into_asset().unwrap().owner;
                assert!(owner == "Adriana" || owner == "Michel");
                service.get_all_assets(&tx).unwrap().len()
            }));
        }

        let writer = {
            let ledger = ledger.clone();
            let service = service.clone();
            tokio::task::spawn_blocking(move || {
                let mut tx = ledger.begin();
                service
                    .transfer_asset(&mut tx, &Principal::admin("admin"), "asset5", "Michel")
                    .unwrap();
                tx.commit().unwrap();
            })
        };

        for reader in readers {
            assert_eq!(reader.await.unwrap(), 6);
        }
        writer.await.unwrap();

        let tx = ledger.begin();
        assert_eq!(service.read_asset(&tx, "asset5").unwrap().into_asset().unwrap().owner, "Michel");
        assert_eq!(ledger.committed_transactions().unwrap(), 2);
    }
}
