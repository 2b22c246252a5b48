use async_trait::async_trait;
use govscan_check::{
    AddressOutcome, CheckConfig, ProposalCheck, ProposalConfig, SelfdestructChecker,
    StateProvider, StateSnapshot,
};
use govscan_core::{AccountCategory, AccountFacts, Address, Severity, TrustSet};
use govscan_utils::errors::ProviderError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const GOVERNOR: &str = "0x1111111111111111111111111111111111111111";
const TIMELOCK: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Fails every lookup for the addresses in `broken`, serves the rest from a snapshot.
struct FailingProvider {
    inner: StateSnapshot,
    broken: HashSet<Address>,
}

#[async_trait]
impl StateProvider for FailingProvider {
    async fn fetch_code(&self, address: Address) -> Result<Option<Vec<u8>>, ProviderError> {
        if self.broken.contains(&address) {
            return Err(ProviderError::Fetch {
                what: "code",
                address: address.to_checksum(None),
                reason: "connection reset".to_string(),
            });
        }
        self.inner.fetch_code(address).await
    }

    async fn fetch_nonce(&self, address: Address) -> Result<u64, ProviderError> {
        self.inner.fetch_nonce(address).await
    }
}

/// Never answers within any sane timeout.
struct SlowProvider;

#[async_trait]
impl StateProvider for SlowProvider {
    async fn fetch_code(&self, _address: Address) -> Result<Option<Vec<u8>>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Some(vec![]))
    }

    async fn fetch_nonce(&self, _address: Address) -> Result<u64, ProviderError> {
        Ok(0)
    }
}

/// Records which addresses were looked up and the peak number of concurrent code lookups.
#[derive(Default)]
struct CountingProvider {
    seen: Mutex<Vec<Address>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl StateProvider for CountingProvider {
    async fn fetch_code(&self, address: Address) -> Result<Option<Vec<u8>>, ProviderError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(address);
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(vec![0x60, 0x00, 0x00]))
    }

    async fn fetch_nonce(&self, _address: Address) -> Result<u64, ProviderError> {
        Ok(1)
    }
}

fn proposal(targets: &[Address], touched: &[Address]) -> ProposalConfig {
    let list = |addresses: &[Address]| -> Vec<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    };
    ProposalConfig {
        dao_name: "Radworks".to_string(),
        governor_address: GOVERNOR.to_string(),
        timelock_address: TIMELOCK.to_uppercase().replacen("0X", "0x", 1),
        proposal_id: Some("42".to_string()),
        targets: list(targets),
        touched_addresses: list(touched),
        trusted_addresses: vec![],
    }
}

#[tokio::test]
async fn failed_lookup_is_reported_as_error_not_safe() {
    init_tracing();
    let inner = StateSnapshot::new()
        .with_account(addr(0xa1), AccountFacts::new(Some(vec![0x60, 0x01, 0x00]), 1))
        .with_account(addr(0xa2), AccountFacts::new(Some(vec![0x60, 0x01, 0x00]), 1));
    let provider = FailingProvider {
        inner,
        broken: [addr(0xa2)].into_iter().collect(),
    };
    let checker = SelfdestructChecker::new(CheckConfig::default(), Arc::new(provider)).unwrap();

    let report = checker
        .check_addresses("targets", &TrustSet::new(), &[addr(0xa1), addr(0xa2)])
        .await
        .unwrap();

    assert_eq!(report.info.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Unable to classify"));
    assert!(report.errors[0].contains("connection reset"));
    assert!(matches!(
        report.addresses[1].outcome,
        AddressOutcome::Unclassified { .. }
    ));
    assert_eq!(report.max_severity(), Some(Severity::Error));
    assert!(!report.passed(false));
}

#[tokio::test]
async fn lookup_timeout_is_reported_as_error() {
    init_tracing();
    let config = CheckConfig {
        fetch_timeout: Duration::from_millis(50),
        ..CheckConfig::default()
    };
    let checker = SelfdestructChecker::new(config, Arc::new(SlowProvider)).unwrap();

    let report = checker
        .check_addresses("touched", &TrustSet::new(), &[addr(0xb1)])
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.info.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.addresses[0].outcome.severity(), Severity::Error);
    assert!(
        report.errors[0].ends_with("timed out after 50ms)"),
        "{}",
        report.errors[0]
    );
}

#[tokio::test]
async fn trusted_addresses_are_never_looked_up() {
    init_tracing();
    let provider = Arc::new(CountingProvider::default());
    let checker = SelfdestructChecker::new(CheckConfig::default(), provider.clone()).unwrap();

    let trusted: TrustSet = [addr(0x01), addr(0x02)].into_iter().collect();
    let report = checker
        .check_addresses("targets", &trusted, &[addr(0x01), addr(0x03), addr(0x02)])
        .await
        .unwrap();

    let seen = provider.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![addr(0x03)]);
    assert_eq!(report.info.len(), 3);
    assert_eq!(
        report.addresses[0].outcome.category(),
        Some(AccountCategory::Trusted)
    );
    assert_eq!(
        report.addresses[1].outcome.category(),
        Some(AccountCategory::Safe)
    );
}

#[tokio::test]
async fn lookups_respect_concurrency_limit() {
    init_tracing();
    let provider = Arc::new(CountingProvider::default());
    let config = CheckConfig {
        max_concurrent_lookups: 3,
        ..CheckConfig::default()
    };
    let checker = SelfdestructChecker::new(config, provider.clone()).unwrap();

    let addresses: Vec<Address> = (0x10..0x20).map(addr).collect();
    let report = checker
        .check_addresses("targets", &TrustSet::new(), &addresses)
        .await
        .unwrap();

    assert_eq!(report.addresses.len(), addresses.len());
    assert_eq!(provider.seen.lock().unwrap().len(), addresses.len());
    let peak = provider.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak}");
    assert!(peak >= 1);
}

#[tokio::test]
async fn run_all_produces_both_checks() {
    init_tracing();
    let governor: Address = GOVERNOR.parse().unwrap();
    let snapshot = StateSnapshot::new()
        .with_account(addr(0xc1), AccountFacts::new(Some(vec![0x60, 0x00, 0xf4]), 1))
        .with_account(addr(0xc2), AccountFacts::new(Some(vec![0x30, 0xff]), 1))
        .with_account(addr(0xc3), AccountFacts::new(Some(vec![]), 12));
    let checker =
        SelfdestructChecker::new(CheckConfig::development(), Arc::new(snapshot)).unwrap();

    let proposal = proposal(
        &[addr(0xc1), governor],
        &[governor, addr(0xc2), addr(0xc3), addr(0xc4)],
    );
    let reports = checker.run_all(&proposal).await.unwrap();
    assert_eq!(reports.len(), 2);

    let targets = &reports[0];
    assert_eq!(targets.name, ProposalCheck::Targets.name());
    assert_eq!(targets.warnings.len(), 1);
    assert!(targets.warnings[0].ends_with("Contract (with DELEGATECALL)"));
    assert_eq!(targets.info.len(), 1);
    assert!(targets.passed(false));
    assert!(!targets.passed(true));

    let touched = &reports[1];
    assert_eq!(touched.name, ProposalCheck::TouchedContracts.name());
    assert_eq!(touched.errors.len(), 1);
    assert!(touched.errors[0].ends_with("Contract (with SELFDESTRUCT)"));
    // governor (trusted) and 0xc3 (EOA)
    assert_eq!(touched.info.len(), 2);
    // 0xc4 is absent from the snapshot, so it is an unused account
    assert_eq!(touched.warnings.len(), 1);
    assert!(touched.warnings[0].ends_with("EOA (may have code later)"));
    assert!(!touched.passed(false));
}

#[tokio::test]
async fn timelock_is_trusted_regardless_of_case() {
    init_tracing();
    let timelock: Address = TIMELOCK.parse().unwrap();
    let snapshot =
        StateSnapshot::new().with_account(timelock, AccountFacts::new(Some(vec![0xff]), 1));
    let checker = SelfdestructChecker::new(CheckConfig::default(), Arc::new(snapshot)).unwrap();

    let report = checker
        .run(ProposalCheck::Targets, &proposal(&[timelock], &[]))
        .await
        .unwrap();
    assert_eq!(report.errors.len(), 0);
    assert_eq!(
        report.addresses[0].outcome.category(),
        Some(AccountCategory::Trusted)
    );
}

#[tokio::test]
async fn invalid_proposal_address_fails_the_run() {
    let checker =
        SelfdestructChecker::new(CheckConfig::default(), Arc::new(StateSnapshot::new())).unwrap();
    let mut proposal = proposal(&[], &[]);
    proposal.targets.push("0xnothex".to_string());
    assert!(checker.run(ProposalCheck::Targets, &proposal).await.is_err());
}
