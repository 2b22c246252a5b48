use govscan_core::decoder::parse_address;
use govscan_core::{AccountCategory, AccountFacts, Address, Severity, TrustSet, classify_account};
use govscan_utils::errors::{ClassifyError, DecodeError};

const GOVERNOR: &str = "0x6f4f2e62e42e4dd8e6d3ee5b13f2d5f5e2c1c7a9";

fn facts(code: &str, nonce: &str) -> AccountFacts {
    AccountFacts::from_hex(Some(code), nonce).unwrap()
}

#[test]
fn empty_code_with_fresh_nonce_is_empty() {
    let trusted = TrustSet::new();
    let address = Address::repeat_byte(0x11);
    let category = classify_account(&trusted, &address, &facts("0x", "0x0"));
    assert_eq!(category, AccountCategory::Empty);
    assert_eq!(category.severity(), Severity::Warning);
    assert_eq!(category.description(), "EOA (may have code later)");
}

#[test]
fn empty_code_with_used_nonce_is_eoa() {
    let trusted = TrustSet::new();
    let address = Address::repeat_byte(0x11);
    let category = classify_account(&trusted, &address, &facts("0x", "5"));
    assert_eq!(category, AccountCategory::Eoa);
    assert_eq!(category.severity(), Severity::Info);
}

#[test]
fn trusted_address_is_not_inspected() {
    let governor = parse_address(GOVERNOR).unwrap();
    let trusted: TrustSet = [governor].into_iter().collect();
    let category = classify_account(&trusted, &governor, &facts("0xff", "1"));
    assert_eq!(category, AccountCategory::Trusted);
    assert_eq!(category.description(), "Trusted contract (not checked)");
}

#[test]
fn trust_lookup_ignores_hex_case() {
    let lower = parse_address(GOVERNOR).unwrap();
    let upper = parse_address(&GOVERNOR.to_uppercase()).unwrap();
    let checksummed = parse_address(&lower.to_checksum(None)).unwrap();
    assert_eq!(lower, upper);
    assert_eq!(lower, checksummed);

    let trusted: TrustSet = [upper].into_iter().collect();
    assert_eq!(
        classify_account(&trusted, &lower, &facts("0xff", "0")),
        AccountCategory::Trusted
    );
}

#[test]
fn contract_categories_follow_the_scan() {
    let trusted = TrustSet::new();
    let address = Address::repeat_byte(0x22);
    let cases = [
        ("0x6000ff", AccountCategory::SelfDestruct, Severity::Error),
        ("0x6000f4", AccountCategory::DelegateCall, Severity::Warning),
        ("0x60ff00", AccountCategory::Safe, Severity::Info),
        ("0x00ff", AccountCategory::Safe, Severity::Info),
        ("0x005bff", AccountCategory::SelfDestruct, Severity::Error),
    ];
    for (code, category, severity) in cases {
        let got = classify_account(&trusted, &address, &facts(code, "1"));
        assert_eq!(got, category, "code {code}");
        assert_eq!(got.severity(), severity, "code {code}");
    }
}

#[test]
fn unavailable_code_is_never_safe() {
    let trusted = TrustSet::new();
    let address = Address::repeat_byte(0x33);
    let facts = AccountFacts::from_hex(None, "7").unwrap();
    assert_eq!(
        classify_account(&trusted, &address, &facts),
        AccountCategory::Empty
    );
}

#[test]
fn classification_is_idempotent() {
    let trusted: TrustSet = [Address::repeat_byte(0x01)].into_iter().collect();
    let inputs = [
        (Address::repeat_byte(0x01), facts("0xff", "0")),
        (Address::repeat_byte(0x02), facts("0x", "0")),
        (Address::repeat_byte(0x03), facts("0x", "3")),
        (Address::repeat_byte(0x04), facts("0x7f00", "1")),
    ];
    for (address, facts) in &inputs {
        let first = classify_account(&trusted, address, facts);
        let second = classify_account(&trusted, address, facts);
        assert_eq!(first, second);
    }
}

#[test]
fn malformed_inputs_are_rejected() {
    assert!(matches!(
        AccountFacts::from_hex(Some("0xzz"), "0"),
        Err(ClassifyError::InvalidInput(DecodeError::HexDecode(_)))
    ));
    assert!(matches!(
        AccountFacts::from_hex(Some("0x0ff"), "1"),
        Err(ClassifyError::InvalidInput(DecodeError::HexDecode(
            hex::FromHexError::OddLength
        )))
    ));
    assert!(matches!(
        AccountFacts::from_hex(Some("0x"), "-1"),
        Err(ClassifyError::InvalidInput(DecodeError::Nonce(_)))
    ));
    assert!(matches!(
        parse_address("0x1234"),
        Err(DecodeError::AddressLength { len: 2, .. })
    ));
}

#[test]
fn categories_serialize_lowercase() {
    let json = serde_json::to_string(&AccountCategory::DelegateCall).unwrap();
    assert_eq!(json, "\"delegatecall\"");
    let back: AccountCategory = serde_json::from_str("\"selfdestruct\"").unwrap();
    assert_eq!(back, AccountCategory::SelfDestruct);
}
