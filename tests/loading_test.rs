//! Token list files, config-declared tokens and the log sink

use std::fs;

use unlock::config;
use unlock::domain::{parse_address, TokenCatalog};
use unlock::infrastructure::token_list;
use unlock::logging;

#[test]
fn test_token_list_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    fs::write(
        &path,
        r#"{
            "name": "custom",
            "tokens": [
                { "chainId": 5, "address": "0x1111111111111111111111111111111111111111",
                  "name": "Test Token", "symbol": "TST", "decimals": 9,
                  "logoURI": "https://example.org/tst.png" },
                { "chainId": 5, "address": "0xnothex", "name": "Broken",
                  "symbol": "BRK", "decimals": 18 }
            ]
        }"#,
    )
    .unwrap();

    let tokens = token_list::load(&path).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].symbol, "TST");
    assert_eq!(tokens[0].chain_id, 5);
    assert_eq!(tokens[0].logo_uri.as_deref(), Some("https://example.org/tst.png"));
}

#[test]
fn test_missing_token_list_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = token_list::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read token list"));
}

#[test]
fn test_config_tokens_extend_bundled_list() {
    let config = config::parse(
        r#"
locker = "0x1000000000000000000000000000000000000001"

[[tokens]]
address = "0xDEADBEEFDEADBEEFDEADBEEFDEADBEEFDEADBEEF"
symbol = "BEEF"
decimals = 12

# duplicate of the bundled USDC entry
[[tokens]]
address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
symbol = "USDC2"
decimals = 6
"#,
    )
    .unwrap();

    let mut seed = token_list::bundled().unwrap();
    let bundled_len = seed.len();
    seed.extend(config.tokens.iter().filter_map(|spec| spec.to_token()));
    let catalog = TokenCatalog::new(seed);

    assert_eq!(catalog.len(), bundled_len + 1);
    let beef = parse_address("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
    assert_eq!(catalog.get(&beef).unwrap().name, "BEEF");

    let usdc = parse_address("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap();
    assert_eq!(catalog.get(&usdc).unwrap().symbol, "USDC");
}

#[test]
fn test_logging_writes_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let guard = logging::init(&log_dir, Some("unlock=debug")).unwrap();
    tracing::info!("hello from the test");
    drop(guard);

    assert!(log_dir.is_dir());
    let entries: Vec<_> = fs::read_dir(&log_dir).unwrap().collect();
    assert!(!entries.is_empty());
}
