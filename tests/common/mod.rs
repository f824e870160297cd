#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, B256, U256};
use wallet_txdecoder::domain::selectors::selector_of;
use wallet_txdecoder::infrastructure::abi::{ArtifactStore, ContractExplorer, EmbeddedArtifacts};
use wallet_txdecoder::infrastructure::ethereum::ChainClient;
use wallet_txdecoder::store::StaticTokenRegistry;
use wallet_txdecoder::{
    AbiCache, AbiRepository, ChainAddress, ChainType, Metadata, RawTransaction, RepositoryOptions,
    TransactionDecoder, TxType,
};

pub const CHAIN: ChainType = ChainType::Ethereum;

pub fn addr(byte: u8) -> ChainAddress {
    ChainAddress::new(CHAIN, Address::repeat_byte(byte))
}

pub const PROXY_ABI: &str = r#"[
    {"type":"function","name":"implementation","stateMutability":"view",
     "inputs":[],"outputs":[{"name":"","type":"address"}]},
    {"type":"function","name":"upgradeTo","stateMutability":"nonpayable",
     "inputs":[{"name":"newImplementation","type":"address"}],"outputs":[]}
]"#;

pub fn erc20_abi() -> String {
    EmbeddedArtifacts.load("ERC20").unwrap().unwrap()
}

/// Verified token interface that names its parameters differently
pub const WETH_ABI: &str = r#"[
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"dst","type":"address"},{"name":"wad","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}]},
    {"type":"function","name":"deposit","stateMutability":"payable","inputs":[],"outputs":[]}
]"#;

/// Token interface listing the three-argument `transfer` overload first
pub const ERC223_ABI: &str = r#"[
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint256"},
               {"name":"data","type":"bytes"}],
     "outputs":[{"name":"","type":"bool"}]},
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}]}
]"#;

/// Explorer serving canned interfaces
#[derive(Default)]
pub struct FakeExplorer {
    interfaces: Mutex<HashMap<ChainAddress, String>>,
    failing: Mutex<HashSet<ChainAddress>>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn verify(&self, address: ChainAddress, abi: &str) {
        self.interfaces
            .lock()
            .unwrap()
            .insert(address, abi.to_string());
    }

    pub fn fail(&self, address: ChainAddress) {
        self.failing.lock().unwrap().insert(address);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ContractExplorer for FakeExplorer {
    async fn verified_interface(&self, address: &ChainAddress) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(address) {
            anyhow::bail!("explorer returned 503");
        }
        Ok(self.interfaces.lock().unwrap().get(address).cloned())
    }
}

/// Chain answering `implementation()` from a table
#[derive(Default)]
pub struct FakeChain {
    results: Mutex<HashMap<ChainAddress, Bytes>>,
    failing: Mutex<HashSet<ChainAddress>>,
    pub calls: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn implementation(&self, proxy: ChainAddress, target: ChainAddress) {
        let mut word = vec![0u8; 12];
        word.extend_from_slice(target.address.as_slice());
        self.respond(proxy, Bytes::from(word));
    }

    pub fn respond(&self, proxy: ChainAddress, result: Bytes) {
        self.results.lock().unwrap().insert(proxy, result);
    }

    pub fn fail(&self, proxy: ChainAddress) {
        self.failing.lock().unwrap().insert(proxy);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    fn supports(&self, chain: ChainType) -> bool {
        chain.is_evm()
    }

    async fn call_contract(
        &self,
        _from: Option<Address>,
        to: &ChainAddress,
        data: Bytes,
    ) -> anyhow::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(&data[..], &selector_of("implementation()")[..]);
        if self.failing.lock().unwrap().contains(to) {
            anyhow::bail!("execution reverted");
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(to)
            .cloned()
            .unwrap_or_default())
    }
}

/// Artifact store missing every interface
pub struct EmptyArtifacts;

impl ArtifactStore for EmptyArtifacts {
    fn load(&self, _artifact: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

pub struct Harness {
    pub explorer: Arc<FakeExplorer>,
    pub chain: Arc<FakeChain>,
    pub cache: AbiCache,
    pub repository: Arc<AbiRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(FakeExplorer::new(), Arc::new(EmbeddedArtifacts), RepositoryOptions::default())
    }

    pub fn build(
        explorer: FakeExplorer,
        artifacts: Arc<dyn ArtifactStore>,
        options: RepositoryOptions,
    ) -> Self {
        let explorer = Arc::new(explorer);
        let chain = Arc::new(FakeChain::new());
        let cache = AbiCache::new();
        let repository = Arc::new(AbiRepository::new(
            artifacts,
            explorer.clone(),
            chain.clone(),
            cache.clone(),
            options,
        ));
        Self {
            explorer,
            chain,
            cache,
            repository,
        }
    }

    pub fn decoder(&self, tokens: StaticTokenRegistry) -> TransactionDecoder {
        TransactionDecoder::new(self.repository.clone(), Arc::new(tokens))
    }
}

pub fn call_data(signature: &str, args: Vec<DynSolValue>) -> Bytes {
    let mut data = selector_of(signature).to_vec();
    if !args.is_empty() {
        data.extend(DynSolValue::Tuple(args).abi_encode_params());
    }
    Bytes::from(data)
}

pub fn address_arg(address: ChainAddress) -> DynSolValue {
    DynSolValue::Address(address.address)
}

pub fn uint_arg(value: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(value), 256)
}

pub fn bytes32_arg(value: B256) -> DynSolValue {
    DynSolValue::FixedBytes(value, 32)
}

pub fn raw_call(to: ChainAddress, data: Bytes) -> RawTransaction {
    RawTransaction {
        hash: B256::repeat_byte(0xee),
        chain: CHAIN,
        from: addr(0x01),
        to: Some(to),
        value: U256::ZERO,
        data,
        nonce: 7,
        gas_limit: 120_000,
        gas_price: U256::from(30_000_000_000u64),
        block_number: Some(19_000_000),
        metadata: Metadata::new(),
        tx_type: TxType::Untyped,
    }
}
