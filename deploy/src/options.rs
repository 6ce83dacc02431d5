//! Builder for the type-3 executor options attached to a cross-chain message

use ethers::types::Bytes;

const TYPE_3: u16 = 3;
const EXECUTOR_WORKER_ID: u8 = 1;
const OPTION_TYPE_LZRECEIVE: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    encoded: Vec<u8>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    pub fn new() -> Self {
        Self {
            encoded: TYPE_3.to_be_bytes().to_vec(),
        }
    }

    /// Gas and `msg.value` the executor supplies to `lzReceive`; a zero
    /// value is omitted from the encoding.
    pub fn add_executor_lz_receive_option(self, gas: u128, value: u128) -> Self {
        let mut option = gas.to_be_bytes().to_vec();
        if value > 0 {
            option.extend_from_slice(&value.to_be_bytes());
        }
        self.add_executor_option(OPTION_TYPE_LZRECEIVE, &option)
    }

    fn add_executor_option(mut self, option_type: u8, option: &[u8]) -> Self {
        // option_type is counted in the length prefix
        let size = option.len() as u16 + 1;
        self.encoded.push(EXECUTOR_WORKER_ID);
        self.encoded.extend_from_slice(&size.to_be_bytes());
        self.encoded.push(option_type);
        self.encoded.extend_from_slice(option);
        self
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.encoded.clone())
    }
}
