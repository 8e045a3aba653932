use crate::error::{DeskError, Result};
use ethers::signers::{LocalWallet, Signer as EthersSigner};
use ethers::types::{Address, H256};
use tracing::info;
use zeroize::Zeroize;

/// Account wallet used to sign platform transactions
///
/// # Security
/// The private key is only used during wallet creation and then zeroized.
/// It is never stored in the Wallet struct.
#[derive(Clone)]
pub struct Wallet {
    inner: LocalWallet,
    nid: u64,
}

impl Wallet {
    /// Create a wallet from a private key hex string
    pub fn from_private_key(private_key: &str, nid: u64) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = private_key.trim_start_matches("0x");

        let mut secure_key = key_hex.to_string();

        let wallet = secure_key
            .parse::<LocalWallet>()
            .map_err(|e| DeskError::Wallet(format!("Invalid private key: {}", e)))?;

        secure_key.zeroize();

        let wallet = Self { inner: wallet, nid };
        info!("Wallet initialized: {}", wallet.account());
        Ok(wallet)
    }

    /// Create a wallet from the `DESK_PRIVATE_KEY` environment variable
    pub fn from_env(nid: u64) -> Result<Self> {
        let mut private_key = std::env::var("DESK_PRIVATE_KEY").map_err(|_| {
            DeskError::Wallet("DESK_PRIVATE_KEY environment variable not set".to_string())
        })?;

        let result = Self::from_private_key(&private_key, nid);

        private_key.zeroize();

        result
    }

    /// Raw 20 byte address
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Account string used on the platform (`hx` + 40 hex chars)
    pub fn account(&self) -> String {
        format!("hx{}", hex::encode(self.address().as_bytes()))
    }

    /// Network id the wallet signs for
    pub fn nid(&self) -> u64 {
        self.nid
    }

    /// Sign a 32 byte digest, returning `r || s || recovery_id`
    pub fn sign_digest(&self, digest: [u8; 32]) -> Result<[u8; 65]> {
        let signature = self
            .inner
            .sign_hash(H256::from(digest))
            .map_err(|e| DeskError::Signature(format!("Failed to sign hash: {}", e)))?;

        let mut out = [0u8; 65];
        signature.r.to_big_endian(&mut out[..32]);
        signature.s.to_big_endian(&mut out[32..64]);
        // ethers reports v as 27/28
        out[64] = u8::try_from(signature.v.saturating_sub(27))
            .map_err(|_| DeskError::Signature(format!("unexpected v value {}", signature.v)))?;
        Ok(out)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("account", &self.account())
            .field("nid", &self.nid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key, never funded
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_account_format() {
        let wallet = Wallet::from_private_key(TEST_KEY, 1).unwrap();
        assert_eq!(wallet.nid(), 1);
        assert_eq!(wallet.account(), "hxf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn test_sign_digest_recovery_id() {
        let wallet = Wallet::from_private_key(TEST_KEY, 1).unwrap();
        let sig = wallet.sign_digest([7u8; 32]).unwrap();
        assert!(sig[64] <= 1);
        assert_ne!(&sig[..32], &[0u8; 32]);
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(Wallet::from_private_key("0xnothex", 1).is_err());
    }
}
